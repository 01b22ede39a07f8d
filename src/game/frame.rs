//! The frame loop.

use log::{debug, info, trace};

use super::Game;
use crate::error::GameError;
use crate::platform::{DebugGuiState, SceneView};
use crate::resources::scriptvm::ScriptWorldSnapshot;
use crate::resources::sky::{HOURS_PER_DAY, wrap_hour};

impl Game {
    /// Runs frames until something clears the running flag.
    pub fn run(&mut self) -> Result<(), GameError> {
        info!("Entering frame loop");
        while self.running {
            self.frame()?;
        }
        info!("Frame loop finished after {} frames", self.frame_count);
        Ok(())
    }

    /// One iteration of the loop: input, camera and clock, deferred load,
    /// script and entity step, render, debug GUI.
    pub fn frame(&mut self) -> Result<(), GameError> {
        let input = self.window.poll_events();
        let dt = input.dt.max(0.0);
        if input.quit_requested {
            self.quit();
        }
        self.mouse_position = input.mouse_position;
        if input.pick_requested {
            self.pick();
        }

        self.camera.update(dt, &input.camera);
        self.elapsed += dt;
        self.advance_time_of_day(dt);

        self.apply_pending_load();

        let snapshot = ScriptWorldSnapshot {
            time_of_day: self.time_of_day,
            entity_count: self.entity_registry.len(),
            cursor: self.intersection.map(|p| [p.x, p.y, p.z]),
            active_map: self.active_map.clone(),
        };
        let commands = match self.script_vm.as_ref() {
            Some(vm) => {
                vm.set_snapshot(snapshot);
                vm.step(dt)?;
                vm.drain_commands()
            }
            None => Vec::new(),
        };
        if !commands.is_empty() {
            trace!("Applying {} script commands", commands.len());
            self.apply_script_commands(commands);
        }
        self.entity_registry.step(dt, self.land_island.as_ref());

        let entities = self.entity_registry.snapshot();
        let scene = SceneView {
            camera: &self.camera,
            land: self.land_island.as_ref(),
            sky: &self.sky,
            water: &self.water,
            meshes: &self.mesh_pack,
            entities: &entities,
            test_model: &self.test_model,
            model_matrix: self.model_matrix(),
            time_of_day: self.time_of_day,
            elapsed: self.elapsed,
            wireframe: self.wireframe,
            water_debug: self.water_debug,
            bumpmap_strength: self.bumpmap_strength,
            small_bumpmap_strength: self.small_bumpmap_strength,
            intersection: self.intersection,
        };
        self.renderer.render(&scene)?;

        let mut gui_state = self.debug_gui_state(entities.len(), dt);
        self.gui.run(&mut gui_state);
        self.apply_debug_gui_state(gui_state);

        self.frame_count += 1;
        Ok(())
    }

    fn advance_time_of_day(&mut self, dt: f32) {
        let day_length = self.config.day_length_seconds;
        if day_length > 0.0 {
            self.time_of_day = wrap_hour(self.time_of_day + dt * HOURS_PER_DAY / day_length);
        }
    }

    /// Intersects the camera ray under the cursor with the terrain.
    fn pick(&mut self) {
        let Some(land) = self.land_island.as_ref() else {
            return;
        };
        let ray = self
            .camera
            .screen_ray(self.mouse_position, self.window.size());
        self.intersection = land.intersect_ray(&ray);
        match self.intersection {
            Some(p) => debug!("Picked terrain at ({:.1}, {:.1}, {:.1})", p.x, p.y, p.z),
            None => debug!("Pick missed the terrain"),
        }
    }

    fn debug_gui_state(&self, entity_count: usize, dt: f32) -> DebugGuiState {
        DebugGuiState {
            wireframe: self.wireframe,
            water_debug: self.water_debug,
            time_of_day: self.time_of_day,
            bumpmap_strength: self.bumpmap_strength,
            small_bumpmap_strength: self.small_bumpmap_strength,
            model_position: self.model_position,
            model_rotation: self.model_rotation,
            model_scale: self.model_scale,
            fps: if dt > 0.0 { 1.0 / dt } else { 0.0 },
            mouse_position: self.mouse_position,
            intersection: self.intersection,
            entity_count,
            active_map: self.active_map.clone(),
            landscapes: self
                .landscapes
                .iter()
                .map(|entry| (entry.name().to_string(), entry.files_exist()))
                .collect(),
            request: None,
            quit: false,
        }
    }

    fn apply_debug_gui_state(&mut self, state: DebugGuiState) {
        self.wireframe = state.wireframe;
        self.water_debug = state.water_debug;
        if state.time_of_day.is_finite() {
            self.time_of_day = wrap_hour(state.time_of_day);
        }
        self.bumpmap_strength = state.bumpmap_strength.clamp(0.0, 1.0);
        self.small_bumpmap_strength = state.small_bumpmap_strength.clamp(0.0, 1.0);
        self.model_position = state.model_position;
        self.model_rotation = state.model_rotation;
        self.model_scale = state.model_scale;
        if let Some(request) = state.request {
            self.request_load(request);
        }
        if state.quit {
            self.quit();
        }
    }
}
