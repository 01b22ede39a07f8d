//! raylib backend.
//!
//! Window, renderer and debug GUI share one [`RaylibHandle`]. The GUI pass
//! runs after drawing has finished, so it reads key presses and leaves
//! overlay lines that the renderer draws on top of the next frame.

use std::cell::RefCell;
use std::rc::Rc;

use log::{debug, info};
use raylib::prelude::*;

use super::{DebugGui, DebugGuiState, FrameInput, GameWindow, Presentation, Renderer, SceneView};
use crate::components::transform::transform_point;
use crate::error::GameError;
use crate::game::LoadRequest;
use crate::resources::camera::CameraInput;
use crate::resources::gameconfig::GameConfig;
use crate::resources::landisland::LandIsland;

struct RaylibContext {
    rl: RaylibHandle,
    thread: RaylibThread,
    overlay: Vec<String>,
}

/// `None` once the window has been closed.
type SharedContext = Rc<RefCell<Option<RaylibContext>>>;

/// Opens the window and builds the raylib presentation backends.
pub fn create_presentation(config: &GameConfig) -> Result<Presentation, GameError> {
    let (width, height) = config.window_size();
    let width = i32::try_from(width).map_err(|e| GameError::Window(e.to_string()))?;
    let height = i32::try_from(height).map_err(|e| GameError::Window(e.to_string()))?;

    let mut builder = raylib::init();
    builder.size(width, height).resizable().title("Island Core");
    if config.vsync {
        builder.vsync();
    }
    if config.fullscreen {
        builder.fullscreen();
    }
    let (mut rl, thread) = builder.build();
    rl.set_target_fps(config.target_fps);
    // Escape is handled by the debug GUI
    rl.set_exit_key(None);
    info!("Window opened ({}x{})", width, height);

    let context: SharedContext = Rc::new(RefCell::new(Some(RaylibContext {
        rl,
        thread,
        overlay: Vec::new(),
    })));

    Ok(Presentation::new(
        RaylibWindow {
            context: context.clone(),
        },
        RaylibRenderer {
            context: context.clone(),
        },
        RaylibDebugGui {
            context,
            selected: 0,
        },
    ))
}

pub struct RaylibWindow {
    context: SharedContext,
}

impl GameWindow for RaylibWindow {
    fn poll_events(&mut self) -> FrameInput {
        let guard = self.context.borrow();
        let Some(ctx) = guard.as_ref() else {
            return FrameInput {
                quit_requested: true,
                ..FrameInput::default()
            };
        };
        let rl = &ctx.rl;

        let axis = |neg: KeyboardKey, pos: KeyboardKey| -> f32 {
            (rl.is_key_down(pos) as i32 - rl.is_key_down(neg) as i32) as f32
        };
        let mouse = rl.get_mouse_position();

        FrameInput {
            dt: rl.get_frame_time(),
            mouse_position: (mouse.x as i32, mouse.y as i32),
            quit_requested: rl.window_should_close(),
            pick_requested: rl.is_mouse_button_pressed(MouseButton::MOUSE_BUTTON_LEFT),
            camera: CameraInput {
                pan: (
                    axis(KeyboardKey::KEY_A, KeyboardKey::KEY_D),
                    axis(KeyboardKey::KEY_S, KeyboardKey::KEY_W),
                ),
                rotate: (
                    axis(KeyboardKey::KEY_Q, KeyboardKey::KEY_E),
                    axis(KeyboardKey::KEY_DOWN, KeyboardKey::KEY_UP),
                ),
                zoom: rl.get_mouse_wheel_move(),
            },
        }
    }

    fn size(&self) -> (i32, i32) {
        match self.context.borrow().as_ref() {
            Some(ctx) => (ctx.rl.get_screen_width(), ctx.rl.get_screen_height()),
            None => (0, 0),
        }
    }

    fn close(&mut self) {
        // dropping the handle closes the window
        if self.context.borrow_mut().take().is_some() {
            info!("Window closed");
        }
    }
}

pub struct RaylibRenderer {
    context: SharedContext,
}

fn rgb(c: [u8; 3]) -> Color {
    Color::new(c[0], c[1], c[2], 255)
}

fn height_color(land: &LandIsland, h: f32, range: (f32, f32)) -> Color {
    if h <= land.sea_level {
        return Color::new(194, 178, 128, 255);
    }
    let span = (range.1 - land.sea_level).max(f32::EPSILON);
    let t = ((h - land.sea_level) / span).clamp(0.0, 1.0);
    let lerp = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t) as u8;
    Color::new(lerp(70, 140), lerp(150, 120), lerp(60, 100), 255)
}

impl RaylibRenderer {
    fn draw_land<D: RaylibDraw3D>(d: &mut D, land: &LandIsland, wireframe: bool) {
        let range = land.height_range();
        let point = |gx: u32, gz: u32| {
            Vector3::new(
                gx as f32 * land.cell_size,
                land.sample(gx, gz),
                gz as f32 * land.cell_size,
            )
        };
        for gz in 0..land.depth.saturating_sub(1) {
            for gx in 0..land.width.saturating_sub(1) {
                let a = point(gx, gz);
                let b = point(gx + 1, gz);
                let c = point(gx, gz + 1);
                let e = point(gx + 1, gz + 1);
                if wireframe {
                    let color = Color::DARKGREEN;
                    d.draw_line_3D(a, b, color);
                    d.draw_line_3D(a, c, color);
                    d.draw_line_3D(a, e, color);
                } else {
                    let color = height_color(land, (a.y + b.y + c.y + e.y) * 0.25, range);
                    d.draw_triangle3D(a, c, b, color);
                    d.draw_triangle3D(b, c, e, color);
                }
            }
        }
    }
}

impl Renderer for RaylibRenderer {
    fn render(&mut self, scene: &SceneView<'_>) -> Result<(), GameError> {
        let mut guard = self.context.borrow_mut();
        let ctx = guard
            .as_mut()
            .ok_or_else(|| GameError::Window("render after window close".to_string()))?;
        let RaylibContext {
            rl,
            thread,
            overlay,
        } = ctx;

        let mut d = rl.begin_drawing(thread);
        d.clear_background(rgb(scene.sky.color_at(scene.time_of_day)));
        {
            let mut d3 = d.begin_mode3D(scene.camera.camera3d());

            let extent = match scene.land {
                Some(land) => {
                    Self::draw_land(&mut d3, land, scene.wireframe);
                    land.extent()
                }
                None => {
                    d3.draw_grid(20, 10.0);
                    (200.0, 200.0)
                }
            };

            let level = scene.water.surface_level(scene.elapsed);
            let center = Vector3::new(extent.0 * 0.5, level, extent.1 * 0.5);
            let [r, g, b, a] = scene.water.color;
            if scene.water_debug {
                d3.draw_cube_wires(center, extent.0, 0.1, extent.1, Color::SKYBLUE);
            } else {
                d3.draw_plane(center, Vector2::new(extent.0, extent.1), Color::new(r, g, b, a));
            }

            for entity in scene.entities {
                let (size, color) = match entity.mesh.and_then(|i| scene.meshes.get(i)) {
                    Some(mesh) => (mesh.size, rgb(mesh.color)),
                    None => ([1.0, 1.0, 1.0], Color::MAGENTA),
                };
                let s = entity.scale;
                let pos = entity.position + Vector3::new(0.0, size[1] * s * 0.5, 0.0);
                if scene.wireframe {
                    d3.draw_cube_wires(pos, size[0] * s, size[1] * s, size[2] * s, color);
                } else {
                    d3.draw_cube(pos, size[0] * s, size[1] * s, size[2] * s, color);
                }
            }

            for (from, to) in scene.test_model.segments() {
                d3.draw_line_3D(
                    transform_point(&scene.model_matrix, from),
                    transform_point(&scene.model_matrix, to),
                    Color::ORANGE,
                );
            }

            if let Some(hit) = scene.intersection {
                d3.draw_sphere(hit, 1.5, Color::RED);
            }
        }

        for (i, line) in overlay.iter().enumerate() {
            d.draw_text(line, 10, 30 + i as i32 * 14, 12, Color::BLACK);
        }
        d.draw_fps(10, 10);
        Ok(())
    }

    fn shutdown(&mut self) {
        if let Some(ctx) = self.context.borrow_mut().as_mut() {
            ctx.overlay.clear();
        }
        debug!("Renderer shut down");
    }
}

/// Keyboard-driven debug overlay.
///
/// F1 wireframe, F2 water debug, `[`/`]` time of day, 1/2 bump map, 3/4
/// small bump map, R/T/G rotate and scale the test model, PageUp/PageDown
/// pick a landscape, Enter loads it as a map, L loads only its terrain,
/// Escape quits.
pub struct RaylibDebugGui {
    context: SharedContext,
    selected: usize,
}

const BUMP_STEP: f32 = 0.1;

impl DebugGui for RaylibDebugGui {
    fn run(&mut self, state: &mut DebugGuiState) {
        let mut guard = self.context.borrow_mut();
        let Some(ctx) = guard.as_mut() else {
            return;
        };
        let rl = &ctx.rl;
        let pressed = |key: KeyboardKey| rl.is_key_pressed(key);

        if pressed(KeyboardKey::KEY_F1) {
            state.wireframe = !state.wireframe;
        }
        if pressed(KeyboardKey::KEY_F2) {
            state.water_debug = !state.water_debug;
        }
        if pressed(KeyboardKey::KEY_LEFT_BRACKET) {
            state.time_of_day -= 1.0;
        }
        if pressed(KeyboardKey::KEY_RIGHT_BRACKET) {
            state.time_of_day += 1.0;
        }
        if pressed(KeyboardKey::KEY_ONE) {
            state.bumpmap_strength -= BUMP_STEP;
        }
        if pressed(KeyboardKey::KEY_TWO) {
            state.bumpmap_strength += BUMP_STEP;
        }
        if pressed(KeyboardKey::KEY_THREE) {
            state.small_bumpmap_strength -= BUMP_STEP;
        }
        if pressed(KeyboardKey::KEY_FOUR) {
            state.small_bumpmap_strength += BUMP_STEP;
        }
        if pressed(KeyboardKey::KEY_R) {
            state.model_rotation.y = (state.model_rotation.y + 15.0).rem_euclid(360.0);
        }
        if pressed(KeyboardKey::KEY_T) {
            state.model_scale = state.model_scale * 1.25;
        }
        if pressed(KeyboardKey::KEY_G) {
            state.model_scale = state.model_scale * 0.8;
        }

        let count = state.landscapes.len();
        if count > 0 {
            if pressed(KeyboardKey::KEY_PAGE_DOWN) {
                self.selected = (self.selected + 1) % count;
            }
            if pressed(KeyboardKey::KEY_PAGE_UP) {
                self.selected = (self.selected + count - 1) % count;
            }
            self.selected = self.selected.min(count - 1);
            let name = state.landscapes[self.selected].0.clone();
            if pressed(KeyboardKey::KEY_ENTER) {
                state.request = Some(LoadRequest::Map(name));
            } else if pressed(KeyboardKey::KEY_L) {
                state.request = Some(LoadRequest::Landscape(name));
            }
        }
        if pressed(KeyboardKey::KEY_ESCAPE) {
            state.quit = true;
        }

        ctx.overlay = overlay_lines(state, self.selected);
    }
}

fn overlay_lines(state: &DebugGuiState, selected: usize) -> Vec<String> {
    let mut lines = vec![
        format!(
            "map: {}  entities: {}",
            state.active_map.as_deref().unwrap_or("-"),
            state.entity_count
        ),
        format!(
            "time {:05.2}h  wireframe {}  water debug {}",
            state.time_of_day, state.wireframe, state.water_debug
        ),
        format!(
            "bump {:.1}  small bump {:.1}",
            state.bumpmap_strength, state.small_bumpmap_strength
        ),
        format!(
            "mouse ({}, {})  hit {}",
            state.mouse_position.0,
            state.mouse_position.1,
            state
                .intersection
                .map(|p| format!("({:.1}, {:.1}, {:.1})", p.x, p.y, p.z))
                .unwrap_or_else(|| "-".to_string())
        ),
    ];
    for (i, (name, available)) in state.landscapes.iter().enumerate() {
        let marker = if i == selected { '>' } else { ' ' };
        let missing = if *available { "" } else { " (missing files)" };
        lines.push(format!("{marker} {name}{missing}"));
    }
    lines
}
