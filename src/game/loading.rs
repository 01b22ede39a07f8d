//! Map and landscape loading.
//!
//! A load is built off to the side first: script run, terrain parsed. The
//! live world is only touched once every step has succeeded, so a failed
//! load leaves the previous map running.

use log::{error, info, warn};

use super::{Game, LoadRequest};
use crate::error::{GameError, ScriptError};
use crate::resources::assetloader;
use crate::resources::landisland::LandIsland;
use crate::resources::script::ScriptRun;
use crate::resources::scriptvm::{ScriptCmd, ScriptVm};

impl Game {
    /// Loads a catalog map: runs its script in a fresh VM, loads the terrain
    /// the script names (or the entry's own), then replaces the world.
    pub fn load_map(&mut self, name: &str) -> Result<(), GameError> {
        let entry = self.landscapes.resolve(name)?;
        let entry_name = entry.name().to_string();
        let default_land = entry.landscape_file().to_string();
        let script_file = entry.script_file().to_string();
        info!("Loading map {}", entry_name);

        let run = self.script.run_script(&self.file_system, &script_file)?;
        let land_path = run.landscape_path().unwrap_or(&default_land).to_string();
        let land: LandIsland = assetloader::force_load_from_file(&self.file_system, &land_path)?;

        self.install_map(entry_name, land, run);
        Ok(())
    }

    /// Loads only the terrain of a catalog entry. The script is not run;
    /// entities are cleared and the VM is reset.
    pub fn load_landscape(&mut self, name: &str) -> Result<(), GameError> {
        let entry = self.landscapes.resolve(name)?;
        let entry_name = entry.name().to_string();
        let land_path = entry.landscape_file().to_string();
        info!("Loading landscape {}", entry_name);

        let land: LandIsland = assetloader::force_load_from_file(&self.file_system, &land_path)?;
        let vm = ScriptVm::new().map_err(ScriptError::from)?;

        self.entity_registry.clear();
        self.swap_land(land);
        self.script_vm = Some(vm);
        self.active_map = Some(entry_name);
        Ok(())
    }

    /// Loads a terrain file by path, keeping the current script and
    /// entities.
    pub fn load_landscape_file(&mut self, path: &str) -> Result<(), GameError> {
        let land: LandIsland = assetloader::force_load_from_file(&self.file_system, path)?;
        info!("Loaded landscape file {}", path);
        self.swap_land(land);
        Ok(())
    }

    /// Loads `name` as a map at the start of the next frame.
    pub fn request_map(&mut self, name: impl Into<String>) {
        self.request_load(LoadRequest::Map(name.into()));
    }

    /// Loads the terrain of `name` at the start of the next frame.
    pub fn request_landscape(&mut self, name: impl Into<String>) {
        self.request_load(LoadRequest::Landscape(name.into()));
    }

    pub(super) fn request_load(&mut self, request: LoadRequest) {
        if let Some(previous) = self.pending_load.replace(request) {
            info!("Load request {:?} replaced", previous);
        }
    }

    /// Applies the pending request, if any. Failures are logged and the
    /// current world is kept.
    pub(super) fn apply_pending_load(&mut self) {
        let Some(request) = self.pending_load.take() else {
            return;
        };
        let result = match &request {
            LoadRequest::Map(name) => self.load_map(name),
            LoadRequest::Landscape(name) => self.load_landscape(name),
            LoadRequest::LandscapeFile(path) => self.load_landscape_file(path),
        };
        if let Err(e) = result {
            error!("Deferred load {:?} failed: {}", request, e);
        }
    }

    fn install_map(&mut self, name: String, land: LandIsland, run: ScriptRun) {
        let ScriptRun { vm, commands, path } = run;
        self.entity_registry.clear();
        self.swap_land(land);
        self.script_vm = Some(vm);
        self.active_map = Some(name);

        // terrain already chosen above
        let remaining = commands
            .into_iter()
            .filter(|cmd| !matches!(cmd, ScriptCmd::LoadLandscape { .. }));
        let applied = self.apply_script_commands(remaining);
        info!(
            "Map {} ready: {} entities from {} ({} commands)",
            self.active_map.as_deref().unwrap_or_default(),
            self.entity_registry.len(),
            path,
            applied
        );
    }

    fn swap_land(&mut self, land: LandIsland) {
        let (ex, ez) = land.extent();
        let (low, high) = land.height_range();
        info!("Terrain {}x{} units, heights {}..{}", ex, ez, low, high);
        self.land_island = Some(land);
        self.intersection = None;
    }

    /// Applies commands issued by the active script. A `load_landscape`
    /// issued here becomes a deferred load. Returns how many were applied.
    pub(super) fn apply_script_commands(
        &mut self,
        commands: impl IntoIterator<Item = ScriptCmd>,
    ) -> usize {
        let mut applied = 0;
        for cmd in commands {
            match cmd {
                ScriptCmd::LoadLandscape { path } => {
                    self.request_load(LoadRequest::LandscapeFile(path));
                }
                ScriptCmd::CreateEntity(spawn) => {
                    self.entity_registry.create(
                        &spawn,
                        &self.mesh_pack,
                        self.land_island.as_ref(),
                    );
                }
                ScriptCmd::SetCamera { position, target } => {
                    self.camera.look_at(position, target);
                }
                ScriptCmd::SetTimeOfDay { hour } => {
                    if hour.is_finite() {
                        self.set_time_of_day(hour);
                    } else {
                        warn!("Ignoring time of day {}", hour);
                        continue;
                    }
                }
                ScriptCmd::LoadMap { name } => {
                    self.request_load(LoadRequest::Map(name));
                }
                ScriptCmd::Quit => self.quit(),
            }
            applied += 1;
        }
        applied
    }
}
