//! The game orchestrator.
//!
//! [`Game`] owns every subsystem: presentation backends, camera, file
//! system, assets, the landscape catalog, the entity registry and the script
//! VM. It builds them in dependency order, loads maps and landscapes, and
//! drives the frame loop (see [`Game::run`]).
//!
//! Only one `Game` may be alive per process; a second [`Game::new`] fails
//! with [`GameError::AlreadyRunning`].

mod frame;
mod loading;

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{info, warn};
use raylib::prelude::{Matrix, Vector3};

use crate::cli::Cli;
use crate::components::transform::model_matrix;
use crate::error::{AssetError, GameError, ScriptError};
use crate::platform::{DebugGui, GameWindow, Presentation, Renderer};
use crate::resources::assetloader::{self, LoadFromFile};
use crate::resources::camera::Camera;
use crate::resources::entityregistry::EntityRegistry;
use crate::resources::filesystem::FileSystem;
use crate::resources::gameconfig::GameConfig;
use crate::resources::landisland::LandIsland;
use crate::resources::landscape::LandscapeCatalog;
use crate::resources::meshpack::MeshPack;
use crate::resources::script::Script;
use crate::resources::scriptvm::ScriptVm;
use crate::resources::skinnedmodel::SkinnedModel;
use crate::resources::sky::{Sky, wrap_hour};
use crate::resources::water::Water;

pub const MESH_PACK_PATH: &str = "Data/AllMeshes.json";
pub const SKY_PATH: &str = "Data/Sky.json";
pub const WATER_PATH: &str = "Data/Water.json";
pub const TEST_MODEL_PATH: &str = "Data/TestModel.json";

const DEFAULT_BUMPMAP_STRENGTH: f32 = 0.5;
const DEFAULT_SMALL_BUMPMAP_STRENGTH: f32 = 0.5;

static INSTANCE_ALIVE: AtomicBool = AtomicBool::new(false);

/// Marks the single live game of the process until dropped.
struct InstanceGuard;

impl InstanceGuard {
    fn acquire() -> Result<Self, GameError> {
        INSTANCE_ALIVE
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| InstanceGuard)
            .map_err(|_| GameError::AlreadyRunning)
    }
}

impl Drop for InstanceGuard {
    fn drop(&mut self) {
        INSTANCE_ALIVE.store(false, Ordering::Release);
    }
}

/// A map or landscape switch applied at the start of the next frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadRequest {
    /// Catalog entry: run its script, then load its terrain.
    Map(String),
    /// Catalog entry: load its terrain only.
    Landscape(String),
    /// Terrain file named directly by a script.
    LandscapeFile(String),
}

/// Subsystems built from the installation during [`Game::new`], in
/// dependency order.
struct CoreAssets {
    mesh_pack: MeshPack,
    landscapes: LandscapeCatalog,
    entity_registry: EntityRegistry,
    script_vm: ScriptVm,
    script: Script,
    sky: Sky,
    water: Water,
    test_model: SkinnedModel,
}

impl CoreAssets {
    fn load(fs: &FileSystem, config: &GameConfig) -> Result<Self, GameError> {
        let mesh_pack: MeshPack = assetloader::force_load_from_file(fs, MESH_PACK_PATH)?;
        info!("Loaded {} meshes", mesh_pack.len());
        let landscapes = LandscapeCatalog::build(fs, &config.landscape_defs());
        info!("Landscape catalog has {} entries", landscapes.len());

        let entity_registry = EntityRegistry::new();
        info!("Entity registry ready");

        let script_vm = ScriptVm::new().map_err(ScriptError::from)?;
        let script = Script::new();
        info!("Script VM ready");

        let sky: Sky = assetloader::try_load_from_file(fs, SKY_PATH)?.unwrap_or_default();
        let water: Water = assetloader::try_load_from_file(fs, WATER_PATH)?.unwrap_or_default();
        let test_model: SkinnedModel =
            assetloader::try_load_from_file(fs, TEST_MODEL_PATH)?.unwrap_or_default();
        info!(
            "Debug assets ready: {} sky keyframes, {} test model bones",
            sky.keyframes.len(),
            test_model.bones.len()
        );

        Ok(Self {
            mesh_pack,
            landscapes,
            entity_registry,
            script_vm,
            script,
            sky,
            water,
            test_model,
        })
    }
}

pub struct Game {
    // Fields drop top to bottom, after `Drop::drop` has torn down the
    // registry, the terrain and the presentation backends.
    test_model: SkinnedModel,
    water: Water,
    sky: Sky,
    script: Script,
    /// `None` only once teardown has released it.
    script_vm: Option<ScriptVm>,
    entity_registry: EntityRegistry,
    land_island: Option<LandIsland>,
    landscapes: LandscapeCatalog,
    mesh_pack: MeshPack,
    camera: Camera,
    gui: Box<dyn DebugGui>,
    renderer: Box<dyn Renderer>,
    window: Box<dyn GameWindow>,
    file_system: FileSystem,
    config: GameConfig,

    running: bool,
    wireframe: bool,
    water_debug: bool,
    time_of_day: f32,
    elapsed: f32,
    bumpmap_strength: f32,
    small_bumpmap_strength: f32,
    mouse_position: (i32, i32),
    intersection: Option<Vector3>,
    model_position: Vector3,
    model_rotation: Vector3,
    model_scale: Vector3,
    active_map: Option<String>,
    pending_load: Option<LoadRequest>,
    frame_count: u64,

    _instance: InstanceGuard,
}

impl Game {
    /// Builds every subsystem in dependency order.
    ///
    /// `presentation` opens the window, renderer and debug GUI. On error
    /// everything acquired so far is released, including the instance slot.
    pub fn new<F>(config: GameConfig, presentation: F) -> Result<Self, GameError>
    where
        F: FnOnce(&GameConfig) -> Result<Presentation, GameError>,
    {
        let instance = InstanceGuard::acquire()?;
        info!("Starting game from {}", config.game_path.display());

        let file_system = FileSystem::new(&config.game_path);
        if !file_system.game_path().is_dir() {
            warn!(
                "Game path {} is not a directory",
                file_system.game_path().display()
            );
        }

        let Presentation {
            mut window,
            mut renderer,
            gui,
        } = presentation(&config)?;
        let camera = Camera::new();
        info!("Presentation ready");

        let assets = match CoreAssets::load(&file_system, &config) {
            Ok(assets) => assets,
            Err(e) => {
                renderer.shutdown();
                window.close();
                return Err(e);
            }
        };
        let CoreAssets {
            mesh_pack,
            landscapes,
            entity_registry,
            script_vm,
            script,
            sky,
            water,
            test_model,
        } = assets;

        info!("Game initialized");
        Ok(Self {
            test_model,
            water,
            sky,
            script,
            script_vm: Some(script_vm),
            entity_registry,
            land_island: None,
            landscapes,
            mesh_pack,
            camera,
            gui,
            renderer,
            window,
            file_system,
            running: true,
            wireframe: config.wireframe,
            water_debug: config.water_debug,
            time_of_day: wrap_hour(config.start_hour),
            elapsed: 0.0,
            bumpmap_strength: DEFAULT_BUMPMAP_STRENGTH,
            small_bumpmap_strength: DEFAULT_SMALL_BUMPMAP_STRENGTH,
            mouse_position: (0, 0),
            intersection: None,
            model_position: Vector3::zero(),
            model_rotation: Vector3::zero(),
            model_scale: Vector3::new(1.0, 1.0, 1.0),
            active_map: None,
            pending_load: None,
            frame_count: 0,
            config,
            _instance: instance,
        })
    }

    /// Parses command line arguments into a configuration, then builds the
    /// game.
    pub fn from_args<I, T, F>(args: I, presentation: F) -> Result<Self, GameError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
        F: FnOnce(&GameConfig) -> Result<Presentation, GameError>,
    {
        let cli = Cli::try_parse_args(args)?;
        Self::new(cli.resolve_config(), presentation)
    }

    /// Loads whatever the configuration names as the first map: a landscape
    /// preview when `start_landscape` is set, otherwise `start_map`.
    pub fn load_start(&mut self) -> Result<(), GameError> {
        match self.config.start_landscape.clone() {
            Some(name) => self.load_landscape(&name),
            None => {
                let name = self.config.start_map.clone();
                self.load_map(&name)
            }
        }
    }

    pub fn try_load_from_file<T>(&self, path: &str) -> Result<Option<T>, AssetError>
    where
        T: LoadFromFile + Default,
    {
        assetloader::try_load_from_file(&self.file_system, path)
    }

    pub fn force_load_from_file<T>(&self, path: &str) -> Result<T, AssetError>
    where
        T: LoadFromFile + Default,
    {
        assetloader::force_load_from_file(&self.file_system, path)
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn window(&self) -> &dyn GameWindow {
        self.window.as_ref()
    }

    pub fn file_system(&self) -> &FileSystem {
        &self.file_system
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn game_path(&self) -> &Path {
        self.file_system.game_path()
    }

    /// Re-roots the file system. The landscape catalog keeps the
    /// availability computed at startup.
    pub fn set_game_path(&mut self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        self.file_system.set_game_path(path);
        self.config.set_game_path(path);
        info!("Game path set to {}", path.display());
    }

    pub fn land_island(&self) -> Option<&LandIsland> {
        self.land_island.as_ref()
    }

    pub fn mesh_pack(&self) -> &MeshPack {
        &self.mesh_pack
    }

    pub fn test_model(&self) -> &SkinnedModel {
        &self.test_model
    }

    pub fn sky(&self) -> &Sky {
        &self.sky
    }

    pub fn water(&self) -> &Water {
        &self.water
    }

    pub fn script(&self) -> &Script {
        &self.script
    }

    /// The active map's VM. Always present while the game is usable.
    pub fn script_vm(&self) -> Option<&ScriptVm> {
        self.script_vm.as_ref()
    }

    pub fn entity_registry(&self) -> &EntityRegistry {
        &self.entity_registry
    }

    pub fn entity_registry_mut(&mut self) -> &mut EntityRegistry {
        &mut self.entity_registry
    }

    pub fn landscapes(&self) -> &LandscapeCatalog {
        &self.landscapes
    }

    pub fn time_of_day(&self) -> f32 {
        self.time_of_day
    }

    pub fn set_time_of_day(&mut self, hour: f32) {
        self.time_of_day = wrap_hour(hour);
    }

    pub fn bumpmap_strength(&self) -> f32 {
        self.bumpmap_strength
    }

    pub fn small_bumpmap_strength(&self) -> f32 {
        self.small_bumpmap_strength
    }

    /// Transform of the debug test model.
    pub fn model_matrix(&self) -> Matrix {
        model_matrix(self.model_position, self.model_rotation, self.model_scale)
    }

    pub fn set_model_transform(&mut self, position: Vector3, rotation: Vector3, scale: Vector3) {
        self.model_position = position;
        self.model_rotation = rotation;
        self.model_scale = scale;
    }

    pub fn is_wireframe(&self) -> bool {
        self.wireframe
    }

    pub fn is_water_debug(&self) -> bool {
        self.water_debug
    }

    pub fn mouse_position(&self) -> (i32, i32) {
        self.mouse_position
    }

    /// Terrain point under the cursor at the last pick.
    pub fn intersection(&self) -> Option<Vector3> {
        self.intersection
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Stops the loop at its next check.
    pub fn quit(&mut self) {
        if self.running {
            info!("Quit requested");
        }
        self.running = false;
    }

    pub fn active_map(&self) -> Option<&str> {
        self.active_map.as_deref()
    }

    pub fn pending_load(&self) -> Option<&LoadRequest> {
        self.pending_load.as_ref()
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Seconds of game time since startup.
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }
}

impl Drop for Game {
    fn drop(&mut self) {
        info!("Shutting down after {} frames", self.frame_count);
        self.pending_load = None;
        self.entity_registry.clear();
        self.script_vm = None;
        self.test_model = SkinnedModel::default();
        self.land_island = None;
        self.renderer.shutdown();
        self.window.close();
        info!("Game shut down");
    }
}
