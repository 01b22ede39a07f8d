//! Presentation layer: window, renderer and debug GUI.
//!
//! [`Game`](crate::game::Game) only talks to these traits. Two backends
//! implement them:
//! - [`raylib_backend`] – a real window drawn with raylib
//! - [`headless`] – no window; runs a fixed number of frames (tests, CI,
//!   `--headless`)

pub mod headless;
pub mod raylib_backend;

use raylib::prelude::{Matrix, Vector3};

use crate::error::GameError;
use crate::game::LoadRequest;
use crate::resources::camera::{Camera, CameraInput};
use crate::resources::entityregistry::EntityView;
use crate::resources::landisland::LandIsland;
use crate::resources::meshpack::MeshPack;
use crate::resources::skinnedmodel::SkinnedModel;
use crate::resources::sky::Sky;
use crate::resources::water::Water;

/// Everything the window reported for one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameInput {
    /// Seconds since the previous frame.
    pub dt: f32,
    pub mouse_position: (i32, i32),
    /// Window closed or quit key pressed.
    pub quit_requested: bool,
    /// Pick the terrain under the cursor.
    pub pick_requested: bool,
    pub camera: CameraInput,
}

pub trait GameWindow {
    /// Pumps the platform event queue and reports this frame's input.
    fn poll_events(&mut self) -> FrameInput;
    /// Drawable size in pixels.
    fn size(&self) -> (i32, i32);
    fn close(&mut self);
}

/// Read-only view of the world handed to the renderer each frame.
pub struct SceneView<'a> {
    pub camera: &'a Camera,
    pub land: Option<&'a LandIsland>,
    pub sky: &'a Sky,
    pub water: &'a Water,
    pub meshes: &'a MeshPack,
    pub entities: &'a [EntityView],
    pub test_model: &'a SkinnedModel,
    pub model_matrix: Matrix,
    /// Hours in `[0, 24)`.
    pub time_of_day: f32,
    /// Seconds since the game started.
    pub elapsed: f32,
    pub wireframe: bool,
    pub water_debug: bool,
    pub bumpmap_strength: f32,
    pub small_bumpmap_strength: f32,
    pub intersection: Option<Vector3>,
}

pub trait Renderer {
    fn render(&mut self, scene: &SceneView<'_>) -> Result<(), GameError>;
    /// Releases GPU resources. Called before the window closes.
    fn shutdown(&mut self);
}

/// Debug settings exposed to the GUI pass. The game copies the editable
/// fields back after [`DebugGui::run`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DebugGuiState {
    pub wireframe: bool,
    pub water_debug: bool,
    pub time_of_day: f32,
    pub bumpmap_strength: f32,
    pub small_bumpmap_strength: f32,
    pub model_position: Vector3,
    /// Degrees around X, Y and Z.
    pub model_rotation: Vector3,
    pub model_scale: Vector3,
    pub fps: f32,
    pub mouse_position: (i32, i32),
    pub intersection: Option<Vector3>,
    pub entity_count: usize,
    pub active_map: Option<String>,
    /// Catalog names and whether both of their files exist.
    pub landscapes: Vec<(String, bool)>,
    /// Set by the GUI to load a map or landscape on the next frame.
    pub request: Option<LoadRequest>,
    pub quit: bool,
}

pub trait DebugGui {
    fn run(&mut self, state: &mut DebugGuiState);
}

/// The presentation backends owned by the game.
pub struct Presentation {
    pub window: Box<dyn GameWindow>,
    pub renderer: Box<dyn Renderer>,
    pub gui: Box<dyn DebugGui>,
}

impl Presentation {
    pub fn new(
        window: impl GameWindow + 'static,
        renderer: impl Renderer + 'static,
        gui: impl DebugGui + 'static,
    ) -> Self {
        Self {
            window: Box::new(window),
            renderer: Box::new(renderer),
            gui: Box::new(gui),
        }
    }
}
