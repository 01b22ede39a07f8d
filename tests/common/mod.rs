//! Shared helpers for integration tests: a throwaway game installation on
//! disk and presentation fakes that record what the game asked of them.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::{Mutex, MutexGuard};

use raylib::prelude::Vector3;

use islandcore::error::GameError;
use islandcore::game::Game;
use islandcore::platform::{
    DebugGui, DebugGuiState, FrameInput, GameWindow, Presentation, Renderer, SceneView,
};
use islandcore::resources::entityregistry::EntityView;
use islandcore::resources::gameconfig::GameConfig;

static GAME_LOCK: Mutex<()> = Mutex::new(());

/// Only one game may live per process; tests that build one hold this.
pub fn lock() -> MutexGuard<'static, ()> {
    GAME_LOCK.lock().unwrap_or_else(|e| e.into_inner())
}

pub const MESHES: &str = r#"{
  "meshes": [
    { "name": "abode", "size": [4, 3, 4], "color": [180, 120, 80] },
    { "name": "tree", "size": [1, 6, 1], "color": [30, 140, 40] },
    { "name": "villager", "size": [0.5, 1.8, 0.5] }
  ]
}"#;

/// Flat `size` x `size` grid at `height`, 10 units per cell.
pub fn flat_land(size: u32, height: f32) -> String {
    let heights = vec![height.to_string(); (size * size) as usize].join(", ");
    format!(
        r#"{{ "width": {size}, "depth": {size}, "cell_size": 10.0, "sea_level": 0.0, "heights": [{heights}] }}"#
    )
}

/// A game installation in a temporary directory.
pub struct Install {
    pub dir: tempfile::TempDir,
}

impl Install {
    /// Installation with a mesh pack and nothing else.
    pub fn new() -> Self {
        let install = Self {
            dir: tempfile::tempdir().expect("tempdir"),
        };
        install.write("Data/AllMeshes.json", MESHES);
        install
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn write(&self, path: &str, contents: &str) -> &Self {
        let full = self.dir.path().join(path);
        std::fs::create_dir_all(full.parent().expect("parent")).expect("create dirs");
        std::fs::write(full, contents).expect("write file");
        self
    }

    /// Writes `Land{n}` with a flat terrain at `height` and the given script.
    pub fn land(&self, n: u32, height: f32, script: &str) -> &Self {
        self.write(&format!("Data/Landscape/Land{n}.json"), &flat_land(8, height));
        self.write(&format!("Scripts/Land{n}.lua"), script)
    }

    pub fn config(&self) -> GameConfig {
        GameConfig {
            game_path: self.path().to_path_buf(),
            config_path: self.path().join("config.ini"),
            day_length_seconds: 240.0,
            start_hour: 12.0,
            ..GameConfig::new()
        }
    }
}

/// What the fakes saw, shared with the test body.
#[derive(Default)]
pub struct Recorder {
    pub events: Vec<String>,
    /// Entities handed to the renderer, one entry per rendered frame.
    pub frames: Vec<Vec<EntityView>>,
    /// Whether a terrain was present in each rendered frame.
    pub land_present: Vec<bool>,
    pub times_of_day: Vec<f32>,
    pub camera_focus: Vec<Vector3>,
    pub gui_states: Vec<DebugGuiState>,
}

pub type Shared = Rc<RefCell<Recorder>>;

pub struct FakeWindow {
    pub recorder: Shared,
    pub inputs: VecDeque<FrameInput>,
    pub dt: f32,
}

impl GameWindow for FakeWindow {
    fn poll_events(&mut self) -> FrameInput {
        self.recorder.borrow_mut().events.push("poll".into());
        self.inputs.pop_front().unwrap_or(FrameInput {
            dt: self.dt,
            ..FrameInput::default()
        })
    }

    fn size(&self) -> (i32, i32) {
        (800, 600)
    }

    fn close(&mut self) {
        self.recorder.borrow_mut().events.push("window closed".into());
    }
}

pub struct FakeRenderer {
    pub recorder: Shared,
    pub fail_at: Option<usize>,
    /// File whose presence is recorded when the renderer shuts down.
    pub watch: Option<PathBuf>,
}

impl Renderer for FakeRenderer {
    fn render(&mut self, scene: &SceneView<'_>) -> Result<(), GameError> {
        let mut rec = self.recorder.borrow_mut();
        if self.fail_at == Some(rec.frames.len()) {
            return Err(GameError::Window("device lost".into()));
        }
        rec.events.push("render".into());
        rec.frames.push(scene.entities.to_vec());
        rec.land_present.push(scene.land.is_some());
        rec.times_of_day.push(scene.time_of_day);
        rec.camera_focus.push(scene.camera.focus);
        Ok(())
    }

    fn shutdown(&mut self) {
        let mut rec = self.recorder.borrow_mut();
        if let Some(path) = &self.watch {
            rec.events.push(format!("watched file present: {}", path.exists()));
        }
        rec.events.push("renderer shutdown".into());
    }
}

pub type GuiAction = Box<dyn FnMut(&mut DebugGuiState)>;

pub struct FakeGui {
    pub recorder: Shared,
    /// One action per frame, in order; frames beyond the list do nothing.
    pub actions: VecDeque<GuiAction>,
}

impl DebugGui for FakeGui {
    fn run(&mut self, state: &mut DebugGuiState) {
        if let Some(mut action) = self.actions.pop_front() {
            action(state);
        }
        let mut rec = self.recorder.borrow_mut();
        rec.events.push("gui".into());
        rec.gui_states.push(state.clone());
    }
}

/// Presentation fakes and the recorder they share.
pub struct Fakes {
    pub recorder: Shared,
    pub inputs: Vec<FrameInput>,
    pub gui_actions: Vec<GuiAction>,
    pub fail_render_at: Option<usize>,
    pub watch: Option<PathBuf>,
    pub dt: f32,
}

impl Fakes {
    pub fn new() -> Self {
        Self {
            recorder: Rc::new(RefCell::new(Recorder::default())),
            inputs: Vec::new(),
            gui_actions: Vec::new(),
            fail_render_at: None,
            watch: None,
            dt: 0.1,
        }
    }

    pub fn presentation(self) -> Presentation {
        Presentation::new(
            FakeWindow {
                recorder: self.recorder.clone(),
                inputs: self.inputs.into(),
                dt: self.dt,
            },
            FakeRenderer {
                recorder: self.recorder.clone(),
                fail_at: self.fail_render_at,
                watch: self.watch,
            },
            FakeGui {
                recorder: self.recorder,
                actions: self.gui_actions.into(),
            },
        )
    }
}

/// Builds a game on `install` with default fakes. Returns the recorder too.
pub fn start(install: &Install) -> Result<(Game, Shared), GameError> {
    start_with(install, Fakes::new())
}

pub fn start_with(install: &Install, fakes: Fakes) -> Result<(Game, Shared), GameError> {
    let recorder = fakes.recorder.clone();
    let game = Game::new(install.config(), move |_| Ok(fakes.presentation()))?;
    Ok((game, recorder))
}

pub fn input(dt: f32) -> FrameInput {
    FrameInput {
        dt,
        ..FrameInput::default()
    }
}

pub fn quit_input() -> FrameInput {
    FrameInput {
        dt: 0.1,
        quit_requested: true,
        ..FrameInput::default()
    }
}
