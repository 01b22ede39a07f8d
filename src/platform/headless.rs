//! Backend without a window.
//!
//! Runs a fixed number of frames at a fixed timestep, then asks to quit.

use log::{debug, info};

use super::{DebugGui, DebugGuiState, FrameInput, GameWindow, Renderer, SceneView};
use crate::error::GameError;

pub const DEFAULT_FRAMES: u64 = 600;
pub const DEFAULT_DT: f32 = 1.0 / 60.0;

pub struct HeadlessWindow {
    frames: u64,
    remaining: u64,
    dt: f32,
    size: (i32, i32),
    closed: bool,
}

impl HeadlessWindow {
    pub fn new(frames: u64, dt: f32, size: (i32, i32)) -> Self {
        Self {
            frames,
            remaining: frames,
            dt,
            size,
            closed: false,
        }
    }

    pub fn frames_left(&self) -> u64 {
        self.remaining
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl GameWindow for HeadlessWindow {
    fn poll_events(&mut self) -> FrameInput {
        if self.remaining == 0 {
            return FrameInput {
                quit_requested: true,
                ..FrameInput::default()
            };
        }
        self.remaining -= 1;
        FrameInput {
            dt: self.dt,
            quit_requested: self.remaining == 0,
            ..FrameInput::default()
        }
    }

    fn size(&self) -> (i32, i32) {
        self.size
    }

    fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            info!(
                "Headless window closed after {} frames",
                self.frames - self.remaining
            );
        }
    }
}

/// Renderer that draws nothing and counts frames.
#[derive(Debug, Default)]
pub struct NullRenderer {
    frames: u64,
}

impl NullRenderer {
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Renderer for NullRenderer {
    fn render(&mut self, scene: &SceneView<'_>) -> Result<(), GameError> {
        self.frames += 1;
        if self.frames % 300 == 0 {
            debug!(
                "Frame {}: {} entities, {:.1}h",
                self.frames,
                scene.entities.len(),
                scene.time_of_day
            );
        }
        Ok(())
    }

    fn shutdown(&mut self) {
        debug!("Null renderer shut down after {} frames", self.frames);
    }
}

#[derive(Debug, Default)]
pub struct NullGui;

impl DebugGui for NullGui {
    fn run(&mut self, _state: &mut DebugGuiState) {}
}
