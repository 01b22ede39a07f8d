//! Commands queued by landscape scripts.
//!
//! Lua functions never touch the engine directly. They push a [`ScriptCmd`]
//! that the game applies once the script call has returned.

use raylib::prelude::Vector3;

use crate::resources::entityregistry::EntitySpawn;

#[derive(Debug, Clone, PartialEq)]
pub enum ScriptCmd {
    /// Use this landscape file for the map being loaded.
    LoadLandscape { path: String },
    /// Spawn an entity on the island.
    CreateEntity(EntitySpawn),
    /// Place the camera at `position` looking at `target`.
    SetCamera { position: Vector3, target: Vector3 },
    /// Set the clock, in hours.
    SetTimeOfDay { hour: f32 },
    /// Switch to another catalog map on the next frame.
    LoadMap { name: String },
    /// Stop the game loop.
    Quit,
}

/// Read-only game state visible to scripts through the `engine` queries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScriptWorldSnapshot {
    pub time_of_day: f32,
    pub entity_count: usize,
    /// Last terrain point picked with the mouse.
    pub cursor: Option<[f32; 3]>,
    pub active_map: Option<String>,
}
