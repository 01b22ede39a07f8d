//! Entity classification.

use bevy_ecs::prelude::Component;
use serde::{Deserialize, Serialize};

/// What an entity is. Every registry entity carries exactly one kind.
#[derive(Component, Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Abode,
    Tree,
    Feature,
    Field,
    Villager,
    Animal,
    Creature,
}

impl EntityKind {
    /// Mesh used when the spawn request names none.
    pub fn default_mesh(self) -> &'static str {
        match self {
            EntityKind::Abode => "abode",
            EntityKind::Tree => "tree",
            EntityKind::Feature => "feature",
            EntityKind::Field => "field",
            EntityKind::Villager => "villager",
            EntityKind::Animal => "animal",
            EntityKind::Creature => "creature",
        }
    }

    /// Kinds that walk around on their own.
    pub fn is_mobile(self) -> bool {
        matches!(
            self,
            EntityKind::Villager | EntityKind::Animal | EntityKind::Creature
        )
    }

    /// Walking speed in world units per second for mobile kinds.
    pub fn default_speed(self) -> f32 {
        match self {
            EntityKind::Villager => 2.0,
            EntityKind::Animal => 3.0,
            EntityKind::Creature => 4.0,
            _ => 0.0,
        }
    }
}

/// Index into the loaded [`MeshPack`](crate::resources::meshpack::MeshPack).
#[derive(Component, Clone, Copy, Debug, PartialEq, Eq)]
pub struct MeshRef(pub usize);
