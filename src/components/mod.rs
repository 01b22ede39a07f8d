//! ECS components for entities.
//!
//! This module groups all component types that can be attached to entities in
//! the entity registry.
//!
//! Submodules overview:
//! - [`entitykind`] – what an entity is, and which mesh draws it
//! - [`transform`] – position, heading and scale on the island
//! - [`wander`] – aimless walking for villagers, animals and creatures

pub mod entitykind;
pub mod transform;
pub mod wander;
