//! Engine systems.
//!
//! Systems run inside the entity registry's world.
//!
//! Submodules overview
//! - [`movement`] – wandering entities and keeping them on the terrain
//! - [`time`] – update simulation time and delta

pub mod movement;
pub mod time;
