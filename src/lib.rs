//! Island Core library.
//!
//! Core of a 3D god game engine: the [`game::Game`] orchestrator and the
//! subsystems it owns, exposed for the executable and integration tests.

pub mod cli;
pub mod components;
pub mod error;
pub mod game;
pub mod platform;
pub mod resources;
pub mod systems;
