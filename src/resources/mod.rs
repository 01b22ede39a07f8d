//! Long-lived engine state and the assets it loads.
//!
//! Overview
//! - `assetloader` – `LoadFromFile` protocol with try/force loading
//! - `camera` – orbit camera and mouse picking rays
//! - `entityregistry` – live entities in a private ECS world
//! - `filesystem` – file access rooted at the game installation
//! - `gameconfig` – INI configuration
//! - `landisland` – terrain heightmap
//! - `landscape` – catalog of playable maps
//! - `meshpack` – meshes drawn for entities
//! - `script` / `scriptvm` – landscape scripts and the Lua state they run in
//! - `skinnedmodel` – bone hierarchy of the debug test model
//! - `sky` / `water` – sky colours over the day and the water plane
//! - `worldtime` – simulation time and delta
pub mod assetloader;
pub mod camera;
pub mod entityregistry;
pub mod filesystem;
pub mod gameconfig;
pub mod landisland;
pub mod landscape;
pub mod meshpack;
pub mod script;
pub mod scriptvm;
pub mod skinnedmodel;
pub mod sky;
pub mod water;
pub mod worldtime;
