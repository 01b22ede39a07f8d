//! Island Core entry point.
//!
//! A 3D god game engine core written in Rust using:
//! - **raylib** for windowing and drawing
//! - **bevy_ecs** for the entity registry
//! - **mlua + LuaJIT** for landscape scripts
//!
//! # Startup
//!
//! 1. Parse the command line and read `config.ini`
//! 2. Open the window (or the headless backend with `--headless`)
//! 3. Build the [`Game`]: file system, mesh pack, landscape catalog, entity
//!    registry, script VM, sky, water and test model
//! 4. Load the start map and run the frame loop until quit
//!
//! # Running
//!
//! ```sh
//! cargo run --release -- --game-path /path/to/installation --map "Land 2"
//! ```

// Do not create console on Windows
#![cfg_attr(target_os = "windows", windows_subsystem = "windows")]

use clap::Parser;

use islandcore::cli::Cli;
use islandcore::game::Game;
use islandcore::platform::Presentation;
use islandcore::platform::headless::{DEFAULT_DT, DEFAULT_FRAMES, HeadlessWindow, NullGui, NullRenderer};
use islandcore::platform::raylib_backend::create_presentation;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = cli.resolve_config();

    if cli.write_config {
        match config.save_to_file() {
            Ok(()) => log::info!("Configuration written to {}", config.config_path.display()),
            Err(e) => {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        }
    }

    let result = if cli.headless {
        let frames = cli.frames.unwrap_or(DEFAULT_FRAMES);
        Game::new(config, |config| {
            let size = config.window_size();
            Ok(Presentation::new(
                HeadlessWindow::new(frames, DEFAULT_DT, (size.0 as i32, size.1 as i32)),
                NullRenderer::default(),
                NullGui,
            ))
        })
    } else {
        Game::new(config, create_presentation)
    };

    let mut game = match result {
        Ok(game) => game,
        Err(e) => {
            log::error!("Failed to start: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = game.load_start() {
        log::error!("Failed to load start map: {}", e);
        drop(game);
        std::process::exit(1);
    }

    if let Some(frames) = cli.frames.filter(|_| !cli.headless) {
        log::info!("Stopping after {} frames", frames);
        while game.is_running() && game.frame_count() < frames {
            if let Err(e) = game.frame() {
                log::error!("Game stopped: {}", e);
                break;
            }
        }
        return;
    }

    if let Err(e) = game.run() {
        log::error!("Game stopped: {}", e);
        drop(game);
        std::process::exit(1);
    }
}
