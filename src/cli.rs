//! Command-line arguments.
//!
//! CLI values override settings loaded from the configuration file.

use std::ffi::OsString;
use std::path::PathBuf;

use clap::Parser;
use log::warn;

use crate::error::GameError;
use crate::resources::gameconfig::GameConfig;

/// Island Engine
#[derive(Parser, Debug, Default, Clone, PartialEq)]
#[command(version, about = "3D god game engine core")]
pub struct Cli {
    /// Path to the game installation folder.
    #[arg(long, short = 'g', value_name = "PATH")]
    pub game_path: Option<PathBuf>,

    /// Configuration file (default: ./config.ini).
    #[arg(long, short = 'c', value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Map to load on startup.
    #[arg(long, value_name = "NAME", conflicts_with = "landscape")]
    pub map: Option<String>,

    /// Preview a landscape on startup without running its script.
    #[arg(long, value_name = "NAME")]
    pub landscape: Option<String>,

    /// Run without a window.
    #[arg(long)]
    pub headless: bool,

    /// Stop after this many frames (headless runs default to 600).
    #[arg(long, value_name = "N")]
    pub frames: Option<u64>,

    /// Write the effective configuration back to the config file.
    #[arg(long)]
    pub write_config: bool,
}

impl Cli {
    /// Parse an argument list, program name first.
    pub fn try_parse_args<I, T>(args: I) -> Result<Self, GameError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        Cli::try_parse_from(args).map_err(|e| GameError::Config(e.to_string()))
    }

    /// Resolve the configuration: file first, then command line overrides.
    ///
    /// A missing config file is not an error; defaults are used.
    pub fn resolve_config(&self) -> GameConfig {
        let mut config = match &self.config {
            Some(path) => GameConfig::with_path(path),
            None => GameConfig::new(),
        };
        if let Err(e) = config.load_from_file() {
            warn!("{}; using defaults", e);
        }
        config.apply_cli_overrides(self);
        config
    }
}

impl GameConfig {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &Cli) {
        if let Some(ref path) = args.game_path {
            self.game_path = path.clone();
        }
        if let Some(ref map) = args.map {
            self.start_map = map.clone();
            self.start_landscape = None;
        }
        if let Some(ref landscape) = args.landscape {
            self.start_landscape = Some(landscape.clone());
        }
    }
}
