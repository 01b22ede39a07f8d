//! Game configuration.
//!
//! Manages settings loaded from an INI configuration file. Provides defaults
//! for safe startup and methods to load/save configuration. Command line
//! arguments are applied on top, see [`crate::cli`].
//!
//! # Configuration File Format
//!
//! ```ini
//! [game]
//! path = /opt/games/island
//! start_map = Land 1
//!
//! [window]
//! width = 1280
//! height = 720
//! fullscreen = false
//! vsync = true
//! target_fps = 60
//!
//! [debug]
//! wireframe = false
//! water_debug = false
//!
//! [time]
//! day_length_seconds = 600
//! start_hour = 12
//!
//! [landscapes]
//! My Island = Data/Landscape/Mine.json, Scripts/Mine.lua
//! ```

use configparser::ini::Ini;
use log::info;
use std::path::PathBuf;

use crate::resources::landscape::{LandscapeDef, default_landscapes};
use crate::resources::sky::wrap_hour;

/// Default safe values for startup
const DEFAULT_GAME_PATH: &str = "./game";
const DEFAULT_START_MAP: &str = "Land 1";
const DEFAULT_WINDOW_WIDTH: u32 = 1280;
const DEFAULT_WINDOW_HEIGHT: u32 = 720;
const DEFAULT_TARGET_FPS: u32 = 60;
const DEFAULT_VSYNC: bool = true;
const DEFAULT_FULLSCREEN: bool = false;
const DEFAULT_DAY_LENGTH_SECONDS: f32 = 600.0;
const DEFAULT_START_HOUR: f32 = 12.0;
const DEFAULT_CONFIG_PATH: &str = "./config.ini";

/// Game configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct GameConfig {
    /// Root of the game installation; all asset paths are relative to it.
    pub game_path: PathBuf,
    /// Map loaded when the game starts.
    pub start_map: String,
    /// Landscape previewed instead of a map, when set.
    pub start_landscape: Option<String>,
    /// Window width in pixels.
    pub window_width: u32,
    /// Window height in pixels.
    pub window_height: u32,
    /// Target frames per second.
    pub target_fps: u32,
    /// Enable vertical sync.
    pub vsync: bool,
    /// Start in fullscreen mode.
    pub fullscreen: bool,
    pub wireframe: bool,
    pub water_debug: bool,
    /// Real seconds for a full 24 hour day.
    pub day_length_seconds: f32,
    pub start_hour: f32,
    /// Extra or replacement catalog entries from the `[landscapes]` section.
    pub landscapes: Vec<LandscapeDef>,
    /// Path to the configuration file.
    pub config_path: PathBuf,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl GameConfig {
    /// Create a new configuration with safe default values.
    pub fn new() -> Self {
        Self {
            game_path: PathBuf::from(DEFAULT_GAME_PATH),
            start_map: DEFAULT_START_MAP.to_string(),
            start_landscape: None,
            window_width: DEFAULT_WINDOW_WIDTH,
            window_height: DEFAULT_WINDOW_HEIGHT,
            target_fps: DEFAULT_TARGET_FPS,
            vsync: DEFAULT_VSYNC,
            fullscreen: DEFAULT_FULLSCREEN,
            wireframe: false,
            water_debug: false,
            day_length_seconds: DEFAULT_DAY_LENGTH_SECONDS,
            start_hour: DEFAULT_START_HOUR,
            landscapes: Vec::new(),
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }

    /// Create a new configuration with a custom config file path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            ..Self::new()
        }
    }

    /// Load configuration from the INI file.
    ///
    /// Missing values retain their current (default) values.
    /// Returns an error if the file cannot be read or parsed; `self` is
    /// only changed when the whole file is valid.
    pub fn load_from_file(&mut self) -> Result<(), String> {
        let mut config = Ini::new_cs();
        config
            .load(&self.config_path)
            .map_err(|e| format!("Failed to load config file: {}", e))?;

        let mut loaded = self.clone();
        loaded.apply_ini(&config)?;
        *self = loaded;

        info!(
            "Loaded config: game path {:?}, {}x{} window, fps={}, vsync={}, fullscreen={}, {} custom landscapes",
            self.game_path,
            self.window_width,
            self.window_height,
            self.target_fps,
            self.vsync,
            self.fullscreen,
            self.landscapes.len()
        );

        Ok(())
    }

    fn apply_ini(&mut self, config: &Ini) -> Result<(), String> {
        // [game] section
        if let Some(path) = config.get("game", "path").filter(|p| !p.is_empty()) {
            self.game_path = PathBuf::from(path);
        }
        if let Some(map) = config.get("game", "start_map").filter(|m| !m.is_empty()) {
            self.start_map = map;
        }

        // [window] section
        if let Some(width) = config.getuint("window", "width").ok().flatten() {
            self.window_width = width as u32;
        }
        if let Some(height) = config.getuint("window", "height").ok().flatten() {
            self.window_height = height as u32;
        }
        if let Some(fps) = config.getuint("window", "target_fps").ok().flatten() {
            self.target_fps = fps as u32;
        }
        if let Some(vsync) = config.getbool("window", "vsync").ok().flatten() {
            self.vsync = vsync;
        }
        if let Some(fullscreen) = config.getbool("window", "fullscreen").ok().flatten() {
            self.fullscreen = fullscreen;
        }

        // [debug] section
        if let Some(wireframe) = config.getbool("debug", "wireframe").ok().flatten() {
            self.wireframe = wireframe;
        }
        if let Some(water_debug) = config.getbool("debug", "water_debug").ok().flatten() {
            self.water_debug = water_debug;
        }

        // [time] section
        if let Some(length) = config.getfloat("time", "day_length_seconds").ok().flatten() {
            if length > 0.0 {
                self.day_length_seconds = length as f32;
            }
        }
        if let Some(hour) = config.getfloat("time", "start_hour").ok().flatten().filter(|h| h.is_finite()) {
            self.start_hour = wrap_hour(hour as f32);
        }

        // [landscapes] section
        if let Some(section) = config.get_map_ref().get("landscapes") {
            let mut names: Vec<&String> = section.keys().collect();
            names.sort();
            for name in names {
                let Some(value) = section.get(name).cloned().flatten() else {
                    continue;
                };
                match parse_landscape_value(&value) {
                    Some((land, script)) => {
                        self.landscapes
                            .retain(|def| &def.name != name);
                        self.landscapes.push(LandscapeDef::new(name.clone(), land, script));
                    }
                    None => {
                        return Err(format!(
                            "Invalid landscape entry '{}': expected '<landscape file>, <script file>'",
                            name
                        ));
                    }
                }
            }
        }

        Ok(())
    }

    /// Save configuration to the INI file.
    ///
    /// Creates the file if it doesn't exist.
    pub fn save_to_file(&self) -> Result<(), String> {
        let mut config = Ini::new_cs();

        // [game] section
        config.set("game", "path", Some(self.game_path.display().to_string()));
        config.set("game", "start_map", Some(self.start_map.clone()));

        // [window] section
        config.set("window", "width", Some(self.window_width.to_string()));
        config.set("window", "height", Some(self.window_height.to_string()));
        config.set("window", "target_fps", Some(self.target_fps.to_string()));
        config.set("window", "vsync", Some(self.vsync.to_string()));
        config.set("window", "fullscreen", Some(self.fullscreen.to_string()));

        // [debug] section
        config.set("debug", "wireframe", Some(self.wireframe.to_string()));
        config.set("debug", "water_debug", Some(self.water_debug.to_string()));

        // [time] section
        config.set("time", "day_length_seconds", Some(self.day_length_seconds.to_string()));
        config.set("time", "start_hour", Some(self.start_hour.to_string()));

        // [landscapes] section
        for def in &self.landscapes {
            config.set(
                "landscapes",
                &def.name,
                Some(format!("{}, {}", def.landscape_file, def.script_file)),
            );
        }

        config
            .write(&self.config_path)
            .map_err(|e| format!("Failed to save config file: {}", e))?;

        info!("Saved config to {:?}", self.config_path);

        Ok(())
    }

    /// Set the game installation path.
    pub fn set_game_path(&mut self, path: impl Into<PathBuf>) {
        self.game_path = path.into();
    }

    /// Get the window size.
    pub fn window_size(&self) -> (u32, u32) {
        (self.window_width, self.window_height)
    }

    /// Built-in landscapes followed by the configured ones.
    pub fn landscape_defs(&self) -> Vec<LandscapeDef> {
        let mut defs = default_landscapes();
        defs.extend(self.landscapes.iter().cloned());
        defs
    }
}

fn parse_landscape_value(value: &str) -> Option<(String, String)> {
    let (land, script) = value.split_once(',')?;
    let (land, script) = (land.trim(), script.trim());
    if land.is_empty() || script.is_empty() {
        return None;
    }
    Some((land.to_string(), script.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(contents: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.ini");
        std::fs::write(&path, contents).unwrap();
        (dir, path)
    }

    #[test]
    fn missing_file_is_an_error_and_keeps_defaults() {
        let mut config = GameConfig::with_path("/no/such/config.ini");
        assert!(config.load_from_file().is_err());
        assert_eq!(config.window_size(), (DEFAULT_WINDOW_WIDTH, DEFAULT_WINDOW_HEIGHT));
        assert_eq!(config.start_map, "Land 1");
    }

    #[test]
    fn loads_sections() {
        let (_dir, path) = write_config(
            "[game]\npath = /opt/island\nstart_map = Land 3\n\
             [window]\nwidth = 800\nheight = 600\nvsync = false\n\
             [debug]\nwireframe = true\n\
             [time]\nday_length_seconds = 120\nstart_hour = 30\n",
        );
        let mut config = GameConfig::with_path(&path);
        config.load_from_file().unwrap();
        assert_eq!(config.game_path, PathBuf::from("/opt/island"));
        assert_eq!(config.start_map, "Land 3");
        assert_eq!(config.window_size(), (800, 600));
        assert!(!config.vsync);
        assert!(config.wireframe);
        assert_eq!(config.day_length_seconds, 120.0);
        assert_eq!(config.start_hour, 6.0);
    }

    #[test]
    fn landscape_section_keeps_case_and_spaces() {
        let (_dir, path) = write_config(
            "[landscapes]\nMy Island = Data/Landscape/Mine.json, Scripts/Mine.lua\n",
        );
        let mut config = GameConfig::with_path(&path);
        config.load_from_file().unwrap();
        assert_eq!(
            config.landscapes,
            vec![LandscapeDef::new(
                "My Island",
                "Data/Landscape/Mine.json",
                "Scripts/Mine.lua"
            )]
        );
        let defs = config.landscape_defs();
        assert_eq!(defs.last().unwrap().name, "My Island");
    }

    #[test]
    fn malformed_landscape_entry_is_rejected() {
        let (_dir, path) = write_config(
            "[game]\nstart_map = Land 3\n\
             [window]\nwidth = 640\n\
             [time]\nstart_hour = 5\n\
             [landscapes]\nBroken = only_one_file.json\n",
        );
        let mut config = GameConfig::with_path(&path);
        assert!(config.load_from_file().is_err());
        // nothing from the file is kept
        assert_eq!(config, GameConfig::with_path(&path));
    }

    #[test]
    fn save_then_load_preserves_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.ini");
        let mut config = GameConfig::with_path(&path);
        config.set_game_path("/srv/game");
        config.start_map = "Two God".into();
        config.target_fps = 30;
        config.water_debug = true;
        config.landscapes.push(LandscapeDef::new("Extra", "x.json", "x.lua"));
        config.save_to_file().unwrap();

        let mut loaded = GameConfig::with_path(&path);
        loaded.load_from_file().unwrap();
        assert_eq!(loaded, config);
    }
}
