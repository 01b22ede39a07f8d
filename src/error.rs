//! Error types shared by the engine core.
//!
//! Loading is split into three layers: the file system ([`FileError`]),
//! individual assets ([`AssetError`]) and landscape scripts
//! ([`ScriptError`]). [`GameError`] wraps all of them for the orchestrator.

use std::path::PathBuf;

/// Failures reported by [`FileSystem`](crate::resources::filesystem::FileSystem).
#[derive(Debug, thiserror::Error)]
pub enum FileError {
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    #[error("cannot access {path}: {source}")]
    Access {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failures while loading an asset from the game installation.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    /// A mandatory asset does not exist.
    #[error("could not find file {path}")]
    Missing { path: String },

    #[error(transparent)]
    File(#[from] FileError),

    /// The file exists but is not valid JSON for the asset kind.
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// The file parsed but its contents break an asset invariant.
    #[error("invalid {kind} data in {path}: {reason}")]
    Format {
        kind: &'static str,
        path: String,
        reason: String,
    },
}

/// Failures while running a landscape script.
#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    #[error(transparent)]
    File(#[from] FileError),

    #[error("script error: {0}")]
    Lua(#[from] mlua::Error),
}

/// Top level error returned by [`Game`](crate::game::Game) operations.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error("a game instance is already running in this process")]
    AlreadyRunning,

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Asset(#[from] AssetError),

    #[error("landscape not found: {name}")]
    LandscapeNotFound { name: String },

    #[error("landscape {name} is incomplete (missing landscape or script file)")]
    LandscapeIncomplete { name: String },

    #[error(transparent)]
    Script(#[from] ScriptError),

    #[error("window error: {0}")]
    Window(String),
}
