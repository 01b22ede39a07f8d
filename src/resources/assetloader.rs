//! Generic asset loading.
//!
//! Every asset kind implements [`LoadFromFile`]. Callers choose between
//! [`try_load_from_file`] for optional assets (absence is a normal outcome)
//! and [`force_load_from_file`] for mandatory ones (absence is an error).

use std::io::BufReader;

use log::{debug, warn};
use serde::de::DeserializeOwned;

use crate::error::AssetError;
use crate::resources::filesystem::{File, FileMode, FileSystem};

/// Capability of populating an asset from an open file.
pub trait LoadFromFile {
    /// Human readable asset kind, used in error messages.
    const KIND: &'static str;

    fn load_from_file(&mut self, file: &mut File) -> Result<(), AssetError>;
}

/// Load an optional asset.
///
/// Returns `Ok(None)` when `path` does not exist. Open and parse failures
/// are still errors.
pub fn try_load_from_file<T>(fs: &FileSystem, path: &str) -> Result<Option<T>, AssetError>
where
    T: LoadFromFile + Default,
{
    if !fs.exists(path) {
        warn!("{} file {} not found", T::KIND, path);
        return Ok(None);
    }

    let mut file = fs.open(path, FileMode::Read)?;
    let mut asset = T::default();
    asset.load_from_file(&mut file)?;
    debug!("Loaded {} from {}", T::KIND, file.path().display());
    Ok(Some(asset))
}

/// Load a mandatory asset; a missing file is [`AssetError::Missing`].
pub fn force_load_from_file<T>(fs: &FileSystem, path: &str) -> Result<T, AssetError>
where
    T: LoadFromFile + Default,
{
    try_load_from_file(fs, path)?.ok_or_else(|| AssetError::Missing {
        path: path.to_string(),
    })
}

/// Deserialize a JSON document from `file`, mapping failures to
/// [`AssetError::Parse`].
pub(crate) fn read_json<D: DeserializeOwned>(file: &mut File) -> Result<D, AssetError> {
    let path = file.path().display().to_string();
    serde_json::from_reader(BufReader::new(file))
        .map_err(|source| AssetError::Parse { path, source })
}

pub(crate) fn format_error(kind: &'static str, file: &File, reason: impl Into<String>) -> AssetError {
    AssetError::Format {
        kind,
        path: file.path().display().to_string(),
        reason: reason.into(),
    }
}
