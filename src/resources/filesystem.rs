//! Game installation file system.
//!
//! All asset and script paths used by the engine are relative to the game
//! installation directory. Data files shipped for the original game come
//! from a case-insensitive file system and use backslash separators, so path
//! resolution falls back to a component-wise case-insensitive search when the
//! exact path does not exist.

use std::fs;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Component, Path, PathBuf};

use log::trace;

use crate::error::FileError;

/// How a [`File`] is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileMode {
    Read,
    /// Create or truncate.
    Write,
    /// Create or append.
    Append,
}

/// An open file inside the game installation.
///
/// The handle is closed when the value is dropped, on every exit path.
#[derive(Debug)]
pub struct File {
    path: PathBuf,
    inner: fs::File,
}

impl File {
    /// Resolved on-disk path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File size in bytes.
    pub fn size(&self) -> Result<u64, FileError> {
        self.inner
            .metadata()
            .map(|m| m.len())
            .map_err(|source| FileError::Access {
                path: self.path.clone(),
                source,
            })
    }

    /// Read the remaining contents as bytes.
    pub fn read_all(&mut self) -> Result<Vec<u8>, FileError> {
        let mut buf = Vec::new();
        self.inner
            .read_to_end(&mut buf)
            .map_err(|source| FileError::Access {
                path: self.path.clone(),
                source,
            })?;
        Ok(buf)
    }

    /// Read the remaining contents as UTF-8 text.
    pub fn read_all_string(&mut self) -> Result<String, FileError> {
        let mut text = String::new();
        self.inner
            .read_to_string(&mut text)
            .map_err(|source| FileError::Access {
                path: self.path.clone(),
                source,
            })?;
        Ok(text)
    }
}

impl Read for File {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl Write for File {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

impl Seek for File {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.inner.seek(pos)
    }
}

/// File system rooted at the game installation path.
#[derive(Debug, Clone)]
pub struct FileSystem {
    game_path: PathBuf,
}

impl FileSystem {
    pub fn new(game_path: impl Into<PathBuf>) -> Self {
        Self {
            game_path: game_path.into(),
        }
    }

    pub fn game_path(&self) -> &Path {
        &self.game_path
    }

    pub fn set_game_path(&mut self, game_path: impl Into<PathBuf>) {
        self.game_path = game_path.into();
    }

    /// Resolve `path` to an existing on-disk path.
    ///
    /// Absolute paths are used as-is. Relative paths are joined to the game
    /// path; when that fails each component is matched case-insensitively.
    pub fn find_path(&self, path: impl AsRef<Path>) -> Option<PathBuf> {
        let normalized = normalize_separators(path.as_ref());
        if normalized.is_absolute() {
            return normalized.exists().then_some(normalized);
        }

        let direct = self.game_path.join(&normalized);
        if direct.exists() {
            return Some(direct);
        }

        let mut current = self.game_path.clone();
        for component in normalized.components() {
            match component {
                Component::Normal(name) => {
                    let candidate = current.join(name);
                    if candidate.exists() {
                        current = candidate;
                        continue;
                    }
                    let wanted = name.to_string_lossy();
                    let entry = fs::read_dir(&current).ok()?.flatten().find(|entry| {
                        entry
                            .file_name()
                            .to_string_lossy()
                            .eq_ignore_ascii_case(&wanted)
                    })?;
                    current = entry.path();
                }
                Component::CurDir => {}
                Component::ParentDir => current = current.parent()?.to_path_buf(),
                Component::RootDir | Component::Prefix(_) => return None,
            }
        }
        trace!("Resolved {:?} case-insensitively to {:?}", path.as_ref(), current);
        Some(current)
    }

    /// Whether `path` names an existing regular file.
    pub fn exists(&self, path: impl AsRef<Path>) -> bool {
        self.find_path(path).is_some_and(|p| p.is_file())
    }

    /// Open a file in the installation.
    ///
    /// Reading requires the file to exist. Writing and appending create it
    /// (and its parent directories) when missing.
    pub fn open(&self, path: impl AsRef<Path>, mode: FileMode) -> Result<File, FileError> {
        let path = path.as_ref();
        let resolved = match (self.find_path(path), mode) {
            (Some(found), _) => found,
            (None, FileMode::Read) => return Err(FileError::NotFound(path.to_path_buf())),
            (None, _) => {
                let target = self.game_path.join(normalize_separators(path));
                if let Some(parent) = target.parent() {
                    fs::create_dir_all(parent).map_err(|source| FileError::Access {
                        path: target.clone(),
                        source,
                    })?;
                }
                target
            }
        };

        let mut options = fs::OpenOptions::new();
        match mode {
            FileMode::Read => options.read(true),
            FileMode::Write => options.write(true).create(true).truncate(true),
            FileMode::Append => options.append(true).create(true),
        };

        let inner = options.open(&resolved).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                FileError::NotFound(resolved.clone())
            } else {
                FileError::Access {
                    path: resolved.clone(),
                    source,
                }
            }
        })?;

        Ok(File {
            path: resolved,
            inner,
        })
    }

    /// Convenience wrapper: open for reading and return the whole text.
    pub fn read_to_string(&self, path: impl AsRef<Path>) -> Result<String, FileError> {
        self.open(path, FileMode::Read)?.read_all_string()
    }
}

fn normalize_separators(path: &Path) -> PathBuf {
    let text = path.to_string_lossy();
    if text.contains('\\') {
        PathBuf::from(text.replace('\\', "/"))
    } else {
        path.to_path_buf()
    }
}
