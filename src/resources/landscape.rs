//! Landscape catalog.
//!
//! The catalog is the list of selectable landscapes built once at startup.
//! Each [`LandscapeEntry`] records whether both of its files were present
//! when the catalog was built; this snapshot is never refreshed.

use log::{info, warn};
use rustc_hash::FxHashMap;

use crate::error::GameError;
use crate::resources::filesystem::FileSystem;

/// Names and paths of a landscape before existence is checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LandscapeDef {
    pub name: String,
    pub landscape_file: String,
    pub script_file: String,
}

impl LandscapeDef {
    pub fn new(
        name: impl Into<String>,
        landscape_file: impl Into<String>,
        script_file: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            landscape_file: landscape_file.into(),
            script_file: script_file.into(),
        }
    }
}

/// Landscapes shipped with the game.
pub fn default_landscapes() -> Vec<LandscapeDef> {
    let mut defs: Vec<LandscapeDef> = (1..=5)
        .map(|n| {
            LandscapeDef::new(
                format!("Land {n}"),
                format!("Data/Landscape/Land{n}.json"),
                format!("Scripts/Land{n}.lua"),
            )
        })
        .collect();
    for (name, stem) in [
        ("Two God", "TwoGod"),
        ("Three God", "ThreeGod"),
        ("Four God", "FourGod"),
    ] {
        defs.push(LandscapeDef::new(
            name,
            format!("Data/Landscape/MultiPlayer/{stem}.json"),
            format!("Scripts/MultiPlayer/{stem}.lua"),
        ));
    }
    defs
}

/// One selectable landscape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LandscapeEntry {
    name: String,
    landscape_file: String,
    script_file: String,
    files_exist: bool,
}

impl LandscapeEntry {
    /// Build an entry, checking both files against `fs` once.
    pub fn new(
        name: impl Into<String>,
        landscape_file: impl Into<String>,
        script_file: impl Into<String>,
        fs: &FileSystem,
    ) -> Self {
        let landscape_file = landscape_file.into();
        let script_file = script_file.into();
        let files_exist = fs.exists(&landscape_file) && fs.exists(&script_file);
        Self {
            name: name.into(),
            landscape_file,
            script_file,
            files_exist,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn landscape_file(&self) -> &str {
        &self.landscape_file
    }

    pub fn script_file(&self) -> &str {
        &self.script_file
    }

    /// Whether both files existed when the entry was built.
    pub fn files_exist(&self) -> bool {
        self.files_exist
    }
}

/// All landscapes known to the game, in definition order.
#[derive(Debug, Clone, Default)]
pub struct LandscapeCatalog {
    entries: Vec<LandscapeEntry>,
    by_name: FxHashMap<String, usize>,
}

impl LandscapeCatalog {
    /// Build the catalog. A later definition with an existing name replaces
    /// the earlier one in place.
    pub fn build(fs: &FileSystem, defs: &[LandscapeDef]) -> Self {
        let mut catalog = Self::default();
        for def in defs {
            let entry = LandscapeEntry::new(&def.name, &def.landscape_file, &def.script_file, fs);
            if entry.files_exist() {
                info!("Landscape '{}' available", entry.name());
            } else {
                warn!(
                    "Landscape '{}' incomplete ({} / {})",
                    entry.name(),
                    entry.landscape_file(),
                    entry.script_file()
                );
            }
            match catalog.by_name.get(&def.name) {
                Some(&index) => catalog.entries[index] = entry,
                None => {
                    catalog.by_name.insert(def.name.clone(), catalog.entries.len());
                    catalog.entries.push(entry);
                }
            }
        }
        catalog
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LandscapeEntry> {
        self.entries.iter()
    }

    pub fn get(&self, name: &str) -> Option<&LandscapeEntry> {
        self.by_name.get(name).map(|&i| &self.entries[i])
    }

    /// Look up a loadable landscape.
    ///
    /// Fails with [`GameError::LandscapeNotFound`] for unknown names and
    /// [`GameError::LandscapeIncomplete`] for entries whose files were
    /// missing when the catalog was built.
    pub fn resolve(&self, name: &str) -> Result<&LandscapeEntry, GameError> {
        let entry = self.get(name).ok_or_else(|| GameError::LandscapeNotFound {
            name: name.to_string(),
        })?;
        if !entry.files_exist() {
            return Err(GameError::LandscapeIncomplete {
                name: name.to_string(),
            });
        }
        Ok(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn install(files: &[&str]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for file in files {
            let path = dir.path().join(file);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, "").unwrap();
        }
        dir
    }

    #[test]
    fn files_exist_requires_both_files() {
        let dir = install(&["land.json", "land.lua", "only_land.json", "only.lua"]);
        let fs = FileSystem::new(dir.path());
        assert!(LandscapeEntry::new("a", "land.json", "land.lua", &fs).files_exist());
        assert!(!LandscapeEntry::new("b", "only_land.json", "missing.lua", &fs).files_exist());
        assert!(!LandscapeEntry::new("c", "missing.json", "only.lua", &fs).files_exist());
    }

    #[test]
    fn files_exist_is_a_snapshot() {
        let dir = install(&["land.json"]);
        let fs = FileSystem::new(dir.path());
        let entry = LandscapeEntry::new("a", "land.json", "land.lua", &fs);
        std::fs::write(dir.path().join("land.lua"), "").unwrap();
        assert!(!entry.files_exist());
    }

    #[test]
    fn resolve_distinguishes_unknown_and_incomplete() {
        let dir = install(&["land.json", "land.lua"]);
        let fs = FileSystem::new(dir.path());
        let catalog = LandscapeCatalog::build(
            &fs,
            &[
                LandscapeDef::new("Good", "land.json", "land.lua"),
                LandscapeDef::new("Broken", "land.json", "nope.lua"),
            ],
        );
        assert!(catalog.resolve("Good").is_ok());
        assert!(matches!(
            catalog.resolve("Broken"),
            Err(GameError::LandscapeIncomplete { .. })
        ));
        assert!(matches!(
            catalog.resolve("Missing"),
            Err(GameError::LandscapeNotFound { .. })
        ));
    }

    #[test]
    fn later_definition_replaces_earlier_in_place() {
        let dir = install(&["a.json", "a.lua", "b.json", "b.lua"]);
        let fs = FileSystem::new(dir.path());
        let catalog = LandscapeCatalog::build(
            &fs,
            &[
                LandscapeDef::new("Land 1", "a.json", "a.lua"),
                LandscapeDef::new("Land 2", "a.json", "a.lua"),
                LandscapeDef::new("Land 1", "b.json", "b.lua"),
            ],
        );
        assert_eq!(catalog.len(), 2);
        let names: Vec<&str> = catalog.iter().map(|e| e.name()).collect();
        assert_eq!(names, ["Land 1", "Land 2"]);
        assert_eq!(catalog.get("Land 1").unwrap().landscape_file(), "b.json");
    }

    #[test]
    fn default_catalog_has_campaign_and_multiplayer_lands() {
        let defs = default_landscapes();
        assert_eq!(defs.len(), 8);
        assert_eq!(defs[0].name, "Land 1");
        assert_eq!(defs[0].script_file, "Scripts/Land1.lua");
        assert_eq!(defs[7].name, "Four God");
    }
}
