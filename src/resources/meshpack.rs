//! Mesh pack: the catalogue of meshes used to draw world entities.
//!
//! Entities refer to meshes by index. The renderer draws each mesh as a box
//! of the configured `size` and `color`.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::AssetError;
use crate::resources::assetloader::{LoadFromFile, format_error, read_json};
use crate::resources::filesystem::File;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshDef {
    pub name: String,
    /// Bounding size along X, Y and Z.
    pub size: [f32; 3],
    #[serde(default = "default_color")]
    pub color: [u8; 3],
}

fn default_color() -> [u8; 3] {
    [200, 200, 200]
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MeshPack {
    pub meshes: Vec<MeshDef>,
    #[serde(skip)]
    by_name: FxHashMap<String, usize>,
}

impl PartialEq for MeshPack {
    fn eq(&self, other: &Self) -> bool {
        self.meshes == other.meshes
    }
}

impl LoadFromFile for MeshPack {
    const KIND: &'static str = "mesh pack";

    fn load_from_file(&mut self, file: &mut File) -> Result<(), AssetError> {
        let mut pack: MeshPack = read_json(file)?;
        if pack.meshes.is_empty() {
            return Err(format_error(Self::KIND, file, "no meshes"));
        }
        for (index, mesh) in pack.meshes.iter().enumerate() {
            if mesh.name.is_empty() {
                return Err(format_error(Self::KIND, file, format!("mesh {index} has no name")));
            }
            if mesh.size.iter().any(|s| !(s.is_finite() && *s > 0.0)) {
                return Err(format_error(
                    Self::KIND,
                    file,
                    format!("mesh {} has a non-positive size", mesh.name),
                ));
            }
            if pack.by_name.insert(mesh.name.clone(), index).is_some() {
                return Err(format_error(
                    Self::KIND,
                    file,
                    format!("duplicate mesh name {}", mesh.name),
                ));
            }
        }
        *self = pack;
        Ok(())
    }
}

impl MeshPack {
    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&MeshDef> {
        self.meshes.get(index)
    }

    /// Index of the mesh called `name`.
    pub fn find(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }
}
