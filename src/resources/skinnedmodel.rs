//! Skinned (boned) model used as the debug test model.
//!
//! Only the skeleton is kept: each bone stores its parent and an offset from
//! that parent in rest pose. Parents must be listed before their children.

use raylib::prelude::Vector3;
use serde::{Deserialize, Serialize};

use crate::error::AssetError;
use crate::resources::assetloader::{LoadFromFile, format_error, read_json};
use crate::resources::filesystem::File;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bone {
    pub name: String,
    #[serde(default)]
    pub parent: Option<usize>,
    pub offset: [f32; 3],
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkinnedModel {
    #[serde(default)]
    pub name: String,
    pub bones: Vec<Bone>,
}

impl LoadFromFile for SkinnedModel {
    const KIND: &'static str = "skinned model";

    fn load_from_file(&mut self, file: &mut File) -> Result<(), AssetError> {
        let model: SkinnedModel = read_json(file)?;
        for (index, bone) in model.bones.iter().enumerate() {
            if bone.parent.is_some_and(|parent| parent >= index) {
                return Err(format_error(
                    Self::KIND,
                    file,
                    format!("bone {} references a parent that is not listed before it", bone.name),
                ));
            }
        }
        *self = model;
        Ok(())
    }
}

impl SkinnedModel {
    /// Model-space position of every bone in rest pose.
    pub fn rest_pose(&self) -> Vec<Vector3> {
        let mut positions: Vec<Vector3> = Vec::with_capacity(self.bones.len());
        for bone in &self.bones {
            let offset = Vector3::new(bone.offset[0], bone.offset[1], bone.offset[2]);
            let base = bone
                .parent
                .and_then(|p| positions.get(p).copied())
                .unwrap_or(Vector3::zero());
            positions.push(base + offset);
        }
        positions
    }

    /// Bone segments as `(parent, child)` pairs of rest pose positions.
    pub fn segments(&self) -> Vec<(Vector3, Vector3)> {
        let pose = self.rest_pose();
        self.bones
            .iter()
            .enumerate()
            .filter_map(|(i, bone)| Some((*pose.get(bone.parent?)?, pose[i])))
            .collect()
    }
}
