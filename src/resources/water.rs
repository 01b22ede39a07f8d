//! Water surface settings.

use serde::{Deserialize, Serialize};

use crate::error::AssetError;
use crate::resources::assetloader::{LoadFromFile, format_error, read_json};
use crate::resources::filesystem::File;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Water {
    /// Height of the water plane.
    pub level: f32,
    pub color: [u8; 4],
    /// Amplitude of the surface swell drawn by the renderer.
    #[serde(default)]
    pub swell: f32,
}

impl Default for Water {
    fn default() -> Self {
        Self {
            level: 0.0,
            color: [40, 90, 160, 180],
            swell: 0.0,
        }
    }
}

impl LoadFromFile for Water {
    const KIND: &'static str = "water";

    fn load_from_file(&mut self, file: &mut File) -> Result<(), AssetError> {
        let water: Water = read_json(file)?;
        if !water.level.is_finite() || !water.swell.is_finite() || water.swell < 0.0 {
            return Err(format_error(Self::KIND, file, "level and swell must be finite, swell >= 0"));
        }
        *self = water;
        Ok(())
    }
}

impl Water {
    /// Surface height at `time` seconds.
    pub fn surface_level(&self, time: f32) -> f32 {
        self.level + self.swell * time.sin()
    }
}
