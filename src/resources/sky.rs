//! Sky colour over the day.
//!
//! The sky is a set of colour keyframes placed on a 24 hour clock. The
//! colour for any time of day is interpolated between the surrounding
//! keyframes, wrapping from the last keyframe back to the first.

use serde::{Deserialize, Serialize};

use crate::error::AssetError;
use crate::resources::assetloader::{LoadFromFile, format_error, read_json};
use crate::resources::filesystem::File;

pub const HOURS_PER_DAY: f32 = 24.0;

/// Wraps `hour` onto the clock, always landing in `[0, 24)`.
pub fn wrap_hour(hour: f32) -> f32 {
    let wrapped = hour.rem_euclid(HOURS_PER_DAY);
    // tiny negative inputs round up to exactly 24
    if wrapped >= HOURS_PER_DAY { 0.0 } else { wrapped }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SkyKeyframe {
    pub hour: f32,
    pub color: [u8; 3],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sky {
    pub keyframes: Vec<SkyKeyframe>,
}

impl Default for Sky {
    fn default() -> Self {
        Self {
            keyframes: vec![
                SkyKeyframe { hour: 0.0, color: [10, 12, 35] },
                SkyKeyframe { hour: 6.0, color: [230, 140, 90] },
                SkyKeyframe { hour: 12.0, color: [120, 180, 240] },
                SkyKeyframe { hour: 19.0, color: [220, 110, 80] },
            ],
        }
    }
}

impl LoadFromFile for Sky {
    const KIND: &'static str = "sky";

    fn load_from_file(&mut self, file: &mut File) -> Result<(), AssetError> {
        let sky: Sky = read_json(file)?;
        if sky.keyframes.is_empty() {
            return Err(format_error(Self::KIND, file, "no keyframes"));
        }
        if sky
            .keyframes
            .iter()
            .any(|k| !(0.0..HOURS_PER_DAY).contains(&k.hour))
        {
            return Err(format_error(Self::KIND, file, "keyframe hour outside [0, 24)"));
        }
        if sky.keyframes.windows(2).any(|w| w[0].hour >= w[1].hour) {
            return Err(format_error(Self::KIND, file, "keyframes must be sorted by hour"));
        }
        *self = sky;
        Ok(())
    }
}

impl Sky {
    /// Interpolated sky colour at `hour` (any value, wrapped to a day).
    pub fn color_at(&self, hour: f32) -> [u8; 3] {
        let Some(first) = self.keyframes.first() else {
            return [0, 0, 0];
        };
        if self.keyframes.len() == 1 {
            return first.color;
        }
        let hour = wrap_hour(hour);

        let next_index = self
            .keyframes
            .iter()
            .position(|k| k.hour > hour)
            .unwrap_or(0);
        let prev_index = if next_index == 0 {
            self.keyframes.len() - 1
        } else {
            next_index - 1
        };
        let prev = self.keyframes[prev_index];
        let next = self.keyframes[next_index];

        let span = (next.hour - prev.hour).rem_euclid(HOURS_PER_DAY);
        let offset = (hour - prev.hour).rem_euclid(HOURS_PER_DAY);
        let t = if span > 0.0 { offset / span } else { 0.0 };

        let mut out = [0u8; 3];
        for (i, channel) in out.iter_mut().enumerate() {
            let a = prev.color[i] as f32;
            let b = next.color[i] as f32;
            *channel = (a + (b - a) * t).round().clamp(0.0, 255.0) as u8;
        }
        out
    }
}
