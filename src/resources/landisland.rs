//! Terrain ("land island") heightfield.
//!
//! A landscape file describes a regular grid of heights sampled every
//! `cell_size` world units, starting at the world origin and extending
//! along +X (`width` samples) and +Z (`depth` samples).
//!
//! # File Format
//!
//! ```json
//! {
//!   "width": 3, "depth": 2, "cell_size": 10.0, "sea_level": 0.0,
//!   "heights": [0, 1, 2,
//!               3, 4, 5]
//! }
//! ```

use raylib::prelude::{Ray, Vector3};
use serde::{Deserialize, Serialize};

use crate::error::AssetError;
use crate::resources::assetloader::{LoadFromFile, format_error, read_json};
use crate::resources::filesystem::File;

/// Bisection steps used to refine a ray/terrain hit.
const REFINE_STEPS: u32 = 24;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LandIsland {
    pub width: u32,
    pub depth: u32,
    pub cell_size: f32,
    #[serde(default)]
    pub sea_level: f32,
    pub heights: Vec<f32>,
}

impl LoadFromFile for LandIsland {
    const KIND: &'static str = "landscape";

    fn load_from_file(&mut self, file: &mut File) -> Result<(), AssetError> {
        let land: LandIsland = read_json(file)?;
        if land.width < 2 || land.depth < 2 {
            return Err(format_error(
                Self::KIND,
                file,
                format!("grid must be at least 2x2, got {}x{}", land.width, land.depth),
            ));
        }
        if land.cell_size <= 0.0 || !land.cell_size.is_finite() {
            return Err(format_error(Self::KIND, file, "cell_size must be positive"));
        }
        let Some(expected) = (land.width as usize).checked_mul(land.depth as usize) else {
            return Err(format_error(
                Self::KIND,
                file,
                format!("grid {}x{} is too large", land.width, land.depth),
            ));
        };
        if land.heights.len() != expected {
            return Err(format_error(
                Self::KIND,
                file,
                format!("expected {} heights, found {}", expected, land.heights.len()),
            ));
        }
        if land.heights.iter().any(|h| !h.is_finite()) {
            return Err(format_error(Self::KIND, file, "heights must be finite"));
        }
        *self = land;
        Ok(())
    }
}

impl LandIsland {
    /// World size along X and Z.
    pub fn extent(&self) -> (f32, f32) {
        (
            self.width.saturating_sub(1) as f32 * self.cell_size,
            self.depth.saturating_sub(1) as f32 * self.cell_size,
        )
    }

    pub fn contains(&self, x: f32, z: f32) -> bool {
        let (ex, ez) = self.extent();
        x >= 0.0 && z >= 0.0 && x <= ex && z <= ez
    }

    /// Height sample at grid coordinates, clamped to the grid.
    pub fn sample(&self, gx: u32, gz: u32) -> f32 {
        if self.heights.is_empty() {
            return 0.0;
        }
        let gx = gx.min(self.width - 1);
        let gz = gz.min(self.depth - 1);
        let index = gz as usize * self.width as usize + gx as usize;
        self.heights.get(index).copied().unwrap_or(0.0)
    }

    /// Bilinear height at world position; positions off the grid are clamped
    /// to its border.
    pub fn height_at(&self, x: f32, z: f32) -> f32 {
        if self.heights.is_empty() || self.cell_size <= 0.0 {
            return 0.0;
        }
        let (ex, ez) = self.extent();
        let fx = x.clamp(0.0, ex) / self.cell_size;
        let fz = z.clamp(0.0, ez) / self.cell_size;
        let gx = (fx.floor() as u32).min(self.width - 2);
        let gz = (fz.floor() as u32).min(self.depth - 2);
        let tx = fx - gx as f32;
        let tz = fz - gz as f32;

        let h00 = self.sample(gx, gz);
        let h10 = self.sample(gx + 1, gz);
        let h01 = self.sample(gx, gz + 1);
        let h11 = self.sample(gx + 1, gz + 1);

        let top = h00 + (h10 - h00) * tx;
        let bottom = h01 + (h11 - h01) * tx;
        top + (bottom - top) * tz
    }

    /// Lowest and highest sample.
    pub fn height_range(&self) -> (f32, f32) {
        self.heights
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &h| {
                (lo.min(h), hi.max(h))
            })
    }

    /// First point where `ray` passes below the terrain surface.
    ///
    /// The ray is marched in half-cell steps; the first crossing is refined
    /// by bisection. Returns `None` for rays that miss the island.
    pub fn intersect_ray(&self, ray: &Ray) -> Option<Vector3> {
        if self.heights.is_empty() || self.cell_size <= 0.0 {
            return None;
        }
        let dir_len = ray.direction.length();
        if dir_len <= f32::EPSILON {
            return None;
        }
        let direction = ray.direction * (1.0 / dir_len);

        let (ex, ez) = self.extent();
        let (lo, hi) = self.height_range();
        let center = Vector3::new(ex * 0.5, (lo + hi) * 0.5, ez * 0.5);
        let diagonal = (ex * ex + ez * ez + (hi - lo) * (hi - lo)).sqrt();
        let max_t = (ray.position - center).length() + diagonal;

        let step = self.cell_size * 0.5;
        let below = |t: f32| {
            let p = ray.position + direction * t;
            self.contains(p.x, p.z) && p.y <= self.height_at(p.x, p.z)
        };

        let mut prev = 0.0;
        let mut t = 0.0;
        while t <= max_t {
            if below(t) {
                if t == 0.0 {
                    let p = ray.position;
                    return Some(Vector3::new(p.x, self.height_at(p.x, p.z), p.z));
                }
                let (mut a, mut b) = (prev, t);
                for _ in 0..REFINE_STEPS {
                    let mid = (a + b) * 0.5;
                    if below(mid) {
                        b = mid;
                    } else {
                        a = mid;
                    }
                }
                let p = ray.position + direction * b;
                return Some(Vector3::new(p.x, self.height_at(p.x, p.z), p.z));
            }
            prev = t;
            t += step;
        }
        None
    }
}
