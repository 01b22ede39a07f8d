//! World transform for 3D entities.

use bevy_ecs::prelude::Component;
use raylib::prelude::{Matrix, Vector3};

/// Position on the island, heading around the Y axis and uniform scale.
#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct Transform3D {
    pub position: Vector3,
    /// Heading in degrees.
    pub rotation: f32,
    pub scale: f32,
}

impl Transform3D {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self {
            position: Vector3::new(x, y, z),
            rotation: 0.0,
            scale: 1.0,
        }
    }

    pub fn with_rotation(mut self, degrees: f32) -> Self {
        self.rotation = degrees;
        self
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }
}

impl Default for Transform3D {
    fn default() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }
}

/// Column-major model matrix `T * Rz * Ry * Rx * S`.
///
/// `rotation` holds Euler angles in degrees around X, Y and Z.
pub fn model_matrix(position: Vector3, rotation: Vector3, scale: Vector3) -> Matrix {
    let (sa, ca) = rotation.x.to_radians().sin_cos();
    let (sb, cb) = rotation.y.to_radians().sin_cos();
    let (sc, cc) = rotation.z.to_radians().sin_cos();

    let r00 = cc * cb;
    let r10 = sc * cb;
    let r20 = -sb;
    let r01 = -sc * ca + cc * sb * sa;
    let r11 = cc * ca + sc * sb * sa;
    let r21 = cb * sa;
    let r02 = sc * sa + cc * sb * ca;
    let r12 = -cc * sa + sc * sb * ca;
    let r22 = cb * ca;

    Matrix {
        m0: r00 * scale.x,
        m1: r10 * scale.x,
        m2: r20 * scale.x,
        m3: 0.0,
        m4: r01 * scale.y,
        m5: r11 * scale.y,
        m6: r21 * scale.y,
        m7: 0.0,
        m8: r02 * scale.z,
        m9: r12 * scale.z,
        m10: r22 * scale.z,
        m11: 0.0,
        m12: position.x,
        m13: position.y,
        m14: position.z,
        m15: 1.0,
    }
}

/// Apply `matrix` to a point.
pub fn transform_point(matrix: &Matrix, p: Vector3) -> Vector3 {
    Vector3::new(
        matrix.m0 * p.x + matrix.m4 * p.y + matrix.m8 * p.z + matrix.m12,
        matrix.m1 * p.x + matrix.m5 * p.y + matrix.m9 * p.z + matrix.m13,
        matrix.m2 * p.x + matrix.m6 * p.y + matrix.m10 * p.z + matrix.m14,
    )
}
