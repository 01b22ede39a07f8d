//! Orbit camera.
//!
//! The camera circles a focus point on the island. Yaw and pitch are in
//! radians; pitch and distance are clamped so the view never flips or
//! clips into the ground.

use raylib::prelude::{Camera3D, Ray, Vector3};

pub const MIN_PITCH: f32 = 0.1;
pub const MAX_PITCH: f32 = 1.5;
pub const MIN_DISTANCE: f32 = 10.0;
pub const MAX_DISTANCE: f32 = 2000.0;

/// World units per second at distance 100.
const PAN_SPEED: f32 = 60.0;
/// Radians per second.
const ROTATE_SPEED: f32 = 1.5;
/// Fraction of the distance per wheel step.
const ZOOM_STEP: f32 = 0.1;

/// Camera movement requested by input for one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CameraInput {
    /// Right and forward, each in `[-1, 1]`.
    pub pan: (f32, f32),
    /// Yaw and pitch, each in `[-1, 1]`.
    pub rotate: (f32, f32),
    /// Wheel steps; positive moves closer.
    pub zoom: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub focus: Vector3,
    pub yaw: f32,
    pub pitch: f32,
    pub distance: f32,
    /// Vertical field of view in degrees.
    pub fovy: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            focus: Vector3::new(0.0, 0.0, 0.0),
            yaw: std::f32::consts::FRAC_PI_4,
            pitch: 0.8,
            distance: 300.0,
            fovy: 45.0,
        }
    }
}

impl Camera {
    pub fn new() -> Self {
        Self::default()
    }

    /// Eye position derived from focus, yaw, pitch and distance.
    pub fn position(&self) -> Vector3 {
        let (sin_p, cos_p) = self.pitch.sin_cos();
        let (sin_y, cos_y) = self.yaw.sin_cos();
        Vector3::new(
            self.focus.x + self.distance * cos_p * cos_y,
            self.focus.y + self.distance * sin_p,
            self.focus.z + self.distance * cos_p * sin_y,
        )
    }

    /// Put the eye at `position` and orbit around `target`.
    pub fn look_at(&mut self, position: Vector3, target: Vector3) {
        let offset = position - target;
        let horizontal = (offset.x * offset.x + offset.z * offset.z).sqrt();
        self.focus = target;
        self.distance = offset.length().clamp(MIN_DISTANCE, MAX_DISTANCE);
        self.pitch = offset.y.atan2(horizontal).clamp(MIN_PITCH, MAX_PITCH);
        if horizontal > f32::EPSILON {
            self.yaw = offset.z.atan2(offset.x);
        }
    }

    pub fn update(&mut self, dt: f32, input: &CameraInput) {
        let (sin_y, cos_y) = self.yaw.sin_cos();
        // forward on the ground plane points from the eye towards the focus
        let forward = Vector3::new(-cos_y, 0.0, -sin_y);
        let right = Vector3::new(sin_y, 0.0, -cos_y);
        let pan = PAN_SPEED * dt * self.distance / 100.0;
        self.focus = self.focus + right * (input.pan.0 * pan) + forward * (input.pan.1 * pan);

        self.yaw = (self.yaw + input.rotate.0 * ROTATE_SPEED * dt).rem_euclid(std::f32::consts::TAU);
        self.pitch = (self.pitch + input.rotate.1 * ROTATE_SPEED * dt).clamp(MIN_PITCH, MAX_PITCH);

        if input.zoom != 0.0 {
            let factor = (1.0 - ZOOM_STEP).powf(input.zoom);
            self.distance = (self.distance * factor).clamp(MIN_DISTANCE, MAX_DISTANCE);
        }
    }

    /// raylib camera for 3D drawing.
    pub fn camera3d(&self) -> Camera3D {
        Camera3D::perspective(self.position(), self.focus, Vector3::new(0.0, 1.0, 0.0), self.fovy)
    }

    /// Ray from the eye through the pixel `mouse` of a `viewport` sized
    /// window.
    pub fn screen_ray(&self, mouse: (i32, i32), viewport: (i32, i32)) -> Ray {
        let eye = self.position();
        let forward = normalize(self.focus - eye);
        let right = normalize(cross(forward, Vector3::new(0.0, 1.0, 0.0)));
        let up = cross(right, forward);

        let width = viewport.0.max(1) as f32;
        let height = viewport.1.max(1) as f32;
        let ndc_x = 2.0 * mouse.0 as f32 / width - 1.0;
        let ndc_y = 1.0 - 2.0 * mouse.1 as f32 / height;
        let half = (self.fovy.to_radians() * 0.5).tan();

        let direction =
            normalize(forward + right * (ndc_x * half * width / height) + up * (ndc_y * half));
        Ray {
            position: eye,
            direction,
        }
    }
}

fn cross(a: Vector3, b: Vector3) -> Vector3 {
    Vector3::new(
        a.y * b.z - a.z * b.y,
        a.z * b.x - a.x * b.z,
        a.x * b.y - a.y * b.x,
    )
}

fn normalize(v: Vector3) -> Vector3 {
    let len = v.length();
    if len > f32::EPSILON { v / len } else { v }
}
