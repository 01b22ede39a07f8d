use bevy_ecs::prelude::Component;

/// Aimless walking: move along `heading` and pick a new one when the turn
/// timer runs out.
#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct Wander {
    /// World units per second.
    pub speed: f32,
    /// Radians, measured from +X towards +Z.
    pub heading: f32,
    /// Seconds until the next heading change.
    pub turn_in: f32,
}

impl Wander {
    pub fn new(speed: f32, heading: f32) -> Self {
        Self {
            speed,
            heading,
            turn_in: MIN_TURN_SECONDS,
        }
    }
}

pub const MIN_TURN_SECONDS: f32 = 2.0;
pub const MAX_TURN_SECONDS: f32 = 6.0;
