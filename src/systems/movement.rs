//! Entity movement.
//!
//! [`wander_movement`] advances walking entities along their heading.
//! [`ground_entities`] runs after the schedule with the active terrain and
//! keeps every entity on the surface and inside the island.

use std::f32::consts::{PI, TAU};

use bevy_ecs::prelude::*;

use crate::components::transform::Transform3D;
use crate::components::wander::{MAX_TURN_SECONDS, MIN_TURN_SECONDS, Wander};
use crate::resources::landisland::LandIsland;
use crate::resources::worldtime::WorldTime;

/// Random source for heading changes.
#[derive(Resource)]
pub struct WanderRng(pub fastrand::Rng);

impl Default for WanderRng {
    fn default() -> Self {
        WanderRng(fastrand::Rng::new())
    }
}

pub fn wander_movement(
    mut query: Query<(&mut Transform3D, &mut Wander)>,
    time: Res<WorldTime>,
    mut rng: ResMut<WanderRng>,
) {
    let dt = time.delta;
    if dt <= 0.0 {
        return;
    }
    for (mut transform, mut wander) in query.iter_mut() {
        let (sin, cos) = wander.heading.sin_cos();
        transform.position.x += cos * wander.speed * dt;
        transform.position.z += sin * wander.speed * dt;
        transform.rotation = -wander.heading.to_degrees();

        wander.turn_in -= dt;
        if wander.turn_in <= 0.0 {
            wander.heading = rng.0.f32() * TAU;
            wander.turn_in =
                MIN_TURN_SECONDS + rng.0.f32() * (MAX_TURN_SECONDS - MIN_TURN_SECONDS);
        }
    }
}

/// Clamp entities to the island and snap them to its surface. Walkers that
/// hit the shore turn around.
pub fn ground_entities(world: &mut World, land: &LandIsland) {
    let (ex, ez) = land.extent();
    let mut query = world.query::<(&mut Transform3D, Option<&mut Wander>)>();
    for (mut transform, wander) in query.iter_mut(world) {
        let x = transform.position.x;
        let z = transform.position.z;
        if !land.contains(x, z) {
            transform.position.x = x.clamp(0.0, ex);
            transform.position.z = z.clamp(0.0, ez);
            if let Some(mut wander) = wander {
                wander.heading = (wander.heading + PI).rem_euclid(TAU);
            }
        }
        transform.position.y = land.height_at(transform.position.x, transform.position.z);
    }
}
