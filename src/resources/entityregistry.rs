//! Entity registry.
//!
//! Owns every live simulation entity in a private `bevy_ecs` [`World`] and
//! advances them with a [`Schedule`] once per frame. The rest of the engine
//! talks to the registry through spawn requests and plain snapshots, so the
//! ECS stays an implementation detail.

use bevy_ecs::prelude::*;
use log::{debug, warn};
use raylib::prelude::Vector3;
use serde::{Deserialize, Serialize};

use crate::components::entitykind::{EntityKind, MeshRef};
use crate::components::transform::Transform3D;
use crate::components::wander::Wander;
use crate::resources::landisland::LandIsland;
use crate::resources::meshpack::MeshPack;
use crate::resources::worldtime::WorldTime;
use crate::systems::movement::{WanderRng, ground_entities, wander_movement};
use crate::systems::time::update_world_time;

/// Request to create an entity, as issued by landscape scripts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySpawn {
    pub kind: EntityKind,
    pub x: f32,
    pub z: f32,
    /// Height; defaults to the terrain surface.
    #[serde(default)]
    pub y: Option<f32>,
    /// Heading in degrees.
    #[serde(default)]
    pub rotation: f32,
    #[serde(default = "default_scale")]
    pub scale: f32,
    /// Walking speed for mobile kinds; defaults per kind.
    #[serde(default)]
    pub speed: Option<f32>,
    /// Mesh name; defaults per kind.
    #[serde(default)]
    pub mesh: Option<String>,
}

fn default_scale() -> f32 {
    1.0
}

impl EntitySpawn {
    pub fn new(kind: EntityKind, x: f32, z: f32) -> Self {
        Self {
            kind,
            x,
            z,
            y: None,
            rotation: 0.0,
            scale: 1.0,
            speed: None,
            mesh: None,
        }
    }
}

/// Read-only view of one entity, handed to the renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntityView {
    pub id: u64,
    pub kind: EntityKind,
    pub position: Vector3,
    pub rotation: f32,
    pub scale: f32,
    pub mesh: Option<usize>,
}

pub struct EntityRegistry {
    world: World,
    schedule: Schedule,
}

impl Default for EntityRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::with_rng(fastrand::Rng::new())
    }

    /// Registry whose walkers turn according to a seeded random source.
    pub fn with_rng(rng: fastrand::Rng) -> Self {
        let mut world = World::new();
        world.insert_resource(WorldTime::default());
        world.insert_resource(WanderRng(rng));

        let mut schedule = Schedule::default();
        schedule.add_systems(wander_movement);

        Self { world, schedule }
    }

    /// Spawn an entity. Its height snaps to `land` unless the request sets
    /// one.
    pub fn create(
        &mut self,
        spawn: &EntitySpawn,
        meshes: &MeshPack,
        land: Option<&LandIsland>,
    ) -> Entity {
        let y = spawn
            .y
            .unwrap_or_else(|| land.map_or(0.0, |l| l.height_at(spawn.x, spawn.z)));
        let transform = Transform3D::new(spawn.x, y, spawn.z)
            .with_rotation(spawn.rotation)
            .with_scale(spawn.scale);

        let mut entity = self.world.spawn((spawn.kind, transform));

        let mesh_name = spawn.mesh.as_deref().unwrap_or(spawn.kind.default_mesh());
        match meshes.find(mesh_name) {
            Some(index) => {
                entity.insert(MeshRef(index));
            }
            None => warn!("Mesh '{}' not in mesh pack; {:?} drawn without mesh", mesh_name, spawn.kind),
        }

        if spawn.kind.is_mobile() {
            let speed = spawn.speed.unwrap_or(spawn.kind.default_speed());
            entity.insert(Wander::new(speed, spawn.rotation.to_radians()));
        }

        let id = entity.id();
        debug!("Created {:?} {:?} at ({}, {}, {})", spawn.kind, id, spawn.x, y, spawn.z);
        id
    }

    /// Number of live entities.
    pub fn len(&mut self) -> usize {
        self.world
            .query_filtered::<(), With<EntityKind>>()
            .iter(&self.world)
            .count()
    }

    pub fn is_empty(&mut self) -> bool {
        self.len() == 0
    }

    /// Despawn every entity.
    pub fn clear(&mut self) {
        let entities: Vec<Entity> = self
            .world
            .query_filtered::<Entity, With<EntityKind>>()
            .iter(&self.world)
            .collect();
        let count = entities.len();
        for entity in entities {
            self.world.despawn(entity);
        }
        if count > 0 {
            debug!("Cleared {} entities", count);
        }
    }

    /// Advance all entities by `dt` seconds, then keep them on `land`.
    pub fn step(&mut self, dt: f32, land: Option<&LandIsland>) {
        update_world_time(&mut self.world, dt);
        self.schedule.run(&mut self.world);
        if let Some(land) = land {
            ground_entities(&mut self.world, land);
        }
        self.world.clear_trackers();
    }

    /// Views of all entities, ordered by id.
    pub fn snapshot(&mut self) -> Vec<EntityView> {
        let mut views: Vec<EntityView> = self
            .world
            .query::<(Entity, &EntityKind, &Transform3D, Option<&MeshRef>)>()
            .iter(&self.world)
            .map(|(entity, kind, transform, mesh)| EntityView {
                id: entity.to_bits(),
                kind: *kind,
                position: transform.position,
                rotation: transform.rotation,
                scale: transform.scale,
                mesh: mesh.map(|m| m.0),
            })
            .collect();
        views.sort_by_key(|v| v.id);
        views
    }

    /// Positions of every entity of `kind`.
    pub fn positions_of(&mut self, kind: EntityKind) -> Vec<Vector3> {
        self.world
            .query::<(&EntityKind, &Transform3D)>()
            .iter(&self.world)
            .filter(|(k, _)| **k == kind)
            .map(|(_, t)| t.position)
            .collect()
    }

    pub fn transform(&self, entity: Entity) -> Option<Transform3D> {
        self.world.get::<Transform3D>(entity).copied()
    }

    pub fn set_position(&mut self, entity: Entity, position: Vector3) -> bool {
        match self.world.get_mut::<Transform3D>(entity) {
            Some(mut transform) => {
                transform.position = position;
                true
            }
            None => false,
        }
    }

    pub fn despawn(&mut self, entity: Entity) -> bool {
        self.world.despawn(entity)
    }

    /// Simulation clock of the registry.
    pub fn time(&self) -> WorldTime {
        *self.world.resource::<WorldTime>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::meshpack::MeshDef;

    fn meshes() -> MeshPack {
        let mut pack = MeshPack::default();
        pack.meshes.push(MeshDef {
            name: "tree".into(),
            size: [1.0, 4.0, 1.0],
            color: [0, 255, 0],
        });
        pack
    }

    fn hill() -> LandIsland {
        LandIsland {
            width: 2,
            depth: 2,
            cell_size: 100.0,
            sea_level: 0.0,
            heights: vec![8.0; 4],
        }
    }

    #[test]
    fn create_snaps_to_terrain_and_counts() {
        let mut registry = EntityRegistry::new();
        let land = hill();
        registry.create(&EntitySpawn::new(EntityKind::Tree, 10.0, 10.0), &meshes(), Some(&land));
        registry.create(
            &EntitySpawn {
                y: Some(1.0),
                ..EntitySpawn::new(EntityKind::Abode, 20.0, 20.0)
            },
            &meshes(),
            Some(&land),
        );
        assert_eq!(registry.len(), 2);
        let trees = registry.positions_of(EntityKind::Tree);
        assert_eq!(trees.len(), 1);
        assert_eq!(trees[0].y, 8.0);
        assert_eq!(registry.positions_of(EntityKind::Abode)[0].y, 1.0);
    }

    #[test]
    fn mesh_is_resolved_by_name() {
        let mut registry = EntityRegistry::new();
        // packs built by hand have no name index, so load through the file path
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("m.json"),
            r#"{ "meshes": [ { "name": "tree", "size": [1, 4, 1] } ] }"#,
        )
        .unwrap();
        let fs = crate::resources::filesystem::FileSystem::new(dir.path());
        let pack: MeshPack =
            crate::resources::assetloader::force_load_from_file(&fs, "m.json").unwrap();

        registry.create(&EntitySpawn::new(EntityKind::Tree, 0.0, 0.0), &pack, None);
        registry.create(&EntitySpawn::new(EntityKind::Abode, 0.0, 0.0), &pack, None);
        let views = registry.snapshot();
        assert_eq!(views[0].mesh, Some(0));
        assert_eq!(views[1].mesh, None);
    }

    #[test]
    fn step_moves_walkers_only() {
        let mut registry = EntityRegistry::with_rng(fastrand::Rng::with_seed(1));
        let walker = registry.create(
            &EntitySpawn {
                speed: Some(2.0),
                ..EntitySpawn::new(EntityKind::Villager, 50.0, 50.0)
            },
            &meshes(),
            None,
        );
        let tree = registry.create(&EntitySpawn::new(EntityKind::Tree, 10.0, 10.0), &meshes(), None);

        registry.step(0.5, None);

        let moved = registry.transform(walker).unwrap().position;
        let distance = ((moved.x - 50.0).powi(2) + (moved.z - 50.0).powi(2)).sqrt();
        assert!((distance - 1.0).abs() < 1e-4);
        assert_eq!(registry.transform(tree).unwrap().position.x, 10.0);
        assert_eq!(registry.time().frame_count, 1);
    }

    #[test]
    fn clear_removes_everything() {
        let mut registry = EntityRegistry::new();
        for i in 0..5 {
            registry.create(&EntitySpawn::new(EntityKind::Villager, i as f32, 0.0), &meshes(), None);
        }
        assert_eq!(registry.len(), 5);
        registry.clear();
        assert!(registry.is_empty());
        assert!(registry.snapshot().is_empty());
    }

    #[test]
    fn spawn_deserializes_with_defaults() {
        let spawn: EntitySpawn =
            serde_json::from_str(r#"{ "kind": "villager", "x": 1, "z": 2 }"#).unwrap();
        assert_eq!(spawn, EntitySpawn::new(EntityKind::Villager, 1.0, 2.0));
    }
}
