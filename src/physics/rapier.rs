use std::collections::HashMap;

use glam::Vec3;
use log::debug;
use rapier3d::na::{Point3, Translation3, UnitQuaternion, Vector3};
use rapier3d::prelude::{
    BroadPhase, CCDSolver, ColliderBuilder, ColliderSet, ImpulseJointSet, IntegrationParameters,
    IslandManager, Isometry, MultibodyJointSet, NarrowPhase, PhysicsPipeline, RigidBodyBuilder,
    RigidBodyHandle, RigidBodySet,
};

use crate::data_model::DataModel;
use crate::physics::{BodyDescriptor, BodyKind, PhysicsAdapter, PhysicsError, WorldParams};

/// Upper bound on wall-clock time consumed per `step` call, so a stalled
/// process does not trigger a catch-up spiral.
const MAX_FRAME_SECS: f64 = 0.25;

/// Real backend owning the rapier pipeline and data sets.
///
/// Stepping is fixed-timestep: elapsed wall time between stamps is
/// accumulated and consumed in `1/fps` slices, each advanced with the
/// configured number of substeps.
pub struct RapierPhysics {
    pipeline: PhysicsPipeline,
    integration: IntegrationParameters,
    islands: IslandManager,
    broad_phase: BroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd: CCDSolver,
    gravity: Vector3<f32>,
    substeps: u32,
    slice_secs: f64,
    named: HashMap<String, RigidBodyHandle>,
    last_stamp: Option<f64>,
    accumulator: f64,
}

impl Default for RapierPhysics {
    fn default() -> Self {
        Self::new()
    }
}

impl RapierPhysics {
    pub fn new() -> Self {
        let mut adapter = Self {
            pipeline: PhysicsPipeline::new(),
            integration: IntegrationParameters::default(),
            islands: IslandManager::new(),
            broad_phase: BroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd: CCDSolver::new(),
            gravity: Vector3::new(0.0, -9.81, 0.0),
            substeps: 1,
            slice_secs: 1.0 / 60.0,
            named: HashMap::new(),
            last_stamp: None,
            accumulator: 0.0,
        };
        adapter.configure(WorldParams::default());
        adapter
    }

    fn run_slice(&mut self) {
        for _ in 0..self.substeps {
            self.pipeline.step(
                &self.gravity,
                &self.integration,
                &mut self.islands,
                &mut self.broad_phase,
                &mut self.narrow_phase,
                &mut self.bodies,
                &mut self.colliders,
                &mut self.impulse_joints,
                &mut self.multibody_joints,
                &mut self.ccd,
                None,
                &(),
                &(),
            );
        }
    }
}

fn isometry(position: Vec3, rotation_deg: Vec3) -> Isometry<f32> {
    let rotation = UnitQuaternion::from_euler_angles(
        rotation_deg.x.to_radians(),
        rotation_deg.y.to_radians(),
        rotation_deg.z.to_radians(),
    );
    Isometry::from_parts(
        Translation3::new(position.x, position.y, position.z),
        rotation,
    )
}

impl PhysicsAdapter for RapierPhysics {
    fn configure(&mut self, params: WorldParams) {
        self.gravity = Vector3::new(params.gravity.x, params.gravity.y, params.gravity.z);
        self.substeps = params.substeps.max(1);
        self.slice_secs = 1.0 / f64::from(params.fps.max(1.0));
        self.integration.dt = (self.slice_secs / f64::from(self.substeps)) as f32;
    }

    fn add(&mut self, descriptor: BodyDescriptor) -> Result<(), PhysicsError> {
        if let Some(name) = descriptor.name.as_deref() {
            if self.named.contains_key(name) {
                return Err(PhysicsError::DuplicateName(name.to_string()));
            }
        }

        let pose = isometry(descriptor.position, descriptor.rotation);
        let (body, collider) = match descriptor.kind {
            BodyKind::Plane { size } => {
                let body = RigidBodyBuilder::fixed().position(pose).build();
                let collider = ColliderBuilder::cuboid(size.x * 0.5, size.y * 0.5, size.z * 0.5)
                    .restitution(descriptor.restitution)
                    .friction(descriptor.friction)
                    .build();
                (body, collider)
            }
            BodyKind::Mesh {
                vertices,
                triangles,
            } => {
                if triangles.is_empty() {
                    return Err(PhysicsError::EmptyMesh);
                }
                let points: Vec<Point3<f32>> = vertices
                    .iter()
                    .map(|v| Point3::new(v.x, v.y, v.z))
                    .collect();
                let body = RigidBodyBuilder::fixed().position(pose).build();
                let collider = ColliderBuilder::trimesh(points, triangles)
                    .restitution(descriptor.restitution)
                    .friction(descriptor.friction)
                    .build();
                (body, collider)
            }
            BodyKind::Sphere { radius, density } => {
                let body = RigidBodyBuilder::dynamic().position(pose).build();
                let collider = ColliderBuilder::ball(radius)
                    .density(density)
                    .restitution(descriptor.restitution)
                    .friction(descriptor.friction)
                    .build();
                (body, collider)
            }
        };

        let handle = self.bodies.insert(body);
        self.colliders
            .insert_with_parent(collider, handle, &mut self.bodies);
        if let Some(name) = descriptor.name {
            self.named.insert(name, handle);
        }
        Ok(())
    }

    fn remove(&mut self, name: &str) {
        if let Some(handle) = self.named.remove(name) {
            self.bodies.remove(
                handle,
                &mut self.islands,
                &mut self.colliders,
                &mut self.impulse_joints,
                &mut self.multibody_joints,
                true,
            );
        }
    }

    fn change_velocity(&mut self, name: &str, linear_velocity: Vec3) {
        let Some(&handle) = self.named.get(name) else {
            return;
        };
        if let Some(body) = self.bodies.get_mut(handle) {
            body.set_linvel(
                Vector3::new(linear_velocity.x, linear_velocity.y, linear_velocity.z),
                true,
            );
        }
    }

    fn step(&mut self, stamp: f64) {
        let elapsed = match self.last_stamp.replace(stamp) {
            Some(last) => (stamp - last).clamp(0.0, MAX_FRAME_SECS),
            None => 0.0,
        };
        self.accumulator += elapsed;
        while self.accumulator >= self.slice_secs {
            self.run_slice();
            self.accumulator -= self.slice_secs;
        }
    }

    fn sync_into(&self, model: &DataModel) {
        for (name, &handle) in &self.named {
            let Some(body) = self.bodies.get(handle) else {
                continue;
            };
            if body.is_fixed() {
                continue;
            }
            let translation = body.translation();
            let (roll, pitch, yaw) = body.rotation().euler_angles();
            let updated = model.set_transform(
                name,
                Vec3::new(translation.x, translation.y, translation.z),
                Vec3::new(roll.to_degrees(), pitch.to_degrees(), yaw.to_degrees()),
            );
            if !updated {
                debug!("no scene object named {name} to sync");
            }
        }
    }

    fn body_count(&self) -> usize {
        self.named.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{MaterialClass, SceneObject, Shape};

    fn stepped(adapter: &mut RapierPhysics, seconds: f64) {
        adapter.step(0.0);
        let mut stamp = 0.0;
        while stamp < seconds {
            stamp += 1.0 / 60.0;
            adapter.step(stamp);
        }
    }

    fn ball_above_ground() -> RapierPhysics {
        let mut adapter = RapierPhysics::new();
        adapter
            .add(BodyDescriptor::plane(
                Vec3::new(40.0, 0.5, 40.0),
                Vec3::new(0.0, -0.75, 0.0),
            ))
            .unwrap();
        adapter
            .add(
                BodyDescriptor::sphere(0.1, 4000.0, Vec3::new(0.0, 1.0, 0.0))
                    .with_surface(0.1, 0.1)
                    .named("ball1"),
            )
            .unwrap();
        adapter
    }

    #[test]
    fn dynamic_sphere_falls_under_gravity() {
        let mut adapter = ball_above_ground();
        stepped(&mut adapter, 0.5);
        let handle = adapter.named["ball1"];
        let y = adapter.bodies.get(handle).unwrap().translation().y;
        assert!(y < 1.0, "sphere did not fall, y = {y}");
    }

    #[test]
    fn sphere_comes_to_rest_on_the_plane() {
        let mut adapter = ball_above_ground();
        stepped(&mut adapter, 4.0);
        let handle = adapter.named["ball1"];
        let y = adapter.bodies.get(handle).unwrap().translation().y;
        // plane top is at -0.5, ball radius 0.1
        assert!(y > -0.55, "sphere fell through the plane, y = {y}");
    }

    #[test]
    fn sync_writes_transforms_into_the_model() {
        let mut adapter = ball_above_ground();
        let model = DataModel::from_objects(vec![SceneObject::new(
            "ball1",
            Shape::Sphere { radius: 0.1 },
            MaterialClass::NormalShaded,
        )
        .at(Vec3::new(0.0, 1.0, 0.0))]);
        stepped(&mut adapter, 0.5);
        adapter.sync_into(&model);
        let ball = model.get("ball1").unwrap();
        assert!(ball.position.y < 1.0);
    }

    #[test]
    fn remove_deletes_the_named_body() {
        let mut adapter = ball_above_ground();
        assert_eq!(adapter.body_count(), 1);
        adapter.remove("ball1");
        assert_eq!(adapter.body_count(), 0);
        // removing again or addressing unknown names is a no-op
        adapter.remove("ball1");
        adapter.change_velocity("ball7", Vec3::X);
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut adapter = ball_above_ground();
        let err = adapter
            .add(BodyDescriptor::sphere(0.1, 4000.0, Vec3::ZERO).named("ball1"))
            .unwrap_err();
        assert!(matches!(err, PhysicsError::DuplicateName(_)));
    }

    #[test]
    fn empty_mesh_is_rejected() {
        let mut adapter = RapierPhysics::new();
        let err = adapter
            .add(BodyDescriptor::mesh(vec![], vec![]))
            .unwrap_err();
        assert!(matches!(err, PhysicsError::EmptyMesh));
    }

    #[test]
    fn change_velocity_launches_the_ball() {
        let mut adapter = ball_above_ground();
        adapter.change_velocity("ball1", Vec3::new(0.0, 5.0, 0.0));
        stepped(&mut adapter, 0.1);
        let handle = adapter.named["ball1"];
        let y = adapter.bodies.get(handle).unwrap().translation().y;
        assert!(y > 1.0, "upward impulse had no effect, y = {y}");
    }
}
