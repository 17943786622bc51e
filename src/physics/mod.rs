pub mod rapier;

pub use rapier::RapierPhysics;

use glam::Vec3;
use thiserror::Error;

use crate::data_model::DataModel;

/// World-level simulation parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldParams {
    pub substeps: u32,
    pub gravity: Vec3,
    /// Fixed simulation rate in steps per second.
    pub fps: f32,
}

impl Default for WorldParams {
    fn default() -> Self {
        Self {
            substeps: 2,
            gravity: Vec3::new(0.0, -9.81, 0.0),
            fps: 120.0,
        }
    }
}

/// Geometry and mass model of a simulated body.
#[derive(Debug, Clone, PartialEq)]
pub enum BodyKind {
    /// Static slab (the ground).
    Plane { size: Vec3 },
    /// Static triangle mesh (the board).
    Mesh {
        vertices: Vec<Vec3>,
        triangles: Vec<[u32; 3]>,
    },
    /// Dynamic ball.
    Sphere { radius: f32, density: f32 },
}

/// Plain record handed to the adapter when instantiating a body.
///
/// The adapter owns the simulated body; the scene owns the visual object.
/// The two are linked by `name` only.
#[derive(Debug, Clone, PartialEq)]
pub struct BodyDescriptor {
    pub name: Option<String>,
    pub kind: BodyKind,
    pub position: Vec3,
    /// Euler rotation in degrees, applied Z * Y * X.
    pub rotation: Vec3,
    pub restitution: f32,
    pub friction: f32,
}

impl BodyDescriptor {
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn plane(size: Vec3, position: Vec3) -> Self {
        Self {
            name: None,
            kind: BodyKind::Plane { size },
            position,
            rotation: Vec3::ZERO,
            restitution: 0.1,
            friction: 0.5,
        }
    }

    pub fn mesh(vertices: Vec<Vec3>, triangles: Vec<[u32; 3]>) -> Self {
        Self {
            name: None,
            kind: BodyKind::Mesh {
                vertices,
                triangles,
            },
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            restitution: 0.5,
            friction: 0.5,
        }
    }

    pub fn sphere(radius: f32, density: f32, position: Vec3) -> Self {
        Self {
            name: None,
            kind: BodyKind::Sphere { radius, density },
            position,
            rotation: Vec3::ZERO,
            restitution: 0.5,
            friction: 0.5,
        }
    }

    pub fn with_surface(mut self, restitution: f32, friction: f32) -> Self {
        self.restitution = restitution;
        self.friction = friction;
        self
    }

    pub fn at(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn rotated(mut self, rotation: Vec3) -> Self {
        self.rotation = rotation;
        self
    }
}

#[derive(Debug, Error)]
pub enum PhysicsError {
    #[error("a body named {0:?} already exists")]
    DuplicateName(String),
    #[error("mesh collider has no triangles")]
    EmptyMesh,
}

/// Capability interface over the external rigid-body engine.
///
/// The orchestration layer only ever talks to this trait, so the frame driver
/// and input handling can be exercised against a recording double. Calls are
/// fire-and-forget: `remove` and `change_velocity` silently ignore names that
/// were never added.
pub trait PhysicsAdapter {
    /// Applies global simulation parameters.
    fn configure(&mut self, params: WorldParams);

    /// Instantiates a simulated body from a descriptor.
    fn add(&mut self, descriptor: BodyDescriptor) -> Result<(), PhysicsError>;

    /// Deletes a named body.
    fn remove(&mut self, name: &str);

    /// Replaces a named body's linear velocity.
    fn change_velocity(&mut self, name: &str, linear_velocity: Vec3);

    /// Advances the simulation given an elapsed-time stamp in seconds.
    fn step(&mut self, stamp: f64);

    /// Writes simulated transforms back into the shared scene model by name.
    fn sync_into(&self, model: &DataModel);

    /// Number of live named bodies.
    fn body_count(&self) -> usize;
}

/// No-op backend for the showcase demo and for headless runs without
/// simulation.
#[derive(Debug, Default)]
pub struct NullPhysics;

impl PhysicsAdapter for NullPhysics {
    fn configure(&mut self, _params: WorldParams) {}

    fn add(&mut self, _descriptor: BodyDescriptor) -> Result<(), PhysicsError> {
        Ok(())
    }

    fn remove(&mut self, _name: &str) {}

    fn change_velocity(&mut self, _name: &str, _linear_velocity: Vec3) {}

    fn step(&mut self, _stamp: f64) {}

    fn sync_into(&self, _model: &DataModel) {}

    fn body_count(&self) -> usize {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptor_builders_fill_surface_parameters() {
        let descriptor = BodyDescriptor::sphere(0.0078, 4000.0, Vec3::Y)
            .with_surface(0.1, 0.1)
            .named("ball1");
        assert_eq!(descriptor.name.as_deref(), Some("ball1"));
        assert_eq!(descriptor.restitution, 0.1);
        match descriptor.kind {
            BodyKind::Sphere { radius, density } => {
                assert_eq!(radius, 0.0078);
                assert_eq!(density, 4000.0);
            }
            other => panic!("expected sphere, got {other:?}"),
        }
    }

    #[test]
    fn null_backend_accepts_everything() {
        let mut adapter = NullPhysics;
        adapter.configure(WorldParams::default());
        adapter
            .add(BodyDescriptor::plane(Vec3::ONE, Vec3::ZERO))
            .unwrap();
        adapter.remove("ball1");
        adapter.change_velocity("ball1", Vec3::X);
        adapter.step(1.0);
        assert_eq!(adapter.body_count(), 0);
    }
}
