//! Orchestration shell for the pachinko-board demos.
//!
//! The crate wires four collaborators: a scene assembler built from static
//! constants, an input handler for the reset/impulse shortcuts and orbit
//! controls, a frame driver that steps the simulation and throttles ball
//! spawning, and thin adapters over the external renderer (`wgpu`) and the
//! external rigid-body engine (`rapier3d`).  The heavy machinery stays in
//! those libraries; everything here is glue, kept testable by injecting the
//! physics engine behind a capability trait.

pub mod app;
pub mod camera;
pub mod data_model;
pub mod geometry;
pub mod input;
pub mod label;
pub mod physics;
pub mod render;
pub mod scene;
pub mod session;
pub mod stl;

pub use app::{FrameStats, WindowViewport};
pub use camera::OrbitCamera;
pub use data_model::DataModel;
pub use input::{action_for_key, DemoAction, OrbitInput};
pub use label::{LabelOverlay, ScreenLabel};
pub use physics::{
    BodyDescriptor, BodyKind, NullPhysics, PhysicsAdapter, PhysicsError, RapierPhysics,
    WorldParams,
};
pub use render::{CameraParams, Renderer, SceneEnvironment};
pub use scene::{pinball_scene, showcase_scene, Scene, SceneObject, Shape};
pub use session::{BoardLoader, Session, SessionConfig};
pub use stl::{load_stl_file, load_stl_from_bytes, StlError, TriMesh};
