use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use anyhow::Result;
use glam::Vec3;
use log::{error, info, warn};
use rand::Rng;

use crate::data_model::DataModel;
use crate::physics::{BodyDescriptor, PhysicsAdapter};
use crate::scene::{self, MaterialClass, SceneObject, Shape};
use crate::stl::{self, TriMesh};

/// Surface parameters of the board collider.
const BOARD_RESTITUTION: f32 = 1.75;
const BOARD_FRICTION: f32 = 11.0;

/// Tunable knobs of a simulation session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionConfig {
    /// Spawn cap: maximum number of named ball bodies (`balls`).
    pub spawn_cap: u32,
    /// A ball is spawned every `spawn_interval`-th tick (`dropRate`).
    pub spawn_interval: u32,
    pub ball_radius: f32,
    pub ball_density: f32,
    pub ball_restitution: f32,
    pub ball_friction: f32,
    /// Spawn point; x is jittered within `spawn_spread` around it.
    pub spawn_origin: Vec3,
    pub spawn_spread: f32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            spawn_cap: 410,
            spawn_interval: 1,
            ball_radius: 0.0078,
            ball_density: 4000.0,
            ball_restitution: 0.1,
            ball_friction: 0.1,
            spawn_origin: Vec3::new(0.0, 0.84, 0.075),
            spawn_spread: 0.35,
        }
    }
}

/// Frame-driver state: spawn throttling and the collider-ready gate.
///
/// All mutation happens on the event-loop thread; the session never touches
/// the adapter or model outside the methods called from there. States move
/// awaiting-mesh-load -> spawning -> spawn-complete.
pub struct Session<R: Rng> {
    config: SessionConfig,
    spawned: u32,
    throttle: u32,
    physics_ready: bool,
    rng: R,
}

impl<R: Rng> Session<R> {
    pub fn new(config: SessionConfig, rng: R) -> Self {
        Self {
            config,
            spawned: 0,
            throttle: 0,
            physics_ready: false,
            rng,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Number of balls spawned so far.
    pub fn spawned(&self) -> u32 {
        self.spawned
    }

    pub fn physics_ready(&self) -> bool {
        self.physics_ready
    }

    /// Whether the spawn cap has been reached.
    pub fn spawn_complete(&self) -> bool {
        self.spawned + 1 >= self.config.spawn_cap
    }

    /// Completion of the asynchronous board load: installs the visual object
    /// and registers the static trimesh collider, then opens the spawn gate.
    pub fn install_board(
        &mut self,
        asset: &str,
        mesh: &TriMesh,
        adapter: &mut dyn PhysicsAdapter,
        model: &DataModel,
    ) {
        model.insert(scene::board_object(asset));
        let descriptor = BodyDescriptor::mesh(mesh.positions(), mesh.triangles())
            .at(scene::BOARD_POSITION)
            .rotated(scene::BOARD_ROTATION)
            .with_surface(BOARD_RESTITUTION, BOARD_FRICTION)
            .named("board");
        match adapter.add(descriptor) {
            Ok(()) => {
                self.physics_ready = true;
                info!(
                    "board collider registered ({} triangles), spawning enabled",
                    mesh.triangle_count()
                );
            }
            Err(err) => error!("failed to register board collider: {err}"),
        }
    }

    /// One frame tick. Advances the adapter by the elapsed stamp, syncs
    /// simulated transforms into the model, then runs the throttled spawner.
    /// Returns the name of the ball spawned this tick, if any.
    pub fn tick(
        &mut self,
        stamp: f64,
        adapter: &mut dyn PhysicsAdapter,
        model: &DataModel,
    ) -> Option<String> {
        adapter.step(stamp);
        adapter.sync_into(model);

        self.throttle += 1;
        if self.throttle < self.config.spawn_interval {
            return None;
        }
        self.throttle = 0;

        if self.spawn_complete() || !self.physics_ready {
            return None;
        }

        self.spawned += 1;
        let name = format!("ball{}", self.spawned);
        let x = self.rng.gen::<f32>() * self.config.spawn_spread - self.config.spawn_spread * 0.5;
        let position = self.config.spawn_origin + Vec3::new(x, 0.0, 0.0);

        let descriptor = BodyDescriptor::sphere(
            self.config.ball_radius,
            self.config.ball_density,
            position,
        )
        .with_surface(self.config.ball_restitution, self.config.ball_friction)
        .named(name.clone());
        if let Err(err) = adapter.add(descriptor) {
            error!("failed to spawn {name}: {err}");
        }
        model.insert(
            SceneObject::new(
                name.clone(),
                Shape::Sphere {
                    radius: self.config.ball_radius,
                },
                MaterialClass::NormalShaded,
            )
            .at(position),
        );
        Some(name)
    }

    /// Removes every possible ball by name and zeroes the spawn counter once
    /// all requests have been issued. Returns the number of remove requests.
    pub fn reset(&mut self, adapter: &mut dyn PhysicsAdapter, model: &DataModel) -> usize {
        for index in 0..self.config.spawn_cap {
            let name = format!("ball{index}");
            adapter.remove(&name);
            model.remove(&name);
        }
        self.spawned = 0;
        self.config.spawn_cap as usize
    }

    /// Kicks every possible ball with a randomized velocity: horizontal in
    /// [-0.25, 0.25), vertical in [0, 1). Returns the number of requests.
    pub fn impulse(&mut self, adapter: &mut dyn PhysicsAdapter) -> usize {
        for index in 0..self.config.spawn_cap {
            let velocity = Vec3::new(
                self.rng.gen::<f32>() * 0.5 - 0.25,
                self.rng.gen::<f32>(),
                0.0,
            );
            adapter.change_velocity(&format!("ball{index}"), velocity);
        }
        self.config.spawn_cap as usize
    }
}

/// Background STL load with a completion the frame driver polls, keeping the
/// event loop free while the asset is read and parsed.
pub struct BoardLoader {
    receiver: Receiver<Result<TriMesh>>,
    done: bool,
}

impl BoardLoader {
    pub fn spawn(path: PathBuf) -> Self {
        let (sender, receiver) = mpsc::channel();
        thread::spawn(move || {
            let _ = sender.send(stl::load_stl_file(&path));
        });
        Self {
            receiver,
            done: false,
        }
    }

    /// Non-blocking completion check. A failed load is reported once and the
    /// scene stays degraded, matching the original's silent behavior.
    pub fn poll(&mut self) -> Option<TriMesh> {
        if self.done {
            return None;
        }
        match self.receiver.try_recv() {
            Ok(Ok(mesh)) => {
                self.done = true;
                Some(mesh)
            }
            Ok(Err(err)) => {
                self.done = true;
                warn!("board mesh unavailable, continuing without it: {err:#}");
                None
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.done = true;
                None
            }
        }
    }

    /// Blocking variant used by headless runs, where determinism matters more
    /// than latency.
    pub fn wait(mut self) -> Option<TriMesh> {
        if self.done {
            return None;
        }
        self.done = true;
        match self.receiver.recv() {
            Ok(Ok(mesh)) => Some(mesh),
            Ok(Err(err)) => {
                warn!("board mesh unavailable, continuing without it: {err:#}");
                None
            }
            Err(_) => None,
        }
    }
}
