use std::any::Any;
use std::env;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{anyhow, Context, Result};
use log::{debug, info};
use pollster::block_on;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use winit::dpi::LogicalSize;
use winit::event::{Event, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::platform::run_return::EventLoopExtRunReturn;
use winit::window::WindowBuilder;

use pinboard::{
    action_for_key, app, pinball_scene, scene, showcase_scene, BoardLoader, BodyDescriptor,
    CameraParams, DataModel, DemoAction, FrameStats, LabelOverlay, NullPhysics, OrbitCamera,
    OrbitInput, PhysicsAdapter, RapierPhysics, Renderer, Scene, SceneEnvironment, Session,
    SessionConfig, Shape, WindowViewport, WorldParams,
};

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = CliOptions::parse()?;
    let scene = match options.demo {
        DemoKind::Showcase => showcase_scene(),
        DemoKind::Pinball => pinball_scene(),
    };
    let model = DataModel::from_objects(scene.objects.clone());

    let mut adapter: Box<dyn PhysicsAdapter> = match options.demo {
        DemoKind::Showcase => Box::new(NullPhysics),
        DemoKind::Pinball => {
            let mut physics = RapierPhysics::new();
            physics.configure(WorldParams::default());
            register_static_bodies(&mut physics, &scene);
            Box::new(physics)
        }
    };

    let rng = match options.seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_entropy(),
    };
    let mut session = Session::new(
        SessionConfig {
            spawn_cap: options.balls,
            spawn_interval: options.drop_rate,
            ..SessionConfig::default()
        },
        rng,
    );

    let loader = BoardLoader::spawn(options.model_path.clone());

    if options.headless {
        return run_headless(&options, &scene, model, &mut session, adapter.as_mut(), loader);
    }

    match run_interactive(&options, &scene, model.clone(), &mut session, &mut adapter, loader) {
        Ok(()) => Ok(()),
        Err(err) => {
            if err.downcast_ref::<WindowInitError>().is_some() {
                eprintln!(
                    "{err}. Falling back to --headless mode (set DISPLAY or install X11 libs to enable rendering)."
                );
                let loader = BoardLoader::spawn(options.model_path.clone());
                run_headless(&options, &scene, model, &mut session, adapter.as_mut(), loader)
            } else {
                Err(err)
            }
        }
    }
}

/// Every static box in the assembled scene doubles as a fixed collider, the
/// way the original tags ground and cover with zero mass.
fn register_static_bodies(adapter: &mut dyn PhysicsAdapter, scene: &Scene) {
    for object in &scene.objects {
        if let Shape::Box { size } = object.shape {
            let descriptor = BodyDescriptor::plane(size, object.position)
                .rotated(object.rotation)
                .named(object.name.clone());
            if let Err(err) = adapter.add(descriptor) {
                log::error!("failed to register static body {}: {err}", object.name);
            }
        }
    }
}

fn install_board_mesh(
    options: &CliOptions,
    session: &mut Session<SmallRng>,
    adapter: &mut dyn PhysicsAdapter,
    model: &DataModel,
    mesh: &pinboard::TriMesh,
) {
    let asset = options.model_path.display().to_string();
    match options.demo {
        DemoKind::Pinball => session.install_board(&asset, mesh, adapter, model),
        DemoKind::Showcase => model.insert(scene::board_object(&asset)),
    }
}

fn run_headless(
    options: &CliOptions,
    scene: &Scene,
    model: DataModel,
    session: &mut Session<SmallRng>,
    adapter: &mut dyn PhysicsAdapter,
    loader: BoardLoader,
) -> Result<()> {
    // Headless runs are used for CI and scripted checks, so wait for the
    // asset instead of racing the frame loop against the loader thread.
    if let Some(mesh) = loader.wait() {
        install_board_mesh(options, session, adapter, &model, &mesh);
    }

    let camera = OrbitCamera::new(scene.camera, 1280, 720);
    let overlay = LabelOverlay::new(1280, 720, vec!["board".to_string()]);

    for frame in 0..options.frames {
        let stamp = f64::from(frame) / 60.0;
        session.tick(stamp, adapter, &model);
    }

    let labels = overlay.project(&model.all_objects(), camera.view_proj());
    info!(
        "label overlay resolved {} anchor(s)",
        labels.iter().filter(|label| label.visible).count()
    );

    app::print_session_summary(
        options.demo.name(),
        &model,
        session.spawned(),
        session.config().spawn_cap,
        adapter.body_count(),
    );
    Ok(())
}

fn run_interactive(
    options: &CliOptions,
    scene: &Scene,
    model: DataModel,
    session: &mut Session<SmallRng>,
    adapter: &mut Box<dyn PhysicsAdapter>,
    loader: BoardLoader,
) -> Result<()> {
    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(|_| {}));
    let event_loop = panic::catch_unwind(AssertUnwindSafe(EventLoop::new));
    panic::set_hook(default_hook);
    let event_loop =
        event_loop.map_err(|panic| WindowInitError::from_panic("event loop", panic))?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(match options.demo {
                DemoKind::Showcase => "Pinboard Showcase",
                DemoKind::Pinball => "Pinboard",
            })
            .with_inner_size(LogicalSize::new(1280.0, 720.0))
            .build(&event_loop)
            .map_err(|err| WindowInitError::from_error("window", err))?,
    );

    let renderer = block_on(Renderer::new(Arc::clone(&window)))
        .map_err(|err| WindowInitError::from_error("renderer", err))?;
    let size = window.inner_size();
    let viewport = Arc::new(WindowViewport::new(size.width, size.height));

    let mut state = AppState {
        renderer,
        model,
        session,
        adapter,
        demo: options.demo,
        camera: OrbitCamera::new(scene.camera, size.width, size.height),
        orbit: OrbitInput::new(),
        overlay: LabelOverlay::new(size.width, size.height, vec!["board".to_string()]),
        environment: SceneEnvironment::from_scene(scene),
        viewport,
        loader: Some(loader),
        options,
        stats: FrameStats::new(),
        start: Instant::now(),
        last_error: None,
    };

    let mut event_loop = event_loop;
    event_loop.run_return(|event, _, control_flow| {
        *control_flow = ControlFlow::Poll;
        if let Err(err) = state.process_event(&event, control_flow) {
            state.last_error = Some(err);
            control_flow.set_exit();
        }
    });

    let spawned = state.session.spawned();
    let cap = state.session.config().spawn_cap;
    let bodies = state.adapter.body_count();
    app::print_session_summary(options.demo.name(), &state.model, spawned, cap, bodies);

    if let Some(err) = state.last_error {
        return Err(err);
    }
    Ok(())
}

struct AppState<'a> {
    renderer: Renderer,
    model: DataModel,
    session: &'a mut Session<SmallRng>,
    adapter: &'a mut Box<dyn PhysicsAdapter>,
    demo: DemoKind,
    camera: OrbitCamera,
    orbit: OrbitInput,
    overlay: LabelOverlay,
    environment: SceneEnvironment,
    viewport: Arc<WindowViewport>,
    loader: Option<BoardLoader>,
    options: &'a CliOptions,
    stats: FrameStats,
    start: Instant,
    last_error: Option<anyhow::Error>,
}

impl AppState<'_> {
    fn process_event(&mut self, event: &Event<()>, control_flow: &mut ControlFlow) -> Result<()> {
        match event {
            Event::WindowEvent { event, window_id } if *window_id == self.renderer.window_id() => {
                match event {
                    WindowEvent::CloseRequested => {
                        control_flow.set_exit();
                    }
                    WindowEvent::Resized(size) => {
                        self.handle_resize(size.width, size.height);
                    }
                    WindowEvent::ScaleFactorChanged { new_inner_size, .. } => {
                        self.handle_resize(new_inner_size.width, new_inner_size.height);
                    }
                    WindowEvent::KeyboardInput { input, .. } => {
                        if let Some(key) = input.virtual_keycode {
                            if let Some(action) = action_for_key(input.state, key) {
                                self.handle_action(action);
                            }
                        }
                    }
                    WindowEvent::MouseInput { state, button, .. } => {
                        self.orbit.handle_mouse_button(*state, *button);
                    }
                    WindowEvent::CursorMoved { position, .. } => {
                        if let Some((d_azimuth, d_polar)) =
                            self.orbit.handle_cursor(position.x, position.y)
                        {
                            self.camera.rotate(d_azimuth, d_polar);
                        }
                    }
                    WindowEvent::MouseWheel { delta, .. } => {
                        let amount = match delta {
                            MouseScrollDelta::LineDelta(_, y) => y * 0.5,
                            MouseScrollDelta::PixelDelta(position) => position.y as f32 * 0.01,
                        };
                        self.camera.zoom(amount);
                    }
                    _ => {}
                }
            }
            Event::RedrawRequested(window_id) if *window_id == self.renderer.window_id() => {
                self.frame()?;
            }
            Event::MainEventsCleared => {
                self.renderer.window().request_redraw();
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_resize(&mut self, width: u32, height: u32) {
        self.renderer
            .resize(winit::dpi::PhysicalSize::new(width, height));
        self.camera.set_viewport(width, height);
        self.overlay.resize(width, height);
        self.viewport.update(width, height);
    }

    fn handle_action(&mut self, action: DemoAction) {
        if self.demo != DemoKind::Pinball {
            return;
        }
        match action {
            DemoAction::ResetBalls => {
                let issued = self.session.reset(self.adapter.as_mut(), &self.model);
                info!("reset issued {issued} remove request(s)");
            }
            DemoAction::Impulse => {
                let issued = self.session.impulse(self.adapter.as_mut());
                info!("impulse issued {issued} velocity change(s)");
            }
        }
    }

    fn frame(&mut self) -> Result<()> {
        let loaded = self.loader.as_mut().and_then(|loader| loader.poll());
        if let Some(mesh) = loaded {
            install_board_mesh(
                self.options,
                self.session,
                self.adapter.as_mut(),
                &self.model,
                &mesh,
            );
            self.renderer
                .install_mesh(&self.options.model_path.display().to_string(), &mesh);
            self.loader = None;
        }

        let stamp = self.start.elapsed().as_secs_f64();
        self.session.tick(stamp, self.adapter.as_mut(), &self.model);

        let objects = self.model.all_objects();
        let camera = CameraParams {
            view_proj: self.camera.view_proj(),
            position: self.camera.position(),
        };
        self.renderer.update_globals(&camera, &self.environment);
        if let Err(err) = self.renderer.render(&objects) {
            match err {
                wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => {
                    let size = self.renderer.window().inner_size();
                    self.renderer.resize(size);
                }
                wgpu::SurfaceError::OutOfMemory => {
                    return Err(anyhow!("GPU is out of memory"));
                }
                wgpu::SurfaceError::Timeout => {
                    info!("Surface timeout; retrying next frame");
                }
            }
        }

        if let Some(fps) = self.stats.tick() {
            let labels = self.overlay.project(&objects, camera.view_proj);
            let (width, height) = self.viewport.size();
            debug!(
                "{fps:.1} fps at {width}x{height}, {} object(s), {} label anchor(s) visible",
                objects.len(),
                labels.iter().filter(|label| label.visible).count()
            );
        }
        Ok(())
    }
}

#[derive(Debug)]
struct WindowInitError {
    message: String,
}

impl WindowInitError {
    fn from_panic(stage: &str, panic: Box<dyn Any + Send>) -> Self {
        Self {
            message: format!("failed to initialize {stage}: {}", panic_message(panic)),
        }
    }

    fn from_error(stage: &str, err: impl fmt::Display) -> Self {
        Self {
            message: format!("failed to initialize {stage}: {err}"),
        }
    }
}

impl fmt::Display for WindowInitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for WindowInitError {}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    match panic.downcast::<String>() {
        Ok(msg) => *msg,
        Err(panic) => match panic.downcast::<&'static str>() {
            Ok(msg) => (*msg).to_string(),
            Err(_) => "unknown panic".into(),
        },
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DemoKind {
    Showcase,
    Pinball,
}

impl DemoKind {
    fn name(self) -> &'static str {
        match self {
            Self::Showcase => "showcase",
            Self::Pinball => "pinball",
        }
    }

    fn default_model(self) -> &'static str {
        match self {
            Self::Showcase => scene::SHOWCASE_MODEL,
            Self::Pinball => scene::PINBALL_MODEL,
        }
    }
}

struct CliOptions {
    demo: DemoKind,
    model_path: PathBuf,
    headless: bool,
    frames: u32,
    balls: u32,
    drop_rate: u32,
    seed: Option<u64>,
}

const USAGE: &str = "Usage: pinboard <showcase|pinball> [--model PATH] [--headless] \
[--frames N] [--balls N] [--drop-rate N] [--seed N]";

impl CliOptions {
    fn parse() -> Result<Self> {
        let mut args = env::args().skip(1);
        let Some(demo) = args.next() else {
            return Err(anyhow!("{USAGE}"));
        };
        let demo = match demo.as_str() {
            "showcase" => DemoKind::Showcase,
            "pinball" => DemoKind::Pinball,
            other => return Err(anyhow!("Unknown demo: {other}. {USAGE}")),
        };

        let mut options = Self {
            demo,
            model_path: PathBuf::from(demo.default_model()),
            headless: false,
            frames: 600,
            balls: SessionConfig::default().spawn_cap,
            drop_rate: SessionConfig::default().spawn_interval,
            seed: None,
        };

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--headless" => options.headless = true,
                "--model" => options.model_path = PathBuf::from(expect_value(&mut args, &arg)?),
                "--frames" => options.frames = parse_number(&mut args, &arg)?,
                "--balls" => options.balls = parse_number(&mut args, &arg)?,
                "--drop-rate" => options.drop_rate = parse_number(&mut args, &arg)?,
                "--seed" => options.seed = Some(parse_number(&mut args, &arg)?),
                other => return Err(anyhow!("Unknown argument: {other}. {USAGE}")),
            }
        }

        if options.balls == 0 {
            return Err(anyhow!("--balls must be at least 1"));
        }
        if options.drop_rate == 0 {
            return Err(anyhow!("--drop-rate must be at least 1"));
        }
        Ok(options)
    }
}

fn expect_value(args: &mut impl Iterator<Item = String>, flag: &str) -> Result<String> {
    args.next()
        .ok_or_else(|| anyhow!("{flag} expects a value. {USAGE}"))
}

fn parse_number<T: std::str::FromStr>(
    args: &mut impl Iterator<Item = String>,
    flag: &str,
) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let value = expect_value(args, flag)?;
    value
        .parse::<T>()
        .with_context(|| format!("{flag} expects a number, got {value:?}"))
}
