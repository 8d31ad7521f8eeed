use anyhow::Result;
use clap::Parser;
use driftfall_common::Viewport;
use driftfall_driver::{FrameDriver, FrameScheduler};
use driftfall_render_wgpu::WgpuRenderer;
use driftfall_scene::{SceneConfig, SceneContext, build_scene};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

#[derive(Parser)]
#[command(name = "driftfall-desktop", about = "Driftfall scene in a desktop window")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Scene config (JSON); defaults reproduce the stock scene
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the particle count
    #[arg(long)]
    particles: Option<usize>,

    /// RNG seed for a reproducible particle field
    #[arg(long)]
    seed: Option<u64>,
}

/// Turns the driver's frame requests into winit redraws.
struct WinitScheduler<'a>(&'a Window);

impl FrameScheduler for WinitScheduler<'_> {
    fn request_frame(&mut self) {
        self.0.request_redraw();
    }
}

/// Everything that exists once the window is up.
struct Running {
    window: Arc<Window>,
    renderer: WgpuRenderer,
    scene: SceneContext,
    driver: FrameDriver<StdRng>,
    started: Instant,
}

struct App {
    config: SceneConfig,
    seed: Option<u64>,
    running: Option<Running>,
}

impl App {
    fn new(config: SceneConfig, seed: Option<u64>) -> Self {
        Self {
            config,
            seed,
            running: None,
        }
    }

    fn init(&self, event_loop: &ActiveEventLoop) -> Result<Running> {
        let attrs = Window::default_attributes()
            .with_title("Driftfall")
            .with_inner_size(PhysicalSize::new(1280u32, 720));
        let window = Arc::new(event_loop.create_window(attrs)?);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(window.clone())?;

        let size = window.inner_size();
        let display = Viewport::new(size.width, size.height);

        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let scene = build_scene(&self.config, display, &mut rng)?;
        let renderer = pollster::block_on(WgpuRenderer::new(&instance, surface, display, &scene))?;

        let mut driver = FrameDriver::new(rng);
        driver.start(&mut WinitScheduler(&window));

        Ok(Running {
            window,
            renderer,
            scene,
            driver,
            started: Instant::now(),
        })
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.running.is_some() {
            return;
        }
        match self.init(event_loop) {
            Ok(running) => self.running = Some(running),
            Err(e) => {
                tracing::error!("failed to start: {e:#}");
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(running) = &mut self.running else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                // The driver picks this up on its next tick.
                running
                    .renderer
                    .set_display_size(Viewport::new(new_size.width, new_size.height));
            }
            WindowEvent::RedrawRequested => {
                let time_ms = running.started.elapsed().as_secs_f64() * 1000.0;
                let mut scheduler = WinitScheduler(&running.window);
                let result = running.driver.on_frame(
                    time_ms,
                    &mut running.scene,
                    &mut running.renderer,
                    &mut scheduler,
                );
                match result {
                    Ok(Some(report)) if report.resized => {
                        tracing::debug!(tick = report.tick, "render target resized");
                    }
                    Ok(_) => {}
                    Err(e) => {
                        tracing::error!("stopping: {e}");
                        event_loop.exit();
                    }
                }
            }
            _ => {}
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("driftfall-desktop starting");

    let mut config = match &cli.config {
        Some(path) => SceneConfig::from_json_file(path)?,
        None => SceneConfig::default(),
    };
    if let Some(count) = cli.particles {
        config.particle_count = count;
    }

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = App::new(config, cli.seed);
    event_loop.run_app(&mut app)?;

    Ok(())
}
