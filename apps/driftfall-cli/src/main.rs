use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use driftfall_common::Viewport;
use driftfall_driver::{FrameDriver, ManualScheduler};
use driftfall_render::DebugTextRenderer;
use driftfall_scene::{SceneConfig, SceneSummary, build_scene};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "driftfall-cli", about = "Headless tools for the driftfall scene")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Scene config (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the particle count
    #[arg(long, global = true)]
    particles: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and the configured scene
    Info {
        /// RNG seed used to populate the particle field
        #[arg(short, long, default_value = "42")]
        seed: u64,
    },
    /// Run the frame loop headlessly against the text renderer
    Simulate {
        /// Number of frames to deliver
        #[arg(short, long, default_value = "600")]
        ticks: u64,
        /// RNG seed for a reproducible run
        #[arg(short, long, default_value = "42")]
        seed: u64,
        #[arg(long, default_value = "1280")]
        width: u32,
        #[arg(long, default_value = "720")]
        height: u32,
        /// Simulated time between frames
        #[arg(long, default_value = "16.667")]
        interval_ms: f64,
        /// Print a summary every N ticks (0 disables)
        #[arg(long, default_value = "100")]
        print_every: u64,
        /// Print the final frame as drawn by the text renderer
        #[arg(long)]
        show_frame: bool,
    },
    /// Print the effective config as JSON
    DumpConfig,
}

fn load_config(cli: &Cli) -> anyhow::Result<SceneConfig> {
    let mut config = match &cli.config {
        Some(path) => SceneConfig::from_json_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => SceneConfig::default(),
    };
    if let Some(count) = cli.particles {
        config.particle_count = count;
    }
    tracing::debug!(particles = config.particle_count, "config ready");
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let config = load_config(&cli)?;

    match cli.command {
        Commands::Info { seed } => {
            println!("driftfall-cli v{}", env!("CARGO_PKG_VERSION"));
            let bounds = &config.particles;
            println!(
                "particles: count={} spawn_y=[{}, {}] floor={} respawn_y=[{}, {}] speed=[{}, {}]",
                config.particle_count,
                bounds.spawn_min_y,
                bounds.spawn_min_y + bounds.spawn_span_y,
                bounds.floor_y,
                bounds.respawn_min_y,
                bounds.respawn_min_y + bounds.respawn_span_y,
                bounds.min_speed,
                bounds.max_speed(),
            );
            let cam = &config.camera;
            println!(
                "camera: fov={} near={} far={} position={}",
                cam.fov_degrees, cam.near, cam.far, cam.position
            );

            let mut rng = StdRng::seed_from_u64(seed);
            let scene = build_scene(&config, Viewport::new(1280, 720), &mut rng)?;
            for mesh in scene.meshes() {
                let data = mesh.geometry.tessellate();
                println!(
                    "mesh {}: {} vertices, {} triangles",
                    mesh.name,
                    data.vertex_count(),
                    data.triangle_count()
                );
            }
            println!("{}", SceneSummary::capture(&scene));
        }
        Commands::Simulate {
            ticks,
            seed,
            width,
            height,
            interval_ms,
            print_every,
            show_frame,
        } => {
            println!("Simulating: seed={seed}, ticks={ticks}, display={width}x{height}");

            let display = Viewport::new(width, height);
            let mut rng = StdRng::seed_from_u64(seed);
            let mut scene = build_scene(&config, display, &mut rng)?;
            let mut renderer = DebugTextRenderer::new(display);
            let mut driver = FrameDriver::new(rng);
            let mut scheduler = ManualScheduler::default();
            let floor = config.particles.floor_y;

            driver.start(&mut scheduler);
            let mut delivered = 0u64;
            let mut respawned = 0usize;
            while delivered < ticks && scheduler.take_pending() {
                let time_ms = delivered as f64 * interval_ms;
                let Some(report) =
                    driver.on_frame(time_ms, &mut scene, &mut renderer, &mut scheduler)?
                else {
                    break;
                };
                delivered += 1;
                respawned += report.respawned;

                if let Some((lo, _)) = scene.particles.system.height_range() {
                    if lo < floor {
                        bail!("tick {}: particle left at y={lo}, below floor {floor}", report.tick);
                    }
                }
                if print_every > 0 && report.tick % print_every == 0 {
                    println!("[tick {}] {}", report.tick, SceneSummary::capture(&scene));
                }
            }

            println!(
                "Done: ticks={}, frames drawn={}, particle uploads={}, respawns={}",
                driver.ticks(),
                renderer.frames(),
                renderer.uploads(),
                respawned
            );
            println!("{}", SceneSummary::capture(&scene));
            if show_frame {
                println!("{}", renderer.last_frame());
            }
        }
        Commands::DumpConfig => {
            println!("{}", config.to_json_pretty()?);
        }
    }

    Ok(())
}
