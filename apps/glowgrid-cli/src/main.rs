use anyhow::Context;
use clap::{Parser, Subcommand};
use glowgrid_animator::{ManualClock, SceneAnimator};
use glowgrid_common::Viewport;
use glowgrid_input::InputEvent;
use glowgrid_scene::{DebugTextRenderer, Renderer, Scene, SceneConfig};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "glowgrid-cli", about = "Headless tools for the glow grid scene")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Scene config file (.yaml, .yml or .json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Print a text summary of the scene graph
    Inspect {
        /// List every mesh instance
        #[arg(short, long)]
        meshes: bool,
        /// Viewport aspect ratio for the camera
        #[arg(long, default_value = "1.7777778")]
        aspect: f32,
    },
    /// Step the animator on a manual clock and print each frame
    Simulate {
        /// Number of frames to run
        #[arg(short, long, default_value = "10")]
        frames: u64,
        /// Simulated frame rate
        #[arg(long, default_value = "60")]
        fps: f32,
        /// Viewport width in logical pixels
        #[arg(long, default_value = "1280")]
        width: f32,
        /// Viewport height in logical pixels
        #[arg(long, default_value = "720")]
        height: f32,
        /// Device pixel ratio
        #[arg(long, default_value = "1")]
        pixel_ratio: f32,
        /// Pointer x in client coordinates (defaults to the viewport center)
        #[arg(long)]
        mouse_x: Option<f32>,
        /// Pointer y in client coordinates (defaults to the viewport center)
        #[arg(long)]
        mouse_y: Option<f32>,
    },
    /// Print the effective scene config as YAML
    Config,
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<SceneConfig> {
    match path {
        Some(path) => SceneConfig::load(path)
            .with_context(|| format!("load scene config {}", path.display())),
        None => Ok(SceneConfig::default()),
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let config = load_config(cli.config.as_ref())?;

    match cli.command {
        Commands::Info => {
            println!("glowgrid-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("common: {}", glowgrid_common::crate_info());
            println!("input: {}", glowgrid_input::crate_info());
            println!("scene: {}", glowgrid_scene::crate_info());
            println!("animator: {}", glowgrid_animator::crate_info());
        }
        Commands::Inspect { meshes, aspect } => {
            let scene = Scene::from_config(&config, aspect)?;
            let renderer = DebugTextRenderer::new().with_meshes(meshes);
            print!("{}", renderer.render(&scene));
        }
        Commands::Simulate {
            frames,
            fps,
            width,
            height,
            pixel_ratio,
            mouse_x,
            mouse_y,
        } => {
            anyhow::ensure!(fps > 0.0, "--fps must be positive");
            let viewport = Viewport::new(width, height);
            let mut animator =
                SceneAnimator::new(&config, viewport, pixel_ratio, ManualClock::new())?;

            let (cx, cy) = viewport.center();
            animator.handle_input(&InputEvent::PointerMoved {
                client_x: mouse_x.unwrap_or(cx),
                client_y: mouse_y.unwrap_or(cy),
            });

            let buffer = animator.drawing_buffer();
            let (pw, ph) = buffer.physical_size();
            println!(
                "Simulating {frames} frames at {fps} fps: viewport={width}x{height} drawing_buffer={pw}x{ph} (ratio {})",
                buffer.pixel_ratio()
            );

            let step = 1.0 / fps;
            for _ in 0..frames {
                animator.clock_mut().advance(step);
                println!("{}", animator.tick());
            }
            println!(
                "Done: {} frames, t={:.3}s",
                animator.frame_count(),
                animator.last_elapsed()
            );
        }
        Commands::Config => {
            print!("{}", config.to_yaml()?);
        }
    }

    Ok(())
}
