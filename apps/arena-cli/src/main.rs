use std::convert::Infallible;
use std::path::PathBuf;

use arena_render::{Camera, CommandRecorder, DrawCommand, RecordingDevice};
use arena_scene::{Arena, ArenaConfig, TextureSources};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "arena-cli", about = "CLI tool for the arena renderer")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Arena config file (JSON); built-in defaults when omitted
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Print instance counts and capacities for every drawable
    Layout,
    /// Print the world-space ray through a screen pixel
    Unproject {
        x: f32,
        y: f32,
        /// Screen width in pixels
        #[arg(long, default_value = "1280")]
        width: u32,
        /// Screen height in pixels
        #[arg(long, default_value = "720")]
        height: u32,
    },
    /// Run ticks on the recording backend and print the resulting draw commands
    Frame {
        /// Number of ball ticks before drawing
        #[arg(short, long, default_value = "1")]
        ticks: u32,
        /// Milliseconds between ticks, for the ball spin
        #[arg(long, default_value = "16")]
        step_ms: f32,
    },
    /// Print the effective config as JSON, or write it to a file
    Config {
        /// Output path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<ArenaConfig> {
    let config = match path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading config");
            ArenaConfig::load(path)?
        }
        None => ArenaConfig::default(),
    };
    Ok(config)
}

/// Builds the arena on the recording backend. Texture contents are decoded
/// only by GPU backends, so each source just gets a fresh handle.
fn recorded_arena(
    config: &ArenaConfig,
) -> anyhow::Result<(RecordingDevice, Arena<RecordingDevice>)> {
    let mut device = RecordingDevice::new();
    let textures = TextureSources::load(&config.textures)?
        .upload(|_| Ok::<_, Infallible>(device.create_texture()))?;
    let arena = Arena::new(&mut device, config, &textures)?;
    Ok((device, arena))
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
            println!("arena-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("math: {}", arena_math::crate_info());
            println!("render: {}", arena_render::crate_info());
            println!("render-wgpu: {}", arena_render_wgpu::crate_info());
            println!("scene: {}", arena_scene::crate_info());
        }
        Commands::Layout => {
            let (device, arena) = recorded_arena(&config)?;
            let (cage_width, cage_length) = arena.cage_size();
            println!("Cage: {cage_width} x {cage_length}");
            for stats in arena.stats() {
                println!(
                    "{:<18} {:>6} / {:<6}",
                    stats.name, stats.instances, stats.capacity
                );
            }
            let bytes: usize = device.buffers().iter().map(|b| b.bytes.len()).sum();
            println!(
                "Buffers: {} ({} bytes), textures: {}",
                device.buffers().len(),
                bytes,
                device.texture_count()
            );
        }
        Commands::Unproject {
            x,
            y,
            width,
            height,
        } => {
            let mut camera = Camera::new(config.camera.to_desc(width, height));
            camera.update();
            let ray = camera.unproject(x, y)?;
            println!("Pixel: ({x}, {y}) on {width}x{height}");
            println!("Origin: {:?}", ray.origin.to_array());
            println!("Direction: {:?}", ray.direction.to_array());
            println!("Near: {:?}", ray.near.to_array());
            println!("Far: {:?}", ray.far.to_array());
        }
        Commands::Frame { ticks, step_ms } => {
            let (mut device, mut arena) = recorded_arena(&config)?;
            for tick in 0..ticks {
                arena.tick(&mut device, tick as f32 * step_ms)?;
            }
            let ball = arena.ball().position();
            println!(
                "After {ticks} ticks: ball at ({:.2}, {:.2}, {:.2})",
                ball.x(),
                ball.y(),
                ball.z()
            );

            let mut recorder = CommandRecorder::new();
            arena.draw(&mut recorder);
            for command in recorder.commands() {
                match command {
                    DrawCommand::DrawInstanced { .. } => println!("  {command}"),
                    _ => println!("{command}"),
                }
            }
            println!("Draw calls: {}", recorder.draw_calls().count());
        }
        Commands::Config { output } => {
            config.validate()?;
            match output {
                Some(path) => {
                    config.save(&path)?;
                    println!("Config written to {}", path.display());
                }
                None => println!("{}", serde_json::to_string_pretty(&config)?),
            }
        }
    }

    Ok(())
}
