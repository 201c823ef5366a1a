//! Harbor Twin - native entry point

#[cfg(not(target_arch = "wasm32"))]
use anyhow::Result;
#[cfg(not(target_arch = "wasm32"))]
use clap::Parser;
#[cfg(not(target_arch = "wasm32"))]
use std::path::PathBuf;
#[cfg(not(target_arch = "wasm32"))]
use tracing::{info, Level};
#[cfg(not(target_arch = "wasm32"))]
use tracing_subscriber::FmtSubscriber;

#[cfg(not(target_arch = "wasm32"))]
#[derive(Parser, Debug)]
#[command(name = "harbor-twin")]
#[command(about = "Interactive 3D digital twin of a container port")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "harbor.toml")]
    config: PathBuf,

    /// Index of the scene to start with
    #[arg(short, long)]
    scene: Option<usize>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Harbor Twin v{}", env!("CARGO_PKG_VERSION"));

    let mut config = harbor_viewer::config::load_config(&args.config)?;

    // Override start scene if specified
    if let Some(scene) = args.scene {
        config.start_scene = Some(scene);
    }

    let scenes = config.validate()?;
    info!(
        scenes = scenes.len(),
        fov = config.camera.fov_degrees,
        "Configuration loaded"
    );

    harbor_viewer::app::run(&config, scenes);
    Ok(())
}

// The web build starts from the library's wasm entry point
#[cfg(target_arch = "wasm32")]
fn main() {}
