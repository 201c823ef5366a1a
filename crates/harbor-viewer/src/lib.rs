//! Harbor Viewer - interactive digital twin of a container port
//!
//! Native builds start from the `harbor-twin` binary; the web build starts
//! from [`main`] below with the built-in scene presets.

pub mod app;
pub mod config;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// WASM entry point
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn main() {
    // Set up panic hook for better error messages
    console_error_panic_hook::set_once();

    // Initialize logging with filtering to reduce noise
    tracing_wasm::set_as_global_default_with_config(
        tracing_wasm::WASMLayerConfigBuilder::new()
            .set_max_level(tracing::Level::WARN)
            .build()
    );

    let mut config = config::Config::default();
    config.start_scene = scene_from_url();

    match config.validate() {
        Ok(scenes) => app::run(&config, scenes),
        Err(e) => tracing::error!(error = %e, "Invalid built-in configuration"),
    }
}

/// `?scene=N` selects the starting scene
#[cfg(target_arch = "wasm32")]
fn scene_from_url() -> Option<usize> {
    let window = web_sys::window()?;
    let location = window.location().href().ok()?;
    let url = web_sys::Url::new(&location).ok()?;
    let value = url.search_params().get("scene")?;
    match value.parse() {
        Ok(index) => {
            tracing::info!(index, "Starting scene from URL parameter");
            Some(index)
        }
        Err(_) => {
            tracing::warn!(value = %value, "Ignoring non-numeric scene parameter");
            None
        }
    }
}
