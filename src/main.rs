//! Skyline - an animated 3D skyline overlay
//!
//! Three translucent cyan towers drawn with WGPU into a transparent,
//! click-through window that sits behind everything else on the desktop. On
//! landing pages the towers rise one after another; elsewhere they start out
//! finished. Either way they turn slowly and bob while the camera circles.
//!
//! # Architecture
//! - `app/`: window, event loop and the headless runner
//! - `animator/`: growth, regeneration, rotation and camera orbit
//! - `scene/`: meshes, lights, materials and the camera
//! - `renderer/`: the backend seam with its WGPU and headless implementations
//! - `math/`: vectors and matrices
//!
//! # Usage
//! `skyline --path /home` for the landing-page build-up, `--windowed` for a
//! regular window, `--headless` to run without a GPU.

pub mod animator;
pub mod app;
pub mod config;
pub mod error;
pub mod logging;
pub mod math;
pub mod page;
pub mod renderer;
pub mod scene;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use winit::event_loop::{ControlFlow, EventLoop};

use crate::config::{Cli, SkylineConfig};
use crate::page::PageKind;

#[cfg(feature = "dhat-heap")]
#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

const DEFAULT_HEADLESS_SECONDS: f32 = 3.0;

fn main() -> anyhow::Result<()> {
    #[cfg(feature = "dhat-heap")]
    let _profiler = dhat::Profiler::new_heap();

    logging::init_tracing();

    let cli = Cli::parse();
    logging::install_panic_hook(&cli.path);
    let config = SkylineConfig::from_cli(&cli);
    let page = PageKind::from_path(&cli.path);
    tracing::info!("Starting skyline for {:?} ({:?} page)", cli.path, page);

    if cli.headless {
        let length = Duration::try_from_secs_f32(cli.headless_seconds).unwrap_or_else(|_| {
            tracing::warn!(
                "Invalid --headless-seconds {}, using {}",
                cli.headless_seconds,
                DEFAULT_HEADLESS_SECONDS
            );
            Duration::from_secs_f32(DEFAULT_HEADLESS_SECONDS)
        });
        app::headless::run(page, config, length);
        return Ok(());
    }

    run(page, config, cli.windowed)
}

/// Runs the overlay until the window closes or Ctrl+C is pressed.
fn run(page: PageKind, config: SkylineConfig, windowed: bool) -> anyhow::Result<()> {
    let shutdown_requested = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&shutdown_requested);
    ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst))
        .context("failed to install Ctrl+C handler")?;

    let event_loop = EventLoop::new().context("failed to create event loop")?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = app::App::new(page, config, windowed, shutdown_requested);
    event_loop
        .run_app(&mut app)
        .context("event loop terminated abnormally")?;

    match app.take_failure() {
        Some(err) => Err(err).context("skyline could not start"),
        None => Ok(()),
    }
}
