//! Event handler module for the skyline overlay.
//!
//! Contains the App struct and its event handling logic.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::WindowEvent,
    event_loop::ActiveEventLoop,
    window::{Fullscreen, Window, WindowAttributes, WindowId, WindowLevel},
};

use crate::app::app_state::AppState;
use crate::config::SkylineConfig;
use crate::error::SkylineError;
use crate::page::PageKind;

const WINDOW_TITLE: &str = "Skyline";
const WINDOWED_SIZE: PhysicalSize<u32> = PhysicalSize::new(1360, 768);

/// Main application structure for the overlay.
///
/// This struct implements the [`ApplicationHandler`] trait to handle window
/// events. It manages the WGPU instance, the application state, and shutdown.
///
/// # Lifecycle
/// 1. Created with `App::new()` - initializes the WGPU instance
/// 2. `resumed` creates the overlay window and the [`AppState`]
/// 3. Redraws drive the animation until the window closes or Ctrl+C arrives
pub struct App {
    instance: wgpu::Instance,
    page: PageKind,
    config: SkylineConfig,
    windowed: bool,
    /// Set from the Ctrl+C handler.
    shutdown_requested: Arc<AtomicBool>,
    state: Option<AppState>,
    /// Start-up failure that ended the event loop, if any.
    failure: Option<SkylineError>,
}

impl App {
    pub fn new(
        page: PageKind,
        config: SkylineConfig,
        windowed: bool,
        shutdown_requested: Arc<AtomicBool>,
    ) -> Self {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        Self {
            instance,
            page,
            config,
            windowed,
            shutdown_requested,
            state: None,
            failure: None,
        }
    }

    /// Takes the error that stopped start-up, if there was one.
    pub fn take_failure(&mut self) -> Option<SkylineError> {
        self.failure.take()
    }

    fn window_attributes(&self) -> WindowAttributes {
        let attributes = Window::default_attributes()
            .with_title(WINDOW_TITLE)
            .with_transparent(true)
            .with_decorations(false)
            .with_window_level(WindowLevel::AlwaysOnBottom);

        if self.windowed {
            attributes.with_inner_size(WINDOWED_SIZE)
        } else {
            attributes.with_fullscreen(Some(Fullscreen::Borderless(None)))
        }
    }

    fn start(&mut self, event_loop: &ActiveEventLoop) -> Result<(), SkylineError> {
        let window = Arc::new(event_loop.create_window(self.window_attributes())?);

        // The overlay must never take pointer input from the page below
        if let Err(err) = window.set_cursor_hittest(false) {
            tracing::warn!("Could not make the overlay click-through: {}", err);
        }

        let state = pollster::block_on(AppState::new(
            &self.instance,
            Arc::clone(&window),
            self.page,
            self.config.clone(),
        ))?;

        window.request_redraw();
        self.state = Some(state);
        Ok(())
    }

    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(mut state) = self.state.take() {
            state.shutdown();
        }
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() || self.failure.is_some() {
            return;
        }

        if let Err(err) = self.start(event_loop) {
            tracing::error!("Skyline could not start: {}", err);
            self.failure = Some(err);
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                tracing::info!("Window closed");
                self.shutdown(event_loop);
            }
            WindowEvent::Resized(size) => {
                if let Some(state) = self.state.as_mut() {
                    state.resize(size.width, size.height);
                }
            }
            WindowEvent::RedrawRequested => {
                if let Some(state) = self.state.as_mut() {
                    state.redraw();
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.shutdown_requested.load(Ordering::SeqCst) {
            tracing::info!("Interrupted, shutting down");
            self.shutdown(event_loop);
        }
    }
}
