//! State that exists once the overlay window is up.

use std::sync::Arc;

use winit::window::Window;

use crate::animator::{FrameRequest, SkylineAnimator};
use crate::app::FrameClock;
use crate::config::SkylineConfig;
use crate::error::SkylineError;
use crate::page::PageKind;
use crate::renderer::wgpu_backend::WgpuBackend;

/// The animator, the window it draws into, and the clock that times it.
///
/// Fields drop in declaration order, so the surface inside the animator goes
/// before the window it was created from.
pub struct AppState {
    pub animator: SkylineAnimator<WgpuBackend>,
    pub window: Arc<Window>,
    pub clock: FrameClock,
}

impl AppState {
    /// Creates the surface and graphics context for `window` and builds the
    /// scene.
    ///
    /// # Errors
    /// [`SkylineError::RendererUnavailable`] if neither a hardware nor a
    /// software adapter can drive the surface, or the underlying surface and
    /// device errors.
    pub async fn new(
        instance: &wgpu::Instance,
        window: Arc<Window>,
        page: PageKind,
        config: SkylineConfig,
    ) -> Result<Self, SkylineError> {
        let size = window.inner_size();
        let surface = instance.create_surface(Arc::clone(&window))?;
        let backend = WgpuBackend::new(
            instance,
            surface,
            size.width,
            size.height,
            config.overlay_opacity,
        )
        .await?;

        let clock = FrameClock::start();
        let animator =
            SkylineAnimator::new(page, config, backend, (size.width, size.height), clock.now());

        Ok(Self {
            animator,
            window,
            clock,
        })
    }

    /// Renders one frame and asks for the next while the animator runs.
    pub fn redraw(&mut self) -> FrameRequest {
        let request = self.animator.frame(self.clock.now());
        if request == FrameRequest::Continue {
            self.window.request_redraw();
        }
        request
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.animator.resize(width, height);
    }

    pub fn shutdown(&mut self) {
        self.animator.destroy();
    }
}
