//! Error type for setting up the skyline overlay.
//!
//! Only start-up can fail. Once the animator is running, per-frame problems
//! are logged and the frame is skipped.

/// Failures while creating the window or the graphics context.
#[derive(thiserror::Error, Debug)]
pub enum SkylineError {
    /// No adapter was found, not even the software fallback.
    #[error("no graphics adapter available (software fallback also failed)")]
    RendererUnavailable,

    #[error("failed to create render surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    #[error("failed to create graphics device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    #[error("render surface reports no supported formats")]
    UnsupportedSurface,

    #[error("failed to create overlay window: {0}")]
    Window(#[from] winit::error::OsError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_renderer_unavailable_message() {
        let message = SkylineError::RendererUnavailable.to_string();
        assert!(message.contains("no graphics adapter"));
    }
}
