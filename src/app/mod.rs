//! Application shell for the skyline overlay.
//!
//! This module hosts the animator in a window and drives it from the `winit`
//! event loop.
//!
//! # Module Structure
//!
//! - [`app_state`]: Contains the [`AppState`] struct which owns the window,
//!   the animator and the frame clock
//! - [`event_handler`]: Contains the [`App`] struct and event handling logic
//! - [`headless`]: Runs the animation without a window for smoke checks
//!
//! # Event Flow
//!
//! 1. **Resume**: the overlay window and the graphics context are created
//! 2. **Redraw**: the animator advances to the clock reading and renders,
//!    then asks for the next redraw
//! 3. **Shutdown**: closing the window or Ctrl+C tears the animator down and
//!    leaves the event loop
//!
//! # Threading Model
//!
//! Everything runs on the event loop thread. The Ctrl+C handler only flips an
//! atomic flag that the loop checks between events.

pub mod app_state;
pub mod event_handler;
pub mod headless;

pub use app_state::AppState;
pub use event_handler::App;

use std::time::{Duration, Instant};

/// Monotonic clock the animation is timed against.
#[derive(Debug, Clone, Copy)]
pub struct FrameClock {
    start: Instant,
}

impl FrameClock {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Time since the clock started.
    pub fn now(&self) -> Duration {
        self.start.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_clock_is_monotonic() {
        let clock = FrameClock::start();
        let first = clock.now();
        let second = clock.now();
        assert!(second >= first);
    }
}
