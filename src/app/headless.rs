//! Window-free run of the animation.
//!
//! Steps the animator against [`HeadlessBackend`] on a simulated 60 Hz clock,
//! logging the building heights once a simulated second, then tears it down
//! and reports what the backend saw. Useful on machines without a GPU.

use std::time::Duration;

use crate::animator::SkylineAnimator;
use crate::config::SkylineConfig;
use crate::page::PageKind;
use crate::renderer::headless::{BackendStats, HeadlessBackend};

const VIEWPORT: (u32, u32) = (1360, 768);
const FRAME_RATE: f64 = 60.0;

pub fn run(page: PageKind, config: SkylineConfig, length: Duration) -> BackendStats {
    let backend = HeadlessBackend::new(VIEWPORT.0, VIEWPORT.1);
    let mut animator = SkylineAnimator::new(page, config, backend, VIEWPORT, Duration::ZERO);

    let frames = (length.as_secs_f64() * FRAME_RATE).round() as u64;
    let mut next_report = Duration::from_secs(1);

    for frame in 0..=frames {
        let now = Duration::from_secs_f64(frame as f64 / FRAME_RATE);
        animator.frame(now);

        if now >= next_report {
            let heights: Vec<String> = animator
                .buildings()
                .iter()
                .map(|building| format!("{:.1}", building.current_height))
                .collect();
            tracing::info!("t={}s heights: [{}]", next_report.as_secs(), heights.join(", "));
            next_report += Duration::from_secs(1);
        }
    }

    animator.destroy();
    let stats = animator.backend().stats();
    tracing::info!(
        "Headless run done: {} frames, {} geometries created, {} disposed, {} still live",
        stats.frames_rendered,
        stats.geometries_created,
        stats.geometries_disposed,
        stats.live_geometries + stats.live_materials
    );
    stats
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_landing_run_grows_and_cleans_up() {
        let stats = run(
            PageKind::Landing,
            SkylineConfig::default(),
            Duration::from_secs(3),
        );
        assert_eq!(stats.frames_rendered, 181);
        assert!(stats.geometries_created > 6);
        assert_eq!(stats.geometries_created, stats.geometries_disposed);
        assert_eq!(stats.live_geometries, 0);
        assert_eq!(stats.live_materials, 0);
    }

    #[test]
    fn test_other_page_run_never_rebuilds() {
        let stats = run(
            PageKind::Other,
            SkylineConfig::default(),
            Duration::from_millis(500),
        );
        assert_eq!(stats.frames_rendered, 31);
        assert_eq!(stats.geometries_created, 6);
    }
}
