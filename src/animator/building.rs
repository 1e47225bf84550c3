//! Per-building animation state.

use std::time::Duration;

use crate::config::BuildingSpec;

/// Ease-out cubic: fast start, gentle landing. Maps `[0, 1]` onto `[0, 1]`.
pub fn ease_out_cubic(t: f32) -> f32 {
    1.0 - (1.0 - t).powi(3)
}

/// Progress of an animation that started at `start` and lasts `duration`,
/// clamped to `[0, 1]`.
pub fn progress(now: Duration, start: Duration, duration: Duration) -> f32 {
    if duration.is_zero() {
        return 1.0;
    }
    let elapsed = now.saturating_sub(start);
    (elapsed.as_secs_f64() / duration.as_secs_f64()).clamp(0.0, 1.0) as f32
}

/// Whether geometry built at `stored` height should be rebuilt for `live`.
pub fn needs_regeneration(live: f32, stored: f32, threshold: f32) -> bool {
    (live - stored).abs() > threshold
}

#[derive(Debug, Clone, PartialEq)]
pub struct Building {
    /// Construction order; also the phase offset of the bob.
    pub index: usize,
    pub spec: BuildingSpec,
    pub target_height: f32,
    pub current_height: f32,
    /// Set when the stagger timer fires and never cleared.
    pub is_building: bool,
    /// Clock reading when the stagger timer fired.
    pub build_start: Option<Duration>,
    /// Index of this building's mesh in the scene.
    pub mesh: usize,
}

impl Building {
    /// A building that has not started growing.
    pub fn pending(index: usize, spec: BuildingSpec, target_height: f32, mesh: usize) -> Self {
        Self {
            index,
            spec,
            target_height,
            current_height: 0.0,
            is_building: false,
            build_start: None,
            mesh,
        }
    }

    /// A building shown at full height from the start.
    pub fn complete(index: usize, spec: BuildingSpec, target_height: f32, mesh: usize) -> Self {
        Self {
            current_height: target_height,
            ..Self::pending(index, spec, target_height, mesh)
        }
    }

    pub fn start(&mut self, now: Duration) {
        self.is_building = true;
        self.build_start = Some(now);
    }

    pub fn is_complete(&self) -> bool {
        self.current_height >= self.target_height
    }

    /// Advances the growth animation to `now`.
    ///
    /// The height follows the eased curve but never goes down, and lands on
    /// the target exactly once `duration` has passed. Returns `true` on the
    /// frame the building reaches its target.
    pub fn grow(&mut self, now: Duration, duration: Duration) -> bool {
        if !self.is_building || self.is_complete() {
            return false;
        }
        let Some(start) = self.build_start else {
            return false;
        };

        let eased = ease_out_cubic(progress(now, start, duration));
        let height = (self.target_height * eased).min(self.target_height);
        self.current_height = self.current_height.max(height);
        self.is_complete()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec() -> BuildingSpec {
        BuildingSpec {
            x: 0.0,
            z: -100.0,
            width: 45.0,
            depth: 45.0,
            delay: Duration::from_millis(500),
        }
    }

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    #[test]
    fn test_ease_out_cubic_endpoints() {
        assert_eq!(ease_out_cubic(0.0), 0.0);
        assert_eq!(ease_out_cubic(1.0), 1.0);
        assert!((ease_out_cubic(0.5) - 0.875).abs() < 1e-6);
    }

    #[test]
    fn test_progress_clamps() {
        assert_eq!(progress(ms(100), ms(500), ms(2000)), 0.0);
        assert_eq!(progress(ms(1500), ms(500), ms(2000)), 0.5);
        assert_eq!(progress(ms(9000), ms(500), ms(2000)), 1.0);
        assert_eq!(progress(ms(0), ms(0), Duration::ZERO), 1.0);
    }

    #[test]
    fn test_regeneration_threshold_is_strict() {
        assert!(!needs_regeneration(101.0, 100.0, 1.0));
        assert!(!needs_regeneration(99.0, 100.0, 1.0));
        assert!(needs_regeneration(101.01, 100.0, 1.0));
        assert!(needs_regeneration(98.5, 100.0, 1.0));
    }

    #[test]
    fn test_grow_reaches_target_exactly() {
        let target = 613.85;
        let mut building = Building::pending(1, spec(), target, 1);
        building.start(ms(500));

        assert!(!building.grow(ms(1500), ms(2000)));
        assert!(building.current_height < target);
        assert!(building.grow(ms(2500), ms(2000)));
        assert_eq!(building.current_height, target);
        assert!(building.is_building);
    }

    #[test]
    fn test_grow_never_decreases() {
        let mut building = Building::pending(0, spec(), 600.0, 0);
        building.start(ms(1000));
        building.grow(ms(2000), ms(2000));
        let reached = building.current_height;

        // A clock reading before the last one must not shrink the building
        building.grow(ms(1200), ms(2000));
        assert_eq!(building.current_height, reached);
    }

    #[test]
    fn test_grow_waits_for_start() {
        let mut building = Building::pending(0, spec(), 600.0, 0);
        assert!(!building.grow(ms(5000), ms(2000)));
        assert_eq!(building.current_height, 0.0);
    }

    #[test]
    fn test_complete_building_does_not_grow() {
        let mut building = Building::complete(2, spec(), 600.0, 2);
        assert!(building.is_complete());
        assert!(!building.is_building);
        assert!(!building.grow(ms(0), ms(2000)));
    }
}
