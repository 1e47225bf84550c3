//! Command-line options and the constants that shape the skyline.
//!
//! [`Cli`] is the user-facing surface. Everything else here is a plain struct
//! whose `Default` holds the tuned values: camera framing, lights, materials,
//! the three buildings and the animation timings.

use std::time::Duration;

use clap::Parser;

use crate::math::Vec3;
use crate::page::PageKind;
use crate::scene::{Color, LineMaterial, PhongMaterial};

/// Animated 3D skyline drawn as a transparent desktop overlay.
#[derive(Parser, Debug, Clone)]
#[clap(name = "skyline", version)]
pub struct Cli {
    /// Path of the page the overlay accompanies; `/`, `/home` and
    /// `/home/index` play the build-up animation.
    #[clap(long, env = "SKYLINE_PATH", default_value = "/")]
    pub path: String,

    /// Open a regular window instead of a borderless fullscreen overlay.
    #[clap(long)]
    pub windowed: bool,

    /// Opacity of the whole overlay, between 0 and 1.
    #[clap(long, default_value_t = 0.3)]
    pub opacity: f32,

    /// Run the animation without a window or GPU and log the building heights.
    #[clap(long)]
    pub headless: bool,

    /// Simulated run time for `--headless`, in seconds.
    #[clap(long, default_value_t = 3.0)]
    pub headless_seconds: f32,
}

/// Placement, footprint and start delay of one building.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BuildingSpec {
    pub x: f32,
    pub z: f32,
    pub width: f32,
    pub depth: f32,
    /// Delay before growth starts, landing page only.
    pub delay: Duration,
}

/// Rotation and bob for one kind of page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageMotion {
    /// Radians added to the Y rotation every frame.
    pub rotation_speed: f32,
    /// Peak vertical offset of the bob, in world units.
    pub bob_amplitude: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnimationConfig {
    /// Time for a building to grow from nothing to full height.
    pub growth_duration: Duration,
    /// Geometry is rebuilt once the live height drifts further than this.
    pub regeneration_threshold: f32,
    /// Height of the placeholder geometry built before growth starts.
    pub min_geometry_height: f32,
    /// Scale Y of a landing-page building before it starts growing.
    pub initial_scale_y: f32,
    pub landing: PageMotion,
    pub other: PageMotion,
    /// Angular frequency of the bob, in radians per millisecond.
    pub bob_frequency: f64,
    /// Angular frequency of the camera orbit, in radians per millisecond.
    pub orbit_frequency: f64,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            growth_duration: Duration::from_millis(2000),
            regeneration_threshold: 1.0,
            min_geometry_height: 1.0,
            initial_scale_y: 0.01,
            landing: PageMotion {
                rotation_speed: 0.001,
                bob_amplitude: 2.0,
            },
            other: PageMotion {
                rotation_speed: 0.003,
                bob_amplitude: 2.0,
            },
            bob_frequency: 0.001,
            orbit_frequency: 0.0001,
        }
    }
}

impl AnimationConfig {
    pub fn motion(&self, page: PageKind) -> PageMotion {
        match page {
            PageKind::Landing => self.landing,
            PageKind::Other => self.other,
        }
    }
}

/// Camera, lights, materials and buildings of the scene.
#[derive(Debug, Clone, PartialEq)]
pub struct SkylineConfig {
    /// Vertical field of view in degrees.
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    /// Camera Z at rest.
    pub camera_z: f32,
    /// Z of the plane the buildings stand on; also the camera's look-at depth.
    pub building_plane_z: f32,
    /// Target height used when the frustum height is not a positive number.
    pub fallback_height: f32,
    pub orbit_radius_x: f32,
    pub orbit_radius_z: f32,
    pub ambient_color: Color,
    pub ambient_intensity: f32,
    pub directional_color: Color,
    pub directional_intensity: f32,
    pub directional_position: Vec3,
    pub surface: PhongMaterial,
    pub lines: LineMaterial,
    pub overlay_opacity: f32,
    pub buildings: Vec<BuildingSpec>,
    pub animation: AnimationConfig,
}

const CYAN: Color = Color::from_hex(0x00f0ff);

impl Default for SkylineConfig {
    fn default() -> Self {
        Self {
            fov: 75.0,
            near: 0.1,
            far: 2000.0,
            camera_z: 300.0,
            building_plane_z: -100.0,
            fallback_height: 600.0,
            orbit_radius_x: 50.0,
            orbit_radius_z: 30.0,
            ambient_color: CYAN,
            ambient_intensity: 0.3,
            directional_color: CYAN,
            directional_intensity: 0.5,
            directional_position: Vec3::new(50.0, 100.0, 50.0),
            surface: PhongMaterial {
                color: CYAN,
                emissive: Color::from_hex(0x001122),
                opacity: 0.8,
                transparent: true,
            },
            lines: LineMaterial { color: CYAN },
            overlay_opacity: 0.3,
            buildings: vec![
                BuildingSpec {
                    x: -100.0,
                    z: -100.0,
                    width: 50.0,
                    depth: 50.0,
                    delay: Duration::ZERO,
                },
                BuildingSpec {
                    x: 0.0,
                    z: -100.0,
                    width: 45.0,
                    depth: 45.0,
                    delay: Duration::from_millis(500),
                },
                BuildingSpec {
                    x: 100.0,
                    z: -100.0,
                    width: 48.0,
                    depth: 48.0,
                    delay: Duration::from_millis(1000),
                },
            ],
            animation: AnimationConfig::default(),
        }
    }
}

impl SkylineConfig {
    /// Defaults with the command-line overrides applied.
    pub fn from_cli(cli: &Cli) -> Self {
        let overlay_opacity = if cli.opacity.is_finite() {
            cli.opacity.clamp(0.0, 1.0)
        } else {
            tracing::warn!("Ignoring non-finite opacity {}", cli.opacity);
            Self::default().overlay_opacity
        };
        Self {
            overlay_opacity,
            ..Self::default()
        }
    }

    /// Distance from the camera at rest to the building plane.
    pub fn viewing_distance(&self) -> f32 {
        self.camera_z - self.building_plane_z
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["skyline"]);
        assert!(!cli.windowed);
        assert!(!cli.headless);
        assert_eq!(cli.opacity, 0.3);
        assert_eq!(cli.headless_seconds, 3.0);
    }

    #[test]
    fn test_cli_overrides() {
        let cli = Cli::parse_from([
            "skyline",
            "--path",
            "/about",
            "--windowed",
            "--opacity",
            "0.5",
        ]);
        assert_eq!(cli.path, "/about");
        assert!(cli.windowed);
        assert_eq!(SkylineConfig::from_cli(&cli).overlay_opacity, 0.5);
    }

    #[test]
    fn test_opacity_is_clamped() {
        let cli = Cli::parse_from(["skyline", "--opacity", "4"]);
        assert_eq!(SkylineConfig::from_cli(&cli).overlay_opacity, 1.0);
    }

    #[test]
    fn test_default_buildings_are_staggered() {
        let config = SkylineConfig::default();
        let delays: Vec<u128> = config
            .buildings
            .iter()
            .map(|b| b.delay.as_millis())
            .collect();
        assert_eq!(delays, vec![0, 500, 1000]);
        assert_eq!(config.viewing_distance(), 400.0);
    }

    #[test]
    fn test_landing_page_rotates_slower() {
        let animation = AnimationConfig::default();
        assert_eq!(animation.motion(PageKind::Landing).rotation_speed, 0.001);
        assert_eq!(animation.motion(PageKind::Other).rotation_speed, 0.003);
    }
}
