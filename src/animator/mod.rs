//! The skyline animation.
//!
//! [`SkylineAnimator`] owns the scene, the camera and a [`RenderBackend`], and
//! advances all of them once per [`frame`](SkylineAnimator::frame):
//!
//! 1. Fire stagger timers that are due, starting growth of their buildings.
//! 2. For each building in construction order: grow it along an ease-out
//!    curve, keep its mesh in step with the live height (rebuilding the
//!    geometry once it drifts more than the threshold), then spin and bob it
//!    once it has finished growing.
//! 3. Move the camera along its slow orbit and render.
//!
//! On landing pages the buildings start flat and rise one after another; on
//! every other page they appear at full height and start turning right away.
//!
//! # Module Structure
//!
//! - [`building`]: per-building state and the growth curve
//! - [`timers`]: one-shot timers polled against the frame clock

pub mod building;
pub mod timers;

pub use building::{Building, ease_out_cubic, needs_regeneration};
pub use timers::{TimerEvent, Timers};

use std::f32::consts::TAU;
use std::time::Duration;

use crate::config::{AnimationConfig, SkylineConfig};
use crate::math::Vec3;
use crate::page::PageKind;
use crate::renderer::RenderBackend;
use crate::scene::{AmbientLight, BoxGeometry, DirectionalLight, Mesh, PerspectiveCamera, Scene};

/// What the host should do after a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameRequest {
    /// Schedule another frame.
    Continue,
    /// The animator has been torn down; stop requesting frames.
    Stop,
}

pub struct SkylineAnimator<B: RenderBackend> {
    page: PageKind,
    config: SkylineConfig,
    backend: B,
    scene: Scene,
    camera: PerspectiveCamera,
    buildings: Vec<Building>,
    timers: Timers,
    /// Visible height at the building plane; the target of every building.
    viewport_height_3d: f32,
    running: bool,
}

impl<B: RenderBackend> SkylineAnimator<B> {
    /// Builds the scene in `backend` and schedules the landing-page stagger
    /// timers relative to `now`.
    ///
    /// `viewport` is the output size in pixels and only sets the camera aspect.
    pub fn new(
        page: PageKind,
        config: SkylineConfig,
        mut backend: B,
        viewport: (u32, u32),
        now: Duration,
    ) -> Self {
        let mut camera = PerspectiveCamera::new(config.fov, 1.0, config.near, config.far);
        camera.set_viewport(viewport.0, viewport.1);

        let visible_height = camera.visible_height_at(config.viewing_distance());
        let viewport_height_3d = if visible_height.is_finite() && visible_height > 0.0 {
            visible_height
        } else {
            tracing::warn!(
                "Frustum height {} is unusable, falling back to {}",
                visible_height,
                config.fallback_height
            );
            config.fallback_height
        };

        let centre = Vec3::new(0.0, viewport_height_3d / 2.0, config.building_plane_z);
        camera.position = Vec3::new(0.0, centre.y(), config.camera_z);
        camera.look_at(centre);

        let mut scene = Scene::new(
            AmbientLight {
                color: config.ambient_color,
                intensity: config.ambient_intensity,
            },
            DirectionalLight {
                color: config.directional_color,
                intensity: config.directional_intensity,
                position: config.directional_position,
            },
        );

        let mut timers = Timers::new();
        let mut buildings = Vec::with_capacity(config.buildings.len());
        let animation = &config.animation;

        for (index, spec) in config.buildings.iter().enumerate() {
            let geometry_height = if page.is_landing() {
                animation.min_geometry_height
            } else {
                viewport_height_3d
            };
            let mut mesh = Mesh::create(
                &mut backend,
                BoxGeometry::new(spec.width, geometry_height, spec.depth),
                config.surface,
                config.lines,
            );
            mesh.transform.position = Vec3::new(spec.x, geometry_height / 2.0, spec.z);

            let building = if page.is_landing() {
                mesh.transform.scale.set_y(animation.initial_scale_y);
                timers.schedule(now + spec.delay, TimerEvent::StartBuilding(index));
                Building::pending(index, *spec, viewport_height_3d, scene.meshes.len())
            } else {
                Building::complete(index, *spec, viewport_height_3d, scene.meshes.len())
            };
            scene.add(mesh);
            buildings.push(building);
        }

        tracing::info!(
            "Skyline ready: {:?} page, {} buildings, target height {:.1}",
            page,
            buildings.len(),
            viewport_height_3d
        );

        Self {
            page,
            config,
            backend,
            scene,
            camera,
            buildings,
            timers,
            viewport_height_3d,
            running: true,
        }
    }

    /// Advances the animation to `now` and renders one frame.
    pub fn frame(&mut self, now: Duration) -> FrameRequest {
        if !self.running {
            return FrameRequest::Stop;
        }

        self.fire_timers(now);

        let now_ms = now.as_secs_f64() * 1000.0;
        for building in &mut self.buildings {
            if let Some(mesh) = self.scene.meshes.get_mut(building.mesh) {
                animate_building(
                    building,
                    mesh,
                    &mut self.backend,
                    self.page,
                    &self.config.animation,
                    now,
                    now_ms,
                );
            }
        }

        self.update_camera(now_ms);
        self.backend.render(&self.scene, &self.camera);
        FrameRequest::Continue
    }

    /// Applies a new output size. Zero-sized requests are ignored.
    ///
    /// Building heights stay as they are: the frustum height at the building
    /// plane depends only on the field of view and the distance.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 || !self.running {
            return;
        }
        self.camera.set_viewport(width, height);
        self.backend.resize(width, height);
        tracing::info!("Resized to {}x{}", width, height);
    }

    /// Cancels pending timers, stops the frame loop and releases every
    /// resource in the backend. Safe to call more than once.
    pub fn destroy(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;
        self.timers.cancel_all();
        self.scene.dispose(&mut self.backend);
        self.backend.dispose();
        tracing::info!("Skyline torn down");
    }

    pub fn page(&self) -> PageKind {
        self.page
    }

    pub fn buildings(&self) -> &[Building] {
        &self.buildings
    }

    pub fn building(&self, index: usize) -> Option<&Building> {
        self.buildings.get(index)
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    pub fn viewport_height_3d(&self) -> f32 {
        self.viewport_height_3d
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn fire_timers(&mut self, now: Duration) {
        // Growth is timed from the scheduled start, not the frame that saw it
        for (due, event) in self.timers.drain_due(now) {
            match event {
                TimerEvent::StartBuilding(index) => {
                    if let Some(building) = self.buildings.get_mut(index) {
                        building.start(due);
                        tracing::info!(
                            "Building {} started growing at {} ms",
                            index,
                            due.as_millis()
                        );
                    }
                }
            }
        }
    }

    fn update_camera(&mut self, now_ms: f64) {
        let phase = now_ms * self.config.animation.orbit_frequency;
        let centre_y = self.viewport_height_3d / 2.0;
        self.camera.position = Vec3::new(
            phase.sin() as f32 * self.config.orbit_radius_x,
            centre_y,
            self.config.camera_z + phase.cos() as f32 * self.config.orbit_radius_z,
        );
        self.camera
            .look_at(Vec3::new(0.0, centre_y, self.config.building_plane_z));
    }
}

impl<B: RenderBackend> Drop for SkylineAnimator<B> {
    fn drop(&mut self) {
        self.destroy();
    }
}

/// One building's share of a frame: growth, mesh sync, then spin and bob.
fn animate_building(
    building: &mut Building,
    mesh: &mut Mesh,
    backend: &mut impl RenderBackend,
    page: PageKind,
    animation: &AnimationConfig,
    now: Duration,
    now_ms: f64,
) {
    if building.grow(now, animation.growth_duration) {
        tracing::info!(
            "Building {} reached {:.1}",
            building.index,
            building.current_height
        );
    }

    let landing = page.is_landing();

    // A landing-page building stays a flat placeholder until it has height
    if !landing || building.current_height > 0.0 {
        let live = if landing {
            building.current_height
        } else {
            building.target_height
        };

        if needs_regeneration(live, mesh.dimensions.height, animation.regeneration_threshold) {
            tracing::debug!(
                "Rebuilding geometry of building {}: {:.2} -> {:.2}",
                building.index,
                mesh.dimensions.height,
                live
            );
            mesh.rebuild_height(backend, live);
        }

        let scale_y = if landing {
            live / mesh.dimensions.height.max(f32::EPSILON)
        } else {
            1.0
        };
        mesh.transform.scale.set_y(scale_y);
        mesh.transform.position.set_y(live / 2.0);
    }

    if !landing || building.is_complete() {
        let motion = animation.motion(page);
        mesh.transform.rotation_y = (mesh.transform.rotation_y + motion.rotation_speed) % TAU;

        let phase = now_ms * animation.bob_frequency + building.index as f64;
        let bob = phase.sin() as f32 * motion.bob_amplitude;
        mesh.transform
            .position
            .set_y(building.target_height / 2.0 + bob);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::headless::HeadlessBackend;
    use crate::scene::{GeometryId, Material, MaterialId};
    use std::cell::RefCell;
    use std::rc::Rc;

    const EPSILON: f32 = 1e-3;

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    fn animator(path: &str) -> SkylineAnimator<HeadlessBackend> {
        SkylineAnimator::new(
            PageKind::from_path(path),
            SkylineConfig::default(),
            HeadlessBackend::new(1280, 720),
            (1280, 720),
            Duration::ZERO,
        )
    }

    /// Backend whose state outlives the animator that owns it.
    struct SharedBackend(Rc<RefCell<HeadlessBackend>>);

    impl RenderBackend for SharedBackend {
        fn create_box_geometry(&mut self, geometry: &BoxGeometry) -> GeometryId {
            self.0.borrow_mut().create_box_geometry(geometry)
        }

        fn create_edges_geometry(&mut self, geometry: &BoxGeometry) -> GeometryId {
            self.0.borrow_mut().create_edges_geometry(geometry)
        }

        fn create_material(&mut self, material: &Material) -> MaterialId {
            self.0.borrow_mut().create_material(material)
        }

        fn dispose_geometry(&mut self, id: GeometryId) {
            self.0.borrow_mut().dispose_geometry(id)
        }

        fn dispose_material(&mut self, id: MaterialId) {
            self.0.borrow_mut().dispose_material(id)
        }

        fn resize(&mut self, width: u32, height: u32) {
            self.0.borrow_mut().resize(width, height)
        }

        fn render(&mut self, scene: &Scene, camera: &PerspectiveCamera) {
            self.0.borrow_mut().render(scene, camera)
        }

        fn dispose(&mut self) {
            self.0.borrow_mut().dispose()
        }

        fn is_disposed(&self) -> bool {
            self.0.borrow().is_disposed()
        }
    }

    #[test]
    fn test_landing_page_starts_flat() {
        let skyline = animator("/");
        assert_eq!(skyline.pending_timers(), 3);
        assert_eq!(
            skyline.viewport_height_3d(),
            crate::math::frustum_height(75.0, 400.0)
        );
        assert!((skyline.viewport_height_3d() - 613.86).abs() < 0.01);

        for building in skyline.buildings() {
            let mesh = &skyline.scene().meshes[building.mesh];
            assert_eq!(building.current_height, 0.0);
            assert!(!building.is_building);
            assert_eq!(mesh.dimensions.height, 1.0);
            assert_eq!(mesh.transform.scale.y(), 0.01);
            assert_eq!(mesh.transform.position.y(), 0.5);
        }
    }

    #[test]
    fn test_staggered_start_scenario() {
        let mut skyline = animator("/home");
        let target = skyline.viewport_height_3d();

        skyline.frame(ms(400));
        let second = skyline.building(1).cloned();
        assert!(second.is_some_and(|b| !b.is_building));

        skyline.frame(ms(500));
        let second = skyline.building(1).cloned();
        assert!(second.as_ref().is_some_and(|b| b.is_building));
        assert!(second.is_some_and(|b| b.current_height == 0.0));

        skyline.frame(ms(2500));
        assert!(skyline.building(1).is_some_and(|b| b.current_height == target));
    }

    #[test]
    fn test_skipped_frame_keeps_scheduled_start() {
        let mut skyline = animator("/");
        let target = skyline.viewport_height_3d();

        // No frame lands on 500 ms; the timer is seen 100 ms late
        skyline.frame(ms(400));
        skyline.frame(ms(600));
        let second = skyline.building(1).cloned();
        assert!(second.as_ref().is_some_and(|b| b.build_start == Some(ms(500))));
        assert!(second.is_some_and(|b| b.current_height > 0.0));

        skyline.frame(ms(2000));
        assert!(skyline.building(1).is_some_and(|b| b.current_height < target));
        skyline.frame(ms(2500));
        assert!(skyline.building(1).is_some_and(|b| b.current_height == target));
    }

    #[test]
    fn test_each_building_lands_exactly_on_target() {
        let mut skyline = animator("/");
        let target = skyline.viewport_height_3d();

        // Fire every stagger timer on the frame it is due
        for t in [0, 500, 1000] {
            skyline.frame(ms(t));
        }

        for (index, start) in [0u64, 500, 1000].into_iter().enumerate() {
            skyline.frame(ms(start + 1500));
            assert!(skyline.buildings()[index].current_height < target);
            skyline.frame(ms(start + 2000));
            assert_eq!(skyline.buildings()[index].current_height, target);
        }
    }

    #[test]
    fn test_growth_is_monotonic_and_bounded() {
        let mut skyline = animator("/");
        let target = skyline.viewport_height_3d();
        let mut previous = vec![0.0; 3];

        for step in 0..240 {
            skyline.frame(ms(step * 16));
            for (building, last) in skyline.buildings().iter().zip(previous.iter_mut()) {
                assert!(building.current_height >= *last);
                assert!(building.current_height <= target);
                *last = building.current_height;
            }
        }
        assert!(previous.iter().all(|&h| h == target));
    }

    #[test]
    fn test_geometry_regenerates_only_past_threshold() {
        let mut skyline = animator("/");

        for step in 0..240 {
            let before: Vec<(GeometryId, f32)> = skyline
                .scene()
                .meshes
                .iter()
                .map(|mesh| (mesh.geometry, mesh.dimensions.height))
                .collect();

            skyline.frame(ms(step * 16));

            for building in skyline.buildings() {
                let mesh = &skyline.scene().meshes[building.mesh];
                let (old_geometry, stored) = before[building.mesh];
                let live = building.current_height;
                let drifted = live > 0.0 && (live - stored).abs() > 1.0;

                assert_eq!(mesh.geometry != old_geometry, drifted, "step {step}");
                if drifted {
                    assert_eq!(mesh.dimensions.height, live);
                }
                if live > 0.0 {
                    // What is drawn matches the live height between rebuilds
                    let drawn = mesh.dimensions.height * mesh.transform.scale.y();
                    assert!(approx_eq(drawn, live), "step {step}: {drawn} vs {live}");
                }
            }
        }
    }

    #[test]
    fn test_regeneration_releases_old_geometry() {
        let mut skyline = animator("/");
        skyline.frame(ms(0));
        let old = skyline.scene().meshes[0].clone();

        skyline.frame(ms(1000));
        let mesh = &skyline.scene().meshes[0];
        let backend = skyline.backend();

        assert_ne!(mesh.geometry, old.geometry);
        assert!(!backend.is_geometry_live(old.geometry));
        assert!(!backend.is_geometry_live(old.edges.geometry));
        assert!(backend.is_geometry_live(mesh.edges.geometry));
        assert_eq!(mesh.edges.material, old.edges.material);
        assert_eq!(backend.stats().live_geometries, 6);
    }

    #[test]
    fn test_landing_rotation_waits_for_completion() {
        let mut skyline = animator("/");
        let mut rotating_since = None;

        for step in 0..250 {
            let now = ms(step * 16);
            let was_complete = skyline.buildings()[0].is_complete();
            let rotation_before = skyline.scene().meshes[0].transform.rotation_y;

            skyline.frame(now);

            let complete = skyline.buildings()[0].is_complete();
            let rotation = skyline.scene().meshes[0].transform.rotation_y;
            if complete {
                assert!(approx_eq(rotation - rotation_before, 0.001));
                if !was_complete {
                    rotating_since = Some(now);
                }
            } else {
                assert_eq!(rotation, 0.0);
            }
        }

        assert_eq!(rotating_since, Some(ms(2000)));
    }

    #[test]
    fn test_other_page_shows_finished_skyline() {
        let mut skyline = animator("/about");
        let target = skyline.viewport_height_3d();
        assert_eq!(skyline.pending_timers(), 0);

        // Finished before any frame has run
        for building in skyline.buildings() {
            let mesh = &skyline.scene().meshes[building.mesh];
            assert!(!building.is_building);
            assert_eq!(building.current_height, target);
            assert_eq!(mesh.dimensions.height, target);
            assert_eq!(mesh.transform.scale.y(), 1.0);
            assert_eq!(mesh.transform.position.y(), target / 2.0);
        }

        skyline.frame(ms(0));

        for building in skyline.buildings() {
            let mesh = &skyline.scene().meshes[building.mesh];
            assert!(!building.is_building);
            assert_eq!(building.current_height, target);
            assert_eq!(mesh.dimensions.height, target);
            assert_eq!(mesh.transform.scale.y(), 1.0);
            assert!(approx_eq(mesh.transform.rotation_y, 0.003));

            let bob = (building.index as f32).sin() * 2.0;
            assert!(approx_eq(mesh.transform.position.y(), target / 2.0 + bob));
        }
        // No rebuilds on pages that never grow
        assert_eq!(skyline.backend().stats().geometries_created, 6);
    }

    #[test]
    fn test_camera_orbits_building_plane() {
        let mut skyline = animator("/");
        let centre_y = skyline.viewport_height_3d() / 2.0;

        skyline.frame(ms(0));
        let camera = skyline.camera();
        assert!(approx_eq(camera.position.x(), 0.0));
        assert!(approx_eq(camera.position.y(), centre_y));
        assert!(approx_eq(camera.position.z(), 330.0));
        assert_eq!(camera.target, Vec3::new(0.0, centre_y, -100.0));

        // A quarter orbit
        let quarter = (std::f64::consts::FRAC_PI_2 / 0.0001).round() as u64;
        skyline.frame(ms(quarter));
        let camera = skyline.camera();
        assert!((camera.position.x() - 50.0).abs() < 0.01);
        assert!((camera.position.z() - 300.0).abs() < 0.01);
    }

    #[test]
    fn test_resize_keeps_heights() {
        let mut skyline = animator("/");
        let target = skyline.viewport_height_3d();

        skyline.resize(800, 800);
        assert_eq!(skyline.camera().aspect, 1.0);
        assert_eq!(skyline.backend().stats().width, 800);

        skyline.resize(0, 600);
        assert_eq!(skyline.camera().aspect, 1.0);
        assert_eq!(skyline.viewport_height_3d(), target);
        assert!(skyline.buildings().iter().all(|b| b.target_height == target));
    }

    #[test]
    fn test_destroy_releases_everything() {
        let mut skyline = animator("/");
        skyline.frame(ms(0));
        skyline.frame(ms(700));
        let frames = skyline.backend().stats().frames_rendered;

        skyline.destroy();
        skyline.destroy();

        assert!(!skyline.is_running());
        assert_eq!(skyline.pending_timers(), 0);
        assert_eq!(skyline.frame(ms(800)), FrameRequest::Stop);

        let stats = skyline.backend().stats();
        assert!(skyline.backend().is_disposed());
        assert_eq!(stats.frames_rendered, frames);
        assert_eq!(stats.live_geometries, 0);
        assert_eq!(stats.live_materials, 0);
        assert_eq!(stats.geometries_created, stats.geometries_disposed);
    }

    #[test]
    fn test_drop_tears_down() {
        let shared = Rc::new(RefCell::new(HeadlessBackend::new(640, 480)));
        {
            let mut skyline = SkylineAnimator::new(
                PageKind::Landing,
                SkylineConfig::default(),
                SharedBackend(Rc::clone(&shared)),
                (640, 480),
                Duration::ZERO,
            );
            assert_eq!(skyline.frame(ms(16)), FrameRequest::Continue);
        }

        let backend = shared.borrow();
        assert!(backend.is_disposed());
        assert_eq!(backend.stats().live_geometries, 0);
        assert_eq!(backend.stats().live_materials, 0);
    }

    #[test]
    fn test_unusable_field_of_view_falls_back() {
        let config = SkylineConfig {
            fov: f32::NAN,
            ..SkylineConfig::default()
        };
        let skyline = SkylineAnimator::new(
            PageKind::Other,
            config,
            HeadlessBackend::new(100, 100),
            (100, 100),
            Duration::ZERO,
        );
        assert_eq!(skyline.viewport_height_3d(), 600.0);
    }
}
