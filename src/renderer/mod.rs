//! Rendering backends for the skyline scene.
//!
//! This module defines [`RenderBackend`], the seam between the animator and the
//! graphics library, and its two implementations:
//!
//! - [`wgpu_backend::WgpuBackend`] draws into a window surface with `wgpu`
//! - [`headless::HeadlessBackend`] tracks resources without a GPU
//!
//! The supporting submodules hold the vertex/uniform layouts and the pipeline
//! builder used by the `wgpu` backend.

/// GPU-free backend used for smoke runs and tests.
pub mod headless;
/// Pipeline building utilities for WGPU.
pub mod pipeline_builder;
/// Vertex and uniform layouts shared with the shaders.
pub mod primitives;
/// Device, surface and per-frame drawing with `wgpu`.
pub mod wgpu_backend;

use crate::scene::{BoxGeometry, GeometryId, Material, MaterialId, PerspectiveCamera, Scene};

/// Resource management and drawing operations the animator needs from a
/// graphics library.
///
/// Every `create_*` call hands out a handle that stays valid until the matching
/// `dispose_*` call. [`RenderBackend::dispose`] releases the graphics context
/// itself; a disposed backend ignores further draws.
pub trait RenderBackend {
    fn create_box_geometry(&mut self, geometry: &BoxGeometry) -> GeometryId;

    /// Builds the line-segment geometry for the twelve edges of `geometry`.
    fn create_edges_geometry(&mut self, geometry: &BoxGeometry) -> GeometryId;

    fn create_material(&mut self, material: &Material) -> MaterialId;

    fn dispose_geometry(&mut self, id: GeometryId);

    fn dispose_material(&mut self, id: MaterialId);

    /// Resizes the output surface. Zero-sized requests are ignored.
    fn resize(&mut self, width: u32, height: u32);

    /// Draws `scene` as seen from `camera`.
    fn render(&mut self, scene: &Scene, camera: &PerspectiveCamera);

    fn dispose(&mut self);

    fn is_disposed(&self) -> bool;
}

/// Hands out increasing resource ids.
#[derive(Debug, Default)]
pub struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    pub fn geometry(&mut self) -> GeometryId {
        GeometryId(self.bump())
    }

    pub fn material(&mut self) -> MaterialId {
        MaterialId(self.bump())
    }

    fn bump(&mut self) -> u64 {
        self.next += 1;
        self.next
    }
}
