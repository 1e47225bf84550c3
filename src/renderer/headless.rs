//! GPU-free render backend.
//!
//! [`HeadlessBackend`] implements [`RenderBackend`] by bookkeeping alone: it
//! hands out ids, remembers which geometries and materials are live, and
//! counts draws. `--headless` runs use it on machines without a GPU, and the
//! unit tests use it to check resource lifetimes.

use std::collections::HashMap;

use crate::renderer::{IdAllocator, RenderBackend};
use crate::scene::{BoxGeometry, GeometryId, Material, MaterialId, PerspectiveCamera, Scene};

/// Counters reported by [`HeadlessBackend::stats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BackendStats {
    pub geometries_created: usize,
    pub geometries_disposed: usize,
    pub live_geometries: usize,
    pub live_materials: usize,
    pub frames_rendered: usize,
    pub width: u32,
    pub height: u32,
}

/// Backend that records what a GPU backend would have done.
#[derive(Debug)]
pub struct HeadlessBackend {
    ids: IdAllocator,
    geometries: HashMap<GeometryId, BoxGeometry>,
    materials: HashMap<MaterialId, Material>,
    stats: BackendStats,
    disposed: bool,
}

impl HeadlessBackend {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            ids: IdAllocator::default(),
            geometries: HashMap::new(),
            materials: HashMap::new(),
            stats: BackendStats {
                width,
                height,
                ..BackendStats::default()
            },
            disposed: false,
        }
    }

    pub fn stats(&self) -> BackendStats {
        BackendStats {
            live_geometries: self.geometries.len(),
            live_materials: self.materials.len(),
            ..self.stats
        }
    }

    pub fn is_geometry_live(&self, id: GeometryId) -> bool {
        self.geometries.contains_key(&id)
    }

    fn insert_geometry(&mut self, geometry: &BoxGeometry) -> GeometryId {
        let id = self.ids.geometry();
        self.geometries.insert(id, *geometry);
        self.stats.geometries_created += 1;
        id
    }
}

impl RenderBackend for HeadlessBackend {
    fn create_box_geometry(&mut self, geometry: &BoxGeometry) -> GeometryId {
        self.insert_geometry(geometry)
    }

    fn create_edges_geometry(&mut self, geometry: &BoxGeometry) -> GeometryId {
        self.insert_geometry(geometry)
    }

    fn create_material(&mut self, material: &Material) -> MaterialId {
        let id = self.ids.material();
        self.materials.insert(id, *material);
        id
    }

    fn dispose_geometry(&mut self, id: GeometryId) {
        if self.geometries.remove(&id).is_some() {
            self.stats.geometries_disposed += 1;
        }
    }

    fn dispose_material(&mut self, id: MaterialId) {
        self.materials.remove(&id);
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.stats.width = width;
            self.stats.height = height;
        }
    }

    fn render(&mut self, _scene: &Scene, _camera: &PerspectiveCamera) {
        if self.disposed {
            return;
        }
        self.stats.frames_rendered += 1;
    }

    fn dispose(&mut self) {
        self.disposed = true;
    }

    fn is_disposed(&self) -> bool {
        self.disposed
    }
}
