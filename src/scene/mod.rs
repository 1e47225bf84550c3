//! Scene graph for the skyline.
//!
//! The scene is a flat list of meshes plus one ambient and one directional
//! light. Meshes only hold opaque [`GeometryId`]/[`MaterialId`] handles; the
//! resources behind them live in a [`RenderBackend`] and must be released
//! through it.
//!
//! # Module Structure
//!
//! - [`camera`]: perspective camera
//! - [`geometry`]: box dimensions and edge topology
//! - [`material`]: colours, Phong and line materials

pub mod camera;
pub mod geometry;
pub mod material;

pub use camera::PerspectiveCamera;
pub use geometry::BoxGeometry;
pub use material::{Color, LineMaterial, Material, PhongMaterial};

use crate::math::{Mat4, Vec3};
use crate::renderer::RenderBackend;

/// Handle to a geometry buffer owned by a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GeometryId(pub u64);

/// Handle to a material owned by a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaterialId(pub u64);

/// Position, Y rotation and scale of a mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    /// Rotation about the Y axis in radians.
    pub rotation_y: f32,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation_y: 0.0,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    /// Translation * rotation * scale.
    pub fn model_matrix(&self) -> Mat4 {
        let p = self.position;
        let s = self.scale;
        Mat4::translation(p.x(), p.y(), p.z())
            .multiply(&Mat4::rotation_y(self.rotation_y))
            .multiply(&Mat4::scaling(s.x(), s.y(), s.z()))
    }
}

/// Line segments drawn over a mesh's edges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeOverlay {
    pub geometry: GeometryId,
    pub material: MaterialId,
}

/// A box mesh with its edge overlay.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub geometry: GeometryId,
    /// Dimensions the current geometry buffer was built with.
    pub dimensions: BoxGeometry,
    pub material: MaterialId,
    pub edges: EdgeOverlay,
    pub transform: Transform,
}

impl Mesh {
    /// Uploads the box, its edges and both materials to `backend`.
    pub fn create(
        backend: &mut impl RenderBackend,
        dimensions: BoxGeometry,
        surface: PhongMaterial,
        lines: LineMaterial,
    ) -> Self {
        let geometry = backend.create_box_geometry(&dimensions);
        let edge_geometry = backend.create_edges_geometry(&dimensions);
        let material = backend.create_material(&Material::Phong(surface));
        let edge_material = backend.create_material(&Material::Line(lines));
        Self {
            geometry,
            dimensions,
            material,
            edges: EdgeOverlay {
                geometry: edge_geometry,
                material: edge_material,
            },
            transform: Transform::default(),
        }
    }

    /// Replaces the box and edge geometry with ones of the given height.
    ///
    /// The old buffers are released before the new ones are created.
    pub fn rebuild_height(&mut self, backend: &mut impl RenderBackend, height: f32) {
        backend.dispose_geometry(self.geometry);
        backend.dispose_geometry(self.edges.geometry);

        self.dimensions = self.dimensions.with_height(height);
        self.geometry = backend.create_box_geometry(&self.dimensions);
        self.edges.geometry = backend.create_edges_geometry(&self.dimensions);
    }

    /// Releases every backend resource this mesh references.
    pub fn dispose(&self, backend: &mut impl RenderBackend) {
        backend.dispose_geometry(self.geometry);
        backend.dispose_material(self.material);
        backend.dispose_geometry(self.edges.geometry);
        backend.dispose_material(self.edges.material);
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientLight {
    pub color: Color,
    pub intensity: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    pub color: Color,
    pub intensity: f32,
    /// The light shines from this position towards the origin.
    pub position: Vec3,
}

impl DirectionalLight {
    /// Unit vector pointing from the surface towards the light.
    pub fn direction(&self) -> Vec3 {
        self.position.normalize()
    }
}

/// Lights plus the meshes to draw, in insertion order.
#[derive(Debug, Clone)]
pub struct Scene {
    pub ambient: AmbientLight,
    pub directional: DirectionalLight,
    pub meshes: Vec<Mesh>,
}

impl Scene {
    pub fn new(ambient: AmbientLight, directional: DirectionalLight) -> Self {
        Self {
            ambient,
            directional,
            meshes: Vec::new(),
        }
    }

    /// Adds a mesh and returns its index.
    pub fn add(&mut self, mesh: Mesh) -> usize {
        self.meshes.push(mesh);
        self.meshes.len() - 1
    }

    /// Releases all mesh resources in `backend` and empties the scene.
    pub fn dispose(&mut self, backend: &mut impl RenderBackend) {
        for mesh in self.meshes.drain(..) {
            mesh.dispose(backend);
        }
    }
}
