//! `wgpu` implementation of [`RenderBackend`].
//!
//! [`WgpuBackend`] owns the device, the window surface and every GPU buffer the
//! scene references. Each frame it draws the box meshes back to front with a
//! lit triangle pipeline, then the edge overlays with an unlit line pipeline,
//! both blended with premultiplied alpha over a fully transparent clear so the
//! page behind the window shows through.
//!
//! Per-draw data (model matrix and material colours) lives in one uniform
//! buffer addressed by dynamic offsets; it grows when the scene outgrows it.

use std::collections::HashMap;

use wgpu::util::DeviceExt;

use crate::error::SkylineError;
use crate::renderer::pipeline_builder::{BindGroupLayoutBuilder, PipelineBuilder};
use crate::renderer::primitives::{DrawUniforms, FrameUniforms, Vertex};
use crate::renderer::{IdAllocator, RenderBackend};
use crate::scene::{
    BoxGeometry, GeometryId, Material, MaterialId, Mesh, PerspectiveCamera, Scene,
};

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth24Plus;
const INITIAL_DRAW_SLOTS: usize = 8;

/// A vertex buffer and the number of vertices in it.
struct GpuGeometry {
    buffer: wgpu::Buffer,
    vertex_count: u32,
}

/// One queued draw: which geometry, with which per-draw uniforms.
struct DrawCall {
    geometry: GeometryId,
    uniforms: DrawUniforms,
}

pub struct WgpuBackend {
    surface: wgpu::Surface<'static>,
    surface_config: wgpu::SurfaceConfiguration,
    device: wgpu::Device,
    queue: wgpu::Queue,
    mesh_pipeline: wgpu::RenderPipeline,
    line_pipeline: wgpu::RenderPipeline,
    frame_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    draw_layout: wgpu::BindGroupLayout,
    draw_buffer: wgpu::Buffer,
    draw_bind_group: wgpu::BindGroup,
    /// Number of draw slots `draw_buffer` holds.
    draw_capacity: usize,
    /// Bytes between draw slots, aligned for dynamic offsets.
    draw_stride: wgpu::BufferAddress,
    /// Recreated lazily when missing or when the surface size changes.
    depth_texture: Option<wgpu::Texture>,
    ids: IdAllocator,
    geometries: HashMap<GeometryId, GpuGeometry>,
    materials: HashMap<MaterialId, Material>,
    /// Opacity of the whole overlay, applied in the fragment stage.
    overlay_opacity: f32,
    disposed: bool,
}

impl WgpuBackend {
    /// Selects an adapter (falling back to a software one once), creates the
    /// device, configures `surface` and builds both pipelines.
    pub async fn new(
        instance: &wgpu::Instance,
        surface: wgpu::Surface<'static>,
        width: u32,
        height: u32,
        overlay_opacity: f32,
    ) -> Result<Self, SkylineError> {
        let adapter = Self::create_adapter(instance, &surface).await?;
        let (device, queue) = Self::create_device(&adapter).await?;
        let surface_config = Self::create_surface_config(&surface, &adapter, width, height)?;

        surface.configure(&device, &surface_config);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Skyline Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/skyline.wgsl").into()),
        });

        let frame_buffer = FrameUniforms::default().create_buffer(&device);
        let frame_layout = BindGroupLayoutBuilder::new(&device)
            .with_label("Frame Uniforms Layout")
            .with_uniform_buffer(0, wgpu::ShaderStages::VERTEX_FRAGMENT)
            .build();
        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Frame Uniforms Bind Group"),
            layout: &frame_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_buffer.as_entire_binding(),
            }],
        });

        let draw_size = std::mem::size_of::<DrawUniforms>() as wgpu::BufferAddress;
        let draw_layout = BindGroupLayoutBuilder::new(&device)
            .with_label("Draw Uniforms Layout")
            .with_dynamic_uniform_buffer(0, wgpu::ShaderStages::VERTEX_FRAGMENT, draw_size)
            .build();
        let draw_stride =
            DrawUniforms::stride(device.limits().min_uniform_buffer_offset_alignment);
        let draw_buffer = Self::create_draw_buffer(&device, draw_stride, INITIAL_DRAW_SLOTS);
        let draw_bind_group = Self::create_draw_bind_group(&device, &draw_layout, &draw_buffer);

        let depth_stencil = |depth_write_enabled, depth_compare| wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled,
            depth_compare,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        };

        let mesh_pipeline = PipelineBuilder::new(&device, surface_config.format, &shader)
            .with_label("Building Mesh Pipeline")
            .with_vertex_buffer(Vertex::desc())
            .with_bind_group_layout(&frame_layout)
            .with_bind_group_layout(&draw_layout)
            .with_blend_state(wgpu::BlendState::PREMULTIPLIED_ALPHA_BLENDING)
            .with_depth_stencil(depth_stencil(true, wgpu::CompareFunction::Less))
            .build();

        let line_pipeline = PipelineBuilder::new(&device, surface_config.format, &shader)
            .with_label("Building Edge Pipeline")
            .with_fragment_entry("fs_line")
            .with_vertex_buffer(Vertex::desc())
            .with_bind_group_layout(&frame_layout)
            .with_bind_group_layout(&draw_layout)
            .with_blend_state(wgpu::BlendState::PREMULTIPLIED_ALPHA_BLENDING)
            .with_topology(wgpu::PrimitiveTopology::LineList)
            .with_no_culling()
            // Edges sit exactly on the box faces
            .with_depth_stencil(depth_stencil(false, wgpu::CompareFunction::LessEqual))
            .build();

        Ok(Self {
            surface,
            surface_config,
            device,
            queue,
            mesh_pipeline,
            line_pipeline,
            frame_buffer,
            frame_bind_group,
            draw_layout,
            draw_buffer,
            draw_bind_group,
            draw_capacity: INITIAL_DRAW_SLOTS,
            draw_stride,
            depth_texture: None,
            ids: IdAllocator::default(),
            geometries: HashMap::new(),
            materials: HashMap::new(),
            overlay_opacity,
            disposed: false,
        })
    }

    // Private helper methods

    async fn create_adapter(
        instance: &wgpu::Instance,
        surface: &wgpu::Surface<'static>,
    ) -> Result<wgpu::Adapter, SkylineError> {
        let adapter = match instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                force_fallback_adapter: false,
                compatible_surface: Some(surface),
            })
            .await
        {
            Some(adapter) => adapter,
            None => {
                tracing::warn!("No hardware adapter found, requesting software fallback");
                instance
                    .request_adapter(&wgpu::RequestAdapterOptions {
                        power_preference: wgpu::PowerPreference::default(),
                        force_fallback_adapter: true,
                        compatible_surface: Some(surface),
                    })
                    .await
                    .ok_or(SkylineError::RendererUnavailable)?
            }
        };

        let info = adapter.get_info();
        tracing::info!(
            "Using graphics adapter: {} ({:?}, {:?})",
            info.name,
            info.backend,
            info.device_type
        );
        Ok(adapter)
    }

    async fn create_device(
        adapter: &wgpu::Adapter,
    ) -> Result<(wgpu::Device, wgpu::Queue), SkylineError> {
        let device = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Skyline Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::downlevel_webgl2_defaults()
                        .using_resolution(adapter.limits()),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await?;
        Ok(device)
    }

    fn create_surface_config(
        surface: &wgpu::Surface<'static>,
        adapter: &wgpu::Adapter,
        width: u32,
        height: u32,
    ) -> Result<wgpu::SurfaceConfiguration, SkylineError> {
        let capabilities = surface.get_capabilities(adapter);
        let format = capabilities
            .formats
            .iter()
            .copied()
            .find(wgpu::TextureFormat::is_srgb)
            .or_else(|| capabilities.formats.first().copied())
            .ok_or(SkylineError::UnsupportedSurface)?;

        // The overlay needs a compositor that honours alpha
        let alpha_mode = [
            wgpu::CompositeAlphaMode::PreMultiplied,
            wgpu::CompositeAlphaMode::PostMultiplied,
        ]
        .into_iter()
        .find(|mode| capabilities.alpha_modes.contains(mode))
        .unwrap_or_else(|| {
            tracing::warn!("Surface does not support alpha compositing; overlay will be opaque");
            capabilities
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto)
        });

        Ok(wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            desired_maximum_frame_latency: 2,
            alpha_mode,
            view_formats: vec![],
        })
    }

    fn create_draw_buffer(
        device: &wgpu::Device,
        stride: wgpu::BufferAddress,
        slots: usize,
    ) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Draw Uniform Buffer"),
            size: stride * slots as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    fn create_draw_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        buffer: &wgpu::Buffer,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Draw Uniforms Bind Group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(
                        std::mem::size_of::<DrawUniforms>() as wgpu::BufferAddress
                    ),
                }),
            }],
        })
    }

    /// Grows the draw uniform buffer so it holds at least `draws` slots.
    fn ensure_draw_capacity(&mut self, draws: usize) {
        if draws <= self.draw_capacity {
            return;
        }
        let capacity = draws.next_power_of_two();
        tracing::debug!(
            "Growing draw uniform buffer from {} to {} slots",
            self.draw_capacity,
            capacity
        );
        self.draw_buffer.destroy();
        self.draw_buffer = Self::create_draw_buffer(&self.device, self.draw_stride, capacity);
        self.draw_bind_group =
            Self::create_draw_bind_group(&self.device, &self.draw_layout, &self.draw_buffer);
        self.draw_capacity = capacity;
    }

    /// Returns a view of a depth texture matching the surface, recreating it
    /// if the size changed.
    fn update_depth_texture(&mut self) -> wgpu::TextureView {
        let (width, height) = (self.surface_config.width, self.surface_config.height);
        let texture = match self.depth_texture.take() {
            Some(texture) if texture.width() == width && texture.height() == height => texture,
            stale => {
                if let Some(old) = stale {
                    old.destroy();
                }
                self.device.create_texture(&wgpu::TextureDescriptor {
                    label: Some("Depth Texture"),
                    size: wgpu::Extent3d {
                        width,
                        height,
                        depth_or_array_layers: 1,
                    },
                    mip_level_count: 1,
                    sample_count: 1,
                    dimension: wgpu::TextureDimension::D2,
                    format: DEPTH_FORMAT,
                    usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                    view_formats: &[],
                })
            }
        };

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        self.depth_texture = Some(texture);
        view
    }

    /// Acquires the next surface texture, or `None` if this frame should be
    /// skipped.
    fn acquire_surface_texture(&mut self) -> Option<wgpu::SurfaceTexture> {
        match self.surface.get_current_texture() {
            Ok(texture) => Some(texture),
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                tracing::warn!("Surface lost or outdated, reconfiguring");
                self.surface.configure(&self.device, &self.surface_config);
                None
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                tracing::error!("GPU out of memory while acquiring surface texture");
                None
            }
            Err(e) => {
                tracing::warn!("Surface error: {:?}", e);
                None
            }
        }
    }

    fn frame_uniforms(&self, scene: &Scene, camera: &PerspectiveCamera) -> FrameUniforms {
        let light_direction = scene.directional.direction();
        FrameUniforms {
            view_proj: camera.view_projection().into(),
            camera_position: [
                camera.position.x(),
                camera.position.y(),
                camera.position.z(),
                1.0,
            ],
            ambient: scene.ambient.color.scaled(scene.ambient.intensity),
            light_direction: [
                light_direction.x(),
                light_direction.y(),
                light_direction.z(),
                0.0,
            ],
            light_color: scene.directional.color.scaled(scene.directional.intensity),
            overlay: [self.overlay_opacity, 0.0, 0.0, 0.0],
        }
    }

    /// Box draws sorted back to front, followed by the edge draws.
    ///
    /// Returns the draws and the number of box draws at the front of the list.
    fn collect_draws(&self, scene: &Scene, camera: &PerspectiveCamera) -> (Vec<DrawCall>, usize) {
        let mut meshes: Vec<&Mesh> = scene.meshes.iter().collect();
        let distance = |mesh: &Mesh| (mesh.transform.position - camera.position).length();
        meshes.sort_by(|a, b| distance(*b).total_cmp(&distance(*a)));

        let mut draws = Vec::with_capacity(meshes.len() * 2);
        for mesh in &meshes {
            if let Some(Material::Phong(material)) = self.materials.get(&mesh.material) {
                draws.push(DrawCall {
                    geometry: mesh.geometry,
                    uniforms: DrawUniforms {
                        model: mesh.transform.model_matrix().into(),
                        color: material.color.with_alpha(material.effective_opacity()),
                        emissive: material.emissive.with_alpha(1.0),
                    },
                });
            }
        }
        let box_draws = draws.len();

        for mesh in &meshes {
            if let Some(Material::Line(material)) = self.materials.get(&mesh.edges.material) {
                draws.push(DrawCall {
                    geometry: mesh.edges.geometry,
                    uniforms: DrawUniforms {
                        model: mesh.transform.model_matrix().into(),
                        color: material.color.with_alpha(1.0),
                        emissive: [0.0; 4],
                    },
                });
            }
        }

        (draws, box_draws)
    }

    fn upload_geometry(&mut self, label: &str, vertices: &[Vertex]) -> GeometryId {
        let id = self.ids.geometry();
        if !self.disposed {
            let buffer = self
                .device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(label),
                    contents: bytemuck::cast_slice(vertices),
                    usage: wgpu::BufferUsages::VERTEX,
                });
            self.geometries.insert(
                id,
                GpuGeometry {
                    buffer,
                    vertex_count: vertices.len() as u32,
                },
            );
        }
        id
    }
}

impl RenderBackend for WgpuBackend {
    fn create_box_geometry(&mut self, geometry: &BoxGeometry) -> GeometryId {
        self.upload_geometry("Building Box Vertices", &Vertex::box_triangles(geometry))
    }

    fn create_edges_geometry(&mut self, geometry: &BoxGeometry) -> GeometryId {
        self.upload_geometry("Building Edge Vertices", &Vertex::box_edges(geometry))
    }

    fn create_material(&mut self, material: &Material) -> MaterialId {
        let id = self.ids.material();
        self.materials.insert(id, *material);
        id
    }

    fn dispose_geometry(&mut self, id: GeometryId) {
        if let Some(geometry) = self.geometries.remove(&id) {
            geometry.buffer.destroy();
        }
    }

    fn dispose_material(&mut self, id: MaterialId) {
        self.materials.remove(&id);
    }

    fn resize(&mut self, width: u32, height: u32) {
        if self.disposed || width == 0 || height == 0 {
            return;
        }
        self.surface_config.width = width;
        self.surface_config.height = height;
        self.surface.configure(&self.device, &self.surface_config);
    }

    fn render(&mut self, scene: &Scene, camera: &PerspectiveCamera) {
        if self.disposed {
            return;
        }
        let Some(surface_texture) = self.acquire_surface_texture() else {
            return;
        };
        let surface_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let depth_view = self.update_depth_texture();

        let (draws, box_draws) = self.collect_draws(scene, camera);
        self.ensure_draw_capacity(draws.len());

        let frame = self.frame_uniforms(scene, camera);
        self.queue
            .write_buffer(&self.frame_buffer, 0, frame.as_bytes());

        let stride = self.draw_stride as usize;
        let mut slots = vec![0u8; stride * draws.len()];
        for (i, draw) in draws.iter().enumerate() {
            let bytes = bytemuck::bytes_of(&draw.uniforms);
            slots[i * stride..i * stride + bytes.len()].copy_from_slice(bytes);
        }
        if !slots.is_empty() {
            self.queue.write_buffer(&self.draw_buffer, 0, &slots);
        }

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Skyline Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Skyline Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &surface_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_bind_group(0, &self.frame_bind_group, &[]);
            for (i, draw) in draws.iter().enumerate() {
                let Some(geometry) = self.geometries.get(&draw.geometry) else {
                    continue;
                };
                let pipeline = if i < box_draws {
                    &self.mesh_pipeline
                } else {
                    &self.line_pipeline
                };
                render_pass.set_pipeline(pipeline);
                render_pass.set_bind_group(1, &self.draw_bind_group, &[(i * stride) as u32]);
                render_pass.set_vertex_buffer(0, geometry.buffer.slice(..));
                render_pass.draw(0..geometry.vertex_count, 0..1);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();
    }

    fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        for (_, geometry) in self.geometries.drain() {
            geometry.buffer.destroy();
        }
        self.materials.clear();
        self.draw_buffer.destroy();
        self.frame_buffer.destroy();
        if let Some(depth) = self.depth_texture.take() {
            depth.destroy();
        }
        self.device.destroy();
        self.disposed = true;
        tracing::info!("Graphics context released");
    }

    fn is_disposed(&self) -> bool {
        self.disposed
    }
}
