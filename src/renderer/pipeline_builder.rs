//! # WGPU Pipeline Builder Utilities
//!
//! This module provides builder patterns for creating WGPU render pipelines and
//! bind group layouts. The skyline uses two pipelines that differ only in
//! primitive topology (filled box faces and edge lines), so the builders keep
//! that variation down to one method call.
//!
//! ## Key Components
//!
//! - [`PipelineBuilder`] - Fluent API for creating render pipelines
//! - [`BindGroupLayoutBuilder`] - Fluent API for creating bind group layouts
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! let layout = BindGroupLayoutBuilder::new(&device)
//!     .with_label("Frame Uniforms")
//!     .with_uniform_buffer(0, wgpu::ShaderStages::VERTEX_FRAGMENT)
//!     .build();
//!
//! let pipeline = PipelineBuilder::new(&device, surface_format, &shader)
//!     .with_label("Edge Pipeline")
//!     .with_fragment_entry("fs_line")
//!     .with_vertex_buffer(Vertex::desc())
//!     .with_bind_group_layout(&layout)
//!     .with_topology(wgpu::PrimitiveTopology::LineList)
//!     .build();
//! ```

/// Builder for creating render pipelines.
///
/// ## Default Configuration
///
/// - Vertex entry point: `"vs_main"`
/// - Fragment entry point: `"fs_main"`
/// - Blend state: `REPLACE` (no blending)
/// - Cull mode: `Back` face culling
/// - Primitive topology: `TriangleList`
/// - Front face: Counter-clockwise
///
/// Both entry points are looked up in the one shader module passed to
/// [`new()`](PipelineBuilder::new).
pub struct PipelineBuilder<'a> {
    device: &'a wgpu::Device,
    surface_format: wgpu::TextureFormat,
    label: Option<&'a str>,
    shader: &'a wgpu::ShaderModule,
    vertex_entry: Option<&'a str>,
    fragment_entry: Option<&'a str>,
    vertex_buffers: Vec<wgpu::VertexBufferLayout<'a>>,
    bind_group_layouts: Vec<&'a wgpu::BindGroupLayout>,
    blend_state: Option<wgpu::BlendState>,
    cull_mode: Option<wgpu::Face>,
    topology: wgpu::PrimitiveTopology,
    depth_stencil: Option<wgpu::DepthStencilState>,
}

impl<'a> PipelineBuilder<'a> {
    /// Create a new pipeline builder with default settings.
    pub fn new(
        device: &'a wgpu::Device,
        surface_format: wgpu::TextureFormat,
        shader: &'a wgpu::ShaderModule,
    ) -> Self {
        Self {
            device,
            surface_format,
            label: None,
            shader,
            vertex_entry: Some("vs_main"),
            fragment_entry: Some("fs_main"),
            vertex_buffers: Vec::new(),
            bind_group_layouts: Vec::new(),
            blend_state: Some(wgpu::BlendState::REPLACE),
            cull_mode: Some(wgpu::Face::Back),
            topology: wgpu::PrimitiveTopology::TriangleList,
            depth_stencil: None,
        }
    }

    /// Set the pipeline label for debugging purposes.
    pub fn with_label(mut self, label: &'a str) -> Self {
        self.label = Some(label);
        self
    }

    /// Set the fragment shader entry point function name.
    pub fn with_fragment_entry(mut self, entry: &'a str) -> Self {
        self.fragment_entry = Some(entry);
        self
    }

    /// Add a vertex buffer layout to the pipeline.
    pub fn with_vertex_buffer(mut self, layout: wgpu::VertexBufferLayout<'a>) -> Self {
        self.vertex_buffers.push(layout);
        self
    }

    /// Add a bind group layout; the order of calls gives the group indices.
    pub fn with_bind_group_layout(mut self, layout: &'a wgpu::BindGroupLayout) -> Self {
        self.bind_group_layouts.push(layout);
        self
    }

    /// Set a custom blend state for color blending.
    pub fn with_blend_state(mut self, blend: wgpu::BlendState) -> Self {
        self.blend_state = Some(blend);
        self
    }

    /// Disable face culling.
    pub fn with_no_culling(mut self) -> Self {
        self.cull_mode = None;
        self
    }

    /// Set the primitive topology (e.g. `LineList` for edge overlays).
    pub fn with_topology(mut self, topology: wgpu::PrimitiveTopology) -> Self {
        self.topology = topology;
        self
    }

    /// Set depth and stencil testing configuration.
    ///
    /// By default, no depth or stencil testing is performed.
    pub fn with_depth_stencil(mut self, depth_stencil: wgpu::DepthStencilState) -> Self {
        self.depth_stencil = Some(depth_stencil);
        self
    }

    /// Build the render pipeline with the configured parameters.
    pub fn build(self) -> wgpu::RenderPipeline {
        let shader = self.shader;

        let pipeline_layout = self
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: self.label,
                bind_group_layouts: &self.bind_group_layouts,
                push_constant_ranges: &[],
            });

        self.device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: self.label,
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: shader,
                    entry_point: self.vertex_entry,
                    buffers: &self.vertex_buffers,
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: shader,
                    entry_point: self.fragment_entry,
                    targets: &[Some(wgpu::ColorTargetState {
                        format: self.surface_format,
                        blend: self.blend_state,
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: self.topology,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: self.cull_mode,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    unclipped_depth: false,
                    conservative: false,
                },
                depth_stencil: self.depth_stencil,
                multisample: wgpu::MultisampleState {
                    count: 1,
                    mask: !0,
                    alpha_to_coverage_enabled: false,
                },
                multiview: None,
                cache: None,
            })
    }
}

/// Builder for creating bind group layouts made of uniform buffers.
pub struct BindGroupLayoutBuilder<'a> {
    device: &'a wgpu::Device,
    entries: Vec<wgpu::BindGroupLayoutEntry>,
    label: Option<&'a str>,
}

impl<'a> BindGroupLayoutBuilder<'a> {
    pub fn new(device: &'a wgpu::Device) -> Self {
        Self {
            device,
            entries: Vec::new(),
            label: None,
        }
    }

    pub fn with_label(mut self, label: &'a str) -> Self {
        self.label = Some(label);
        self
    }

    /// Add a uniform buffer binding.
    ///
    /// In WGSL, access this uniform buffer with:
    /// ```wgsl
    /// @group(0) @binding(0) var<uniform> frame: FrameUniforms;
    /// ```
    pub fn with_uniform_buffer(self, binding: u32, visibility: wgpu::ShaderStages) -> Self {
        self.push_uniform(binding, visibility, false, None)
    }

    /// Add a uniform buffer binding addressed through a dynamic offset.
    ///
    /// Used for per-draw data: one buffer holds every draw's slot and
    /// `set_bind_group` picks the slot.
    pub fn with_dynamic_uniform_buffer(
        self,
        binding: u32,
        visibility: wgpu::ShaderStages,
        slot_size: wgpu::BufferAddress,
    ) -> Self {
        self.push_uniform(binding, visibility, true, wgpu::BufferSize::new(slot_size))
    }

    fn push_uniform(
        mut self,
        binding: u32,
        visibility: wgpu::ShaderStages,
        has_dynamic_offset: bool,
        min_binding_size: Option<wgpu::BufferSize>,
    ) -> Self {
        self.entries.push(wgpu::BindGroupLayoutEntry {
            binding,
            visibility,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset,
                min_binding_size,
            },
            count: None,
        });
        self
    }

    /// Build the bind group layout.
    pub fn build(self) -> wgpu::BindGroupLayout {
        self.device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                entries: &self.entries,
                label: self.label,
            })
    }
}
