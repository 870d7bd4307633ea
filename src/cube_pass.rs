//! Lit cube rendering with depth testing.
//!
//! [`CubePass`] draws the whole cube field in one instanced draw: the shared
//! [`CubeMesh`] supplies per-vertex position and normal, and an instance buffer
//! supplies one model matrix per cube. Lighting inputs live in a single uniform
//! block shared by both shading programs.
//!
//! # Architecture
//!
//! - **Group 0**: scene uniforms (view, projection, object and light colour,
//!   light and eye position)
//! - **Vertex buffer 0**: [`Vertex`] (locations 0 and 1)
//! - **Vertex buffer 1**: [`InstanceRaw`] (locations 2 through 5)
//!
//! Each shading model is a vertex/fragment file pair on disk. Both are built at
//! startup, once with filled polygons and, when the device allows it, once
//! more with line polygons. The files are polled once per frame through
//! [`CubePass::reload_changed`]; a program that no longer validates leaves the
//! previous pipelines in place.
//!
//! # Depth Buffer
//!
//! The pass owns a `Depth32Float` buffer that follows the surface size.

use crate::config::SHADER_DIR;
use crate::gpu::GpuContext;
use crate::mesh::{CubeMesh, Vertex};
use crate::shader::{ProgramSource, ShaderError, compile_module, shader_dir};
use crate::state::{FrameParams, PolygonMode, ShadingMode};

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Scene uniforms shared by every cube in a frame.
///
/// Each `vec3` is padded to 16 bytes to match WGSL uniform layout.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SceneUniforms {
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    pub object_color: [f32; 3],
    _pad0: f32,
    pub light_color: [f32; 3],
    _pad1: f32,
    pub light_pos: [f32; 3],
    _pad2: f32,
    pub view_pos: [f32; 3],
    _pad3: f32,
}

impl SceneUniforms {
    pub fn new(frame: &FrameParams) -> Self {
        Self {
            view: frame.view.to_cols_array_2d(),
            projection: frame.projection.to_cols_array_2d(),
            object_color: frame.object_color.to_array(),
            _pad0: 0.0,
            light_color: frame.light_color.to_array(),
            _pad1: 0.0,
            light_pos: frame.light_pos.to_array(),
            _pad2: 0.0,
            view_pos: frame.view_pos.to_array(),
            _pad3: 0.0,
        }
    }
}

/// Per-instance model matrix, uploaded column by column.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct InstanceRaw {
    pub model: [[f32; 4]; 4],
}

impl InstanceRaw {
    const ATTRIBS: [wgpu::VertexAttribute; 4] = wgpu::vertex_attr_array![
        2 => Float32x4,
        3 => Float32x4,
        4 => Float32x4,
        5 => Float32x4,
    ];

    pub const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<InstanceRaw>() as u64,
        step_mode: wgpu::VertexStepMode::Instance,
        attributes: &Self::ATTRIBS,
    };
}

/// One shading model: its source files and the pipelines built from them.
struct Program {
    source: ProgramSource,
    fill: wgpu::RenderPipeline,
    wireframe: Option<wgpu::RenderPipeline>,
}

impl Program {
    fn load(
        gpu: &GpuContext,
        layout: &wgpu::PipelineLayout,
        mode: ShadingMode,
    ) -> Result<Self, ShaderError> {
        let source = ProgramSource::load(shader_dir(SHADER_DIR), mode)?;
        let (fill, wireframe) = build_pipelines(gpu, layout, &source)?;
        tracing::info!(program = source.name(), wireframe = wireframe.is_some(), "shader program built");
        Ok(Self {
            source,
            fill,
            wireframe,
        })
    }

    fn pipeline(&self, polygon: PolygonMode) -> &wgpu::RenderPipeline {
        match polygon {
            PolygonMode::Filled => &self.fill,
            PolygonMode::Wireframe => self.wireframe.as_ref().unwrap_or(&self.fill),
        }
    }

    fn reload(&mut self, gpu: &GpuContext, layout: &wgpu::PipelineLayout) {
        if !self.source.check_reload() {
            return;
        }

        tracing::info!(program = self.source.name(), "shader source changed, rebuilding");
        match build_pipelines(gpu, layout, &self.source) {
            Ok((fill, wireframe)) => {
                self.fill = fill;
                self.wireframe = wireframe;
                tracing::info!(program = self.source.name(), "shader program reloaded");
            }
            Err(err) => {
                tracing::warn!(%err, "shader reload failed, keeping previous program");
            }
        }
    }
}

/// Compile both stages and build the filled and (if supported) line pipelines.
fn build_pipelines(
    gpu: &GpuContext,
    layout: &wgpu::PipelineLayout,
    source: &ProgramSource,
) -> Result<(wgpu::RenderPipeline, Option<wgpu::RenderPipeline>), ShaderError> {
    let name = source.name();
    let vertex = compile_module(&gpu.device, name, &source.vertex)?;
    let fragment = compile_module(&gpu.device, name, &source.fragment)?;

    // Interface mismatches between the stages only surface at pipeline creation.
    gpu.device.push_error_scope(wgpu::ErrorFilter::Validation);
    let fill = create_pipeline(gpu, layout, name, &vertex, &fragment, wgpu::PolygonMode::Fill);
    let wireframe = gpu
        .supports_wireframe()
        .then(|| create_pipeline(gpu, layout, name, &vertex, &fragment, wgpu::PolygonMode::Line));

    match pollster::block_on(gpu.device.pop_error_scope()) {
        Some(err) => Err(ShaderError::Invalid {
            name: name.to_string(),
            message: err.to_string(),
        }),
        None => Ok((fill, wireframe)),
    }
}

fn create_pipeline(
    gpu: &GpuContext,
    layout: &wgpu::PipelineLayout,
    name: &str,
    vertex: &wgpu::ShaderModule,
    fragment: &wgpu::ShaderModule,
    polygon_mode: wgpu::PolygonMode,
) -> wgpu::RenderPipeline {
    let label = format!("{name} {polygon_mode:?} Pipeline");
    gpu.device
        .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(&label),
            layout: Some(layout),
            vertex: wgpu::VertexState {
                module: vertex,
                entry_point: Some("vs_main"),
                buffers: &[Vertex::LAYOUT, InstanceRaw::LAYOUT],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: fragment,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: gpu.config.format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: Some(wgpu::Face::Back),
                front_face: wgpu::FrontFace::Ccw,
                polygon_mode,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        })
}

/// Renders the cube field with the active shading model and polygon mode.
pub struct CubePass {
    phong: Program,
    gouraud: Program,
    pipeline_layout: wgpu::PipelineLayout,
    scene_buffer: wgpu::Buffer,
    scene_bind_group: wgpu::BindGroup,
    instance_buffer: wgpu::Buffer,
    instance_capacity: usize,
    instance_scratch: Vec<InstanceRaw>,
    mesh: CubeMesh,
    depth_view: wgpu::TextureView,
    depth_size: (u32, u32),
}

impl CubePass {
    /// Load both shading programs and allocate room for `instance_count` cubes.
    pub fn new(gpu: &GpuContext, instance_count: usize) -> Result<Self, ShaderError> {
        let device = &gpu.device;

        let scene_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Scene Uniforms"),
            size: std::mem::size_of::<SceneUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let scene_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Scene Bind Group Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let scene_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Scene Bind Group"),
            layout: &scene_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: scene_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Cube Pipeline Layout"),
            bind_group_layouts: &[&scene_bind_group_layout],
            push_constant_ranges: &[],
        });

        let phong = Program::load(gpu, &pipeline_layout, ShadingMode::Phong)?;
        let gouraud = Program::load(gpu, &pipeline_layout, ShadingMode::Gouraud)?;

        let instance_buffer = Self::create_instance_buffer(gpu, instance_count);
        let depth_view = Self::create_depth_view(gpu);

        Ok(Self {
            phong,
            gouraud,
            pipeline_layout,
            scene_buffer,
            scene_bind_group,
            instance_buffer,
            instance_capacity: instance_count,
            instance_scratch: Vec::with_capacity(instance_count),
            mesh: CubeMesh::new(gpu),
            depth_view,
            depth_size: (gpu.width(), gpu.height()),
        })
    }

    fn create_instance_buffer(gpu: &GpuContext, capacity: usize) -> wgpu::Buffer {
        gpu.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Cube Instance Buffer"),
            size: (capacity.max(1) * std::mem::size_of::<InstanceRaw>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    fn create_depth_view(gpu: &GpuContext) -> wgpu::TextureView {
        let texture = gpu.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Texture"),
            size: wgpu::Extent3d {
                width: gpu.width(),
                height: gpu.height(),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&wgpu::TextureViewDescriptor::default())
    }

    /// Ensures the depth buffer matches the current screen size.
    pub fn ensure_depth_size(&mut self, gpu: &GpuContext) {
        if self.depth_size != (gpu.width(), gpu.height()) {
            self.depth_view = Self::create_depth_view(gpu);
            self.depth_size = (gpu.width(), gpu.height());
        }
    }

    /// Rebuild any program whose source files changed on disk.
    pub fn reload_changed(&mut self, gpu: &GpuContext) {
        self.phong.reload(gpu, &self.pipeline_layout);
        self.gouraud.reload(gpu, &self.pipeline_layout);
    }

    fn program(&self, shading: ShadingMode) -> &Program {
        match shading {
            ShadingMode::Phong => &self.phong,
            ShadingMode::Gouraud => &self.gouraud,
        }
    }

    fn upload_instances(&mut self, gpu: &GpuContext, frame: &FrameParams) {
        if frame.instances.len() > self.instance_capacity {
            self.instance_buffer = Self::create_instance_buffer(gpu, frame.instances.len());
            self.instance_capacity = frame.instances.len();
        }

        self.instance_scratch.clear();
        self.instance_scratch
            .extend(frame.instances.iter().map(|model| InstanceRaw {
                model: model.to_cols_array_2d(),
            }));
        gpu.queue.write_buffer(
            &self.instance_buffer,
            0,
            bytemuck::cast_slice(&self.instance_scratch),
        );
    }

    /// Clear to black and draw every cube instance in `frame`.
    ///
    /// Surface acquisition errors are returned to the caller, which decides
    /// whether to reconfigure or give up.
    pub fn render(&mut self, gpu: &GpuContext, frame: &FrameParams) -> Result<(), wgpu::SurfaceError> {
        self.ensure_depth_size(gpu);

        let output = gpu.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        gpu.queue.write_buffer(
            &self.scene_buffer,
            0,
            bytemuck::cast_slice(&[SceneUniforms::new(frame)]),
        );
        self.upload_instances(gpu, frame);

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Cube Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Cube Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            let instance_count = frame.instances.len() as u32;
            if instance_count > 0 {
                let pipeline = self.program(frame.shading).pipeline(frame.polygon);
                render_pass.set_pipeline(pipeline);
                render_pass.set_bind_group(0, &self.scene_bind_group, &[]);
                render_pass.set_vertex_buffer(0, self.mesh.vertex_buffer.slice(..));
                render_pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
                render_pass
                    .set_index_buffer(self.mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
                render_pass.draw_indexed(0..self.mesh.index_count, 0, 0..instance_count);
            }
        }

        gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}
