use arena_math::Mat4;
use arena_render::{INSTANCE_STREAM, MAX_TEXTURE_UNITS, MESH_STREAM, ProgramKind};
use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::device::{WgpuDevice, step_mode, vertex_attributes};
use crate::frame::DEPTH_FORMAT;
use crate::shaders;

#[derive(Debug, thiserror::Error)]
pub enum ProgramError {
    #[error("failed to build program '{program}': {log}")]
    Build { program: &'static str, log: String },
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Uniforms {
    view: [[f32; 4]; 4],
    projection: [[f32; 4]; 4],
    color: [f32; 4],
}

const PROJECTION_OFFSET: u64 = 64;
const COLOR_OFFSET: u64 = 128;

/// One render pipeline and its uniform block.
pub struct Program {
    kind: ProgramKind,
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
}

impl Program {
    pub fn kind(&self) -> ProgramKind {
        self.kind
    }

    pub fn pipeline(&self) -> &wgpu::RenderPipeline {
        &self.pipeline
    }

    pub fn uniform_bind_group(&self) -> &wgpu::BindGroup {
        &self.uniform_bind_group
    }
}

/// Both programs the renderer draws with.
pub struct Programs {
    flat_color: Program,
    textured: Program,
}

impl Programs {
    pub fn new(
        device: &WgpuDevice,
        surface_format: wgpu::TextureFormat,
    ) -> Result<Self, ProgramError> {
        Ok(Self {
            flat_color: build(device, surface_format, ProgramKind::FlatColor)?,
            textured: build(device, surface_format, ProgramKind::Textured)?,
        })
    }

    pub fn get(&self, kind: ProgramKind) -> &Program {
        match kind {
            ProgramKind::FlatColor => &self.flat_color,
            ProgramKind::Textured => &self.textured,
        }
    }

    /// Uploads device-ready (transposed) view and projection matrices to
    /// every program.
    pub fn set_scene(&self, queue: &wgpu::Queue, view: &Mat4, projection: &Mat4) {
        for program in [&self.flat_color, &self.textured] {
            queue.write_buffer(&program.uniform_buffer, 0, view.as_bytes());
            queue.write_buffer(&program.uniform_buffer, PROJECTION_OFFSET, projection.as_bytes());
        }
    }

    /// Color used by the flat-color program.
    pub fn set_color(&self, queue: &wgpu::Queue, color: [f32; 4]) {
        queue.write_buffer(
            &self.flat_color.uniform_buffer,
            COLOR_OFFSET,
            bytemuck::cast_slice(&color),
        );
    }
}

fn build(
    device: &WgpuDevice,
    surface_format: wgpu::TextureFormat,
    kind: ProgramKind,
) -> Result<Program, ProgramError> {
    let gpu = &device.device;
    gpu.push_error_scope(wgpu::ErrorFilter::Validation);

    let uniform_buffer = gpu.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(kind.name()),
        contents: bytemuck::bytes_of(&Uniforms {
            view: *Mat4::IDENTITY.rows(),
            projection: *Mat4::IDENTITY.rows(),
            color: [1.0; 4],
        }),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    });

    let uniform_layout = gpu.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("uniform_bind_group_layout"),
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

    let uniform_bind_group = gpu.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(kind.name()),
        layout: &uniform_layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: uniform_buffer.as_entire_binding(),
        }],
    });

    let (source, texture_units) = match kind {
        ProgramKind::FlatColor => (shaders::FLAT_COLOR_SHADER, 0),
        ProgramKind::Textured => (shaders::TEXTURED_SHADER, MAX_TEXTURE_UNITS),
    };
    let mut bind_group_layouts = vec![&uniform_layout];
    bind_group_layouts.extend(std::iter::repeat_n(device.texture_layout(), texture_units));

    let pipeline_layout = gpu.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(kind.name()),
        bind_group_layouts: &bind_group_layouts,
        push_constant_ranges: &[],
    });

    let shader = gpu.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(kind.name()),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    });

    let mesh_attributes = vertex_attributes(&MESH_STREAM);
    let instance_attributes = vertex_attributes(&INSTANCE_STREAM);

    let pipeline = gpu.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(kind.name()),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            compilation_options: Default::default(),
            buffers: &[
                wgpu::VertexBufferLayout {
                    array_stride: MESH_STREAM.stride,
                    step_mode: step_mode(MESH_STREAM.step),
                    attributes: &mesh_attributes,
                },
                wgpu::VertexBufferLayout {
                    array_stride: INSTANCE_STREAM.stride,
                    step_mode: step_mode(INSTANCE_STREAM.step),
                    attributes: &instance_attributes,
                },
            ],
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format: surface_format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            cull_mode: None,
            ..Default::default()
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: Default::default(),
            bias: Default::default(),
        }),
        multisample: Default::default(),
        multiview: None,
        cache: None,
    });

    if let Some(err) = pollster::block_on(gpu.pop_error_scope()) {
        let log = err.to_string();
        tracing::error!(program = kind.name(), %log, "program build failed");
        return Err(ProgramError::Build {
            program: kind.name(),
            log,
        });
    }
    tracing::debug!(program = kind.name(), "program built");

    Ok(Program {
        kind,
        pipeline,
        uniform_buffer,
        uniform_bind_group,
    })
}
