use arena_render::{BufferDescriptor, BufferUsage, GpuDevice, StepMode, VertexStream};
use wgpu::util::DeviceExt;

use crate::texture::TextureHandle;

/// wgpu device and queue plus the bind group layout every texture uses.
pub struct WgpuDevice {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    texture_layout: wgpu::BindGroupLayout,
}

impl WgpuDevice {
    pub fn new(device: wgpu::Device, queue: wgpu::Queue) -> Self {
        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("texture_bind_group_layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });
        Self {
            device,
            queue,
            texture_layout,
        }
    }

    pub fn texture_layout(&self) -> &wgpu::BindGroupLayout {
        &self.texture_layout
    }
}

impl GpuDevice for WgpuDevice {
    type Buffer = wgpu::Buffer;
    type Texture = TextureHandle;

    fn create_buffer(&mut self, desc: &BufferDescriptor<'_>) -> wgpu::Buffer {
        tracing::debug!(label = desc.label, usage = ?desc.usage, bytes = desc.byte_len(), "creating buffer");
        match (desc.usage, desc.contents) {
            (BufferUsage::Static, Some(contents)) => {
                self.device
                    .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                        label: Some(desc.label),
                        contents,
                        usage: wgpu::BufferUsages::VERTEX,
                    })
            }
            _ => self.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(desc.label),
                // Zero-sized buffers cannot be bound as a vertex slice.
                size: desc.byte_len().max(wgpu::COPY_BUFFER_ALIGNMENT),
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            }),
        }
    }

    fn write_buffer(&mut self, buffer: &wgpu::Buffer, offset: u64, data: &[u8]) {
        self.queue.write_buffer(buffer, offset, data);
    }
}

/// wgpu attribute list for one vertex stream.
pub(crate) fn vertex_attributes(stream: &VertexStream) -> Vec<wgpu::VertexAttribute> {
    stream
        .attributes
        .iter()
        .map(|a| wgpu::VertexAttribute {
            format: match a.components {
                1 => wgpu::VertexFormat::Float32,
                2 => wgpu::VertexFormat::Float32x2,
                3 => wgpu::VertexFormat::Float32x3,
                _ => wgpu::VertexFormat::Float32x4,
            },
            offset: a.offset,
            shader_location: a.location,
        })
        .collect()
}

pub(crate) fn step_mode(step: StepMode) -> wgpu::VertexStepMode {
    match step {
        StepMode::Vertex => wgpu::VertexStepMode::Vertex,
        StepMode::Instance => wgpu::VertexStepMode::Instance,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arena_render::{INSTANCE_STREAM, MESH_STREAM};

    #[test]
    fn mesh_stream_attributes() {
        let attrs = vertex_attributes(&MESH_STREAM);
        assert_eq!(attrs.len(), 2);
        assert_eq!(attrs[0].format, wgpu::VertexFormat::Float32x3);
        assert_eq!(attrs[1].format, wgpu::VertexFormat::Float32x2);
        assert_eq!(attrs[1].offset, 12);
        assert_eq!(step_mode(MESH_STREAM.step), wgpu::VertexStepMode::Vertex);
    }

    #[test]
    fn instance_stream_is_four_rows() {
        let attrs = vertex_attributes(&INSTANCE_STREAM);
        let locations: Vec<u32> = attrs.iter().map(|a| a.shader_location).collect();
        assert_eq!(locations, vec![2, 3, 4, 5]);
        assert!(attrs.iter().all(|a| a.format == wgpu::VertexFormat::Float32x4));
        assert_eq!(step_mode(INSTANCE_STREAM.step), wgpu::VertexStepMode::Instance);
    }
}
