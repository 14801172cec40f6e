use arena_render::{DrawContext, ProgramKind};

use crate::device::WgpuDevice;
use crate::program::Programs;
use crate::texture::TextureHandle;

pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// A render pass exposed as a [`DrawContext`].
///
/// Texture unit `n` maps to bind group `1 + n`.
pub struct WgpuFrame<'p, 'e> {
    pass: wgpu::RenderPass<'e>,
    programs: &'p Programs,
}

impl<'p, 'e> WgpuFrame<'p, 'e> {
    /// Begins a pass that clears `target` to `clear` and the depth buffer to 1.
    pub fn begin(
        encoder: &'e mut wgpu::CommandEncoder,
        programs: &'p Programs,
        target: &wgpu::TextureView,
        depth: &wgpu::TextureView,
        clear: wgpu::Color,
    ) -> Self {
        let pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("arena_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(clear),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: depth,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            ..Default::default()
        });
        Self { pass, programs }
    }
}

impl DrawContext<WgpuDevice> for WgpuFrame<'_, '_> {
    fn use_program(&mut self, program: ProgramKind) {
        let program = self.programs.get(program);
        self.pass.set_pipeline(program.pipeline());
        self.pass.set_bind_group(0, program.uniform_bind_group(), &[]);
    }

    fn bind_mesh(&mut self, vertex: &wgpu::Buffer, instance: &wgpu::Buffer) {
        self.pass.set_vertex_buffer(0, vertex.slice(..));
        self.pass.set_vertex_buffer(1, instance.slice(..));
    }

    fn bind_texture(&mut self, unit: u32, texture: &TextureHandle) {
        self.pass.set_bind_group(1 + unit, &texture.bind_group, &[]);
    }

    fn draw_instanced(&mut self, vertex_count: u32, instance_count: u32) {
        if instance_count > 0 {
            self.pass.draw(0..vertex_count, 0..instance_count);
        }
    }
}

/// Depth attachment matching the pipelines' [`DEPTH_FORMAT`].
pub fn create_depth_view(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("depth_texture"),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&Default::default())
}
