//! Headless backend that records buffer contents and draw commands.

use std::collections::BTreeMap;
use std::fmt;

use arena_math::Mat4;

use crate::buffer::INSTANCE_STRIDE;
use crate::device::{BufferDescriptor, BufferUsage, DrawContext, GpuDevice, ProgramKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(pub u32);

#[derive(Debug, Clone)]
pub struct RecordedBuffer {
    pub label: String,
    pub usage: BufferUsage,
    pub bytes: Vec<u8>,
    /// Number of `write_buffer` calls after creation.
    pub writes: usize,
}

/// In-memory [`GpuDevice`]. Buffers are plain byte vectors.
#[derive(Debug, Default)]
pub struct RecordingDevice {
    buffers: Vec<RecordedBuffer>,
    textures: u32,
}

impl RecordingDevice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_texture(&mut self) -> TextureId {
        self.textures += 1;
        TextureId(self.textures - 1)
    }

    /// Panics on an id this device never handed out.
    pub fn buffer(&self, id: BufferId) -> &RecordedBuffer {
        &self.buffers[id.0]
    }

    pub fn buffers(&self) -> &[RecordedBuffer] {
        &self.buffers
    }

    pub fn texture_count(&self) -> u32 {
        self.textures
    }

    /// Decodes instance record `index` of an instance buffer.
    pub fn read_record(&self, id: BufferId, index: u32) -> Mat4 {
        let start = (index as u64 * INSTANCE_STRIDE) as usize;
        let bytes = &self.buffer(id).bytes[start..start + INSTANCE_STRIDE as usize];
        let floats: [f32; 16] = bytemuck::pod_read_unaligned(bytes);
        Mat4::from_slice(&floats)
    }
}

impl GpuDevice for RecordingDevice {
    type Buffer = BufferId;
    type Texture = TextureId;

    fn create_buffer(&mut self, desc: &BufferDescriptor<'_>) -> BufferId {
        let bytes = match desc.contents {
            Some(contents) => contents.to_vec(),
            None => vec![0; desc.size as usize],
        };
        self.buffers.push(RecordedBuffer {
            label: desc.label.to_string(),
            usage: desc.usage,
            bytes,
            writes: 0,
        });
        BufferId(self.buffers.len() - 1)
    }

    fn write_buffer(&mut self, buffer: &BufferId, offset: u64, data: &[u8]) {
        let target = &mut self.buffers[buffer.0];
        let start = offset as usize;
        let end = start + data.len();
        assert!(
            end <= target.bytes.len(),
            "write of {} bytes at offset {} overruns buffer '{}' ({} bytes)",
            data.len(),
            offset,
            target.label,
            target.bytes.len()
        );
        target.bytes[start..end].copy_from_slice(data);
        target.writes += 1;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawCommand {
    UseProgram(ProgramKind),
    BindMesh { vertex: BufferId, instance: BufferId },
    BindTexture { unit: u32, texture: TextureId },
    DrawInstanced { vertex_count: u32, instance_count: u32 },
}

impl fmt::Display for DrawCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DrawCommand::UseProgram(kind) => write!(f, "use_program {}", kind.name()),
            DrawCommand::BindMesh { vertex, instance } => {
                write!(f, "bind_mesh vertex={} instance={}", vertex.0, instance.0)
            }
            DrawCommand::BindTexture { unit, texture } => {
                write!(f, "bind_texture unit={unit} texture={}", texture.0)
            }
            DrawCommand::DrawInstanced {
                vertex_count,
                instance_count,
            } => write!(
                f,
                "draw_instanced vertices={vertex_count} instances={instance_count}"
            ),
        }
    }
}

/// Current bindings of a [`CommandRecorder`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BindState {
    pub program: Option<ProgramKind>,
    pub mesh: Option<(BufferId, BufferId)>,
    pub texture_units: BTreeMap<u32, TextureId>,
}

/// [`DrawContext`] that appends every call to a command list.
#[derive(Debug, Default)]
pub struct CommandRecorder {
    commands: Vec<DrawCommand>,
    state: BindState,
}

impl CommandRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn state(&self) -> &BindState {
        &self.state
    }

    /// `(vertex_count, instance_count)` of each draw, in order.
    pub fn draw_calls(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.commands.iter().filter_map(|c| match *c {
            DrawCommand::DrawInstanced {
                vertex_count,
                instance_count,
            } => Some((vertex_count, instance_count)),
            _ => None,
        })
    }

    /// Drops recorded commands; bind state persists.
    pub fn clear(&mut self) {
        self.commands.clear();
    }
}

impl DrawContext<RecordingDevice> for CommandRecorder {
    fn use_program(&mut self, program: ProgramKind) {
        self.state.program = Some(program);
        self.commands.push(DrawCommand::UseProgram(program));
    }

    fn bind_mesh(&mut self, vertex: &BufferId, instance: &BufferId) {
        self.state.mesh = Some((*vertex, *instance));
        self.commands.push(DrawCommand::BindMesh {
            vertex: *vertex,
            instance: *instance,
        });
    }

    fn bind_texture(&mut self, unit: u32, texture: &TextureId) {
        self.state.texture_units.insert(unit, *texture);
        self.commands.push(DrawCommand::BindTexture {
            unit,
            texture: *texture,
        });
    }

    fn draw_instanced(&mut self, vertex_count: u32, instance_count: u32) {
        self.commands.push(DrawCommand::DrawInstanced {
            vertex_count,
            instance_count,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_buffer_copies_or_zeroes() {
        let mut device = RecordingDevice::new();
        let a = device.create_buffer(&BufferDescriptor {
            label: "a",
            usage: BufferUsage::Static,
            size: 0,
            contents: Some(&[1, 2, 3]),
        });
        let b = device.create_buffer(&BufferDescriptor {
            label: "b",
            usage: BufferUsage::Stream,
            size: 8,
            contents: None,
        });
        assert_eq!(device.buffer(a).bytes, vec![1, 2, 3]);
        assert_eq!(device.buffer(b).bytes, vec![0; 8]);

        device.write_buffer(&b, 4, &[9, 9]);
        assert_eq!(device.buffer(b).bytes, vec![0, 0, 0, 0, 9, 9, 0, 0]);
        assert_eq!(device.buffer(b).writes, 1);
    }

    #[test]
    #[should_panic(expected = "overruns buffer")]
    fn overrun_panics() {
        let mut device = RecordingDevice::new();
        let b = device.create_buffer(&BufferDescriptor {
            label: "b",
            usage: BufferUsage::Stream,
            size: 4,
            contents: None,
        });
        device.write_buffer(&b, 2, &[0; 4]);
    }

    #[test]
    fn recorder_tracks_bind_state() {
        let mut ctx = CommandRecorder::new();
        ctx.use_program(ProgramKind::FlatColor);
        ctx.bind_texture(0, &TextureId(4));
        ctx.use_program(ProgramKind::Textured);
        assert_eq!(ctx.state().program, Some(ProgramKind::Textured));
        assert_eq!(ctx.state().texture_units.get(&0), Some(&TextureId(4)));

        ctx.clear();
        assert!(ctx.commands().is_empty());
        assert_eq!(ctx.state().program, Some(ProgramKind::Textured));
        assert_eq!(
            DrawCommand::DrawInstanced { vertex_count: 6, instance_count: 2 }.to_string(),
            "draw_instanced vertices=6 instances=2"
        );
    }
}
