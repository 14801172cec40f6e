//! Backend seams: buffer allocation/upload and the per-frame draw context.

/// How often a buffer's contents are expected to change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferUsage {
    /// Written once at creation.
    Static,
    /// Rewritten between frames.
    Stream,
}

/// Parameters for [`GpuDevice::create_buffer`].
#[derive(Debug, Clone, Copy)]
pub struct BufferDescriptor<'a> {
    pub label: &'a str,
    pub usage: BufferUsage,
    /// Size in bytes. Ignored when `contents` is set.
    pub size: u64,
    /// Initial contents. `None` leaves the buffer uninitialized.
    pub contents: Option<&'a [u8]>,
}

impl BufferDescriptor<'_> {
    /// Effective byte size of the buffer.
    pub fn byte_len(&self) -> u64 {
        self.contents.map_or(self.size, |c| c.len() as u64)
    }
}

/// Buffer allocation and upload.
///
/// Textures are created by backend-specific loaders and only need to be
/// cheap to clone, since drawables share them.
pub trait GpuDevice {
    type Buffer;
    type Texture: Clone;

    fn create_buffer(&mut self, desc: &BufferDescriptor<'_>) -> Self::Buffer;

    /// Copies `data` into `buffer` starting at byte `offset`.
    fn write_buffer(&mut self, buffer: &Self::Buffer, offset: u64, data: &[u8]);
}

/// The two shader programs the renderer uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ProgramKind {
    /// Untextured; flat color plus view/projection.
    FlatColor,
    /// View/projection; samples the bound texture units.
    Textured,
}

impl ProgramKind {
    pub const ALL: [ProgramKind; 2] = [ProgramKind::FlatColor, ProgramKind::Textured];

    pub fn name(self) -> &'static str {
        match self {
            ProgramKind::FlatColor => "flat_color",
            ProgramKind::Textured => "textured",
        }
    }
}

/// Per-frame draw state. Bindings persist until overwritten.
pub trait DrawContext<D: GpuDevice> {
    fn use_program(&mut self, program: ProgramKind);
    fn bind_mesh(&mut self, vertex: &D::Buffer, instance: &D::Buffer);
    fn bind_texture(&mut self, unit: u32, texture: &D::Texture);
    fn draw_instanced(&mut self, vertex_count: u32, instance_count: u32);
}
