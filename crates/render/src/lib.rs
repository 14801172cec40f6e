//! Rendering core: backend-agnostic instanced drawables and the camera.
//!
//! A drawable owns one static mesh, a fixed-capacity buffer of per-instance
//! transforms and a short list of shared texture handles. Drawing it issues a
//! single instanced draw call through a [`DrawContext`]. The GPU backend sits
//! behind the [`GpuDevice`] trait, so the same drawables run on wgpu or on the
//! headless [`RecordingDevice`].
//!
//! # Invariants
//! - `0 <= instance_count <= capacity` for every drawable; capacity never grows.
//! - A rejected buffer operation writes nothing.
//! - Instance records are uploaded verbatim; callers supply device-ready
//!   (transposed) matrices.
//! - Camera matrices are only readable after `update()` has run since the
//!   last mutation.

mod buffer;
mod camera;
mod device;
mod drawable;
mod error;
mod mesh;
mod recording;
mod texture;

pub use buffer::{INSTANCE_STRIDE, MeshInstances};
pub use camera::{Camera, CameraDesc, CameraMatrices, MatrixPair, Orientation, Ray};
pub use device::{BufferDescriptor, BufferUsage, DrawContext, GpuDevice, ProgramKind};
pub use drawable::{Drawable, InstancedMesh};
pub use error::{CameraError, RenderError};
pub use mesh::{
    CUBE, GRID_SQUARE, INSTANCE_STREAM, MESH_STREAM, SQUARE, StaticMesh, StepMode,
    VertexAttribute, VertexStream,
};
pub use recording::{
    BindState, BufferId, CommandRecorder, DrawCommand, RecordedBuffer, RecordingDevice, TextureId,
};
pub use texture::{MAX_TEXTURE_UNITS, TextureSet};

pub fn crate_info() -> &'static str {
    "arena-render v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;
    use arena_math::Mat4;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("render"));
    }

    #[test]
    fn three_identity_instances_draw_once() {
        let mut device = RecordingDevice::new();
        let mut cube = InstancedMesh::cube(&mut device, &[], 4).unwrap();
        for _ in 0..3 {
            cube.push(&mut device, &Mat4::IDENTITY).unwrap();
        }
        assert_eq!(cube.instance_count(), 3);

        let mut ctx = CommandRecorder::new();
        cube.draw(&mut ctx);
        let draws: Vec<_> = ctx.draw_calls().collect();
        assert_eq!(draws, vec![(36, 3)]);
    }
}
