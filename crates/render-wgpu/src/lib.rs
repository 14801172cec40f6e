//! wgpu backend for the arena renderer.
//!
//! Maps the backend seams of `arena-render` onto wgpu: mesh and instance
//! buffers become vertex buffer slots 0 and 1, each [`ProgramKind`] is a render
//! pipeline with its own uniform bind group, and texture unit `n` is bind
//! group `1 + n`.
//!
//! # Invariants
//! - Every pipeline shares the mesh/instance vertex layout of `arena-render`.
//! - Shader and pipeline faults are reported as [`ProgramError`], never as an
//!   uncaptured device error.
//! - Textures are shared (`Arc`) and outlive any drawable that binds them.
//!
//! [`ProgramKind`]: arena_render::ProgramKind

mod device;
mod frame;
mod program;
mod shaders;
mod texture;

pub use device::WgpuDevice;
pub use frame::{DEPTH_FORMAT, WgpuFrame, create_depth_view};
pub use program::{Program, ProgramError, Programs};
pub use texture::{
    GpuTexture, TextureError, TextureHandle, TextureOptions, decode_rgba, load_texture_from_file,
    load_texture_from_memory, mip_chain, read_rgba,
};

pub fn crate_info() -> &'static str {
    "arena-render-wgpu v0.1.0"
}
