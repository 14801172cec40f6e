use arena_math::Mat4;

use crate::buffer::MeshInstances;
use crate::device::{DrawContext, GpuDevice};
use crate::error::RenderError;
use crate::mesh::{CUBE, GRID_SQUARE, SQUARE, StaticMesh};
use crate::texture::TextureSet;

/// Something that can be drawn as one instanced call and whose per-instance
/// transforms can be edited in place.
///
/// Matrices are uploaded as given. Pass the transpose of a row-major model
/// matrix.
pub trait Drawable<D: GpuDevice> {
    /// Binds geometry and textures into `ctx` and issues one instanced draw.
    /// The program must already be selected; bindings are left in place.
    fn draw(&self, ctx: &mut dyn DrawContext<D>);

    fn modify(&mut self, device: &mut D, mat: &Mat4, index: u32) -> Result<(), RenderError>;

    fn modify_many(
        &mut self,
        device: &mut D,
        mat: &Mat4,
        indices: &[u32],
    ) -> Result<(), RenderError>;

    fn reset(&mut self, device: &mut D, mats: &[Mat4]) -> Result<(), RenderError>;

    fn push(&mut self, device: &mut D, mat: &Mat4) -> Result<(), RenderError>;

    fn extend(&mut self, device: &mut D, mats: &[Mat4]) -> Result<(), RenderError>;

    fn instance_count(&self) -> u32;

    fn capacity(&self) -> u32;
}

/// A static mesh drawn many times with per-instance transforms.
pub struct InstancedMesh<D: GpuDevice> {
    mesh: &'static StaticMesh,
    instances: MeshInstances<D>,
    textures: TextureSet<D::Texture>,
}

impl<D: GpuDevice> InstancedMesh<D> {
    pub fn new(
        device: &mut D,
        mesh: &'static StaticMesh,
        textures: &[D::Texture],
        capacity: u32,
    ) -> Result<Self, RenderError> {
        let textures = TextureSet::new(textures)?;
        let instances = MeshInstances::new(device, mesh, capacity);
        Ok(Self {
            mesh,
            instances,
            textures,
        })
    }

    pub fn cube(device: &mut D, textures: &[D::Texture], capacity: u32) -> Result<Self, RenderError> {
        Self::new(device, &CUBE, textures, capacity)
    }

    pub fn square(
        device: &mut D,
        textures: &[D::Texture],
        capacity: u32,
    ) -> Result<Self, RenderError> {
        Self::new(device, &SQUARE, textures, capacity)
    }

    /// Untextured grid tile, drawn with the flat-color program.
    pub fn grid_square(device: &mut D, capacity: u32) -> Self {
        Self {
            mesh: &GRID_SQUARE,
            instances: MeshInstances::new(device, &GRID_SQUARE, capacity),
            textures: TextureSet::empty(),
        }
    }

    pub fn mesh(&self) -> &'static StaticMesh {
        self.mesh
    }

    pub fn textures(&self) -> &TextureSet<D::Texture> {
        &self.textures
    }
}

impl<D: GpuDevice> Drawable<D> for InstancedMesh<D> {
    fn draw(&self, ctx: &mut dyn DrawContext<D>) {
        ctx.bind_mesh(self.instances.vertex_buffer(), self.instances.instance_buffer());
        for (unit, texture) in self.textures.units() {
            ctx.bind_texture(unit, texture);
        }
        ctx.draw_instanced(self.instances.vertex_count(), self.instances.instance_count());
        tracing::trace!(
            mesh = self.mesh.name,
            instances = self.instances.instance_count(),
            "drew instanced mesh"
        );
    }

    fn modify(&mut self, device: &mut D, mat: &Mat4, index: u32) -> Result<(), RenderError> {
        self.instances.modify(device, mat, index)
    }

    fn modify_many(
        &mut self,
        device: &mut D,
        mat: &Mat4,
        indices: &[u32],
    ) -> Result<(), RenderError> {
        self.instances.modify_many(device, mat, indices)
    }

    fn reset(&mut self, device: &mut D, mats: &[Mat4]) -> Result<(), RenderError> {
        self.instances.reset(device, mats)
    }

    fn push(&mut self, device: &mut D, mat: &Mat4) -> Result<(), RenderError> {
        self.instances.push(device, mat)
    }

    fn extend(&mut self, device: &mut D, mats: &[Mat4]) -> Result<(), RenderError> {
        self.instances.extend(device, mats)
    }

    fn instance_count(&self) -> u32 {
        self.instances.instance_count()
    }

    fn capacity(&self) -> u32 {
        self.instances.capacity()
    }
}
