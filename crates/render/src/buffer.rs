use arena_math::Mat4;

use crate::device::{BufferDescriptor, BufferUsage, GpuDevice};
use crate::error::RenderError;
use crate::mesh::StaticMesh;

/// Bytes per instance record: one 4x4 `f32` matrix.
pub const INSTANCE_STRIDE: u64 = 64;

/// Static mesh geometry plus a fixed-capacity buffer of per-instance transforms.
///
/// Records `[0, instance_count)` are live. Every mutator checks its bounds
/// before touching the device, so a rejected call leaves both the buffer and
/// the count as they were.
pub struct MeshInstances<D: GpuDevice> {
    vertex: D::Buffer,
    instance: D::Buffer,
    vertex_count: u32,
    capacity: u32,
    instance_count: u32,
}

impl<D: GpuDevice> MeshInstances<D> {
    pub fn new(device: &mut D, mesh: &StaticMesh, capacity: u32) -> Self {
        let vertex = device.create_buffer(&BufferDescriptor {
            label: mesh.name,
            usage: BufferUsage::Static,
            size: 0,
            contents: Some(mesh.as_bytes()),
        });
        let instance = device.create_buffer(&BufferDescriptor {
            label: mesh.name,
            usage: BufferUsage::Stream,
            size: capacity as u64 * INSTANCE_STRIDE,
            contents: None,
        });
        tracing::debug!(mesh = mesh.name, capacity, "created mesh-instance buffers");

        Self {
            vertex,
            instance,
            vertex_count: mesh.vertex_count(),
            capacity,
            instance_count: 0,
        }
    }

    pub fn vertex_buffer(&self) -> &D::Buffer {
        &self.vertex
    }

    pub fn instance_buffer(&self) -> &D::Buffer {
        &self.instance
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn instance_count(&self) -> u32 {
        self.instance_count
    }

    /// Overwrites record `index`. The count is unchanged.
    pub fn modify(&mut self, device: &mut D, mat: &Mat4, index: u32) -> Result<(), RenderError> {
        self.check_live(index)?;
        device.write_buffer(&self.instance, offset_of(index), mat.as_bytes());
        tracing::trace!(index, "instance record modified");
        Ok(())
    }

    /// Writes the same matrix to every listed index. All indices are checked
    /// first.
    pub fn modify_many(
        &mut self,
        device: &mut D,
        mat: &Mat4,
        indices: &[u32],
    ) -> Result<(), RenderError> {
        for &index in indices {
            self.check_live(index)?;
        }
        for &index in indices {
            device.write_buffer(&self.instance, offset_of(index), mat.as_bytes());
        }
        tracing::trace!(records = indices.len(), "instance records modified");
        Ok(())
    }

    /// Replaces the live range with `mats`.
    pub fn reset(&mut self, device: &mut D, mats: &[Mat4]) -> Result<(), RenderError> {
        self.check_fits(0, mats.len())?;
        self.upload(device, 0, mats);
        self.instance_count = mats.len() as u32;
        tracing::trace!(count = self.instance_count, "instance records reset");
        Ok(())
    }

    /// Appends one record.
    pub fn push(&mut self, device: &mut D, mat: &Mat4) -> Result<(), RenderError> {
        self.extend(device, std::slice::from_ref(mat))
    }

    /// Appends `mats` after the live range.
    pub fn extend(&mut self, device: &mut D, mats: &[Mat4]) -> Result<(), RenderError> {
        self.check_fits(self.instance_count, mats.len())?;
        self.upload(device, self.instance_count, mats);
        self.instance_count += mats.len() as u32;
        tracing::trace!(count = self.instance_count, "instance records appended");
        Ok(())
    }

    fn upload(&self, device: &mut D, first: u32, mats: &[Mat4]) {
        match mats {
            [] => {}
            [mat] => device.write_buffer(&self.instance, offset_of(first), mat.as_bytes()),
            _ => {
                let staged: Vec<f32> = mats
                    .iter()
                    .flat_map(|m| m.as_slice().iter().copied())
                    .collect();
                device.write_buffer(&self.instance, offset_of(first), bytemuck::cast_slice(&staged));
            }
        }
    }

    fn check_live(&self, index: u32) -> Result<(), RenderError> {
        if index < self.instance_count {
            return Ok(());
        }
        Err(rejected(RenderError::InstanceOutOfRange {
            index,
            count: self.instance_count,
        }))
    }

    fn check_fits(&self, start: u32, n: usize) -> Result<(), RenderError> {
        let requested = start as usize + n;
        if requested <= self.capacity as usize {
            return Ok(());
        }
        Err(rejected(RenderError::CapacityExceeded {
            requested,
            capacity: self.capacity,
        }))
    }
}

fn offset_of(index: u32) -> u64 {
    index as u64 * INSTANCE_STRIDE
}

fn rejected(err: RenderError) -> RenderError {
    tracing::warn!(%err, "instance buffer write rejected");
    err
}
