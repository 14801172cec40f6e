/// Faults raised by drawables and their instance buffers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    #[error("instance capacity exceeded: {requested} records requested, capacity is {capacity}")]
    CapacityExceeded { requested: usize, capacity: u32 },
    #[error("instance index {index} out of range ({count} live instances)")]
    InstanceOutOfRange { index: u32, count: u32 },
    #[error("{given} textures given, at most {max} texture units are available")]
    TooManyTextures { given: usize, max: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CameraError {
    #[error("camera matrices are stale; call update() after moving the camera")]
    Stale,
    #[error("projection x view matrix is singular")]
    Singular,
}
