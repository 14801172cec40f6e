//! Static mesh geometry and the two-stream vertex layout.
//!
//! Stream 0 carries interleaved position(3) + texcoord(2) per vertex. Stream 1
//! carries one 4x4 transform per instance, split into four `vec4` attributes.

/// Whether a stream advances per vertex or per instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepMode {
    Vertex,
    /// Advances once per instance (divisor 1).
    Instance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttribute {
    pub location: u32,
    /// Number of `f32` components.
    pub components: u32,
    /// Byte offset within one stride.
    pub offset: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexStream {
    pub stride: u64,
    pub step: StepMode,
    pub attributes: &'static [VertexAttribute],
}

pub const MESH_STREAM: VertexStream = VertexStream {
    stride: 20,
    step: StepMode::Vertex,
    attributes: &[
        VertexAttribute { location: 0, components: 3, offset: 0 },
        VertexAttribute { location: 1, components: 2, offset: 12 },
    ],
};

pub const INSTANCE_STREAM: VertexStream = VertexStream {
    stride: 64,
    step: StepMode::Instance,
    attributes: &[
        VertexAttribute { location: 2, components: 4, offset: 0 },
        VertexAttribute { location: 3, components: 4, offset: 16 },
        VertexAttribute { location: 4, components: 4, offset: 32 },
        VertexAttribute { location: 5, components: 4, offset: 48 },
    ],
};

/// Triangle-list geometry shared by every instance of a drawable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StaticMesh {
    pub name: &'static str,
    /// Interleaved position(3) + texcoord(2).
    pub vertices: &'static [f32],
}

impl StaticMesh {
    pub const FLOATS_PER_VERTEX: usize = 5;

    pub fn vertex_count(&self) -> u32 {
        (self.vertices.len() / Self::FLOATS_PER_VERTEX) as u32
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.vertices)
    }
}

/// Unit cube centred on the origin.
#[rustfmt::skip]
pub const CUBE: StaticMesh = StaticMesh {
    name: "cube",
    vertices: &[
        -0.5, -0.5, -0.5, 0.0, 0.0,
        0.5, -0.5, -0.5, 1.0, 0.0,
        0.5, 0.5, -0.5, 1.0, 1.0,
        0.5, 0.5, -0.5, 1.0, 1.0,
        -0.5, 0.5, -0.5, 0.0, 1.0,
        -0.5, -0.5, -0.5, 0.0, 0.0,
        //
        -0.5, -0.5, 0.5, 0.0, 0.0,
        0.5, -0.5, 0.5, 1.0, 0.0,
        0.5, 0.5, 0.5, 1.0, 1.0,
        0.5, 0.5, 0.5, 1.0, 1.0,
        -0.5, 0.5, 0.5, 0.0, 1.0,
        -0.5, -0.5, 0.5, 0.0, 0.0,
        //
        -0.5, 0.5, 0.5, 1.0, 0.0,
        -0.5, 0.5, -0.5, 1.0, 1.0,
        -0.5, -0.5, -0.5, 0.0, 1.0,
        -0.5, -0.5, -0.5, 0.0, 1.0,
        -0.5, -0.5, 0.5, 0.0, 0.0,
        -0.5, 0.5, 0.5, 1.0, 0.0,
        //
        0.5, 0.5, 0.5, 1.0, 0.0,
        0.5, 0.5, -0.5, 1.0, 1.0,
        0.5, -0.5, -0.5, 0.0, 1.0,
        0.5, -0.5, -0.5, 0.0, 1.0,
        0.5, -0.5, 0.5, 0.0, 0.0,
        0.5, 0.5, 0.5, 1.0, 0.0,
        //
        -0.5, -0.5, -0.5, 0.0, 1.0,
        0.5, -0.5, -0.5, 1.0, 1.0,
        0.5, -0.5, 0.5, 1.0, 0.0,
        0.5, -0.5, 0.5, 1.0, 0.0,
        -0.5, -0.5, 0.5, 0.0, 0.0,
        -0.5, -0.5, -0.5, 0.0, 1.0,
        //
        -0.5, 0.5, -0.5, 0.0, 1.0,
        0.5, 0.5, -0.5, 1.0, 1.0,
        0.5, 0.5, 0.5, 1.0, 0.0,
        0.5, 0.5, 0.5, 1.0, 0.0,
        -0.5, 0.5, 0.5, 0.0, 0.0,
        -0.5, 0.5, -0.5, 0.0, 1.0,
    ],
};

/// Unit square in the z = 0 plane.
#[rustfmt::skip]
pub const SQUARE: StaticMesh = StaticMesh {
    name: "square",
    vertices: &[
        -0.5, -0.5, 0.0, 0.0, 0.0,
        0.5, -0.5, 0.0, 1.0, 0.0,
        0.5, 0.5, 0.0, 1.0, 1.0,
        0.5, 0.5, 0.0, 1.0, 1.0,
        -0.5, 0.5, 0.0, 0.0, 1.0,
        -0.5, -0.5, 0.0, 0.0, 0.0,
    ],
};

/// Slightly inset square so neighbouring grid tiles leave a visible gap.
#[rustfmt::skip]
pub const GRID_SQUARE: StaticMesh = StaticMesh {
    name: "grid_square",
    vertices: &[
        -0.48, -0.48, 0.0, 0.0, 0.0,
        0.48, -0.48, 0.0, 1.0, 0.0,
        0.48, 0.48, 0.0, 1.0, 1.0,
        0.48, 0.48, 0.0, 1.0, 1.0,
        -0.48, 0.48, 0.0, 0.0, 1.0,
        -0.48, -0.48, 0.0, 0.0, 0.0,
    ],
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_counts() {
        assert_eq!(CUBE.vertex_count(), 36);
        assert_eq!(SQUARE.vertex_count(), 6);
        assert_eq!(GRID_SQUARE.vertex_count(), 6);
        assert_eq!(CUBE.as_bytes().len() as u64, 36 * MESH_STREAM.stride);
    }

    #[test]
    fn streams_cover_their_stride() {
        for stream in [MESH_STREAM, INSTANCE_STREAM] {
            let last = stream.attributes.last().unwrap();
            assert_eq!(last.offset + 4 * last.components as u64, stream.stride);
        }
        let locations: Vec<u32> = MESH_STREAM
            .attributes
            .iter()
            .chain(INSTANCE_STREAM.attributes)
            .map(|a| a.location)
            .collect();
        assert_eq!(locations, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn cube_corners_within_unit_bounds() {
        for v in CUBE.vertices.chunks(StaticMesh::FLOATS_PER_VERTEX) {
            assert!(v[..3].iter().all(|c| c.abs() == 0.5));
            assert!(v[3..].iter().all(|t| (0.0..=1.0).contains(t)));
        }
    }
}
