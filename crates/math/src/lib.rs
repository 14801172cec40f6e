//! Linear algebra for the arena renderer.
//!
//! One generic type, [`Matrix<R, C>`], covers every shape the renderer needs.
//! Vectors are column matrices (`Matrix<N, 1>`), so a matrix-vector product
//! is an ordinary matrix product and its dimensions are checked at compile time.
//!
//! # Invariants
//! - Storage is row-major and 16-byte aligned.
//! - All arithmetic is `f32`; nothing checks for overflow or NaN.
//! - Every operation is pure and allocation-free.

mod matrix;
mod transform;
mod vector;

pub use matrix::Matrix;
pub use transform::{Mat4Builder, radians};

/// 2x2 matrix.
pub type Mat2 = Matrix<2, 2>;
/// 3x3 matrix.
pub type Mat3 = Matrix<3, 3>;
/// 4x4 matrix. Instance records and camera matrices use this type.
pub type Mat4 = Matrix<4, 4>;
/// 2-element column vector.
pub type Vec2 = Matrix<2, 1>;
/// 3-element column vector.
pub type Vec3 = Matrix<3, 1>;
/// 4-element column vector, usually a homogeneous point.
pub type Vec4 = Matrix<4, 1>;

pub fn crate_info() -> &'static str {
    "arena-math v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("math"));
    }

    #[test]
    fn aliases_have_expected_sizes() {
        assert_eq!(std::mem::size_of::<Mat4>(), 64);
        assert_eq!(std::mem::align_of::<Mat4>(), 16);
        assert_eq!(Vec3::ZERO.as_slice().len(), 3);
        assert_eq!(Mat2::IDENTITY.as_slice(), &[1.0, 0.0, 0.0, 1.0]);
    }
}
