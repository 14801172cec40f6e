//! Rotation, translation, scaling, look-at and perspective constructors.
//!
//! All matrices act on column vectors (`m * v`). Projection output uses the
//! [0, 1] depth range of wgpu.

use crate::matrix::Matrix;
use crate::{Mat3, Mat4, Vec3};

/// Degrees to radians.
pub fn radians(deg: f32) -> f32 {
    deg.to_radians()
}

impl Matrix<3, 3> {
    pub fn rotation_x(rad: f32) -> Self {
        let (s, c) = rad.sin_cos();
        Self::from_rows([[1.0, 0.0, 0.0], [0.0, c, -s], [0.0, s, c]])
    }

    pub fn rotation_y(rad: f32) -> Self {
        let (s, c) = rad.sin_cos();
        Self::from_rows([[c, 0.0, s], [0.0, 1.0, 0.0], [-s, 0.0, c]])
    }

    pub fn rotation_z(rad: f32) -> Self {
        let (s, c) = rad.sin_cos();
        Self::from_rows([[c, -s, 0.0], [s, c, 0.0], [0.0, 0.0, 1.0]])
    }

    /// Right-handed rotation of `rad` around `axis` (normalized here).
    pub fn from_axis_angle(axis: Vec3, rad: f32) -> Self {
        let a = axis.normalize();
        let (x, y, z) = (a[0], a[1], a[2]);
        let (s, c) = rad.sin_cos();
        let t = 1.0 - c;
        Self::from_rows([
            [t * x * x + c, t * x * y - s * z, t * x * z + s * y],
            [t * x * y + s * z, t * y * y + c, t * y * z - s * x],
            [t * x * z - s * y, t * y * z + s * x, t * z * z + c],
        ])
    }
}

impl Matrix<4, 4> {
    /// Embeds a 3x3 linear map in the upper-left block.
    pub fn from_mat3(m: Mat3) -> Self {
        let mut out = Self::IDENTITY;
        for r in 0..3 {
            for c in 0..3 {
                out[(r, c)] = m[(r, c)];
            }
        }
        out
    }

    pub fn rotation_x(rad: f32) -> Self {
        Self::from_mat3(Mat3::rotation_x(rad))
    }

    pub fn rotation_y(rad: f32) -> Self {
        Self::from_mat3(Mat3::rotation_y(rad))
    }

    pub fn rotation_z(rad: f32) -> Self {
        Self::from_mat3(Mat3::rotation_z(rad))
    }

    pub fn translation(t: Vec3) -> Self {
        let mut out = Self::IDENTITY;
        out[(0, 3)] = t[0];
        out[(1, 3)] = t[1];
        out[(2, 3)] = t[2];
        out
    }

    pub fn scaling(s: Vec3) -> Self {
        let mut out = Self::IDENTITY;
        out[(0, 0)] = s[0];
        out[(1, 1)] = s[1];
        out[(2, 2)] = s[2];
        out
    }

    /// Right-handed view matrix looking from `eye` towards `target`.
    pub fn look_at_rh(eye: Vec3, target: Vec3, up: Vec3) -> Self {
        let f = (target - eye).normalize();
        let s = f.cross(&up).normalize();
        let u = s.cross(&f);
        Self::from_rows([
            [s[0], s[1], s[2], -s.dot(&eye)],
            [u[0], u[1], u[2], -u.dot(&eye)],
            [-f[0], -f[1], -f[2], f.dot(&eye)],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Right-handed symmetric frustum from the vertical half field-of-view.
    pub fn perspective_rh(half_fov: f32, aspect: f32, near: f32, far: f32) -> Self {
        let f = 1.0 / half_fov.tan();
        let r = far / (near - far);
        Self::from_rows([
            [f / aspect, 0.0, 0.0, 0.0],
            [0.0, f, 0.0, 0.0],
            [0.0, 0.0, r, r * near],
            [0.0, 0.0, -1.0, 0.0],
        ])
    }

    /// Applies the matrix to a point (w = 1) and divides by the resulting w.
    pub fn transform_point(&self, p: Vec3) -> Vec3 {
        let h = *self * p.extend(1.0);
        h.xyz() / h.w()
    }
}

/// Composes transforms left to right: `translate(..).rotate_x(..)` yields `T * Rx`.
#[derive(Debug, Clone, Copy)]
pub struct Mat4Builder(Mat4);

impl Default for Mat4Builder {
    fn default() -> Self {
        Self(Mat4::IDENTITY)
    }
}

impl Mat4Builder {
    pub fn translate(self, t: Vec3) -> Self {
        Self(self.0 * Mat4::translation(t))
    }

    pub fn scale(self, s: Vec3) -> Self {
        Self(self.0 * Mat4::scaling(s))
    }

    pub fn rotate_x(self, rad: f32) -> Self {
        Self(self.0 * Mat4::rotation_x(rad))
    }

    pub fn rotate_y(self, rad: f32) -> Self {
        Self(self.0 * Mat4::rotation_y(rad))
    }

    pub fn rotate_z(self, rad: f32) -> Self {
        Self(self.0 * Mat4::rotation_z(rad))
    }

    pub fn build(self) -> Mat4 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Vec4;
    use approx::assert_abs_diff_eq;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn rotation_z_turns_x_into_y() {
        let v = Mat3::rotation_z(FRAC_PI_2) * Vec3::X;
        assert_abs_diff_eq!(v, Vec3::Y, epsilon = 1e-6);
        let v4 = Mat4::rotation_z(FRAC_PI_2) * Vec4::new(1.0, 0.0, 0.0, 1.0);
        assert_abs_diff_eq!(v4, Vec4::new(0.0, 1.0, 0.0, 1.0), epsilon = 1e-6);
    }

    #[test]
    fn rotation_matrices_are_orthonormal() {
        for m in [
            Mat3::rotation_x(0.3),
            Mat3::rotation_y(-1.2),
            Mat3::rotation_z(2.5),
        ] {
            assert_abs_diff_eq!(m * m.transpose(), Mat3::IDENTITY, epsilon = 1e-6);
        }
    }

    #[test]
    fn axis_angle_matches_principal_rotations() {
        assert_abs_diff_eq!(
            Mat3::from_axis_angle(Vec3::Z, 0.7),
            Mat3::rotation_z(0.7),
            epsilon = 1e-6
        );
        assert_abs_diff_eq!(
            Mat3::from_axis_angle(Vec3::new(2.0, 0.0, 0.0), -0.4),
            Mat3::rotation_x(-0.4),
            epsilon = 1e-6
        );
    }

    #[test]
    fn rotations_match_glam() {
        let ours = Mat4::rotation_y(0.9);
        let theirs: Mat4 = glam::Mat4::from_rotation_y(0.9).into();
        assert_abs_diff_eq!(ours, theirs, epsilon = 1e-6);
    }

    #[test]
    fn look_at_matches_glam() {
        let eye = Vec3::new(1.0, 2.0, -10.0);
        let target = Vec3::new(0.0, 0.5, 3.0);
        let up = Vec3::new(0.0, -1.0, 0.0);
        let ours = Mat4::look_at_rh(eye, target, up);
        let theirs: Mat4 = glam::Mat4::look_at_rh(eye.into(), target.into(), up.into()).into();
        assert_abs_diff_eq!(ours, theirs, epsilon = 1e-5);
    }

    #[test]
    fn perspective_matches_glam() {
        let half = radians(25.0);
        let ours = Mat4::perspective_rh(half, 1.5, 0.1, 500.0);
        let theirs: Mat4 = glam::Mat4::perspective_rh(half * 2.0, 1.5, 0.1, 500.0).into();
        assert_abs_diff_eq!(ours, theirs, epsilon = 1e-4);
    }

    #[test]
    fn translation_and_scaling_compose() {
        let m = Mat4Builder::default()
            .translate(Vec3::new(1.0, 2.0, 3.0))
            .scale(Vec3::new(2.0, 2.0, 2.0))
            .build();
        let p = m.transform_point(Vec3::new(1.0, 1.0, 1.0));
        assert_eq!(p, Vec3::new(3.0, 4.0, 5.0));
    }
}
