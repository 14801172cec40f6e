use crate::matrix::Matrix;

impl<const N: usize> Matrix<N, 1> {
    /// Column vector from its elements.
    pub const fn from_array(values: [f32; N]) -> Self {
        let mut rows = [[0.0; 1]; N];
        let mut i = 0;
        while i < N {
            rows[i][0] = values[i];
            i += 1;
        }
        Self::from_rows(rows)
    }

    pub fn dot(&self, rhs: &Self) -> f32 {
        self.as_slice()
            .iter()
            .zip(rhs.as_slice())
            .map(|(a, b)| a * b)
            .sum()
    }

    /// Euclidean norm.
    pub fn length(&self) -> f32 {
        self.dot(self).sqrt()
    }

    /// Divides by the Euclidean norm. A zero vector yields NaNs.
    pub fn normalize(&self) -> Self {
        *self / self.length()
    }
}

impl Matrix<2, 1> {
    pub const fn new(x: f32, y: f32) -> Self {
        Self::from_array([x, y])
    }

    pub fn x(&self) -> f32 {
        self[0]
    }

    pub fn y(&self) -> f32 {
        self[1]
    }

    /// Promotes to a 3-vector with `z` appended.
    pub fn extend(&self, z: f32) -> Matrix<3, 1> {
        Matrix::<3, 1>::new(self[0], self[1], z)
    }
}

impl Matrix<3, 1> {
    pub const X: Self = Self::new(1.0, 0.0, 0.0);
    pub const Y: Self = Self::new(0.0, 1.0, 0.0);
    pub const Z: Self = Self::new(0.0, 0.0, 1.0);

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self::from_array([x, y, z])
    }

    pub fn x(&self) -> f32 {
        self[0]
    }

    pub fn y(&self) -> f32 {
        self[1]
    }

    pub fn z(&self) -> f32 {
        self[2]
    }

    /// Promotes to a homogeneous 4-vector with `w` appended.
    pub fn extend(&self, w: f32) -> Matrix<4, 1> {
        Matrix::<4, 1>::new(self[0], self[1], self[2], w)
    }

    pub fn cross(&self, rhs: &Self) -> Self {
        Self::new(
            self[1] * rhs[2] - self[2] * rhs[1],
            self[2] * rhs[0] - self[0] * rhs[2],
            self[0] * rhs[1] - self[1] * rhs[0],
        )
    }

    pub fn to_array(&self) -> [f32; 3] {
        [self[0], self[1], self[2]]
    }
}

impl Matrix<4, 1> {
    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self::from_array([x, y, z, w])
    }

    /// 2-vector followed by two trailing scalars.
    pub fn from_vec2(v: Matrix<2, 1>, z: f32, w: f32) -> Self {
        Self::new(v[0], v[1], z, w)
    }

    /// 3-vector followed by a trailing scalar.
    pub fn from_vec3(v: Matrix<3, 1>, w: f32) -> Self {
        v.extend(w)
    }

    pub fn x(&self) -> f32 {
        self[0]
    }

    pub fn y(&self) -> f32 {
        self[1]
    }

    pub fn z(&self) -> f32 {
        self[2]
    }

    pub fn w(&self) -> f32 {
        self[3]
    }

    /// Drops the fourth component.
    pub fn xyz(&self) -> Matrix<3, 1> {
        Matrix::<3, 1>::new(self[0], self[1], self[2])
    }

    /// Cross product of the first three components; `w` of the result is zero.
    pub fn cross(&self, rhs: &Self) -> Self {
        self.xyz().cross(&rhs.xyz()).extend(0.0)
    }

    pub fn to_array(&self) -> [f32; 4] {
        [self[0], self[1], self[2], self[3]]
    }
}

impl From<[f32; 3]> for Matrix<3, 1> {
    fn from(v: [f32; 3]) -> Self {
        Self::from_array(v)
    }
}

impl From<glam::Vec3> for Matrix<3, 1> {
    fn from(v: glam::Vec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

impl From<Matrix<3, 1>> for glam::Vec3 {
    fn from(v: Matrix<3, 1>) -> Self {
        glam::Vec3::new(v[0], v[1], v[2])
    }
}

impl From<glam::Vec4> for Matrix<4, 1> {
    fn from(v: glam::Vec4) -> Self {
        Self::new(v.x, v.y, v.z, v.w)
    }
}

impl From<Matrix<4, 1>> for glam::Vec4 {
    fn from(v: Matrix<4, 1>) -> Self {
        glam::Vec4::new(v[0], v[1], v[2], v[3])
    }
}

#[cfg(test)]
mod tests {
    use crate::{Mat4, Vec2, Vec3, Vec4};

    #[test]
    fn normalize_yields_unit_length() {
        for v in [
            Vec3::new(3.0, 4.0, 0.0),
            Vec3::new(-0.001, 0.002, 0.0005),
            Vec3::new(120.0, -7.5, 33.0),
        ] {
            let n = v.normalize();
            assert!((n.length() - 1.0).abs() < 1e-5);
            assert!((n.dot(&n) - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn cross_is_anti_commutative() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(-4.0, 0.5, 2.0);
        assert_eq!(a.cross(&b), -b.cross(&a));
        assert_eq!(Vec3::X.cross(&Vec3::Y), Vec3::Z);
    }

    #[test]
    fn four_element_cross_ignores_w() {
        let a = Vec4::new(1.0, 0.0, 0.0, 7.0);
        let b = Vec4::new(0.0, 1.0, 0.0, -3.0);
        assert_eq!(a.cross(&b), Vec4::new(0.0, 0.0, 1.0, 0.0));
    }

    #[test]
    fn dot_product() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(4.0, -5.0, 6.0);
        assert_eq!(a.dot(&b), 12.0);
    }

    #[test]
    fn homogeneous_promotion() {
        let v2 = Vec2::new(1.0, 2.0);
        assert_eq!(Vec4::from_vec2(v2, 3.0, 1.0), Vec4::new(1.0, 2.0, 3.0, 1.0));
        assert_eq!(v2.extend(5.0), Vec3::new(1.0, 2.0, 5.0));

        let p = Vec4::from_vec3(Vec3::new(1.0, 2.0, 3.0), 1.0);
        assert_eq!(p.w(), 1.0);
        assert_eq!(p.xyz(), Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn matrix_vector_product_uses_rows() {
        let mut m = Mat4::IDENTITY;
        m[(0, 3)] = 5.0;
        let p = m * Vec4::new(1.0, 1.0, 1.0, 1.0);
        assert_eq!(p, Vec4::new(6.0, 1.0, 1.0, 1.0));
    }
}
