use std::ops::{
    Add, AddAssign, Div, DivAssign, Index, IndexMut, Mul, MulAssign, Neg, Sub, SubAssign,
};

/// Pivots smaller than this are treated as zero when inverting.
const SINGULAR_EPSILON: f32 = 1e-12;

/// Fixed-size, row-major `f32` matrix with `R` rows and `C` columns.
///
/// The dimensions are part of the type: multiplying a `Matrix<2, 3>` by a
/// `Matrix<4, 1>` does not compile. Column vectors are `Matrix<N, 1>` and get
/// their own helpers (see the `Vec2`/`Vec3`/`Vec4` aliases).
#[repr(C, align(16))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix<const R: usize, const C: usize> {
    pub(crate) rows: [[f32; C]; R],
}

impl<const R: usize, const C: usize> Matrix<R, C> {
    /// All elements zero.
    pub const ZERO: Self = Self::splat(0.0);

    /// Matrix with every element set to `value`.
    pub const fn splat(value: f32) -> Self {
        Self {
            rows: [[value; C]; R],
        }
    }

    /// Matrix from an explicit row list.
    pub const fn from_rows(rows: [[f32; C]; R]) -> Self {
        Self { rows }
    }

    /// Copies the first `R * C` elements of `data` in row-major order.
    ///
    /// # Panics
    /// Panics if `data` holds fewer than `R * C` elements.
    pub fn from_slice(data: &[f32]) -> Self {
        let mut out = Self::ZERO;
        out.as_mut_slice().copy_from_slice(&data[..R * C]);
        out
    }

    /// Number of elements.
    pub const fn len(&self) -> usize {
        R * C
    }

    pub const fn is_empty(&self) -> bool {
        R * C == 0
    }

    pub fn rows(&self) -> &[[f32; C]; R] {
        &self.rows
    }

    /// Row-major element view.
    pub fn as_slice(&self) -> &[f32] {
        self.rows.as_flattened()
    }

    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        self.rows.as_flattened_mut()
    }

    /// Raw bytes of the elements, ready for a buffer upload.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.as_slice())
    }

    /// Column `c` as a column vector.
    pub fn column(&self, c: usize) -> Matrix<R, 1> {
        let mut out = Matrix::<R, 1>::ZERO;
        for r in 0..R {
            out.rows[r][0] = self.rows[r][c];
        }
        out
    }

    pub fn transpose(&self) -> Matrix<C, R> {
        let mut out = Matrix::<C, R>::ZERO;
        for r in 0..R {
            for c in 0..C {
                out.rows[c][r] = self.rows[r][c];
            }
        }
        out
    }

    /// Applies `f` to every element.
    pub fn map(&self, f: impl Fn(f32) -> f32) -> Self {
        let mut out = *self;
        out.as_mut_slice().iter_mut().for_each(|v| *v = f(*v));
        out
    }

    fn zip_map(&self, other: &Self, f: impl Fn(f32, f32) -> f32) -> Self {
        let mut out = *self;
        for (v, o) in out.as_mut_slice().iter_mut().zip(other.as_slice()) {
            *v = f(*v, *o);
        }
        out
    }

    /// Elementwise minimum.
    pub fn min(&self, other: &Self) -> Self {
        self.zip_map(other, f32::min)
    }

    /// Elementwise maximum.
    pub fn max(&self, other: &Self) -> Self {
        self.zip_map(other, f32::max)
    }

    /// Elementwise absolute value.
    pub fn abs(&self) -> Self {
        self.map(f32::abs)
    }
}

impl<const N: usize> Matrix<N, N> {
    /// Ones on the diagonal, zeros elsewhere.
    pub const IDENTITY: Self = {
        let mut rows = [[0.0; N]; N];
        let mut i = 0;
        while i < N {
            rows[i][i] = 1.0;
            i += 1;
        }
        Self { rows }
    };

    pub const fn identity() -> Self {
        Self::IDENTITY
    }

    /// Inverse by Gauss-Jordan elimination with partial pivoting.
    ///
    /// Returns `None` when the matrix is singular.
    pub fn inverse(&self) -> Option<Self> {
        let mut a = self.rows;
        let mut inv = Self::IDENTITY.rows;

        for col in 0..N {
            let pivot = (col..N).max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))?;
            if a[pivot][col].abs() < SINGULAR_EPSILON {
                return None;
            }
            a.swap(col, pivot);
            inv.swap(col, pivot);

            let p = a[col][col];
            for c in 0..N {
                a[col][c] /= p;
                inv[col][c] /= p;
            }

            let pivot_row = a[col];
            let inv_row = inv[col];
            for r in 0..N {
                let factor = a[r][col];
                if r == col || factor == 0.0 {
                    continue;
                }
                for c in 0..N {
                    a[r][c] -= factor * pivot_row[c];
                    inv[r][c] -= factor * inv_row[c];
                }
            }
        }

        Some(Self { rows: inv })
    }

    /// Determinant via row reduction.
    pub fn determinant(&self) -> f32 {
        let mut a = self.rows;
        let mut det = 1.0;

        for col in 0..N {
            let Some(pivot) =
                (col..N).max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))
            else {
                return det;
            };
            if a[pivot][col] == 0.0 {
                return 0.0;
            }
            if pivot != col {
                a.swap(col, pivot);
                det = -det;
            }
            det *= a[col][col];

            let pivot_row = a[col];
            for r in (col + 1)..N {
                let factor = a[r][col] / pivot_row[col];
                for c in col..N {
                    a[r][c] -= factor * pivot_row[c];
                }
            }
        }

        det
    }
}

impl<const R: usize, const C: usize> Default for Matrix<R, C> {
    fn default() -> Self {
        Self::ZERO
    }
}

impl<const R: usize, const C: usize> Index<(usize, usize)> for Matrix<R, C> {
    type Output = f32;

    fn index(&self, (r, c): (usize, usize)) -> &f32 {
        &self.rows[r][c]
    }
}

impl<const R: usize, const C: usize> IndexMut<(usize, usize)> for Matrix<R, C> {
    fn index_mut(&mut self, (r, c): (usize, usize)) -> &mut f32 {
        &mut self.rows[r][c]
    }
}

/// Flat row-major index. For row and column vectors this is the element index.
impl<const R: usize, const C: usize> Index<usize> for Matrix<R, C> {
    type Output = f32;

    fn index(&self, i: usize) -> &f32 {
        &self.as_slice()[i]
    }
}

impl<const R: usize, const C: usize> IndexMut<usize> for Matrix<R, C> {
    fn index_mut(&mut self, i: usize) -> &mut f32 {
        &mut self.as_mut_slice()[i]
    }
}

impl<const R: usize, const C: usize, const K: usize> Mul<Matrix<C, K>> for Matrix<R, C> {
    type Output = Matrix<R, K>;

    fn mul(self, rhs: Matrix<C, K>) -> Matrix<R, K> {
        let mut out = Matrix::<R, K>::ZERO;
        for r in 0..R {
            for k in 0..K {
                let mut sum = 0.0;
                for c in 0..C {
                    sum += self.rows[r][c] * rhs.rows[c][k];
                }
                out.rows[r][k] = sum;
            }
        }
        out
    }
}

impl<const R: usize, const C: usize> Mul<f32> for Matrix<R, C> {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self {
        self.map(|v| v * rhs)
    }
}

impl<const R: usize, const C: usize> Mul<Matrix<R, C>> for f32 {
    type Output = Matrix<R, C>;

    fn mul(self, rhs: Matrix<R, C>) -> Matrix<R, C> {
        rhs * self
    }
}

impl<const R: usize, const C: usize> MulAssign<f32> for Matrix<R, C> {
    fn mul_assign(&mut self, rhs: f32) {
        *self = *self * rhs;
    }
}

impl<const R: usize, const C: usize> Div<f32> for Matrix<R, C> {
    type Output = Self;

    fn div(self, rhs: f32) -> Self {
        self.map(|v| v / rhs)
    }
}

impl<const R: usize, const C: usize> DivAssign<f32> for Matrix<R, C> {
    fn div_assign(&mut self, rhs: f32) {
        *self = *self / rhs;
    }
}

impl<const R: usize, const C: usize> Add for Matrix<R, C> {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        self.zip_map(&rhs, |a, b| a + b)
    }
}

impl<const R: usize, const C: usize> AddAssign for Matrix<R, C> {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl<const R: usize, const C: usize> Sub for Matrix<R, C> {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        self.zip_map(&rhs, |a, b| a - b)
    }
}

impl<const R: usize, const C: usize> SubAssign for Matrix<R, C> {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl<const R: usize, const C: usize> Neg for Matrix<R, C> {
    type Output = Self;

    fn neg(self) -> Self {
        self.map(|v| -v)
    }
}

impl<const R: usize, const C: usize> approx::AbsDiffEq for Matrix<R, C> {
    type Epsilon = f32;

    fn default_epsilon() -> f32 {
        f32::EPSILON
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: f32) -> bool {
        self.as_slice()
            .iter()
            .zip(other.as_slice())
            .all(|(a, b)| f32::abs_diff_eq(a, b, epsilon))
    }
}

impl From<glam::Mat4> for Matrix<4, 4> {
    fn from(m: glam::Mat4) -> Self {
        // glam columns are our rows after a transpose
        Self::from_rows(m.transpose().to_cols_array_2d())
    }
}

impl From<Matrix<4, 4>> for glam::Mat4 {
    fn from(m: Matrix<4, 4>) -> Self {
        glam::Mat4::from_cols_array_2d(&m.transpose().rows)
    }
}

impl From<glam::Mat3> for Matrix<3, 3> {
    fn from(m: glam::Mat3) -> Self {
        Self::from_rows(m.transpose().to_cols_array_2d())
    }
}

impl From<Matrix<3, 3>> for glam::Mat3 {
    fn from(m: Matrix<3, 3>) -> Self {
        glam::Mat3::from_cols_array_2d(&m.transpose().rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn sample_2x3() -> Matrix<2, 3> {
        Matrix::from_rows([[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]])
    }

    #[test]
    fn fill_and_slice_constructors() {
        let m = Matrix::<2, 2>::splat(7.0);
        assert!(m.as_slice().iter().all(|v| *v == 7.0));

        let data = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 99.0];
        let m = Matrix::<2, 3>::from_slice(&data);
        assert_eq!(m, sample_2x3());
    }

    #[test]
    #[should_panic]
    fn from_slice_rejects_short_input() {
        let _ = Matrix::<2, 2>::from_slice(&[1.0, 2.0, 3.0]);
    }

    #[test]
    fn row_col_and_flat_indexing_agree() {
        let mut m = sample_2x3();
        assert_eq!(m[(1, 2)], 6.0);
        assert_eq!(m[5], 6.0);
        m[(0, 1)] = 10.0;
        assert_eq!(m[1], 10.0);
        m[3] = -4.0;
        assert_eq!(m[(1, 0)], -4.0);
    }

    #[test]
    fn transpose_is_an_involution() {
        let m = sample_2x3();
        let t = m.transpose();
        assert_eq!(t[(2, 1)], 6.0);
        assert_eq!(t.transpose(), m);
    }

    #[test]
    fn product_is_associative() {
        let a = sample_2x3();
        let b = Matrix::<3, 4>::from_slice(&[
            0.5, -1.0, 2.0, 0.0, 1.5, 3.0, -2.0, 1.0, 0.25, 0.75, 1.0, -0.5,
        ]);
        let c = Matrix::<4, 2>::from_slice(&[1.0, 2.0, -1.0, 0.5, 3.0, 0.0, 0.25, -2.0]);
        assert_abs_diff_eq!((a * b) * c, a * (b * c), epsilon = 1e-4);
    }

    #[test]
    fn identity_is_neutral() {
        let a = Matrix::<3, 3>::from_slice(&[2.0, -1.0, 0.0, 4.0, 3.0, 1.0, 0.5, 0.0, 9.0]);
        assert_eq!(a * Matrix::<3, 3>::IDENTITY, a);
        assert_eq!(Matrix::<3, 3>::identity() * a, a);
    }

    #[test]
    fn scalar_and_elementwise_arithmetic() {
        let m = sample_2x3();
        assert_eq!((m * 2.0)[(1, 1)], 10.0);
        assert_eq!((2.0 * m)[(0, 0)], 2.0);
        assert_eq!((m / 2.0)[(0, 1)], 1.0);
        assert_eq!(m + m, m * 2.0);
        assert_eq!(m - m, Matrix::ZERO);
        assert_eq!((-m)[(1, 2)], -6.0);

        let mut acc = m;
        acc += m;
        acc -= m;
        acc *= 3.0;
        acc /= 3.0;
        assert_eq!(acc, m);
    }

    #[test]
    fn elementwise_min_max_abs() {
        let a = Matrix::<1, 3>::from_rows([[1.0, -5.0, 3.0]]);
        let b = Matrix::<1, 3>::from_rows([[2.0, -6.0, 0.0]]);
        assert_eq!(a.min(&b).as_slice(), &[1.0, -6.0, 0.0]);
        assert_eq!(a.max(&b).as_slice(), &[2.0, -5.0, 3.0]);
        assert_eq!(a.abs().as_slice(), &[1.0, 5.0, 3.0]);
    }

    #[test]
    fn inverse_round_trips_to_identity() {
        let m = Matrix::<4, 4>::from_slice(&[
            4.0, 7.0, 2.0, 0.0, 3.0, 6.0, 1.0, 2.0, 2.0, 5.0, 3.0, 1.0, 0.0, 1.0, 0.0, 1.0,
        ]);
        let inv = m.inverse().unwrap();
        assert_abs_diff_eq!(m * inv, Matrix::<4, 4>::IDENTITY, epsilon = 1e-4);
        assert_abs_diff_eq!(inv * m, Matrix::<4, 4>::IDENTITY, epsilon = 1e-4);

        let glam_inv: Matrix<4, 4> = glam::Mat4::from(m).inverse().into();
        assert_abs_diff_eq!(inv, glam_inv, epsilon = 1e-4);
    }

    #[test]
    fn singular_matrix_has_no_inverse() {
        let m = Matrix::<3, 3>::from_slice(&[1.0, 2.0, 3.0, 2.0, 4.0, 6.0, 0.0, 1.0, 1.0]);
        assert!(m.inverse().is_none());
        assert_eq!(m.determinant(), 0.0);
    }

    #[test]
    fn determinant_matches_glam() {
        let m = Matrix::<4, 4>::from_slice(&[
            1.0, 2.0, 0.0, 1.0, 0.0, 3.0, 1.0, 0.0, 2.0, 0.0, 1.0, 4.0, 1.0, 1.0, 1.0, 1.0,
        ]);
        let expected = glam::Mat4::from(m).determinant();
        assert!((m.determinant() - expected).abs() < 1e-4);
    }

    #[test]
    fn glam_conversion_preserves_layout() {
        let g = glam::Mat4::from_translation(glam::Vec3::new(1.0, 2.0, 3.0));
        let m = Matrix::<4, 4>::from(g);
        // row-major: translation sits in the last column
        assert_eq!(m[(0, 3)], 1.0);
        assert_eq!(m[(2, 3)], 3.0);
        assert_eq!(glam::Mat4::from(m), g);
    }
}
