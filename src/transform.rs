//! # Transform Module
//!
//! Homogeneous-coordinate transforms for the render loop: points and direction vectors in
//! four components, and the 4x4 matrices that move them around (translation, uniform scaling and
//! rotation about each principal axis), plus matrix composition.
//!
//! ## Layout Convention
//!
//! Every [`Matrix4`] in this crate is stored **column-major**, with the translation in the
//! **last column**. Vectors are column vectors and are multiplied on the right (`M * v`).
//!
//! ```text
//!  | m00 m01 m02 tx |        storage: [ [m00 m10 m20 0]    column 0
//!  | m10 m11 m12 ty |                   [m01 m11 m21 0]    column 1
//!  | m20 m21 m22 tz |                   [m02 m12 m22 0]    column 2
//!  |  0   0   0   1 |                   [tx  ty  tz  1] ]  column 3
//! ```
//!
//! This is the layout WGSL expects for `mat4x4<f32>`, so the bytes of a [`Matrix4`] can be written
//! into a uniform buffer unchanged.
//!
//! ## Rotations
//!
//! All three rotation constructors follow the right-hand rule: looking from the positive end of the
//! axis towards the origin, a positive angle turns counter-clockwise. Consequently
//! `rotation_y(90.0)` sends the point `(1, 0, 0)` to `(0, 0, -1)`. Angles are given in degrees and
//! converted with `angle / 180 * PI`.
//!
//! ## Composition
//!
//! [`multiply`] composes an ordered sequence `M1, M2, ..., Mn` into `M1 * M2 * ... * Mn`. The rightmost
//! matrix is the first to act on a vector, the leftmost the last.
//!
//! ```rust
//! use rotate_y_core::transform::{multiply, point, rotation_y, translation};
//!
//! // Rotate about Y first, then move 2 units along X.
//! let model = multiply([translation(2.0, 0.0, 0.0), rotation_y(90.0)]).unwrap();
//! let moved = model * point(1.0, 0.0, 0.0);
//! assert!((moved.x - 2.0).abs() < 1e-6);
//! assert!((moved.z + 1.0).abs() < 1e-6);
//! ```
//!
//! None of the functions here validate their inputs: non-finite angles or factors produce
//! non-finite matrices.

use std::f32::consts::PI;
use std::ops::Mul;

/// A point or direction in homogeneous coordinates.
///
/// `w == 1.0` marks a point, which is affected by translation. `w == 0.0` marks a direction,
/// which is not.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vector4 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Vector4 {
    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    /// Returns `true` if this is a point (`w == 1`).
    pub fn is_point(&self) -> bool {
        self.w == 1.0
    }

    /// Returns `true` if this is a direction (`w == 0`).
    pub fn is_direction(&self) -> bool {
        self.w == 0.0
    }

    pub const fn to_array(self) -> [f32; 4] {
        [self.x, self.y, self.z, self.w]
    }

    fn dot(&self, other: [f32; 4]) -> f32 {
        self.x * other[0] + self.y * other[1] + self.z * other[2] + self.w * other[3]
    }
}

/// A 4x4 transform matrix of `f32`, stored column-major with the translation in the last column.
///
/// See the [module documentation](self) for the layout. The type is `Pod`, so
/// `bytemuck::bytes_of(&matrix)` gives exactly the 64 bytes a WGSL `mat4x4<f32>` uniform expects.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Matrix4 {
    columns: [[f32; 4]; 4],
}

impl Matrix4 {
    /// The identity transform.
    pub const IDENTITY: Self = Self::from_columns([
        [1.0, 0.0, 0.0, 0.0],
        [0.0, 1.0, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ]);

    /// Builds a matrix from its four columns.
    pub const fn from_columns(columns: [[f32; 4]; 4]) -> Self {
        Self { columns }
    }

    /// Builds a matrix from its four rows, i.e. written out the way it reads on paper.
    pub fn from_rows(rows: [[f32; 4]; 4]) -> Self {
        let mut columns = [[0.0; 4]; 4];
        for (row, values) in rows.iter().enumerate() {
            for (col, value) in values.iter().enumerate() {
                columns[col][row] = *value;
            }
        }
        Self { columns }
    }

    /// The element at `row`, `col` (both zero-based).
    ///
    /// # Panics
    ///
    /// Panics if either index is greater than 3.
    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.columns[col][row]
    }

    pub fn row(&self, row: usize) -> [f32; 4] {
        [
            self.columns[0][row],
            self.columns[1][row],
            self.columns[2][row],
            self.columns[3][row],
        ]
    }

    pub fn column(&self, col: usize) -> [f32; 4] {
        self.columns[col]
    }

    /// The 16 elements in storage (column-major) order.
    pub fn to_cols_array(&self) -> [f32; 16] {
        let mut out = [0.0; 16];
        for (col, values) in self.columns.iter().enumerate() {
            out[col * 4..col * 4 + 4].copy_from_slice(values);
        }
        out
    }

    pub fn transpose(&self) -> Self {
        Self::from_rows(self.columns)
    }

    /// Determinant, by cofactor expansion along the first row.
    pub fn determinant(&self) -> f32 {
        let m = |r: usize, c: usize| self.get(r, c);
        let minor = |skip: usize| {
            let cols: Vec<usize> = (0..4).filter(|&c| c != skip).collect();
            let (a, b, c) = (cols[0], cols[1], cols[2]);
            m(1, a) * (m(2, b) * m(3, c) - m(2, c) * m(3, b))
                - m(1, b) * (m(2, a) * m(3, c) - m(2, c) * m(3, a))
                + m(1, c) * (m(2, a) * m(3, b) - m(2, b) * m(3, a))
        };
        (0..4)
            .map(|col| {
                let sign = if col % 2 == 0 { 1.0 } else { -1.0 };
                sign * m(0, col) * minor(col)
            })
            .sum()
    }

    /// Element-wise comparison with an absolute tolerance.
    pub fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        self.to_cols_array()
            .iter()
            .zip(other.to_cols_array().iter())
            .all(|(a, b)| (a - b).abs() <= epsilon)
    }
}

impl Default for Matrix4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Row-by-column product. Every element of the result is the dot product of a row of `self`
/// with a column of `rhs`.
impl Mul for Matrix4 {
    type Output = Matrix4;

    fn mul(self, rhs: Matrix4) -> Matrix4 {
        let mut columns = [[0.0; 4]; 4];
        for (col, out) in columns.iter_mut().enumerate() {
            let right = rhs.column(col);
            for (row, value) in out.iter_mut().enumerate() {
                let left = self.row(row);
                *value = left[0] * right[0]
                    + left[1] * right[1]
                    + left[2] * right[2]
                    + left[3] * right[3];
            }
        }
        Matrix4::from_columns(columns)
    }
}

impl Mul<Vector4> for Matrix4 {
    type Output = Vector4;

    fn mul(self, rhs: Vector4) -> Vector4 {
        multiply_vector(&self, rhs)
    }
}

/// A point at `(x, y, z)`: `w = 1`.
pub const fn point(x: f32, y: f32, z: f32) -> Vector4 {
    Vector4::new(x, y, z, 1.0)
}

/// A direction `(x, y, z)`: `w = 0`.
pub const fn vector(x: f32, y: f32, z: f32) -> Vector4 {
    Vector4::new(x, y, z, 0.0)
}

/// Translation by `(dx, dy, dz)`; the offsets occupy the last column.
pub fn translation(dx: f32, dy: f32, dz: f32) -> Matrix4 {
    Matrix4::from_rows([
        [1.0, 0.0, 0.0, dx],
        [0.0, 1.0, 0.0, dy],
        [0.0, 0.0, 1.0, dz],
        [0.0, 0.0, 0.0, 1.0],
    ])
}

/// Uniform scaling of x, y and z by `factor`. The homogeneous row and column stay untouched.
pub fn scaling(factor: f32) -> Matrix4 {
    Matrix4::from_rows([
        [factor, 0.0, 0.0, 0.0],
        [0.0, factor, 0.0, 0.0],
        [0.0, 0.0, factor, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ])
}

fn sin_cos_degrees(angle_degrees: f32) -> (f32, f32) {
    let radians = angle_degrees / 180.0 * PI;
    radians.sin_cos()
}

/// Rotation about the X axis by `angle_degrees` (right-handed: +Y turns towards +Z).
pub fn rotation_x(angle_degrees: f32) -> Matrix4 {
    let (sin, cos) = sin_cos_degrees(angle_degrees);
    Matrix4::from_rows([
        [1.0, 0.0, 0.0, 0.0],
        [0.0, cos, -sin, 0.0],
        [0.0, sin, cos, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ])
}

/// Rotation about the Y axis by `angle_degrees` (right-handed: +Z turns towards +X).
pub fn rotation_y(angle_degrees: f32) -> Matrix4 {
    let (sin, cos) = sin_cos_degrees(angle_degrees);
    Matrix4::from_rows([
        [cos, 0.0, sin, 0.0],
        [0.0, 1.0, 0.0, 0.0],
        [-sin, 0.0, cos, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ])
}

/// Rotation about the Z axis by `angle_degrees` (right-handed: +X turns towards +Y).
pub fn rotation_z(angle_degrees: f32) -> Matrix4 {
    let (sin, cos) = sin_cos_degrees(angle_degrees);
    Matrix4::from_rows([
        [cos, -sin, 0.0, 0.0],
        [sin, cos, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ])
}

/// Composes `M1, M2, ..., Mn` into `M1 * M2 * ... * Mn`.
///
/// # Returns
///
/// - `None` for an empty sequence, which has no meaningful product here.
/// - The matrix itself, unchanged, for a single matrix.
/// - The left-to-right product otherwise.
pub fn multiply<I>(matrices: I) -> Option<Matrix4>
where
    I: IntoIterator<Item = Matrix4>,
{
    matrices.into_iter().reduce(|acc, next| acc * next)
}

/// Matrix-vector product: each output component is the dot product of a matrix row with `vector`.
pub fn multiply_vector(matrix: &Matrix4, vector: Vector4) -> Vector4 {
    Vector4::new(
        vector.dot(matrix.row(0)),
        vector.dot(matrix.row(1)),
        vector.dot(matrix.row(2)),
        vector.dot(matrix.row(3)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra_glm as glm;
    use proptest::prelude::*;

    const EPSILON: f32 = 1e-5;

    fn to_glm(m: &Matrix4) -> glm::Mat4 {
        glm::Mat4::from_column_slice(&m.to_cols_array())
    }

    fn assert_matches_glm(ours: &Matrix4, reference: &glm::Mat4) {
        for (a, b) in ours.to_cols_array().iter().zip(reference.as_slice()) {
            assert!((a - b).abs() < EPSILON, "{ours:?} != {reference:?}");
        }
    }

    fn sample() -> Matrix4 {
        Matrix4::from_rows([
            [1.0, 2.0, 3.0, 4.0],
            [5.0, 6.0, 7.0, 8.0],
            [9.0, 10.0, 11.0, 12.0],
            [13.0, 14.0, 15.0, 16.0],
        ])
    }

    fn assert_orthonormal(m: &Matrix4) {
        let cols: Vec<[f32; 4]> = (0..3).map(|c| m.column(c)).collect();
        for (i, a) in cols.iter().enumerate() {
            let len = (a[0] * a[0] + a[1] * a[1] + a[2] * a[2]).sqrt();
            assert!((len - 1.0).abs() < EPSILON, "column {i} has length {len}");
            for b in cols.iter().skip(i + 1) {
                let dot = a[0] * b[0] + a[1] * b[1] + a[2] * b[2];
                assert!(dot.abs() < EPSILON, "columns not orthogonal: {dot}");
            }
        }
        assert_eq!(m.row(3), [0.0, 0.0, 0.0, 1.0]);
        assert_eq!(m.column(3), [0.0, 0.0, 0.0, 1.0]);
        assert!((m.determinant().abs() - 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_point_and_vector() {
        let p = point(1.0, 2.0, 3.0);
        assert_eq!(p.to_array(), [1.0, 2.0, 3.0, 1.0]);
        assert!(p.is_point());

        let v = vector(1.0, 2.0, 3.0);
        assert_eq!(v.to_array(), [1.0, 2.0, 3.0, 0.0]);
        assert!(v.is_direction());
    }

    #[test]
    fn test_translation_moves_points_not_vectors() {
        let t = translation(1.0, -2.0, 3.0);
        assert_eq!(t.column(3), [1.0, -2.0, 3.0, 1.0]);

        let moved = t * point(1.0, 1.0, 1.0);
        assert_eq!(moved, point(2.0, -1.0, 4.0));

        let direction = t * vector(1.0, 1.0, 1.0);
        assert_eq!(direction, vector(1.0, 1.0, 1.0));
    }

    #[test]
    fn test_scaling() {
        let s = scaling(2.5);
        assert_eq!(s * point(1.0, 2.0, -4.0), point(2.5, 5.0, -10.0));
        assert_eq!(s.get(3, 3), 1.0);
        assert_matches_glm(&s, &glm::scaling(&glm::vec3(2.5, 2.5, 2.5)));
    }

    #[test]
    fn test_rotation_y_zero_is_identity() {
        assert!(rotation_y(0.0).approx_eq(&Matrix4::IDENTITY, EPSILON));
    }

    #[test]
    fn test_rotation_y_quarter_turn() {
        let p = multiply_vector(&rotation_y(90.0), point(1.0, 0.0, 0.0));
        assert!(p.x.abs() < EPSILON);
        assert!(p.y.abs() < EPSILON);
        assert!((p.z + 1.0).abs() < EPSILON);
        assert_eq!(p.w, 1.0);
    }

    #[test]
    fn test_rotation_y_traces_circle() {
        for step in 0..=36 {
            let angle = step as f32 * 10.0;
            let p = rotation_y(angle) * point(1.0, 0.0, 0.0);
            let radius = (p.x * p.x + p.z * p.z).sqrt();
            assert!((radius - 1.0).abs() < EPSILON, "radius {radius} at {angle}");
            assert!(p.y.abs() < EPSILON);
        }
    }

    #[test]
    fn test_axis_rotations_follow_right_hand_rule() {
        let y_to_z = rotation_x(90.0) * vector(0.0, 1.0, 0.0);
        assert!((y_to_z.z - 1.0).abs() < EPSILON && y_to_z.y.abs() < EPSILON);

        let z_to_x = rotation_y(90.0) * vector(0.0, 0.0, 1.0);
        assert!((z_to_x.x - 1.0).abs() < EPSILON && z_to_x.z.abs() < EPSILON);

        let x_to_y = rotation_z(90.0) * vector(1.0, 0.0, 0.0);
        assert!((x_to_y.y - 1.0).abs() < EPSILON && x_to_y.x.abs() < EPSILON);
    }

    #[test]
    fn test_rotations_match_glm() {
        for angle in [-270.0_f32, -45.0, 0.0, 30.0, 90.0, 135.0, 359.0] {
            let radians = angle.to_radians();
            assert_matches_glm(&rotation_x(angle), &glm::rotation(radians, &glm::Vec3::x()));
            assert_matches_glm(&rotation_y(angle), &glm::rotation(radians, &glm::Vec3::y()));
            assert_matches_glm(&rotation_z(angle), &glm::rotation(radians, &glm::Vec3::z()));
        }
    }

    #[test]
    fn test_translation_matches_glm() {
        let ours = translation(0.5, -1.5, 7.0);
        assert_matches_glm(&ours, &glm::translation(&glm::vec3(0.5, -1.5, 7.0)));
    }

    #[test]
    fn test_multiply_single_is_unchanged() {
        let a = sample();
        assert_eq!(multiply([a]), Some(a));
    }

    #[test]
    fn test_multiply_empty_is_none() {
        assert_eq!(multiply(Vec::<Matrix4>::new()), None);
    }

    #[test]
    fn test_multiply_identity_laws() {
        let a = sample();
        assert_eq!(multiply([Matrix4::IDENTITY, a]), Some(a));
        assert_eq!(multiply([a, Matrix4::IDENTITY]), Some(a));
    }

    #[test]
    fn test_multiply_uses_right_operand_columns() {
        let a = sample();
        let b = sample().transpose();
        let product = a * b;
        for row in 0..4 {
            for col in 0..4 {
                let expected: f32 = (0..4).map(|k| a.get(row, k) * b.get(k, col)).sum();
                assert_eq!(product.get(row, col), expected);
            }
        }
        assert_matches_glm(&product, &(to_glm(&a) * to_glm(&b)));
    }

    #[test]
    fn test_multiply_chain_order() {
        let chain = [translation(1.0, 2.0, 3.0), rotation_z(30.0), scaling(2.0)];
        let ours = multiply(chain).unwrap();
        let reference = chain
            .iter()
            .map(to_glm)
            .fold(glm::Mat4::identity(), |acc, m| acc * m);
        assert_matches_glm(&ours, &reference);

        // Rightmost first: scale, then rotate, then translate.
        let p = ours * point(1.0, 0.0, 0.0);
        let (sin, cos) = 30_f32.to_radians().sin_cos();
        assert!((p.x - (1.0 + 2.0 * cos)).abs() < EPSILON);
        assert!((p.y - (2.0 + 2.0 * sin)).abs() < EPSILON);
        assert!((p.z - 3.0).abs() < EPSILON);
    }

    #[test]
    fn test_from_rows_and_storage_order() {
        let m = sample();
        assert_eq!(m.get(0, 3), 4.0);
        assert_eq!(m.column(3), [4.0, 8.0, 12.0, 16.0]);
        assert_eq!(&m.to_cols_array()[..4], &[1.0, 5.0, 9.0, 13.0]);
        assert_eq!(bytemuck::bytes_of(&m).len(), 64);
        assert_eq!(m.transpose().transpose(), m);
    }

    #[test]
    fn test_determinant() {
        assert_eq!(Matrix4::IDENTITY.determinant(), 1.0);
        assert_eq!(scaling(2.0).determinant(), 8.0);
        assert_eq!(sample().determinant(), 0.0);
    }

    proptest! {
        #[test]
        fn prop_rotation_y_is_orthonormal(angle in -720.0_f32..720.0) {
            assert_orthonormal(&rotation_y(angle));
        }

        #[test]
        fn prop_all_axis_rotations_are_orthonormal(angle in -360.0_f32..360.0) {
            assert_orthonormal(&rotation_x(angle));
            assert_orthonormal(&rotation_z(angle));
        }

        #[test]
        fn prop_rotation_y_preserves_height_and_radius(angle in -360.0_f32..360.0, x in -10.0_f32..10.0, y in -10.0_f32..10.0) {
            let p = rotation_y(angle) * point(x, y, 0.0);
            prop_assert!((p.y - y).abs() < 1e-4);
            prop_assert!(((p.x * p.x + p.z * p.z).sqrt() - x.abs()).abs() < 1e-4);
        }
    }
}
