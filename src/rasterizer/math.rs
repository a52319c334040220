//! Vector and matrix math for the software pipeline
//!
//! Matrices are row-major and multiply row vectors (`v * M`), so a full
//! transform composes left to right: `world * view * projection`.

use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub};
use serde::{Serialize, Deserialize};

/// 3D Vector
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 { x: 0.0, y: 0.0, z: 0.0 };
    pub const ONE: Vec3 = Vec3 { x: 1.0, y: 1.0, z: 1.0 };
    pub const UNIT_X: Vec3 = Vec3 { x: 1.0, y: 0.0, z: 0.0 };
    pub const UNIT_Y: Vec3 = Vec3 { x: 0.0, y: 1.0, z: 0.0 };
    pub const UNIT_Z: Vec3 = Vec3 { x: 0.0, y: 0.0, z: 1.0 };

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn dot(self, other: Vec3) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    pub fn len(self) -> f32 {
        self.dot(self).sqrt()
    }

    pub fn normalize(self) -> Vec3 {
        let l = self.len();
        if l == 0.0 {
            return Vec3::ZERO;
        }
        Vec3 {
            x: self.x / l,
            y: self.y / l,
            z: self.z / l,
        }
    }

    pub fn scale(self, s: f32) -> Vec3 {
        Vec3 {
            x: self.x * s,
            y: self.y * s,
            z: self.z * s,
        }
    }

    /// Reflect `self` about the plane with normal `n`
    pub fn reflect(self, n: Vec3) -> Vec3 {
        self - n * (2.0 * n.dot(self))
    }

    /// Remove the component of `self` along `onto`
    pub fn reject(self, onto: Vec3) -> Vec3 {
        let denom = onto.dot(onto);
        if denom == 0.0 {
            return self;
        }
        self - onto * (self.dot(onto) / denom)
    }
}

impl Add for Vec3 {
    type Output = Vec3;
    fn add(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }
}

impl AddAssign for Vec3 {
    fn add_assign(&mut self, other: Vec3) {
        *self = *self + other;
    }
}

impl Sub for Vec3 {
    type Output = Vec3;
    fn sub(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }
}

impl Neg for Vec3 {
    type Output = Vec3;
    fn neg(self) -> Vec3 {
        Vec3::new(-self.x, -self.y, -self.z)
    }
}

impl Mul<f32> for Vec3 {
    type Output = Vec3;
    fn mul(self, s: f32) -> Vec3 {
        self.scale(s)
    }
}

impl Div<f32> for Vec3 {
    type Output = Vec3;
    fn div(self, s: f32) -> Vec3 {
        Vec3::new(self.x / s, self.y / s, self.z / s)
    }
}

/// 2D Vector (texture coordinates, raster positions)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    fn add(self, other: Vec2) -> Vec2 {
        Vec2::new(self.x + other.x, self.y + other.y)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, other: Vec2) -> Vec2 {
        Vec2::new(self.x - other.x, self.y - other.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;
    fn mul(self, s: f32) -> Vec2 {
        Vec2::new(self.x * s, self.y * s)
    }
}

impl Div<f32> for Vec2 {
    type Output = Vec2;
    fn div(self, s: f32) -> Vec2 {
        Vec2::new(self.x / s, self.y / s)
    }
}

/// 2D cross product (signed parallelogram area spanned by `a` and `b`)
pub fn cross2(a: Vec2, b: Vec2) -> f32 {
    a.x * b.y - a.y * b.x
}

/// Homogeneous 4D vector (clip-space positions)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec4 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Vec4 {
    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    pub fn xyz(self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }
}

/// 4x4 matrix, row-major, row-vector convention
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix {
    pub rows: [[f32; 4]; 4],
}

impl Default for Matrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Matrix {
    pub const IDENTITY: Matrix = Matrix {
        rows: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    pub const fn from_rows(rows: [[f32; 4]; 4]) -> Self {
        Self { rows }
    }

    pub fn translation(t: Vec3) -> Self {
        let mut m = Self::IDENTITY;
        m.rows[3] = [t.x, t.y, t.z, 1.0];
        m
    }

    pub fn scale(s: Vec3) -> Self {
        let mut m = Self::IDENTITY;
        m.rows[0][0] = s.x;
        m.rows[1][1] = s.y;
        m.rows[2][2] = s.z;
        m
    }

    /// Rotation about the Y axis (yaw), radians
    pub fn rotation_y(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        Self::from_rows([
            [c, 0.0, -s, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [s, 0.0, c, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Camera-to-world basis for a left-handed camera at `origin`
    pub fn look_at_lh(origin: Vec3, forward: Vec3, up: Vec3, right: Vec3) -> Self {
        Self::from_rows([
            [right.x, right.y, right.z, 0.0],
            [up.x, up.y, up.z, 0.0],
            [forward.x, forward.y, forward.z, 0.0],
            [origin.x, origin.y, origin.z, 1.0],
        ])
    }

    /// Left-handed perspective projection mapping view depth to NDC z in [0,1].
    /// `fov` is `tan(fov_angle / 2)`.
    pub fn perspective_fov_lh(fov: f32, aspect: f32, near: f32, far: f32) -> Self {
        let depth = far - near;
        Self::from_rows([
            [1.0 / (aspect * fov), 0.0, 0.0, 0.0],
            [0.0, 1.0 / fov, 0.0, 0.0],
            [0.0, 0.0, far / depth, 1.0],
            [0.0, 0.0, -(far * near) / depth, 0.0],
        ])
    }

    /// Transform a point (implicit w = 1), keeping the resulting w
    pub fn transform_point(&self, p: Vec3) -> Vec4 {
        let r = &self.rows;
        Vec4 {
            x: p.x * r[0][0] + p.y * r[1][0] + p.z * r[2][0] + r[3][0],
            y: p.x * r[0][1] + p.y * r[1][1] + p.z * r[2][1] + r[3][1],
            z: p.x * r[0][2] + p.y * r[1][2] + p.z * r[2][2] + r[3][2],
            w: p.x * r[0][3] + p.y * r[1][3] + p.z * r[2][3] + r[3][3],
        }
    }

    /// Transform a direction (implicit w = 0, no translation)
    pub fn transform_vector(&self, v: Vec3) -> Vec3 {
        let r = &self.rows;
        Vec3 {
            x: v.x * r[0][0] + v.y * r[1][0] + v.z * r[2][0],
            y: v.x * r[0][1] + v.y * r[1][1] + v.z * r[2][1],
            z: v.x * r[0][2] + v.y * r[1][2] + v.z * r[2][2],
        }
    }

    /// General 4x4 inverse via cofactor expansion. `None` if singular.
    pub fn inverse(&self) -> Option<Matrix> {
        let m: [f32; 16] = [
            self.rows[0][0], self.rows[0][1], self.rows[0][2], self.rows[0][3],
            self.rows[1][0], self.rows[1][1], self.rows[1][2], self.rows[1][3],
            self.rows[2][0], self.rows[2][1], self.rows[2][2], self.rows[2][3],
            self.rows[3][0], self.rows[3][1], self.rows[3][2], self.rows[3][3],
        ];
        let mut inv = [0.0f32; 16];

        inv[0] = m[5] * m[10] * m[15] - m[5] * m[11] * m[14] - m[9] * m[6] * m[15]
            + m[9] * m[7] * m[14] + m[13] * m[6] * m[11] - m[13] * m[7] * m[10];
        inv[4] = -m[4] * m[10] * m[15] + m[4] * m[11] * m[14] + m[8] * m[6] * m[15]
            - m[8] * m[7] * m[14] - m[12] * m[6] * m[11] + m[12] * m[7] * m[10];
        inv[8] = m[4] * m[9] * m[15] - m[4] * m[11] * m[13] - m[8] * m[5] * m[15]
            + m[8] * m[7] * m[13] + m[12] * m[5] * m[11] - m[12] * m[7] * m[9];
        inv[12] = -m[4] * m[9] * m[14] + m[4] * m[10] * m[13] + m[8] * m[5] * m[14]
            - m[8] * m[6] * m[13] - m[12] * m[5] * m[10] + m[12] * m[6] * m[9];
        inv[1] = -m[1] * m[10] * m[15] + m[1] * m[11] * m[14] + m[9] * m[2] * m[15]
            - m[9] * m[3] * m[14] - m[13] * m[2] * m[11] + m[13] * m[3] * m[10];
        inv[5] = m[0] * m[10] * m[15] - m[0] * m[11] * m[14] - m[8] * m[2] * m[15]
            + m[8] * m[3] * m[14] + m[12] * m[2] * m[11] - m[12] * m[3] * m[10];
        inv[9] = -m[0] * m[9] * m[15] + m[0] * m[11] * m[13] + m[8] * m[1] * m[15]
            - m[8] * m[3] * m[13] - m[12] * m[1] * m[11] + m[12] * m[3] * m[9];
        inv[13] = m[0] * m[9] * m[14] - m[0] * m[10] * m[13] - m[8] * m[1] * m[14]
            + m[8] * m[2] * m[13] + m[12] * m[1] * m[10] - m[12] * m[2] * m[9];
        inv[2] = m[1] * m[6] * m[15] - m[1] * m[7] * m[14] - m[5] * m[2] * m[15]
            + m[5] * m[3] * m[14] + m[13] * m[2] * m[7] - m[13] * m[3] * m[6];
        inv[6] = -m[0] * m[6] * m[15] + m[0] * m[7] * m[14] + m[4] * m[2] * m[15]
            - m[4] * m[3] * m[14] - m[12] * m[2] * m[7] + m[12] * m[3] * m[6];
        inv[10] = m[0] * m[5] * m[15] - m[0] * m[7] * m[13] - m[4] * m[1] * m[15]
            + m[4] * m[3] * m[13] + m[12] * m[1] * m[7] - m[12] * m[3] * m[5];
        inv[14] = -m[0] * m[5] * m[14] + m[0] * m[6] * m[13] + m[4] * m[1] * m[14]
            - m[4] * m[2] * m[13] - m[12] * m[1] * m[6] + m[12] * m[2] * m[5];
        inv[3] = -m[1] * m[6] * m[11] + m[1] * m[7] * m[10] + m[5] * m[2] * m[11]
            - m[5] * m[3] * m[10] - m[9] * m[2] * m[7] + m[9] * m[3] * m[6];
        inv[7] = m[0] * m[6] * m[11] - m[0] * m[7] * m[10] - m[4] * m[2] * m[11]
            + m[4] * m[3] * m[10] + m[8] * m[2] * m[7] - m[8] * m[3] * m[6];
        inv[11] = -m[0] * m[5] * m[11] + m[0] * m[7] * m[9] + m[4] * m[1] * m[11]
            - m[4] * m[3] * m[9] - m[8] * m[1] * m[7] + m[8] * m[3] * m[5];
        inv[15] = m[0] * m[5] * m[10] - m[0] * m[6] * m[9] - m[4] * m[1] * m[10]
            + m[4] * m[2] * m[9] + m[8] * m[1] * m[6] - m[8] * m[2] * m[5];

        let det = m[0] * inv[0] + m[1] * inv[4] + m[2] * inv[8] + m[3] * inv[12];
        if det.abs() < f32::EPSILON {
            return None;
        }
        let inv_det = 1.0 / det;

        let mut rows = [[0.0f32; 4]; 4];
        for (i, row) in rows.iter_mut().enumerate() {
            for (j, cell) in row.iter_mut().enumerate() {
                *cell = inv[i * 4 + j] * inv_det;
            }
        }
        Some(Matrix { rows })
    }
}

impl Mul for Matrix {
    type Output = Matrix;
    fn mul(self, other: Matrix) -> Matrix {
        let mut rows = [[0.0f32; 4]; 4];
        for (i, row) in rows.iter_mut().enumerate() {
            for (j, cell) in row.iter_mut().enumerate() {
                *cell = (0..4).map(|k| self.rows[i][k] * other.rows[k][j]).sum();
            }
        }
        Matrix { rows }
    }
}

/// Where `value` sits between `a` and `b`, unclamped
pub fn inverse_lerp(a: f32, b: f32, value: f32) -> f32 {
    (value - a) / (b - a)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 0.0001
    }

    #[test]
    fn test_vec3_dot() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(4.0, 5.0, 6.0);
        assert!((a.dot(b) - 32.0).abs() < 0.001);
    }

    #[test]
    fn test_vec3_cross() {
        let a = Vec3::new(1.0, 0.0, 0.0);
        let b = Vec3::new(0.0, 1.0, 0.0);
        let c = a.cross(b);
        assert!((c.z - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_reflect_about_up() {
        let r = Vec3::new(1.0, -1.0, 0.0).reflect(Vec3::UNIT_Y);
        assert!(approx(r.x, 1.0) && approx(r.y, 1.0) && approx(r.z, 0.0));
    }

    #[test]
    fn test_reject_removes_parallel_part() {
        let t = Vec3::new(1.0, 1.0, 0.0).reject(Vec3::UNIT_Y);
        assert!(approx(t.x, 1.0) && approx(t.y, 0.0));
    }

    #[test]
    fn test_cross2_sign() {
        assert!(cross2(Vec2::new(1.0, 0.0), Vec2::new(0.0, 1.0)) > 0.0);
        assert!(cross2(Vec2::new(0.0, 1.0), Vec2::new(1.0, 0.0)) < 0.0);
    }

    #[test]
    fn test_translation_moves_points_not_vectors() {
        let m = Matrix::translation(Vec3::new(0.0, 0.0, 50.0));
        let p = m.transform_point(Vec3::new(1.0, 2.0, 3.0));
        assert!(approx(p.z, 53.0) && approx(p.w, 1.0));
        let v = m.transform_vector(Vec3::new(1.0, 2.0, 3.0));
        assert!(approx(v.z, 3.0));
    }

    #[test]
    fn test_rotation_y_quarter_turn() {
        let m = Matrix::rotation_y(std::f32::consts::FRAC_PI_2);
        let v = m.transform_vector(Vec3::UNIT_Z);
        assert!(approx(v.x, 1.0) && approx(v.z, 0.0));
    }

    #[test]
    fn test_inverse_of_transform_chain() {
        let m = Matrix::scale(Vec3::new(2.0, 2.0, 2.0))
            * Matrix::rotation_y(0.7)
            * Matrix::translation(Vec3::new(3.0, -1.0, 5.0));
        let inv = m.inverse().expect("invertible");
        let id = m * inv;
        for i in 0..4 {
            for j in 0..4 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert!(approx(id.rows[i][j], expected));
            }
        }
    }

    #[test]
    fn test_singular_matrix_has_no_inverse() {
        let m = Matrix::scale(Vec3::new(1.0, 0.0, 1.0));
        assert!(m.inverse().is_none());
    }

    #[test]
    fn test_perspective_maps_near_far_to_unit_depth() {
        let proj = Matrix::perspective_fov_lh(1.0, 1.0, 0.1, 100.0);
        let near = proj.transform_point(Vec3::new(0.0, 0.0, 0.1));
        let far = proj.transform_point(Vec3::new(0.0, 0.0, 100.0));
        assert!(approx(near.z / near.w, 0.0));
        assert!(approx(far.z / far.w, 1.0));
    }

    #[test]
    fn test_inverse_lerp_extrapolates() {
        assert!(approx(inverse_lerp(0.985, 1.0, 0.9925), 0.5));
        assert!(inverse_lerp(0.985, 1.0, 0.9) < 0.0);
    }
}
