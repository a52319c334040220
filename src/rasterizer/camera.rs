//! Perspective camera feeding the vertex transform

use super::math::{Matrix, Vec3};

/// Fixed camera looking down +Z
pub struct Camera {
    origin: Vec3,
    inv_view: Matrix,
    projection: Matrix,
}

impl Camera {
    pub fn new(aspect_ratio: f32, origin: Vec3, fov_degrees: f32, near: f32, far: f32) -> Self {
        let forward = Vec3::UNIT_Z;
        let right = Vec3::UNIT_Y.cross(forward).normalize();
        let up = forward.cross(right).normalize();

        let camera_to_world = Matrix::look_at_lh(origin, forward, up, right);
        let fov = (fov_degrees.to_radians() / 2.0).tan();

        Self {
            origin,
            // An orthonormal basis plus translation is always invertible
            inv_view: camera_to_world.inverse().unwrap_or(Matrix::IDENTITY),
            projection: Matrix::perspective_fov_lh(fov, aspect_ratio, near, far),
        }
    }

    /// World-to-camera transform
    pub fn inv_view_matrix(&self) -> Matrix {
        self.inv_view
    }

    pub fn projection_matrix(&self) -> Matrix {
        self.projection
    }

    pub fn origin(&self) -> Vec3 {
        self.origin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_moves_origin_to_zero() {
        let cam = Camera::new(1.0, Vec3::new(3.0, -2.0, 5.0), 90.0, 0.1, 100.0);
        let p = cam.inv_view_matrix().transform_point(Vec3::new(3.0, -2.0, 5.0));
        assert!(p.x.abs() < 1e-5 && p.y.abs() < 1e-5 && p.z.abs() < 1e-5);
    }

    #[test]
    fn test_point_ahead_projects_to_center() {
        let cam = Camera::new(4.0 / 3.0, Vec3::ZERO, 45.0, 0.1, 100.0);
        let wvp = cam.inv_view_matrix() * cam.projection_matrix();
        let clip = wvp.transform_point(Vec3::new(0.0, 0.0, 50.0));
        assert!((clip.w - 50.0).abs() < 1e-4);
        let z = clip.z / clip.w;
        assert!(z > 0.985 && z < 1.0);
        assert!((clip.x / clip.w).abs() < 1e-6);
    }

    #[test]
    fn test_fov_edge_maps_to_ndc_edge() {
        let cam = Camera::new(1.0, Vec3::ZERO, 90.0, 0.1, 100.0);
        let wvp = cam.inv_view_matrix() * cam.projection_matrix();
        // 45 degrees off axis at 90 degree fov lands on the right edge
        let clip = wvp.transform_point(Vec3::new(10.0, 0.0, 10.0));
        assert!((clip.x / clip.w - 1.0).abs() < 1e-4);
    }
}
