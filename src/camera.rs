//! Perspective camera looking at the backdrop.

use glam::{Mat4, Vec3};

/// Perspective camera with a fixed position and target.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// Vertical field of view in degrees.
    pub fov_y: f32,
    /// Near clipping plane.
    pub near: f32,
    /// Far clipping plane.
    pub far: f32,
    /// Viewport width over height.
    pub aspect: f32,
    /// World position of the eye.
    pub position: Vec3,
    /// Point the camera looks at.
    pub target: Vec3,
}

impl Camera {
    /// Field of view of the landing camera, in degrees.
    pub const FOV_Y: f32 = 75.0;
    pub const NEAR: f32 = 0.1;
    pub const FAR: f32 = 1000.0;
    /// Distance of the eye from the origin along +Z.
    pub const DEPTH: f32 = 50.0;

    /// Create the landing camera for a viewport aspect ratio.
    pub fn new(aspect: f32) -> Self {
        Self {
            fov_y: Self::FOV_Y,
            near: Self::NEAR,
            far: Self::FAR,
            aspect,
            position: Vec3::new(0.0, 0.0, Self::DEPTH),
            target: Vec3::ZERO,
        }
    }

    /// Calculate the view matrix for rendering.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    /// Calculate the projection matrix (wgpu clip space, depth 0..1).
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y.to_radians(), self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Normalized viewing direction.
    pub fn forward(&self) -> Vec3 {
        (self.target - self.position).normalize_or_zero()
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(16.0 / 9.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_landing_camera_parameters() {
        let camera = Camera::new(2.0);
        assert_eq!(camera.fov_y, 75.0);
        assert_eq!(camera.near, 0.1);
        assert_eq!(camera.far, 1000.0);
        assert_eq!(camera.position, Vec3::new(0.0, 0.0, 50.0));
        assert_eq!(camera.forward(), Vec3::NEG_Z);
    }

    #[test]
    fn test_origin_projects_to_center() {
        let camera = Camera::new(16.0 / 9.0);
        let clip = camera.view_projection() * glam::Vec4::new(0.0, 0.0, 0.0, 1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1e-6);
        assert!(ndc.y.abs() < 1e-6);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }

    #[test]
    fn test_points_beyond_far_plane_are_clipped() {
        let camera = Camera::new(1.0);
        let clip = camera.view_projection() * glam::Vec4::new(0.0, 0.0, -2000.0, 1.0);
        assert!(clip.z / clip.w > 1.0);
    }
}
