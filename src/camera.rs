//! View and projection matrices for the fixed ring camera.

use glam::{Mat4, Vec3};

use crate::params::FixedCamera;

/// Projection and view matrices for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewMatrices {
    pub projection: Mat4,
    pub view: Mat4,
}

impl ViewMatrices {
    /// Compute matrices for the current drawable aspect ratio (width / height)
    pub fn new(camera: &FixedCamera, aspect: f32) -> Self {
        let view = Mat4::look_at_rh(
            Vec3::from_array(camera.eye),
            Vec3::from_array(camera.target),
            Vec3::from_array(camera.up),
        );
        let projection = Mat4::perspective_rh(
            camera.fov_degrees.to_radians(),
            aspect,
            camera.near_plane,
            camera.far_plane,
        );

        Self { projection, view }
    }

    /// Combined projection * view matrix, uploaded as the `projection` uniform
    pub fn combined(&self) -> Mat4 {
        self.projection * self.view
    }
}
