//! Fixed camera placement for viewing the ring.
//!
//! The ring lies in the XY plane around the origin; the camera sits on the +Z axis
//! slightly above the ring centre and looks straight at it.

/// Vertical field of view (degrees)
pub const FOV_DEGREES: f32 = 60.0;

/// Near clipping plane (ring units)
pub const NEAR_PLANE: f32 = 0.0001;

/// Far clipping plane (ring units)
pub const FAR_PLANE: f32 = 500.0;

/// Camera eye position
pub const EYE: [f32; 3] = [0.0, 1.0, 10.0];

/// Look-at target
pub const TARGET: [f32; 3] = [0.0, 1.0, 0.0];

/// Up vector (camera never rolls)
pub const UP: [f32; 3] = [0.0, 1.0, 0.0];

/// Camera lens and placement
#[derive(Debug, Clone)]
pub struct FixedCamera {
    pub fov_degrees: f32,
    pub near_plane: f32,
    pub far_plane: f32,
    pub eye: [f32; 3],
    pub target: [f32; 3],
    pub up: [f32; 3],
}

impl Default for FixedCamera {
    fn default() -> Self {
        Self {
            fov_degrees: FOV_DEGREES,
            near_plane: NEAR_PLANE,
            far_plane: FAR_PLANE,
            eye: EYE,
            target: TARGET,
            up: UP,
        }
    }
}
