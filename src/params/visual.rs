//! Live visual parameters adjustable while the ring is running.

use crate::color::ColorStop;

/// Scales and gradient endpoints read by the render loop every frame.
///
/// No bounds are enforced: negative scales are accepted and pass through to the
/// blend factor unchanged.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisualParams {
    /// Weight of bar loudness in the blend factor
    pub height_scale: f32,

    /// Weight of the bar's position around the ring in the blend factor
    pub distance_scale: f32,

    /// Gradient colour at blend factor 0
    pub start_color: ColorStop,

    /// Gradient colour at blend factor 1
    pub end_color: ColorStop,
}

impl Default for VisualParams {
    fn default() -> Self {
        Self {
            height_scale: 1.0,
            distance_scale: 0.5,
            start_color: ColorStop::new(0x00, 0xa0, 0xff),
            end_color: ColorStop::new(0xff, 0x00, 0x80),
        }
    }
}
