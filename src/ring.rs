//! Per-bin bar layout around the ring.
//!
//! Each frequency bin becomes one ring segment: its angle is fixed by the bin
//! index, its radial height follows the bin's loudness, and its colour blends
//! loudness with how far the bin sits from the start of the ring.

use glam::Vec3;

use crate::color::gradient;
use crate::params::VisualParams;

/// Radius of the ring's inner edge (ring units)
pub const BASE_RADIUS: f32 = 2.0;

/// Radial extension per unit of sample magnitude
pub const HEIGHT_PER_MAGNITUDE: f32 = 1.25 / 100.0;

/// Quad corners: x selects the angular edge, y the inner (0) or outer (1) edge
pub const SEGMENT_CORNERS: [[f32; 2]; 4] = [[-1.0, 0.0], [1.0, 0.0], [1.0, 1.0], [-1.0, 1.0]];

/// Two triangles covering the segment quad
pub const SEGMENT_INDICES: [u16; 6] = [0, 1, 2, 0, 2, 3];

/// One bar, recomputed every frame
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bar {
    pub index: usize,
    /// Angle of the segment centre (degrees)
    pub angle: f32,
    /// Radial extension beyond the base radius
    pub height: f32,
    /// Colour channels in the 0-255 range
    pub color: [f32; 3],
}

/// Half the angular footprint of one bar (degrees)
pub fn bar_width(bar_count: usize) -> f32 {
    360.0 / bar_count as f32 / 2.0
}

/// Angle of bar `index` (degrees)
pub fn bar_angle(index: usize, bar_count: usize) -> f32 {
    360.0 * (index as f32 / bar_count as f32)
}

/// Triangular position profile: 0 at the first bin, 1 half way round.
///
/// The falling side uses `bar_count - index`, so the last bin lands on
/// `1 / (bar_count / 2)` instead of 0.
pub fn bar_distance(index: usize, bar_count: usize) -> f32 {
    let half = bar_count as f32 / 2.0;
    if index as f32 > half {
        (bar_count - index) as f32 / half
    } else {
        index as f32 / half
    }
}

/// Colour blend factor for one bar. Capped at 1, never floored.
pub fn blend_factor(magnitude: u8, distance: f32, params: &VisualParams) -> f32 {
    let loudness = magnitude as f32 / 255.0;
    (loudness * params.height_scale + distance * params.distance_scale).min(1.0)
}

/// Radial extension of one bar
pub fn bar_height(magnitude: u8) -> f32 {
    magnitude as f32 * HEIGHT_PER_MAGNITUDE
}

/// Derive bar `index` from its magnitude and the current visual parameters
pub fn layout_bar(index: usize, magnitude: u8, bar_count: usize, params: &VisualParams) -> Bar {
    let t = blend_factor(magnitude, bar_distance(index, bar_count), params);
    Bar {
        index,
        angle: bar_angle(index, bar_count),
        height: bar_height(magnitude),
        color: gradient(t, params.start_color, params.end_color),
    }
}

/// Reference for the vertex stage: where one corner of a segment lands
/// before projection.
pub fn ring_vertex(corner: [f32; 2], angle: f32, width: f32, height: f32) -> Vec3 {
    let radians = (angle + corner[0] * width).to_radians();
    let radius = if corner[1] == 0.0 {
        BASE_RADIUS
    } else {
        height + BASE_RADIUS
    };
    Vec3::new(radians.cos() * radius, radians.sin() * radius, 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::ColorStop;

    const N: usize = 128;

    fn unit_params() -> VisualParams {
        VisualParams {
            height_scale: 1.0,
            distance_scale: 1.0,
            start_color: ColorStop::new(0, 0, 255),
            end_color: ColorStop::new(255, 64, 0),
        }
    }

    #[test]
    fn test_bar_width() {
        assert_eq!(bar_width(N), 1.40625);
    }

    #[test]
    fn test_distance_profile() {
        assert_eq!(bar_distance(0, N), 0.0);
        assert_eq!(bar_distance(N / 2, N), 1.0);
        assert_eq!(bar_distance(N / 4, N), 0.5);

        // The tail stops one step short of zero
        assert_eq!(bar_distance(N - 1, N), 1.0 / (N as f32 / 2.0));
        assert!(bar_distance(N - 1, N) > 0.0);
    }

    #[test]
    fn test_angles_increase_and_span_circle() {
        assert_eq!(bar_angle(0, N), 0.0);
        for i in 1..N {
            assert!(bar_angle(i, N) > bar_angle(i - 1, N));
        }
        assert!(bar_angle(N - 1, N) < 360.0);
    }

    #[test]
    fn test_blend_factor_capped_at_one() {
        let mut params = unit_params();
        params.height_scale = 5.0;
        params.distance_scale = 3.0;
        assert_eq!(blend_factor(255, 1.0, &params), 1.0);
        assert_eq!(blend_factor(100, 0.7, &params), 1.0);
    }

    #[test]
    fn test_blend_factor_not_floored() {
        let mut params = unit_params();
        params.height_scale = -1.0;
        params.distance_scale = 0.0;
        let t = blend_factor(255, 0.5, &params);
        assert!((t - (-1.0)).abs() < 1e-6);
    }

    #[test]
    fn test_loud_centre_bar_takes_end_color() {
        let params = unit_params();
        let bar = layout_bar(64, 255, N, &params);
        assert_eq!(bar.color, params.end_color.to_array());
        assert_eq!(bar.angle, 180.0);
    }

    #[test]
    fn test_silent_first_bar_takes_start_color() {
        let params = unit_params();
        let bar = layout_bar(0, 0, N, &params);
        assert_eq!(bar.color, params.start_color.to_array());
        assert_eq!(bar.height, 0.0);
    }

    #[test]
    fn test_bar_height() {
        assert!((bar_height(255) - 3.1875).abs() < 1e-5);
        assert!((bar_height(100) - 1.25).abs() < 1e-5);
    }

    #[test]
    fn test_ring_vertex_inner_and_outer_edges() {
        // Inner corners sit on the base radius regardless of height
        let inner = ring_vertex([0.0, 0.0], 90.0, 10.0, 3.0);
        assert!(inner.x.abs() < 1e-5);
        assert!((inner.y - BASE_RADIUS).abs() < 1e-5);
        assert_eq!(inner.z, 0.0);

        // Outer corners extend by the bar height
        let outer = ring_vertex([0.0, 1.0], 0.0, 10.0, 3.0);
        assert!((outer.x - (BASE_RADIUS + 3.0)).abs() < 1e-5);
        assert!(outer.y.abs() < 1e-5);

        // x = +-1 swings the corner by +-width degrees
        let left = ring_vertex([-1.0, 0.0], 45.0, 45.0, 0.0);
        let right = ring_vertex([1.0, 0.0], 45.0, 45.0, 0.0);
        assert!((left.x - BASE_RADIUS).abs() < 1e-5);
        assert!(right.x.abs() < 1e-5);
        assert!((right.y - BASE_RADIUS).abs() < 1e-5);
    }

    #[test]
    fn test_segment_geometry() {
        assert_eq!(SEGMENT_INDICES.len(), 6);
        assert!(SEGMENT_INDICES.iter().all(|&i| (i as usize) < SEGMENT_CORNERS.len()));
    }
}
