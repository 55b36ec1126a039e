//! Fake-perspective road projection
//!
//! Maps the normalized depth coordinate (0 = horizon, 1 = camera) to screen
//! rows, and screen rows to road edges and lane centers. Everything here is a
//! pure function of the road geometry; out-of-range inputs are clamped.

use serde::{Deserialize, Serialize};

use crate::consts::{SCREEN_HEIGHT, SCREEN_WIDTH};
use crate::{ease_in, lerp};

/// Screen-space layout of the road trapezoid
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoadGeometry {
    /// Screen row of the road at the horizon (depth 0)
    pub far_row: f32,
    /// Screen row of the road at the camera (depth 1)
    pub near_row: f32,
    /// Road width at the far row
    pub far_width: f32,
    /// Road width at the near row
    pub near_width: f32,
    /// Horizontal center of the road
    pub center_x: f32,
}

impl RoadGeometry {
    /// Standard road layout for a screen of the given size
    pub fn for_screen(width: f32, height: f32) -> Self {
        Self {
            far_row: 120.0,
            near_row: height - 40.0,
            far_width: width * 0.22,
            near_width: width * 0.85,
            center_x: width / 2.0,
        }
    }
}

impl Default for RoadGeometry {
    fn default() -> Self {
        Self::for_screen(SCREEN_WIDTH, SCREEN_HEIGHT)
    }
}

/// Depth-dependent size multiplier for a class of actor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleRange {
    pub min: f32,
    pub max: f32,
}

impl ScaleRange {
    pub const PLAYER: ScaleRange = ScaleRange { min: 0.35, max: 1.12 };
    pub const OBSTACLE: ScaleRange = ScaleRange { min: 0.22, max: 1.18 };
    pub const EXPLOSION: ScaleRange = ScaleRange { min: 0.30, max: 1.25 };

    /// Scale factor at depth `z`.
    ///
    /// Negative depths clamp to the horizon. Depths past 1 keep growing so
    /// actors that pass the camera do not visibly shrink.
    pub fn at(&self, z: f32) -> f32 {
        lerp(self.min, self.max, z.max(0.0))
    }
}

/// Road projection for a fixed geometry and lane count
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    geometry: RoadGeometry,
    lane_count: usize,
}

impl Projection {
    pub fn new(geometry: RoadGeometry, lane_count: usize) -> Self {
        Self {
            geometry,
            lane_count: lane_count.max(1),
        }
    }

    pub fn geometry(&self) -> &RoadGeometry {
        &self.geometry
    }

    pub fn lane_count(&self) -> usize {
        self.lane_count
    }

    /// Screen row for a depth. Quadratic ease-in between far and near rows.
    pub fn y_from_depth(&self, z: f32) -> f32 {
        let t = ease_in(z.clamp(0.0, 1.0));
        lerp(self.geometry.far_row, self.geometry.near_row, t)
    }

    /// Left and right road edges at screen row `y`
    pub fn road_edges_at_row(&self, y: f32) -> (f32, f32) {
        let g = &self.geometry;
        let span = g.near_row - g.far_row;
        let t = if span.abs() > f32::EPSILON {
            ((y - g.far_row) / span).clamp(0.0, 1.0)
        } else {
            1.0
        };
        let half_width = lerp(g.far_width / 2.0, g.near_width / 2.0, t);
        (g.center_x - half_width, g.center_x + half_width)
    }

    /// Width of a single lane at screen row `y`
    pub fn lane_width_at_row(&self, y: f32) -> f32 {
        let (left, right) = self.road_edges_at_row(y);
        (right - left) / self.lane_count as f32
    }

    /// Horizontal center of `lane` at screen row `y` (lane clamped to the road)
    pub fn lane_center_at_row(&self, lane: usize, y: f32) -> f32 {
        let lane = lane.min(self.lane_count - 1);
        let (left, _) = self.road_edges_at_row(y);
        left + self.lane_width_at_row(y) * (lane as f32 + 0.5)
    }

    /// Midpoint between the centers of `lane` and `lane + 1`
    pub fn lane_pair_center_at_row(&self, lane: usize, y: f32) -> f32 {
        (self.lane_center_at_row(lane, y) + self.lane_center_at_row(lane + 1, y)) * 0.5
    }
}

impl Default for Projection {
    fn default() -> Self {
        Self::new(RoadGeometry::default(), 3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_depth_endpoints_hit_far_and_near_rows() {
        let p = Projection::default();
        assert_eq!(p.y_from_depth(0.0), p.geometry().far_row);
        assert_eq!(p.y_from_depth(1.0), p.geometry().near_row);
        // Out-of-range depths clamp
        assert_eq!(p.y_from_depth(-0.5), p.geometry().far_row);
        assert_eq!(p.y_from_depth(1.3), p.geometry().near_row);
    }

    #[test]
    fn test_ease_in_lags_linear_interpolation() {
        let p = Projection::default();
        let g = p.geometry();
        let linear_mid = (g.far_row + g.near_row) / 2.0;
        assert!(p.y_from_depth(0.5) < linear_mid);
    }

    #[test]
    fn test_road_edges_widen_toward_camera() {
        let p = Projection::default();
        let (fl, fr) = p.road_edges_at_row(p.geometry().far_row);
        let (nl, nr) = p.road_edges_at_row(p.geometry().near_row);
        assert!((fr - fl - p.geometry().far_width).abs() < 0.001);
        assert!((nr - nl - p.geometry().near_width).abs() < 0.001);
        // Rows above the horizon clamp to the far width
        assert_eq!(p.road_edges_at_row(0.0), (fl, fr));
    }

    #[test]
    fn test_middle_lane_is_road_center() {
        let p = Projection::default();
        let y = p.y_from_depth(0.6);
        assert!((p.lane_center_at_row(1, y) - p.geometry().center_x).abs() < 0.001);
    }

    #[test]
    fn test_lane_index_is_clamped() {
        let p = Projection::default();
        let y = p.y_from_depth(0.8);
        assert_eq!(p.lane_center_at_row(7, y), p.lane_center_at_row(2, y));
    }

    #[test]
    fn test_scale_ranges() {
        assert!((ScaleRange::PLAYER.at(1.0) - 1.12).abs() < 1e-6);
        assert_eq!(ScaleRange::OBSTACLE.at(-1.0), 0.22);
        assert!(ScaleRange::EXPLOSION.at(0.5) > ScaleRange::EXPLOSION.at(0.4));
    }

    proptest! {
        #[test]
        fn prop_y_from_depth_monotonic(a in 0.0f32..=1.0, b in 0.0f32..=1.0) {
            let p = Projection::default();
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(p.y_from_depth(lo) <= p.y_from_depth(hi));
        }

        #[test]
        fn prop_lane_center_strictly_inside_road(
            lanes in 1usize..6,
            lane_seed in 0usize..6,
            y in -200.0f32..1200.0,
        ) {
            let p = Projection::new(RoadGeometry::default(), lanes);
            let lane = lane_seed % lanes;
            let (left, right) = p.road_edges_at_row(y);
            let x = p.lane_center_at_row(lane, y);
            prop_assert!(left < x && x < right);
        }
    }
}
