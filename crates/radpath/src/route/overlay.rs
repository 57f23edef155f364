use std::collections::HashSet;

use serde::Serialize;

use super::types::{Segment, Step};

/// Default sideways offset, in map pixels, between a drawn step and its edge.
pub const DEFAULT_OFFSET: f64 = 3.0;

/// A trail step as a renderer draws it: shifted sideways off the underlying edge.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlaySegment {
    pub from: [f64; 2],
    pub to: [f64; 2],
    pub colour: usize,
    /// The same directed step was already drawn once; this copy sits on the other side.
    pub second_pass: bool,
}

/// Offset every step perpendicular to its direction by `offset`.
///
/// The first time a directed step is drawn it is shifted to its right-hand normal
/// (in screen coordinates, y down); a repeat of the same directed step flips to the
/// opposite side so both passes stay visible. Steps without a colour get colour 0.
pub fn overlay(steps: &[Step], colours: &[usize], offset: f64) -> Vec<OverlaySegment> {
    let mut drawn: HashSet<Step> = HashSet::new();
    steps
        .iter()
        .enumerate()
        .map(|(i, &step)| {
            let (dx, dy) = step.heading();
            let norm = dx.hypot(dy);
            let (ux, uy) = if norm == 0.0 { (0.0, 0.0) } else { (dx / norm, dy / norm) };
            let second_pass = !drawn.insert(step);
            let (nx, ny) = if second_pass { (-uy, ux) } else { (uy, -ux) };
            let (ox, oy) = (nx * offset, ny * offset);
            OverlaySegment {
                from: [f64::from(step.from.x) + ox, f64::from(step.from.y) + oy],
                to: [f64::from(step.to.x) + ox, f64::from(step.to.y) + oy],
                colour: colours.get(i).copied().unwrap_or(0),
                second_pass,
            }
        })
        .collect()
}

/// Distance figures for a computed route.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteStats {
    /// Length of the network itself.
    pub network_length: f64,
    /// Length of the full trail, retraced edges included.
    pub total_length: f64,
    /// Length walked a second time.
    pub retraced_length: f64,
}

impl RouteStats {
    pub fn measure(edges: &[Segment], double_edges: &[Segment], steps: &[Step]) -> Self {
        Self {
            network_length: edges.iter().map(Segment::length).sum(),
            total_length: steps.iter().map(|s| s.length()).sum(),
            retraced_length: double_edges.iter().map(Segment::length).sum(),
        }
    }

    /// Total length in multiples of the map width, rounded to one decimal.
    pub fn map_widths(&self, map_width: f64) -> Option<f64> {
        if map_width <= 0.0 || !map_width.is_finite() {
            return None;
        }
        Some((self.total_length / map_width * 10.0).round() / 10.0)
    }
}

#[cfg(test)]
mod unit_tests {
    use super::*;
    use crate::route::types::Point;

    #[test]
    fn test_first_pass_offsets_to_right_normal() {
        let step = Step::new(Point::new(0, 0), Point::new(10, 0));
        let drawn = overlay(&[step], &[4], 3.0);
        assert_eq!(drawn[0].from, [0.0, -3.0]);
        assert_eq!(drawn[0].to, [10.0, -3.0]);
        assert_eq!(drawn[0].colour, 4);
        assert!(!drawn[0].second_pass);
    }

    #[test]
    fn test_repeated_step_flips_side() {
        let step = Step::new(Point::new(0, 0), Point::new(0, 10));
        let drawn = overlay(&[step, step], &[0, 1], 3.0);
        assert_eq!(drawn[0].from, [3.0, 0.0]);
        assert_eq!(drawn[1].from, [-3.0, 0.0]);
        assert!(drawn[1].second_pass);
    }

    #[test]
    fn test_missing_colour_defaults_to_zero() {
        let step = Step::new(Point::new(0, 0), Point::new(0, 10));
        assert_eq!(overlay(&[step], &[], 3.0)[0].colour, 0);
    }

    #[test]
    fn test_stats_and_map_widths() {
        let a = Point::new(0, 0);
        let b = Point::new(300, 400);
        let edges = [Segment::new(a, b)];
        let steps = [Step::new(a, b), Step::new(b, a)];
        let stats = RouteStats::measure(&edges, &edges, &steps);
        assert_eq!(stats.network_length, 500.0);
        assert_eq!(stats.total_length, 1000.0);
        assert_eq!(stats.retraced_length, 500.0);
        assert_eq!(stats.map_widths(300.0), Some(3.3));
        assert_eq!(stats.map_widths(0.0), None);
    }
}
