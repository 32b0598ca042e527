//! Nearest-vertex hit-testing for the in-progress outline.
//!
//! Distances are normalized by the axes' spans so that pick sensitivity is
//! the same along both axes regardless of the section's aspect ratio: a
//! section with 4000 traces and 500 samples per trace would otherwise be
//! nearly impossible to pick along the short axis.

use crate::geometry::Point;

/// Default pick threshold, in normalized-distance units.
pub const DEFAULT_PICK_THRESHOLD: f64 = 0.01;

/// Result of a nearest-vertex query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Nearest {
    /// Index of the closest candidate vertex.
    pub index: usize,
    /// Normalized distance to that vertex.
    pub distance: f64,
}

/// Finds the candidate vertex closest to a query position.
#[derive(Debug, Clone, Copy)]
pub struct VertexLocator {
    span_x: f64,
    span_y: f64,
    threshold: f64,
}

impl VertexLocator {
    /// Create a locator for axes spanning `span_x` by `span_y` data units.
    pub fn new(span_x: f64, span_y: f64, threshold: f64) -> Self {
        debug_assert!(span_x > 0.0 && span_y > 0.0);
        Self {
            span_x,
            span_y,
            threshold,
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Nearest candidate to `query`, ignoring the threshold.
    ///
    /// Returns `None` only for an empty candidate set, so callers can
    /// distinguish "no candidates" from a valid zero-index result.
    pub fn nearest(&self, query: Point, candidates: &[Point]) -> Option<Nearest> {
        let mut best: Option<Nearest> = None;
        for (index, p) in candidates.iter().enumerate() {
            let dx = (p.x - query.x) / self.span_x;
            let dy = (p.y - query.y) / self.span_y;
            let distance = (dx * dx + dy * dy).sqrt();
            if best.is_none_or(|b| distance < b.distance) {
                best = Some(Nearest { index, distance });
            }
        }
        best
    }

    /// Index of the nearest candidate within the pick threshold, if any.
    pub fn pick(&self, query: Point, candidates: &[Point]) -> Option<usize> {
        self.nearest(query, candidates)
            .filter(|n| n.distance < self.threshold)
            .map(|n| n.index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locator() -> VertexLocator {
        VertexLocator::new(100.0, 100.0, DEFAULT_PICK_THRESHOLD)
    }

    #[test]
    fn test_empty_candidates_is_no_match() {
        assert_eq!(locator().nearest(Point::new(1.0, 1.0), &[]), None);
        assert_eq!(locator().pick(Point::new(1.0, 1.0), &[]), None);
    }

    #[test]
    fn test_exact_hit_has_zero_distance() {
        let points = [Point::new(40.0, 60.0)];
        let hit = locator().nearest(Point::new(40.0, 60.0), &points).unwrap();
        assert_eq!(hit.index, 0);
        assert_eq!(hit.distance, 0.0);
        // Zero distance is within any positive threshold.
        let tight = VertexLocator::new(100.0, 100.0, 1e-12);
        assert_eq!(tight.pick(Point::new(40.0, 60.0), &points), Some(0));
    }

    #[test]
    fn test_nearest_of_several() {
        let points = [
            Point::new(0.0, 0.0),
            Point::new(50.0, 50.0),
            Point::new(50.5, 50.5),
        ];
        let hit = locator().nearest(Point::new(51.0, 51.0), &points).unwrap();
        assert_eq!(hit.index, 2);
    }

    #[test]
    fn test_threshold_rejects_far_candidates() {
        let points = [Point::new(0.0, 0.0)];
        // 10 units away on a 100-unit span: normalized 0.1, well over 0.01.
        assert_eq!(locator().pick(Point::new(10.0, 0.0), &points), None);
        // 0.5 units away: normalized 0.005, inside the default threshold.
        assert_eq!(locator().pick(Point::new(0.5, 0.0), &points), Some(0));
    }

    #[test]
    fn test_normalization_balances_axes() {
        // Same data-space offset along each axis; the wide axis normalizes
        // it away while the short axis does not.
        let loc = VertexLocator::new(4000.0, 100.0, DEFAULT_PICK_THRESHOLD);
        let points = [Point::new(0.0, 0.0)];
        assert_eq!(loc.pick(Point::new(8.0, 0.0), &points), Some(0));
        assert_eq!(loc.pick(Point::new(0.0, 8.0), &points), None);
    }
}
