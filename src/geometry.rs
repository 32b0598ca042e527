//! Geometry primitives for section annotations.
//!
//! Coordinates live in data space: `x` runs along columns (sample index),
//! `y` along rows (trace index). The same convention is used by the
//! rasterizer and the display frontend.

/// A 2D point in data coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A closed planar polygon defined by an ordered vertex sequence.
///
/// The last vertex implicitly connects back to the first; callers must
/// provide at least 3 vertices (see [`PolygonShape::new`]).
#[derive(Debug, Clone, PartialEq)]
pub struct PolygonShape {
    vertices: Vec<Point>,
}

impl PolygonShape {
    /// Build a polygon from a vertex sequence.
    ///
    /// Returns `None` for fewer than 3 vertices - a degenerate outline is
    /// "nothing to build", not an error.
    pub fn new(vertices: Vec<Point>) -> Option<Self> {
        if vertices.len() < 3 {
            return None;
        }
        Some(Self { vertices })
    }

    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    /// Axis-aligned bounding box as `(min, max)` corners.
    pub fn bounding_box(&self) -> (Point, Point) {
        let mut min = Point::new(f64::INFINITY, f64::INFINITY);
        let mut max = Point::new(f64::NEG_INFINITY, f64::NEG_INFINITY);
        for p in &self.vertices {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        (min, max)
    }

    /// Check whether a point lies inside the polygon (ray casting).
    pub fn contains(&self, point: Point) -> bool {
        let n = self.vertices.len();
        let mut inside = false;

        let mut j = n - 1;
        for i in 0..n {
            let vi = self.vertices[i];
            let vj = self.vertices[j];

            if ((vi.y > point.y) != (vj.y > point.y))
                && (point.x < (vj.x - vi.x) * (point.y - vi.y) / (vj.y - vi.y) + vi.x)
            {
                inside = !inside;
            }
            j = i;
        }

        inside
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x0: f64, y0: f64, x1: f64, y1: f64) -> PolygonShape {
        PolygonShape::new(vec![
            Point::new(x0, y0),
            Point::new(x1, y0),
            Point::new(x1, y1),
            Point::new(x0, y1),
        ])
        .unwrap()
    }

    #[test]
    fn test_degenerate_outline_rejected() {
        assert!(PolygonShape::new(vec![]).is_none());
        assert!(PolygonShape::new(vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0)]).is_none());
        assert!(
            PolygonShape::new(vec![
                Point::new(0.0, 0.0),
                Point::new(1.0, 0.0),
                Point::new(0.0, 1.0),
            ])
            .is_some()
        );
    }

    #[test]
    fn test_square_contains() {
        let poly = square(0.0, 0.0, 100.0, 100.0);
        assert!(poly.contains(Point::new(50.0, 50.0)));
        assert!(!poly.contains(Point::new(150.0, 50.0)));
        assert!(!poly.contains(Point::new(50.0, -1.0)));
    }

    #[test]
    fn test_concave_contains() {
        // L-shape: the notch at the top right is outside.
        let poly = PolygonShape::new(vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 4.0),
            Point::new(4.0, 4.0),
            Point::new(4.0, 10.0),
            Point::new(0.0, 10.0),
        ])
        .unwrap();
        assert!(poly.contains(Point::new(2.0, 8.0)));
        assert!(poly.contains(Point::new(8.0, 2.0)));
        assert!(!poly.contains(Point::new(8.0, 8.0)));
    }

    #[test]
    fn test_bounding_box() {
        let poly = PolygonShape::new(vec![
            Point::new(3.0, -2.0),
            Point::new(7.0, 5.0),
            Point::new(-1.0, 4.0),
        ])
        .unwrap();
        let (min, max) = poly.bounding_box();
        assert_eq!(min, Point::new(-1.0, -2.0));
        assert_eq!(max, Point::new(7.0, 5.0));
    }
}
