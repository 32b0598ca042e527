//! Annotation state: the in-progress outline and the committed polygon set.
//!
//! A polygon is committed from the outline buffer with a class label in
//! 1..=9 and is immutable afterwards except for reclassification. The set
//! keeps polygons in creation order - the order is load-bearing: deletion
//! scans first-match, while rasterization applies last-committed-wins
//! (see [`crate::raster`]).

use crate::geometry::{Point, PolygonShape};

// ============================================================================
// Outline buffer
// ============================================================================

/// Ordered vertex buffer for the polygon currently being drawn.
///
/// Owned exclusively by the controller; cleared after each successful
/// commit.
#[derive(Debug, Clone, Default)]
pub struct PointBuffer {
    points: Vec<Point>,
}

impl PointBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a vertex at the end. Duplicate and collinear points are
    /// allowed; the buffer imposes no geometric constraints.
    pub fn append(&mut self, point: Point) {
        self.points.push(point);
    }

    /// Drop all vertices.
    pub fn clear(&mut self) {
        self.points.clear();
    }

    /// Remove the last vertex. Returns whether anything was removed;
    /// popping an empty buffer is a no-op.
    pub fn pop_last(&mut self) -> bool {
        self.points.pop().is_some()
    }

    /// Move the vertex at `index` to `point`. Out-of-range indices are
    /// ignored.
    pub fn move_vertex(&mut self, index: usize, point: Point) {
        if let Some(v) = self.points.get_mut(index) {
            *v = point;
        }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Take the buffered vertices for polygon construction.
    ///
    /// Yields the vertex sequence and clears the buffer when at least 3
    /// vertices are present. With fewer there is nothing to commit: the
    /// buffer is left untouched and `None` is returned.
    pub fn take_polygon(&mut self) -> Option<Vec<Point>> {
        if self.points.len() < 3 {
            return None;
        }
        Some(std::mem::take(&mut self.points))
    }
}

// ============================================================================
// Committed polygons
// ============================================================================

/// Smallest assignable class label.
pub const CLASS_MIN: u8 = 1;
/// Largest assignable class label.
pub const CLASS_MAX: u8 = 9;
/// Raster value for cells no polygon covers.
pub const CLASS_UNLABELED: u8 = 0;

/// A committed polygon tagged with a class label.
#[derive(Debug, Clone, PartialEq)]
pub struct PolygonAnnotation {
    shape: PolygonShape,
    class: u8,
}

impl PolygonAnnotation {
    pub fn shape(&self) -> &PolygonShape {
        &self.shape
    }

    pub fn class(&self) -> u8 {
        self.class
    }
}

/// The committed polygons, in creation order, plus a single-slot memo of
/// the last removal for one-level undo.
#[derive(Debug, Clone, Default)]
pub struct AnnotationSet {
    polygons: Vec<PolygonAnnotation>,
    last_removed: Option<PolygonAnnotation>,
}

impl AnnotationSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new polygon built from `vertices` with the given class.
    ///
    /// Fewer than 3 vertices is a silent no-op (callers normally guard via
    /// [`PointBuffer::take_polygon`]).
    pub fn commit(&mut self, vertices: Vec<Point>, class: u8) {
        debug_assert!((CLASS_MIN..=CLASS_MAX).contains(&class));
        let Some(shape) = PolygonShape::new(vertices) else {
            return;
        };
        log::debug!(
            "commit polygon #{} with class {}",
            self.polygons.len(),
            class
        );
        self.polygons.push(PolygonAnnotation { shape, class });
    }

    /// Remove the first polygon, in creation order, containing `query`.
    ///
    /// The removed polygon overwrites the undo memo. Returns whether a
    /// polygon was removed; a miss is a no-op.
    pub fn remove_at(&mut self, query: Point) -> bool {
        let Some(index) = self.polygons.iter().position(|p| p.shape.contains(query)) else {
            return false;
        };
        let removed = self.polygons.remove(index);
        log::debug!("removed polygon #{} (class {})", index, removed.class);
        self.last_removed = Some(removed);
        true
    }

    /// Restore the polygon held in the undo memo.
    ///
    /// The polygon is appended at the end, regaining top priority for
    /// future overlap resolution. The memo stays populated, but a second
    /// undo is a no-op while the restored polygon is still the most
    /// recently added live one - this is single-level undo, not a stack.
    pub fn undo_removal(&mut self) -> bool {
        let Some(memo) = &self.last_removed else {
            return false;
        };
        if self.polygons.last() == Some(memo) {
            return false;
        }
        log::debug!("restored last removed polygon (class {})", memo.class);
        self.polygons.push(memo.clone());
        true
    }

    /// Set the class of every polygon containing `query`.
    ///
    /// Unlike [`AnnotationSet::remove_at`], the containment test runs
    /// independently per polygon: stacked polygons all change. Returns the
    /// number of containing polygons; zero means the query hit nothing.
    pub fn reclassify(&mut self, query: Point, class: u8) -> usize {
        debug_assert!((CLASS_MIN..=CLASS_MAX).contains(&class));
        let mut hits = 0;
        for polygon in &mut self.polygons {
            if polygon.shape.contains(query) {
                polygon.class = class;
                hits += 1;
            }
        }
        if hits > 0 {
            log::debug!("reclassified {} polygon(s) to class {}", hits, class);
        }
        hits
    }

    /// Committed polygons in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &PolygonAnnotation> {
        self.polygons.iter()
    }

    pub fn len(&self) -> usize {
        self.polygons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x0: f64, y0: f64, x1: f64, y1: f64) -> Vec<Point> {
        vec![
            Point::new(x0, y0),
            Point::new(x1, y0),
            Point::new(x1, y1),
            Point::new(x0, y1),
        ]
    }

    #[test]
    fn test_take_polygon_requires_three_vertices() {
        let mut buffer = PointBuffer::new();
        buffer.append(Point::new(0.0, 0.0));
        buffer.append(Point::new(1.0, 0.0));
        assert_eq!(buffer.take_polygon(), None);
        // A failed take leaves the outline intact.
        assert_eq!(buffer.len(), 2);

        buffer.append(Point::new(0.0, 1.0));
        let vertices = buffer.take_polygon().unwrap();
        assert_eq!(vertices.len(), 3);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_pop_empty_buffer_is_noop() {
        let mut buffer = PointBuffer::new();
        assert!(!buffer.pop_last());
        buffer.append(Point::new(1.0, 2.0));
        assert!(buffer.pop_last());
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_move_vertex_out_of_range_ignored() {
        let mut buffer = PointBuffer::new();
        buffer.append(Point::new(0.0, 0.0));
        buffer.move_vertex(5, Point::new(9.0, 9.0));
        assert_eq!(buffer.points(), &[Point::new(0.0, 0.0)]);
        buffer.move_vertex(0, Point::new(9.0, 9.0));
        assert_eq!(buffer.points(), &[Point::new(9.0, 9.0)]);
    }

    #[test]
    fn test_commit_degenerate_is_noop() {
        let mut set = AnnotationSet::new();
        set.commit(vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0)], 1);
        assert!(set.is_empty());
    }

    #[test]
    fn test_remove_first_match_only() {
        let mut set = AnnotationSet::new();
        set.commit(square(0.0, 0.0, 10.0, 10.0), 1);
        set.commit(square(5.0, 5.0, 15.0, 15.0), 2);

        // (7, 7) is inside both; the oldest polygon goes.
        assert!(set.remove_at(Point::new(7.0, 7.0)));
        assert_eq!(set.len(), 1);
        assert_eq!(set.iter().next().unwrap().class(), 2);
    }

    #[test]
    fn test_remove_miss_is_noop() {
        let mut set = AnnotationSet::new();
        set.commit(square(0.0, 0.0, 10.0, 10.0), 1);
        assert!(!set.remove_at(Point::new(50.0, 50.0)));
        assert_eq!(set.len(), 1);
        assert!(!set.undo_removal());
    }

    #[test]
    fn test_delete_then_undo_round_trip() {
        let mut set = AnnotationSet::new();
        set.commit(square(0.0, 0.0, 10.0, 10.0), 3);
        set.commit(square(20.0, 20.0, 30.0, 30.0), 4);

        assert!(set.remove_at(Point::new(5.0, 5.0)));
        assert_eq!(set.len(), 1);

        assert!(set.undo_removal());
        assert_eq!(set.len(), 2);
        // The restored polygon comes back at the end with its label.
        let last = set.iter().last().unwrap();
        assert_eq!(last.class(), 3);
        assert!(last.shape().contains(Point::new(5.0, 5.0)));
    }

    #[test]
    fn test_double_undo_is_idempotent() {
        let mut set = AnnotationSet::new();
        set.commit(square(0.0, 0.0, 10.0, 10.0), 1);
        set.remove_at(Point::new(5.0, 5.0));

        assert!(set.undo_removal());
        assert!(!set.undo_removal());
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_undo_after_later_commit_still_restores() {
        let mut set = AnnotationSet::new();
        set.commit(square(0.0, 0.0, 10.0, 10.0), 1);
        set.remove_at(Point::new(5.0, 5.0));
        set.commit(square(20.0, 20.0, 30.0, 30.0), 2);

        // The memo polygon is no longer the most recent live one, so undo
        // applies.
        assert!(set.undo_removal());
        assert_eq!(set.len(), 2);
        assert_eq!(set.iter().last().unwrap().class(), 1);
    }

    #[test]
    fn test_removal_overwrites_memo() {
        let mut set = AnnotationSet::new();
        set.commit(square(0.0, 0.0, 10.0, 10.0), 1);
        set.commit(square(20.0, 20.0, 30.0, 30.0), 2);

        set.remove_at(Point::new(5.0, 5.0));
        set.remove_at(Point::new(25.0, 25.0));

        // Only the most recent removal is recoverable.
        assert!(set.undo_removal());
        assert_eq!(set.len(), 1);
        assert_eq!(set.iter().next().unwrap().class(), 2);
        assert!(!set.undo_removal());
    }

    #[test]
    fn test_reclassify_hits_every_containing_polygon() {
        let mut set = AnnotationSet::new();
        set.commit(square(0.0, 0.0, 10.0, 10.0), 1);
        set.commit(square(5.0, 5.0, 15.0, 15.0), 2);
        set.commit(square(50.0, 50.0, 60.0, 60.0), 3);

        assert_eq!(set.reclassify(Point::new(7.0, 7.0), 9), 2);
        let classes: Vec<u8> = set.iter().map(|p| p.class()).collect();
        assert_eq!(classes, vec![9, 9, 3]);
    }

    #[test]
    fn test_reclassify_miss_is_noop() {
        let mut set = AnnotationSet::new();
        set.commit(square(0.0, 0.0, 10.0, 10.0), 1);
        assert_eq!(set.reclassify(Point::new(50.0, 50.0), 9), 0);
        assert_eq!(set.iter().next().unwrap().class(), 1);
    }
}
