//! Polygon set to per-cell label matrix conversion.
//!
//! Cell (r, c) is tested as the data-space point (x = c, y = r) - the same
//! mapping the frontend uses when it converts pointer positions, so a
//! polygon labels exactly the cells it covers on screen.

use ndarray::Array2;

use crate::annotation::{AnnotationSet, CLASS_UNLABELED};
use crate::geometry::Point;

/// Rasterize the committed polygons onto a `rows` x `cols` label matrix.
///
/// Cells start unlabeled (0). Polygons are applied in creation order,
/// oldest first, so where polygons overlap the most recently committed one
/// wins - deliberately the inverse of `remove_at`'s first-match policy:
/// deletion favors the oldest drawn shape, labeling favors the newest.
pub fn rasterize(rows: usize, cols: usize, annotations: &AnnotationSet) -> Array2<u8> {
    let mut labels = Array2::from_elem((rows, cols), CLASS_UNLABELED);
    if rows == 0 || cols == 0 {
        return labels;
    }

    for polygon in annotations.iter() {
        let (min, max) = polygon.shape().bounding_box();

        // Clamp the containment scan to the cells the bounding box can
        // reach; everything outside it cannot be inside the polygon.
        let r0 = min.y.ceil().max(0.0) as usize;
        let c0 = min.x.ceil().max(0.0) as usize;
        if min.y >= rows as f64 || min.x >= cols as f64 || max.y < 0.0 || max.x < 0.0 {
            continue;
        }
        let r1 = (max.y.floor() as usize).min(rows.saturating_sub(1));
        let c1 = (max.x.floor() as usize).min(cols.saturating_sub(1));

        for r in r0..=r1 {
            for c in c0..=c1 {
                if polygon.shape().contains(Point::new(c as f64, r as f64)) {
                    labels[[r, c]] = polygon.class();
                }
            }
        }
    }

    labels
}
