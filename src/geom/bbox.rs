use geo::{Line, Rect};
use rstar::{RTreeObject, AABB};

/// A bounding box in an R-tree, associated with a shape or a ring segment by index.
#[derive(Debug, Clone)]
pub(super) struct BoundingBox {
    idx: usize, // Index of the corresponding item in the owning collection
    bbox: Rect<f64>,
}

impl BoundingBox {
    pub(super) fn new(idx: usize, bbox: Rect<f64>) -> Self {
        Self { idx, bbox }
    }

    /// Bounding box of the segment `line`.
    pub(super) fn of_line(idx: usize, line: Line<f64>) -> Self {
        Self::new(idx, Rect::new(line.start, line.end))
    }

    /// Get the index of the corresponding item.
    pub(super) fn idx(&self) -> usize { self.idx }

    /// Envelope of this box for R-tree queries.
    pub(super) fn aabb(&self) -> AABB<[f64; 2]> {
        AABB::from_corners(self.bbox.min().into(), self.bbox.max().into())
    }
}

impl RTreeObject for BoundingBox {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope { self.aabb() }
}
