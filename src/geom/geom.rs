use geo::{BooleanOps, BoundingRect, MultiPolygon, Rect};
use rstar::RTree;

use crate::{crs::Crs, geom::{drop_slivers, sliver_epsilon, BoundingBox, Shape}};

/// Geometries represents the polygonal coverage of one dataset: a collection
/// of valid MultiPolygons indexed by bounding box.
#[derive(Debug, Clone)]
pub(crate) struct Geometries {
    shapes: Vec<MultiPolygon<f64>>,
    rtree: RTree<BoundingBox>,
    crs: Crs,
}

impl Geometries {
    /// Construct a Geometries object from repaired shapes.
    pub(crate) fn new<'a>(shapes: impl IntoIterator<Item = &'a Shape>, crs: Crs) -> Self {
        let shapes = shapes.into_iter()
            .map(Shape::to_multi_polygon)
            .filter(|mp| !mp.0.is_empty())
            .collect::<Vec<_>>();

        Self {
            rtree: RTree::bulk_load(
                shapes.iter().enumerate()
                    .filter_map(|(i, mp)| mp.bounding_rect().map(|bbox| BoundingBox::new(i, bbox)))
                    .collect()
            ),
            shapes,
            crs,
        }
    }

    /// Get the number of MultiPolygons.
    #[inline] pub(crate) fn len(&self) -> usize { self.shapes.len() }

    /// Check if there are no MultiPolygons.
    #[inline] pub(crate) fn is_empty(&self) -> bool { self.shapes.is_empty() }

    #[inline] pub(crate) fn crs(&self) -> Crs { self.crs }

    /// Compute the bounding rectangle of all MultiPolygons.
    pub(crate) fn bounds(&self) -> Option<Rect<f64>> {
        let envelope = self.rtree.root().envelope();
        (!self.is_empty()).then(|| Rect::new(envelope.lower(), envelope.upper()))
    }

    /// Dissolve all MultiPolygons into one, removing internal seams.
    ///
    /// Shapes are visited in R-tree order so neighbours meet early, then
    /// merged by pairwise rounds until one remains. Slivers below
    /// `tolerance` of the squared extent diagonal are dropped.
    pub(crate) fn union(&self, tolerance: f64) -> MultiPolygon<f64> {
        let mut layer = self.rtree.iter()
            .map(|bbox| self.shapes[bbox.idx()].clone())
            .collect::<Vec<_>>();

        while layer.len() > 1 {
            layer = layer.chunks(2)
                .map(|pair| match pair {
                    [a, b] => a.union(b),
                    [a] => a.clone(),
                    _ => unreachable!("chunks(2) yields one or two items"),
                })
                .collect();
        }

        match (layer.pop(), self.bounds()) {
            (Some(union), Some(bounds)) => drop_slivers(union, sliver_epsilon(bounds, tolerance)),
            _ => MultiPolygon::new(vec![]),
        }
    }
}
