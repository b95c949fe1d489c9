use geo::{orient::Direction, Area, BooleanOps, MultiPolygon, Orient, Polygon, Rect};
use log::debug;

use crate::{
    config::RepairOptions,
    geom::{ring::signed_area, Shape},
};

use super::split::split_ring;

/// Outcome of validity repair.
#[derive(Clone, Debug, PartialEq)]
pub enum Repaired {
    /// A Polygon or MultiPolygon made of simple, correctly oriented rings.
    Valid(Shape),
    /// No positive-area ring survived repair.
    Empty,
}

impl Repaired {
    #[inline] pub fn is_empty(&self) -> bool { matches!(self, Self::Empty) }

    /// The repaired shape, `None` when empty.
    #[inline]
    pub fn shape(&self) -> Option<&Shape> {
        match self {
            Self::Valid(shape) => Some(shape),
            Self::Empty => None,
        }
    }
}

/// Area below which a ring is a sliver, scaled to the squared bounding-box diagonal.
pub(crate) fn sliver_epsilon(bounds: Rect<f64>, tolerance: f64) -> f64 {
    let (w, h) = (bounds.width(), bounds.height());
    (w * w + h * h) * tolerance
}

/// Drop polygons and holes whose area does not exceed `eps`.
pub(crate) fn drop_slivers(mp: MultiPolygon<f64>, eps: f64) -> MultiPolygon<f64> {
    mp.0.into_iter()
        .filter_map(|polygon| {
            let (exterior, interiors) = polygon.into_inner();
            if signed_area(&exterior.0).abs() <= eps { return None }
            let interiors = interiors.into_iter()
                .filter(|ring| signed_area(&ring.0).abs() > eps)
                .collect();
            Some(Polygon::new(exterior, interiors))
        })
        .filter(|polygon| polygon.unsigned_area() > eps)
        .collect()
}

/// Repair a possibly invalid shape into simple polygons covering the same area.
///
/// 1. every ring is split at its self-intersections into simple lobes;
/// 2. the lobes of one polygon, shell and holes alike, are combined by
///    even-odd parity, so a hole crossing its shell cuts out only the
///    overlap and adds the part outside; slivers are dropped first;
/// 3. the rebuilt polygons are dissolved by successive unions, which merges
///    overlapping parts and is a no-op on valid input.
///
/// The union output is renormalised once more so pinched rings come out as
/// separate parts, then oriented (exteriors counter-clockwise, holes clockwise).
pub fn repair(shape: &Shape, options: &RepairOptions) -> Repaired {
    let Some(bounds) = shape.bounds() else { return Repaired::Empty };
    let eps = sliver_epsilon(bounds, options.sliver_tolerance);

    let pieces = shape.polygons().into_iter()
        .map(|polygon| rebuild(polygon, eps))
        .collect::<Vec<_>>();

    let dissolved = pieces.iter()
        .fold(MultiPolygon::new(vec![]), |acc, piece| acc.union(piece));

    let normalized = dissolved.0.iter()
        .flat_map(|polygon| rebuild(polygon, eps))
        .collect::<MultiPolygon<f64>>();
    let normalized = drop_slivers(normalized, eps).orient(Direction::Default);

    debug!(
        "repair: {} input part(s) -> {} piece(s) -> {} output part(s)",
        shape.num_parts(), pieces.len(), normalized.0.len(),
    );

    if normalized.0.is_empty() {
        Repaired::Empty
    } else {
        Repaired::Valid(Shape::from_polygons(normalized.0))
    }
}

/// Split every ring of one polygon into lobes and combine them by even-odd
/// parity: a point is covered when an odd number of lobes enclose it.
fn rebuild(polygon: &Polygon<f64>, eps: f64) -> MultiPolygon<f64> {
    std::iter::once(polygon.exterior())
        .chain(polygon.interiors())
        .flat_map(split_ring)
        .filter(|ring| signed_area(&ring.0).abs() > eps)
        .fold(MultiPolygon::new(vec![]), |acc, lobe| acc.xor(&Polygon::new(lobe, vec![])))
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use geo::{line_string, polygon};

    use super::*;

    #[test]
    fn nested_lobes_alternate_between_shell_and_hole() {
        // A square with a hole that contains an island.
        let polygon = Polygon::new(
            line_string![(x: 0.0, y: 0.0), (x: 10.0, y: 0.0), (x: 10.0, y: 10.0), (x: 0.0, y: 10.0), (x: 0.0, y: 0.0)],
            vec![
                line_string![(x: 2.0, y: 2.0), (x: 8.0, y: 2.0), (x: 8.0, y: 8.0), (x: 2.0, y: 8.0), (x: 2.0, y: 2.0)],
                line_string![(x: 4.0, y: 4.0), (x: 6.0, y: 4.0), (x: 6.0, y: 6.0), (x: 4.0, y: 6.0), (x: 4.0, y: 4.0)],
            ],
        );

        let rebuilt = rebuild(&polygon, 0.0);
        assert_eq!(rebuilt.0.len(), 2);
        assert_eq!(rebuilt.0.iter().map(|p| p.interiors().len()).sum::<usize>(), 1);
        assert_relative_eq!(rebuilt.unsigned_area(), 100.0 - 36.0 + 4.0, max_relative = 1e-12);
    }

    #[test]
    fn hole_crossing_its_shell_is_combined_by_parity() {
        let shell = line_string![(x: 0.0, y: 0.0), (x: 10.0, y: 0.0), (x: 10.0, y: 10.0), (x: 0.0, y: 10.0), (x: 0.0, y: 0.0)];
        let rect = |x0: f64, x1: f64| line_string![(x: x0, y: 2.0), (x: x1, y: 2.0), (x: x1, y: 4.0), (x: x0, y: 4.0), (x: x0, y: 2.0)];

        // Mostly outside: 100 - 4 overlap + 8 outside.
        let outside = Polygon::new(shell.clone(), vec![rect(8.0, 14.0)]);
        let repaired = repair(&Shape::Polygon(outside), &RepairOptions::default());
        assert_relative_eq!(repaired.shape().unwrap().to_multi_polygon().unsigned_area(), 104.0, max_relative = 1e-9);

        // Mostly inside: 100 - 8 overlap + 2 outside.
        let inside = Polygon::new(shell, vec![rect(6.0, 11.0)]);
        let repaired = repair(&Shape::Polygon(inside), &RepairOptions::default());
        assert_relative_eq!(repaired.shape().unwrap().to_multi_polygon().unsigned_area(), 94.0, max_relative = 1e-9);
    }

    #[test]
    fn exterior_orientation_is_normalized() {
        let clockwise = polygon![(x: 0.0, y: 0.0), (x: 0.0, y: 1.0), (x: 1.0, y: 1.0), (x: 1.0, y: 0.0), (x: 0.0, y: 0.0)];
        let Repaired::Valid(Shape::Polygon(repaired)) = repair(&Shape::Polygon(clockwise), &RepairOptions::default())
        else { panic!("expected a single polygon") };
        assert!(signed_area(&repaired.exterior().0) > 0.0);
    }

    #[test]
    fn sliver_epsilon_scales_with_extent() {
        let small = Rect::new((0.0, 0.0), (3.0, 4.0));
        let large = Rect::new((0.0, 0.0), (300.0, 400.0));
        assert_relative_eq!(sliver_epsilon(small, 1e-10), 25.0 * 1e-10);
        assert_relative_eq!(sliver_epsilon(large, 1e-10), 1e4 * sliver_epsilon(small, 1e-10));
    }

    #[test]
    fn drop_slivers_removes_tiny_holes() {
        let polygon = Polygon::new(
            line_string![(x: 0.0, y: 0.0), (x: 10.0, y: 0.0), (x: 10.0, y: 10.0), (x: 0.0, y: 10.0), (x: 0.0, y: 0.0)],
            vec![line_string![(x: 1.0, y: 1.0), (x: 1.0, y: 1.0 + 1e-9), (x: 1.0 + 1e-9, y: 1.0), (x: 1.0, y: 1.0)]],
        );
        let cleaned = drop_slivers(MultiPolygon::new(vec![polygon]), 1e-8);
        assert_eq!(cleaned.0.len(), 1);
        assert!(cleaned.0[0].interiors().is_empty());
    }
}
