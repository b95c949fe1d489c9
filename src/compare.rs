use anyhow::Result;
use geo::{Area, BooleanOps, BoundingRect, MultiPolygon, Rect};
use log::{info, warn};
use serde::Serialize;

use crate::{
    config::RepairOptions,
    crs::{Crs, CrsRegistry},
    dataset::Dataset,
    error::FieldError,
    geom::{drop_slivers, sliver_epsilon, Reprojector, Shape},
};

/// Feature-less geometry produced by set algebra. Possibly empty.
#[derive(Clone, Debug, PartialEq)]
pub struct Region {
    geometry: MultiPolygon<f64>,
    crs: Crs,
    sliver_tolerance: f64,
}

impl Region {
    /// A region using the default sliver tolerance for later set algebra.
    pub fn new(geometry: MultiPolygon<f64>, crs: Crs) -> Self {
        Self { geometry, crs, sliver_tolerance: RepairOptions::default().sliver_tolerance }
    }

    /// Same region, dropping slivers below `tolerance` (relative to the squared
    /// bounding-box diagonal) from set-algebra results.
    pub fn with_sliver_tolerance(mut self, tolerance: f64) -> Self {
        self.sliver_tolerance = tolerance;
        self
    }

    pub fn empty(crs: Crs) -> Self { Self::new(MultiPolygon::new(vec![]), crs) }

    #[inline] pub fn geometry(&self) -> &MultiPolygon<f64> { &self.geometry }

    #[inline] pub fn crs(&self) -> Crs { self.crs }

    #[inline] pub fn is_empty(&self) -> bool { self.geometry.0.is_empty() }

    #[inline] pub fn sliver_tolerance(&self) -> f64 { self.sliver_tolerance }

    /// The region as a shape, for measuring. `None` when empty.
    pub fn shape(&self) -> Option<Shape> {
        (!self.is_empty()).then(|| Shape::MultiPolygon(self.geometry.clone()))
    }

    /// Coverage of either region.
    pub fn union(&self, other: &Self) -> Self { self.combine(other, |a, b| a.union(b)) }

    /// Coverage of `self` not covered by `other`.
    pub fn difference(&self, other: &Self) -> Self { self.combine(other, |a, b| a.difference(b)) }

    /// Coverage of both regions.
    pub fn intersection(&self, other: &Self) -> Self { self.combine(other, |a, b| a.intersection(b)) }

    /// Both regions must share a CRS; slivers left by the overlay are dropped.
    fn combine(&self, other: &Self, op: impl Fn(&MultiPolygon<f64>, &MultiPolygon<f64>) -> MultiPolygon<f64>) -> Self {
        debug_assert_eq!(self.crs, other.crs, "set algebra across reference systems");
        let result = op(&self.geometry, &other.geometry);
        let tolerance = self.sliver_tolerance.max(other.sliver_tolerance);
        let eps = [self.geometry.bounding_rect(), other.geometry.bounding_rect()].into_iter()
            .flatten()
            .reduce(|a, b| Rect::new(
                (a.min().x.min(b.min().x), a.min().y.min(b.min().y)),
                (a.max().x.max(b.max().x), a.max().y.max(b.max().y)),
            ))
            .map_or(0.0, |bounds| sliver_epsilon(bounds, tolerance));
        Self::new(drop_slivers(result, eps), self.crs).with_sliver_tolerance(tolerance)
    }

    /// Reproject into `crs` through `registry`.
    pub fn to_crs(&self, registry: &CrsRegistry, crs: Crs) -> Result<Self> {
        let reprojector = Reprojector::new(registry, self.crs, crs)?;
        let geometry = match self.shape() {
            Some(shape) => reprojector.apply(&shape)?.to_multi_polygon(),
            None => MultiPolygon::new(vec![]),
        };
        Ok(Self::new(geometry, crs).with_sliver_tolerance(self.sliver_tolerance))
    }

    /// Plain planar area in CRS units, for quick checks on projected regions.
    pub fn planar_extent(&self) -> f64 { self.geometry.unsigned_area() }
}

/// Semantic label of a comparison region, with its display color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionLabel {
    OnlyInFirst,
    OnlyInSecond,
    Both,
    Either,
}

impl RegionLabel {
    pub const ALL: [Self; 4] = [Self::OnlyInFirst, Self::OnlyInSecond, Self::Both, Self::Either];

    pub fn color(&self) -> &'static str {
        match self {
            Self::OnlyInFirst => "red",
            Self::OnlyInSecond => "blue",
            Self::Both => "purple",
            Self::Either => "gray",
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            Self::OnlyInFirst => "only in first",
            Self::OnlyInSecond => "only in second",
            Self::Both => "in both",
            Self::Either => "in either",
        }
    }
}

/// Set-algebra relationships between two datasets, computed from the
/// visibility state at construction time.
#[derive(Clone, Debug)]
pub struct Comparison {
    first: Region,
    second: Region,
    only_first: Region,
    only_second: Region,
    both: Region,
    either: Region,
}

impl Comparison {
    /// Re-union both datasets and derive the comparison regions. The second
    /// dataset is moved into the first one's CRS when they differ.
    pub fn new(first: &Dataset, second: &Dataset, registry: &CrsRegistry) -> Result<Self, FieldError> {
        let a = first.union();
        let b = match second.union() {
            region if region.crs() == a.crs() => region,
            region => region.to_crs(registry, a.crs()).map_err(|e| {
                warn!("cannot compare {} with {}: {e:#}", second.name(), first.name());
                FieldError::ProjectionUnavailable { crs: region.crs(), tried: vec![a.crs().epsg()] }
            })?,
        };

        let comparison = Self {
            only_first: a.difference(&b),
            only_second: b.difference(&a),
            both: a.intersection(&b),
            either: a.union(&b),
            first: a,
            second: b,
        };

        for label in RegionLabel::ALL {
            if comparison.region(label).is_empty() {
                info!("{} vs {}: {}", first.name(), second.name(), FieldError::DegenerateResult(label.describe().into()));
            }
        }
        Ok(comparison)
    }

    #[inline] pub fn first(&self) -> &Region { &self.first }

    #[inline] pub fn second(&self) -> &Region { &self.second }

    pub fn region(&self, label: RegionLabel) -> &Region {
        match label {
            RegionLabel::OnlyInFirst => &self.only_first,
            RegionLabel::OnlyInSecond => &self.only_second,
            RegionLabel::Both => &self.both,
            RegionLabel::Either => &self.either,
        }
    }

    /// Labelled regions in display order.
    pub fn regions(&self) -> impl Iterator<Item = (RegionLabel, &Region)> {
        RegionLabel::ALL.into_iter().map(|label| (label, self.region(label)))
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use geo::polygon;

    use super::*;

    fn square(x: f64, size: f64) -> Region {
        let polygon = polygon![(x: x, y: 0.0), (x: x + size, y: 0.0), (x: x + size, y: size), (x: x, y: size), (x: x, y: 0.0)];
        Region::new(MultiPolygon::new(vec![polygon]), Crs::WORLD_EQUAL_AREA)
    }

    #[test]
    fn overlapping_squares() {
        let (a, b) = (square(0.0, 10.0), square(5.0, 10.0));
        assert_relative_eq!(a.intersection(&b).planar_extent(), 50.0, max_relative = 1e-9);
        assert_relative_eq!(a.difference(&b).planar_extent(), 50.0, max_relative = 1e-9);
        assert_relative_eq!(b.difference(&a).planar_extent(), 50.0, max_relative = 1e-9);
        assert_relative_eq!(a.union(&b).planar_extent(), 150.0, max_relative = 1e-9);
    }

    #[test]
    fn identical_regions_have_empty_difference() {
        let a = square(0.0, 10.0);
        assert!(a.difference(&a.clone()).is_empty());
        assert!(a.difference(&a).shape().is_none());
    }

    #[test]
    fn empty_region_is_neutral() {
        let a = square(0.0, 10.0);
        let empty = Region::empty(Crs::WORLD_EQUAL_AREA);
        assert_relative_eq!(a.union(&empty).planar_extent(), 100.0);
        assert!(a.intersection(&empty).is_empty());
        assert_relative_eq!(a.difference(&empty).planar_extent(), 100.0);
    }

    #[test]
    fn configured_tolerance_drops_overlay_slivers() {
        // A 100 m square against one overhanging it by 5 m².
        let a = square(0.0, 100.0);
        let overhang = polygon![(x: 0.0, y: 0.0), (x: 100.05, y: 0.0), (x: 100.05, y: 100.0), (x: 0.0, y: 100.0), (x: 0.0, y: 0.0)];
        let b = Region::new(MultiPolygon::new(vec![overhang]), Crs::WORLD_EQUAL_AREA);

        assert_relative_eq!(b.difference(&a).planar_extent(), 5.0, max_relative = 1e-6);

        let (a, b) = (a.with_sliver_tolerance(1e-3), b.with_sliver_tolerance(1e-3));
        assert!(b.difference(&a).is_empty());
        assert_eq!(a.intersection(&b).sliver_tolerance(), 1e-3);
    }

    #[test]
    fn comparison_uses_dataset_tolerance() {
        use geo::Geometry;

        use crate::dataset::Source;

        let field = polygon![(x: 0.0, y: 0.0), (x: 100.0, y: 0.0), (x: 100.0, y: 100.0), (x: 0.0, y: 100.0), (x: 0.0, y: 0.0)];
        let overhang = polygon![(x: 0.0, y: 0.0), (x: 100.05, y: 0.0), (x: 100.05, y: 100.0), (x: 0.0, y: 100.0), (x: 0.0, y: 0.0)];
        let options = RepairOptions { sliver_tolerance: 1e-3 };
        let first = Dataset::from_source(0, Source::new("a", Crs::WORLD_EQUAL_AREA, vec![Geometry::Polygon(field)]), &options);
        let second = Dataset::from_source(1, Source::new("b", Crs::WORLD_EQUAL_AREA, vec![Geometry::Polygon(overhang)]), &options);

        let comparison = Comparison::new(&first, &second, &CrsRegistry::default()).unwrap();
        assert!(comparison.region(RegionLabel::OnlyInSecond).is_empty());
        assert!(comparison.region(RegionLabel::OnlyInFirst).is_empty());
    }

    #[test]
    fn labels_carry_colors() {
        assert_eq!(RegionLabel::OnlyInFirst.color(), "red");
        assert_eq!(RegionLabel::OnlyInSecond.color(), "blue");
        assert_eq!(serde_json::to_string(&RegionLabel::OnlyInSecond).unwrap(), "\"only_in_second\"");
    }
}
