use std::{fmt, sync::Arc};

use geo::Geometry;
use log::{debug, info, warn};
use serde::{Serialize, Serializer};

use crate::{
    area::{AreaCalculator, AreaModel, Measurement},
    compare::Region,
    config::RepairOptions,
    crs::Crs,
    error::FieldError,
    geom::{repair, Geometries, Repaired, Shape, ShapeKind},
};

/// Raw geometries of one uploaded source, as produced by a format reader.
#[derive(Clone, Debug)]
pub struct Source {
    pub name: String,
    pub crs: Crs,
    pub geometries: Vec<Geometry<f64>>,
}

impl Source {
    pub fn new(name: impl Into<String>, crs: Crs, geometries: Vec<Geometry<f64>>) -> Self {
        Self { name: name.into(), crs, geometries }
    }
}

/// Identifier of a feature, unique within its dataset and stable across runs
/// over the same files. Displayed 1-based as `file-part`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FeatureId {
    pub file: usize,
    pub part: usize,
}

impl fmt::Display for FeatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.file + 1, self.part + 1)
    }
}

impl Serialize for FeatureId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One single-part input record after repair.
#[derive(Clone, Debug)]
pub struct Feature {
    id: FeatureId,
    source: Arc<str>,
    origin: ShapeKind,
    geometry: Repaired,
    geodetic: Option<Measurement>,
    planar: Option<Measurement>,
    visible: bool,
}

impl Feature {
    #[inline] pub fn id(&self) -> FeatureId { self.id }

    #[inline] pub fn source(&self) -> &str { &self.source }

    /// Classification of the repaired geometry, falling back to the input kind when empty.
    pub fn kind(&self) -> ShapeKind {
        self.geometry.shape().map_or(self.origin, Shape::kind)
    }

    #[inline] pub fn geometry(&self) -> &Repaired { &self.geometry }

    /// Number of polygon parts after repair.
    pub fn parts(&self) -> usize { self.geometry.shape().map_or(0, Shape::num_parts) }

    /// Number of holes after repair.
    pub fn holes(&self) -> usize { self.geometry.shape().map_or(0, Shape::num_holes) }

    #[inline] pub fn is_visible(&self) -> bool { self.visible }

    #[inline] pub fn set_visible(&mut self, visible: bool) { self.visible = visible }

    /// Area under `model`, if it has been measured.
    pub fn area(&self, model: AreaModel) -> Option<Measurement> {
        match model {
            AreaModel::Geodetic => self.geodetic,
            AreaModel::Planar => self.planar,
        }
    }

    fn set_area(&mut self, measurement: Measurement) {
        match measurement.model {
            AreaModel::Geodetic => self.geodetic = Some(measurement),
            AreaModel::Planar => self.planar = Some(measurement),
        }
    }
}

/// The normalized features of one source sharing one declared CRS.
#[derive(Debug)]
pub struct Dataset {
    index: usize,
    name: Arc<str>,
    crs: Crs,
    features: Vec<Feature>,
    warnings: Vec<FieldError>,
    repair: RepairOptions,
}

impl Dataset {
    /// Explode and repair every record of `source`. `index` is the position
    /// of the source among the uploaded files.
    pub fn from_source(index: usize, source: Source, options: &RepairOptions) -> Self {
        let name: Arc<str> = source.name.into();
        let mut warnings = Vec::new();

        let features = source.geometries.into_iter()
            .filter_map(Shape::from_geometry)
            .flat_map(|shape| {
                let origin = shape.kind();
                shape.explode().into_iter().map(move |polygon| (origin, polygon))
            })
            .enumerate()
            .map(|(part, (origin, polygon))| {
                let id = FeatureId { file: index, part };
                let geometry = repair(&Shape::Polygon(polygon), options);
                if geometry.is_empty() {
                    warn!("{name}: feature {id} has no positive-area ring after repair");
                    warnings.push(FieldError::RepairFailure(id.to_string()));
                }
                Feature { id, source: name.clone(), origin, geometry, geodetic: None, planar: None, visible: true }
            })
            .collect::<Vec<_>>();

        info!("{name}: {} feature(s) loaded in {}", features.len(), source.crs);
        Self { index, name, crs: source.crs, features, warnings, repair: *options }
    }

    #[inline] pub fn index(&self) -> usize { self.index }

    #[inline] pub fn name(&self) -> &str { &self.name }

    #[inline] pub fn crs(&self) -> Crs { self.crs }

    #[inline] pub fn len(&self) -> usize { self.features.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.features.is_empty() }

    #[inline] pub fn features(&self) -> &[Feature] { &self.features }

    /// Recoverable problems met while building or measuring this dataset.
    #[inline] pub fn warnings(&self) -> &[FieldError] { &self.warnings }

    /// Look up a feature by id.
    pub fn feature(&self, id: FeatureId) -> Option<&Feature> {
        self.features.iter().find(|feature| feature.id == id)
    }

    /// Toggle a feature's visibility; returns false if no such feature exists.
    pub fn set_visible(&mut self, id: FeatureId, visible: bool) -> bool {
        self.features.iter_mut()
            .find(|feature| feature.id == id)
            .map(|feature| feature.set_visible(visible))
            .is_some()
    }

    /// Measure every feature under `model`.
    ///
    /// Features emptied by repair measure 0. A feature whose projection is
    /// unavailable keeps no area for this model and the failure is recorded.
    pub fn measure(&mut self, calculator: &AreaCalculator, model: AreaModel) {
        for feature in &mut self.features {
            let measured = match feature.geometry.shape() {
                Some(shape) => calculator.area(shape, self.crs, model),
                None => Ok(Measurement { model, square_meters: 0.0, tier: None }),
            };
            match measured {
                Ok(measurement) => feature.set_area(measurement),
                Err(e) => {
                    warn!("{}: feature {}: {e}", self.name, feature.id);
                    self.warnings.push(e);
                }
            }
        }
    }

    /// Sum of the measured areas of visible features, in m².
    pub fn total_area(&self, model: AreaModel) -> f64 {
        self.features.iter()
            .filter(|feature| feature.visible)
            .filter_map(|feature| feature.area(model))
            .map(|measurement| measurement.square_meters)
            .sum()
    }

    /// Dissolve the currently visible, non-empty features into one region.
    pub fn union(&self) -> Region {
        let shapes = self.features.iter()
            .filter(|feature| feature.visible)
            .filter_map(|feature| feature.geometry.shape());
        let geoms = Geometries::new(shapes, self.crs);
        debug!("{}: dissolving {} visible shape(s)", self.name, geoms.len());
        Region::new(geoms.union(self.repair.sliver_tolerance), geoms.crs())
            .with_sliver_tolerance(self.repair.sliver_tolerance)
    }
}
