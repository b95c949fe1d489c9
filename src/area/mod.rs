mod geodetic;
mod planar;

use std::{borrow::Cow, fmt};

use geo::{Coord, Polygon};
use log::warn;
use serde::Serialize;

use crate::{
    config::AreaConfig,
    crs::Crs,
    error::FieldError,
    geom::{Reprojector, Shape},
};

use self::geodetic::Geodetic;
pub use self::planar::PlanarTier;

/// Exact presentation-time conversion from square meters to acres.
pub const ACRES_PER_SQUARE_METER: f64 = 0.000_247_105;

/// Convert square meters to acres.
#[inline] pub fn acres(square_meters: f64) -> f64 { square_meters * ACRES_PER_SQUARE_METER }

/// How surface area is measured.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AreaModel {
    /// Integrated on the reference ellipsoid from longitude/latitude.
    #[default]
    Geodetic,
    /// Shoelace area after projecting into the planar fallback chain.
    Planar,
}

impl fmt::Display for AreaModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Geodetic => "geodetic",
            Self::Planar => "planar",
        })
    }
}

/// A non-negative area tagged with the model that produced it.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Measurement {
    pub model: AreaModel,
    pub square_meters: f64,
    /// Projection used, for planar measurements.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<PlanarTier>,
}

impl Measurement {
    #[inline] pub fn acres(&self) -> f64 { acres(self.square_meters) }
}

/// Computes hole-aware surface areas under either model.
///
/// The calculator owns its configuration, so calculators with different
/// ellipsoids or fallback chains can be used side by side.
#[derive(Clone, Debug)]
pub struct AreaCalculator {
    config: AreaConfig,
    geodetic: Geodetic,
}

impl AreaCalculator {
    pub fn new(config: AreaConfig) -> Self {
        Self { geodetic: Geodetic::new(config.ellipsoid), config }
    }

    #[inline] pub fn config(&self) -> &AreaConfig { &self.config }

    /// Authalic radius of the configured ellipsoid, in meters.
    #[inline] pub fn authalic_radius(&self) -> f64 { self.geodetic.authalic_radius() }

    /// Area of `shape`, whose coordinates are in `crs`, under `model`.
    pub fn area(&self, shape: &Shape, crs: Crs, model: AreaModel) -> Result<Measurement, FieldError> {
        match model {
            AreaModel::Geodetic => self.geodetic_area(shape, crs),
            AreaModel::Planar => self.planar_area(shape, crs),
        }
    }

    /// Ellipsoidal area. Projected input is first brought back to longitude/latitude.
    pub fn geodetic_area(&self, shape: &Shape, crs: Crs) -> Result<Measurement, FieldError> {
        let registry = &self.config.registry;
        let lonlat = if registry.is_geographic(crs) {
            Cow::Borrowed(shape)
        } else {
            let unprojected = Reprojector::new(registry, crs, Crs::WGS84)
                .and_then(|reprojector| reprojector.apply(shape));
            match unprojected {
                Ok(shape) => Cow::Owned(shape),
                Err(e) => {
                    warn!("cannot unproject {crs} for geodetic area: {e:#}");
                    return Err(FieldError::ProjectionUnavailable { crs, tried: vec![Crs::WGS84.epsg()] })
                }
            }
        };

        Ok(Measurement {
            model: AreaModel::Geodetic,
            square_meters: shape_area(&lonlat, |ring| self.geodetic.ring_area(ring)),
            tier: None,
        })
    }

    /// Projected shoelace area, using the first workable candidate of the fallback chain.
    pub fn planar_area(&self, shape: &Shape, crs: Crs) -> Result<Measurement, FieldError> {
        let (projected, tier) = planar::project(&self.config, shape, crs)?;
        Ok(Measurement {
            model: AreaModel::Planar,
            square_meters: shape_area(&projected, planar::ring_area),
            tier: Some(tier),
        })
    }
}

/// Sum of polygon areas over every polygonal member of `shape`.
fn shape_area(shape: &Shape, ring_area: impl Fn(&[Coord<f64>]) -> f64 + Copy) -> f64 {
    match shape {
        Shape::Polygon(polygon) => polygon_area(polygon, ring_area),
        Shape::MultiPolygon(mp) => mp.iter().map(|polygon| polygon_area(polygon, ring_area)).sum(),
        Shape::Collection(members) => members.iter().map(|member| shape_area(member, ring_area)).sum(),
    }
}

/// |exterior| minus the holes, clamped at zero.
fn polygon_area(polygon: &Polygon<f64>, ring_area: impl Fn(&[Coord<f64>]) -> f64) -> f64 {
    let exterior = ring_area(&polygon.exterior().0).abs();
    let holes = polygon.interiors().iter()
        .map(|ring| ring_area(&ring.0).abs())
        .sum::<f64>();
    (exterior - holes).max(0.0)
}
