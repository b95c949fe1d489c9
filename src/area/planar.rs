use log::{debug, warn};
use serde::Serialize;

use crate::{
    config::AreaConfig,
    crs::Crs,
    error::FieldError,
    geom::{distinct_vertices, signed_area, Reprojector, Shape},
};

/// Which candidate of the planar fallback chain produced a measurement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct PlanarTier {
    pub crs: Crs,
    /// Position in the fallback chain, 0 being the preferred projection.
    pub rank: usize,
    /// False for last-resort projections whose areas are only approximate.
    pub equal_area: bool,
}

/// Signed shoelace area of a projected ring. Rings with fewer than 3
/// distinct vertices have no area.
pub(crate) fn ring_area(ring: &[geo::Coord<f64>]) -> f64 {
    if distinct_vertices(ring) < 3 { return 0.0 }
    signed_area(ring)
}

/// Project `shape` from `crs` into the first usable candidate of the
/// configured fallback chain.
pub(crate) fn project(config: &AreaConfig, shape: &Shape, crs: Crs) -> Result<(Shape, PlanarTier), FieldError> {
    let registry = &config.registry;

    for (rank, &candidate) in config.fallback.iter().enumerate() {
        if crs != candidate && !registry.contains(candidate) {
            debug!("{candidate} is not defined, trying the next planar candidate");
            continue;
        }

        let projected = Reprojector::new(registry, crs, candidate)
            .and_then(|reprojector| {
                if reprojector.is_identity() { debug!("{crs} is already a planar candidate") }
                reprojector.apply(shape)
            });
        match projected {
            Ok(projected) => {
                let tier = PlanarTier { crs: candidate, rank, equal_area: registry.is_equal_area(candidate) };
                if !tier.equal_area {
                    warn!("planar area uses {candidate}, which is not equal-area; figures are approximate");
                }
                return Ok((projected, tier))
            }
            Err(e) => debug!("projection {crs} -> {candidate} failed: {e:#}"),
        }
    }

    warn!("no planar projection available for {crs}");
    Err(FieldError::ProjectionUnavailable {
        crs,
        tried: config.fallback.iter().map(Crs::epsg).collect(),
    })
}
