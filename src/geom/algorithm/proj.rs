use anyhow::{anyhow, bail, Context, Result};
use geo::Coord;
use proj4rs::{proj::Proj as Proj4, transform::transform};

use crate::{
    crs::{Crs, CrsRegistry},
    geom::Shape,
};

/// Moves shapes between two coordinate systems of a registry.
/// Geographic coordinates are degrees on both ends (radians only inside PROJ).
pub(crate) struct Reprojector {
    projs: Option<(Proj4, Proj4)>, // None when source and target coincide
    from_geographic: bool,
    to_geographic: bool,
}

impl Reprojector {
    /// Build a reprojector from `from` to `to`, failing if either is undefined.
    pub(crate) fn new(registry: &CrsRegistry, from: Crs, to: Crs) -> Result<Self> {
        if from == to {
            return Ok(Self { projs: None, from_geographic: false, to_geographic: false })
        }

        let build = |crs: Crs| -> Result<Proj4> {
            let proj_string = registry.definition(crs)
                .ok_or_else(|| anyhow!("{crs} is not defined in the reference-system registry"))?;
            Proj4::from_proj_string(&proj_string)
                .with_context(|| anyhow!("failed to build PROJ.4 for {crs}: {proj_string}"))
        };

        Ok(Self {
            projs: Some((build(from)?, build(to)?)),
            from_geographic: registry.is_geographic(from),
            to_geographic: registry.is_geographic(to),
        })
    }

    /// Whether this reprojector leaves coordinates untouched.
    #[inline] pub(crate) fn is_identity(&self) -> bool { self.projs.is_none() }

    /// Reproject every vertex of `shape`.
    pub(crate) fn apply(&self, shape: &Shape) -> Result<Shape> {
        let Some((from, to)) = &self.projs else { return Ok(shape.clone()) };

        shape.try_map_coords(|coord: Coord<f64>| {
            let mut point = if self.from_geographic {
                (coord.x.to_radians(), coord.y.to_radians(), 0.0)
            } else {
                (coord.x, coord.y, 0.0)
            };
            transform(from, to, &mut point)
                .map_err(|e| anyhow!("CRS transform failed at ({}, {}): {e}", coord.x, coord.y))?;

            let projected = if self.to_geographic {
                Coord { x: point.0.to_degrees(), y: point.1.to_degrees() }
            } else {
                Coord { x: point.0, y: point.1 }
            };
            if !(projected.x.is_finite() && projected.y.is_finite()) {
                bail!("CRS transform produced a non-finite coordinate at ({}, {})", coord.x, coord.y)
            }
            Ok(projected)
        })
    }
}
