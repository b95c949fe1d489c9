#![doc = "Field-boundary comparison: repair, area and set algebra over polygon datasets"]
mod area;
mod compare;
mod config;
mod crs;
mod dataset;
mod error;
mod geom;
mod session;

pub mod io;
pub mod report;

#[doc(inline)]
pub use area::{acres, AreaCalculator, AreaModel, Measurement, PlanarTier, ACRES_PER_SQUARE_METER};

#[doc(inline)]
pub use compare::{Comparison, Region, RegionLabel};

#[doc(inline)]
pub use config::{AreaConfig, Ellipsoid, RepairOptions};

#[doc(inline)]
pub use crs::{Crs, CrsRegistry};

#[doc(inline)]
pub use dataset::{Dataset, Feature, FeatureId, Source};

#[doc(inline)]
pub use error::{ErrorKind, FieldError};

#[doc(inline)]
pub use geom::{repair, Repaired, Shape, ShapeKind};

#[doc(inline)]
pub use session::{RunReport, Session, SourceOutcome};
