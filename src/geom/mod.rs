mod algorithm;
mod bbox;
mod geom;
mod ring;
mod shape;

use bbox::BoundingBox;
pub use algorithm::repair::{repair, Repaired};
pub(crate) use algorithm::proj::Reprojector;
pub(crate) use algorithm::repair::{drop_slivers, sliver_epsilon};
pub(crate) use geom::Geometries;
pub(crate) use ring::{distinct_vertices, ensure_closed, signed_area};
pub use shape::{Shape, ShapeKind};
