use geo::{BoundingRect, Coord, Geometry, MapCoords, MultiPolygon, Polygon, Rect};
use serde::Serialize;

/// Geometry classification reported to consumers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Polygon,
    MultiPolygon,
    Collection,
}

/// Polygonal geometry of a single record.
///
/// Only polygonal geometry is representable; conversion from a
/// [`geo::Geometry`] drops points and lines, so every match over `Shape` is
/// exhaustive over the kinds that carry area.
#[derive(Clone, Debug, PartialEq)]
pub enum Shape {
    Polygon(Polygon<f64>),
    MultiPolygon(MultiPolygon<f64>),
    /// Polygonal members of a heterogeneous collection.
    Collection(Vec<Shape>),
}

impl Shape {
    /// Convert an arbitrary geometry, keeping only its polygonal parts.
    /// Returns `None` when nothing polygonal remains.
    pub fn from_geometry(geometry: Geometry<f64>) -> Option<Self> {
        match geometry {
            Geometry::Polygon(polygon) => Some(Self::Polygon(polygon)),
            Geometry::MultiPolygon(mp) => Some(Self::MultiPolygon(mp)),
            Geometry::Rect(rect) => Some(Self::Polygon(rect.to_polygon())),
            Geometry::Triangle(triangle) => Some(Self::Polygon(triangle.to_polygon())),
            Geometry::GeometryCollection(collection) => {
                let parts = collection.0.into_iter()
                    .filter_map(Self::from_geometry)
                    .collect::<Vec<_>>();
                (!parts.is_empty()).then_some(Self::Collection(parts))
            }
            Geometry::Point(_)
            | Geometry::Line(_)
            | Geometry::LineString(_)
            | Geometry::MultiPoint(_)
            | Geometry::MultiLineString(_) => None,
        }
    }

    /// Build the tightest shape for a list of polygons.
    pub fn from_polygons(mut polygons: Vec<Polygon<f64>>) -> Self {
        if polygons.len() == 1 {
            Self::Polygon(polygons.remove(0))
        } else {
            Self::MultiPolygon(MultiPolygon::new(polygons))
        }
    }

    pub fn kind(&self) -> ShapeKind {
        match self {
            Self::Polygon(_) => ShapeKind::Polygon,
            Self::MultiPolygon(_) => ShapeKind::MultiPolygon,
            Self::Collection(_) => ShapeKind::Collection,
        }
    }

    /// All polygons of this shape, flattening nested collections.
    pub fn polygons(&self) -> Vec<&Polygon<f64>> {
        match self {
            Self::Polygon(polygon) => vec![polygon],
            Self::MultiPolygon(mp) => mp.0.iter().collect(),
            Self::Collection(parts) => parts.iter().flat_map(|part| part.polygons()).collect(),
        }
    }

    /// Explode into single-part polygons.
    pub fn explode(self) -> Vec<Polygon<f64>> {
        match self {
            Self::Polygon(polygon) => vec![polygon],
            Self::MultiPolygon(mp) => mp.0,
            Self::Collection(parts) => parts.into_iter().flat_map(Self::explode).collect(),
        }
    }

    /// Number of polygon parts.
    #[inline] pub fn num_parts(&self) -> usize { self.polygons().len() }

    /// Number of interior rings over all parts.
    pub fn num_holes(&self) -> usize {
        self.polygons().iter().map(|polygon| polygon.interiors().len()).sum()
    }

    /// Copy into a single MultiPolygon.
    pub fn to_multi_polygon(&self) -> MultiPolygon<f64> {
        MultiPolygon::new(self.polygons().into_iter().cloned().collect())
    }

    /// Bounding rectangle of all parts, `None` for a shape without coordinates.
    pub fn bounds(&self) -> Option<Rect<f64>> {
        self.polygons().into_iter()
            .filter_map(|polygon| polygon.bounding_rect())
            .reduce(|a, b| Rect::new(
                Coord { x: a.min().x.min(b.min().x), y: a.min().y.min(b.min().y) },
                Coord { x: a.max().x.max(b.max().x), y: a.max().y.max(b.max().y) },
            ))
    }

    /// Apply a fallible coordinate transform to every vertex, keeping the structure.
    pub fn try_map_coords<E>(
        &self,
        func: impl Fn(Coord<f64>) -> Result<Coord<f64>, E> + Copy,
    ) -> Result<Self, E> {
        Ok(match self {
            Self::Polygon(polygon) => Self::Polygon(polygon.try_map_coords(func)?),
            Self::MultiPolygon(mp) => Self::MultiPolygon(mp.try_map_coords(func)?),
            Self::Collection(parts) => Self::Collection(
                parts.iter()
                    .map(|part| part.try_map_coords(func))
                    .collect::<Result<Vec<_>, E>>()?
            ),
        })
    }
}

impl From<Polygon<f64>> for Shape {
    fn from(polygon: Polygon<f64>) -> Self { Self::Polygon(polygon) }
}

impl From<MultiPolygon<f64>> for Shape {
    fn from(mp: MultiPolygon<f64>) -> Self { Self::MultiPolygon(mp) }
}
