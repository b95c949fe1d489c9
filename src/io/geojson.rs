use anyhow::{Context, Result};
use geo::{Geometry, MultiPolygon};
use geojson::GeoJson;
use log::debug;
use serde_json::{json, Map, Value};

/// Read every geometry of a GeoJSON document, skipping features without one.
pub(crate) fn read_geojson(text: &str) -> Result<Vec<Geometry<f64>>> {
    let document: GeoJson = text.parse().context("Failed to parse GeoJSON")?;
    let geometries = match document {
        GeoJson::FeatureCollection(fc) => fc.features.into_iter().filter_map(|f| f.geometry).collect(),
        GeoJson::Feature(f) => f.geometry.into_iter().collect(),
        GeoJson::Geometry(g) => vec![g],
    };

    let converted = geometries.into_iter()
        .map(|geometry| Geometry::<f64>::try_from(geometry).context("Failed to convert GeoJSON geometry"))
        .collect::<Result<Vec<_>>>()?;
    debug!("read {} GeoJSON geometries", converted.len());
    Ok(converted)
}

/// Convert a MultiPolygon into a GeoJSON geometry object (RFC 7946 ring layout).
pub(crate) fn multipolygon_to_geojson(mp: &MultiPolygon<f64>) -> Value {
    let polygons = mp.0.iter()
        .map(|polygon| {
            std::iter::once(polygon.exterior())
                .chain(polygon.interiors())
                .map(|ring| ring.coords().map(|c| vec![c.x, c.y]).collect::<Vec<_>>())
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();

    json!({
        "type": "MultiPolygon",
        "coordinates": polygons,
    })
}

/// Assemble a FeatureCollection from geometries and their properties.
pub fn feature_collection<'a>(items: impl IntoIterator<Item = (&'a MultiPolygon<f64>, Map<String, Value>)>) -> Value {
    let features = items.into_iter()
        .map(|(mp, properties)| json!({
            "type": "Feature",
            "geometry": multipolygon_to_geojson(mp),
            "properties": properties,
        }))
        .collect::<Vec<_>>();

    json!({
        "type": "FeatureCollection",
        "features": features,
    })
}
