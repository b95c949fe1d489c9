use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::{
    area::{acres, AreaCalculator, AreaModel, PlanarTier},
    compare::{Comparison, RegionLabel},
    dataset::{Dataset, Feature, FeatureId},
    error::{ErrorKind, FieldError},
    geom::ShapeKind,
    io::feature_collection,
};

/// Round to 2 decimals for presentation.
#[inline] pub fn round2(value: f64) -> f64 { (value * 100.0).round() / 100.0 }

/// One row of the per-dataset feature table.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FeatureRow {
    pub id: FeatureId,
    pub source: String,
    pub kind: ShapeKind,
    pub parts: usize,
    pub holes: usize,
    /// `None` when the area could not be measured under `model`.
    pub area_m2: Option<f64>,
    pub area_acres: Option<f64>,
    pub model: AreaModel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<PlanarTier>,
    pub visible: bool,
}

impl FeatureRow {
    pub fn new(feature: &Feature, model: AreaModel) -> Self {
        let measurement = feature.area(model);
        Self {
            id: feature.id(),
            source: feature.source().to_string(),
            kind: feature.kind(),
            parts: feature.parts(),
            holes: feature.holes(),
            area_m2: measurement.map(|m| round2(m.square_meters)),
            area_acres: measurement.map(|m| round2(m.acres())),
            model,
            tier: measurement.and_then(|m| m.tier),
            visible: feature.is_visible(),
        }
    }

    /// Hover text for map renderers.
    pub fn tooltip(&self) -> String {
        match (self.area_acres, self.area_m2) {
            (Some(acres), Some(m2)) => format!("{}\n{acres:.2} acres\n{m2:.2} m²", self.id),
            _ => format!("{}\narea unavailable", self.id),
        }
    }
}

/// Rows for every feature of `dataset`.
pub fn feature_rows(dataset: &Dataset, model: AreaModel) -> Vec<FeatureRow> {
    dataset.features().iter().map(|feature| FeatureRow::new(feature, model)).collect()
}

/// Area of one comparison region.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RegionRow {
    pub label: RegionLabel,
    pub color: &'static str,
    pub area_m2: Option<f64>,
    pub area_acres: Option<f64>,
    pub empty: bool,
}

/// Measure every region of `comparison` with `calculator`.
/// Empty regions measure 0; regions whose projection fails carry no area.
pub fn region_rows(comparison: &Comparison, calculator: &AreaCalculator, model: AreaModel) -> Vec<RegionRow> {
    comparison.regions()
        .map(|(label, region)| {
            let square_meters = match region.shape() {
                Some(shape) => calculator.area(&shape, region.crs(), model)
                    .map(|m| m.square_meters)
                    .ok(),
                None => Some(0.0),
            };
            RegionRow {
                label,
                color: label.color(),
                area_m2: square_meters.map(round2),
                area_acres: square_meters.map(|m2| round2(acres(m2))),
                empty: region.is_empty(),
            }
        })
        .collect()
}

/// Acres of two datasets at the same feature position.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SideBySideRow {
    pub index: usize,
    pub first: Option<f64>,
    pub second: Option<f64>,
    pub difference: Option<f64>,
}

/// A failed source, for run summaries.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FailureRow {
    pub source: String,
    pub kind: ErrorKind,
    pub message: String,
}

impl FailureRow {
    pub fn new(source: &str, error: &FieldError) -> Self {
        Self { source: source.to_string(), kind: error.kind(), message: error.to_string() }
    }
}

/// Visible features of `dataset` as a GeoJSON FeatureCollection, with their rows as properties.
pub fn dataset_geojson(dataset: &Dataset, model: AreaModel) -> Value {
    let polygons = dataset.features().iter()
        .filter(|feature| feature.is_visible())
        .filter_map(|feature| {
            let mp = feature.geometry().shape()?.to_multi_polygon();
            Some((mp, properties(&FeatureRow::new(feature, model))))
        })
        .collect::<Vec<_>>();
    feature_collection(polygons.iter().map(|(mp, props)| (mp, props.clone())))
}

/// Non-empty regions of `comparison` as a GeoJSON FeatureCollection.
pub fn comparison_geojson(comparison: &Comparison, labels: &[RegionLabel]) -> Value {
    feature_collection(
        labels.iter()
            .map(|&label| (label, comparison.region(label)))
            .filter(|(_, region)| !region.is_empty())
            .map(|(label, region)| {
                let mut props = Map::new();
                props.insert("label".into(), json!(label));
                props.insert("color".into(), json!(label.color()));
                props.insert("crs".into(), json!(region.crs().to_string()));
                (region.geometry(), props)
            }),
    )
}

fn properties(row: &FeatureRow) -> Map<String, Value> {
    let mut props = match serde_json::to_value(row) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    };
    props.insert("tooltip".into(), json!(row.tooltip()));
    props
}
