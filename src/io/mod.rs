//! Readers producing raw [`Source`]s from boundary files, and GeoJSON export.
//!
//! # Format Modules
//!
//! - `shp` - zipped ESRI shapefile, with `.prj` reference-system detection
//! - `kml` - KML documents, plain or inside a KMZ archive
//! - `geojson` - GeoJSON reading (RFC 7946, always WGS84) and FeatureCollection export
//! - `fs` - archive extraction and file lookup helpers

mod fs;
mod geojson;
mod kml;
mod shp;

use std::{fmt, path::Path};

use anyhow::Context;
use log::info;

use crate::{crs::Crs, dataset::Source, error::FieldError};

pub use self::geojson::feature_collection;

/// Supported boundary file formats, detected from the file extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SourceFormat {
    ZippedShapefile,
    Kmz,
    Kml,
    GeoJson,
}

impl SourceFormat {
    /// Detect the format of `path` by its (case-insensitive) extension.
    pub fn from_path(path: &Path) -> Result<Self, FieldError> {
        let ext = path.extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "zip" => Ok(Self::ZippedShapefile),
            "kmz" => Ok(Self::Kmz),
            "kml" => Ok(Self::Kml),
            "geojson" | "json" => Ok(Self::GeoJson),
            _ => Err(FieldError::UnsupportedFormat(display_name(path))),
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ZippedShapefile => "zipped shapefile",
            Self::Kmz => "KMZ",
            Self::Kml => "KML",
            Self::GeoJson => "GeoJSON",
        })
    }
}

/// File name of `path`, used as the source's display name.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |name| name.to_string_lossy().into_owned())
}

/// Read the boundary file at `path` into a raw source.
pub fn read_source(path: &Path) -> Result<Source, FieldError> {
    let name = display_name(path);
    let format = SourceFormat::from_path(path)?;
    info!("reading {name} as {format}");

    let (crs, geometries) = match format {
        SourceFormat::ZippedShapefile => {
            let dir = tempfile::tempdir().map_err(|e| FieldError::read(&name, e.into()))?;
            fs::extract_zip(path, dir.path()).map_err(|e| FieldError::read(&name, e))?;
            let shp_path = fs::find_with_extension(dir.path(), "shp")
                .ok_or_else(|| FieldError::MalformedContainer { name: name.clone(), expected: ".shp" })?;
            let geometries = shp::read_shapefile(&shp_path).map_err(|e| FieldError::read(&name, e))?;
            let crs = shp::read_prj(&shp_path).map_err(|e| FieldError::read(&name, e))?;
            (crs, geometries)
        }
        SourceFormat::Kmz => {
            let text = fs::read_zip_entry(path, "kml")
                .map_err(|e| FieldError::read(&name, e))?
                .ok_or_else(|| FieldError::MalformedContainer { name: name.clone(), expected: ".kml" })?;
            (Crs::WGS84, kml::read_kml(&text).map_err(|e| FieldError::read(&name, e))?)
        }
        SourceFormat::Kml => {
            let geometries = read_text(path)
                .and_then(|text| kml::read_kml(&text))
                .map_err(|e| FieldError::read(&name, e))?;
            (Crs::WGS84, geometries)
        }
        SourceFormat::GeoJson => {
            let geometries = read_text(path)
                .and_then(|text| geojson::read_geojson(&text))
                .map_err(|e| FieldError::read(&name, e))?;
            (Crs::WGS84, geometries)
        }
    };

    Ok(Source::new(name, crs, geometries))
}

fn read_text(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}
