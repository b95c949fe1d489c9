use std::{fs, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::crs::{Crs, CrsRegistry};

/// Reference ellipsoid used by the geodetic area model.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ellipsoid {
    /// Semi-major axis in meters.
    pub semi_major: f64,
    /// Flattening `(a - b) / a`.
    pub flattening: f64,
}

impl Ellipsoid {
    pub const WGS84: Self = Self { semi_major: 6_378_137.0, flattening: 1.0 / 298.257_223_563 };
    pub const GRS80: Self = Self { semi_major: 6_378_137.0, flattening: 1.0 / 298.257_222_101 };

    /// A sphere of the given radius.
    pub const fn sphere(radius: f64) -> Self { Self { semi_major: radius, flattening: 0.0 } }

    /// First eccentricity squared.
    #[inline] pub fn e2(&self) -> f64 { self.flattening * (2.0 - self.flattening) }
}

impl Default for Ellipsoid {
    fn default() -> Self { Self::WGS84 }
}

/// Tolerances used by validity repair.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepairOptions {
    /// Rings whose area is below this fraction of the squared bounding-box
    /// diagonal are dropped as slivers.
    pub sliver_tolerance: f64,
}

impl Default for RepairOptions {
    fn default() -> Self { Self { sliver_tolerance: 1e-10 } }
}

/// Immutable configuration handed to the area calculator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AreaConfig {
    pub ellipsoid: Ellipsoid,
    /// Planar fallback chain, tried in order.
    pub fallback: Vec<Crs>,
    pub registry: CrsRegistry,
    pub repair: RepairOptions,
}

impl Default for AreaConfig {
    fn default() -> Self {
        Self {
            ellipsoid: Ellipsoid::WGS84,
            fallback: vec![Crs::WORLD_EQUAL_AREA, Crs::CONUS_ALBERS, Crs::WEB_MERCATOR],
            registry: CrsRegistry::default(),
            repair: RepairOptions::default(),
        }
    }
}

impl AreaConfig {
    /// Load a configuration from a JSON file. Missing fields keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Same configuration with a different ellipsoid.
    pub fn with_ellipsoid(mut self, ellipsoid: Ellipsoid) -> Self {
        self.ellipsoid = ellipsoid;
        self
    }

    /// Same configuration with `crs` removed from the registry.
    pub fn without_crs(mut self, crs: Crs) -> Self {
        self.registry.remove(crs);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_chain_order() {
        let config = AreaConfig::default();
        assert_eq!(config.fallback, vec![Crs(6933), Crs(5070), Crs(3857)]);
        assert_eq!(config.ellipsoid, Ellipsoid::WGS84);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config: AreaConfig = serde_json::from_str(r#"{ "fallback": [5070] }"#).unwrap();
        assert_eq!(config.fallback, vec![Crs::CONUS_ALBERS]);
        assert_eq!(config.registry, CrsRegistry::default());
        assert_eq!(config.repair, RepairOptions::default());
    }

    #[test]
    fn sphere_has_no_eccentricity() {
        assert_eq!(Ellipsoid::sphere(6_371_000.0).e2(), 0.0);
        assert!((Ellipsoid::WGS84.e2() - 0.006_694_379_990_14).abs() < 1e-12);
    }
}
