use std::{borrow::Cow, collections::BTreeMap, fmt, str::FromStr};

use anyhow::{anyhow, bail, Result};
use serde::{Deserialize, Serialize};

/// A coordinate reference system identified by its EPSG code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Crs(pub u32);

impl Crs {
    /// WGS84 longitude/latitude.
    pub const WGS84: Self = Self(4326);
    /// NAD83 longitude/latitude.
    pub const NAD83: Self = Self(4269);
    /// EASE-Grid 2.0 global cylindrical equal-area.
    pub const WORLD_EQUAL_AREA: Self = Self(6933);
    /// CONUS Albers equal-area.
    pub const CONUS_ALBERS: Self = Self(5070);
    /// Spherical ("web") Mercator.
    pub const WEB_MERCATOR: Self = Self(3857);

    #[inline] pub fn epsg(&self) -> u32 { self.0 }

    /// WGS84 UTM zone `zone` (1-60) in the given hemisphere.
    pub fn wgs84_utm(zone: u32, north: bool) -> Self {
        Self(if north { 32600 } else { 32700 } + zone)
    }

    /// NAD83 UTM zone `zone`, north only (1-23).
    pub fn nad83_utm(zone: u32) -> Self { Self(26900 + zone) }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{}", self.0)
    }
}

impl FromStr for Crs {
    type Err = anyhow::Error;

    /// Accepts `EPSG:4326`, `epsg:4326` or a bare `4326`.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let code = match s.split_once(':') {
            Some((auth, code)) if auth.eq_ignore_ascii_case("epsg") => code,
            Some((auth, _)) => bail!("unsupported CRS authority: {auth}"),
            None => s,
        };
        code.trim().parse::<u32>()
            .map(Self)
            .map_err(|e| anyhow!("invalid EPSG code {code:?}: {e}"))
    }
}

/// The installed reference-system database: EPSG codes mapped to PROJ.4
/// definitions. A code missing from the registry is "undefined", except
/// WGS84 and NAD83 UTM zones, which are always derived.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CrsRegistry {
    definitions: BTreeMap<u32, String>,
}

impl Default for CrsRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.insert(Crs::WGS84, "+proj=longlat +datum=WGS84 +no_defs +type=crs");
        registry.insert(Crs::NAD83, "+proj=longlat +datum=NAD83 +no_defs +type=crs");
        registry.insert(
            Crs::WORLD_EQUAL_AREA,
            "+proj=cea +lat_ts=30 +lon_0=0 +x_0=0 +y_0=0 +datum=WGS84 +units=m +no_defs +type=crs",
        );
        registry.insert(
            Crs::CONUS_ALBERS,
            "+proj=aea +lat_0=23 +lon_0=-96 +lat_1=29.5 +lat_2=45.5 +x_0=0 +y_0=0 +datum=NAD83 +units=m +no_defs +type=crs",
        );
        registry.insert(
            Crs::WEB_MERCATOR,
            "+proj=merc +a=6378137 +b=6378137 +lat_ts=0 +lon_0=0 +x_0=0 +y_0=0 +k=1 +units=m +no_defs +type=crs",
        );
        registry
    }
}

impl CrsRegistry {
    /// A registry with no definitions.
    pub fn empty() -> Self { Self { definitions: BTreeMap::new() } }

    /// Register (or replace) the PROJ.4 definition of `crs`.
    pub fn insert(&mut self, crs: Crs, definition: impl Into<String>) {
        self.definitions.insert(crs.0, definition.into());
    }

    /// Drop `crs` from the registry, making it undefined.
    pub fn remove(&mut self, crs: Crs) -> Option<String> {
        self.definitions.remove(&crs.0)
    }

    /// PROJ.4 definition of `crs`, registered or derived.
    pub fn definition(&self, crs: Crs) -> Option<Cow<'_, str>> {
        match self.definitions.get(&crs.0) {
            Some(def) => Some(Cow::Borrowed(def.as_str())),
            None => utm_definition(crs).map(Cow::Owned),
        }
    }

    #[inline] pub fn contains(&self, crs: Crs) -> bool { self.definition(crs).is_some() }

    /// Whether `crs` is a longitude/latitude system. Unknown codes are not.
    pub fn is_geographic(&self, crs: Crs) -> bool {
        self.definition(crs)
            .is_some_and(|def| matches!(proj_name(&def), Some("longlat" | "latlong" | "lonlat" | "latlon")))
    }

    /// Whether `crs` is an equal-area projection, so planar area is true surface area.
    pub fn is_equal_area(&self, crs: Crs) -> bool {
        self.definition(crs)
            .is_some_and(|def| matches!(proj_name(&def), Some("cea" | "aea" | "laea" | "moll" | "sinu" | "eqearth")))
    }
}

/// Definition of a WGS84 (326zz north, 327zz south) or NAD83 (269zz) UTM zone.
fn utm_definition(crs: Crs) -> Option<String> {
    let (zone, south, datum) = match crs.0 {
        code @ 32601..=32660 => (code - 32600, "", "WGS84"),
        code @ 32701..=32760 => (code - 32700, " +south", "WGS84"),
        code @ 26901..=26923 => (code - 26900, "", "NAD83"),
        _ => return None,
    };
    Some(format!("+proj=utm +zone={zone}{south} +datum={datum} +units=m +no_defs +type=crs"))
}

/// Value of the `+proj=` parameter of a PROJ.4 string.
fn proj_name(definition: &str) -> Option<&str> {
    definition.split_whitespace()
        .find_map(|param| param.strip_prefix("+proj="))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_epsg_forms() {
        assert_eq!("EPSG:4326".parse::<Crs>().unwrap(), Crs::WGS84);
        assert_eq!("epsg:6933".parse::<Crs>().unwrap(), Crs::WORLD_EQUAL_AREA);
        assert_eq!(" 5070 ".parse::<Crs>().unwrap(), Crs::CONUS_ALBERS);
        assert!("ESRI:102003".parse::<Crs>().is_err());
        assert!("EPSG:abc".parse::<Crs>().is_err());
    }

    #[test]
    fn display_is_authority_code() {
        assert_eq!(Crs::WEB_MERCATOR.to_string(), "EPSG:3857");
    }

    #[test]
    fn default_registry_classifies_systems() {
        let registry = CrsRegistry::default();
        assert!(registry.is_geographic(Crs::WGS84));
        assert!(registry.is_geographic(Crs::NAD83));
        assert!(!registry.is_geographic(Crs::WORLD_EQUAL_AREA));
        assert!(registry.is_equal_area(Crs::WORLD_EQUAL_AREA));
        assert!(registry.is_equal_area(Crs::CONUS_ALBERS));
        assert!(!registry.is_equal_area(Crs::WEB_MERCATOR));
        assert!(!registry.is_equal_area(Crs(32633)));
        assert!(!registry.is_geographic(Crs(32633)));
    }

    #[test]
    fn utm_zones_are_derived() {
        let registry = CrsRegistry::empty();
        assert_eq!(Crs::wgs84_utm(15, true), Crs(32615));
        assert_eq!(Crs::nad83_utm(15), Crs(26915));
        assert!(registry.contains(Crs(32615)));
        assert!(registry.definition(Crs::wgs84_utm(33, false)).is_some_and(|def| def.contains("+zone=33 +south")));
        assert!(registry.definition(Crs(26915)).is_some_and(|def| def.contains("+datum=NAD83")));
        assert!(!registry.contains(Crs(32661)));
        assert!(!registry.contains(Crs(26924)));
    }

    #[test]
    fn removed_code_is_undefined() {
        let mut registry = CrsRegistry::default();
        assert!(registry.remove(Crs::WORLD_EQUAL_AREA).is_some());
        assert!(!registry.contains(Crs::WORLD_EQUAL_AREA));
        assert!(registry.definition(Crs::WORLD_EQUAL_AREA).is_none());
    }
}
