use std::{fs, path::Path, sync::OnceLock};

use anyhow::{bail, Context, Result};
use geo::{Coord, Geometry, LineString, MultiPolygon, Polygon};
use log::warn;
use regex::Regex;
use shapefile::{PolygonRing, Shape as ShpShape, ShapeReader};

use crate::{crs::Crs, geom::ensure_closed};

/// Reads every polygonal shape of a `.shp` file. Other shape types are skipped.
pub(crate) fn read_shapefile(path: &Path) -> Result<Vec<Geometry<f64>>> {
    let mut reader = ShapeReader::from_path(path)
        .with_context(|| format!("Failed to open shapefile: {}", path.display()))?;

    let mut geometries = Vec::new();
    for result in reader.iter_shapes() {
        let shape = result.context("Error reading shape")?;
        let mp = match &shape {
            ShpShape::Polygon(p) => shp_to_geo(p.rings(), |pt| Coord { x: pt.x, y: pt.y }),
            ShpShape::PolygonM(p) => shp_to_geo(p.rings(), |pt| Coord { x: pt.x, y: pt.y }),
            ShpShape::PolygonZ(p) => shp_to_geo(p.rings(), |pt| Coord { x: pt.x, y: pt.y }),
            _ => continue,
        };
        geometries.push(Geometry::MultiPolygon(mp));
    }
    Ok(geometries)
}

/// Group shapefile rings into polygons: each outer ring owns the inner rings
/// that follow it.
fn shp_to_geo<P>(rings: &[PolygonRing<P>], xy: impl Fn(&P) -> Coord<f64>) -> MultiPolygon<f64> {
    let mut polys = Vec::new();
    let mut current_exterior: Option<LineString<f64>> = None;
    let mut current_holes = Vec::new();

    for ring in rings {
        let mut coords = ring.points().iter().map(&xy).collect::<Vec<_>>();
        ensure_closed(&mut coords);
        let ls = LineString(coords);

        match ring {
            PolygonRing::Outer(_) => {
                if let Some(ext) = current_exterior.replace(ls) {
                    polys.push(Polygon::new(ext, std::mem::take(&mut current_holes)));
                }
            }
            PolygonRing::Inner(_) => current_holes.push(ls),
        }
    }
    match current_exterior {
        Some(ext) => polys.push(Polygon::new(ext, current_holes)),
        // Holes without any outer ring are kept as shells; repair sorts them out.
        None => polys.extend(current_holes.into_iter().map(|ring| Polygon::new(ring, vec![]))),
    }

    MultiPolygon(polys)
}

/// Reference system declared by the `.prj` sidecar of `shp_path`.
///
/// A missing sidecar or an unrecognised geographic system is read as WGS84.
/// An unrecognised projected system fails: its coordinates are not degrees.
pub(crate) fn read_prj(shp_path: &Path) -> Result<Crs> {
    let prj_path = shp_path.with_extension("prj");
    let Ok(wkt) = fs::read_to_string(&prj_path) else { return Ok(Crs::WGS84) };

    if let Some(crs) = crs_from_wkt(&wkt) { return Ok(crs) }
    if is_projected(&wkt) {
        bail!("unrecognised projected reference system in {}", prj_path.display())
    }
    warn!("unrecognised reference system in {}, assuming {}", prj_path.display(), Crs::WGS84);
    Ok(Crs::WGS84)
}

fn is_projected(wkt: &str) -> bool {
    let upper = wkt.trim_start().to_ascii_uppercase();
    upper.starts_with("PROJCS") || upper.starts_with("PROJCRS")
}

/// Bracket nesting depth at byte `offset`, ignoring quoted names.
fn depth_at(wkt: &str, offset: usize) -> usize {
    let mut depth = 0usize;
    let mut quoted = false;
    for c in wkt[..offset].chars() {
        match c {
            '"' => quoted = !quoted,
            '[' | '(' if !quoted => depth += 1,
            ']' | ')' if !quoted => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    depth
}

/// Best-effort EPSG code of a WKT or ESRI-WKT definition.
pub(crate) fn crs_from_wkt(wkt: &str) -> Option<Crs> {
    static AUTHORITY: OnceLock<Option<Regex>> = OnceLock::new();
    static UTM: OnceLock<Option<Regex>> = OnceLock::new();
    let authority = AUTHORITY.get_or_init(|| Regex::new(r#"(?i)(?:AUTHORITY|ID)\[\s*"EPSG"\s*,\s*"?(\d+)"?\s*\]"#).ok());
    let utm = UTM.get_or_init(|| Regex::new(r"(?i)(WGS[ _]?(?:19)?84|NAD[ _]?(?:19)?83)[\W_]*UTM[ _]zone[ _](\d{1,2})([NS])").ok());

    // Only the root element's own authority names the system; nested ones
    // belong to its datum, base CRS or units.
    if let Some(code) = authority.as_ref()
        .and_then(|re| re.captures_iter(wkt).filter(|caps| depth_at(wkt, caps.get(0).map_or(0, |m| m.start())) == 1).last())
        .and_then(|caps| caps[1].parse().ok())
    {
        return Some(Crs(code))
    }

    if is_projected(wkt) {
        let upper = wkt.to_ascii_uppercase();
        if let Some(caps) = utm.as_ref().and_then(|re| re.captures(wkt)) {
            let zone = caps[2].parse::<u32>().ok().filter(|zone| (1..=60).contains(zone))?;
            let north = caps[3].eq_ignore_ascii_case("N");
            let nad83 = caps[1].to_ascii_uppercase().starts_with("NAD");
            Some(if nad83 && north && zone <= 23 { Crs::nad83_utm(zone) } else { Crs::wgs84_utm(zone, north) })
        } else if upper.contains("WEB_MERCATOR") || upper.contains("PSEUDO-MERCATOR") {
            Some(Crs::WEB_MERCATOR)
        } else if upper.contains("ALBERS") && upper.contains("CONTIGUOUS") {
            Some(Crs::CONUS_ALBERS)
        } else {
            None
        }
    } else {
        let upper = wkt.to_ascii_uppercase();
        if upper.contains("NORTH_AMERICAN_1983") || upper.contains("NAD83") {
            Some(Crs::NAD83)
        } else if upper.contains("WGS_1984") || upper.contains("WGS 84") || upper.contains("WGS84") {
            Some(Crs::WGS84)
        } else {
            None
        }
    }
}
