use anyhow::{bail, Context, Result};
use geo::{Coord, Geometry, LineString, MultiPolygon, Polygon};
use quick_xml::{events::Event, Reader};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Boundary {
    Outer,
    Inner,
}

#[derive(Debug, Default)]
struct PolygonBuilder {
    exterior: Option<LineString<f64>>,
    holes: Vec<LineString<f64>>,
}

/// Extract the polygons of a KML document, one geometry per placemark.
/// Polygons outside any placemark are read together as one extra record.
pub(crate) fn read_kml(text: &str) -> Result<Vec<Geometry<f64>>> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);

    let mut geometries = Vec::new();
    let mut loose = Vec::new();
    let mut placemark: Option<Vec<Polygon<f64>>> = None;
    let mut polygon: Option<PolygonBuilder> = None;
    let mut boundary: Option<Boundary> = None;
    let mut coordinates: Option<String> = None;

    loop {
        let event = reader.read_event()
            .with_context(|| format!("malformed KML near byte {}", reader.buffer_position()))?;
        match event {
            Event::Start(e) => match e.local_name().as_ref() {
                b"Placemark" => placemark = Some(Vec::new()),
                b"Polygon" => polygon = Some(PolygonBuilder::default()),
                b"outerBoundaryIs" => boundary = Some(Boundary::Outer),
                b"innerBoundaryIs" => boundary = Some(Boundary::Inner),
                b"coordinates" if boundary.is_some() => coordinates = Some(String::new()),
                _ => {}
            },
            Event::Text(t) => {
                if let Some(buf) = coordinates.as_mut() {
                    buf.push_str(&t.unescape()?);
                    buf.push(' ');
                }
            }
            Event::CData(c) => {
                if let Some(buf) = coordinates.as_mut() {
                    buf.push_str(std::str::from_utf8(&c).context("KML coordinates are not UTF-8")?);
                    buf.push(' ');
                }
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"coordinates" => {
                    if let (Some(text), Some(builder), Some(kind)) = (coordinates.take(), polygon.as_mut(), boundary) {
                        let ring = parse_coordinates(&text)?;
                        match kind {
                            Boundary::Outer => builder.exterior = Some(ring),
                            Boundary::Inner => builder.holes.push(ring),
                        }
                    }
                }
                b"outerBoundaryIs" | b"innerBoundaryIs" => boundary = None,
                b"Polygon" => {
                    if let Some(PolygonBuilder { exterior: Some(exterior), holes }) = polygon.take() {
                        placemark.as_mut().unwrap_or(&mut loose).push(Polygon::new(exterior, holes));
                    }
                }
                b"Placemark" => {
                    if let Some(polygons) = placemark.take() {
                        push_record(&mut geometries, polygons);
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    push_record(&mut geometries, loose);
    Ok(geometries)
}

fn push_record(geometries: &mut Vec<Geometry<f64>>, mut polygons: Vec<Polygon<f64>>) {
    match polygons.len() {
        0 => {}
        1 => geometries.push(Geometry::Polygon(polygons.remove(0))),
        _ => geometries.push(Geometry::MultiPolygon(MultiPolygon::new(polygons))),
    }
}

/// Parse whitespace-separated `lon,lat[,alt]` tuples.
fn parse_coordinates(text: &str) -> Result<LineString<f64>> {
    text.split_whitespace()
        .map(|tuple| {
            let mut parts = tuple.split(',');
            let (Some(lon), Some(lat)) = (parts.next(), parts.next()) else {
                bail!("malformed KML coordinate tuple: {tuple:?}")
            };
            Ok(Coord {
                x: lon.parse().with_context(|| format!("invalid longitude {lon:?}"))?,
                y: lat.parse().with_context(|| format!("invalid latitude {lat:?}"))?,
            })
        })
        .collect::<Result<Vec<_>>>()
        .map(LineString::new)
}
