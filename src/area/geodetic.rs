use geo::Coord;
use geographiclib_rs::{Geodesic, PolygonArea, Winding};

use crate::{config::Ellipsoid, geom::distinct_vertices};

/// Ellipsoidal ring area with geodesic edges, on any reference ellipsoid.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Geodetic {
    geodesic: Geodesic,
}

impl Geodetic {
    pub(crate) fn new(ellipsoid: Ellipsoid) -> Self {
        Self { geodesic: Geodesic::new(ellipsoid.semi_major, ellipsoid.flattening) }
    }

    /// Total surface area of the ellipsoid in m².
    #[inline] pub(crate) fn surface_area(&self) -> f64 { self.geodesic.area() }

    /// Radius of the sphere with the ellipsoid's surface area, in meters.
    #[inline]
    pub(crate) fn authalic_radius(&self) -> f64 {
        (self.surface_area() / (4.0 * std::f64::consts::PI)).sqrt()
    }

    /// Signed area in m² of a closed lon/lat ring, positive when counter-clockwise.
    /// Rings with fewer than 3 distinct vertices have no area.
    pub(crate) fn ring_area(&self, ring: &[Coord<f64>]) -> f64 {
        if distinct_vertices(ring) < 3 { return 0.0 }

        // The closing edge is added by `compute`.
        let open = match ring {
            [first, .., last] if first == last => &ring[..ring.len() - 1],
            _ => ring,
        };
        let mut polygon = PolygonArea::new(&self.geodesic, Winding::CounterClockwise);
        for coord in open {
            polygon.add_point(coord.y, coord.x);
        }
        let (_perimeter, area, _) = polygon.compute(true);
        area
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use geo::{polygon, GeodesicArea};

    use super::*;

    fn cell(lon: f64, lat: f64, size: f64) -> Vec<Coord<f64>> {
        vec![
            Coord { x: lon, y: lat },
            Coord { x: lon + size, y: lat },
            Coord { x: lon + size, y: lat + size },
            Coord { x: lon, y: lat + size },
            Coord { x: lon, y: lat },
        ]
    }

    #[test]
    fn wgs84_authalic_radius() {
        let geodetic = Geodetic::new(Ellipsoid::WGS84);
        assert_relative_eq!(geodetic.authalic_radius(), 6_371_007.181, max_relative = 1e-9);
    }

    #[test]
    fn one_degree_cell_at_equator() {
        let geodetic = Geodetic::new(Ellipsoid::WGS84);
        let area = geodetic.ring_area(&cell(0.0, 0.0, 1.0));
        assert_relative_eq!(area, 12_308_778_361.469_452, max_relative = 1e-9);
    }

    #[test]
    fn octant_is_an_eighth_of_the_ellipsoid() {
        // Equator and meridians are geodesics, so this triangle is exact.
        let octant = [
            Coord { x: 0.0, y: 0.0 },
            Coord { x: 90.0, y: 0.0 },
            Coord { x: 0.0, y: 90.0 },
            Coord { x: 0.0, y: 0.0 },
        ];
        for ellipsoid in [Ellipsoid::WGS84, Ellipsoid::sphere(6_371_000.0)] {
            let geodetic = Geodetic::new(ellipsoid);
            assert_relative_eq!(geodetic.ring_area(&octant), geodetic.surface_area() / 8.0, max_relative = 1e-9);
        }
    }

    #[test]
    fn triangles_match_geodesic_area() {
        let geodetic = Geodetic::new(Ellipsoid::WGS84);
        for size in [0.01, 0.05, 1.0] {
            let triangle = polygon![
                (x: -93.5, y: 42.0),
                (x: -93.5 + size, y: 42.0 + 0.3 * size),
                (x: -93.5 + 0.4 * size, y: 42.0 + size),
                (x: -93.5, y: 42.0),
            ];
            assert_relative_eq!(
                geodetic.ring_area(&triangle.exterior().0),
                triangle.geodesic_area_unsigned(),
                max_relative = 1e-9
            );
        }
    }

    #[test]
    fn orientation_flips_sign() {
        let geodetic = Geodetic::new(Ellipsoid::WGS84);
        let mut ring = cell(10.0, 45.0, 0.01);
        let ccw = geodetic.ring_area(&ring);
        ring.reverse();
        assert!(ccw > 0.0);
        assert_relative_eq!(geodetic.ring_area(&ring), -ccw, max_relative = 1e-12);
    }

    #[test]
    fn antimeridian_crossing_matches_shifted_cell() {
        let geodetic = Geodetic::new(Ellipsoid::WGS84);
        let crossing = vec![
            Coord { x: 179.5, y: 10.0 },
            Coord { x: -179.5, y: 10.0 },
            Coord { x: -179.5, y: 11.0 },
            Coord { x: 179.5, y: 11.0 },
            Coord { x: 179.5, y: 10.0 },
        ];
        assert_relative_eq!(
            geodetic.ring_area(&crossing),
            geodetic.ring_area(&cell(0.0, 10.0, 1.0)),
            max_relative = 1e-9
        );
    }

    #[test]
    fn open_and_closed_rings_agree() {
        let geodetic = Geodetic::new(Ellipsoid::WGS84);
        let closed = cell(5.0, 50.0, 0.02);
        assert_relative_eq!(geodetic.ring_area(&closed[..4]), geodetic.ring_area(&closed), max_relative = 1e-12);
    }

    #[test]
    fn degenerate_ring_has_zero_area() {
        let geodetic = Geodetic::new(Ellipsoid::WGS84);
        let line = [Coord { x: 0.0, y: 0.0 }, Coord { x: 1.0, y: 1.0 }, Coord { x: 0.0, y: 0.0 }];
        assert_eq!(geodetic.ring_area(&line), 0.0);
    }
}
