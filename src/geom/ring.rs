use ahash::AHashSet;
use geo::{Coord, LineString};

/// Ensure first and last are the same for geo::LineString coords.
pub(crate) fn ensure_closed(coords: &mut Vec<Coord<f64>>) {
    if let (Some(&first), Some(&last)) = (coords.first(), coords.last()) {
        if first != last { coords.push(first) }
    }
}

/// Remove consecutive repeated vertices, keeping the ring closed.
pub(crate) fn dedup_closed(ring: &LineString<f64>) -> Vec<Coord<f64>> {
    let mut coords = ring.0.clone();
    coords.dedup();
    ensure_closed(&mut coords);
    coords
}

/// Get the signed area of a closed coord list (positive for counter-clockwise).
/// Coordinates are taken relative to the first vertex to limit cancellation
/// on projected rings far from the origin.
pub(crate) fn signed_area(pts: &[Coord<f64>]) -> f64 {
    let Some(&origin) = pts.first() else { return 0.0 };
    let mut a = 0.0;
    for w in pts.windows(2) {
        let (p, q) = (w[0] - origin, w[1] - origin);
        a += p.x * q.y - q.x * p.y;
    }
    a / 2.0
}

/// Number of distinct vertices of a ring, ignoring the closing duplicate.
pub(crate) fn distinct_vertices(pts: &[Coord<f64>]) -> usize {
    pts.iter()
        .map(|c| ((c.x + 0.0).to_bits(), (c.y + 0.0).to_bits()))
        .collect::<AHashSet<_>>()
        .len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coords(pts: &[(f64, f64)]) -> Vec<Coord<f64>> {
        pts.iter().map(|&(x, y)| Coord { x, y }).collect()
    }

    #[test]
    fn closes_open_ring() {
        let mut ring = coords(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0)]);
        ensure_closed(&mut ring);
        assert_eq!(ring.len(), 4);
        assert_eq!(ring[0], ring[3]);

        // Already closed rings are left alone.
        ensure_closed(&mut ring);
        assert_eq!(ring.len(), 4);
    }

    #[test]
    fn unit_square_area_is_exact() {
        let ccw = coords(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0), (0.0, 0.0)]);
        assert_eq!(signed_area(&ccw), 1.0);

        let mut cw = ccw.clone();
        cw.reverse();
        assert_eq!(signed_area(&cw), -1.0);
    }

    #[test]
    fn dedup_drops_repeated_vertices() {
        let ring = LineString::from(vec![(0.0, 0.0), (1.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 0.0)]);
        let pts = dedup_closed(&ring);
        assert_eq!(pts.len(), 4);
        assert_eq!(distinct_vertices(&pts), 3);
    }

    #[test]
    fn degenerate_rings_have_few_vertices() {
        let line = coords(&[(0.0, 0.0), (1.0, 1.0), (0.0, 0.0)]);
        assert_eq!(distinct_vertices(&line), 2);
        assert_eq!(signed_area(&line), 0.0);
    }
}
