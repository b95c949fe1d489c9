use ahash::AHashMap;
use geo::{
    line_intersection::{line_intersection, LineIntersection},
    Coord, Line, LineString,
};
use rstar::RTree;

use crate::geom::{
    ring::{dedup_closed, distinct_vertices},
    BoundingBox,
};

/// Split a closed ring at its self-intersections into simple sub-rings ("lobes").
///
/// A bowtie yields its two triangles; a ring that touches itself at a vertex
/// yields one lobe per loop. Lobes with fewer than three distinct vertices
/// (spikes, back-tracking segments) are dropped. The orientation of each lobe
/// is whatever the walk produced; callers classify lobes themselves.
pub(crate) fn split_ring(ring: &LineString<f64>) -> Vec<LineString<f64>> {
    let coords = dedup_closed(ring);
    if distinct_vertices(&coords) < 3 { return Vec::new() }

    extract_lobes(&node_ring(&coords))
}

/// Insert every self-intersection point into the segments it lies on.
/// The same `Coord` value is inserted into both segments of a crossing, so
/// crossings show up as exactly repeated vertices.
fn node_ring(coords: &[Coord<f64>]) -> Vec<Coord<f64>> {
    let segments = coords.windows(2)
        .map(|w| Line::new(w[0], w[1]))
        .collect::<Vec<_>>();

    let rtree = RTree::bulk_load(
        segments.iter().enumerate()
            .map(|(i, &segment)| BoundingBox::of_line(i, segment))
            .collect()
    );

    #[inline]
    fn is_endpoint(coord: Coord<f64>, line: Line<f64>) -> bool {
        coord == line.start || coord == line.end
    }

    let mut nodes: Vec<Vec<Coord<f64>>> = vec![Vec::new(); segments.len()];
    for (i, &segment) in segments.iter().enumerate() {
        let envelope = BoundingBox::of_line(i, segment).aabb();
        for candidate in rtree.locate_in_envelope_intersecting(&envelope) {
            let j = candidate.idx();
            if j <= i { continue } // check each unordered pair once

            match line_intersection(segment, segments[j]) {
                None => {}
                Some(LineIntersection::SinglePoint { intersection, .. }) => {
                    // Consecutive segments always meet at their shared vertex.
                    if is_endpoint(intersection, segment) && is_endpoint(intersection, segments[j]) { continue }
                    nodes[i].push(intersection);
                    nodes[j].push(intersection);
                }
                Some(LineIntersection::Collinear { intersection }) => {
                    for coord in [intersection.start, intersection.end] {
                        nodes[i].push(coord);
                        nodes[j].push(coord);
                    }
                }
            }
        }
    }

    let mut noded = Vec::with_capacity(coords.len() + nodes.iter().map(Vec::len).sum::<usize>());
    for (&segment, mut splits) in segments.iter().zip(nodes) {
        let delta = segment.delta();
        let along = |c: &Coord<f64>| (c.x - segment.start.x) * delta.x + (c.y - segment.start.y) * delta.y;
        splits.sort_by(|a, b| along(a).total_cmp(&along(b)));

        noded.push(segment.start);
        noded.extend(splits.into_iter().filter(|&c| !is_endpoint(c, segment)));
    }
    noded.push(coords[0]);
    noded.dedup();
    noded
}

/// Walk the noded ring and cut out a closed lobe every time a vertex repeats.
fn extract_lobes(noded: &[Coord<f64>]) -> Vec<LineString<f64>> {
    // `+ 0.0` folds -0.0 into 0.0 so both hash the same.
    #[inline]
    fn key(c: Coord<f64>) -> (u64, u64) { ((c.x + 0.0).to_bits(), (c.y + 0.0).to_bits()) }

    let mut path: Vec<Coord<f64>> = Vec::with_capacity(noded.len());
    let mut seen: AHashMap<(u64, u64), usize> = AHashMap::with_capacity(noded.len());
    let mut lobes = Vec::new();

    for &coord in noded {
        if let Some(&pos) = seen.get(&key(coord)) {
            let mut lobe = path.split_off(pos);
            for &c in &lobe { seen.remove(&key(c)); }
            lobe.push(coord);
            if distinct_vertices(&lobe) >= 3 { lobes.push(LineString::new(lobe)) }
        }
        seen.insert(key(coord), path.len());
        path.push(coord);
    }

    lobes
}
