//! Assembles the raw intersection segments of one slice into contour
//! paths. Endpoints are merged into graph nodes on a tolerance grid,
//! then the node graph is traced into closed loops and open chains. A
//! segment-pairing fallback covers slices whose endpoints never merge.

use std::collections::{HashMap, HashSet};

use ordered_float::OrderedFloat;

use crate::{intersection::Segment, tolerance::Tolerances, Point2};

/// An ordered point sequence traced from one slice. Closed paths repeat
/// their first point at the end; open paths do not.
pub type Path = Vec<Point2>;

struct Node {
    point: Point2,
    connections: Vec<usize>,
    used: bool,
}

/// Total polyline length of a path.
pub fn path_length(path: &[Point2]) -> f32 {
    path.windows(2).map(|pair| (pair[1] - pair[0]).norm()).sum()
}

/// A path is closed when its last point coincides exactly with its
/// first. Tolerance-level gaps are snapped shut before paths leave this
/// module, so consumers only need this exact check.
pub fn is_closed(path: &[Point2]) -> bool {
    path.len() > 1 && path[0] == *path.last().unwrap()
}

/// Builds contour paths from one slice's segments. Zero segments give
/// zero paths, never an error.
pub fn build_paths(segments: &[Segment], tolerances: &Tolerances) -> Vec<Path> {
    let mut nodes = build_graph(segments, tolerances);

    let mut paths = trace_contours(&mut nodes, tolerances);
    extend_remaining(&mut nodes, tolerances, &mut paths);

    if paths.is_empty() {
        paths = chain_segments(segments, tolerances);
    }

    for path in paths.iter_mut() {
        snap_closed(path, tolerances);
    }

    paths
}

/// Merges segment endpoints into nodes on a grid of merge-tolerance
/// cells and records the undirected adjacency between them. Self loops
/// carry no path information and are skipped, as are segments below the
/// noise threshold.
fn build_graph(segments: &[Segment], tolerances: &Tolerances) -> Vec<Node> {
    let mut nodes: Vec<Node> = Vec::new();
    let mut cells: HashMap<(i64, i64), usize> = HashMap::new();

    let mut node_at = |nodes: &mut Vec<Node>, point: Point2| {
        let key = (
            (point.x / tolerances.merge).round() as i64,
            (point.y / tolerances.merge).round() as i64,
        );
        *cells.entry(key).or_insert_with(|| {
            nodes.push(Node {
                point,
                connections: Vec::new(),
                used: false,
            });
            nodes.len() - 1
        })
    };

    for segment in segments {
        if segment.length() < tolerances.min_segment {
            continue;
        }

        let a = node_at(&mut nodes, segment.a);
        let b = node_at(&mut nodes, segment.b);
        if a == b {
            continue;
        }

        if !nodes[a].connections.contains(&b) {
            nodes[a].connections.push(b);
        }
        if !nodes[b].connections.contains(&a) {
            nodes[b].connections.push(a);
        }
    }

    // Deterministic neighbor order; doubles as the tie break whenever
    // two continuations are otherwise equivalent.
    for node in nodes.iter_mut() {
        node.connections.sort_unstable();
    }

    nodes
}

/// Primary trace over the node graph. Degree-1 nodes are tried first so
/// open chains start at their natural endpoints, then degree-2 loop
/// members, then junctions.
fn trace_contours(nodes: &mut [Node], tolerances: &Tolerances) -> Vec<Path> {
    let mut order = (0..nodes.len()).collect::<Vec<_>>();
    order.sort_by_key(|&i| match nodes[i].connections.len() {
        1 => 0,
        2 => 1,
        _ => 2,
    });

    let mut paths = Vec::new();
    for start in order {
        if nodes[start].used || nodes[start].connections.is_empty() {
            continue;
        }

        if let Some(path) = trace_from(nodes, start, tolerances) {
            paths.push(path);
        }
    }

    paths
}

/// Walks the graph from `start` until it returns to the start node
/// (closed), runs out of unvisited connections (open), or hits the
/// safety bound. Traces too short to be real geometry are rolled back
/// so their nodes stay available to later traces.
fn trace_from(nodes: &mut [Node], start: usize, tolerances: &Tolerances) -> Option<Path> {
    let mut trail = vec![start];
    nodes[start].used = true;

    let mut current = start;
    let mut closed = false;
    let safety = nodes.len() + 1;

    while trail.len() <= safety {
        if trail.len() >= 3 && nodes[current].connections.contains(&start) {
            closed = true;
            break;
        }

        let previous = trail.len().checked_sub(2).map(|i| trail[i]);
        let Some(next) = next_step(nodes, current, previous) else {
            break;
        };

        nodes[next].used = true;
        trail.push(next);
        current = next;
    }

    let mut path: Path = trail.iter().map(|&i| nodes[i].point).collect();
    if closed {
        let gap = (*path.last().unwrap() - path[0]).norm();
        if gap > tolerances.merge {
            let first = path[0];
            path.push(first);
        }
    }

    if path.len() >= 3 && path_length(&path) > tolerances.min_path {
        Some(path)
    } else {
        for &node in trail.iter() {
            nodes[node].used = false;
        }
        None
    }
}

/// Picks the next unvisited connection. At a junction the continuation
/// with the smallest turning angle relative to the incoming direction
/// wins, so the trace never jumps onto an unrelated branch at a
/// T-crossing; exact ties fall to the lowest node id.
fn next_step(nodes: &[Node], current: usize, previous: Option<usize>) -> Option<usize> {
    let mut unused = nodes[current]
        .connections
        .iter()
        .copied()
        .filter(|&c| !nodes[c].used);

    if nodes[current].connections.len() <= 2 {
        return unused.next();
    }

    let Some(previous) = previous else {
        return unused.next();
    };

    let incoming = (nodes[current].point - nodes[previous].point).normalize();
    unused.min_by_key(|&c| {
        let outgoing = (nodes[c].point - nodes[current].point).normalize();
        // Larger dot product means a straighter continuation.
        (OrderedFloat(-incoming.dot(&outgoing)), c)
    })
}

/// Secondary pass over nodes the primary trace left behind. Each
/// leftover node is extended forward and backward, every direction with
/// its own visited set; a shared set would let one direction block the
/// other and silently truncate valid paths.
fn extend_remaining(nodes: &mut [Node], tolerances: &Tolerances, paths: &mut Vec<Path>) {
    for seed in 0..nodes.len() {
        if nodes[seed].used || nodes[seed].connections.is_empty() {
            continue;
        }

        let forward = extend_direction(nodes, seed, None);
        let backward = extend_direction(nodes, seed, forward.get(1).copied());

        let mut trail: Vec<usize> = backward[1..].iter().rev().copied().collect();
        trail.extend(forward.iter().copied());

        for &node in trail.iter() {
            nodes[node].used = true;
        }

        if trail.len() < 3 {
            continue;
        }

        // The two directions can wrap around a loop the primary trace
        // rolled back as noise, visiting its nodes twice and inflating
        // the length past the minimum. A trail that revisits any node
        // retraces existing geometry and is never a real contour.
        let mut seen = HashSet::with_capacity(trail.len());
        if !trail.iter().all(|&node| seen.insert(node)) {
            continue;
        }

        let mut path: Path = trail.iter().map(|&i| nodes[i].point).collect();

        // Close only when the endpoints actually meet, or when the graph
        // itself connects them; an open chain is never force-closed.
        let gap = (*path.last().unwrap() - path[0]).norm();
        let connected = nodes[trail[0]]
            .connections
            .contains(trail.last().unwrap());
        if gap > tolerances.merge && connected {
            let first = path[0];
            path.push(first);
        }

        if path_length(&path) > tolerances.min_path {
            paths.push(path);
        }
    }
}

/// Walks from `seed` along unvisited, unused connections until stuck.
/// `avoid` keeps the second direction from retracing the first one's
/// opening step.
fn extend_direction(nodes: &[Node], seed: usize, avoid: Option<usize>) -> Vec<usize> {
    let mut visited: HashSet<usize> = HashSet::from([seed]);
    visited.extend(avoid);

    let mut trail = vec![seed];
    let mut current = seed;

    while let Some(next) = nodes[current]
        .connections
        .iter()
        .copied()
        .find(|c| !visited.contains(c) && !nodes[*c].used)
    {
        visited.insert(next);
        trail.push(next);
        current = next;
    }

    trail
}

/// Last resort for slices whose endpoints never merge into a usable
/// graph: chain whole segments by nearest endpoint. A match is only
/// accepted within the fallback radius, so disconnected components at
/// the same height stay separate paths instead of being bridged.
fn chain_segments(segments: &[Segment], tolerances: &Tolerances) -> Vec<Path> {
    let segments = segments
        .iter()
        .filter(|s| s.length() >= tolerances.min_segment)
        .collect::<Vec<_>>();
    let mut used = vec![false; segments.len()];

    let mut paths = Vec::new();
    for first in 0..segments.len() {
        if used[first] {
            continue;
        }
        used[first] = true;

        let mut path: Path = vec![segments[first].a, segments[first].b];

        loop {
            let head = path[0];
            let tail = *path.last().unwrap();

            // Closest unused endpoint to either end of the chain.
            let mut best: Option<(f32, usize, bool, bool)> = None;
            for (idx, segment) in segments.iter().enumerate() {
                if used[idx] {
                    continue;
                }

                for (point, is_a) in [(segment.a, true), (segment.b, false)] {
                    for (anchor, at_tail) in [(tail, true), (head, false)] {
                        let distance = (point - anchor).norm();
                        if distance <= tolerances.fallback_radius
                            && best.map_or(true, |(d, ..)| distance < d)
                        {
                            best = Some((distance, idx, is_a, at_tail));
                        }
                    }
                }
            }

            let Some((_, idx, is_a, at_tail)) = best else {
                break;
            };
            used[idx] = true;

            let far_end = if is_a { segments[idx].b } else { segments[idx].a };
            if at_tail {
                path.push(far_end);
            } else {
                path.insert(0, far_end);
            }
        }

        if path.len() >= 3 && path_length(&path) > tolerances.min_path {
            paths.push(path);
        }
    }

    paths
}

/// Cosmetic closure: endpoints that are distinct but within merge
/// tolerance are presented as a clean closed ring. Anything farther
/// apart is left exactly as traced.
fn snap_closed(path: &mut Path, tolerances: &Tolerances) {
    if path.len() < 3 {
        return;
    }

    let gap = (*path.last().unwrap() - path[0]).norm();
    if gap > 0.0 && gap <= tolerances.merge {
        let first = path[0];
        path.push(first);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(ax: f32, ay: f32, bx: f32, by: f32) -> Segment {
        Segment::new(Point2::new(ax, ay), Point2::new(bx, by))
    }

    // Tolerances for a model roughly 100 units across: merge 1e-3,
    // fallback radius 1e-2, min path 0.1.
    fn tolerances() -> Tolerances {
        Tolerances::from_diagonal(100.0)
    }

    fn square(offset: f32, side: f32) -> Vec<Segment> {
        let (o, s) = (offset, offset + side);
        vec![
            segment(o, o, s, o),
            segment(s, o, s, s),
            segment(s, s, o, s),
            segment(o, s, o, o),
        ]
    }

    #[test]
    fn empty_input_gives_empty_output() {
        assert!(build_paths(&[], &tolerances()).is_empty());
    }

    #[test]
    fn square_closes_into_single_ring() {
        let paths = build_paths(&square(0.0, 10.0), &tolerances());

        assert_eq!(paths.len(), 1);
        let path = &paths[0];
        assert!(is_closed(path));
        assert_eq!(path.len(), 5);
        assert!((path_length(path) - 40.0).abs() < 1e-3);
    }

    #[test]
    fn near_coincident_corners_merge_into_one_node() {
        // Corner points jittered well inside the merge tolerance.
        let mut segments = square(0.0, 10.0);
        segments[1].a.y += 2e-4;
        segments[2].b.x -= 2e-4;

        let paths = build_paths(&segments, &tolerances());
        assert_eq!(paths.len(), 1);
        assert!(is_closed(&paths[0]));
    }

    #[test]
    fn open_chain_stays_open() {
        let segments = vec![
            segment(0.0, 0.0, 10.0, 0.0),
            segment(10.0, 0.0, 10.0, 10.0),
            segment(10.0, 10.0, 20.0, 10.0),
        ];

        let paths = build_paths(&segments, &tolerances());
        assert_eq!(paths.len(), 1);

        let path = &paths[0];
        assert!(!is_closed(path));
        assert_eq!(path.len(), 4);
    }

    #[test]
    fn disconnected_squares_stay_separate() {
        let mut segments = square(0.0, 10.0);
        segments.extend(square(50.0, 10.0));

        let paths = build_paths(&segments, &tolerances());
        assert_eq!(paths.len(), 2);
        assert!(paths.iter().all(|p| is_closed(p)));
    }

    #[test]
    fn junction_prefers_straight_continuation() {
        // A horizontal run through a T junction with a vertical branch.
        // The trace entering the junction from the left must continue
        // straight instead of turning onto the branch.
        let segments = vec![
            segment(0.0, 0.0, 10.0, 0.0),
            segment(10.0, 0.0, 20.0, 0.0),
            segment(10.0, 0.0, 10.0, 10.0),
        ];

        let paths = build_paths(&segments, &tolerances());

        let through = paths
            .iter()
            .find(|p| p.len() == 3)
            .expect("straight path through the junction");
        assert!((through[0].y).abs() < 1e-5);
        assert!((through[1].y).abs() < 1e-5);
        assert!((through[2].y).abs() < 1e-5);
    }

    #[test]
    fn noise_segments_are_filtered() {
        let mut segments = square(0.0, 10.0);
        // Far below min_segment for this scale.
        segments.push(segment(3.0, 3.0, 3.0, 3.0 + 1e-6));

        let paths = build_paths(&segments, &tolerances());
        assert_eq!(paths.len(), 1);
    }

    #[test]
    fn tiny_loops_are_discarded_as_noise() {
        // Perimeter far below min_path (0.1 at this scale).
        let paths = build_paths(&square(0.0, 0.01), &tolerances());
        assert!(paths.is_empty());
    }

    #[test]
    fn loops_just_under_the_length_threshold_are_not_revisited() {
        // Perimeter 0.08, just under min_path 0.1. Walking the loop in
        // both directions would double most of its length and sneak it
        // past the filter as fabricated geometry.
        let paths = build_paths(&square(0.0, 0.02), &tolerances());
        assert!(paths.is_empty());
    }

    #[test]
    fn fallback_chains_gapped_segments() {
        // Corner gaps of 0.05: too wide to merge into shared nodes
        // (merge 1e-2 at this scale) but within the fallback radius
        // of 0.1.
        let tolerances = Tolerances::from_diagonal(1000.0);
        let gap = 0.05;
        let segments = vec![
            segment(0.0, 0.0, 10.0, 0.0),
            segment(10.0 + gap, 0.0, 10.0, 10.0),
            segment(10.0, 10.0 + gap, 0.0, 10.0),
            segment(0.0 - gap, 10.0, 0.0, 0.0 + gap),
        ];

        let paths = build_paths(&segments, &tolerances);
        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].len(), 5);
    }

    #[test]
    fn fallback_never_bridges_distant_components() {
        let tolerances = Tolerances::from_diagonal(1000.0);
        let gap = 0.05;

        // Two gapped three-segment chains, 500 units apart.
        let chain = |offset: f32| {
            vec![
                segment(offset, 0.0, offset + 10.0, 0.0),
                segment(offset + 10.0 + gap, 0.0, offset + 10.0, 10.0),
                segment(offset + 10.0, 10.0 + gap, offset, 10.0),
            ]
        };

        let mut segments = chain(0.0);
        segments.extend(chain(500.0));

        let paths = build_paths(&segments, &tolerances);
        assert_eq!(paths.len(), 2);
        assert!(paths.iter().all(|p| !is_closed(p)));
    }

    #[test]
    fn snap_closes_within_tolerance_only() {
        let tolerances = tolerances();

        let mut nearly_closed = vec![
            Point2::new(0.0, 0.0),
            Point2::new(10.0, 0.0),
            Point2::new(10.0, 10.0),
            Point2::new(0.0, 10.0),
            Point2::new(0.0, 5e-4),
        ];
        snap_closed(&mut nearly_closed, &tolerances);
        assert!(is_closed(&nearly_closed));

        let mut open = vec![
            Point2::new(0.0, 0.0),
            Point2::new(10.0, 0.0),
            Point2::new(10.0, 10.0),
        ];
        snap_closed(&mut open, &tolerances);
        assert!(!is_closed(&open));
    }
}
