use std::collections::BTreeMap;

use rayon::prelude::*;
use tracing::{debug, trace, warn};

use super::error::RouteError;
use super::graph::{ShortestPathTree, TrailGraph};
use super::matching::{matched_pairs, max_weight_matching};
use super::types::{ConflictPolicy, Point, Segment};

/// Fixed-point scale applied to auxiliary matching weights (units per map pixel).
const WEIGHT_SCALE: f64 = 1_000_000.0;

/// Choose the edges that must be traversed twice so every node has even degree.
///
/// Odd-degree nodes are paired by an exact minimum-total-distance perfect matching
/// over shortest-path distances. A pair joined by a single edge duplicates that
/// edge; any other pair duplicates every edge along its shortest path.
///
/// The result is sorted, with each segment in canonical orientation.
pub fn eulerize(graph: &TrailGraph, policy: ConflictPolicy) -> Result<Vec<Segment>, RouteError> {
    let odd: Vec<Point> = graph.odd_degree_nodes().collect();
    debug!(odd_nodes = odd.len(), "Eulerizing graph");
    if odd.is_empty() {
        return Ok(Vec::new());
    }

    // One Dijkstra per odd node, in parallel. Order is preserved by collect.
    let trees: Vec<ShortestPathTree> = odd
        .par_iter()
        .map(|&source| graph.shortest_paths_from(source))
        .collect();

    let distances = pair_distances(&odd, &trees)?;
    let pairs = min_distance_pairing(&odd, &distances)?;
    debug!(pairs = pairs.len(), "Matched odd nodes");

    expand_pairs(graph, &odd, &trees, &pairs, policy)
}

/// Shortest distance for every unordered pair `(i, j)`, `i < j`, of odd nodes.
fn pair_distances(
    odd: &[Point],
    trees: &[ShortestPathTree],
) -> Result<BTreeMap<(usize, usize), f64>, RouteError> {
    let mut distances = BTreeMap::new();
    for i in 0..odd.len() {
        for j in i + 1..odd.len() {
            let d = trees[i]
                .distance_to(&odd[j])
                .ok_or(RouteError::Infeasible {
                    from: odd[i],
                    to: odd[j],
                })?;
            distances.insert((i, j), d);
        }
    }
    Ok(distances)
}

/// Pair up odd nodes minimising the summed shortest-path distance.
///
/// Weights are transformed to `max_distance - distance` so a maximum-weight
/// perfect matching is a minimum-distance one, then scaled to integers.
fn min_distance_pairing(
    odd: &[Point],
    distances: &BTreeMap<(usize, usize), f64>,
) -> Result<Vec<(usize, usize)>, RouteError> {
    let max_distance = distances.values().copied().fold(0.0_f64, f64::max);
    let weighted: Vec<(usize, usize, i64)> = distances
        .iter()
        .map(|(&(i, j), &d)| (i, j, ((max_distance - d) * WEIGHT_SCALE).round() as i64))
        .collect();

    let mates = max_weight_matching(&weighted, true);
    if let Some(lonely) = (0..odd.len()).find(|&v| mates.get(v).copied().flatten().is_none()) {
        // Only reachable with an odd number of odd nodes, which no graph has.
        let partner = odd[(lonely + 1) % odd.len()];
        return Err(RouteError::Infeasible {
            from: odd[lonely],
            to: partner,
        });
    }
    Ok(matched_pairs(&mates))
}

/// Turn matched pairs of odd nodes into the edges to duplicate.
///
/// `pairs` index into `odd`, and `trees[i]` is the shortest path tree rooted at
/// `odd[i]`. An edge selected more than once is a conflict; `policy` decides
/// whether that fails or cancels out in pairs.
pub(crate) fn expand_pairs(
    graph: &TrailGraph,
    odd: &[Point],
    trees: &[ShortestPathTree],
    pairs: &[(usize, usize)],
    policy: ConflictPolicy,
) -> Result<Vec<Segment>, RouteError> {
    let mut selected: BTreeMap<Segment, usize> = BTreeMap::new();
    for &(i, j) in pairs {
        let (u, v) = (odd[i], odd[j]);
        if graph.has_edge(&u, &v) {
            trace!(%u, %v, "Doubling direct edge");
            *selected.entry(Segment::new(u, v).canonical()).or_default() += 1;
            continue;
        }
        // Rural postman edge: spread the duplicate over the shortest path.
        let path = trees[i]
            .path_to(v)
            .ok_or(RouteError::Infeasible { from: u, to: v })?;
        trace!(%u, %v, hops = path.nodes.len() - 1, "Doubling shortest path");
        for segment in path.segments() {
            *selected.entry(segment.canonical()).or_default() += 1;
        }
    }

    let conflicts: Vec<(Segment, usize)> = selected
        .iter()
        .filter(|&(_, &count)| count > 1)
        .map(|(&s, &c)| (s, c))
        .collect();

    match (conflicts.first(), policy) {
        (None, _) => Ok(selected.into_keys().collect()),
        (Some(&(edge, count)), ConflictPolicy::Reject) => {
            Err(RouteError::DuplicateConflict { edge, count })
        }
        (Some(_), ConflictPolicy::Cancel) => {
            warn!(
                conflicts = conflicts.len(),
                "Edges selected for duplication more than once; cancelling pairs"
            );
            Ok(selected
                .into_iter()
                .filter(|&(_, count)| count % 2 == 1)
                .map(|(s, _)| s)
                .collect())
        }
    }
}

#[cfg(test)]
mod unit_tests {
    use super::*;

    fn p(x: i32, y: i32) -> Point {
        Point::new(x, y)
    }

    /// Expand forced pairings of arbitrary nodes, searching from each pair's first node.
    fn expand(
        graph: &TrailGraph,
        pairs: &[(Point, Point)],
        policy: ConflictPolicy,
    ) -> Result<Vec<Segment>, RouteError> {
        let nodes: Vec<Point> = pairs.iter().flat_map(|&(u, v)| [u, v]).collect();
        let trees: Vec<ShortestPathTree> =
            nodes.iter().map(|&n| graph.shortest_paths_from(n)).collect();
        let indices: Vec<(usize, usize)> = (0..pairs.len()).map(|k| (2 * k, 2 * k + 1)).collect();
        expand_pairs(graph, &nodes, &trees, &indices, policy)
    }

    fn line() -> TrailGraph {
        // A straight path a-b-c-d.
        TrailGraph::build(&[
            Segment::new(p(0, 0), p(10, 0)),
            Segment::new(p(10, 0), p(20, 0)),
            Segment::new(p(20, 0), p(30, 0)),
        ])
        .unwrap()
    }

    #[test]
    fn test_overlapping_paths_rejected() {
        let pairs = [(p(0, 0), p(20, 0)), (p(10, 0), p(30, 0))];
        let err = expand(&line(), &pairs, ConflictPolicy::Reject).unwrap_err();
        assert_eq!(
            err,
            RouteError::DuplicateConflict {
                edge: Segment::new(p(10, 0), p(20, 0)),
                count: 2
            }
        );
    }

    #[test]
    fn test_overlapping_paths_cancelled() {
        let pairs = [(p(0, 0), p(20, 0)), (p(10, 0), p(30, 0))];
        let doubled = expand(&line(), &pairs, ConflictPolicy::Cancel).unwrap();
        assert_eq!(
            doubled,
            vec![
                Segment::new(p(0, 0), p(10, 0)),
                Segment::new(p(20, 0), p(30, 0))
            ]
        );
    }

    #[test]
    fn test_direct_edge_used_for_adjacent_pair() {
        let doubled =
            expand(&line(), &[(p(20, 0), p(10, 0))], ConflictPolicy::Reject).unwrap();
        assert_eq!(doubled, vec![Segment::new(p(10, 0), p(20, 0))]);
    }

    #[test]
    fn test_pair_outside_search_tree_is_infeasible() {
        let graph = TrailGraph::build(&[
            Segment::new(p(0, 0), p(10, 0)),
            Segment::new(p(50, 50), p(60, 50)),
        ])
        .unwrap();
        let err = expand(&graph, &[(p(0, 0), p(60, 50))], ConflictPolicy::Reject).unwrap_err();
        assert_eq!(
            err,
            RouteError::Infeasible {
                from: p(0, 0),
                to: p(60, 50)
            }
        );
    }

    #[test]
    fn test_path_end_points_pair_through_whole_line() {
        let doubled = eulerize(&line(), ConflictPolicy::Reject).unwrap();
        assert_eq!(doubled.len(), 3);
    }
}
