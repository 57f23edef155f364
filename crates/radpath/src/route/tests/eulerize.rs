use super::*;
use crate::route::choose_double_edges;
use crate::route::eulerize::eulerize;
use crate::route::graph::TrailGraph;
use crate::route::types::ConflictPolicy;

fn doubles(edges: &[Segment]) -> Vec<Segment> {
    choose_double_edges(edges, &config()).unwrap()
}

#[test]
fn all_even_network_needs_nothing() {
    assert!(doubles(&triangle()).is_empty());
}

#[test]
fn two_odd_nodes_joined_directly() {
    // A square with one diagonal: the diagonal's ends are odd.
    let edges = vec![
        seg(0, 0, 10, 0),
        seg(10, 0, 10, 10),
        seg(10, 10, 0, 10),
        seg(0, 10, 0, 0),
        seg(0, 0, 10, 10),
    ];
    assert_eq!(doubles(&edges), vec![seg(0, 0, 10, 10)]);
}

#[test]
fn odd_nodes_without_direct_edge_use_shortest_path() {
    // A path of three edges; its ends are the only odd nodes.
    let edges = vec![seg(0, 0, 10, 0), seg(10, 0, 20, 5), seg(20, 5, 30, 0)];
    assert_eq!(
        doubles(&edges),
        vec![seg(0, 0, 10, 0), seg(10, 0, 20, 5), seg(20, 5, 30, 0)]
    );
}

#[test]
fn doubles_make_every_degree_even() {
    let edges = six_edge_network();
    let doubled = doubles(&edges);
    for (node, degree) in degrees(&edges, &doubled) {
        assert_eq!(degree % 2, 0, "{node:?} has odd degree {degree}");
    }
}

#[test]
fn doubles_are_network_edges() {
    let edges = six_edge_network();
    let network: Vec<Segment> = edges.iter().map(|e| e.canonical()).collect();
    for edge in doubles(&edges) {
        assert!(network.contains(&edge), "{edge:?} is not in the network");
        assert_eq!(edge, edge.canonical());
    }
}

#[test]
fn star_pairs_leaves_through_centre() {
    // Four spokes: every leaf is odd, the centre is even.
    let edges = vec![
        seg(0, 0, 10, 0),
        seg(0, 0, 0, 10),
        seg(0, 0, -10, 0),
        seg(0, 0, 0, -10),
    ];
    let doubled = doubles(&edges);
    assert_eq!(doubled.len(), 4);
    for (node, degree) in degrees(&edges, &doubled) {
        assert_eq!(degree % 2, 0, "{node:?} has odd degree {degree}");
    }
}

#[test]
fn prefers_cheaper_pairing_over_nearest_neighbour() {
    // Odd nodes on a line at 0, 10, 11, 21. Greedy nearest pairing (10-11 then
    // 0-21) costs 22; the optimum pairs 0-10 and 11-21 for 20.
    let edges = vec![
        seg(0, 0, 10, 0),
        seg(10, 0, 11, 0),
        seg(11, 0, 21, 0),
        seg(10, 0, 10, 50),
        seg(11, 0, 11, 50),
        seg(10, 50, 11, 50),
    ];
    assert_eq!(doubles(&edges), vec![seg(0, 0, 10, 0), seg(11, 0, 21, 0)]);
}

#[test]
fn cancel_policy_matches_reject_when_no_conflict() {
    let graph = TrailGraph::build(&six_edge_network()).unwrap();
    assert_eq!(
        eulerize(&graph, ConflictPolicy::Cancel).unwrap(),
        eulerize(&graph, ConflictPolicy::Reject).unwrap()
    );
}
