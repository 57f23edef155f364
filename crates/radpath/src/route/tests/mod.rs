mod eulerize;

use std::collections::{BTreeMap, HashSet};

use super::types::{PlannerConfig, Point, RouteOutput, Segment, Step};
use super::{Route, plan_route, route_output};

/// Helper to create a Point.
fn p(x: i32, y: i32) -> Point {
    Point::new(x, y)
}

/// Helper to create a Segment.
fn seg(x1: i32, y1: i32, x2: i32, y2: i32) -> Segment {
    Segment::new(p(x1, y1), p(x2, y2))
}

/// Helper to create a Step.
fn step(from: Point, to: Point) -> Step {
    Step::new(from, to)
}

fn config() -> PlannerConfig {
    PlannerConfig::default()
}

/// The six-edge network: a triangle with a second triangle and a spur hanging off it.
fn six_edge_network() -> Vec<Segment> {
    vec![
        seg(244, 313, 309, 421),
        seg(309, 421, 420, 359),
        seg(420, 359, 244, 313),
        seg(244, 313, 350, 237),
        seg(350, 237, 420, 359),
        seg(350, 237, 557, 134),
    ]
}

fn triangle() -> Vec<Segment> {
    vec![seg(0, 0, 100, 0), seg(100, 0, 50, 80), seg(50, 80, 0, 0)]
}

/// Plan a route, panicking with the error on failure.
fn plan(edges: &[Segment]) -> Route {
    match plan_route(edges, &config()) {
        Ok(route) => route,
        Err(err) => panic!("Route failed: {err}"),
    }
}

/// Canonical edge counts of the network plus its duplicates.
fn expected_multiset(edges: &[Segment], double_edges: &[Segment]) -> BTreeMap<Segment, usize> {
    let mut counts = BTreeMap::new();
    for edge in edges.iter().chain(double_edges) {
        *counts.entry(edge.canonical()).or_default() += 1;
    }
    counts
}

/// The undirected multiset of a trail's edges.
fn edge_multiset(steps: &[Step]) -> BTreeMap<Segment, usize> {
    let mut counts = BTreeMap::new();
    for step in steps {
        *counts.entry(step.segment()).or_default() += 1;
    }
    counts
}

/// Nodes touched by a trail.
fn visited_nodes(steps: &[Step]) -> HashSet<Point> {
    steps.iter().flat_map(|s| [s.from, s.to]).collect()
}

/// Degree of every node over the network plus its duplicates.
fn degrees(edges: &[Segment], double_edges: &[Segment]) -> BTreeMap<Point, usize> {
    let mut degrees = BTreeMap::new();
    for edge in edges.iter().chain(double_edges) {
        *degrees.entry(edge.a).or_default() += 1;
        *degrees.entry(edge.b).or_default() += 1;
    }
    degrees
}

/// Assert that a route covers its network exactly and forms a closed walk.
fn assert_valid_route(route: &Route) {
    let steps = route.trail.steps();
    assert_eq!(
        edge_multiset(steps),
        expected_multiset(&route.edges, &route.double_edges),
        "Trail does not cover the network plus duplicates exactly"
    );
    assert!(route.trail.is_continuous(), "Trail is broken: {steps:?}");
    assert!(route.trail.is_closed(), "Trail does not return to its start");
    assert_eq!(route.colours.len(), steps.len());
}

/// Assert that an API output carries the given failure kind.
fn assert_failed(output: &RouteOutput, kind: super::types::FailureKind) {
    match &output.error {
        Some(failure) => assert_eq!(failure.kind, kind, "{}", failure.message),
        None => panic!("Expected {kind:?}, got a successful route"),
    }
    assert_eq!(output.path, None);
    assert_eq!(output.colours, None);
}

/// Run the API pipeline with default settings.
fn output(edges: &[Segment]) -> RouteOutput {
    route_output(edges, &config())
}
