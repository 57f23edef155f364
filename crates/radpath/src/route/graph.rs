use std::cmp::Ordering;
use std::collections::{BTreeMap, BinaryHeap, HashMap};

use super::error::RouteError;
use super::types::{Point, Segment};

/// Simple weighted undirected graph of a trail network.
///
/// Nodes are deduplicated by exact coordinate equality. Parallel input edges collapse
/// into one graph edge. Edge weight is the Euclidean length of the segment.
#[derive(Debug, Clone, Default)]
pub struct TrailGraph {
    /// Adjacency map: for each node, its neighbours and the connecting edge weight.
    /// BTreeMaps keep iteration ordered by coordinate, which makes every traversal
    /// of the graph reproducible.
    adjacency: BTreeMap<Point, BTreeMap<Point, f64>>,
    edge_count: usize,
}

impl TrailGraph {
    /// Build the graph from an edge list.
    ///
    /// Fails with `MalformedInput` if any edge has coincident endpoints.
    pub fn build(edges: &[Segment]) -> Result<Self, RouteError> {
        let mut graph = Self::default();
        for edge in edges {
            if edge.is_degenerate() {
                return Err(RouteError::malformed(format!(
                    "edge {edge} has zero length"
                )));
            }
            let weight = edge.length();
            let inserted = graph
                .adjacency
                .entry(edge.a)
                .or_default()
                .insert(edge.b, weight)
                .is_none();
            graph.adjacency.entry(edge.b).or_default().insert(edge.a, weight);
            if inserted {
                graph.edge_count += 1;
            }
        }
        Ok(graph)
    }

    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }

    /// Check if a node is part of the graph.
    pub fn contains(&self, node: &Point) -> bool {
        self.adjacency.contains_key(node)
    }

    /// Number of incident edges. Zero for unknown nodes.
    pub fn degree(&self, node: &Point) -> usize {
        self.adjacency.get(node).map_or(0, BTreeMap::len)
    }

    /// Neighbours of a node with the weight of the connecting edge, in coordinate order.
    pub fn neighbors(&self, node: &Point) -> impl Iterator<Item = (Point, f64)> + '_ {
        self.adjacency
            .get(node)
            .into_iter()
            .flat_map(|n| n.iter().map(|(&p, &w)| (p, w)))
    }

    /// Weight of the edge joining `a` and `b`, if they are adjacent.
    pub fn edge_weight(&self, a: &Point, b: &Point) -> Option<f64> {
        self.adjacency.get(a).and_then(|n| n.get(b)).copied()
    }

    pub fn has_edge(&self, a: &Point, b: &Point) -> bool {
        self.edge_weight(a, b).is_some()
    }

    /// Nodes with odd degree, lazily, in coordinate order.
    pub fn odd_degree_nodes(&self) -> impl Iterator<Item = Point> + '_ {
        self.adjacency
            .iter()
            .filter(|(_, n)| n.len() % 2 == 1)
            .map(|(&p, _)| p)
    }

    /// Shortest path between two nodes.
    ///
    /// Returns `Unreachable` if either node is unknown or they lie in different
    /// connected components.
    pub fn shortest_path(&self, from: Point, to: Point) -> Result<ShortestPath, RouteError> {
        let tree = self.shortest_paths_from(from);
        tree.path_to(to)
            .ok_or(RouteError::Unreachable { from, to })
    }

    /// Single-source Dijkstra over edge lengths.
    ///
    /// The returned tree answers distance and path queries for every reachable node.
    pub fn shortest_paths_from(&self, source: Point) -> ShortestPathTree {
        let mut distance: HashMap<Point, f64> = HashMap::new();
        let mut previous: HashMap<Point, Point> = HashMap::new();

        if !self.contains(&source) {
            return ShortestPathTree {
                source,
                distance,
                previous,
            };
        }

        let mut open = BinaryHeap::new();
        distance.insert(source, 0.0);
        open.push(QueueEntry {
            cost: 0.0,
            node: source,
        });

        while let Some(QueueEntry { cost, node }) = open.pop() {
            // Skip stale entries.
            if let Some(&best) = distance.get(&node) {
                if cost > best {
                    continue;
                }
            }

            for (neighbor, weight) in self.neighbors(&node) {
                let next_cost = cost + weight;
                // Only strictly better paths replace an existing one, so ties keep
                // the first path found in coordinate order.
                if let Some(&best) = distance.get(&neighbor) {
                    if next_cost >= best {
                        continue;
                    }
                }
                distance.insert(neighbor, next_cost);
                previous.insert(neighbor, node);
                open.push(QueueEntry {
                    cost: next_cost,
                    node: neighbor,
                });
            }
        }

        ShortestPathTree {
            source,
            distance,
            previous,
        }
    }
}

/// Priority queue entry with deterministic ordering.
/// BinaryHeap is a max-heap, so the ordering is reversed (lowest cost = highest priority).
#[derive(Debug)]
struct QueueEntry {
    cost: f64,
    node: Point,
}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueueEntry {}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .partial_cmp(&self.cost)
            .unwrap_or(Ordering::Equal)
            .then(other.node.cmp(&self.node))
    }
}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A node sequence from source to target and its total length.
#[derive(Debug, Clone, PartialEq)]
pub struct ShortestPath {
    pub nodes: Vec<Point>,
    pub distance: f64,
}

impl ShortestPath {
    /// The consecutive segments along the path, oriented from source to target.
    pub fn segments(&self) -> impl Iterator<Item = Segment> + '_ {
        self.nodes.windows(2).map(|w| Segment::new(w[0], w[1]))
    }
}

/// Result of a single-source shortest path search.
#[derive(Debug, Clone)]
pub struct ShortestPathTree {
    source: Point,
    distance: HashMap<Point, f64>,
    previous: HashMap<Point, Point>,
}

impl ShortestPathTree {
    pub fn distance_to(&self, target: &Point) -> Option<f64> {
        self.distance.get(target).copied()
    }

    /// Reconstruct the path to `target` by walking predecessor links.
    pub fn path_to(&self, target: Point) -> Option<ShortestPath> {
        let distance = self.distance_to(&target)?;
        let mut nodes = vec![target];
        let mut current = target;
        while current != self.source {
            current = *self.previous.get(&current)?;
            nodes.push(current);
        }
        nodes.reverse();
        Some(ShortestPath { nodes, distance })
    }
}

#[cfg(test)]
mod unit_tests {
    use super::*;

    fn seg(a: (i32, i32), b: (i32, i32)) -> Segment {
        Segment::new(Point::new(a.0, a.1), Point::new(b.0, b.1))
    }

    #[test]
    fn test_parallel_edges_collapse() {
        let g = TrailGraph::build(&[seg((0, 0), (3, 4)), seg((3, 4), (0, 0))]).unwrap();
        assert_eq!(g.node_count(), 2);
        assert_eq!(g.edge_count(), 1);
        assert_eq!(g.degree(&Point::new(0, 0)), 1);
        assert_eq!(g.edge_weight(&Point::new(0, 0), &Point::new(3, 4)), Some(5.0));
    }

    #[test]
    fn test_zero_length_edge_rejected() {
        let err = TrailGraph::build(&[seg((1, 1), (1, 1))]).unwrap_err();
        assert!(matches!(err, RouteError::MalformedInput { .. }));
    }

    #[test]
    fn test_odd_degree_nodes_sorted() {
        // Path (5,0)-(0,0)-(2,0): endpoints are odd.
        let g = TrailGraph::build(&[seg((5, 0), (0, 0)), seg((0, 0), (2, 0))]).unwrap();
        let odd: Vec<Point> = g.odd_degree_nodes().collect();
        assert_eq!(odd, vec![Point::new(2, 0), Point::new(5, 0)]);
    }

    #[test]
    fn test_shortest_path_prefers_shorter_detour() {
        // Square with a long diagonal replaced by two short sides.
        let g = TrailGraph::build(&[
            seg((0, 0), (10, 0)),
            seg((10, 0), (10, 10)),
            seg((0, 0), (0, 30)),
            seg((0, 30), (10, 10)),
        ])
        .unwrap();
        let path = g.shortest_path(Point::new(0, 0), Point::new(10, 10)).unwrap();
        assert_eq!(
            path.nodes,
            vec![Point::new(0, 0), Point::new(10, 0), Point::new(10, 10)]
        );
        assert!((path.distance - 20.0).abs() < 1e-9);
        assert_eq!(path.segments().count(), 2);
    }

    #[test]
    fn test_shortest_path_to_self() {
        let g = TrailGraph::build(&[seg((0, 0), (1, 0))]).unwrap();
        let path = g.shortest_path(Point::new(0, 0), Point::new(0, 0)).unwrap();
        assert_eq!(path.nodes, vec![Point::new(0, 0)]);
        assert_eq!(path.distance, 0.0);
    }

    #[test]
    fn test_unreachable_between_components() {
        let g = TrailGraph::build(&[seg((0, 0), (1, 0)), seg((5, 5), (6, 5))]).unwrap();
        let err = g
            .shortest_path(Point::new(0, 0), Point::new(6, 5))
            .unwrap_err();
        assert_eq!(
            err,
            RouteError::Unreachable {
                from: Point::new(0, 0),
                to: Point::new(6, 5)
            }
        );
    }

    #[test]
    fn test_unknown_source_is_unreachable() {
        let g = TrailGraph::build(&[seg((0, 0), (1, 0))]).unwrap();
        assert!(g.shortest_path(Point::new(9, 9), Point::new(0, 0)).is_err());
    }
}
