use std::collections::BTreeMap;

use tracing::{debug, trace};

use super::error::RouteError;
use super::types::{Point, Segment, Step};

/// The unconsumed part of the working multigraph.
///
/// For each node, the remaining neighbours with their parallel-edge multiplicity.
/// Neighbour maps are ordered by coordinate, which fixes candidate order.
#[derive(Debug, Clone, Default)]
struct RemainingEdges {
    adjacency: BTreeMap<Point, BTreeMap<Point, usize>>,
    count: usize,
}

impl RemainingEdges {
    fn new<'a>(edges: impl IntoIterator<Item = &'a Segment>) -> Self {
        let mut remaining = Self::default();
        for edge in edges {
            for (from, to) in [(edge.a, edge.b), (edge.b, edge.a)] {
                *remaining
                    .adjacency
                    .entry(from)
                    .or_default()
                    .entry(to)
                    .or_default() += 1;
            }
            remaining.count += 1;
        }
        remaining
    }

    fn is_empty(&self) -> bool {
        self.count == 0
    }

    fn degree(&self, node: &Point) -> usize {
        self.adjacency
            .get(node)
            .map_or(0, |n| n.values().sum())
    }

    /// Candidate next nodes from `node`. Neighbours reachable over a doubled edge
    /// come first; if any exist, the others are not offered.
    fn candidates(&self, node: &Point) -> Vec<Point> {
        let Some(neighbors) = self.adjacency.get(node) else {
            return Vec::new();
        };
        let doubled: Vec<Point> = neighbors
            .iter()
            .filter(|&(_, &n)| n > 1)
            .map(|(&p, _)| p)
            .collect();
        if doubled.is_empty() {
            neighbors.keys().copied().collect()
        } else {
            doubled
        }
    }

    fn remove(&mut self, a: Point, b: Point) {
        for (from, to) in [(a, b), (b, a)] {
            if let Some(neighbors) = self.adjacency.get_mut(&from) {
                if let Some(n) = neighbors.get_mut(&to) {
                    *n -= 1;
                    if *n == 0 {
                        neighbors.remove(&to);
                    }
                }
                if neighbors.is_empty() {
                    self.adjacency.remove(&from);
                }
            }
        }
        self.count -= 1;
    }
}

/// An ordered walk over every edge of the working multigraph.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Trail {
    steps: Vec<Step>,
    /// Trail indices at which a loop was closed, ascending.
    loop_breaks: Vec<usize>,
}

impl Trail {
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// The steps and the loop breaks.
    pub fn into_parts(self) -> (Vec<Step>, Vec<usize>) {
        (self.steps, self.loop_breaks)
    }

    /// Indices into [`Trail::steps`] at which a new loop begins, ascending. A loop
    /// closed by the last step gives the trail length.
    pub fn loop_breaks(&self) -> &[usize] {
        &self.loop_breaks
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Whether every step starts where the previous one ended.
    pub fn is_continuous(&self) -> bool {
        self.steps.windows(2).all(|w| w[0].to == w[1].from)
    }

    /// Whether the trail ends where it started.
    pub fn is_closed(&self) -> bool {
        match (self.steps.first(), self.steps.last()) {
            (Some(first), Some(last)) => first.from == last.to,
            _ => true,
        }
    }
}

/// Where the walk continues from, and how it arrived there.
struct Cursor {
    node: Point,
    heading: Option<Step>,
}

/// Walk `edges` plus `duplicates` into a single trail.
///
/// The walk starts with the first edge as given and always continues as straight
/// as possible, preferring doubled edges. When it runs out of edges it resumes from
/// the most recent earlier node that still has some, splicing the new stretch into
/// the trail at that point. For an eulerized connected input this yields an Eulerian
/// circuit; if unconsumed edges can no longer be reached, fails with `DisjointGraph`.
///
/// `lenience` controls loop-break detection: revisiting a node of the current loop
/// more than `lenience` steps back closes that loop.
pub fn construct_trail(
    edges: &[Segment],
    duplicates: &[Segment],
    lenience: usize,
) -> Result<Trail, RouteError> {
    let Some(&first) = edges.first().or(duplicates.first()) else {
        return Ok(Trail::default());
    };

    let mut remaining = RemainingEdges::new(edges.iter().chain(duplicates));
    remaining.remove(first.a, first.b);
    let first = Step::new(first.a, first.b);

    let mut trail = Trail {
        steps: vec![first],
        loop_breaks: Vec::new(),
    };
    let mut insertion = 1;
    let mut cursor = Cursor {
        node: first.to,
        heading: Some(first),
    };
    let mut current_loop: Vec<Step> = vec![first];

    while !remaining.is_empty() {
        if remaining.degree(&cursor.node) == 0 {
            let Some((index, resume)) = backtrack(insertion, &trail.steps, &remaining) else {
                debug!(remaining = remaining.count, "No reachable edges left");
                return Err(RouteError::DisjointGraph {
                    remaining: remaining.count,
                });
            };
            trace!(from = insertion, to = index, "Backtracking");
            insertion = index;
            cursor = resume;
        }

        let candidates = remaining.candidates(&cursor.node);
        let next = choose_next(&cursor, &candidates).ok_or(RouteError::DisjointGraph {
            remaining: remaining.count,
        })?;

        remaining.remove(cursor.node, next);
        let step = Step::new(cursor.node, next);
        trail.steps.insert(insertion, step);
        // Breaks behind the splice point move with the steps they precede.
        for b in &mut trail.loop_breaks {
            if *b > insertion {
                *b += 1;
            }
        }
        insertion += 1;

        if closes_loop(&current_loop, next, lenience) {
            trail.loop_breaks.push(insertion);
            current_loop.clear();
        } else {
            current_loop.push(step);
        }

        cursor = Cursor {
            node: next,
            heading: Some(step),
        };
    }

    trail.loop_breaks.sort_unstable();
    Ok(trail)
}

/// Find the most recent trail position before `insertion` whose start node still
/// has unconsumed edges.
///
/// Returns the position to insert at and the cursor to resume from. The heading is
/// the step arriving at that node, or none at the very start of the trail.
fn backtrack(
    insertion: usize,
    steps: &[Step],
    remaining: &RemainingEdges,
) -> Option<(usize, Cursor)> {
    (0..insertion)
        .rev()
        .find(|&i| remaining.degree(&steps[i].from) > 0)
        .map(|i| {
            let cursor = Cursor {
                node: steps[i].from,
                heading: i.checked_sub(1).map(|prev| steps[prev]),
            };
            (i, cursor)
        })
}

/// Pick the candidate that continues most nearly straight on.
///
/// Minimises cosine distance between the incoming heading and the direction to
/// each candidate. Ties keep the earliest candidate. Without a heading the first
/// candidate is taken.
fn choose_next(cursor: &Cursor, candidates: &[Point]) -> Option<Point> {
    let Some(heading) = cursor.heading else {
        return candidates.first().copied();
    };
    let incoming = heading.heading();

    let mut best: Option<(Point, f64)> = None;
    for &candidate in candidates {
        let outgoing = cursor.node.vector_to(candidate);
        let distance = cosine_distance(incoming, outgoing);
        if best.is_none_or(|(_, d)| distance < d) {
            best = Some((candidate, distance));
        }
    }
    best.map(|(p, _)| p)
}

fn cosine_distance(a: (f64, f64), b: (f64, f64)) -> f64 {
    let dot = a.0 * b.0 + a.1 * b.1;
    let norms = a.0.hypot(a.1) * b.0.hypot(b.1);
    if norms == 0.0 {
        return 1.0;
    }
    1.0 - dot / norms
}

/// Whether arriving at `node` closes the current loop: the node was seen in this
/// loop, but not within its last `lenience` steps.
fn closes_loop(current_loop: &[Step], node: Point, lenience: usize) -> bool {
    let touches = |s: &Step| s.from == node || s.to == node;
    let recent = &current_loop[current_loop.len().saturating_sub(lenience)..];
    current_loop.iter().any(touches) && !recent.iter().any(touches)
}

#[cfg(test)]
mod unit_tests {
    use super::*;

    fn p(x: i32, y: i32) -> Point {
        Point::new(x, y)
    }

    #[test]
    fn test_cosine_distance_straight_and_reverse() {
        assert!(cosine_distance((1.0, 0.0), (2.0, 0.0)).abs() < 1e-12);
        assert!((cosine_distance((1.0, 0.0), (-1.0, 0.0)) - 2.0).abs() < 1e-12);
        assert!((cosine_distance((1.0, 0.0), (0.0, 3.0)) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_choose_next_prefers_straight_line() {
        let cursor = Cursor {
            node: p(10, 0),
            heading: Some(Step::new(p(0, 0), p(10, 0))),
        };
        let next = choose_next(&cursor, &[p(10, 10), p(20, 1), p(0, 5)]);
        assert_eq!(next, Some(p(20, 1)));
    }

    #[test]
    fn test_choose_next_tie_keeps_first() {
        let cursor = Cursor {
            node: p(10, 0),
            heading: Some(Step::new(p(0, 0), p(10, 0))),
        };
        // Both candidates turn by 90 degrees.
        let next = choose_next(&cursor, &[p(10, -5), p(10, 5)]);
        assert_eq!(next, Some(p(10, -5)));
    }

    #[test]
    fn test_choose_next_without_candidates() {
        let cursor = Cursor {
            node: p(0, 0),
            heading: None,
        };
        assert_eq!(choose_next(&cursor, &[]), None);
    }

    #[test]
    fn test_doubled_neighbours_take_priority() {
        let remaining = RemainingEdges::new(&[
            Segment::new(p(0, 0), p(1, 0)),
            Segment::new(p(0, 0), p(0, 1)),
            Segment::new(p(0, 1), p(0, 0)),
        ]);
        assert_eq!(remaining.candidates(&p(0, 0)), vec![p(0, 1)]);
        assert_eq!(remaining.degree(&p(0, 0)), 3);
    }

    #[test]
    fn test_remove_drops_exhausted_nodes() {
        let mut remaining = RemainingEdges::new(&[Segment::new(p(0, 0), p(1, 0))]);
        remaining.remove(p(1, 0), p(0, 0));
        assert!(remaining.is_empty());
        assert_eq!(remaining.degree(&p(0, 0)), 0);
        assert!(remaining.candidates(&p(0, 0)).is_empty());
    }

    #[test]
    fn test_closes_loop_outside_lenience() {
        let steps: Vec<Step> = (0..7).map(|i| Step::new(p(i, 0), p(i + 1, 0))).collect();
        assert!(closes_loop(&steps, p(0, 0), 5));
        assert!(!closes_loop(&steps, p(5, 0), 5));
        assert!(!closes_loop(&steps, p(42, 0), 5));
    }
}
