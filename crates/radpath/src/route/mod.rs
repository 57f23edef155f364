pub mod error;
pub mod eulerize;
pub mod graph;
pub mod loops;
pub mod matching;
pub mod overlay;
pub mod serialize;
pub mod trail;
pub mod types;

#[cfg(test)]
mod tests;

use std::collections::HashSet;

use tracing::{debug, info, trace, warn};

use error::RouteError;
use eulerize::eulerize;
use graph::TrailGraph;
use loops::segment_loops;
use overlay::RouteStats;
use serialize::trail_to_string;
use trail::{Trail, construct_trail};
use types::{PlannerConfig, RouteOutput, Segment};

/// A complete route over a trail network.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    /// The network, parallel duplicates removed, in input order.
    pub edges: Vec<Segment>,
    /// Edges walked twice, canonical and sorted.
    pub double_edges: Vec<Segment>,
    pub trail: Trail,
    /// Loop colour per trail step.
    pub colours: Vec<usize>,
}

impl Route {
    pub fn stats(&self) -> RouteStats {
        RouteStats::measure(&self.edges, &self.double_edges, self.trail.steps())
    }

    pub fn into_output(self) -> RouteOutput {
        let (steps, loop_breaks) = self.trail.into_parts();
        RouteOutput {
            double_edges: self.double_edges,
            path: Some(steps),
            colours: Some(self.colours),
            loop_breaks,
            error: None,
        }
    }
}

/// Drop repeated edges (in either orientation), keeping the first occurrence.
///
/// The network is a simple graph; a segment listed twice is still one segment.
pub fn dedupe_edges(edges: &[Segment]) -> Vec<Segment> {
    let mut seen = HashSet::new();
    let deduped: Vec<Segment> = edges
        .iter()
        .copied()
        .filter(|e| seen.insert(e.canonical()))
        .collect();
    if deduped.len() < edges.len() {
        debug!(dropped = edges.len() - deduped.len(), "Dropped parallel input edges");
    }
    deduped
}

/// Choose the edges that must be walked twice to close the route.
pub fn choose_double_edges(
    edges: &[Segment],
    config: &PlannerConfig,
) -> Result<Vec<Segment>, RouteError> {
    let graph = TrailGraph::build(edges)?;
    debug!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "Built trail graph"
    );
    eulerize(&graph, config.conflict_policy)
}

/// Walk `edges` plus `double_edges` and colour the resulting trail by loop.
pub fn build_route(
    edges: Vec<Segment>,
    double_edges: Vec<Segment>,
    config: &PlannerConfig,
) -> Result<Route, RouteError> {
    let trail = construct_trail(&edges, &double_edges, config.loop_lenience)?;
    debug!(
        steps = trail.len(),
        loops = trail.loop_breaks().len(),
        closed = trail.is_closed(),
        "Walked trail"
    );
    trace!(trail = %trail_to_string(trail.steps()));
    let colours = segment_loops(trail.steps(), config.loop_lenience, config.palette_size);
    Ok(Route {
        edges,
        double_edges,
        trail,
        colours,
    })
}

/// Plan a route covering every edge of a trail network.
///
/// Runs the whole pipeline: the graph is built and eulerized with the
/// minimum retraced distance, then walked into a single trail that starts with
/// the first input edge and is split into coloured loops.
///
/// # Arguments
/// * `edges` — The network as line segments between integer map coordinates.
/// * `config` — Loop detection and conflict handling settings.
///
/// # Returns
/// The route, or the first error that stopped it.
pub fn plan_route(edges: &[Segment], config: &PlannerConfig) -> Result<Route, RouteError> {
    let edges = dedupe_edges(edges);
    let double_edges = choose_double_edges(&edges, config)?;
    build_route(edges, double_edges, config)
}

/// Plan a route and shape the result for API callers.
///
/// Never fails: errors are reported inside the output. A disjoint network still
/// reports the edges that would have been doubled; an error before that point
/// reports none. An empty network yields an empty, successful route.
pub fn route_output(edges: &[Segment], config: &PlannerConfig) -> RouteOutput {
    if edges.is_empty() {
        return RouteOutput::empty();
    }
    let edges = dedupe_edges(edges);

    let double_edges = match choose_double_edges(&edges, config) {
        Ok(double_edges) => double_edges,
        Err(err) => {
            warn!(kind = ?err.kind(), "{err}");
            return RouteOutput::failure(Vec::new(), &err);
        }
    };

    match build_route(edges, double_edges.clone(), config) {
        Ok(route) => {
            info!(
                steps = route.trail.len(),
                doubled = route.double_edges.len(),
                "Route planned"
            );
            route.into_output()
        }
        Err(err) => {
            warn!(kind = ?err.kind(), "{err}");
            RouteOutput::failure(double_edges, &err)
        }
    }
}
