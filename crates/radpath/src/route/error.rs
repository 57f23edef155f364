use thiserror::Error;

use super::types::{FailureKind, Point, Segment};

/// Everything that can stop a route from being computed.
///
/// Every variant is deterministic for a given input; retrying never helps.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RouteError {
    /// Degenerate edge or unusable coordinate data, rejected before graph construction.
    #[error("Malformed input: {reason}")]
    MalformedInput { reason: String },

    /// No path exists between two nodes of the graph.
    #[error("No path from {from} to {to}")]
    Unreachable { from: Point, to: Point },

    /// Odd-degree nodes sit in different connected components.
    #[error("Cannot eulerize: odd nodes {from} and {to} are in different components")]
    Infeasible { from: Point, to: Point },

    /// Rural-postman expansion selected the same edge more than once.
    #[error("Edge {edge} was selected for duplication {count} times")]
    DuplicateConflict { edge: Segment, count: usize },

    /// Unconsumed edges remain that the trail can never reach.
    #[error("Disjoint graph: {remaining} edge(s) are not reachable from the trail")]
    DisjointGraph { remaining: usize },
}

impl RouteError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedInput {
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            Self::MalformedInput { .. } => FailureKind::MalformedInput,
            Self::Unreachable { .. } => FailureKind::Unreachable,
            Self::Infeasible { .. } => FailureKind::Infeasible,
            Self::DuplicateConflict { .. } => FailureKind::DuplicateConflict,
            Self::DisjointGraph { .. } => FailureKind::DisjointGraph,
        }
    }
}
