// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::MalformedGraph;

/// Error conditions which may occur when querying a [Graph](crate::Graph).
///
/// A missing route is not an error - see [PathResult::Unreachable](crate::PathResult::Unreachable).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// The graph could not be built.
    #[error("malformed graph: {0}")]
    Malformed(#[from] MalformedGraph),

    /// A query referenced a node which doesn't exist in the graph.
    #[error("unknown node: {0}")]
    UnknownNode(i64),

    /// Nearest-node lookup was attempted on a graph without nodes.
    #[error("nearest-node lookup on an empty index")]
    EmptyIndex,

    /// A route has fewer than 2 distinct points, and can't be used as a route.
    #[error("degenerate path with {points} distinct point(s)")]
    DegeneratePath { points: usize },

    /// Route search has exceeded its limit of steps.
    /// Either the nodes are really far apart, or no route exists.
    ///
    /// Concluding that no route exists requires traversing the whole graph,
    /// which can result in a denial-of-service. The step limit protects
    /// against resource exhaustion.
    #[error("step limit exceeded")]
    StepLimitExceeded,

    /// Route search was abandoned through a [CancelToken](crate::CancelToken).
    #[error("search cancelled")]
    Cancelled,
}
