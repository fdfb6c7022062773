// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use crate::Graph;

/// Outcome of a route search towards a single target.
#[derive(Debug, Clone, PartialEq)]
pub enum PathResult {
    /// The target can be reached by following `nodes`, for a total of `cost`.
    ///
    /// If the source and target are the same node, `nodes` contains only that
    /// node and `cost` is zero. Such paths are [degenerate](PathResult::is_degenerate).
    Reachable { nodes: Vec<i64>, cost: f64 },

    /// There is no directed path from the source to the target.
    Unreachable,
}

impl PathResult {
    /// Returns the sequence of nodes along the path; empty if unreachable.
    pub fn nodes(&self) -> &[i64] {
        match self {
            Self::Reachable { nodes, .. } => nodes,
            Self::Unreachable => &[],
        }
    }

    /// Returns the total cost of the path, or [f64::INFINITY] if unreachable.
    pub fn cost(&self) -> f64 {
        match self {
            Self::Reachable { cost, .. } => *cost,
            Self::Unreachable => f64::INFINITY,
        }
    }

    pub fn is_reachable(&self) -> bool {
        matches!(self, Self::Reachable { .. })
    }

    /// Returns `true` if the path can't be used as a route,
    /// that is if it has fewer than 2 nodes.
    pub fn is_degenerate(&self) -> bool {
        self.nodes().len() < 2
    }

    /// Returns the name of the road used for every hop along the path,
    /// see [Graph::road_names].
    pub fn road_names(&self, g: &Graph) -> Vec<Option<Arc<str>>> {
        g.road_names(self.nodes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Edge, Node};

    #[test]
    fn unreachable() {
        let p = PathResult::Unreachable;
        assert!(p.nodes().is_empty());
        assert!(p.cost().is_infinite());
        assert!(!p.is_reachable());
        assert!(p.is_degenerate());
    }

    #[test]
    fn trivial() {
        let p = PathResult::Reachable {
            nodes: vec![4],
            cost: 0.0,
        };
        assert!(p.is_reachable());
        assert!(p.is_degenerate());
    }

    #[test]
    fn road_names() {
        let g = Graph::build(
            [
                Node { id: 1, x: 0.0, y: 0.0 },
                Node { id: 2, x: 1.0, y: 0.0 },
                Node { id: 3, x: 2.0, y: 0.0 },
            ],
            [
                (1, Edge::new(2, 1.0).with_name("Madison St")),
                (1, Edge::new(2, 3.0).with_name("Boren Ave")),
                (2, Edge::new(3, 1.0)),
            ],
        )
        .unwrap();

        let p = PathResult::Reachable {
            nodes: vec![1, 2, 3],
            cost: 2.0,
        };
        assert_eq!(p.road_names(&g), vec![Some(Arc::<str>::from("Madison St")), None]);
        assert!(PathResult::Unreachable.road_names(&g).is_empty());
    }
}
