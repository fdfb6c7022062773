// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use crate::{Error, Graph, Metric, PathResult};

/// Drawable representation of a route.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteGeometry {
    /// Nodes along the route, as returned by the route search.
    pub nodes: Vec<i64>,

    /// Positions along the route: node positions, interleaved with the
    /// shape points of the edges between them.
    pub coordinates: Vec<(f64, f64)>,

    /// Total cost of the route.
    pub cost: f64,
}

impl RouteGeometry {
    /// Returns the sum of distances between consecutive [coordinates](RouteGeometry::coordinates).
    pub fn length(&self, metric: Metric) -> f64 {
        self.coordinates
            .windows(2)
            .map(|pair| metric.distance(pair[0].0, pair[0].1, pair[1].0, pair[1].1))
            .sum()
    }

    /// Returns the name of the road used for every hop along the route,
    /// see [Graph::road_names].
    pub fn road_names(&self, g: &Graph) -> Vec<Option<Arc<str>>> {
        g.road_names(&self.nodes)
    }
}

/// Turns a [PathResult] into a [RouteGeometry].
///
/// Between every pair of consecutive nodes, the shape of the cheapest edge is used.
/// Returns [Error::DegeneratePath] if the route would have fewer than 2 distinct
/// points; this is the case for unreachable targets and for single-node paths.
/// Callers should treat this as "no usable route".
pub fn assemble(g: &Graph, path: &PathResult) -> Result<RouteGeometry, Error> {
    let nodes = path.nodes();
    let mut coordinates = Vec::with_capacity(nodes.len());

    if let Some(&first) = nodes.first() {
        coordinates.push(g.node_coordinates(first)?);
    }

    for pair in nodes.windows(2) {
        if let Some(edge) = g.get_edge(pair[0], pair[1]) {
            coordinates.extend_from_slice(&edge.geometry);
        }
        coordinates.push(g.node_coordinates(pair[1])?);
    }

    let points = match coordinates.first() {
        None => 0,
        Some(first) if coordinates.iter().all(|c| c == first) => 1,
        Some(_) => 2,
    };
    if points < 2 {
        return Err(Error::DegeneratePath { points });
    }

    Ok(RouteGeometry {
        nodes: nodes.to_vec(),
        coordinates,
        cost: path.cost(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Edge, Node};

    fn graph() -> Graph {
        Graph::build(
            [
                Node { id: 1, x: 0.0, y: 0.0 },
                Node { id: 2, x: 3.0, y: 0.0 },
                Node { id: 3, x: 3.0, y: 4.0 },
                Node { id: 4, x: 3.0, y: 4.0 },
            ],
            [
                (1, Edge::new(2, 5.0).with_geometry(vec![(1.0, 1.0), (2.0, 1.0)])),
                (1, Edge::new(2, 3.0)),
                (2, Edge::new(3, 4.0).with_geometry(vec![(3.0, 2.0)])),
                (3, Edge::new(4, 0.0)),
            ],
        )
        .unwrap()
    }

    #[test]
    fn assembles_shape_of_cheapest_edges() {
        let g = graph();
        let route = assemble(
            &g,
            &PathResult::Reachable {
                nodes: vec![1, 2, 3],
                cost: 7.0,
            },
        )
        .unwrap();

        assert_eq!(route.nodes, vec![1, 2, 3]);
        assert_eq!(
            route.coordinates,
            vec![(0.0, 0.0), (3.0, 0.0), (3.0, 2.0), (3.0, 4.0)]
        );
        assert_eq!(route.cost, 7.0);
        assert_eq!(route.length(Metric::Euclidean), 7.0);
    }

    #[test]
    fn degenerate() {
        let g = graph();
        assert_eq!(
            assemble(&g, &PathResult::Unreachable),
            Err(Error::DegeneratePath { points: 0 })
        );
        assert_eq!(
            assemble(
                &g,
                &PathResult::Reachable {
                    nodes: vec![2],
                    cost: 0.0
                }
            ),
            Err(Error::DegeneratePath { points: 1 })
        );

        // Two nodes, but at the same position
        assert_eq!(
            assemble(
                &g,
                &PathResult::Reachable {
                    nodes: vec![3, 4],
                    cost: 0.0
                }
            ),
            Err(Error::DegeneratePath { points: 1 })
        );
    }

    #[test]
    fn unknown_node() {
        let g = graph();
        assert_eq!(
            assemble(
                &g,
                &PathResult::Reachable {
                    nodes: vec![1, 9],
                    cost: 1.0
                }
            ),
            Err(Error::UnknownNode(9))
        );
    }
}
