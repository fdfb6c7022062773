// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::btree_map::{BTreeMap, Entry};
use std::sync::Arc;

use crate::{Edge, Error, Metric, Node};

/// Reasons why a [Graph] can't be built.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MalformedGraph {
    #[error("node {0} is defined more than once")]
    DuplicateNode(i64),

    #[error("node {0} has non-finite coordinates")]
    InvalidCoordinates(i64),

    #[error("edge {from} -> {to} references unknown node {missing}")]
    UnknownNode { from: i64, to: i64, missing: i64 },

    #[error("edge {from} -> {to} has negative cost {cost}")]
    NegativeCost { from: i64, to: i64, cost: f64 },

    #[error("edge {from} -> {to} has non-finite cost {cost}")]
    NonFiniteCost { from: i64, to: i64, cost: f64 },
}

/// Represents a road network as a set of [Nodes](Node)
/// and directed [Edges](Edge) between them.
///
/// A graph is validated once by [Graph::build] and is immutable afterwards,
/// so it can be freely shared between threads running queries.
///
/// Multiple (parallel) edges between the same pair of nodes are allowed.
/// Route search naturally picks the cheapest one, and [Graph::get_edge]
/// returns it.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Graph(BTreeMap<i64, (Node, Vec<Edge>)>);

impl Graph {
    /// Builds a directed graph from the provided nodes and `(from, edge)` pairs.
    pub fn build<N, E>(nodes: N, edges: E) -> Result<Self, MalformedGraph>
    where
        N: IntoIterator<Item = Node>,
        E: IntoIterator<Item = (i64, Edge)>,
    {
        let mut map = BTreeMap::new();
        for node in nodes {
            if !node.x.is_finite() || !node.y.is_finite() {
                return Err(MalformedGraph::InvalidCoordinates(node.id));
            }

            match map.entry(node.id) {
                Entry::Vacant(e) => {
                    e.insert((node, Vec::default()));
                }
                Entry::Occupied(_) => return Err(MalformedGraph::DuplicateNode(node.id)),
            }
        }

        for (from, edge) in edges {
            if !map.contains_key(&edge.to) {
                return Err(MalformedGraph::UnknownNode {
                    from,
                    to: edge.to,
                    missing: edge.to,
                });
            }

            if edge.cost.is_nan() || edge.cost.is_infinite() {
                return Err(MalformedGraph::NonFiniteCost {
                    from,
                    to: edge.to,
                    cost: edge.cost,
                });
            } else if edge.cost < 0.0 {
                return Err(MalformedGraph::NegativeCost {
                    from,
                    to: edge.to,
                    cost: edge.cost,
                });
            }

            match map.get_mut(&from) {
                Some((_, outgoing)) => outgoing.push(edge),
                None => {
                    return Err(MalformedGraph::UnknownNode {
                        from,
                        to: edge.to,
                        missing: from,
                    })
                }
            }
        }

        let g = Self(map);
        log::debug!(
            "built graph with {} nodes and {} edges",
            g.len(),
            g.edge_count()
        );
        Ok(g)
    }

    /// Builds a graph where every provided edge can be traversed in both directions.
    ///
    /// Each `(from, edge)` pair is stored twice: as-is and reversed, with the
    /// same cost and name, and the shape geometry in reverse order.
    pub fn build_undirected<N, E>(nodes: N, edges: E) -> Result<Self, MalformedGraph>
    where
        N: IntoIterator<Item = Node>,
        E: IntoIterator<Item = (i64, Edge)>,
    {
        let edges = edges.into_iter().flat_map(|(from, edge)| {
            let to = edge.to;
            let reversed = Edge {
                to: from,
                cost: edge.cost,
                name: edge.name.clone(),
                geometry: edge.geometry.iter().rev().copied().collect(),
            };
            [(from, edge), (to, reversed)]
        });
        Self::build(nodes, edges)
    }

    /// Returns the number of nodes in the graph.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of (directed) edges in the graph.
    pub fn edge_count(&self) -> usize {
        self.0.values().map(|(_, edges)| edges.len()).sum()
    }

    /// Returns an iterator over all [Nodes](Node) in the graph, ordered by id.
    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.0.values().map(|(node, _)| node)
    }

    /// Retrieves a [Node] with the provided id.
    pub fn get_node(&self, id: i64) -> Option<Node> {
        self.0.get(&id).map(|&(node, _)| node)
    }

    /// Returns the `(x, y)` position of a node.
    pub fn node_coordinates(&self, id: i64) -> Result<(f64, f64), Error> {
        self.get_node(id)
            .map(|n| (n.x, n.y))
            .ok_or(Error::UnknownNode(id))
    }

    /// Gets all outgoing [Edges](Edge) from a node with a given id.
    /// Returns an empty slice for unknown nodes.
    pub fn get_edges(&self, from_id: i64) -> &[Edge] {
        self.0
            .get(&from_id)
            .map(|(_, e)| e.as_slice())
            .unwrap_or_default()
    }

    /// Returns `(neighbor_id, cost)` of every outgoing edge of a node.
    pub fn neighbors(&self, id: i64) -> Result<impl Iterator<Item = (i64, f64)> + '_, Error> {
        self.0
            .get(&id)
            .map(|(_, edges)| edges.iter().map(|e| (e.to, e.cost)))
            .ok_or(Error::UnknownNode(id))
    }

    /// Gets the cheapest [Edge] from one node to another.
    /// On equal costs, the edge provided first wins.
    pub fn get_edge(&self, from_id: i64, to_id: i64) -> Option<&Edge> {
        self.get_edges(from_id)
            .iter()
            .filter(|e| e.to == to_id)
            .reduce(|best, e| if e.cost < best.cost { e } else { best })
    }

    /// Returns the name of the road used for every hop along a sequence of nodes.
    ///
    /// The cheapest edge between consecutive nodes is consulted;
    /// unnamed roads and missing edges yield `None`.
    pub fn road_names(&self, nodes: &[i64]) -> Vec<Option<Arc<str>>> {
        nodes
            .windows(2)
            .map(|pair| self.get_edge(pair[0], pair[1]).and_then(|e| e.name.clone()))
            .collect()
    }

    /// Finds the closest [Node] to the given position, breaking ties by the lowest id.
    ///
    /// This function requires computing the distance to every [Node] in the graph,
    /// and is not suitable for large graphs - use a [KDTree](crate::KDTree) instead.
    pub fn find_nearest_node(&self, x: f64, y: f64, metric: Metric) -> Option<Node> {
        self.iter()
            .map(|&nd| (metric.distance(x, y, nd.x, nd.y), nd))
            // Nodes are visited by ascending id, so keeping the first minimum
            // resolves ties to the lowest id.
            .reduce(|best, alt| if alt.0 < best.0 { alt } else { best })
            .map(|(_, nd)| nd)
    }

    /// Returns a [Locate](crate::Locate) implementation backed by
    /// [Graph::find_nearest_node].
    pub fn linear_locator(&self, metric: Metric) -> LinearScan<'_> {
        LinearScan { graph: self, metric }
    }
}

/// Linear-scan nearest-node lookup over a [Graph]. Each query takes O(n) time.
#[derive(Debug, Clone, Copy)]
pub struct LinearScan<'a> {
    graph: &'a Graph,
    metric: Metric,
}

impl crate::Locate for LinearScan<'_> {
    fn nearest(&self, x: f64, y: f64) -> Result<i64, Error> {
        self.graph
            .find_nearest_node(x, y, self.metric)
            .map(|n| n.id)
            .ok_or(Error::EmptyIndex)
    }
}
