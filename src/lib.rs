// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! Nearest-facility routing over weighted road networks.
//!
//! A [Graph] is built once from nodes and weighted, directed edges, and is never
//! mutated afterwards. Arbitrary points are snapped onto it with a [Locate]
//! implementation (a [KDTree] or a linear scan), shortest paths are found with
//! Dijkstra's algorithm, and a [Matcher] pairs every source [Facility] with the
//! cheapest reachable destination [Facility].
//!
//! # Example
//!
//! ```
//! use facroute::{Edge, Facility, Filter, Graph, KDTree, Matcher, Metric, Node};
//!
//! let g = Graph::build(
//!     [
//!         Node { id: 1, x: 0.0, y: 0.0 },
//!         Node { id: 2, x: 1.0, y: 0.0 },
//!         Node { id: 3, x: 2.0, y: 0.0 },
//!     ],
//!     [(1, Edge::new(2, 1.0)), (2, Edge::new(3, 1.0))],
//! )
//! .expect("valid graph");
//! let locator = KDTree::from_graph(&g, Metric::Euclidean);
//!
//! let hospitals = [Facility::new(10, 0.1, 0.0)];
//! let plants = [Facility::new(20, 2.0, 0.1).with_attribute("county", "KING")];
//!
//! let matcher = Matcher::new(&g, &locator);
//! let results = matcher.match_all(&hospitals, &plants, &Filter::equals("county", "KING"));
//! assert_eq!(results[0].destination().map(|d| d.id), Some(20));
//! assert_eq!(results[0].cost(), 2.0);
//! ```

mod dijkstra;
mod distance;
mod error;
mod facility;
mod geometry;
mod graph;
mod kd;
mod matcher;

pub use dijkstra::{
    shortest_path, shortest_paths, CancelToken, PathResult, SearchOptions, DEFAULT_STEP_LIMIT,
};
pub use distance::{earth_distance, Metric};
pub use error::Error;
pub use facility::{Facility, Filter};
pub use geometry::{assemble, RouteGeometry};
pub use graph::{Graph, LinearScan, MalformedGraph};
pub use kd::{KDTree, Locate};
pub use matcher::{MatchOptions, MatchResult, Matcher, Outcome};

/// Represents a point of the road network in a [Graph].
///
/// Coordinates are interpreted in one consistent frame. When used with
/// [Metric::Haversine], `x` is the longitude and `y` the latitude, in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Node {
    pub id: i64,
    pub x: f64,
    pub y: f64,
}

/// Represents an outgoing (one-way) connection from a specific [Node].
///
/// `cost` must be non-negative. Undirected roads are represented as two edges,
/// see [Graph::build_undirected].
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub to: i64,
    pub cost: f64,

    /// Display name of the road, if any.
    pub name: Option<std::sync::Arc<str>>,

    /// Intermediate shape points between the two nodes, excluding both endpoints.
    pub geometry: Vec<(f64, f64)>,
}

impl Edge {
    /// Creates an unnamed, straight edge.
    pub fn new(to: i64, cost: f64) -> Self {
        Self {
            to,
            cost,
            name: None,
            geometry: Vec::new(),
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_geometry(mut self, geometry: Vec<(f64, f64)>) -> Self {
        self.geometry = geometry;
        self
    }
}
