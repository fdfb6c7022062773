// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::{Error, Graph, Metric, Node};

/// Snaps arbitrary positions onto nodes of a [Graph].
///
/// Implementations must be deterministic: when multiple nodes are equally close,
/// the one with the lowest id must be returned.
pub trait Locate {
    /// Returns the id of the node closest to `(x, y)`,
    /// or [Error::EmptyIndex] if there are no nodes at all.
    fn nearest(&self, x: f64, y: f64) -> Result<i64, Error>;
}

/// KDTree implements the [k-d tree data structure](https://en.wikipedia.org/wiki/K-d_tree),
/// which can be used to speed up nearest-neighbor search for large datasets. Practice shows
/// that [Graph::find_nearest_node] takes significantly more time than route search
/// when matching many facilities. A k-d tree can help with that, trading memory usage
/// for CPU time.
///
/// The tree partitions space along `x` and `y` alternately. This is exact for
/// [Metric::Euclidean]. With [Metric::Haversine] the pruning is an approximation,
/// resulting in undefined behavior when points are close to the ante meridian
/// (180°/-180° longitude) or poles (90°/-90° latitude), or when the data spans
/// multiple continents.
#[derive(Debug, Clone)]
pub struct KDTree {
    root: Option<Box<Branch>>,
    metric: Metric,
}

#[derive(Debug, Clone)]
struct Branch {
    pivot: Node,
    left: Option<Box<Branch>>,
    right: Option<Box<Branch>>,
}

impl KDTree {
    /// Builds a k-d tree over all nodes of a [Graph].
    pub fn from_graph(g: &Graph, metric: Metric) -> Self {
        Self::from_iter(g.iter().copied(), metric)
    }

    /// Builds a k-d tree from an iterable of [Nodes](Node).
    pub fn from_iter<I: IntoIterator<Item = Node>>(nodes: I, metric: Metric) -> Self {
        let mut nodes = nodes.into_iter().collect::<Vec<_>>();
        Self::build(nodes.as_mut_slice(), metric)
    }

    /// Builds a k-d tree from a mutable slice of [Nodes](Node). Nodes will be reordered
    /// in the slice to facilitate building the tree.
    pub fn build(nodes: &mut [Node], metric: Metric) -> Self {
        Self {
            root: Branch::build(nodes, false),
            metric,
        }
    }

    /// Returns `true` if the tree contains no nodes.
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Finds the closest [Node] to the given position, breaking ties by the lowest id.
    pub fn find_nearest_node(&self, x: f64, y: f64) -> Option<Node> {
        self.root
            .as_ref()
            .map(|root| root.find_nearest_node(x, y, self.metric, false).0)
    }
}

impl Locate for KDTree {
    fn nearest(&self, x: f64, y: f64) -> Result<i64, Error> {
        self.find_nearest_node(x, y)
            .map(|n| n.id)
            .ok_or(Error::EmptyIndex)
    }
}

impl Branch {
    fn find_nearest_node(&self, x: f64, y: f64, metric: Metric, y_divides: bool) -> (Node, f64) {
        // Start by assuming that pivot is the closest
        let mut best = self.pivot;
        let mut best_dist = metric.distance(x, y, best.x, best.y);

        // Select which branch to recurse into first
        let first_left = if y_divides { y < best.y } else { x < best.x };
        let (first, second) = if first_left {
            (&self.left, &self.right)
        } else {
            (&self.right, &self.left)
        };

        if let Some(ref branch) = first {
            let (alt, alt_dist) = branch.find_nearest_node(x, y, metric, !y_divides);
            if is_better(alt, alt_dist, best, best_dist) {
                best = alt;
                best_dist = alt_dist;
            }
        }

        if let Some(ref branch) = second {
            // A closer (or equally close, but with a lower id) node is possible
            // in the second branch if and only if the splitting axis is not further
            // away than the current best candidate.
            let (axis_x, axis_y) = if y_divides {
                (x, self.pivot.y)
            } else {
                (self.pivot.x, y)
            };
            let dist_to_axis = metric.distance(x, y, axis_x, axis_y);

            if dist_to_axis <= best_dist {
                let (alt, alt_dist) = branch.find_nearest_node(x, y, metric, !y_divides);
                if is_better(alt, alt_dist, best, best_dist) {
                    best = alt;
                    best_dist = alt_dist;
                }
            }
        }

        (best, best_dist)
    }

    fn build(nodes: &mut [Node], y_divides: bool) -> Option<Box<Self>> {
        match nodes.len() {
            0 => None,
            1 => Some(Box::new(Self {
                pivot: nodes[0],
                left: None,
                right: None,
            })),
            _ => {
                if y_divides {
                    nodes.sort_by(|a, b| a.y.total_cmp(&b.y));
                } else {
                    nodes.sort_by(|a, b| a.x.total_cmp(&b.x));
                }
                let median = nodes.len() / 2;
                let pivot = nodes[median];
                let (left, right_and_pivot) = nodes.split_at_mut(median);
                let right = &mut right_and_pivot[1..];
                Some(Box::new(Self {
                    pivot,
                    left: Self::build(left, !y_divides),
                    right: Self::build(right, !y_divides),
                }))
            }
        }
    }
}

#[inline]
fn is_better(alt: Node, alt_dist: f64, best: Node, best_dist: f64) -> bool {
    alt_dist < best_dist || (alt_dist == best_dist && alt.id < best.id)
}
