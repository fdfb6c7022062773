// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

use super::{PathResult, SearchOptions};
use crate::{Edge, Error, Graph};

#[derive(Debug, Clone, Copy)]
struct QueueItem {
    at: i64,
    cost: f64,
}

impl Ord for QueueItem {
    fn cmp(&self, other: &Self) -> Ordering {
        // NOTE: We revert the order of comparison,
        // as lower costs are considered better ("higher"),
        // and Rust's BinaryHeap is a max-heap.
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.at.cmp(&self.at))
    }
}

impl PartialOrd for QueueItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for QueueItem {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueueItem {}

fn reconstruct_path(came_from: &HashMap<i64, i64>, mut last: i64) -> Vec<i64> {
    let mut path = vec![last];

    while let Some(&nd) = came_from.get(&last) {
        path.push(nd);
        last = nd;
    }

    path.reverse();
    path
}

/// Uses [Dijkstra's algorithm](https://en.wikipedia.org/wiki/Dijkstra%27s_algorithm)
/// to find the shortest route between two nodes in the provided graph.
///
/// A missing route is reported as [PathResult::Unreachable], not as an error.
/// Searching from a node to itself yields a single-node path of zero cost.
pub fn shortest_path(
    g: &Graph,
    from_id: i64,
    to_id: i64,
    options: &SearchOptions,
) -> Result<PathResult, Error> {
    let mut paths = shortest_paths(g, from_id, &[to_id], options)?;
    Ok(paths.pop().unwrap_or(PathResult::Unreachable))
}

/// Uses a single run of [Dijkstra's algorithm](https://en.wikipedia.org/wiki/Dijkstra%27s_algorithm)
/// to find the shortest routes from one node to every node in `targets`.
///
/// The returned vector is aligned with `targets`. The search stops as soon as
/// all targets are settled, so asking for a handful of nearby targets doesn't
/// require exploring the whole graph.
///
/// `options.step_limit` limits how many nodes may be expanded before returning
/// [Error::StepLimitExceeded], and `options.cancel` is checked before every expansion.
pub fn shortest_paths(
    g: &Graph,
    from_id: i64,
    targets: &[i64],
    options: &SearchOptions,
) -> Result<Vec<PathResult>, Error> {
    if g.get_node(from_id).is_none() {
        return Err(Error::UnknownNode(from_id));
    }
    if let Some(&unknown) = targets.iter().find(|&&t| g.get_node(t).is_none()) {
        return Err(Error::UnknownNode(unknown));
    }

    let mut remaining: HashSet<i64> = targets.iter().copied().collect();
    let mut queue: BinaryHeap<QueueItem> = BinaryHeap::default();
    let mut came_from: HashMap<i64, i64> = HashMap::default();
    let mut known_costs: HashMap<i64, f64> = HashMap::default();
    let mut steps: usize = 0;

    queue.push(QueueItem {
        at: from_id,
        cost: 0.0,
    });
    known_costs.insert(from_id, 0.0);

    while !remaining.is_empty() {
        let Some(item) = queue.pop() else {
            break;
        };

        if options.cancel.as_ref().is_some_and(|c| c.is_cancelled()) {
            return Err(Error::Cancelled);
        }

        // Multiple items for the same node may be queued; only the cheapest one counts.
        if item.cost > known_costs.get(&item.at).copied().unwrap_or(f64::INFINITY) {
            continue;
        }

        remaining.remove(&item.at);
        if remaining.is_empty() {
            break;
        }

        steps += 1;
        if steps > options.step_limit {
            return Err(Error::StepLimitExceeded);
        }

        for &Edge {
            to: neighbor_id,
            cost: edge_cost,
            ..
        } in g.get_edges(item.at)
        {
            // Only strictly cheaper ways to the neighbor are kept,
            // so the first-found of equally good routes wins.
            let neighbor_cost = item.cost + edge_cost;
            if neighbor_cost
                >= known_costs
                    .get(&neighbor_id)
                    .copied()
                    .unwrap_or(f64::INFINITY)
            {
                continue;
            }

            came_from.insert(neighbor_id, item.at);
            known_costs.insert(neighbor_id, neighbor_cost);
            queue.push(QueueItem {
                at: neighbor_id,
                cost: neighbor_cost,
            });
        }
    }

    log::debug!(
        "search from {}: {} nodes expanded, {} of {} targets unreachable",
        from_id,
        steps,
        remaining.len(),
        targets.len(),
    );

    Ok(targets
        .iter()
        .map(|&target| {
            if remaining.contains(&target) {
                PathResult::Unreachable
            } else {
                PathResult::Reachable {
                    nodes: reconstruct_path(&came_from, target),
                    cost: known_costs[&target],
                }
            }
        })
        .collect())
}
