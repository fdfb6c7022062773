// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use rayon::prelude::*;

use crate::{
    assemble, shortest_paths, Error, Facility, Filter, Graph, Locate, RouteGeometry,
    SearchOptions,
};

/// Additional controls for a [Matcher].
#[derive(Debug, Clone)]
pub struct MatchOptions {
    /// Options used for every route search, one per source facility.
    pub search: SearchOptions,

    /// Process source facilities on the [rayon] thread pool.
    /// Results are identical either way.
    pub parallel: bool,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            search: SearchOptions::default(),
            parallel: true,
        }
    }
}

/// What was found for a single source [Facility].
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<'a> {
    /// The cheapest reachable destination, with a usable route to it.
    Matched {
        destination: &'a Facility,
        route: RouteGeometry,
    },

    /// The filter has rejected all destinations.
    NoCandidates,

    /// None of the candidate destinations can be reached.
    Unreachable,

    /// The cheapest destination snaps onto the same place as the source,
    /// so there is no route to draw.
    Degenerate {
        destination: &'a Facility,
        cost: f64,
    },

    /// Matching this source has failed, e.g. due to an exceeded step limit.
    Failed(Error),
}

/// Result of matching a single source [Facility].
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult<'a> {
    pub source: &'a Facility,
    pub outcome: Outcome<'a>,
}

impl<'a> MatchResult<'a> {
    /// Returns the selected destination, if any was reachable.
    pub fn destination(&self) -> Option<&'a Facility> {
        match self.outcome {
            Outcome::Matched { destination, .. } | Outcome::Degenerate { destination, .. } => {
                Some(destination)
            }
            _ => None,
        }
    }

    /// Returns the total cost of reaching the [destination](MatchResult::destination),
    /// or [f64::INFINITY] if there is none.
    pub fn cost(&self) -> f64 {
        match &self.outcome {
            Outcome::Matched { route, .. } => route.cost,
            Outcome::Degenerate { cost, .. } => *cost,
            _ => f64::INFINITY,
        }
    }

    /// Returns the usable route to the destination, if any.
    pub fn route(&self) -> Option<&RouteGeometry> {
        match &self.outcome {
            Outcome::Matched { route, .. } => Some(route),
            _ => None,
        }
    }

    /// Returns positions along the route; empty if there is no usable route.
    pub fn coordinates(&self) -> &[(f64, f64)] {
        self.route()
            .map(|r| r.coordinates.as_slice())
            .unwrap_or_default()
    }
}

/// A destination facility snapped onto the graph.
#[derive(Debug, Clone, Copy)]
struct Candidate<'a> {
    facility: &'a Facility,
    node: i64,
}

/// Pairs every source [Facility] with the cheapest reachable destination [Facility].
///
/// The [Graph] and the [Locate] implementation are only ever read, so a single
/// Matcher may be shared between threads, and each source is processed independently.
#[derive(Debug)]
pub struct Matcher<'a, L: ?Sized> {
    graph: &'a Graph,
    locator: &'a L,
    options: MatchOptions,
}

impl<'a, L: Locate + Sync + ?Sized> Matcher<'a, L> {
    pub fn new(graph: &'a Graph, locator: &'a L) -> Self {
        Self {
            graph,
            locator,
            options: MatchOptions::default(),
        }
    }

    pub fn with_options(mut self, options: MatchOptions) -> Self {
        self.options = options;
        self
    }

    /// Matches every source with the cheapest destination accepted by `filter`.
    ///
    /// Exactly one [MatchResult] is returned per source, in the order of `sources`.
    /// Failures are isolated to the affected source. On equal costs, the destination
    /// with the lowest id wins.
    pub fn match_all<'f>(
        &self,
        sources: &'f [Facility],
        destinations: &'f [Facility],
        filter: &Filter,
    ) -> Vec<MatchResult<'f>> {
        let candidates = self.snap_candidates(destinations, filter);

        let match_source = |source: &'f Facility| -> MatchResult<'f> {
            let outcome = match &candidates {
                Ok(candidates) => self.match_one(source, candidates),
                Err(e) => Outcome::Failed(e.clone()),
            };
            MatchResult { source, outcome }
        };

        let results: Vec<MatchResult<'f>> = if self.options.parallel {
            sources.par_iter().map(match_source).collect()
        } else {
            sources.iter().map(match_source).collect()
        };

        log::info!(
            "matched {} of {} sources against {} destinations ({:?})",
            results.iter().filter(|r| r.route().is_some()).count(),
            results.len(),
            candidates.as_ref().map_or(0, |c| c.len()),
            filter,
        );
        results
    }

    /// Filters and snaps destinations, ordering them by id for tie-breaking.
    fn snap_candidates<'f>(
        &self,
        destinations: &'f [Facility],
        filter: &Filter,
    ) -> Result<Vec<Candidate<'f>>, Error> {
        let mut candidates = destinations
            .iter()
            .filter(|d| filter.accepts(d))
            .map(|d| {
                Ok(Candidate {
                    facility: d,
                    node: self.locator.nearest(d.x, d.y)?,
                })
            })
            .collect::<Result<Vec<_>, Error>>()?;

        candidates.sort_by_key(|c| c.facility.id);
        Ok(candidates)
    }

    fn match_one<'f>(&self, source: &'f Facility, candidates: &[Candidate<'f>]) -> Outcome<'f> {
        if candidates.is_empty() {
            return Outcome::NoCandidates;
        }

        let outcome = self.route_to_best(source, candidates);
        match &outcome {
            Outcome::Unreachable => {
                log::warn!("no path from {} to any destination", source.label())
            }
            Outcome::Degenerate { destination, .. } => log::warn!(
                "no usable route from {} to {}: both snap onto the same place",
                source.label(),
                destination.label(),
            ),
            Outcome::Failed(e) => log::warn!("failed to match {}: {}", source.label(), e),
            _ => {}
        }
        outcome
    }

    fn route_to_best<'f>(&self, source: &'f Facility, candidates: &[Candidate<'f>]) -> Outcome<'f> {
        let from_id = match self.locator.nearest(source.x, source.y) {
            Ok(id) => id,
            Err(e) => return Outcome::Failed(e),
        };

        let targets: Vec<i64> = candidates.iter().map(|c| c.node).collect();
        let paths = match shortest_paths(self.graph, from_id, &targets, &self.options.search) {
            Ok(paths) => paths,
            Err(e) => return Outcome::Failed(e),
        };

        // Candidates are ordered by id, so keeping the first minimum
        // resolves ties to the lowest id.
        let best = candidates
            .iter()
            .zip(&paths)
            .filter(|(_, path)| path.is_reachable())
            .reduce(|best, alt| if alt.1.cost() < best.1.cost() { alt } else { best });

        let Some((candidate, path)) = best else {
            return Outcome::Unreachable;
        };

        match assemble(self.graph, path) {
            Ok(route) => Outcome::Matched {
                destination: candidate.facility,
                route,
            },
            Err(Error::DegeneratePath { .. }) => Outcome::Degenerate {
                destination: candidate.facility,
                cost: path.cost(),
            },
            Err(e) => Outcome::Failed(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CancelToken, Edge, KDTree, Metric, Node};

    macro_rules! assert_almost_eq {
        ($a:expr, $b:expr) => {
            assert!(
                (($a - $b).abs() < 1e-9),
                "assertion failed: {} ≈ {}",
                $a,
                $b
            )
        };
    }

    //     2
    //  5 ↗ ↘ 3
    //  1     4
    // 10 ↘ ↗ 1
    //     3
    fn diamond() -> Graph {
        Graph::build(
            [
                Node { id: 1, x: 0.0, y: 0.0 },
                Node { id: 2, x: 1.0, y: 1.0 },
                Node { id: 3, x: 1.0, y: -1.0 },
                Node { id: 4, x: 2.0, y: 0.0 },
            ],
            [
                (1, Edge::new(2, 5.0)),
                (2, Edge::new(4, 3.0)),
                (1, Edge::new(3, 10.0)),
                (3, Edge::new(4, 1.0)),
            ],
        )
        .unwrap()
    }

    fn sequential() -> MatchOptions {
        MatchOptions {
            parallel: false,
            ..Default::default()
        }
    }

    #[test]
    fn picks_cheapest_destination() {
        let g = diamond();
        let locator = KDTree::from_graph(&g, Metric::Euclidean);
        let matcher = Matcher::new(&g, &locator);

        let sources = [Facility::new(100, 0.1, 0.0)];
        let destinations = [
            Facility::new(200, 1.0, -0.9), // snaps to 3
            Facility::new(201, 2.1, 0.0),  // snaps to 4
        ];

        let results = matcher.match_all(&sources, &destinations, &Filter::All);
        assert_eq!(results.len(), 1);

        let r = &results[0];
        assert_eq!(r.source.id, 100);
        assert_eq!(r.destination().map(|d| d.id), Some(201));
        assert_almost_eq!(r.cost(), 8.0);

        let route = r.route().unwrap();
        assert_eq!(route.nodes, vec![1, 2, 4]);
        assert_eq!(r.coordinates(), &[(0.0, 0.0), (1.0, 1.0), (2.0, 0.0)]);
    }

    #[test]
    fn filter_excludes_nearest() {
        let g = diamond();
        let locator = g.linear_locator(Metric::Euclidean);
        let matcher = Matcher::new(&g, &locator).with_options(sequential());

        let sources = [Facility::new(1, 0.0, 0.0)];
        let destinations = [
            Facility::new(10, 2.0, 0.0).with_attribute("county", "PIERCE"),
            Facility::new(11, 1.0, -1.0).with_attribute("county", "KING"),
            Facility::new(12, 1.0, 1.0),
        ];

        let results = matcher.match_all(&sources, &destinations, &Filter::equals("county", "KING"));
        assert_eq!(results[0].destination().map(|d| d.id), Some(11));
        assert_almost_eq!(results[0].cost(), 10.0);

        let results = matcher.match_all(&sources, &destinations, &Filter::equals("county", "KITSAP"));
        assert_eq!(results[0].outcome, Outcome::NoCandidates);
        assert!(results[0].destination().is_none());
        assert!(results[0].cost().is_infinite());
        assert!(results[0].coordinates().is_empty());
    }

    #[test]
    fn ties_resolve_to_lowest_id() {
        let g = Graph::build(
            [
                Node { id: 1, x: 0.0, y: 0.0 },
                Node { id: 2, x: 0.0, y: 1.0 },
                Node { id: 3, x: 0.0, y: -1.0 },
            ],
            [(1, Edge::new(2, 2.0)), (1, Edge::new(3, 2.0))],
        )
        .unwrap();
        let locator = KDTree::from_graph(&g, Metric::Euclidean);
        let matcher = Matcher::new(&g, &locator);

        let sources: Vec<Facility> = (0..20).map(|i| Facility::new(i, 0.0, 0.0)).collect();
        let destinations = [
            Facility::new(9, 0.0, 1.0),
            Facility::new(4, 0.0, -1.0),
            Facility::new(6, 0.0, 1.0),
        ];

        let first = matcher.match_all(&sources, &destinations, &Filter::All);
        for r in &first {
            assert_eq!(r.destination().map(|d| d.id), Some(4));
        }

        let again = matcher.match_all(&sources, &destinations, &Filter::All);
        assert_eq!(first, again);

        let in_order = Matcher::new(&g, &locator)
            .with_options(sequential())
            .match_all(&sources, &destinations, &Filter::All);
        assert_eq!(first, in_order);
    }

    #[test]
    fn preserves_source_order() {
        let g = diamond();
        let locator = KDTree::from_graph(&g, Metric::Euclidean);
        let matcher = Matcher::new(&g, &locator);

        let sources: Vec<Facility> = (0..200)
            .map(|i| Facility::new(1000 - i, (i % 3) as f64, 0.0))
            .collect();
        let destinations = [Facility::new(1, 2.0, 0.0)];

        let results = matcher.match_all(&sources, &destinations, &Filter::All);
        assert_eq!(results.len(), sources.len());
        for (source, result) in sources.iter().zip(&results) {
            assert_eq!(result.source.id, source.id);
        }
    }

    #[test]
    fn isolated_outcomes() {
        let g = diamond();
        let locator = KDTree::from_graph(&g, Metric::Euclidean);
        let matcher = Matcher::new(&g, &locator);

        let sources = [
            Facility::new(1, 0.0, 0.0), // node 1
            Facility::new(2, 2.0, 0.0), // node 4, nothing reachable
            Facility::new(3, 1.0, 1.0), // node 2
        ];
        let destinations = [Facility::new(10, 1.9, 0.1)]; // node 4

        let results = matcher.match_all(&sources, &destinations, &Filter::All);
        assert!(results[0].route().is_some());
        assert_eq!(
            results[1].outcome,
            Outcome::Degenerate {
                destination: &destinations[0],
                cost: 0.0
            }
        );
        assert_eq!(results[1].destination().map(|d| d.id), Some(10));
        assert!(results[1].coordinates().is_empty());
        assert_almost_eq!(results[2].cost(), 3.0);

        let destinations = [Facility::new(10, 0.0, 0.1)]; // node 1
        let results = matcher.match_all(&sources, &destinations, &Filter::All);
        assert!(matches!(results[0].outcome, Outcome::Degenerate { .. }));
        assert_eq!(results[1].outcome, Outcome::Unreachable);
        assert_eq!(results[2].outcome, Outcome::Unreachable);
    }

    #[test]
    fn failures() {
        let g = diamond();
        let locator = KDTree::from_graph(&g, Metric::Euclidean);
        let sources = [Facility::new(1, 0.0, 0.0), Facility::new(2, 1.0, -1.0)];
        let destinations = [Facility::new(10, 2.0, 0.0)];

        let token = CancelToken::new();
        token.cancel();
        let cancelled = Matcher::new(&g, &locator).with_options(MatchOptions {
            search: SearchOptions {
                cancel: Some(token),
                ..Default::default()
            },
            parallel: true,
        });
        for r in cancelled.match_all(&sources, &destinations, &Filter::All) {
            assert_eq!(r.outcome, Outcome::Failed(Error::Cancelled));
        }

        let limited = Matcher::new(&g, &locator).with_options(MatchOptions {
            search: SearchOptions {
                step_limit: 1,
                cancel: None,
            },
            parallel: false,
        });
        let results = limited.match_all(&sources, &destinations, &Filter::All);
        assert_eq!(results[0].outcome, Outcome::Failed(Error::StepLimitExceeded));
        assert_almost_eq!(results[1].cost(), 1.0);

        let empty = Graph::default();
        let empty_locator = KDTree::from_graph(&empty, Metric::Euclidean);
        let results = Matcher::new(&empty, &empty_locator).match_all(
            &sources,
            &destinations,
            &Filter::All,
        );
        assert_eq!(results.len(), 2);
        for r in results {
            assert_eq!(r.outcome, Outcome::Failed(Error::EmptyIndex));
        }
    }
}
