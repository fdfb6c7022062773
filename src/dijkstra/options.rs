// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Recommended number of allowed node expansions in [shortest_path](crate::shortest_path)
/// and [shortest_paths](crate::shortest_paths) before
/// [Error::StepLimitExceeded](crate::Error::StepLimitExceeded) is returned.
pub const DEFAULT_STEP_LIMIT: usize = 1_000_000;

/// Additional controls for a single route search.
#[derive(Debug, Clone)]
pub struct SearchOptions {
    /// Limits how many nodes may be expanded during the search.
    /// Concluding that no route exists requires expanding all nodes accessible
    /// from the start, which is usually very time-consuming on large datasets.
    pub step_limit: usize,

    /// Checked before every node expansion; once cancelled, the search
    /// returns [Error::Cancelled](crate::Error::Cancelled).
    pub cancel: Option<CancelToken>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            step_limit: DEFAULT_STEP_LIMIT,
            cancel: None,
        }
    }
}

/// Cooperative cancellation flag, shared between the caller and any number of searches.
///
/// Searches keep all of their state locally, so abandoning them at any point
/// leaves the [Graph](crate::Graph) untouched.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests all searches observing this token to stop.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}
