// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

mod options;
mod path;
mod search;

pub use options::{CancelToken, SearchOptions, DEFAULT_STEP_LIMIT};
pub use path::PathResult;
pub use search::{shortest_path, shortest_paths};
