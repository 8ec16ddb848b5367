// src/pipeline/mod.rs

//! Pipeline entry points for the feed watcher.
//!
//! - `Watcher::run_cycle`: one fetch→detect→notify pass over all sources
//! - `run_poller`: the periodic loop driving cycles until shutdown

pub mod cycle;
pub mod detect;
pub mod poller;

pub use cycle::{CycleOutcome, Watcher};
pub use detect::{Disposition, LastSeen};
pub use poller::run_poller;
