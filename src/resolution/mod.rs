// Fri Oct 16 2026 - Alex

//! Links raw type strings to type nodes.
//!
//! Each unresolved string goes through a fixed strategy list (primitive,
//! exact, typedef chain, bare name, canonical spelling). Failing every
//! strategy is not an error, it only shows up in the [`ResolutionReport`].

pub mod strategy;
pub mod report;
pub mod engine;

pub use engine::ResolutionEngine;
pub use report::{OutcomeCounts, ResolutionReport, UnresolvedSample, DEFAULT_SAMPLE_LIMIT};
pub use strategy::{ResolutionRequest, Strategy, STRATEGIES};

use crate::progress::ProgressSink;
use crate::store::{StoreResult, TypeGraphStore};

/// Runs a full resolution pass with the default sample limit and flushes it
pub fn resolve_type_references(
    store: &mut dyn TypeGraphStore,
    progress: Option<&mut dyn ProgressSink>,
) -> StoreResult<ResolutionReport> {
    ResolutionEngine::new().run(store, progress)
}
