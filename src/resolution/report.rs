// Fri Oct 16 2026 - Alex

use crate::model::{EdgeKind, ReferenceResolution};
use crate::store::FlushSummary;
use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;

pub const DEFAULT_SAMPLE_LIMIT: usize = 25;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OutcomeCounts {
    pub resolved: usize,
    pub primitive: usize,
    pub unresolved: usize,
}

impl OutcomeCounts {
    pub fn total(&self) -> usize {
        self.resolved + self.primitive + self.unresolved
    }
}

/// One reference the pass could not resolve, kept for human follow-up
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnresolvedSample {
    pub type_string: String,
    pub edge_kind: EdgeKind,
    pub parent: String,
}

impl fmt::Display for UnresolvedSample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' ({} of {})", self.type_string, self.edge_kind, self.parent)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ResolutionReport {
    counts: IndexMap<EdgeKind, OutcomeCounts>,
    pub references_created: usize,
    pub samples: Vec<UnresolvedSample>,
    pub sample_limit: usize,
    #[serde(skip)]
    pub flush: FlushSummary,
}

impl ResolutionReport {
    pub fn new(sample_limit: usize) -> Self {
        Self {
            counts: EdgeKind::ALL.iter().map(|kind| (*kind, OutcomeCounts::default())).collect(),
            references_created: 0,
            samples: Vec::new(),
            sample_limit,
            flush: FlushSummary::default(),
        }
    }

    pub fn record(&mut self, kind: EdgeKind, outcome: Option<ReferenceResolution>, type_string: &str, parent: &str) {
        let counts = self.counts.entry(kind).or_default();
        match outcome {
            Some(ReferenceResolution::Resolved(_)) => counts.resolved += 1,
            Some(ReferenceResolution::Primitive) => counts.primitive += 1,
            None => {
                counts.unresolved += 1;
                if self.samples.len() < self.sample_limit {
                    self.samples.push(UnresolvedSample {
                        type_string: type_string.to_string(),
                        edge_kind: kind,
                        parent: parent.to_string(),
                    });
                }
            }
        }
    }

    pub fn counts(&self, kind: EdgeKind) -> OutcomeCounts {
        self.counts.get(&kind).copied().unwrap_or_default()
    }

    pub fn totals(&self) -> OutcomeCounts {
        self.counts.values().fold(OutcomeCounts::default(), |acc, c| OutcomeCounts {
            resolved: acc.resolved + c.resolved,
            primitive: acc.primitive + c.primitive,
            unresolved: acc.unresolved + c.unresolved,
        })
    }

    pub fn is_complete(&self) -> bool {
        self.totals().unresolved == 0
    }

    /// Summary at info, samples at debug
    pub fn log(&self) {
        log::info!("{}", self);
        for (kind, counts) in &self.counts {
            if counts.total() > 0 {
                log::info!(
                    "  {}: {} resolved, {} primitive, {} unresolved",
                    kind,
                    counts.resolved,
                    counts.primitive,
                    counts.unresolved
                );
            }
        }
        for sample in &self.samples {
            log::debug!("  unresolved {}", sample);
        }
    }
}

impl Default for ResolutionReport {
    fn default() -> Self {
        Self::new(DEFAULT_SAMPLE_LIMIT)
    }
}

impl fmt::Display for ResolutionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let totals = self.totals();
        write!(
            f,
            "Resolution: {} resolved, {} primitive, {} unresolved, {} references created",
            totals.resolved, totals.primitive, totals.unresolved, self.references_created
        )
    }
}
