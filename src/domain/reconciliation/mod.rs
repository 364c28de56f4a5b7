//! Reconciliation module - admitting candidate ideas into the canonical set.

mod engine;
mod quality;

pub use engine::{
    DroppedCandidate, DuplicateMatch, ReconciliationEngine, ReconciliationMode,
    ReconciliationResult,
};
pub use quality::{Assumption, CandidateFindings, Conflict, QualityReport};
