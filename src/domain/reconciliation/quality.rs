//! Advisory quality findings attached to verified reconciliation.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{CandidateId, ItemId};
use crate::domain::item::ItemState;

/// An unstated assumption spotted in a piece of content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assumption {
    /// The phrase that triggered the finding.
    pub trigger: String,
    pub description: String,
}

/// A clash between content and an existing canonical item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conflict {
    pub item_id: ItemId,
    pub item_state: ItemState,
    pub description: String,
}

/// Findings for one candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateFindings {
    pub candidate_id: CandidateId,
    pub assumptions: Vec<Assumption>,
    pub conflicts: Vec<Conflict>,
}

impl CandidateFindings {
    pub fn is_empty(&self) -> bool {
        self.assumptions.is_empty() && self.conflicts.is_empty()
    }
}

/// Everything the quality checker reported during one reconciliation.
///
/// Findings never change which candidates are admitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    /// Candidates with at least one finding.
    pub findings: Vec<CandidateFindings>,
    /// Set when the checker failed; admission proceeded without it.
    pub collaborator_error: Option<String>,
}

impl QualityReport {
    /// Report for a checker that could not be reached.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            findings: Vec::new(),
            collaborator_error: Some(reason.into()),
        }
    }

    /// Records findings for a candidate, ignoring empty ones.
    pub fn push(&mut self, findings: CandidateFindings) {
        if !findings.is_empty() {
            self.findings.push(findings);
        }
    }

    pub fn assumption_count(&self) -> usize {
        self.findings.iter().map(|f| f.assumptions.len()).sum()
    }

    pub fn conflict_count(&self) -> usize {
        self.findings.iter().map(|f| f.conflicts.len()).sum()
    }

    pub fn is_clean(&self) -> bool {
        self.findings.is_empty() && self.collaborator_error.is_none()
    }
}
