//! ReconcileCandidatesHandler - admits candidate ideas into a project.
//!
//! Holds the project lock for the whole load, reconcile, commit sequence
//! and commits against the version it read, so a concurrent writer outside
//! this process surfaces as a stale-snapshot error instead of a silent
//! duplicate.

use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;

use crate::application::ProjectLocks;
use crate::domain::foundation::{CandidateId, DomainError, ErrorCode, ProjectId};
use crate::domain::item::{CandidateIdea, Item};
use crate::domain::reconciliation::{
    CandidateFindings, QualityReport, ReconciliationEngine, ReconciliationMode,
    ReconciliationResult,
};
use crate::ports::{group_by_state, CommitMode, ItemStore, ItemStoreError, QualityChecker};

/// Command to reconcile a batch of candidates.
#[derive(Debug, Clone)]
pub struct ReconcileCandidatesCommand {
    pub project_id: ProjectId,
    pub candidates: Vec<CandidateIdea>,
    pub mode: ReconciliationMode,
}

/// Result of a reconciliation that was committed.
#[derive(Debug, Clone)]
pub struct ReconcileCandidatesResult {
    pub reconciliation: ReconciliationResult,
    /// Store version after the commit; unchanged if nothing was admitted.
    pub version: u64,
}

/// Errors from reconciling candidates.
#[derive(Debug, Clone, Error)]
pub enum ReconcileError {
    #[error("invalid candidate {candidate_id}: {reason}")]
    InvalidCandidate {
        candidate_id: CandidateId,
        reason: String,
    },

    #[error(transparent)]
    Store(#[from] ItemStoreError),
}

impl ReconcileError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ReconcileError::InvalidCandidate { .. } => ErrorCode::ValidationFailed,
            ReconcileError::Store(err) => DomainError::from(err.clone()).code,
        }
    }
}

impl From<ReconcileError> for DomainError {
    fn from(err: ReconcileError) -> Self {
        DomainError::new(err.code(), err.to_string())
    }
}

/// Handler for reconciling candidates against the canonical set.
pub struct ReconcileCandidatesHandler {
    store: Arc<dyn ItemStore>,
    locks: Arc<ProjectLocks>,
    engine: ReconciliationEngine,
    quality_checker: Option<Arc<dyn QualityChecker>>,
}

impl ReconcileCandidatesHandler {
    pub fn new(
        store: Arc<dyn ItemStore>,
        locks: Arc<ProjectLocks>,
        engine: ReconciliationEngine,
    ) -> Self {
        Self {
            store,
            locks,
            engine,
            quality_checker: None,
        }
    }

    /// Runs `checker` on admitted candidates during verified passes.
    pub fn with_quality_checker(mut self, checker: Arc<dyn QualityChecker>) -> Self {
        self.quality_checker = Some(checker);
        self
    }

    pub async fn handle(
        &self,
        cmd: ReconcileCandidatesCommand,
    ) -> Result<ReconcileCandidatesResult, ReconcileError> {
        validate_candidates(&cmd.candidates)?;

        let _guard = self.locks.lock(cmd.project_id).await;

        let snapshot = self.store.load_snapshot(cmd.project_id).await?;
        let mut reconciliation = self
            .engine
            .reconcile(&cmd.candidates, &snapshot.items, cmd.mode);

        if cmd.mode == ReconciliationMode::Verified {
            if let Some(checker) = &self.quality_checker {
                let report = run_quality_check(
                    checker.as_ref(),
                    &cmd.candidates,
                    &reconciliation,
                    &snapshot.items,
                )
                .await;
                reconciliation = reconciliation.with_quality(report);
            }
        }

        let version = if reconciliation.admitted.is_empty() {
            snapshot.version
        } else {
            self.store
                .commit_items(
                    cmd.project_id,
                    reconciliation.admitted.clone(),
                    CommitMode::Append,
                    Some(snapshot.version),
                )
                .await
                .inspect_err(|err| {
                    if let ItemStoreError::StaleSnapshot { .. } = err {
                        tracing::warn!(project_id = %cmd.project_id, error = %err, "stale reconciliation commit");
                    }
                })?
        };

        tracing::info!(
            project_id = %cmd.project_id,
            mode = %cmd.mode,
            admitted = reconciliation.admitted.len(),
            dropped = reconciliation.dropped.len(),
            already_admitted = reconciliation.already_admitted.len(),
            matches = reconciliation.matches.len(),
            version,
            "candidates reconciled"
        );

        Ok(ReconcileCandidatesResult {
            reconciliation,
            version,
        })
    }
}

fn validate_candidates(candidates: &[CandidateIdea]) -> Result<(), ReconcileError> {
    let mut seen = HashSet::new();
    for candidate in candidates {
        if candidate.text.trim().is_empty() {
            return Err(ReconcileError::InvalidCandidate {
                candidate_id: candidate.id,
                reason: "text cannot be empty".to_string(),
            });
        }
        if !seen.insert(candidate.id) {
            return Err(ReconcileError::InvalidCandidate {
                candidate_id: candidate.id,
                reason: "candidate appears twice in the batch".to_string(),
            });
        }
    }
    Ok(())
}

/// Scans every admitted candidate. The first collaborator failure ends the
/// scan and is recorded in the report; admission is never affected.
async fn run_quality_check(
    checker: &dyn QualityChecker,
    candidates: &[CandidateIdea],
    reconciliation: &ReconciliationResult,
    canonical: &[Item],
) -> QualityReport {
    let by_state = group_by_state(canonical);
    let mut report = QualityReport::default();

    let scanned = candidates
        .iter()
        .filter(|c| !reconciliation.was_dropped(c.id) && !reconciliation.was_already_admitted(c.id));
    for candidate in scanned {
        let findings = async {
            let assumptions = checker.scan(&candidate.text).await?;
            let conflicts = checker.check_consistency(&candidate.text, &by_state).await?;
            Ok::<_, crate::ports::QualityCheckError>(CandidateFindings {
                candidate_id: candidate.id,
                assumptions,
                conflicts,
            })
        }
        .await;

        match findings {
            Ok(findings) => report.push(findings),
            Err(err) => {
                tracing::warn!(candidate_id = %candidate.id, error = %err, "quality check failed");
                report.collaborator_error = Some(err.to_string());
                break;
            }
        }
    }

    report
}
