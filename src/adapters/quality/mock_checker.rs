//! Scripted quality checker for tests.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use crate::domain::reconciliation::{Assumption, Conflict};
use crate::ports::{CanonicalByState, QualityCheckError, QualityChecker};

/// Returns the same findings for every call, or fails every call.
#[derive(Debug, Clone, Default)]
pub struct MockQualityChecker {
    assumptions: Vec<Assumption>,
    conflicts: Vec<Conflict>,
    failure: Option<QualityCheckError>,
    scanned: Arc<Mutex<Vec<String>>>,
}

impl MockQualityChecker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_assumption(mut self, trigger: &str, description: &str) -> Self {
        self.assumptions.push(Assumption {
            trigger: trigger.to_string(),
            description: description.to_string(),
        });
        self
    }

    pub fn with_conflict(mut self, conflict: Conflict) -> Self {
        self.conflicts.push(conflict);
        self
    }

    /// Makes every call fail with `error`.
    pub fn failing(mut self, error: QualityCheckError) -> Self {
        self.failure = Some(error);
        self
    }

    /// Content passed to `scan`, in call order.
    pub fn scanned(&self) -> Vec<String> {
        self.scanned.lock().unwrap().clone()
    }
}

#[async_trait]
impl QualityChecker for MockQualityChecker {
    async fn scan(&self, content: &str) -> Result<Vec<Assumption>, QualityCheckError> {
        self.scanned.lock().unwrap().push(content.to_string());
        match &self.failure {
            Some(err) => Err(err.clone()),
            None => Ok(self.assumptions.clone()),
        }
    }

    async fn check_consistency(
        &self,
        _content: &str,
        _canonical_by_state: &CanonicalByState,
    ) -> Result<Vec<Conflict>, QualityCheckError> {
        match &self.failure {
            Some(err) => Err(err.clone()),
            None => Ok(self.conflicts.clone()),
        }
    }
}
