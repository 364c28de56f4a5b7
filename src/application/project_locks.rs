//! Per-project mutation serialization.
//!
//! Reconciliation reads a snapshot of the canonical set and commits against
//! it, so two concurrent passes on one project could both admit the same
//! duplicate. Every mutating handler takes the project's lock for the whole
//! load, reconcile, commit sequence. Different projects never contend.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::foundation::ProjectId;

/// Hands out one async mutex per project.
#[derive(Debug, Default)]
pub struct ProjectLocks {
    locks: Mutex<HashMap<ProjectId, Arc<Mutex<()>>>>,
}

impl ProjectLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive access to `project_id`. Released when the guard drops.
    pub async fn lock(&self, project_id: ProjectId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            // Only the map holds an idle lock; held or awaited ones have guards.
            locks.retain(|id, lock| *id == project_id || Arc::strong_count(lock) > 1);
            locks.entry(project_id).or_default().clone()
        };
        lock.lock_owned().await
    }

    /// Number of projects with a lock in the map. Idle locks are pruned
    /// whenever another lock is taken.
    pub async fn tracked(&self) -> usize {
        self.locks.lock().await.len()
    }
}
