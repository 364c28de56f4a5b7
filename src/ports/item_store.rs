//! Item Store Port - Interface for the canonical item collection.
//!
//! Each project owns one ordered list of items plus a version counter that
//! increments on every commit. Callers pass the version they read back into
//! `commit_items`; a mismatch means someone else committed in between.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, ErrorCode, ItemId, ProjectId};
use crate::domain::item::Item;

/// Errors that can occur during item store operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ItemStoreError {
    #[error("Project not found: {0}")]
    NotFound(ProjectId),

    #[error("Item not found: {0}")]
    ItemNotFound(ItemId),

    #[error("Stale snapshot for project {project_id}: expected version {expected}, found {actual}")]
    StaleSnapshot {
        project_id: ProjectId,
        expected: u64,
        actual: u64,
    },

    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<ItemStoreError> for DomainError {
    fn from(err: ItemStoreError) -> Self {
        let code = match &err {
            ItemStoreError::NotFound(_) => ErrorCode::ProjectNotFound,
            ItemStoreError::ItemNotFound(_) => ErrorCode::ItemNotFound,
            ItemStoreError::StaleSnapshot { .. } => ErrorCode::StaleReconciliation,
            ItemStoreError::Storage(_) => ErrorCode::StorageError,
        };
        DomainError::new(code, err.to_string())
    }
}

/// How `commit_items` combines the given items with what is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitMode {
    /// Add the items after the existing ones. Ids already present keep their
    /// stored version; state changes go through `Replace`.
    Append,
    /// Replace the whole collection.
    Replace,
}

impl CommitMode {
    /// Combines `incoming` with `existing` according to the mode.
    pub fn apply(self, existing: &mut Vec<Item>, incoming: Vec<Item>) {
        match self {
            CommitMode::Replace => *existing = incoming,
            CommitMode::Append => {
                for item in incoming {
                    if !existing.iter().any(|current| current.id == item.id) {
                        existing.push(item);
                    }
                }
            }
        }
    }
}

/// A versioned read of a project's items.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemSnapshot {
    pub items: Vec<Item>,
    pub version: u64,
}

impl ItemSnapshot {
    /// Snapshot of a project with nothing committed yet.
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            version: 0,
        }
    }

    /// Looks up an item by id.
    pub fn find(&self, id: ItemId) -> Option<&Item> {
        self.items.iter().find(|item| item.id == id)
    }
}

/// Port for fetching and persisting canonical items.
#[async_trait]
pub trait ItemStore: Send + Sync {
    /// Returns the current items of a project.
    ///
    /// Unknown projects read as empty.
    async fn get_items(&self, project_id: ProjectId) -> Result<Vec<Item>, ItemStoreError> {
        Ok(self.load_snapshot(project_id).await?.items)
    }

    /// Returns the items together with the version they were read at.
    async fn load_snapshot(&self, project_id: ProjectId) -> Result<ItemSnapshot, ItemStoreError>;

    /// Writes items and returns the new version.
    ///
    /// # Errors
    /// Returns `ItemStoreError::StaleSnapshot` when `expected_version` is
    /// given and does not match the stored version.
    async fn commit_items(
        &self,
        project_id: ProjectId,
        items: Vec<Item>,
        mode: CommitMode,
        expected_version: Option<u64>,
    ) -> Result<u64, ItemStoreError>;
}
