//! TransitionItemStateHandler - moves one canonical item to a new state.

use std::sync::Arc;
use thiserror::Error;

use crate::application::ProjectLocks;
use crate::domain::foundation::{DomainError, ErrorCode, ItemId, ProjectId};
use crate::domain::item::{Item, ItemState};
use crate::domain::similarity::{Recommendation, SimilarityEngine, SimilarityPolicy};
use crate::ports::{CommitMode, ItemStore, ItemStoreError};

/// Command to change an item's state.
#[derive(Debug, Clone)]
pub struct TransitionItemStateCommand {
    pub project_id: ProjectId,
    pub item_id: ItemId,
    pub target: ItemState,
}

/// Result of a successful transition.
#[derive(Debug, Clone)]
pub struct TransitionItemStateResult {
    pub item: Item,
    pub previous_state: ItemState,
    pub version: u64,
}

/// Errors from transitioning an item.
#[derive(Debug, Clone, Error)]
pub enum TransitionItemStateError {
    #[error("Item not found: {0}")]
    ItemNotFound(ItemId),

    #[error("Cannot move item from {from} to {to}")]
    InvalidTransition { from: ItemState, to: ItemState },

    #[error("Item {item_id} duplicates decided item {duplicate_of}")]
    DuplicateDecision { item_id: ItemId, duplicate_of: ItemId },

    #[error(transparent)]
    Store(#[from] ItemStoreError),
}

impl TransitionItemStateError {
    pub fn code(&self) -> ErrorCode {
        match self {
            TransitionItemStateError::ItemNotFound(_) => ErrorCode::ItemNotFound,
            TransitionItemStateError::InvalidTransition { .. } => ErrorCode::InvalidStateTransition,
            TransitionItemStateError::DuplicateDecision { .. } => ErrorCode::ValidationFailed,
            TransitionItemStateError::Store(err) => DomainError::from(err.clone()).code,
        }
    }
}

impl From<TransitionItemStateError> for DomainError {
    fn from(err: TransitionItemStateError) -> Self {
        DomainError::new(err.code(), err.to_string())
    }
}

/// Handler for item state transitions.
///
/// Promoting an item to `decided` is refused when another decided item
/// would earn it a `skip` recommendation.
pub struct TransitionItemStateHandler {
    store: Arc<dyn ItemStore>,
    locks: Arc<ProjectLocks>,
    similarity: SimilarityEngine,
}

impl TransitionItemStateHandler {
    pub fn new(store: Arc<dyn ItemStore>, locks: Arc<ProjectLocks>) -> Self {
        Self {
            store,
            locks,
            similarity: SimilarityEngine::default(),
        }
    }

    /// Uses `policy` for the duplicate-decision check.
    pub fn with_policy(mut self, policy: SimilarityPolicy) -> Self {
        self.similarity = SimilarityEngine::new(policy);
        self
    }

    pub async fn handle(
        &self,
        cmd: TransitionItemStateCommand,
    ) -> Result<TransitionItemStateResult, TransitionItemStateError> {
        let _guard = self.locks.lock(cmd.project_id).await;

        let snapshot = self.store.load_snapshot(cmd.project_id).await?;
        let current = snapshot
            .find(cmd.item_id)
            .ok_or(TransitionItemStateError::ItemNotFound(cmd.item_id))?;
        let previous_state = current.state;

        let updated = current.transitioned(cmd.target).map_err(|_| {
            TransitionItemStateError::InvalidTransition {
                from: previous_state,
                to: cmd.target,
            }
        })?;

        if updated.state == ItemState::Decided {
            if let Some(duplicate_of) = self.duplicate_decision(&updated, &snapshot.items) {
                tracing::warn!(
                    project_id = %cmd.project_id,
                    item_id = %cmd.item_id,
                    duplicate_of = %duplicate_of,
                    "decision refused as duplicate"
                );
                return Err(TransitionItemStateError::DuplicateDecision {
                    item_id: cmd.item_id,
                    duplicate_of,
                });
            }
        }

        let items: Vec<Item> = snapshot
            .items
            .iter()
            .map(|item| {
                if item.id == updated.id {
                    updated.clone()
                } else {
                    item.clone()
                }
            })
            .collect();

        let version = self
            .store
            .commit_items(
                cmd.project_id,
                items,
                CommitMode::Replace,
                Some(snapshot.version),
            )
            .await?;

        tracing::info!(
            project_id = %cmd.project_id,
            item_id = %cmd.item_id,
            from = %previous_state,
            to = %cmd.target,
            "item state changed"
        );

        Ok(TransitionItemStateResult {
            item: updated,
            previous_state,
            version,
        })
    }

    /// First other decided item that `item` would be skipped against.
    fn duplicate_decision(&self, item: &Item, canonical: &[Item]) -> Option<ItemId> {
        canonical
            .iter()
            .filter(|other| other.id != item.id && other.state == ItemState::Decided)
            .find(|other| {
                let score = self.similarity.similarity(&item.text, &other.text);
                self.similarity.recommend(score, other.state) == Recommendation::Skip
            })
            .map(|other| other.id)
    }
}
