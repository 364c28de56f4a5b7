//! In-Memory Item Store Adapter
//!
//! Keeps each project's items and version in a map. Used by tests and the
//! local driver.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::ProjectId;
use crate::domain::item::Item;
use crate::ports::{CommitMode, ItemSnapshot, ItemStore, ItemStoreError};

#[derive(Debug, Clone, Default)]
struct ProjectRecord {
    items: Vec<Item>,
    version: u64,
}

/// In-memory storage for canonical items
#[derive(Debug, Clone, Default)]
pub struct InMemoryItemStore {
    projects: Arc<RwLock<HashMap<ProjectId, ProjectRecord>>>,
}

impl InMemoryItemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a project directly, bypassing version checks (useful for tests)
    pub async fn seed(&self, project_id: ProjectId, items: Vec<Item>) -> u64 {
        let mut projects = self.projects.write().await;
        let record = projects.entry(project_id).or_default();
        record.items = items;
        record.version += 1;
        record.version
    }

    /// Number of projects with at least one commit
    pub async fn project_count(&self) -> usize {
        self.projects.read().await.len()
    }
}

#[async_trait]
impl ItemStore for InMemoryItemStore {
    async fn load_snapshot(&self, project_id: ProjectId) -> Result<ItemSnapshot, ItemStoreError> {
        let projects = self.projects.read().await;
        Ok(projects
            .get(&project_id)
            .map(|record| ItemSnapshot {
                items: record.items.clone(),
                version: record.version,
            })
            .unwrap_or_else(ItemSnapshot::empty))
    }

    async fn commit_items(
        &self,
        project_id: ProjectId,
        items: Vec<Item>,
        mode: CommitMode,
        expected_version: Option<u64>,
    ) -> Result<u64, ItemStoreError> {
        let mut projects = self.projects.write().await;
        let record = projects.entry(project_id).or_default();

        if let Some(expected) = expected_version {
            if expected != record.version {
                return Err(ItemStoreError::StaleSnapshot {
                    project_id,
                    expected,
                    actual: record.version,
                });
            }
        }

        mode.apply(&mut record.items, items);
        record.version += 1;
        Ok(record.version)
    }
}
