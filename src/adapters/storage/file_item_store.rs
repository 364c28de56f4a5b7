//! File-based Item Store Adapter
//!
//! Stores each project as one YAML document (`<project_id>.yaml`) holding
//! the version counter and the ordered items. Writes go to a temporary
//! file first and are renamed into place.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;

use crate::domain::foundation::ProjectId;
use crate::domain::item::Item;
use crate::ports::{CommitMode, ItemSnapshot, ItemStore, ItemStoreError};

#[derive(Debug, Default, Serialize, Deserialize)]
struct ProjectDocument {
    version: u64,
    #[serde(default)]
    items: Vec<Item>,
}

/// File-based storage for canonical items
#[derive(Debug)]
pub struct FileItemStore {
    base_path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    write_lock: Mutex<()>,
}

impl FileItemStore {
    /// Create a store rooted at `base_path`; the directory is created on first write
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    fn project_path(&self, project_id: ProjectId) -> PathBuf {
        self.base_path.join(format!("{}.yaml", project_id))
    }

    async fn read_document(&self, project_id: ProjectId) -> Result<ProjectDocument, ItemStoreError> {
        let path = self.project_path(project_id);
        let yaml = match fs::read_to_string(&path).await {
            Ok(yaml) => yaml,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(ProjectDocument::default())
            }
            Err(e) => return Err(ItemStoreError::Storage(e.to_string())),
        };

        serde_yaml::from_str(&yaml).map_err(|e| {
            ItemStoreError::Storage(format!("corrupt project file {}: {}", path.display(), e))
        })
    }

    async fn write_document(
        &self,
        project_id: ProjectId,
        document: &ProjectDocument,
    ) -> Result<(), ItemStoreError> {
        fs::create_dir_all(&self.base_path)
            .await
            .map_err(|e| ItemStoreError::Storage(e.to_string()))?;

        let yaml =
            serde_yaml::to_string(document).map_err(|e| ItemStoreError::Storage(e.to_string()))?;

        let path = self.project_path(project_id);
        let tmp = path.with_extension("yaml.tmp");
        fs::write(&tmp, yaml)
            .await
            .map_err(|e| ItemStoreError::Storage(e.to_string()))?;
        fs::rename(&tmp, &path)
            .await
            .map_err(|e| ItemStoreError::Storage(e.to_string()))
    }
}

#[async_trait]
impl ItemStore for FileItemStore {
    async fn load_snapshot(&self, project_id: ProjectId) -> Result<ItemSnapshot, ItemStoreError> {
        let document = self.read_document(project_id).await?;
        Ok(ItemSnapshot {
            items: document.items,
            version: document.version,
        })
    }

    async fn commit_items(
        &self,
        project_id: ProjectId,
        items: Vec<Item>,
        mode: CommitMode,
        expected_version: Option<u64>,
    ) -> Result<u64, ItemStoreError> {
        let _guard = self.write_lock.lock().await;
        let mut document = self.read_document(project_id).await?;

        if let Some(expected) = expected_version {
            if expected != document.version {
                return Err(ItemStoreError::StaleSnapshot {
                    project_id,
                    expected,
                    actual: document.version,
                });
            }
        }

        mode.apply(&mut document.items, items);
        document.version += 1;
        self.write_document(project_id, &document).await?;

        tracing::debug!(
            project_id = %project_id,
            version = document.version,
            items = document.items.len(),
            "project file written"
        );
        Ok(document.version)
    }
}
