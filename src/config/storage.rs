//! Item storage configuration

use serde::Deserialize;
use std::path::PathBuf;

/// Item storage configuration
///
/// Without a data directory items live in memory and vanish on exit.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageConfig {
    /// Directory holding one YAML file per project
    pub data_dir: Option<PathBuf>,
}

impl StorageConfig {
    pub fn is_persistent(&self) -> bool {
        self.data_dir.is_some()
    }
}
