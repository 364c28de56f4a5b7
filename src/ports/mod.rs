//! Ports - Interfaces for external collaborators.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the pipeline and the outside world. Adapters implement these ports.
//!
//! - `AIProvider` - language-model completions
//! - `ItemStore` - versioned canonical item collections
//! - `QualityChecker` - optional assumption and conflict scanning

mod ai_provider;
mod item_store;
mod quality_checker;

pub use ai_provider::{
    AIError, AIProvider, CompletionRequest, CompletionResponse, FinishReason, Message,
    MessageRole, ProviderInfo, RequestMetadata, TokenUsage,
};
pub use item_store::{CommitMode, ItemSnapshot, ItemStore, ItemStoreError};
pub use quality_checker::{group_by_state, CanonicalByState, QualityCheckError, QualityChecker};
