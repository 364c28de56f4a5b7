//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the pipeline to external systems:
//! - `ai` - Language-model providers (Anthropic, mock)
//! - `storage` - Item stores (YAML files, in-memory)
//! - `quality` - Quality checkers (lexical heuristics, mock)

pub mod ai;
pub mod quality;
pub mod storage;

pub use ai::{AnthropicConfig, AnthropicProvider, MockAIProvider};
pub use quality::{LexicalQualityChecker, MockQualityChecker};
pub use storage::{FileItemStore, InMemoryItemStore};
