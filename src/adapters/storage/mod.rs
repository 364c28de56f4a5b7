//! Storage Adapters
//!
//! Implementations of the ItemStore port.
//!
//! ## Available Adapters
//!
//! - **FileItemStore** - One YAML document per project on disk
//! - **InMemoryItemStore** - Items in memory (testing/development)
//!
//! ## Usage
//!
//! ```ignore
//! use adapters::storage::{FileItemStore, InMemoryItemStore};
//!
//! let store = FileItemStore::new("./data/projects");
//! let store = InMemoryItemStore::new();
//! ```

mod file_item_store;
mod in_memory_item_store;

pub use file_item_store::FileItemStore;
pub use in_memory_item_store::InMemoryItemStore;
