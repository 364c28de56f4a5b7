//! Domain layer containing business logic and domain types.
//!
//! Everything here is pure and synchronous. Collaborators (language model,
//! item store, quality checker) are reached only through `ports`.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (IDs, timestamps, errors, state machine)
//! - `item` - Canonical items, candidate ideas and their lifecycle
//! - `similarity` - Lexical similarity scoring and duplicate recommendations
//! - `conversation` - Mode routing, decision extraction and brainstorm prompts
//! - `export` - Export classification and document prompts
//! - `reconciliation` - Admitting candidates against the canonical set

pub mod conversation;
pub mod export;
pub mod foundation;
pub mod item;
pub mod reconciliation;
pub mod similarity;
