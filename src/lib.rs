//! Brainstorm Core - conversational idea capture with deduplication
//!
//! Routes each user message to a brainstorm, decide or export strategy,
//! extracts tagged ideas and decisions from the language model's reply,
//! and reconciles them against a project's canonical items so that near
//! duplicates are merged or dropped instead of piling up.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod telemetry;
