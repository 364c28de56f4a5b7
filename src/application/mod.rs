//! Application layer - Commands and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Handlers that mutate a project's items hold its [`ProjectLocks`] entry
//! for the whole read, reconcile, write sequence.

pub mod handlers;
mod project_locks;

pub use handlers::{
    // Conversation
    BrainstormCommand, BrainstormHandler, BrainstormResult,
    ExportProjectCommand, ExportProjectHandler, ExportProjectResult,
    ExtractDecisionCommand, ExtractDecisionHandler, ExtractDecisionResult,
    HandleMessageCommand, HandleMessageError, HandleMessageHandler, HandleMessageResult,
    // Items
    ReconcileCandidatesCommand, ReconcileCandidatesHandler, ReconcileCandidatesResult,
    ReconcileError,
    TransitionItemStateCommand, TransitionItemStateError, TransitionItemStateHandler,
    TransitionItemStateResult,
};
pub use project_locks::ProjectLocks;
