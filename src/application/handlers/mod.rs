//! Application handlers.
//!
//! Command handlers that orchestrate domain operations over the ports.

mod brainstorm;
mod export_project;
mod extract_decision;
mod handle_message;
mod reconcile_candidates;
mod transition_item_state;

pub use brainstorm::{BrainstormCommand, BrainstormHandler, BrainstormResult};
pub use export_project::{ExportProjectCommand, ExportProjectHandler, ExportProjectResult};
pub use extract_decision::{
    ExtractDecisionCommand, ExtractDecisionHandler, ExtractDecisionResult,
};
pub use handle_message::{
    HandleMessageCommand, HandleMessageError, HandleMessageHandler, HandleMessageResult,
};
pub use reconcile_candidates::{
    ReconcileCandidatesCommand, ReconcileCandidatesHandler, ReconcileCandidatesResult,
    ReconcileError,
};
pub use transition_item_state::{
    TransitionItemStateCommand, TransitionItemStateError, TransitionItemStateHandler,
    TransitionItemStateResult,
};
