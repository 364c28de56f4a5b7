//! Conversation domain module.
//!
//! Routes each user message to a strategy (brainstorm, decide, export) and
//! holds the pure prompt-building and completion-parsing for each.

mod brainstorm;
mod context;
mod extractor;
mod mode;
mod prompt;

pub use brainstorm::{
    BrainstormFacilitator, BrainstormOutcome, BRAINSTORM_HISTORY_TURNS, BRAINSTORM_MAX_TOKENS,
};
pub use context::{ConversationContext, ConversationTurn, TurnRole, CONTEXT_TURN_WINDOW};
pub use extractor::{
    DecisionExtractor, ExtractionOutcome, DECISION_MAX_TOKENS, MAX_HISTORY_TURNS,
};
pub use mode::{detect_mode, Mode, ModeRouter, ModeTriggers};
pub use prompt::{numbered_list, ParseIssue, PromptPlan, NONE_YET};
