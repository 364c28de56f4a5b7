//! Decision extraction.
//!
//! Builds the decide-mode prompt and parses the tagged completion that comes
//! back. Parsing is lenient: a missing or malformed block never fails the
//! turn, it only means no decision was captured.

use serde::{Deserialize, Serialize};

use crate::domain::item::{CandidateIdea, ItemState};

use super::context::{ConversationContext, ConversationTurn};
use super::prompt::{numbered_list, strip_control_chars, take_block, ParseIssue, PromptPlan};

/// Number of prior turns sent along with the new message.
pub const MAX_HISTORY_TURNS: usize = 6;

/// Completion budget for the decide strategy.
pub const DECISION_MAX_TOKENS: u32 = 1024;

const DECISION_TAG: &str = "decision";
const CONFLICT_TAG: &str = "conflict";

/// Result of parsing one decide-mode completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionOutcome {
    /// Completion text with the tagged blocks removed, plus a note when a conflict was flagged.
    pub clean_message: String,
    pub decision: Option<String>,
    pub conflict: Option<String>,
    #[serde(skip)]
    pub issues: Vec<ParseIssue>,
}

impl ExtractionOutcome {
    /// The captured decision as a candidate in the decided state.
    pub fn decision_candidate(&self) -> Option<CandidateIdea> {
        let text = self.decision.as_deref()?;
        CandidateIdea::new(text)
            .ok()
            .map(|candidate| candidate.with_state(ItemState::Decided))
    }
}

/// Builds decide prompts and parses their completions. Stateless.
#[derive(Debug, Clone, Copy, Default)]
pub struct DecisionExtractor;

impl DecisionExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Prompt for recording a decision made in `message`.
    pub fn build_prompt(&self, message: &str, context: &ConversationContext) -> PromptPlan {
        let system_prompt = format!(
            "You are helping capture decisions for the project \"{title}\".\n\n\
             Decisions already made:\n{decisions}\n\n\
             Ideas still being explored:\n{ideas}\n\n\
             The user is committing to a decision. Respond as follows:\n\
             1. Acknowledge the decision briefly, in one or two sentences.\n\
             2. Restate the decision as a single concise sentence wrapped in \
             <decision></decision> tags.\n\
             3. If it overlaps or contradicts a decision already made, describe the \
             overlap in one sentence wrapped in <conflict></conflict> tags. Otherwise \
             omit the conflict tags.\n\
             Do not emit any tags if the message does not contain a decision.",
            title = context.project_title(),
            decisions = numbered_list(context.decisions()),
            ideas = numbered_list(context.ideas()),
        );

        let mut turns = context.last_turns(MAX_HISTORY_TURNS).to_vec();
        turns.push(ConversationTurn::user(message));

        PromptPlan {
            system_prompt,
            turns,
            max_tokens: DECISION_MAX_TOKENS,
        }
    }

    /// Parses a completion into visible text, decision and conflict.
    ///
    /// Only the first block of each kind is used. Tags are matched
    /// case-sensitively; an unclosed tag is left in the visible text.
    pub fn parse(&self, completion: &str) -> ExtractionOutcome {
        let mut issues = Vec::new();
        let text = strip_control_chars(completion);

        let (text, decision) = take_block(&text, DECISION_TAG, &mut issues);
        let (text, conflict) = take_block(&text, CONFLICT_TAG, &mut issues);

        let visible = text.trim();
        let clean_message = match &conflict {
            Some(note) if visible.is_empty() => format!("Note: {}", note),
            Some(note) => format!("{}\n\nNote: {}", visible, note),
            None => visible.to_string(),
        };

        for issue in &issues {
            tracing::debug!(code = %issue.code(), issue = %issue, "degraded decision parse");
        }

        ExtractionOutcome {
            clean_message,
            decision,
            conflict,
            issues,
        }
    }
}
