//! Brainstorm strategy: open-ended ideation that may surface new ideas.
//!
//! Ideas proposed by the assistant come back wrapped in `<idea>` tags and
//! are turned into exploring candidates for quick reconciliation.

use crate::domain::item::CandidateIdea;

use super::context::{ConversationContext, ConversationTurn};
use super::prompt::{numbered_list, strip_control_chars, take_all_blocks, ParseIssue, PromptPlan};

/// Number of prior turns sent along with the new message.
pub const BRAINSTORM_HISTORY_TURNS: usize = 10;

/// Completion budget for the brainstorm strategy.
pub const BRAINSTORM_MAX_TOKENS: u32 = 2048;

const IDEA_TAG: &str = "idea";

/// Parsed brainstorm completion.
#[derive(Debug, Clone, PartialEq)]
pub struct BrainstormOutcome {
    /// Reply with idea tags removed and idea text kept inline.
    pub reply: String,
    /// New ideas in the order they were proposed.
    pub ideas: Vec<String>,
    pub issues: Vec<ParseIssue>,
}

impl BrainstormOutcome {
    /// Proposed ideas as candidates in the default exploring state.
    pub fn candidates(&self) -> Vec<CandidateIdea> {
        self.ideas
            .iter()
            .filter_map(|text| CandidateIdea::new(text.as_str()).ok())
            .collect()
    }
}

/// Builds brainstorm prompts and parses the replies. Stateless.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrainstormFacilitator;

impl BrainstormFacilitator {
    pub fn new() -> Self {
        Self
    }

    pub fn build_prompt(&self, message: &str, context: &ConversationContext) -> PromptPlan {
        let system_prompt = format!(
            "You are a brainstorming partner for the project \"{title}\".\n\n\
             Decisions already made:\n{decisions}\n\n\
             Ideas still being explored:\n{ideas}\n\n\
             Build on the user's message with concrete, varied suggestions. Respect the \
             decisions already made and avoid repeating ideas already listed. Wrap each \
             genuinely new idea in <idea></idea> tags as a single short sentence.",
            title = context.project_title(),
            decisions = numbered_list(context.decisions()),
            ideas = numbered_list(context.ideas()),
        );

        let mut turns = context.last_turns(BRAINSTORM_HISTORY_TURNS).to_vec();
        turns.push(ConversationTurn::user(message));

        PromptPlan {
            system_prompt,
            turns,
            max_tokens: BRAINSTORM_MAX_TOKENS,
        }
    }

    /// Extracts tagged ideas. The idea text stays in the reply so the user still reads it.
    pub fn parse(&self, completion: &str) -> BrainstormOutcome {
        let mut issues = Vec::new();
        let text = strip_control_chars(completion);
        let (_, ideas) = take_all_blocks(&text, IDEA_TAG, &mut issues);

        let reply = text
            .replace(&format!("<{}>", IDEA_TAG), "")
            .replace(&format!("</{}>", IDEA_TAG), "")
            .trim()
            .to_string();

        for issue in &issues {
            tracing::debug!(code = %issue.code(), issue = %issue, "degraded brainstorm parse");
        }

        BrainstormOutcome {
            reply,
            ideas,
            issues,
        }
    }
}
