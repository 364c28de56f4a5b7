//! BrainstormHandler - runs the brainstorm strategy against the language model.

use std::sync::Arc;

use crate::domain::conversation::{BrainstormFacilitator, BrainstormOutcome, ConversationContext};
use crate::domain::foundation::ProjectId;
use crate::ports::{AIError, AIProvider, CompletionRequest, RequestMetadata, TokenUsage};

/// Command to continue a brainstorm with a user message.
#[derive(Debug, Clone)]
pub struct BrainstormCommand {
    pub project_id: ProjectId,
    pub trace_id: String,
    pub message: String,
    pub context: ConversationContext,
}

#[derive(Debug, Clone)]
pub struct BrainstormResult {
    pub outcome: BrainstormOutcome,
    pub usage: TokenUsage,
}

/// Sends one brainstorm prompt and collects the ideas it proposes.
pub struct BrainstormHandler {
    ai: Arc<dyn AIProvider>,
    facilitator: BrainstormFacilitator,
}

impl BrainstormHandler {
    pub fn new(ai: Arc<dyn AIProvider>) -> Self {
        Self {
            ai,
            facilitator: BrainstormFacilitator::new(),
        }
    }

    pub async fn handle(&self, cmd: BrainstormCommand) -> Result<BrainstormResult, AIError> {
        let plan = self.facilitator.build_prompt(&cmd.message, &cmd.context);
        let request =
            CompletionRequest::from_plan(&plan, RequestMetadata::new(cmd.project_id, cmd.trace_id));

        let response = self.ai.complete(request).await?;
        let outcome = self.facilitator.parse(&response.content);

        tracing::debug!(
            project_id = %cmd.project_id,
            ideas = outcome.ideas.len(),
            "brainstorm completion parsed"
        );

        Ok(BrainstormResult {
            outcome,
            usage: response.usage,
        })
    }
}
