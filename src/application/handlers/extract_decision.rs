//! ExtractDecisionHandler - runs the decide strategy against the language model.

use std::sync::Arc;

use crate::domain::conversation::{ConversationContext, DecisionExtractor, ExtractionOutcome};
use crate::domain::foundation::ProjectId;
use crate::ports::{AIError, AIProvider, CompletionRequest, RequestMetadata, TokenUsage};

/// Command to extract a decision from a user message.
#[derive(Debug, Clone)]
pub struct ExtractDecisionCommand {
    pub project_id: ProjectId,
    pub trace_id: String,
    pub message: String,
    pub context: ConversationContext,
}

#[derive(Debug, Clone)]
pub struct ExtractDecisionResult {
    pub outcome: ExtractionOutcome,
    pub usage: TokenUsage,
}

/// Sends one decide prompt and parses the tagged reply.
///
/// Nothing is persisted here; the captured decision goes through
/// verified reconciliation afterwards.
pub struct ExtractDecisionHandler {
    ai: Arc<dyn AIProvider>,
    extractor: DecisionExtractor,
}

impl ExtractDecisionHandler {
    pub fn new(ai: Arc<dyn AIProvider>) -> Self {
        Self {
            ai,
            extractor: DecisionExtractor::new(),
        }
    }

    pub async fn handle(&self, cmd: ExtractDecisionCommand) -> Result<ExtractDecisionResult, AIError> {
        let plan = self.extractor.build_prompt(&cmd.message, &cmd.context);
        let request =
            CompletionRequest::from_plan(&plan, RequestMetadata::new(cmd.project_id, cmd.trace_id));

        let response = self.ai.complete(request).await?;
        let outcome = self.extractor.parse(&response.content);

        tracing::debug!(
            project_id = %cmd.project_id,
            decision = outcome.decision.is_some(),
            conflict = outcome.conflict.is_some(),
            "decide completion parsed"
        );

        Ok(ExtractDecisionResult {
            outcome,
            usage: response.usage,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::{MockAIProvider, MockError};
    use crate::domain::conversation::{ConversationTurn, DECISION_MAX_TOKENS};
    use crate::domain::item::{Item, ItemState};

    fn command(message: &str, context: ConversationContext) -> ExtractDecisionCommand {
        ExtractDecisionCommand {
            project_id: ProjectId::new(),
            trace_id: "trace-1".to_string(),
            message: message.to_string(),
            context,
        }
    }

    #[tokio::test]
    async fn tagged_reply_yields_decision() {
        let ai = MockAIProvider::new()
            .with_response("Got it. <decision>Use Postgres for storage</decision>");
        let handler = ExtractDecisionHandler::new(Arc::new(ai.clone()));
        let context = ConversationContext::new("Shop", &[], &[]);

        let result = handler
            .handle(command("decide: we'll use Postgres", context))
            .await
            .unwrap();

        assert_eq!(result.outcome.decision.as_deref(), Some("Use Postgres for storage"));
        assert_eq!(result.outcome.clean_message, "Got it.");
        assert_eq!(ai.call_count(), 1);
    }

    #[tokio::test]
    async fn request_carries_prompt_and_budget() {
        let ai = MockAIProvider::new().with_response("Noted.");
        let handler = ExtractDecisionHandler::new(Arc::new(ai.clone()));
        let decided = Item::new("Ship web first", ItemState::Decided).unwrap();
        let history = vec![
            ConversationTurn::user("what about mobile?"),
            ConversationTurn::assistant("later"),
        ];
        let context = ConversationContext::new("Shop", &[decided], &history);

        handler
            .handle(command("let's go with Stripe", context))
            .await
            .unwrap();

        let request = ai.last_call().unwrap();
        assert_eq!(request.max_tokens, Some(DECISION_MAX_TOKENS));
        assert!(request.system_prompt.unwrap().contains("1. Ship web first"));
        assert_eq!(request.messages.len(), 3);
        assert_eq!(request.messages[2].content, "let's go with Stripe");
        assert_eq!(request.metadata.trace_id, "trace-1");
    }

    #[tokio::test]
    async fn provider_errors_propagate() {
        let ai = MockAIProvider::new().with_error(MockError::Unavailable {
            message: "down".to_string(),
        });
        let handler = ExtractDecisionHandler::new(Arc::new(ai));

        let err = handler
            .handle(command("decide: yes", ConversationContext::new("Shop", &[], &[])))
            .await
            .unwrap_err();

        assert!(err.is_retryable());
    }
}
