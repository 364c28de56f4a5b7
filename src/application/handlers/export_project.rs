//! ExportProjectHandler - turns the captured items into a document.

use std::sync::Arc;

use crate::domain::conversation::ConversationContext;
use crate::domain::export::{ExportFormat, ExportFormatter, ExportPlan, NOTHING_TO_EXPORT_MESSAGE};
use crate::domain::foundation::ProjectId;
use crate::ports::{AIError, AIProvider, CompletionRequest, RequestMetadata, TokenUsage};

#[derive(Debug, Clone)]
pub struct ExportProjectCommand {
    pub project_id: ProjectId,
    pub trace_id: String,
    pub request: String,
    pub context: ConversationContext,
}

#[derive(Debug, Clone)]
pub struct ExportProjectResult {
    pub format: ExportFormat,
    pub document: String,
    /// `None` when the project was empty and no model call was made.
    pub usage: Option<TokenUsage>,
}

/// Generates exports. An empty project never reaches the model.
pub struct ExportProjectHandler {
    ai: Arc<dyn AIProvider>,
    formatter: ExportFormatter,
}

impl ExportProjectHandler {
    pub fn new(ai: Arc<dyn AIProvider>) -> Self {
        Self {
            ai,
            formatter: ExportFormatter::new(),
        }
    }

    pub async fn handle(&self, cmd: ExportProjectCommand) -> Result<ExportProjectResult, AIError> {
        match self.formatter.format(&cmd.request, &cmd.context) {
            ExportPlan::NothingToExport { format } => {
                tracing::debug!(project_id = %cmd.project_id, format = %format, "nothing to export");
                Ok(ExportProjectResult {
                    format,
                    document: NOTHING_TO_EXPORT_MESSAGE.to_string(),
                    usage: None,
                })
            }
            ExportPlan::Generate { format, prompt } => {
                let request = CompletionRequest::from_plan(
                    &prompt,
                    RequestMetadata::new(cmd.project_id, cmd.trace_id),
                );
                let response = self.ai.complete(request).await?;

                tracing::info!(
                    project_id = %cmd.project_id,
                    format = %format,
                    completion_tokens = response.usage.completion_tokens,
                    "export generated"
                );

                Ok(ExportProjectResult {
                    format,
                    document: response.content.trim().to_string(),
                    usage: Some(response.usage),
                })
            }
        }
    }
}
