//! HandleMessageHandler - one user message through the whole pipeline.
//!
//! Routes the message, runs the matching strategy against the language
//! model, and reconciles whatever the reply proposed. The model call
//! happens outside the project lock; reconciliation re-reads the canonical
//! set under the lock, so items committed during the call are still seen.

use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use super::brainstorm::{BrainstormCommand, BrainstormHandler};
use super::export_project::{ExportProjectCommand, ExportProjectHandler};
use super::extract_decision::{ExtractDecisionCommand, ExtractDecisionHandler};
use super::reconcile_candidates::{
    ReconcileCandidatesCommand, ReconcileCandidatesHandler, ReconcileError,
};
use crate::domain::conversation::{ConversationContext, ConversationTurn, Mode, ModeRouter};
use crate::domain::export::ExportFormat;
use crate::domain::foundation::{DomainError, ErrorCode, ProjectId};
use crate::domain::item::{CandidateIdea, Item};
use crate::domain::reconciliation::{
    DroppedCandidate, DuplicateMatch, QualityReport, ReconciliationMode,
};
use crate::ports::{AIError, AIProvider, ItemStore, ItemStoreError, TokenUsage};

/// Command carrying one user message.
#[derive(Debug, Clone)]
pub struct HandleMessageCommand {
    pub project_id: ProjectId,
    pub project_title: String,
    pub message: String,
    /// Prior turns, oldest first. Trimmed to the context window.
    pub history: Vec<ConversationTurn>,
}

/// Everything the caller needs to render the turn.
#[derive(Debug, Clone)]
pub struct HandleMessageResult {
    pub mode: Mode,
    pub reply: String,
    /// Items written to the store during this turn.
    pub committed: Vec<Item>,
    pub matches: Vec<DuplicateMatch>,
    pub dropped: Vec<DroppedCandidate>,
    pub quality: Option<QualityReport>,
    pub decision: Option<String>,
    pub conflict: Option<String>,
    pub export_format: Option<ExportFormat>,
    /// `None` when no model call was made.
    pub usage: Option<TokenUsage>,
}

impl HandleMessageResult {
    fn reply(mode: Mode, reply: impl Into<String>) -> Self {
        Self {
            mode,
            reply: reply.into(),
            committed: Vec::new(),
            matches: Vec::new(),
            dropped: Vec::new(),
            quality: None,
            decision: None,
            conflict: None,
            export_format: None,
            usage: None,
        }
    }
}

/// Errors from handling a message.
#[derive(Debug, Clone, Error)]
pub enum HandleMessageError {
    #[error("Message content cannot be empty")]
    EmptyMessage,

    #[error("Language model unavailable: {0}")]
    Collaborator(#[from] AIError),

    #[error(transparent)]
    Reconcile(#[from] ReconcileError),

    #[error(transparent)]
    Store(#[from] ItemStoreError),
}

impl HandleMessageError {
    pub fn code(&self) -> ErrorCode {
        match self {
            HandleMessageError::EmptyMessage => ErrorCode::ValidationFailed,
            HandleMessageError::Collaborator(_) => ErrorCode::CollaboratorUnavailable,
            HandleMessageError::Reconcile(err) => err.code(),
            HandleMessageError::Store(err) => DomainError::from(err.clone()).code,
        }
    }

    /// True when sending the same message again may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            HandleMessageError::EmptyMessage => false,
            HandleMessageError::Collaborator(err) => err.is_retryable(),
            HandleMessageError::Reconcile(_) | HandleMessageError::Store(_) => {
                self.code() == ErrorCode::StaleReconciliation
            }
        }
    }
}

impl From<HandleMessageError> for DomainError {
    fn from(err: HandleMessageError) -> Self {
        DomainError::new(err.code(), err.to_string())
    }
}

/// Entry point for conversational turns.
pub struct HandleMessageHandler {
    store: Arc<dyn ItemStore>,
    router: ModeRouter,
    brainstorm: BrainstormHandler,
    extract: ExtractDecisionHandler,
    export: ExportProjectHandler,
    reconcile: ReconcileCandidatesHandler,
}

impl HandleMessageHandler {
    pub fn new(
        ai: Arc<dyn AIProvider>,
        store: Arc<dyn ItemStore>,
        reconcile: ReconcileCandidatesHandler,
    ) -> Self {
        Self {
            store,
            router: ModeRouter::default(),
            brainstorm: BrainstormHandler::new(ai.clone()),
            extract: ExtractDecisionHandler::new(ai.clone()),
            export: ExportProjectHandler::new(ai),
            reconcile,
        }
    }

    /// Replaces the trigger vocabulary.
    pub fn with_router(mut self, router: ModeRouter) -> Self {
        self.router = router;
        self
    }

    pub async fn handle(
        &self,
        cmd: HandleMessageCommand,
    ) -> Result<HandleMessageResult, HandleMessageError> {
        if cmd.message.trim().is_empty() {
            return Err(HandleMessageError::EmptyMessage);
        }

        let mode = self.router.detect_mode(&cmd.message);
        let trace_id = Uuid::new_v4().to_string();
        tracing::debug!(project_id = %cmd.project_id, mode = %mode, trace_id = %trace_id, "message routed");

        let items = self.store.get_items(cmd.project_id).await?;
        let context = ConversationContext::new(cmd.project_title.as_str(), &items, &cmd.history);

        match mode {
            Mode::Brainstorm => self.brainstorm(cmd, trace_id, context).await,
            Mode::Decide => self.decide(cmd, trace_id, context).await,
            Mode::Export => self.export(cmd, trace_id, context).await,
        }
    }

    async fn brainstorm(
        &self,
        cmd: HandleMessageCommand,
        trace_id: String,
        context: ConversationContext,
    ) -> Result<HandleMessageResult, HandleMessageError> {
        let project_id = cmd.project_id;
        let result = self
            .brainstorm
            .handle(BrainstormCommand {
                project_id,
                trace_id,
                message: cmd.message,
                context,
            })
            .await
            .inspect_err(|err| warn_collaborator(project_id, err))?;

        let mut response = HandleMessageResult::reply(Mode::Brainstorm, result.outcome.reply.clone());
        response.usage = Some(result.usage);

        let candidates = result.outcome.candidates();
        if !candidates.is_empty() {
            self.reconcile_into(&mut response, project_id, candidates, ReconciliationMode::Quick)
                .await?;
        }
        Ok(response)
    }

    async fn decide(
        &self,
        cmd: HandleMessageCommand,
        trace_id: String,
        context: ConversationContext,
    ) -> Result<HandleMessageResult, HandleMessageError> {
        let project_id = cmd.project_id;
        let result = self
            .extract
            .handle(ExtractDecisionCommand {
                project_id,
                trace_id,
                message: cmd.message,
                context,
            })
            .await
            .inspect_err(|err| warn_collaborator(project_id, err))?;

        let outcome = result.outcome;
        let mut response = HandleMessageResult::reply(Mode::Decide, outcome.clean_message.clone());
        response.usage = Some(result.usage);
        response.decision = outcome.decision.clone();
        response.conflict = outcome.conflict.clone();

        if let Some(candidate) = outcome.decision_candidate() {
            self.reconcile_into(
                &mut response,
                project_id,
                vec![candidate],
                ReconciliationMode::Verified,
            )
            .await?;
        }
        Ok(response)
    }

    async fn export(
        &self,
        cmd: HandleMessageCommand,
        trace_id: String,
        context: ConversationContext,
    ) -> Result<HandleMessageResult, HandleMessageError> {
        let project_id = cmd.project_id;
        let result = self
            .export
            .handle(ExportProjectCommand {
                project_id,
                trace_id,
                request: cmd.message,
                context,
            })
            .await
            .inspect_err(|err| warn_collaborator(project_id, err))?;

        let mut response = HandleMessageResult::reply(Mode::Export, result.document);
        response.export_format = Some(result.format);
        response.usage = result.usage;
        Ok(response)
    }

    async fn reconcile_into(
        &self,
        response: &mut HandleMessageResult,
        project_id: ProjectId,
        candidates: Vec<CandidateIdea>,
        mode: ReconciliationMode,
    ) -> Result<(), HandleMessageError> {
        let result = self
            .reconcile
            .handle(ReconcileCandidatesCommand {
                project_id,
                candidates,
                mode,
            })
            .await?;

        let reconciliation = result.reconciliation;
        response.committed = reconciliation.admitted;
        response.matches = reconciliation.matches;
        response.dropped = reconciliation.dropped;
        response.quality = reconciliation.quality;
        Ok(())
    }
}

fn warn_collaborator(project_id: ProjectId, err: &AIError) {
    tracing::warn!(
        project_id = %project_id,
        error = %err,
        retryable = err.is_retryable(),
        "language model call failed"
    );
}
