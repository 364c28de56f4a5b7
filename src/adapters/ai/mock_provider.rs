//! Scripted language-model provider for tests and offline runs.
//!
//! Completions are served from a queue in the order they were scripted;
//! once the queue is empty a fixed fallback reply is returned. Every
//! request is recorded so tests can assert on what was sent, or that
//! nothing was sent at all.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;

use crate::ports::{
    AIError, AIProvider, CompletionRequest, CompletionResponse, FinishReason, ProviderInfo,
    TokenUsage,
};

/// Reply used when the script runs out.
pub const FALLBACK_REPLY: &str = "Mock response";

/// One scripted outcome.
#[derive(Debug, Clone)]
pub enum MockResponse {
    Success {
        content: String,
        finish_reason: FinishReason,
    },
    Error(MockError),
}

/// Failures the mock can simulate.
#[derive(Debug, Clone)]
pub enum MockError {
    RateLimited { retry_after_secs: u32 },
    Unavailable { message: String },
    AuthenticationFailed,
    Network { message: String },
    Timeout { timeout_secs: u32 },
}

impl From<MockError> for AIError {
    fn from(err: MockError) -> Self {
        match err {
            MockError::RateLimited { retry_after_secs } => AIError::rate_limited(retry_after_secs),
            MockError::Unavailable { message } => AIError::unavailable(message),
            MockError::AuthenticationFailed => AIError::AuthenticationFailed,
            MockError::Network { message } => AIError::network(message),
            MockError::Timeout { timeout_secs } => AIError::Timeout { timeout_secs },
        }
    }
}

/// Language-model test double.
///
/// Cloning shares the script and the call log.
#[derive(Debug, Clone)]
pub struct MockAIProvider {
    script: Arc<Mutex<VecDeque<MockResponse>>>,
    calls: Arc<Mutex<Vec<CompletionRequest>>>,
    info: ProviderInfo,
    delay: Duration,
}

impl Default for MockAIProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockAIProvider {
    pub fn new() -> Self {
        Self {
            script: Arc::new(Mutex::new(VecDeque::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
            info: ProviderInfo::new("mock", "mock-model-1", 200_000),
            delay: Duration::ZERO,
        }
    }

    /// Queues a successful completion.
    pub fn with_response(self, content: impl Into<String>) -> Self {
        self.push(MockResponse::Success {
            content: content.into(),
            finish_reason: FinishReason::Stop,
        });
        self
    }

    /// Queues several successful completions in order.
    pub fn with_responses<I, S>(self, contents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        contents
            .into_iter()
            .fold(self, |provider, content| provider.with_response(content))
    }

    /// Queues a failure.
    pub fn with_error(self, error: MockError) -> Self {
        self.push(MockResponse::Error(error));
        self
    }

    /// Adds latency to every call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Queues a response on an already shared provider.
    pub fn push(&self, response: MockResponse) {
        self.script.lock().unwrap().push_back(response);
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// All recorded requests, oldest first.
    pub fn calls(&self) -> Vec<CompletionRequest> {
        self.calls.lock().unwrap().clone()
    }

    pub fn last_call(&self) -> Option<CompletionRequest> {
        self.calls.lock().unwrap().last().cloned()
    }

    /// Number of scripted responses not yet consumed.
    pub fn remaining(&self) -> usize {
        self.script.lock().unwrap().len()
    }
}

#[async_trait]
impl AIProvider for MockAIProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, AIError> {
        let prompt_tokens = estimate_tokens(&request);
        self.calls.lock().unwrap().push(request);

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        let next = self.script.lock().unwrap().pop_front();
        match next.unwrap_or_else(|| MockResponse::Success {
            content: FALLBACK_REPLY.to_string(),
            finish_reason: FinishReason::Stop,
        }) {
            MockResponse::Success {
                content,
                finish_reason,
            } => {
                let completion_tokens = content.split_whitespace().count() as u32;
                Ok(CompletionResponse {
                    content,
                    usage: TokenUsage::new(prompt_tokens, completion_tokens),
                    model: self.info.model.clone(),
                    finish_reason,
                })
            }
            MockResponse::Error(err) => Err(err.into()),
        }
    }

    fn provider_info(&self) -> ProviderInfo {
        self.info.clone()
    }
}

/// Rough word count of everything sent, used as a stand-in token count.
fn estimate_tokens(request: &CompletionRequest) -> u32 {
    let system = request
        .system_prompt
        .as_deref()
        .map(|s| s.split_whitespace().count())
        .unwrap_or(0);
    let messages: usize = request
        .messages
        .iter()
        .map(|m| m.content.split_whitespace().count())
        .sum();
    (system + messages) as u32
}
