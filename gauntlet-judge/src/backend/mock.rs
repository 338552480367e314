//! Mock LLM backend for testing.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use super::traits::*;

/// A scripted reply.
#[derive(Debug, Clone)]
enum Scripted {
    Text(String),
    Failure(String),
}

/// Mock backend for testing.
///
/// Replies are taken from a queue; once the queue is drained the default
/// response is returned for every call.
pub struct MockBackend {
    model_id: String,
    default_response: String,
    script: Mutex<VecDeque<Scripted>>,
    delay: Option<Duration>,
    call_count: AtomicU32,
    last_request: Mutex<Option<CompletionRequest>>,
}

impl MockBackend {
    /// Create a new mock backend.
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            default_response: "Mock response".to_string(),
            script: Mutex::new(VecDeque::new()),
            delay: None,
            call_count: AtomicU32::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Set the response returned once the script is exhausted.
    pub fn with_response(mut self, content: impl Into<String>) -> Self {
        self.default_response = content.into();
        self
    }

    /// Queue a reply for the next call.
    pub fn then_reply(self, content: impl Into<String>) -> Self {
        self.push(Scripted::Text(content.into()));
        self
    }

    /// Queue a network failure for the next call.
    pub fn then_fail(self, message: impl Into<String>) -> Self {
        self.push(Scripted::Failure(message.into()));
        self
    }

    /// Sleep before answering every call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Get the number of times complete was called.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::SeqCst)
    }

    /// The most recent request received.
    pub fn last_request(&self) -> Option<CompletionRequest> {
        self.last_request
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn push(&self, reply: Scripted) {
        self.script
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push_back(reply);
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new("mock-model")
    }
}

#[async_trait]
impl LlmBackend for MockBackend {
    fn id(&self) -> &str {
        &self.model_id
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);

        // Estimate token counts
        let prompt_tokens: u32 = request
            .messages
            .iter()
            .map(|m| m.content.len() as u32 / 4)
            .sum();

        *self
            .last_request
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(request);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let next = self
            .script
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .pop_front();

        let content = match next {
            Some(Scripted::Failure(message)) => return Err(LlmError::NetworkError(message)),
            Some(Scripted::Text(text)) => text,
            None => self.default_response.clone(),
        };

        Ok(CompletionResponse {
            usage: Usage {
                prompt_tokens,
                completion_tokens: content.len() as u32 / 4,
            },
            content,
        })
    }
}
