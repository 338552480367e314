//! JudgeService - validates a submission, asks the persona, returns a verdict.
//!
//! The service is a pure request/response boundary: exactly one backend
//! call per valid invocation, no caching, no retries, no local state.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::backend::traits::{CompletionRequest, LlmBackend};
use crate::error::JudgeError;
use crate::level::Level;
use crate::persona::PersonaRegistry;
use crate::verdict::{parse_verdict, Verdict};

#[cfg(feature = "typescript")]
use ts_rs::TS;

/// A submission to be judged.
///
/// `level` is kept as the raw client ordinal so that an unknown level can be
/// reported as such rather than as a decoding failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct JudgeRequest {
    /// Level ordinal, 1-5
    #[cfg_attr(feature = "typescript", ts(type = "number"))]
    pub level: i64,
    /// The player's written answer
    pub user_input: String,
    /// Name of the idea being judged
    pub idea_name: String,
}

impl JudgeRequest {
    /// Create a request for a known level.
    pub fn new(level: Level, idea_name: impl Into<String>, user_input: impl Into<String>) -> Self {
        Self {
            level: i64::from(level.ordinal()),
            user_input: user_input.into(),
            idea_name: idea_name.into(),
        }
    }

    /// Prompt content sent as the user turn.
    pub fn contextual_input(&self) -> String {
        format!("Idea: {}\n\nSubmission: {}", self.idea_name, self.user_input)
    }
}

/// Configuration for the JudgeService.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Upper bound on a single model call
    pub timeout: Duration,
    /// Maximum tokens the judge may generate
    pub max_tokens: u32,
    /// Sampling temperature
    pub temperature: f32,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(20),
            max_tokens: 512,
            temperature: 0.7,
        }
    }
}

/// Judging service over an optional model backend.
///
/// A service built without a backend still validates requests, then reports
/// [`JudgeError::Configuration`] so that a deployment missing its credential
/// answers requests instead of failing to start.
#[derive(Clone)]
pub struct JudgeService {
    config: ServiceConfig,
    backend: Option<Arc<dyn LlmBackend>>,
}

impl JudgeService {
    /// Create a service with the given backend.
    pub fn new(backend: Arc<dyn LlmBackend>) -> Self {
        Self {
            config: ServiceConfig::default(),
            backend: Some(backend),
        }
    }

    /// Create a service with no configured backend.
    pub fn unconfigured() -> Self {
        Self {
            config: ServiceConfig::default(),
            backend: None,
        }
    }

    /// Create with configuration.
    pub fn with_config(mut self, config: ServiceConfig) -> Self {
        self.config = config;
        self
    }

    /// Identifier of the backing model, if any.
    pub fn model_id(&self) -> Option<&str> {
        self.backend.as_deref().map(|b| b.id())
    }

    /// Whether a backend is configured.
    pub fn is_configured(&self) -> bool {
        self.backend.is_some()
    }

    /// Judge one submission.
    pub async fn judge(&self, request: &JudgeRequest) -> Result<Verdict, JudgeError> {
        let (level, instruction) = Self::validate(request)?;

        let backend = self.backend.as_ref().ok_or_else(|| {
            error!("Judge model credential is not configured");
            JudgeError::Configuration("model credential not configured".to_string())
        })?;

        let completion_request = CompletionRequest::user(request.contextual_input())
            .with_system(instruction)
            .with_max_tokens(self.config.max_tokens)
            .with_temperature(self.config.temperature)
            .with_json_output();

        debug!(
            level = %level,
            model = backend.id(),
            input_len = request.user_input.len(),
            "Requesting judgment"
        );

        let start = Instant::now();
        let completion = tokio::time::timeout(self.config.timeout, backend.complete(completion_request))
            .await
            .map_err(|_| {
                warn!(level = %level, timeout_ms = self.config.timeout.as_millis() as u64, "Judge model timed out");
                JudgeError::Upstream(format!("no reply within {:?}", self.config.timeout))
            })?
            .map_err(|e| {
                warn!(level = %level, error = %e, "Judge model call failed");
                JudgeError::from(e)
            })?;

        let verdict = parse_verdict(&completion.content).inspect_err(|e| {
            warn!(level = %level, error = %e, reply_len = completion.content.len(), "Unparseable judgment");
        })?;

        info!(
            level = %level,
            verdict = ?verdict.verdict,
            duration_ms = start.elapsed().as_millis() as u64,
            tokens = completion.usage.total(),
            "Judgment returned"
        );

        Ok(verdict)
    }

    /// Field checks, in the order the endpoint reports them.
    fn validate(request: &JudgeRequest) -> Result<(Level, String), JudgeError> {
        if request.level == 0
            || request.user_input.trim().is_empty()
            || request.idea_name.trim().is_empty()
        {
            return Err(JudgeError::missing_fields());
        }

        PersonaRegistry::lookup(request.level)
    }
}
