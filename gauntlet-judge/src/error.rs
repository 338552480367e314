//! Judging failure taxonomy.

use crate::backend::traits::LlmError;

/// Message returned to clients for any upstream or parse failure.
pub const JUDGMENT_FAILED: &str = "Failed to get judgment. Please try again.";

/// Message returned when a required request field is absent.
pub const MISSING_FIELDS: &str = "Missing required fields: level, userInput, ideaName";

/// Message returned when the model credential is absent.
pub const API_KEY_MISSING: &str = "API key not configured";

/// Why a submission was not judged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum JudgeError {
    /// Malformed or missing client fields
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Deployment is missing something (e.g. the model credential)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Model unreachable, rejected the call, or timed out
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// Model replied with something that is not a verdict
    #[error("Judgment parse error: {0}")]
    Parse(String),
}

impl JudgeError {
    /// Missing-fields variant with the client-facing message.
    pub fn missing_fields() -> Self {
        Self::InvalidRequest(MISSING_FIELDS.to_string())
    }

    /// Whether the client can fix this by changing the request.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidRequest(_))
    }

    /// Message safe to expose over the wire.
    pub fn public_message(&self) -> &str {
        match self {
            Self::InvalidRequest(message) => message,
            Self::Configuration(_) => API_KEY_MISSING,
            Self::Upstream(_) | Self::Parse(_) => JUDGMENT_FAILED,
        }
    }
}

impl From<LlmError> for JudgeError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::ParseError(message) => Self::Upstream(format!("undecodable reply: {}", message)),
            other => Self::Upstream(other.to_string()),
        }
    }
}
