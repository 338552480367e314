//! Configuration for the gauntlet server
//!
//! CLI arguments and environment variable handling using clap.

use clap::{Parser, ValueEnum};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use gauntlet_judge::backend::{gemini, GeminiBackend, OpenAiBackend};
use gauntlet_judge::{JudgeService, LlmBackend, LlmError, ServiceConfig};

/// Which model API the judge talks to.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    /// Google Gemini `generateContent`
    Gemini,
    /// OpenAI-compatible `chat/completions`
    Openai,
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Provider::Gemini => write!(f, "gemini"),
            Provider::Openai => write!(f, "openai"),
        }
    }
}

/// Idea Gauntlet - five judges, one idea
#[derive(Parser, Debug, Clone)]
#[command(name = "gauntlet-server")]
#[command(about = "Judging endpoint for the idea gauntlet")]
pub struct Args {
    /// Address to listen on
    #[arg(long, env = "LISTEN", default_value = "0.0.0.0:3000")]
    pub listen: SocketAddr,

    /// Model API credential. Without it every judgment fails with a
    /// configuration error, but the server still starts.
    #[arg(long, env = "GOOGLE_AI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Model provider
    #[arg(long, env = "MODEL_PROVIDER", value_enum, default_value_t = Provider::Gemini)]
    pub provider: Provider,

    /// Model name
    #[arg(long, env = "MODEL", default_value = gemini::DEFAULT_MODEL)]
    pub model: String,

    /// Override the provider's API base URL
    #[arg(long, env = "MODEL_BASE_URL")]
    pub model_base_url: Option<String>,

    /// Upper bound on one judge call in milliseconds
    #[arg(long, env = "JUDGE_TIMEOUT_MS", default_value = "20000")]
    pub judge_timeout_ms: u64,

    /// Largest accepted request body
    #[arg(long, env = "MAX_BODY_BYTES", default_value = "65536")]
    pub max_body_bytes: usize,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Args {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.judge_timeout_ms == 0 {
            return Err("JUDGE_TIMEOUT_MS must be greater than zero".to_string());
        }

        if self.max_body_bytes == 0 {
            return Err("MAX_BODY_BYTES must be greater than zero".to_string());
        }

        if self.model.trim().is_empty() {
            return Err("MODEL must not be empty".to_string());
        }

        Ok(())
    }

    pub fn judge_timeout(&self) -> Duration {
        Duration::from_millis(self.judge_timeout_ms)
    }

    /// Credential, ignoring blank values.
    fn credential(&self) -> Option<&str> {
        self.api_key.as_deref().map(str::trim).filter(|k| !k.is_empty())
    }

    /// Build the model backend, `None` when no credential is configured.
    pub fn backend(&self) -> Result<Option<Arc<dyn LlmBackend>>, LlmError> {
        let Some(key) = self.credential() else {
            return Ok(None);
        };

        let backend: Arc<dyn LlmBackend> = match self.provider {
            Provider::Gemini => Arc::new(GeminiBackend::new(
                self.model_base_url.as_deref().unwrap_or(gemini::DEFAULT_BASE_URL),
                &self.model,
                key,
            )?),
            Provider::Openai => Arc::new(OpenAiBackend::new(
                self.model_base_url
                    .as_deref()
                    .unwrap_or("https://api.openai.com/v1"),
                &self.model,
                Some(key.to_string()),
            )?),
        };

        Ok(Some(backend))
    }

    /// Judging service for this configuration.
    pub fn judge_service(&self) -> Result<JudgeService, LlmError> {
        let service = match self.backend()? {
            Some(backend) => JudgeService::new(backend),
            None => JudgeService::unconfigured(),
        };

        Ok(service.with_config(ServiceConfig {
            timeout: self.judge_timeout(),
            ..ServiceConfig::default()
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(extra: &[&str]) -> Args {
        let mut argv = vec!["gauntlet-server"];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_validate_rejects_zero_limits() {
        assert!(parse(&["--judge-timeout-ms", "1500"]).validate().is_ok());
        assert!(parse(&["--judge-timeout-ms", "0"]).validate().is_err());
        assert!(parse(&["--max-body-bytes", "0"]).validate().is_err());
    }

    #[test]
    fn test_blank_credential_means_unconfigured() {
        let args = parse(&["--api-key", "   "]);
        assert!(args.backend().unwrap().is_none());
        assert!(!args.judge_service().unwrap().is_configured());
    }

    #[test]
    fn test_provider_selection() {
        let gemini = parse(&["--api-key", "k", "--model", "gemini-2.0-flash"]);
        let service = gemini.judge_service().unwrap();
        assert_eq!(service.model_id(), Some("gemini-2.0-flash"));

        let openai = parse(&[
            "--api-key",
            "k",
            "--provider",
            "openai",
            "--model",
            "gpt-4o-mini",
            "--model-base-url",
            "http://localhost:11434/v1",
        ]);
        assert_eq!(openai.provider, Provider::Openai);
        assert!(openai.judge_service().unwrap().is_configured());
    }
}
