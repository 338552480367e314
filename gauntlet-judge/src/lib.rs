//! Gauntlet Judge - persona-driven PASS/FAIL judging
//!
//! Provides the judging half of the idea gauntlet:
//! - A static registry of five judge personas, one per level
//! - Trait-based model backends (Gemini, OpenAI-compatible, mock)
//! - Strict extraction of a verdict from free-form model text
//! - `JudgeService`, the request/response boundary used by the HTTP endpoint
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │             JudgeService                │
//! │  (validate → prompt → call → parse)     │
//! └────────────────┬────────────────────────┘
//!                  │
//!      ┌───────────┴───────────┐
//!      ▼                       ▼
//! ┌─────────────┐       ┌─────────────┐
//! │ LlmBackend  │       │ Persona     │
//! │ (Gemini/    │       │ Registry    │
//! │  OpenAI)    │       │             │
//! └─────────────┘       └─────────────┘
//! ```

pub mod backend;
pub mod error;
pub mod level;
pub mod persona;
pub mod service;
pub mod verdict;

// Re-export main types for convenience
pub use backend::traits::{CompletionRequest, CompletionResponse, LlmBackend, LlmError};
pub use error::JudgeError;
pub use level::Level;
pub use persona::PersonaRegistry;
pub use service::{JudgeRequest, JudgeService, ServiceConfig};
pub use verdict::{extract_payload, parse_verdict, Verdict, VerdictKind};
