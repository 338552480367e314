//! LLM Backend abstraction layer.
//!
//! Provides a trait-based interface over the external judge model:
//! - Gemini `generateContent` (default provider)
//! - OpenAI-compatible chat completions
//! - Mock backend for testing

pub mod gemini;
pub mod mock;
pub mod openai;
pub mod traits;

pub use gemini::GeminiBackend;
pub use mock::MockBackend;
pub use openai::OpenAiBackend;
pub use traits::{CompletionRequest, CompletionResponse, LlmBackend, LlmError};
