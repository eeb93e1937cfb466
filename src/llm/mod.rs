//! LLM invocation interface.
//!
//! The orchestration core talks to language models only through the
//! [`LlmClient`] trait. [`openai::OpenAiLlm`] backs it with any
//! OpenAI-compatible endpoint; [`offline::OfflineLlm`] is a
//! deterministic, network-free client for offline runs and tests.

pub mod offline;
pub mod openai;
pub mod retry;

pub use offline::OfflineLlm;
pub use openai::{OpenAiConfig, OpenAiLlm};
pub use retry::{RetryPolicy, complete_with_retry};

use crate::error::{Error, LlmError, Result};
use async_trait::async_trait;
use std::sync::Arc;

/// Default per-completion timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 60_000;

/// Per-call completion parameters.
#[derive(Debug, Clone, Copy)]
pub struct CompletionOptions {
    /// Sampling temperature.
    pub temperature: f32,

    /// Maximum completion tokens.
    pub max_tokens: u32,

    /// Hard timeout for the call in milliseconds.
    pub timeout_ms: u64,
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            temperature: 0.3,
            max_tokens: 1024,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

/// A language-model completion backend.
#[async_trait]
pub trait LlmClient: std::fmt::Debug + Send + Sync {
    /// Backend name for logs and factories.
    fn name(&self) -> &str;

    /// Produces a completion for the given system prompt, user prompt,
    /// and rendered conversation context.
    async fn complete(
        &self,
        system: &str,
        prompt: &str,
        context: &str,
        options: &CompletionOptions,
    ) -> std::result::Result<String, LlmError>;
}

/// Creates an LLM client by backend name.
///
/// # Errors
///
/// Returns a configuration error for an unknown backend name.
pub fn create_llm(name: &str, config: OpenAiConfig) -> Result<Arc<dyn LlmClient>> {
    match name {
        "openai" => Ok(Arc::new(OpenAiLlm::new(config))),
        "offline" => Ok(Arc::new(OfflineLlm::new())),
        other => Err(Error::Config {
            message: format!(
                "unknown llm backend: {other} (available: {})",
                available_llms().join(", ")
            ),
        }),
    }
}

/// Names of the available LLM backends.
#[must_use]
pub fn available_llms() -> Vec<&'static str> {
    vec!["openai", "offline"]
}
