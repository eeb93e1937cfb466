//! OpenAI-compatible LLM backend.

use crate::error::LlmError;
use crate::llm::{CompletionOptions, LlmClient};
use async_openai::{
    Client,
    config::OpenAIConfig as AsyncOpenAIConfig,
    types::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// Configuration for the OpenAI-compatible backend.
///
/// Works against api.openai.com and any OpenAI-compatible local
/// endpoint (Ollama, vLLM) via `base_url`.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// API key.
    pub api_key: String,

    /// Override for the API base URL.
    pub base_url: Option<String>,

    /// Model identifier.
    pub model: String,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: None,
            model: "gpt-4o-mini".to_string(),
        }
    }
}

impl OpenAiConfig {
    /// Reads configuration from `OPENAI_API_KEY`, `OPENAI_BASE_URL`,
    /// and `OPENAI_MODEL`.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_key: std::env::var("OPENAI_API_KEY").unwrap_or_default(),
            base_url: std::env::var("OPENAI_BASE_URL").ok(),
            model: std::env::var("OPENAI_MODEL").unwrap_or(defaults.model),
        }
    }

    /// Sets the API key.
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = key.into();
        self
    }

    /// Sets the base URL.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the model.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

/// async-openai backed client.
#[derive(Debug)]
pub struct OpenAiLlm {
    client: Client<AsyncOpenAIConfig>,
    config: OpenAiConfig,
}

impl OpenAiLlm {
    /// Creates a client from the given configuration.
    #[must_use]
    pub fn new(config: OpenAiConfig) -> Self {
        let mut openai_config = AsyncOpenAIConfig::new().with_api_key(&config.api_key);
        if let Some(ref base_url) = config.base_url {
            openai_config = openai_config.with_api_base(base_url);
        }
        Self {
            client: Client::with_config(openai_config),
            config,
        }
    }

    fn convert_error(err: &async_openai::error::OpenAIError) -> LlmError {
        match err {
            async_openai::error::OpenAIError::ApiError(api_err) => {
                let message = api_err.message.clone();
                if message.contains("rate limit") || api_err.code.as_deref() == Some("429") {
                    LlmError::RateLimited { detail: message }
                } else {
                    LlmError::InvalidResponse(message)
                }
            }
            async_openai::error::OpenAIError::Reqwest(e) if e.is_timeout() => LlmError::Timeout {
                timeout_ms: 0,
            },
            other => LlmError::InvalidResponse(other.to_string()),
        }
    }
}

#[async_trait]
impl LlmClient for OpenAiLlm {
    fn name(&self) -> &str {
        "openai"
    }

    async fn complete(
        &self,
        system: &str,
        prompt: &str,
        context: &str,
        options: &CompletionOptions,
    ) -> Result<String, LlmError> {
        let user_content = if context.is_empty() {
            prompt.to_string()
        } else {
            format!("Conversation so far:\n{context}\n\n{prompt}")
        };

        let messages = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(system)
                .build()
                .map_err(|e| LlmError::InvalidResponse(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(user_content)
                .build()
                .map_err(|e| LlmError::InvalidResponse(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.config.model)
            .messages(messages)
            .temperature(options.temperature)
            .max_tokens(options.max_tokens)
            .build()
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        debug!(model = %self.config.model, timeout_ms = options.timeout_ms, "llm completion");

        let response = tokio::time::timeout(
            Duration::from_millis(options.timeout_ms),
            self.client.chat().create(request),
        )
        .await
        .map_err(|_| LlmError::Timeout {
            timeout_ms: options.timeout_ms,
        })?
        .map_err(|e| Self::convert_error(&e))?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();

        if content.trim().is_empty() {
            return Err(LlmError::InvalidResponse(
                "empty completion content".to_string(),
            ));
        }
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builders() {
        let config = OpenAiConfig::default()
            .with_api_key("sk-test")
            .with_base_url("http://localhost:11434/v1")
            .with_model("llama3");

        assert_eq!(config.api_key, "sk-test");
        assert_eq!(config.base_url.as_deref(), Some("http://localhost:11434/v1"));
        assert_eq!(config.model, "llama3");
    }

    #[test]
    fn test_default_model() {
        assert_eq!(OpenAiConfig::default().model, "gpt-4o-mini");
    }
}
