//! Bounded retry for transient LLM failures.

use crate::error::LlmError;
use crate::llm::{CompletionOptions, LlmClient};
use std::time::Duration;
use tracing::warn;

/// Retry parameters with exponential backoff.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Maximum number of retries after the initial attempt.
    pub max_retries: u32,

    /// Delay before the first retry; doubles each attempt.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay * 2_u32.saturating_pow(attempt)
    }
}

/// Runs a completion, retrying only transient errors
/// (timeouts and rate limiting) up to the policy's bound.
///
/// # Errors
///
/// Returns the last error once retries are exhausted, or the first
/// non-transient error immediately.
pub async fn complete_with_retry(
    client: &dyn LlmClient,
    system: &str,
    prompt: &str,
    context: &str,
    options: &CompletionOptions,
    policy: RetryPolicy,
) -> Result<String, LlmError> {
    let mut attempt = 0;
    loop {
        match client.complete(system, prompt, context, options).await {
            Ok(text) => return Ok(text),
            Err(err) if err.is_transient() && attempt < policy.max_retries => {
                let delay = policy.delay_for(attempt);
                warn!(
                    backend = client.name(),
                    attempt,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    error = %err,
                    "transient llm error, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[derive(Debug)]
    struct FlakyLlm {
        failures: u32,
        error: fn() -> LlmError,
        calls: AtomicU32,
    }

    #[async_trait]
    impl LlmClient for FlakyLlm {
        fn name(&self) -> &str {
            "flaky"
        }

        async fn complete(
            &self,
            _system: &str,
            _prompt: &str,
            _context: &str,
            _options: &CompletionOptions,
        ) -> Result<String, LlmError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                Err((self.error)())
            } else {
                Ok("recovered".to_string())
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_transient_errors() {
        let client = FlakyLlm {
            failures: 2,
            error: || LlmError::Timeout { timeout_ms: 10 },
            calls: AtomicU32::new(0),
        };
        let out = complete_with_retry(
            &client,
            "s",
            "p",
            "",
            &CompletionOptions::default(),
            RetryPolicy::default(),
        )
        .await
        .unwrap();
        assert_eq!(out, "recovered");
        assert_eq!(client.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_retries_return_last_error() {
        let client = FlakyLlm {
            failures: 10,
            error: || LlmError::RateLimited {
                detail: "slow down".to_string(),
            },
            calls: AtomicU32::new(0),
        };
        let err = complete_with_retry(
            &client,
            "s",
            "p",
            "",
            &CompletionOptions::default(),
            RetryPolicy::default(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, LlmError::RateLimited { .. }));
        assert_eq!(client.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_non_transient_error_fails_fast() {
        let client = FlakyLlm {
            failures: 10,
            error: || LlmError::InvalidResponse("garbage".to_string()),
            calls: AtomicU32::new(0),
        };
        let err = complete_with_retry(
            &client,
            "s",
            "p",
            "",
            &CompletionOptions::default(),
            RetryPolicy::default(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, LlmError::InvalidResponse(_)));
        assert_eq!(client.calls.load(Ordering::SeqCst), 1);
    }
}
