//! Retry utilities with exponential backoff for resilient provider calls.

use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

use crate::utils::http::HttpError;

/// Configuration for retry behavior
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first one
    pub max_attempts: u32,
    /// Delay before the first retry
    pub initial_delay: Duration,
    /// Upper bound on any single delay
    pub max_delay: Duration,
    /// Multiplier for exponential backoff
    pub backoff_multiplier: f64,
    /// Response statuses that are worth another attempt
    pub retry_on_status: Vec<u16>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(10),
            backoff_multiplier: 2.0,
            retry_on_status: vec![429, 500, 502, 503, 504],
        }
    }
}

impl RetryConfig {
    /// Set the maximum number of attempts
    pub fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Set the initial backoff delay
    pub fn initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Replace the set of retryable statuses
    pub fn retry_on_status(mut self, statuses: impl Into<Vec<u16>>) -> Self {
        self.retry_on_status = statuses.into();
        self
    }

    /// Delay to wait after the given (1-based) failed attempt
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1) as f64;
        let delay_secs = self.initial_delay.as_secs_f64() * self.backoff_multiplier.powf(exponent);
        Duration::from_secs_f64(delay_secs.min(self.max_delay.as_secs_f64()))
    }

    /// Whether this error warrants another attempt
    pub fn is_retryable(&self, error: &HttpError) -> bool {
        TransientError::classify(error, self).is_some()
    }
}

/// Transient errors that should trigger a retry
#[derive(Debug, Clone, PartialEq)]
pub enum TransientError {
    /// Connection-level failure
    Network,
    /// Too many requests (429)
    TooManyRequests,
    /// Any other status the policy accepts
    Status(u16),
}

impl TransientError {
    /// Classify an error under the given policy, `None` means terminal
    pub fn classify(error: &HttpError, config: &RetryConfig) -> Option<Self> {
        match error {
            HttpError::Transport(_) => Some(TransientError::Network),
            HttpError::RequestFailed { status, .. } if config.retry_on_status.contains(status) => {
                if *status == 429 {
                    Some(TransientError::TooManyRequests)
                } else {
                    Some(TransientError::Status(*status))
                }
            }
            _ => None,
        }
    }
}

/// Execute an async operation with retry logic
///
/// The operation receives the 1-based attempt number. Terminal errors are
/// returned immediately; transient ones are retried until `max_attempts` is
/// reached, after which the last error is returned unchanged.
pub async fn with_retry<T, F, Fut>(config: &RetryConfig, mut operation: F) -> Result<T, HttpError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, HttpError>>,
{
    let max_attempts = config.max_attempts.max(1);
    let mut attempts = 0;

    loop {
        attempts += 1;

        match operation(attempts).await {
            Ok(result) => {
                if attempts > 1 {
                    tracing::info!(
                        "Operation succeeded on attempt {} after {} transient failures",
                        attempts,
                        attempts - 1
                    );
                }
                return Ok(result);
            }
            Err(error) => {
                let Some(transient) = TransientError::classify(&error, config) else {
                    return Err(error);
                };

                if attempts >= max_attempts {
                    tracing::warn!("Operation failed after {} attempts: {}", attempts, error);
                    return Err(error);
                }

                let delay = config.delay_for_attempt(attempts);
                tracing::debug!(
                    "Transient error on attempt {}: {:?}, retrying in {:?}",
                    attempts,
                    transient,
                    delay
                );

                sleep(delay).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast_config() -> RetryConfig {
        RetryConfig {
            max_attempts: 4,
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(5),
            backoff_multiplier: 2.0,
            retry_on_status: vec![503],
        }
    }

    #[tokio::test]
    async fn test_retry_success_first_try() {
        let calls = AtomicU32::new(0);
        let counter = &calls;

        let result = with_retry(&RetryConfig::default(), move |_| async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok("success")
        })
        .await;

        assert_eq!(result.unwrap(), "success");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retry_success_after_failures() {
        let calls = AtomicU32::new(0);

        let result = with_retry(&fast_config(), |attempt| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if attempt < 3 {
                    Err(HttpError::Transport("connection reset".to_string()))
                } else {
                    Ok(attempt)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retry_returns_terminal_error_immediately() {
        let calls = AtomicU32::new(0);

        let result: Result<(), HttpError> = with_retry(&fast_config(), |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async {
                Err(HttpError::NotFound {
                    url: "https://example.com/series/1".to_string(),
                })
            }
        })
        .await;

        assert!(matches!(result, Err(HttpError::NotFound { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retry_exhaustion_returns_last_error() {
        let calls = AtomicU32::new(0);

        let result: Result<(), HttpError> = with_retry(&fast_config(), |attempt| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move {
                Err(HttpError::RequestFailed {
                    status: 503,
                    body: format!("attempt {}", attempt),
                })
            }
        })
        .await;

        match result {
            Err(HttpError::RequestFailed { status, body }) => {
                assert_eq!(status, 503);
                assert_eq!(body, "attempt 4");
            }
            other => panic!("Expected RequestFailed, got {:?}", other),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn test_transient_error_detection() {
        let config = fast_config();

        let network = HttpError::Transport("connection refused".to_string());
        assert_eq!(
            TransientError::classify(&network, &config),
            Some(TransientError::Network)
        );

        let unavailable = HttpError::RequestFailed {
            status: 503,
            body: String::new(),
        };
        assert!(config.is_retryable(&unavailable));

        let bad_request = HttpError::RequestFailed {
            status: 400,
            body: String::new(),
        };
        assert!(!config.is_retryable(&bad_request));

        let timeout = HttpError::RateLimitTimeout {
            provider: crate::models::Provider::Kodansha,
            waited: Duration::from_secs(1),
        };
        assert!(!config.is_retryable(&timeout));
    }

    #[test]
    fn test_backoff_schedule() {
        let config = RetryConfig {
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(350),
            ..RetryConfig::default()
        };

        assert_eq!(config.delay_for_attempt(1), Duration::from_millis(100));
        assert_eq!(config.delay_for_attempt(2), Duration::from_millis(200));
        assert_eq!(config.delay_for_attempt(3), Duration::from_millis(350));
    }
}
