use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Configuration for retry behavior
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first
    pub max_attempts: u32,
    /// Base delay for exponential backoff (in milliseconds)
    pub base_delay_ms: u64,
    /// Maximum delay between retries (in milliseconds)
    pub max_delay_ms: u64,
    /// Multiplier for exponential backoff
    pub backoff_multiplier: f64,
    /// Maximum jitter factor (0.0 to 1.0)
    pub jitter_factor: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 1000, // 1 second
            max_delay_ms: 30000, // 30 seconds
            backoff_multiplier: 2.0,
            jitter_factor: 0.1, // 10% jitter
        }
    }
}

impl RetryConfig {
    /// Policy for the Reddit token endpoint: up to five attempts total.
    pub fn token_endpoint() -> Self {
        Self {
            max_attempts: 5,
            base_delay_ms: 2000, // Start with 2 seconds for Reddit
            max_delay_ms: 60000, // Max 1 minute delay
            backoff_multiplier: 2.0,
            jitter_factor: 0.2, // 20% jitter to prevent thundering herd
        }
    }
}

/// What to do with a failed attempt, as decided by the caller's classifier.
#[derive(Debug, Clone, PartialEq)]
pub enum RetryStrategy {
    /// Stop immediately; retrying cannot cure this failure.
    Permanent,
    /// Retry after the server-instructed delay. Takes precedence over any
    /// computed backoff.
    RetryAfter(Duration),
    /// Retry with exponential backoff.
    Backoff,
}

/// Terminal outcome of a retried operation, preserving why it stopped.
#[derive(Debug, thiserror::Error)]
pub enum RetryError<E> {
    #[error("permanent failure: {0}")]
    Permanent(E),

    #[error("failed after {attempts} attempts: {source}")]
    Exhausted { attempts: u32, source: E },
}

/// Calculate delay with exponential backoff and jitter. `attempt` is
/// zero-based: the delay before the first retry uses `attempt == 0`.
pub fn calculate_delay(attempt: u32, config: &RetryConfig) -> Duration {
    let exponential_ms = if attempt == 0 {
        config.base_delay_ms
    } else {
        let multiplier = config.backoff_multiplier.powi(attempt as i32);
        ((config.base_delay_ms as f64 * multiplier) as u64).min(config.max_delay_ms)
    };

    // Add jitter to prevent thundering herd
    let jitter_range = (exponential_ms as f64 * config.jitter_factor) as u64;
    let jitter = fastrand::u64(0..=jitter_range);

    Duration::from_millis((exponential_ms + jitter).min(config.max_delay_ms))
}

/// Runs `operation` until it succeeds, the classifier declares the error
/// permanent, or `config.max_attempts` is reached. The classifier maps each
/// failure to a [`RetryStrategy`]; a server-provided hint always wins over
/// computed backoff.
pub async fn retry<T, E, F, Fut, C>(
    config: &RetryConfig,
    operation_name: &str,
    mut operation: F,
    classify: C,
) -> Result<T, RetryError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    C: Fn(&E) -> RetryStrategy,
    E: Display,
{
    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 0;
    loop {
        match operation().await {
            Ok(value) => {
                if attempt > 0 {
                    debug!("{} succeeded after {} retries", operation_name, attempt);
                }
                return Ok(value);
            }
            Err(error) => {
                attempt += 1;
                match classify(&error) {
                    RetryStrategy::Permanent => {
                        debug!(
                            "not retrying {} due to error type: {}",
                            operation_name, error
                        );
                        return Err(RetryError::Permanent(error));
                    }
                    _ if attempt >= max_attempts => {
                        return Err(RetryError::Exhausted {
                            attempts: attempt,
                            source: error,
                        });
                    }
                    RetryStrategy::RetryAfter(delay) => {
                        warn!(
                            "retrying {} after server-instructed delay of {:?}: {}",
                            operation_name, delay, error
                        );
                        sleep(delay).await;
                    }
                    RetryStrategy::Backoff => {
                        let delay = calculate_delay(attempt - 1, config);
                        warn!("retrying {} in {:?}: {}", operation_name, delay, error);
                        sleep(delay).await;
                    }
                }
            }
        }
    }
}
