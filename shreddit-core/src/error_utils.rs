use crate::error::{CoreError, RedditApiError};
use std::time::Duration;

/// Inspection helpers layered over the error taxonomy.
pub trait ErrorExt {
    /// True when the failure is a rate-limit signal, whether it arrived as an
    /// HTTP 429 or inside a nominally successful response body.
    fn is_rate_limited(&self) -> bool;

    /// Server-instructed wait, when one was provided.
    fn retry_after(&self) -> Option<Duration>;

    /// True for failures that retrying with the same credentials cannot cure.
    fn is_permanent_auth_failure(&self) -> bool;
}

impl ErrorExt for CoreError {
    fn is_rate_limited(&self) -> bool {
        matches!(
            self,
            CoreError::RedditApi(RedditApiError::RateLimited { .. })
        )
    }

    fn retry_after(&self) -> Option<Duration> {
        match self {
            CoreError::RedditApi(RedditApiError::RateLimited {
                retry_after: Some(seconds),
            }) => Some(Duration::from_secs(*seconds)),
            _ => None,
        }
    }

    fn is_permanent_auth_failure(&self) -> bool {
        matches!(
            self,
            CoreError::RedditApi(
                RedditApiError::AuthenticationFailed { .. } | RedditApiError::InvalidToken
            )
        )
    }
}
