use shreddit_core::{CoreError, ErrorExt, RedditApiError};
use std::time::Duration;

#[test]
fn test_rate_limited_detection() {
    let with_hint = CoreError::RedditApi(RedditApiError::RateLimited {
        retry_after: Some(30),
    });
    assert!(with_hint.is_rate_limited());
    assert_eq!(with_hint.retry_after(), Some(Duration::from_secs(30)));

    let without_hint = CoreError::RedditApi(RedditApiError::RateLimited { retry_after: None });
    assert!(without_hint.is_rate_limited());
    assert_eq!(without_hint.retry_after(), None);

    let other = CoreError::RedditApi(RedditApiError::ServerError { status_code: 503 });
    assert!(!other.is_rate_limited());
    assert_eq!(other.retry_after(), None);
}

#[test]
fn test_permanent_auth_failures() {
    let bad_credentials = CoreError::RedditApi(RedditApiError::AuthenticationFailed {
        reason: "invalid_grant".to_string(),
    });
    assert!(bad_credentials.is_permanent_auth_failure());

    let stale_token = CoreError::RedditApi(RedditApiError::InvalidToken);
    assert!(stale_token.is_permanent_auth_failure());

    let rate_limited = CoreError::RedditApi(RedditApiError::RateLimited { retry_after: None });
    assert!(!rate_limited.is_permanent_auth_failure());
}

#[test]
fn test_error_display() {
    let err = CoreError::RedditApi(RedditApiError::TokenRetriesExhausted { attempts: 5 });
    assert_eq!(
        err.to_string(),
        "Reddit API error: Token acquisition failed after 5 attempts"
    );

    let err = CoreError::RedditApi(RedditApiError::ApiFailure {
        operation: "edit",
        fullname: "t1_abc".to_string(),
    });
    assert_eq!(err.to_string(), "Reddit API error: API failure during edit of t1_abc");
}

#[test]
fn test_api_error_conversion() {
    fn returns_core() -> Result<(), CoreError> {
        Err::<(), RedditApiError>(RedditApiError::InvalidToken)?;
        Ok(())
    }
    assert!(matches!(
        returns_core(),
        Err(CoreError::RedditApi(RedditApiError::InvalidToken))
    ));
}
