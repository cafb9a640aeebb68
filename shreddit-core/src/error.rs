use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Reddit API error: {0}")]
    RedditApi(#[from] RedditApiError),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

#[derive(Error, Debug, Clone)]
pub enum RedditApiError {
    #[error("Authentication failed: {reason}")]
    AuthenticationFailed { reason: String },

    #[error("Token acquisition failed after {attempts} attempts")]
    TokenRetriesExhausted { attempts: u32 },

    // The token endpoint advertises a wait via Retry-After; the edit
    // endpoint signals the same condition in-body with no hint.
    #[error("Rate limit exceeded")]
    RateLimited { retry_after: Option<u64> },

    #[error("Invalid OAuth token")]
    InvalidToken,

    #[error("Forbidden access to resource: {resource}")]
    Forbidden { resource: String },

    #[error("Server error: {status_code}")]
    ServerError { status_code: u16 },

    #[error("Invalid API response: {details}")]
    InvalidResponse { details: String },

    #[error("API failure during {operation} of {fullname}")]
    ApiFailure {
        operation: &'static str,
        fullname: String,
    },
}
