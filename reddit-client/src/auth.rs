use crate::retry::{retry, RetryConfig, RetryError, RetryStrategy};
use oauth2::basic::{BasicClient, BasicErrorResponseType, BasicTokenResponse};
use oauth2::{
    AuthUrl, ClientId, ClientSecret, HttpRequest, HttpResponse, RequestTokenError,
    ResourceOwnerPassword, ResourceOwnerUsername, StandardErrorResponse, TokenResponse, TokenUrl,
};
use shreddit_core::{CoreError, RedditApiError};
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

// Tokens are refreshed slightly before their advertised expiry so an
// in-flight request never races the deadline.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

type TokenEndpointError =
    RequestTokenError<TokenTransportError, StandardErrorResponse<BasicErrorResponseType>>;

/// Transport-level failure from the token endpoint. Reported separately from
/// oauth2's parsed server errors because the `Retry-After` header is gone by
/// the time the oauth2 crate has interpreted the response.
#[derive(Debug, Error)]
pub enum TokenTransportError {
    #[error("rate limited by token endpoint")]
    RateLimited { retry_after: Option<u64> },

    #[error(transparent)]
    Network(#[from] reqwest::Error),
}

#[derive(Clone)]
struct CachedToken {
    access_token: String,
    expires_at: Option<Instant>,
}

impl CachedToken {
    fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(at) => Instant::now() + EXPIRY_MARGIN >= at,
            None => false,
        }
    }
}

/// Exchanges resource-owner credentials for bearer tokens at
/// `{base}/api/v1/access_token` and caches the result until expiry. The
/// token itself never leaves this module except as the string handed to
/// `bearer_auth`.
pub(crate) struct TokenBroker {
    oauth: BasicClient,
    http: reqwest::Client,
    username: ResourceOwnerUsername,
    password: ResourceOwnerPassword,
    retry_config: RetryConfig,
    cached: Mutex<Option<CachedToken>>,
}

impl TokenBroker {
    pub(crate) fn new(
        http: reqwest::Client,
        base_url: &str,
        client_id: String,
        client_secret: String,
        username: String,
        password: String,
    ) -> Result<Self, CoreError> {
        // The authorization URL is unused by the password grant but the
        // oauth2 client requires one.
        let auth_url = AuthUrl::new(format!("{base_url}/api/v1/authorize")).map_err(|e| {
            CoreError::Config {
                message: format!("invalid base URL: {e}"),
            }
        })?;
        let token_url =
            TokenUrl::new(format!("{base_url}/api/v1/access_token")).map_err(|e| {
                CoreError::Config {
                    message: format!("invalid base URL: {e}"),
                }
            })?;
        let oauth = BasicClient::new(
            ClientId::new(client_id),
            Some(ClientSecret::new(client_secret)),
            auth_url,
            Some(token_url),
        );
        Ok(Self {
            oauth,
            http,
            username: ResourceOwnerUsername::new(username),
            password: ResourceOwnerPassword::new(password),
            retry_config: RetryConfig::token_endpoint(),
            cached: Mutex::new(None),
        })
    }

    /// Returns a currently valid bearer token, acquiring or re-acquiring one
    /// as needed. The cache lock is held across a refresh, so concurrent
    /// callers can never duplicate an in-flight acquisition.
    pub(crate) async fn bearer_token(&self) -> Result<String, CoreError> {
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref() {
            if !token.is_expired() {
                return Ok(token.access_token.clone());
            }
            debug!("access token expired, re-acquiring");
        }
        let token = self.acquire().await?;
        let access_token = token.access_token.clone();
        *cached = Some(token);
        Ok(access_token)
    }

    async fn acquire(&self) -> Result<CachedToken, CoreError> {
        let result: Result<BasicTokenResponse, RetryError<TokenEndpointError>> = retry(
            &self.retry_config,
            "token acquisition",
            || async {
                self.oauth
                    .exchange_password(&self.username, &self.password)
                    .request_async(|request| token_http(&self.http, request))
                    .await
            },
            classify_token_error,
        )
        .await;

        match result {
            Ok(response) => {
                info!("acquired Reddit access token");
                Ok(CachedToken {
                    access_token: response.access_token().secret().clone(),
                    expires_at: response.expires_in().map(|ttl| Instant::now() + ttl),
                })
            }
            Err(RetryError::Permanent(source)) => {
                error!("token acquisition failed permanently: {}", source);
                Err(RedditApiError::AuthenticationFailed {
                    reason: source.to_string(),
                }
                .into())
            }
            Err(RetryError::Exhausted { attempts, source }) => {
                error!(
                    "token acquisition failed after {} attempts: {}",
                    attempts, source
                );
                Err(RedditApiError::TokenRetriesExhausted { attempts }.into())
            }
        }
    }
}

/// A 429 with a parseable Retry-After hint retries after exactly that wait; a
/// 429 without one falls back to exponential backoff. Everything else (bad
/// credentials included) is permanent.
fn classify_token_error(error: &TokenEndpointError) -> RetryStrategy {
    match error {
        RequestTokenError::Request(TokenTransportError::RateLimited { retry_after }) => {
            match retry_after {
                Some(seconds) => RetryStrategy::RetryAfter(Duration::from_secs(*seconds)),
                None => RetryStrategy::Backoff,
            }
        }
        _ => RetryStrategy::Permanent,
    }
}

/// Performs one token-endpoint request through the shared HTTP client, so
/// the configured User-Agent rides along exactly as it does on API calls.
async fn token_http(
    http: &reqwest::Client,
    request: HttpRequest,
) -> Result<HttpResponse, TokenTransportError> {
    let mut builder = http.request(request.method, request.url.as_str());
    for (name, value) in &request.headers {
        builder = builder.header(name.as_str(), value.as_bytes());
    }
    let response = builder.body(request.body).send().await?;

    let status_code = response.status();
    if status_code == reqwest::StatusCode::TOO_MANY_REQUESTS {
        let retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse::<u64>().ok());
        warn!(
            "token endpoint rate limited (Retry-After: {:?})",
            retry_after
        );
        return Err(TokenTransportError::RateLimited { retry_after });
    }

    let headers = response.headers().clone();
    let body = response.bytes().await?.to_vec();
    Ok(HttpResponse {
        status_code,
        headers,
        body,
    })
}
