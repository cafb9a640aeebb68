use crate::auth::TokenBroker;
use crate::fullname::{comment_fullname, post_fullname};
use crate::types::{Comment, EditResponse, Listing, Post};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use shreddit_core::{CoreError, RedditApiError};
use std::time::Duration;
use tracing::{debug, error, warn};

pub const DEFAULT_BASE_URL: &str = "https://oauth.reddit.com";
pub const DEFAULT_USER_AGENT: &str = "shreddit";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub client_id: String,
    pub client_secret: String,
    pub username: String,
    pub password: String,
    pub user_agent: String,
}

impl ClientConfig {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            username: username.into(),
            password: password.into(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Typed operations against Reddit's REST surface. One shared HTTP client
/// carries the configured User-Agent on every request, token-endpoint calls
/// included; the bearer token is injected per request by the broker.
pub struct Client {
    http: reqwest::Client,
    auth: TokenBroker,
    base_url: String,
}

impl Client {
    /// Builds the transport and eagerly acquires the first access token, so
    /// bad credentials fail the run before any shredding starts.
    pub async fn new(config: ClientConfig) -> Result<Self, CoreError> {
        let http = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| CoreError::Config {
                message: format!("failed to build HTTP client: {e}"),
            })?;
        let base_url = config.base_url.trim_end_matches('/').to_string();
        let auth = TokenBroker::new(
            http.clone(),
            &base_url,
            config.client_id,
            config.client_secret,
            config.username,
            config.password,
        )?;
        auth.bearer_token().await?;
        Ok(Self {
            http,
            auth,
            base_url,
        })
    }

    pub async fn get_comments(
        &self,
        username: &str,
        after: &str,
    ) -> Result<Listing<Comment>, CoreError> {
        self.get_listing(
            &format!("/user/{username}/comments.json"),
            &[],
            after,
            "comment listing",
        )
        .await
    }

    pub async fn get_posts(&self, username: &str, after: &str) -> Result<Listing<Post>, CoreError> {
        self.get_listing(
            &format!("/user/{username}/submitted.json"),
            &[],
            after,
            "post listing",
        )
        .await
    }

    // "Saved" is a single endpoint multiplexing both kinds; the `type`
    // parameter filters server-side.
    pub async fn get_saved_comments(
        &self,
        username: &str,
        after: &str,
    ) -> Result<Listing<Comment>, CoreError> {
        self.get_listing(
            &format!("/user/{username}/saved.json"),
            &[("type", "comments")],
            after,
            "saved comment listing",
        )
        .await
    }

    pub async fn get_saved_posts(
        &self,
        username: &str,
        after: &str,
    ) -> Result<Listing<Post>, CoreError> {
        self.get_listing(
            &format!("/user/{username}/saved.json"),
            &[("type", "links")],
            after,
            "saved post listing",
        )
        .await
    }

    /// Replaces a comment's body. Reddit reports edit failures inside an
    /// HTTP 200 body, so the envelope is inspected: a recognized rate-limit
    /// signal surfaces as [`RedditApiError::RateLimited`] (the caller owns
    /// any backoff), anything else as an API failure naming the fullname.
    pub async fn edit_comment(&self, id: &str, body: &str) -> Result<(), CoreError> {
        let fullname = comment_fullname(id);
        let request = self
            .request(Method::POST, "/api/editusertext")
            .await?
            .query(&[("raw_json", "1")])
            .form(&[("thing_id", fullname.as_str()), ("text", body)]);
        let response = self.send(request, "/api/editusertext").await?;
        let edit: EditResponse = response.json().await.map_err(|e| {
            error!("failed to decode edit response for {}: {}", fullname, e);
            CoreError::from(RedditApiError::InvalidResponse {
                details: format!("error decoding edit response for {fullname}: {e}"),
            })
        })?;
        if !edit.success {
            if edit.is_rate_limited() {
                warn!("rate limited while editing {}", fullname);
                return Err(RedditApiError::RateLimited { retry_after: None }.into());
            }
            return Err(RedditApiError::ApiFailure {
                operation: "edit",
                fullname,
            }
            .into());
        }
        debug!("edited {}", fullname);
        Ok(())
    }

    pub async fn delete_comment(&self, id: &str) -> Result<(), CoreError> {
        self.delete_thing(&comment_fullname(id)).await
    }

    pub async fn delete_post(&self, id: &str) -> Result<(), CoreError> {
        self.delete_thing(&post_fullname(id)).await
    }

    pub async fn unsave_comment(&self, id: &str) -> Result<(), CoreError> {
        self.unsave_thing(&comment_fullname(id)).await
    }

    pub async fn unsave_post(&self, id: &str) -> Result<(), CoreError> {
        self.unsave_thing(&post_fullname(id)).await
    }

    async fn get_listing<T: DeserializeOwned>(
        &self,
        path: &str,
        extra: &[(&str, &str)],
        after: &str,
        what: &'static str,
    ) -> Result<Listing<T>, CoreError> {
        let mut query: Vec<(&str, &str)> = extra.to_vec();
        if !after.is_empty() {
            query.push(("after", after));
        }
        let request = self.request(Method::GET, path).await?.query(&query);
        let response = self.send(request, path).await?;
        let listing: Listing<T> = response.json().await.map_err(|e| {
            error!("failed to decode {}: {}", what, e);
            CoreError::from(RedditApiError::InvalidResponse {
                details: format!("error decoding {what}: {e}"),
            })
        })?;
        debug!(
            "fetched {} items from {}",
            listing.data.children.len(),
            path
        );
        Ok(listing)
    }

    /// Deletes any thing by fullname via `/api/del`.
    async fn delete_thing(&self, fullname: &str) -> Result<(), CoreError> {
        let request = self
            .request(Method::POST, "/api/del")
            .await?
            .form(&[("id", fullname)]);
        self.send(request, "/api/del").await?;
        debug!("deleted {}", fullname);
        Ok(())
    }

    /// Removes any thing from the saved list by fullname via `/api/unsave`.
    async fn unsave_thing(&self, fullname: &str) -> Result<(), CoreError> {
        let request = self
            .request(Method::POST, "/api/unsave")
            .await?
            .form(&[("id", fullname)]);
        self.send(request, "/api/unsave").await?;
        debug!("unsaved {}", fullname);
        Ok(())
    }

    async fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, CoreError> {
        let token = self.auth.bearer_token().await?;
        let url = format!("{}{}", self.base_url, path);
        Ok(self.http.request(method, url).bearer_auth(token))
    }

    /// Sends a request and maps HTTP-level failures onto the error taxonomy.
    /// No retries happen here; retry policy belongs to token acquisition.
    async fn send(&self, request: RequestBuilder, path: &str) -> Result<Response, CoreError> {
        let response = request.send().await.map_err(|e| {
            error!("network error for {}: {}", path, e);
            CoreError::Network(e)
        })?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        error!("request to {} failed with status {}", path, status);
        let api_error = match status {
            StatusCode::TOO_MANY_REQUESTS => {
                let retry_after = response
                    .headers()
                    .get(reqwest::header::RETRY_AFTER)
                    .and_then(|value| value.to_str().ok())
                    .and_then(|value| value.parse::<u64>().ok());
                RedditApiError::RateLimited { retry_after }
            }
            StatusCode::UNAUTHORIZED => RedditApiError::InvalidToken,
            StatusCode::FORBIDDEN => RedditApiError::Forbidden {
                resource: path.to_string(),
            },
            s if s.is_server_error() => RedditApiError::ServerError {
                status_code: s.as_u16(),
            },
            s => RedditApiError::InvalidResponse {
                details: format!("unexpected status {s} for {path}"),
            },
        };
        Err(api_error.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_string, body_string_contains, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TOKEN_BODY: &str =
        r#"{"access_token": "test_token", "token_type": "bearer", "expires_in": 3600, "scope": "*"}"#;

    async fn test_client(server: &MockServer) -> Client {
        Mock::given(method("POST"))
            .and(path("/api/v1/access_token"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(TOKEN_BODY, "application/json"))
            .mount(server)
            .await;
        let mut config = ClientConfig::new("id", "secret", "testuser", "hunter2");
        config.base_url = server.uri();
        config.user_agent = "shreddit-tests".to_string();
        Client::new(config).await.unwrap()
    }

    fn comment_listing(after: Option<&str>) -> serde_json::Value {
        json!({
            "data": {
                "before": null,
                "after": after,
                "children": [
                    {"data": {
                        "id": "abc123",
                        "body": "hello there",
                        "permalink": "/r/test/comments/xyz/abc123/",
                        "subreddit": "test",
                        "score": 3,
                        "created_utc": 1500000000.0
                    }}
                ]
            }
        })
    }

    #[tokio::test]
    async fn test_get_comments_decodes_listing() {
        let server = MockServer::start().await;
        let client = test_client(&server).await;

        Mock::given(method("GET"))
            .and(path("/user/testuser/comments.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(comment_listing(Some("t1_next"))))
            .expect(1)
            .mount(&server)
            .await;

        let listing = client.get_comments("testuser", "").await.unwrap();
        assert_eq!(listing.after(), "t1_next");
        let items = listing.into_items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, "abc123");
        assert_eq!(items[0].created_utc.timestamp(), 1500000000);
    }

    #[tokio::test]
    async fn test_get_comments_passes_cursor_through() {
        let server = MockServer::start().await;
        let client = test_client(&server).await;

        Mock::given(method("GET"))
            .and(path("/user/testuser/comments.json"))
            .and(query_param("after", "t1_next"))
            .respond_with(ResponseTemplate::new(200).set_body_json(comment_listing(None)))
            .expect(1)
            .mount(&server)
            .await;

        let listing = client.get_comments("testuser", "t1_next").await.unwrap();
        assert_eq!(listing.after(), "");
    }

    #[tokio::test]
    async fn test_get_saved_posts_filters_by_type() {
        let server = MockServer::start().await;
        let client = test_client(&server).await;

        Mock::given(method("GET"))
            .and(path("/user/testuser/saved.json"))
            .and(query_param("type", "links"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"before": null, "after": null, "children": [
                    {"data": {"id": "p1", "title": "a post", "created_utc": 1400000000.0}}
                ]}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let listing = client.get_saved_posts("testuser", "").await.unwrap();
        assert_eq!(listing.into_items()[0].id, "p1");
    }

    #[tokio::test]
    async fn test_edit_comment_sends_fullname_and_body() {
        let server = MockServer::start().await;
        let client = test_client(&server).await;

        Mock::given(method("POST"))
            .and(path("/api/editusertext"))
            .and(query_param("raw_json", "1"))
            .and(body_string_contains("thing_id=t1_abc123"))
            .and(body_string_contains("text=wiped"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"jquery": [], "success": true})),
            )
            .expect(1)
            .mount(&server)
            .await;

        client.edit_comment("abc123", "wiped").await.unwrap();
    }

    #[tokio::test]
    async fn test_edit_comment_surfaces_in_body_rate_limit() {
        let server = MockServer::start().await;
        let client = test_client(&server).await;

        let body = json!({
            "jquery": [
                [1, 10, "attr", "find"],
                [10, 11, "call", [".error.RATELIMIT.field-ratelimit"]]
            ],
            "success": false
        });
        Mock::given(method("POST"))
            .and(path("/api/editusertext"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .expect(1)
            .mount(&server)
            .await;

        let err = client.edit_comment("abc123", "wiped").await.unwrap_err();
        assert!(matches!(
            err,
            CoreError::RedditApi(RedditApiError::RateLimited { retry_after: None })
        ));
    }

    #[tokio::test]
    async fn test_edit_comment_reports_generic_api_failure() {
        let server = MockServer::start().await;
        let client = test_client(&server).await;

        Mock::given(method("POST"))
            .and(path("/api/editusertext"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"jquery": [], "success": false})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let err = client.edit_comment("abc123", "wiped").await.unwrap_err();
        match err {
            CoreError::RedditApi(RedditApiError::ApiFailure {
                operation,
                fullname,
            }) => {
                assert_eq!(operation, "edit");
                assert_eq!(fullname, "t1_abc123");
            }
            other => panic!("expected ApiFailure, got {other}"),
        }
    }

    #[tokio::test]
    async fn test_delete_post_posts_fullname() {
        let server = MockServer::start().await;
        let client = test_client(&server).await;

        Mock::given(method("POST"))
            .and(path("/api/del"))
            .and(body_string("id=t3_xyz789"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        client.delete_post("xyz789").await.unwrap();
    }

    #[tokio::test]
    async fn test_unsave_comment_posts_fullname() {
        let server = MockServer::start().await;
        let client = test_client(&server).await;

        Mock::given(method("POST"))
            .and(path("/api/unsave"))
            .and(body_string("id=t1_abc123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        client.unsave_comment("abc123").await.unwrap();
    }

    #[tokio::test]
    async fn test_server_error_is_mapped_and_not_retried() {
        let server = MockServer::start().await;
        let client = test_client(&server).await;

        Mock::given(method("GET"))
            .and(path("/user/testuser/comments.json"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&server)
            .await;

        let err = client.get_comments("testuser", "").await.unwrap_err();
        assert!(matches!(
            err,
            CoreError::RedditApi(RedditApiError::ServerError { status_code: 503 })
        ));
    }
}
