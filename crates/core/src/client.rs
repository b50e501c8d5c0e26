//! HTTP client for the Write.as/WriteFreely API.
//!
//! [`WriteFreelyClient`] knows the instance; [`Session`] is what you get back
//! after signing in and is the [`BlogClient`] the importer talks to. The
//! session is an ordinary value: pass it to the importer, then call
//! [`Session::sign_out`] when done.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use url::Url;

use crate::api::{BlogClient, Collection, CollectionParams, CreatedPost, PostParams};
use crate::{Result, WpImportError};

/// Instance used when none is given.
pub const DEFAULT_INSTANCE: &str = "https://write.as";

/// HTTP client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Request timeout in seconds.
    pub timeout: u64,
    /// Custom User-Agent string.
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self { timeout: 30, user_agent: format!("wp-import/{}", env!("CARGO_PKG_VERSION")) }
    }
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    error_msg: String,
}

#[derive(Debug, Deserialize)]
struct AuthData {
    access_token: String,
    #[serde(default)]
    user: Option<AuthUser>,
}

#[derive(Debug, Deserialize)]
struct AuthUser {
    username: String,
}

/// Unauthenticated client bound to one instance.
#[derive(Debug, Clone)]
pub struct WriteFreelyClient {
    http: Client,
    api: Url,
    timeout: u64,
}

impl WriteFreelyClient {
    /// Creates a client for `instance`, or for Write.as when `None`.
    pub fn new(instance: Option<&str>, config: &ClientConfig) -> Result<Self> {
        let api = instance_api_url(instance.unwrap_or(DEFAULT_INSTANCE))?;

        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(WpImportError::HttpError)?;

        Ok(Self { http, api, timeout: config.timeout })
    }

    /// Base API URL, e.g. `https://write.as/api`.
    pub fn api_url(&self) -> &Url {
        &self.api
    }

    /// Logs in with a username and password.
    ///
    /// # Errors
    ///
    /// [`WpImportError::AuthError`] when the instance rejects the credentials.
    pub async fn sign_in(self, username: &str, password: &str) -> Result<Session> {
        tracing::info!(instance = %self.api, username, "signing in");

        let request = self
            .http
            .post(self.endpoint(&["auth", "login"])?)
            .json(&json!({ "alias": username, "pass": password }));

        let auth: AuthData = self.send(request).await.map_err(|e| match e {
            WpImportError::Api { message, .. } => WpImportError::AuthError(message),
            other => other,
        })?;

        let username = auth.user.map(|u| u.username).unwrap_or_else(|| username.to_string());
        Ok(Session { client: self, token: auth.access_token, username: Some(username) })
    }

    /// Resumes a session from a previously issued access token.
    pub fn with_token(self, token: impl Into<String>) -> Session {
        Session { client: self, token: token.into(), username: None }
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.api.clone();
        url.path_segments_mut()
            .map_err(|_| WpImportError::InvalidUrl(self.api.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = self.execute(request).await?;
        let envelope: Envelope<T> = response.json().await?;
        Ok(envelope.data)
    }

    async fn execute(&self, request: RequestBuilder) -> Result<reqwest::Response> {
        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                WpImportError::Timeout { timeout: self.timeout }
            } else {
                WpImportError::HttpError(e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(api_error(status, &body));
        }

        Ok(response)
    }
}

/// An authenticated connection to an instance.
pub struct Session {
    client: WriteFreelyClient,
    token: String,
    username: Option<String>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("api", &self.client.api.as_str())
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Access token for this session. Treat as a secret.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Username, when the session came from a password login.
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn api_url(&self) -> &Url {
        self.client.api_url()
    }

    /// Invalidates the access token.
    pub async fn sign_out(self) -> Result<()> {
        tracing::info!(instance = %self.client.api, "signing out");
        let request = self.authorized(self.client.http.delete(self.client.endpoint(&["auth", "me"])?));
        self.client.execute(request).await?;
        Ok(())
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.header("Authorization", format!("Token {}", self.token))
    }
}

#[async_trait]
impl BlogClient for Session {
    async fn create_collection(&self, params: &CollectionParams) -> Result<Collection> {
        let url = self.client.endpoint(&["collections"])?;
        let request = self.authorized(self.client.http.post(url).json(params));

        self.client.send(request).await.map_err(|e| match e {
            WpImportError::Api { status, message } if status == StatusCode::CONFLICT.as_u16() => {
                WpImportError::CollectionTaken(message)
            }
            other => other,
        })
    }

    async fn create_post(&self, post: &PostParams) -> Result<CreatedPost> {
        let url = if post.collection.is_empty() {
            self.client.endpoint(&["posts"])?
        } else {
            self.client.endpoint(&["collections", post.collection.as_str(), "posts"])?
        };
        tracing::debug!(%url, title = %post.title, "creating post");

        let request = self.authorized(self.client.http.post(url).json(post));
        self.client.send(request).await
    }
}

/// Normalizes a user-supplied instance address into its API base URL.
///
/// Adds `https://` when no scheme is given, drops trailing slashes, and
/// appends `/api` unless the path already ends with it.
pub fn instance_api_url(instance: &str) -> Result<Url> {
    let trimmed = instance.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(WpImportError::InvalidUrl("instance URL is empty".to_string()));
    }

    let with_scheme = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };

    let mut url = Url::parse(&with_scheme).map_err(|e| WpImportError::InvalidUrl(e.to_string()))?;
    if url.host_str().is_none() {
        return Err(WpImportError::InvalidUrl(format!("{} has no host", instance)));
    }

    let has_api = url.path_segments().and_then(|mut s| s.next_back()) == Some("api");
    if !has_api {
        url.path_segments_mut()
            .map_err(|_| WpImportError::InvalidUrl(instance.to_string()))?
            .pop_if_empty()
            .push("api");
    }

    Ok(url)
}

fn api_error(status: StatusCode, body: &str) -> WpImportError {
    let message = serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .map(|e| e.error_msg)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("unexpected response").to_string());

    WpImportError::Api { status: status.as_u16(), message }
}
