//! CMS API client.
//!
//! Owns the shared [`reqwest::Client`], the base URL every relative path is
//! resolved against, and the default timeout. One convenience method per verb
//! forwards to [`ApiClient::request`].

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use url::Url;

use crate::api::envelope::{ApiError, ApiResponse};
use crate::api::request::{perform, ApiRequest, CallContext, HttpMethod};
use crate::config::ApiConfig;
use crate::resilience::timeouts::DEFAULT_TIMEOUT;

/// Errors raised while constructing an [`ApiClient`].
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid base URL '{url}': {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("failed to build HTTP client: {0}")]
    Build(#[from] reqwest::Error),
}

/// HTTP client for a single CMS instance.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    default_timeout: Duration,
}

impl ApiClient {
    /// Create a client for `base_url` with the default timeout.
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Ok(Self::with_client(reqwest::Client::new(), parse_base_url(base_url)?))
    }

    /// Create a client from validated configuration.
    pub fn from_config(config: &ApiConfig) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .build()?;
        let base_url = parse_base_url(&config.base_url)?;

        Ok(Self::with_client(http, base_url).with_default_timeout(config.timeout()))
    }

    /// Reuse an existing [`reqwest::Client`] (shares its connection pool).
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self {
            http,
            base_url: with_trailing_slash(base_url),
            default_timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    /// Resolve an absolute URL or a path against the base URL.
    pub fn resolve(&self, url: &str) -> Result<Url, url::ParseError> {
        self.base_url.join(url)
    }

    /// Issue one request and normalize its outcome.
    ///
    /// Never fails: every outcome, including an unresolvable URL, comes back
    /// as an [`ApiResponse`].
    pub async fn request<T: DeserializeOwned>(&self, request: ApiRequest) -> ApiResponse<T> {
        let target = match self.resolve(&request.url) {
            Ok(target) => target,
            Err(e) => {
                let message = format!("invalid URL '{}': {}", request.url, e);
                return CallContext::new(&request.url, &request).reject(ApiError::network(message));
            }
        };
        let timeout = request.timeout.unwrap_or(self.default_timeout);

        perform(&self.http, target, &request, timeout).await
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        url: &str,
        auth_token: Option<&str>,
        timeout: Option<Duration>,
    ) -> ApiResponse<T> {
        self.request(build(HttpMethod::Get, url, auth_token, timeout)).await
    }

    pub async fn post<T, B>(
        &self,
        url: &str,
        payload: &B,
        auth_token: Option<&str>,
        timeout: Option<Duration>,
    ) -> ApiResponse<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send_with_payload(HttpMethod::Post, url, payload, auth_token, timeout).await
    }

    pub async fn put<T, B>(
        &self,
        url: &str,
        payload: &B,
        auth_token: Option<&str>,
        timeout: Option<Duration>,
    ) -> ApiResponse<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send_with_payload(HttpMethod::Put, url, payload, auth_token, timeout).await
    }

    pub async fn patch<T, B>(
        &self,
        url: &str,
        payload: &B,
        auth_token: Option<&str>,
        timeout: Option<Duration>,
    ) -> ApiResponse<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send_with_payload(HttpMethod::Patch, url, payload, auth_token, timeout).await
    }

    /// DELETE never reads the response body; `data` is `true` on any 2xx.
    pub async fn delete(
        &self,
        url: &str,
        auth_token: Option<&str>,
        timeout: Option<Duration>,
    ) -> ApiResponse<bool> {
        self.request(build(HttpMethod::Delete, url, auth_token, timeout)).await
    }

    async fn send_with_payload<T, B>(
        &self,
        method: HttpMethod,
        url: &str,
        payload: &B,
        auth_token: Option<&str>,
        timeout: Option<Duration>,
    ) -> ApiResponse<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let request = build(method, url, auth_token, timeout);
        match serde_json::to_value(payload) {
            Ok(payload) => self.request(request.with_payload(payload)).await,
            Err(e) => CallContext::new(url, &request)
                .reject(ApiError::network(format!("failed to encode payload: {}", e))),
        }
    }
}

fn build(
    method: HttpMethod,
    url: &str,
    auth_token: Option<&str>,
    timeout: Option<Duration>,
) -> ApiRequest {
    ApiRequest {
        url: url.to_string(),
        method,
        payload: None,
        auth_token: auth_token.map(str::to_owned),
        timeout,
    }
}

fn parse_base_url(base_url: &str) -> Result<Url, ClientError> {
    Url::parse(base_url).map_err(|source| ClientError::InvalidBaseUrl {
        url: base_url.to_string(),
        source,
    })
}

// Without a trailing slash `join` would replace the last path segment.
fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}
