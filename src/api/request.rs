//! Request normalization.
//!
//! # Responsibilities
//! - Build the outbound request (JSON content type, bearer token, request ID)
//! - Run it through the timeout executor
//! - Fold every outcome (success, upstream error, timeout, transport or
//!   decoding failure) into one [`ApiResponse`]
//!
//! # Design Decisions
//! - HTTP-level failures are data, never `Err`
//! - DELETE bodies are never read; the status alone decides
//! - Failures are logged with enough context to diagnose, logging never
//!   changes the envelope

use std::fmt;
use std::time::{Duration, Instant};

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;
use uuid::Uuid;

use crate::api::envelope::{
    ApiError, ApiResponse, UpstreamBody, DELETE_FAILED_MESSAGE, GENERIC_ERROR_MESSAGE,
    GENERIC_ERROR_NAME,
};
use crate::observability::metrics;
use crate::resilience::timeouts::{send_with_timeout, FetchError};

pub const X_REQUEST_ID: &str = "x-request-id";

/// HTTP verbs understood by the CMS API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }

    /// Whether a payload is sent with this verb.
    pub fn carries_body(&self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch)
    }

    fn as_reqwest(&self) -> reqwest::Method {
        match self {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One logical call against the CMS.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    /// Absolute URL, or a path resolved against the client's base URL.
    pub url: String,
    pub method: HttpMethod,
    /// Ignored for GET and DELETE.
    pub payload: Option<Value>,
    /// `None` means a public, unauthenticated request.
    pub auth_token: Option<String>,
    /// Overrides the client's default timeout.
    pub timeout: Option<Duration>,
}

impl ApiRequest {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method,
            payload: None,
            auth_token: None,
            timeout: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, url)
    }

    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, url)
    }

    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }

    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Log fields shared by every event of one call.
pub(crate) struct CallContext {
    pub url: String,
    pub method: HttpMethod,
    pub has_token: bool,
    pub request_id: Uuid,
    pub started: Instant,
}

impl CallContext {
    pub(crate) fn new(url: &str, request: &ApiRequest) -> Self {
        Self {
            url: url.to_string(),
            method: request.method,
            has_token: request.auth_token.is_some(),
            request_id: Uuid::new_v4(),
            started: Instant::now(),
        }
    }

    /// Report a failure that never reached a usable HTTP response.
    pub(crate) fn fail<T>(&self, error: ApiError) -> ApiResponse<T> {
        tracing::error!(
            request_id = %self.request_id,
            url = %self.url,
            method = %self.method,
            status = error.status(),
            has_token = self.has_token,
            error_name = %error.name(),
            error = %error.message(),
            "CMS request failed"
        );
        ApiResponse::failure(error)
    }

    /// Report a failure raised before anything was sent. Counted like any
    /// other request outcome.
    pub(crate) fn reject<T>(&self, error: ApiError) -> ApiResponse<T> {
        let outcome = self.fail(error);
        metrics::record_request(self.method.as_str(), outcome.status(), self.started);
        outcome
    }
}

/// Execute `request` against `target` and normalize the outcome.
pub(crate) async fn perform<T: DeserializeOwned>(
    http: &Client,
    target: Url,
    request: &ApiRequest,
    timeout: Duration,
) -> ApiResponse<T> {
    let ctx = CallContext::new(target.as_str(), request);

    tracing::debug!(
        request_id = %ctx.request_id,
        url = %ctx.url,
        method = %ctx.method,
        timeout_ms = timeout.as_millis() as u64,
        "Sending CMS request"
    );

    let mut builder = http
        .request(request.method.as_reqwest(), target)
        .header(CONTENT_TYPE, "application/json")
        .header(X_REQUEST_ID, ctx.request_id.to_string());

    if let Some(token) = &request.auth_token {
        builder = builder.bearer_auth(token);
    }
    if request.method.carries_body() {
        if let Some(payload) = &request.payload {
            builder = builder.json(payload);
        }
    }

    let outcome = match send_with_timeout(builder, timeout).await {
        Ok(response) => normalize(response, &ctx).await,
        Err(FetchError::TimedOut(_)) => ctx.fail(ApiError::timeout()),
        Err(FetchError::Transport(e)) => ctx.fail(ApiError::network(e.to_string())),
    };

    metrics::record_request(request.method.as_str(), outcome.status(), ctx.started);
    outcome
}

async fn normalize<T: DeserializeOwned>(response: Response, ctx: &CallContext) -> ApiResponse<T> {
    let status = response.status();
    let code = status.as_u16();

    if ctx.method == HttpMethod::Delete {
        if !status.is_success() {
            let error = ApiError::new(code, GENERIC_ERROR_NAME, DELETE_FAILED_MESSAGE);
            return upstream_failure(ctx, code, error);
        }
        return match serde_json::from_value(Value::Bool(true)) {
            Ok(data) => ApiResponse::Success {
                status: code,
                data: Some(data),
                meta: None,
            },
            Err(e) => ctx.fail(ApiError::network(e.to_string())),
        };
    }

    let body = match read_json(response).await {
        Ok(body) => body,
        Err(message) => return ctx.fail(ApiError::network(message)),
    };

    match UpstreamBody::classify(body, code) {
        UpstreamBody::Payload { data, meta } => {
            let data = match data {
                Value::Null => None,
                value => match serde_json::from_value(value) {
                    Ok(data) => Some(data),
                    Err(e) => return ctx.fail(ApiError::network(e.to_string())),
                },
            };
            ApiResponse::Success {
                status: code,
                data,
                meta,
            }
        }
        UpstreamBody::Failure(error) => upstream_failure(ctx, code, error),
        UpstreamBody::Unstructured { message } => {
            let message = message.unwrap_or_else(|| fallback_message(status));
            upstream_failure(ctx, code, ApiError::new(code, GENERIC_ERROR_NAME, message))
        }
    }
}

/// Decode the body as JSON.
///
/// An empty body reads as `null` only where no payload is owed: a 204 or an
/// error status. An empty body on any other 2xx is malformed.
async fn read_json(response: Response) -> Result<Value, String> {
    let status = response.status();
    let bytes = response.bytes().await.map_err(|e| e.to_string())?;
    if bytes.iter().all(u8::is_ascii_whitespace) && !owes_payload(status) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(&bytes).map_err(|e| e.to_string())
}

fn owes_payload(status: StatusCode) -> bool {
    status.is_success() && status != StatusCode::NO_CONTENT
}

fn fallback_message(status: StatusCode) -> String {
    status
        .canonical_reason()
        .unwrap_or(GENERIC_ERROR_MESSAGE)
        .to_string()
}

fn upstream_failure<T>(ctx: &CallContext, status: u16, error: ApiError) -> ApiResponse<T> {
    tracing::warn!(
        request_id = %ctx.request_id,
        url = %ctx.url,
        method = %ctx.method,
        status,
        has_token = ctx.has_token,
        error_name = %error.name(),
        error = %error.message(),
        "CMS returned an error response"
    );
    ApiResponse::Failure { status, error }
}
