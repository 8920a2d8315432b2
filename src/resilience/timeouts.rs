//! Timeout enforcement.
//!
//! # Responsibilities
//! - Wrap upstream calls with a deadline
//! - Cancel the in-flight call when the deadline elapses
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities; dropping the inner future is the cancellation
//! - Timeout errors are distinct from transport errors
//! - The deadline covers the request and the response head, not the body read

use std::future::Future;
use std::time::Duration;

use reqwest::{RequestBuilder, Response};
use thiserror::Error;
use tokio::time;

/// Default upper bound on a single upstream call, in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 8000;

/// Default upper bound on a single upstream call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(DEFAULT_TIMEOUT_MS);

/// Errors raised by the request executor.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Our own deadline fired before the call settled.
    #[error("request aborted after {}ms", .0.as_millis())]
    TimedOut(Duration),

    /// The transport failed (connect, DNS, TLS, protocol).
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
}

impl FetchError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, FetchError::TimedOut(_))
    }
}

/// Run `fut` until it completes or `limit` elapses.
///
/// The timer lives inside the returned future, so it is released on every
/// settle path. When the deadline wins, `fut` is dropped mid-flight.
pub async fn with_deadline<F, T, E>(limit: Duration, fut: F) -> Result<T, FetchError>
where
    F: Future<Output = Result<T, E>>,
    E: Into<FetchError>,
{
    match time::timeout(limit, fut).await {
        Ok(result) => result.map_err(Into::into),
        Err(_) => Err(FetchError::TimedOut(limit)),
    }
}

/// Send a prepared request, aborting it if no response arrives within `limit`.
pub async fn send_with_timeout(
    request: RequestBuilder,
    limit: Duration,
) -> Result<Response, FetchError> {
    with_deadline(limit, request.send()).await
}
