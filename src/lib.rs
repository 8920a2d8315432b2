//! CMS content fetching library.
//!
//! Issues requests against a headless CMS with a bounded wait, normalizes
//! every outcome into one [`ApiResponse`] envelope, and interprets envelopes
//! for page loaders (data, not-found, or failure).

pub mod api;
pub mod config;
pub mod observability;
pub mod resilience;

pub use api::{
    assert_valid, extract, ApiClient, ApiError, ApiRequest, ApiResponse, HttpMethod, LoadError,
};
pub use config::ClientConfig;
