//! CMS API subsystem.
//!
//! # Data Flow
//! ```text
//! Page loader
//!     → validate.rs (extract / assert_valid: data, not-found or failure)
//!     → client.rs (per-verb wrappers, base URL resolution)
//!     → request.rs (headers, normalization into an envelope)
//!     → resilience::timeouts (bounded send)
//!     → reqwest
//! ```
//!
//! # Design Decisions
//! - The envelope is the only result type crossing layers
//! - 404 is a control-flow outcome, not an error message

pub mod client;
pub mod envelope;
pub mod request;
pub mod validate;

pub use client::{ApiClient, ClientError};
pub use envelope::{ApiError, ApiResponse};
pub use request::{ApiRequest, HttpMethod};
pub use validate::{assert_valid, extract, LoadError};
