//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request to the CMS:
//!     → timeouts.rs (enforce the per-request deadline, abort on expiry)
//!     → api::request (turn the outcome into an envelope)
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every upstream call has a deadline
//! - No retries: a failed call is reported once, as data

pub mod timeouts;

pub use timeouts::{
    send_with_timeout, with_deadline, FetchError, DEFAULT_TIMEOUT, DEFAULT_TIMEOUT_MS,
};
