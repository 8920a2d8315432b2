//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! api::request produces:
//!     → logging.rs (structured log events per failed call)
//!     → metrics.rs (counters, histograms)
//! ```
//!
//! # Design Decisions
//! - Every failure is logged with url, method, status and token presence
//! - The request ID sent upstream is the correlation key in logs

pub mod logging;
pub mod metrics;
