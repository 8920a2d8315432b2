//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse, deserialize, env overrides, explicit overrides)
//!     → validation.rs (semantic checks)
//!     → ClientConfig (validated, immutable)
//!     → passed by value into ApiClient::from_config
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; no hidden globals
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load, load_config, load_default, ConfigError, ConfigOverrides};
pub use schema::{ApiConfig, ClientConfig, ObservabilityConfig};
pub use validation::{validate_config, ValidationError};
