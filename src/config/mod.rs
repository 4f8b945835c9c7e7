//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → SelectorConfig (validated, immutable)
//!     → consumed once by ServerSelector::new
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; the registry is built from it once
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::BreakerConfig;
pub use schema::ObservabilityConfig;
pub use schema::PoolSettings;
pub use schema::SelectorConfig;
pub use schema::ServerConfig;
pub use validation::{validate_config, ValidationError};
