//! Configuration module for the Herald runtime.
//!
//! Configuration is layered with figment (defaults, files, environment) and
//! covers logging, bot-wide settings and per-trigger overrides.

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, Profile, load_config, load_config_from_file};
pub use schema::{
    BotConfig, HeraldConfig, LogFormat, LogLevel, LogOutput, LogRotation, LoggingConfig,
    SpanEventConfig, TriggerOverride,
};
pub use validation::validate_config;
