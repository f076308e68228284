//! Herald Runtime - configuration, logging and the message loop.
//!
//! This crate provides:
//! - Layered configuration (`herald.toml`, `herald.yaml`, `HERALD_*` env vars)
//! - Logging setup on `tracing-subscriber`
//! - Runtime orchestration ([`HeraldRuntime`]): trigger registration with
//!   configured overrides and a message loop fed by the chat client
//!
//! ```ignore
//! use herald_runtime::HeraldRuntime;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let (tx, rx) = tokio::sync::mpsc::channel(64);
//!     let runtime = HeraldRuntime::builder().build(client.bot(), store)?;
//!
//!     runtime.register(audio_trigger())?;
//!
//!     // The client pushes every inbound message into `tx`
//!     client.forward_messages(tx);
//!
//!     // Run until Ctrl+C
//!     runtime.run(rx).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod runtime;

// Re-exports
pub use config::{
    BotConfig, ConfigError, ConfigLoader, ConfigResult, HeraldConfig, LoggingConfig,
    TriggerOverride,
};
pub use error::{RuntimeError, RuntimeResult};
pub use logging::{init_from_config, try_init_from_config};
pub use runtime::{HeraldRuntime, RuntimeBuilder, RuntimeStats, apply_override};

// Re-export tracing for use by other crates
pub use tracing;
pub use tracing_subscriber;

/// Prelude module for convenient imports.
///
/// Provides the logging macros along with `instrument` and `Level`.
pub mod prelude {
    pub use tracing::{Level, debug, error, info, instrument, span, trace, warn};
}
