//! Configuration schema definitions.
//!
//! ```toml
//! [logging]
//! level = "debug"
//! format = "pretty"
//!
//! [bot]
//! default_prefix = "!"
//!
//! [triggers.audio]
//! enabled = false
//!
//! [triggers.ban]
//! required_permissions = ["BAN_MEMBERS"]
//! roles = { include = ["1234"] }
//! ```

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

use herald_core::Permission;
use herald_framework::{CommandOptions, DEFAULT_PREFIX, Filter, TriggerOptions};
use serde::{Deserialize, Serialize};

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HeraldConfig {
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Bot-wide settings.
    #[serde(default)]
    pub bot: BotConfig,

    /// Per-trigger overrides keyed by trigger name.
    #[serde(default)]
    pub triggers: HashMap<String, TriggerOverride>,
}

// =============================================================================
// Bot
// =============================================================================

/// Bot-wide settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    /// Prefix for direct messages and for guilds without a stored prefix.
    #[serde(default = "default_prefix")]
    pub default_prefix: String,

    /// Drop messages authored by bot accounts before dispatch.
    #[serde(default = "default_true")]
    pub ignore_bots: bool,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            default_prefix: default_prefix(),
            ignore_bots: true,
        }
    }
}

fn default_prefix() -> String {
    DEFAULT_PREFIX.to_string()
}

fn default_true() -> bool {
    true
}

// =============================================================================
// Trigger overrides
// =============================================================================

/// Settings applied to a registered trigger with the same name.
///
/// Only the fields present are applied; everything else keeps the value the
/// trigger was built with.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerOverride {
    /// Switches the trigger on or off.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    /// Replaces the command aliases.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<CommandOptions>,

    /// Replaces the channel filter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channels: Option<Filter>,

    /// Replaces the role filter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roles: Option<Filter>,

    /// Replaces the required permissions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_permissions: Option<Vec<Permission>>,
}

impl TriggerOverride {
    /// Returns the option patch described by this override.
    pub fn to_options(&self) -> TriggerOptions {
        TriggerOptions {
            command: self.command.clone(),
            channels: self.channels.clone(),
            roles: self.roles.clone(),
            required_permissions: self.required_permissions.clone(),
            condition: None,
        }
    }

    /// Returns `true` if the override patches any option.
    pub fn patches_options(&self) -> bool {
        self.command.is_some()
            || self.channels.is_some()
            || self.roles.is_some()
            || self.required_permissions.is_some()
    }
}

// =============================================================================
// Logging
// =============================================================================

/// Log verbosity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Returns the level name as used in filter directives.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    /// Converts to a `tracing` level.
    pub fn to_tracing_level(self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Log line format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Full,
    Pretty,
    /// Requires the `json-log` feature; otherwise falls back to `full`.
    Json,
}

/// Log destination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    #[default]
    Stdout,
    Stderr,
    File,
}

/// Log file rotation period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    #[default]
    Never,
    Hourly,
    Daily,
}

/// Which span lifecycle events are logged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpanEventConfig {
    #[serde(default)]
    pub new: bool,
    #[serde(default)]
    pub enter: bool,
    #[serde(default)]
    pub exit: bool,
    #[serde(default)]
    pub close: bool,
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Base log level.
    #[serde(default)]
    pub level: LogLevel,

    /// Line format.
    #[serde(default)]
    pub format: LogFormat,

    /// Destination.
    #[serde(default)]
    pub output: LogOutput,

    /// Span lifecycle events.
    #[serde(default)]
    pub span_events: SpanEventConfig,

    /// Include thread IDs.
    #[serde(default)]
    pub thread_ids: bool,

    /// Include source file and line.
    #[serde(default)]
    pub file_location: bool,

    /// Log file, required when `output = "file"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<PathBuf>,

    /// Log file rotation.
    #[serde(default)]
    pub rotation: LogRotation,

    /// Rotated files kept on disk.
    #[serde(default = "default_max_files")]
    pub max_files: usize,

    /// Per-module levels, e.g. `herald_framework = "trace"`.
    #[serde(default)]
    pub filters: HashMap<String, LogLevel>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::default(),
            format: LogFormat::default(),
            output: LogOutput::default(),
            span_events: SpanEventConfig::default(),
            thread_ids: false,
            file_location: false,
            file_path: None,
            rotation: LogRotation::default(),
            max_files: default_max_files(),
            filters: HashMap::new(),
        }
    }
}

fn default_max_files() -> usize {
    5
}
