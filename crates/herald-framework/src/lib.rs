//! # Herald Framework
//!
//! Trigger matching, guard chain and reaction dispatch for chat bots.
//!
//! This layer provides:
//! - [`Trigger`]: command aliases and guards (channel, role, permission,
//!   custom condition) in front of a set of [`Reaction`]s
//! - Command matching in three modes ([`TriggerMatch`])
//! - Per-guild prefixes read from the config store
//! - [`Dispatcher`]: runs every registered trigger against a message and
//!   replies with user-facing rejections
//!
//! The framework is built on the message model and collaborator interfaces
//! of `herald-core`; it never talks to a chat platform directly.

pub mod dispatcher;
pub mod error;
pub mod guard;
pub mod matcher;
pub mod options;
pub mod prefix;
pub mod reaction;
pub mod trigger;

#[cfg(test)]
mod testing;

pub use dispatcher::{DispatchReport, Dispatcher};
pub use error::{Rejection, TriggerError, TriggerResult};
pub use matcher::{TriggerMatch, matches, strip_text};
pub use options::{CommandOptions, Condition, Filter, TriggerOptions};
pub use prefix::{DEFAULT_PREFIX, GuildConfig, fetch_prefix};
pub use reaction::{Reaction, ReactionContext, ReactionMap, ReactionScope, ReactionSet};
pub use trigger::{Trigger, TriggerBuilder, TriggerServices};

/// Prelude for common imports.
pub mod prelude {
    pub use super::dispatcher::{DispatchReport, Dispatcher};
    pub use super::error::{Rejection, TriggerError, TriggerResult};
    pub use super::matcher::TriggerMatch;
    pub use super::options::{CommandOptions, Condition, Filter, TriggerOptions};
    pub use super::reaction::{Reaction, ReactionContext, ReactionMap, ReactionScope, ReactionSet};
    pub use super::trigger::{Trigger, TriggerBuilder, TriggerServices};
}
