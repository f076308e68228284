//! Trigger configuration.
//!
//! [`TriggerOptions`] is a struct of optional, named guard settings. A guard
//! runs only when its field is present; an absent field means "no
//! restriction".
//!
//! ```rust,ignore
//! let options = TriggerOptions::new()
//!     .command(CommandOptions::starts_with(["audio", "a"]))
//!     .channels(Filter::new().exclude(["123"]))
//!     .required_permissions([Permission::Connect, Permission::Speak]);
//! ```

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;
use herald_core::{Message, Permission};
use serde::{Deserialize, Serialize};

use crate::error::TriggerResult;
use crate::matcher::TriggerMatch;
use crate::trigger::Trigger;

// ============================================================================
// Command options
// ============================================================================

/// The command literals a trigger answers to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandOptions {
    /// Command aliases, without prefix. The first one is the primary alias
    /// used in sample invocations.
    pub command: Vec<String>,
    /// How aliases are compared with message content.
    #[serde(default, rename = "match")]
    pub match_mode: TriggerMatch,
    /// Match the bare alias instead of prefix + alias.
    #[serde(default)]
    pub ignore_prefix: bool,
}

impl CommandOptions {
    /// Creates command options with the given aliases and match mode.
    pub fn new<I, S>(command: I, match_mode: TriggerMatch) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            command: command.into_iter().map(Into::into).collect(),
            match_mode,
            ignore_prefix: false,
        }
    }

    /// Aliases matched with [`TriggerMatch::StartsWith`].
    pub fn starts_with<I, S>(command: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(command, TriggerMatch::StartsWith)
    }

    /// Aliases matched with [`TriggerMatch::Equals`].
    pub fn equals<I, S>(command: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(command, TriggerMatch::Equals)
    }

    /// Aliases matched with [`TriggerMatch::Contains`].
    pub fn contains<I, S>(command: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(command, TriggerMatch::Contains)
    }

    /// Sets whether the guild prefix is ignored (builder pattern).
    pub fn ignore_prefix(mut self, ignore: bool) -> Self {
        self.ignore_prefix = ignore;
        self
    }

    /// Returns the primary alias.
    pub fn primary(&self) -> Option<&str> {
        self.command.first().map(String::as_str)
    }
}

// ============================================================================
// Include / exclude filter
// ============================================================================

/// An include/exclude list of IDs (channels or roles).
///
/// An empty include list admits everything; the exclude list always applies
/// on top of it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    /// IDs that are admitted. Empty admits all.
    #[serde(default)]
    pub include: Vec<String>,
    /// IDs that are refused, even when included.
    #[serde(default)]
    pub exclude: Vec<String>,
}

impl Filter {
    /// Creates a filter that admits everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the include list (builder pattern).
    pub fn include<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include = ids.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the exclude list (builder pattern).
    pub fn exclude<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude = ids.into_iter().map(Into::into).collect();
        self
    }

    /// Returns `true` if a subject passes the filter.
    ///
    /// `holds` answers whether the subject carries a given ID: for channels
    /// that is equality with the channel ID, for roles it is role membership.
    pub fn admits(&self, holds: impl Fn(&str) -> bool) -> bool {
        let included = self.include.is_empty() || self.include.iter().any(|id| holds(id));
        let excluded = self.exclude.iter().any(|id| holds(id));
        included && !excluded
    }
}

// ============================================================================
// Custom condition
// ============================================================================

type SyncConditionFn = dyn Fn(&Message, &Trigger) -> TriggerResult<()> + Send + Sync;
type AsyncConditionFn =
    dyn Fn(Message, Arc<Trigger>) -> BoxFuture<'static, TriggerResult<()>> + Send + Sync;

/// A user-supplied predicate run as the last guard.
///
/// Returning an error rejects the message with that error.
#[derive(Clone)]
pub enum Condition {
    /// A synchronous predicate.
    Sync(Arc<SyncConditionFn>),
    /// An asynchronous predicate. Receives owned copies so the future can
    /// outlive the guard call.
    Async(Arc<AsyncConditionFn>),
}

impl Condition {
    /// Creates a synchronous condition.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Message, &Trigger) -> TriggerResult<()> + Send + Sync + 'static,
    {
        Self::Sync(Arc::new(f))
    }

    /// Creates an asynchronous condition.
    pub fn from_async<F, Fut>(f: F) -> Self
    where
        F: Fn(Message, Arc<Trigger>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = TriggerResult<()>> + Send + 'static,
    {
        Self::Async(Arc::new(move |message, trigger| f(message, trigger).boxed()))
    }

    /// Evaluates the condition.
    pub async fn evaluate(&self, message: &Message, trigger: &Arc<Trigger>) -> TriggerResult<()> {
        match self {
            Self::Sync(f) => f(message, trigger.as_ref()),
            Self::Async(f) => f(message.clone(), Arc::clone(trigger)).await,
        }
    }
}

impl fmt::Debug for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sync(_) => f.write_str("Condition::Sync(..)"),
            Self::Async(_) => f.write_str("Condition::Async(..)"),
        }
    }
}

// ============================================================================
// TriggerOptions
// ============================================================================

/// Guard configuration for a trigger.
#[derive(Debug, Clone, Default)]
pub struct TriggerOptions {
    /// Command aliases. Without them every message passes the command guard.
    pub command: Option<CommandOptions>,
    /// Channel restriction.
    pub channels: Option<Filter>,
    /// Role restriction.
    pub roles: Option<Filter>,
    /// Permissions the author must all hold.
    pub required_permissions: Option<Vec<Permission>>,
    /// Custom predicate run last.
    pub condition: Option<Condition>,
}

impl TriggerOptions {
    /// Creates options with no guards configured.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the command options (builder pattern).
    pub fn command(mut self, command: CommandOptions) -> Self {
        self.command = Some(command);
        self
    }

    /// Sets the channel filter (builder pattern).
    pub fn channels(mut self, filter: Filter) -> Self {
        self.channels = Some(filter);
        self
    }

    /// Sets the role filter (builder pattern).
    pub fn roles(mut self, filter: Filter) -> Self {
        self.roles = Some(filter);
        self
    }

    /// Sets the required permissions (builder pattern).
    pub fn required_permissions(mut self, permissions: impl IntoIterator<Item = Permission>) -> Self {
        self.required_permissions = Some(permissions.into_iter().collect());
        self
    }

    /// Sets the custom condition (builder pattern).
    pub fn condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    /// Overwrites every field that is set in `patch`, leaving the rest.
    pub fn merge(&mut self, patch: TriggerOptions) {
        let TriggerOptions {
            command,
            channels,
            roles,
            required_permissions,
            condition,
        } = patch;

        if command.is_some() {
            self.command = command;
        }
        if channels.is_some() {
            self.channels = channels;
        }
        if roles.is_some() {
            self.roles = roles;
        }
        if required_permissions.is_some() {
            self.required_permissions = required_permissions;
        }
        if condition.is_some() {
            self.condition = condition;
        }
    }
}
