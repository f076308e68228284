//! Reactions: the handlers a trigger runs once its guards pass.
//!
//! A [`Reaction`] pairs a name and a [`ReactionScope`] with an async handler
//! and, optionally, an async pre-step whose output is handed to the handler.
//!
//! Reactions are built before the trigger that owns them, so the trigger
//! back-reference is wired afterwards through [`Reaction::bind`], exactly
//! once.
//!
//! # Example
//!
//! ```rust,ignore
//! let pong = Reaction::new("pong", ReactionScope::All, |ctx: ReactionContext| async move {
//!     ctx.reply("pong!").await?;
//!     Ok(())
//! });
//!
//! let play = Reaction::with_pre(
//!     "play",
//!     ReactionScope::Guild,
//!     |ctx: ReactionContext| async move { parse_track(ctx.content()) },
//!     |ctx: ReactionContext, track: Track| async move { queue(ctx, track).await },
//! );
//! ```

use std::fmt;
use std::future::Future;
use std::sync::{Arc, OnceLock, Weak};

use futures::FutureExt;
use futures::future::BoxFuture;
use herald_core::{Message, MessageContext};
use tracing::{trace, warn};

use crate::error::{TriggerError, TriggerResult};
use crate::trigger::Trigger;

// ============================================================================
// Scope
// ============================================================================

/// The message contexts a reaction handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReactionScope {
    /// Direct messages only.
    Direct,
    /// Guild messages only.
    Guild,
    /// Every message.
    All,
}

impl ReactionScope {
    /// Returns `true` if a reaction with this scope may run in `context`.
    pub fn admits(&self, context: MessageContext) -> bool {
        matches!(
            (self, context),
            (Self::All, _)
                | (Self::Direct, MessageContext::Direct)
                | (Self::Guild, MessageContext::Guild)
        )
    }
}

// ============================================================================
// Context
// ============================================================================

/// What a reaction receives when it runs.
#[derive(Clone)]
pub struct ReactionContext {
    /// The message, with the command and sub-command already stripped.
    pub message: Arc<Message>,
    /// The trigger that matched.
    pub trigger: Arc<Trigger>,
}

impl ReactionContext {
    /// Returns the remaining message content.
    pub fn content(&self) -> &str {
        &self.message.content
    }

    /// Posts `content` to the channel the message came from.
    pub async fn reply(&self, content: &str) -> TriggerResult<String> {
        let bot = self.trigger.bot()?;
        Ok(bot.send(&self.message.channel_id, content).await?)
    }
}

impl fmt::Debug for ReactionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReactionContext")
            .field("message", &self.message)
            .field("trigger", &self.trigger.name())
            .finish()
    }
}

// ============================================================================
// Reaction
// ============================================================================

type ReactionFn = dyn Fn(ReactionContext) -> BoxFuture<'static, TriggerResult<()>> + Send + Sync;

/// A named, scoped message handler.
pub struct Reaction {
    name: String,
    scope: ReactionScope,
    handler: Box<ReactionFn>,
    trigger: OnceLock<Weak<Trigger>>,
}

impl Reaction {
    /// Creates a reaction without a pre-step.
    pub fn new<F, Fut>(name: impl Into<String>, scope: ReactionScope, run: F) -> Self
    where
        F: Fn(ReactionContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = TriggerResult<()>> + Send + 'static,
    {
        Self {
            name: name.into(),
            scope,
            handler: Box::new(move |ctx| run(ctx).boxed()),
            trigger: OnceLock::new(),
        }
    }

    /// Creates a reaction whose handler receives the output of `pre`.
    ///
    /// An error from `pre` skips `run` and is returned as the reaction's
    /// result.
    pub fn with_pre<P, PFut, T, F, Fut>(
        name: impl Into<String>,
        scope: ReactionScope,
        pre: P,
        run: F,
    ) -> Self
    where
        P: Fn(ReactionContext) -> PFut + Send + Sync + 'static,
        PFut: Future<Output = TriggerResult<T>> + Send + 'static,
        T: Send + 'static,
        F: Fn(ReactionContext, T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = TriggerResult<()>> + Send + 'static,
    {
        let pre = Arc::new(pre);
        let run = Arc::new(run);
        Self {
            name: name.into(),
            scope,
            handler: Box::new(move |ctx| {
                let pre = Arc::clone(&pre);
                let run = Arc::clone(&run);
                async move {
                    let payload = pre(ctx.clone()).await?;
                    run(ctx, payload).await
                }
                .boxed()
            }),
            trigger: OnceLock::new(),
        }
    }

    /// Returns the reaction name. For sub reactions this is the sub-command.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the contexts this reaction handles.
    pub fn scope(&self) -> ReactionScope {
        self.scope
    }

    /// Wires the owning trigger. Only the first call has an effect.
    ///
    /// Returns `false` if the reaction was already bound.
    pub fn bind(&self, trigger: Weak<Trigger>) -> bool {
        if self.trigger.set(trigger).is_err() {
            warn!(reaction = %self.name, "Reaction is already bound to a trigger");
            return false;
        }
        true
    }

    /// Returns `true` once [`bind`](Self::bind) has been called.
    pub fn is_bound(&self) -> bool {
        self.trigger.get().is_some()
    }

    /// Returns the owning trigger, if it is bound and still alive.
    pub fn trigger(&self) -> Option<Arc<Trigger>> {
        self.trigger.get().and_then(Weak::upgrade)
    }

    /// Runs the reaction for `message`.
    pub async fn execute(&self, message: Arc<Message>) -> TriggerResult<()> {
        let trigger = self
            .trigger()
            .ok_or_else(|| TriggerError::Detached(self.name.clone()))?;

        trace!(reaction = %self.name, trigger = %trigger.name(), "Executing reaction");
        (self.handler)(ReactionContext { message, trigger }).await
    }
}

impl fmt::Debug for Reaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reaction")
            .field("name", &self.name)
            .field("scope", &self.scope)
            .field("bound", &self.is_bound())
            .finish()
    }
}

// ============================================================================
// Reaction sets
// ============================================================================

/// An ordered set of reactions.
#[derive(Debug, Clone, Default)]
pub struct ReactionSet {
    reactions: Vec<Arc<Reaction>>,
}

impl ReactionSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a reaction (builder pattern).
    pub fn with(mut self, reaction: Reaction) -> Self {
        self.reactions.push(Arc::new(reaction));
        self
    }

    /// Returns all reactions.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Reaction>> {
        self.reactions.iter()
    }

    /// Returns the reactions allowed to run in `context`.
    pub fn eligible(&self, context: MessageContext) -> Vec<Arc<Reaction>> {
        self.reactions
            .iter()
            .filter(|r| r.scope.admits(context))
            .cloned()
            .collect()
    }

    /// Returns the number of reactions.
    pub fn len(&self) -> usize {
        self.reactions.len()
    }

    /// Returns `true` if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.reactions.is_empty()
    }
}

impl FromIterator<Reaction> for ReactionSet {
    fn from_iter<I: IntoIterator<Item = Reaction>>(iter: I) -> Self {
        Self {
            reactions: iter.into_iter().map(Arc::new).collect(),
        }
    }
}

/// The reactions of a trigger.
///
/// `default` runs when the message has no sub-command; `sub` reactions run
/// when their name equals the first token of the remaining content.
#[derive(Debug, Clone, Default)]
pub struct ReactionMap {
    /// Reactions for the bare command.
    pub default: Option<ReactionSet>,
    /// Reactions keyed by sub-command name.
    pub sub: Option<ReactionSet>,
}

impl ReactionMap {
    /// Creates a map with only default reactions.
    pub fn from_default(default: ReactionSet) -> Self {
        Self {
            default: Some(default),
            sub: None,
        }
    }

    /// Sets the default reactions (builder pattern).
    pub fn default_reactions(mut self, set: ReactionSet) -> Self {
        self.default = Some(set);
        self
    }

    /// Sets the sub reactions (builder pattern).
    pub fn sub_reactions(mut self, set: ReactionSet) -> Self {
        self.sub = Some(set);
        self
    }

    /// Returns every reaction in both sets.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Reaction>> {
        self.default
            .iter()
            .chain(self.sub.iter())
            .flat_map(ReactionSet::iter)
    }

    /// Returns `true` if neither set is registered.
    pub fn is_empty(&self) -> bool {
        self.default.is_none() && self.sub.is_none()
    }
}
