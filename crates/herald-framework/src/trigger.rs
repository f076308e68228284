//! Triggers: a guard chain in front of a set of reactions.
//!
//! Handling a message is two steps:
//!
//! 1. [`Trigger::check`] runs the guards in a fixed order: command, channel,
//!    role, permission, custom condition. The first failing guard decides
//!    the outcome. A matched command is stripped from the content.
//! 2. [`Trigger::react`] looks at the first remaining token. Without one the
//!    `default` reactions run; otherwise the `sub` reactions named after the
//!    token run, with the token stripped as well.
//!
//! ```rust,ignore
//! let trigger = Trigger::builder("audio")
//!     .options(TriggerOptions::new().command(CommandOptions::starts_with(["audio", "a"])))
//!     .sub_reaction(play)
//!     .sub_reaction(stop)
//!     .build();
//!
//! trigger.attach(TriggerServices::new(bot, store));
//! let message = trigger.check(message).await?;
//! trigger.react(message).await?;
//! ```

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use futures::future::join_all;
use herald_core::{BoxedBot, BoxedStore, Guild, Message, MessageContext};
use parking_lot::RwLock;
use rand::Rng;
use tracing::{debug, trace, warn};

use crate::error::{Rejection, TriggerError, TriggerResult};
use crate::guard;
use crate::matcher::{self, first_token, strip_text};
use crate::options::{CommandOptions, TriggerOptions};
use crate::prefix::{DEFAULT_PREFIX, fetch_prefix};
use crate::reaction::{Reaction, ReactionMap, ReactionSet};

// ============================================================================
// Services
// ============================================================================

/// Collaborators a trigger needs at dispatch time.
#[derive(Clone)]
pub struct TriggerServices {
    /// The messaging surface.
    pub bot: BoxedBot,
    /// The configuration store holding guild prefixes.
    pub store: BoxedStore,
    /// Prefix used for direct messages and for guilds seen the first time.
    pub default_prefix: String,
}

impl TriggerServices {
    /// Creates services with the [`DEFAULT_PREFIX`].
    pub fn new(bot: BoxedBot, store: BoxedStore) -> Self {
        Self {
            bot,
            store,
            default_prefix: DEFAULT_PREFIX.to_string(),
        }
    }

    /// Sets the default prefix (builder pattern).
    pub fn with_default_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.default_prefix = prefix.into();
        self
    }
}

impl fmt::Debug for TriggerServices {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TriggerServices")
            .field("bot", &self.bot.id())
            .field("default_prefix", &self.default_prefix)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Trigger
// ============================================================================

/// Sub-token selecting the default reactions.
const DEFAULT_TOKEN: &str = "default";

/// A command feature: guards plus the reactions they protect.
pub struct Trigger {
    name: String,
    reactions: ReactionMap,
    options: RwLock<TriggerOptions>,
    enabled: AtomicBool,
    services: OnceLock<TriggerServices>,
}

impl Trigger {
    /// Creates a trigger and binds every reaction to it.
    pub fn new(name: impl Into<String>, reactions: ReactionMap, options: TriggerOptions) -> Arc<Self> {
        let name = name.into();
        Arc::new_cyclic(|weak| {
            for reaction in reactions.iter() {
                reaction.bind(weak.clone());
            }
            Self {
                name,
                reactions,
                options: RwLock::new(options),
                enabled: AtomicBool::new(true),
                services: OnceLock::new(),
            }
        })
    }

    /// Creates a builder.
    pub fn builder(name: impl Into<String>) -> TriggerBuilder {
        TriggerBuilder::new(name)
    }

    /// Returns the trigger name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the reactions.
    pub fn reactions(&self) -> &ReactionMap {
        &self.reactions
    }

    /// Returns a snapshot of the current options.
    pub fn options(&self) -> TriggerOptions {
        self.options.read().clone()
    }

    /// Overwrites the option fields set in `patch`.
    pub fn patch_options(&self, patch: TriggerOptions) {
        self.options.write().merge(patch);
        debug!(trigger = %self.name, "Trigger options patched");
    }

    /// Enables the trigger. Returns the new state.
    pub fn enable(&self) -> bool {
        self.enabled.store(true, Ordering::Relaxed);
        true
    }

    /// Disables the trigger. Returns the new state.
    pub fn disable(&self) -> bool {
        self.enabled.store(false, Ordering::Relaxed);
        false
    }

    /// Returns `true` if the trigger is enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    // ------------------------------------------------------------------------
    // Services
    // ------------------------------------------------------------------------

    /// Gives the trigger its collaborators. Only the first call has an
    /// effect; returns `false` if services were already attached.
    pub fn attach(&self, services: TriggerServices) -> bool {
        if self.services.set(services).is_err() {
            warn!(trigger = %self.name, "Trigger services are already attached");
            return false;
        }
        true
    }

    /// Returns `true` once services are attached.
    pub fn is_attached(&self) -> bool {
        self.services.get().is_some()
    }

    /// Returns the attached services.
    pub fn services(&self) -> TriggerResult<&TriggerServices> {
        self.services
            .get()
            .ok_or_else(|| TriggerError::Detached(self.name.clone()))
    }

    /// Returns the messaging surface.
    pub fn bot(&self) -> TriggerResult<BoxedBot> {
        Ok(Arc::clone(&self.services()?.bot))
    }

    /// Returns the configuration store.
    pub fn store(&self) -> TriggerResult<BoxedStore> {
        Ok(Arc::clone(&self.services()?.store))
    }

    /// Resolves the command prefix for `guild` (`None` for direct messages).
    pub async fn prefix_for(&self, guild: Option<&Guild>) -> TriggerResult<String> {
        let services = self.services()?;
        Ok(fetch_prefix(services.store.as_ref(), guild, &services.default_prefix).await?)
    }

    /// Builds a sample invocation of this trigger, e.g. `!audio play`.
    ///
    /// Without command options a random word stands in for the command.
    pub async fn sample_command(&self, guild: Option<&Guild>, sub: Option<&str>) -> TriggerResult<String> {
        let command = self.options().command;
        let prefix = self.sample_prefix(command.as_ref(), guild).await?;
        Ok(compose_sample(&prefix, command.as_ref(), sub))
    }

    async fn sample_prefix(
        &self,
        command: Option<&CommandOptions>,
        guild: Option<&Guild>,
    ) -> TriggerResult<String> {
        if command.is_some_and(|c| c.ignore_prefix) {
            Ok(String::new())
        } else {
            self.prefix_for(guild).await
        }
    }

    // ------------------------------------------------------------------------
    // Guard chain
    // ------------------------------------------------------------------------

    /// Runs the guard chain.
    ///
    /// Returns the message with the matched command stripped, or the error
    /// of the first guard that refused it.
    pub async fn check(self: &Arc<Self>, mut message: Message) -> TriggerResult<Message> {
        if !self.is_enabled() {
            return Err(Rejection::Disabled.into());
        }
        let options = self.options();

        self.check_command(options.command.as_ref(), &mut message)
            .await?;
        guard::check_channel(options.channels.as_ref(), &message)?;
        guard::check_roles(options.roles.as_ref(), &message)?;
        guard::check_permissions(options.required_permissions.as_deref(), &message)?;
        if let Some(condition) = &options.condition {
            condition.evaluate(&message, self).await?;
        }

        trace!(trigger = %self.name, content = %message.content, "Guards passed");
        Ok(message)
    }

    /// Returns `true` if `message` passes the command guard, without
    /// touching its content.
    pub async fn addresses(&self, message: &Message) -> TriggerResult<bool> {
        let command = self.options().command;
        let mut probe = message.clone();
        match self.check_command(command.as_ref(), &mut probe).await {
            Ok(()) => Ok(true),
            Err(e) if e.is_no_match() => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn check_command(
        &self,
        command: Option<&CommandOptions>,
        message: &mut Message,
    ) -> TriggerResult<()> {
        let Some(command) = command else {
            return Ok(());
        };
        let prefix = if command.ignore_prefix {
            String::new()
        } else {
            self.prefix_for(message.guild.as_ref()).await?
        };

        let matched = command
            .command
            .iter()
            .map(|alias| format!("{prefix}{alias}"))
            .find(|candidate| matcher::matches(&message.content, candidate, command.match_mode));

        match matched {
            Some(candidate) => {
                message.content = strip_text(&message.content, &candidate);
                Ok(())
            }
            None => Err(TriggerError::no_match()),
        }
    }

    // ------------------------------------------------------------------------
    // Reactions
    // ------------------------------------------------------------------------

    /// Runs the reactions selected by the message's first token.
    ///
    /// An empty content or the literal token `default` selects the default
    /// reactions; the content is then left as is.
    ///
    /// Selected reactions run concurrently. All of them are driven to
    /// completion; the first error in registration order is returned.
    /// Returns the number of reactions run.
    pub async fn react(self: &Arc<Self>, mut message: Message) -> TriggerResult<usize> {
        let token = first_token(&message.content)
            .unwrap_or(DEFAULT_TOKEN)
            .to_string();
        if token == DEFAULT_TOKEN {
            return self.react_default(message).await;
        }
        message.content = strip_text(&message.content, &token);

        let Some(sub) = &self.reactions.sub else {
            return Err(match self.reactions.default {
                None => TriggerError::NoMatch(Some(format!(
                    "No reactions defined for <{}>",
                    self.command_label()
                ))),
                Some(_) => Rejection::InvalidArgument(token).into(),
            });
        };

        let selected: Vec<Arc<Reaction>> = sub
            .eligible(message.context())
            .into_iter()
            .filter(|r| r.name() == token)
            .collect();
        debug!(trigger = %self.name, sub = %token, count = selected.len(), "Running sub reactions");
        run_all(selected, Arc::new(message)).await
    }

    async fn react_default(self: &Arc<Self>, message: Message) -> TriggerResult<usize> {
        let context = message.context();

        let defaults = self.reactions.default.as_ref().map(|set| set.eligible(context));
        if let Some(defaults) = defaults.filter(|d| !d.is_empty()) {
            debug!(trigger = %self.name, count = defaults.len(), "Running default reactions");
            return run_all(defaults, Arc::new(message)).await;
        }

        if context == MessageContext::Guild
            && let Some(sub) = &self.reactions.sub
        {
            let subs = sub.eligible(context);
            if !subs.is_empty() {
                return Err(self.not_standalone(&subs, message.guild.as_ref()).await);
            }
        }

        if self.reactions.is_empty() {
            Err(Rejection::NotACommand.into())
        } else {
            Err(Rejection::UnsupportedContext(context).into())
        }
    }

    async fn not_standalone(&self, subs: &[Arc<Reaction>], guild: Option<&Guild>) -> TriggerError {
        let command = self.options().command;
        let prefix = match self.sample_prefix(command.as_ref(), guild).await {
            Ok(prefix) => prefix,
            Err(e) => return e,
        };
        let suggestions = subs
            .iter()
            .map(|r| compose_sample(&prefix, command.as_ref(), Some(r.name())))
            .collect();
        Rejection::NotStandalone { suggestions }.into()
    }

    fn command_label(&self) -> String {
        self.options
            .read()
            .command
            .as_ref()
            .map(|c| c.command.join(","))
            .unwrap_or_default()
    }
}

impl fmt::Debug for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Trigger")
            .field("name", &self.name)
            .field("enabled", &self.is_enabled())
            .field("reactions", &self.reactions)
            .field("attached", &self.is_attached())
            .finish()
    }
}

async fn run_all(reactions: Vec<Arc<Reaction>>, message: Arc<Message>) -> TriggerResult<usize> {
    let results = join_all(reactions.iter().map(|r| r.execute(Arc::clone(&message)))).await;
    match results.into_iter().find_map(Result::err) {
        Some(e) => Err(e),
        None => Ok(reactions.len()),
    }
}

fn compose_sample(prefix: &str, command: Option<&CommandOptions>, sub: Option<&str>) -> String {
    let alias = command
        .and_then(CommandOptions::primary)
        .map(str::to_string)
        .unwrap_or_else(random_word);
    match sub {
        Some(sub) => format!("{prefix}{alias} {sub}"),
        None => format!("{prefix}{alias}"),
    }
}

fn random_word() -> String {
    let mut rng = rand::rng();
    let len = rng.random_range(4..=8);
    (0..len)
        .map(|_| char::from(b'a' + rng.random_range(0..26u8)))
        .collect()
}

// ============================================================================
// Builder
// ============================================================================

/// Builder for [`Trigger`].
#[derive(Debug)]
pub struct TriggerBuilder {
    name: String,
    reactions: ReactionMap,
    options: TriggerOptions,
    enabled: bool,
}

impl TriggerBuilder {
    /// Creates a builder for a trigger with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            reactions: ReactionMap::default(),
            options: TriggerOptions::default(),
            enabled: true,
        }
    }

    /// Sets the options.
    pub fn options(mut self, options: TriggerOptions) -> Self {
        self.options = options;
        self
    }

    /// Replaces the whole reaction map.
    pub fn reactions(mut self, reactions: ReactionMap) -> Self {
        self.reactions = reactions;
        self
    }

    /// Adds a reaction run when there is no sub-command.
    pub fn default_reaction(mut self, reaction: Reaction) -> Self {
        let set = self.reactions.default.take().unwrap_or_default();
        self.reactions.default = Some(set.with(reaction));
        self
    }

    /// Adds a sub-command reaction.
    pub fn sub_reaction(mut self, reaction: Reaction) -> Self {
        let set: ReactionSet = self.reactions.sub.take().unwrap_or_default();
        self.reactions.sub = Some(set.with(reaction));
        self
    }

    /// Starts the trigger disabled.
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Builds the trigger.
    pub fn build(self) -> Arc<Trigger> {
        let trigger = Trigger::new(self.name, self.reactions, self.options);
        if !self.enabled {
            trigger.disable();
        }
        trigger
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{Condition, Filter};
    use crate::reaction::{ReactionContext, ReactionScope};
    use crate::testing::{MockBot, direct_message, guild_message, recording, services};
    use herald_core::{ConfigStore, Member, MemoryStore, Permission};
    use parking_lot::Mutex;
    use serde_json::json;
    use std::sync::atomic::AtomicUsize;

    fn attached(trigger: Arc<Trigger>) -> Arc<Trigger> {
        let bot = Arc::new(MockBot::default());
        trigger.attach(services(&bot, &MemoryStore::new()));
        trigger
    }

    fn todo_trigger(log: &Arc<Mutex<Vec<String>>>) -> Arc<Trigger> {
        attached(
            Trigger::builder("todo")
                .options(TriggerOptions::new().command(CommandOptions::starts_with(["todo", "t"])))
                .sub_reaction(recording("add", ReactionScope::All, log))
                .sub_reaction(recording("list", ReactionScope::Guild, log))
                .build(),
        )
    }

    #[tokio::test]
    async fn test_ping_runs_default_reactions() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let trigger = attached(
            Trigger::builder("ping")
                .options(TriggerOptions::new().command(CommandOptions::starts_with(["ping"])))
                .default_reaction(recording("pong", ReactionScope::All, &log))
                .build(),
        );

        let message = trigger.check(guild_message("!ping")).await.unwrap();
        assert_eq!(message.content, "");

        let ran = trigger.react(message).await.unwrap();
        assert_eq!(ran, 1);
        assert_eq!(*log.lock(), vec!["pong:".to_string()]);
    }

    #[tokio::test]
    async fn test_default_token_runs_default_reactions() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let trigger = attached(
            Trigger::builder("ping")
                .options(TriggerOptions::new().command(CommandOptions::starts_with(["ping"])))
                .default_reaction(recording("pong", ReactionScope::All, &log))
                .build(),
        );

        let message = trigger.check(guild_message("!ping default")).await.unwrap();
        assert_eq!(message.content, "default");

        assert_eq!(trigger.react(message).await.unwrap(), 1);
        assert_eq!(*log.lock(), vec!["pong:default".to_string()]);
    }

    #[tokio::test]
    async fn test_sub_reaction_receives_remaining_content() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let trigger = todo_trigger(&log);

        let message = trigger.check(guild_message("!todo add foo")).await.unwrap();
        assert_eq!(message.content, "add foo");

        assert_eq!(trigger.react(message).await.unwrap(), 1);
        assert_eq!(*log.lock(), vec!["add:foo".to_string()]);
    }

    #[tokio::test]
    async fn test_sub_only_trigger_in_direct_message() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let trigger = todo_trigger(&log);

        let message = trigger.check(direct_message("!todo")).await.unwrap();
        let err = trigger.react(message).await.unwrap_err();
        assert_eq!(
            err.user_message().as_deref(),
            Some("You cannot use this command in direct messages")
        );
        assert!(log.lock().is_empty());
    }

    #[tokio::test]
    async fn test_sub_only_trigger_suggests_sub_commands() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let trigger = todo_trigger(&log);

        let message = trigger.check(guild_message("!t")).await.unwrap();
        let err = trigger.react(message).await.unwrap_err();
        assert_eq!(
            err.rejection(),
            Some(&Rejection::NotStandalone {
                suggestions: vec!["!todo add".into(), "!todo list".into()],
            })
        );
    }

    #[tokio::test]
    async fn test_guild_only_subs_skip_direct_messages() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let trigger = todo_trigger(&log);

        let message = trigger.check(direct_message("!todo list")).await.unwrap();
        assert_eq!(trigger.react(message).await.unwrap(), 0);
        assert!(log.lock().is_empty());
    }

    #[tokio::test]
    async fn test_direct_only_handlers_in_guild() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let trigger = attached(
            Trigger::builder("whisper")
                .default_reaction(recording("dm", ReactionScope::Direct, &log))
                .build(),
        );

        let err = trigger.react(guild_message("")).await.unwrap_err();
        assert_eq!(
            err.rejection(),
            Some(&Rejection::UnsupportedContext(MessageContext::Guild))
        );
        assert_eq!(trigger.react(direct_message("")).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_unknown_token() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let trigger = attached(
            Trigger::builder("ping")
                .default_reaction(recording("pong", ReactionScope::All, &log))
                .build(),
        );
        let err = trigger.react(guild_message("plya")).await.unwrap_err();
        assert_eq!(
            err.rejection(),
            Some(&Rejection::InvalidArgument("plya".into()))
        );

        let empty = attached(
            Trigger::builder("empty")
                .options(TriggerOptions::new().command(CommandOptions::starts_with(["empty"])))
                .build(),
        );
        let err = empty.react(guild_message("x")).await.unwrap_err();
        assert!(err.is_no_match());
        assert_eq!(
            err.to_string(),
            "trigger did not match: No reactions defined for <empty>"
        );

        let err = empty.react(guild_message("")).await.unwrap_err();
        assert_eq!(err.rejection(), Some(&Rejection::NotACommand));
    }

    #[tokio::test]
    async fn test_command_mismatch_is_silent() {
        let trigger = attached(
            Trigger::builder("ping")
                .options(TriggerOptions::new().command(CommandOptions::starts_with(["ping"])))
                .build(),
        );
        for content in ["!pingx", "ping", "hello !ping"] {
            let err = trigger.check(guild_message(content)).await.unwrap_err();
            assert!(err.is_no_match(), "{content}");
        }
    }

    #[tokio::test]
    async fn test_stored_prefix_and_ignore_prefix() {
        let bot = Arc::new(MockBot::default());
        let store = MemoryStore::new();
        store.store(json!({ "prefix": "?" }), "guilds/g1").await.unwrap();

        let trigger = Trigger::builder("ping")
            .options(TriggerOptions::new().command(CommandOptions::starts_with(["ping"])))
            .build();
        trigger.attach(services(&bot, &store));

        assert!(trigger.check(guild_message("!ping")).await.unwrap_err().is_no_match());
        assert!(trigger.check(guild_message("?ping")).await.is_ok());
        // direct messages use the default prefix
        assert!(trigger.check(direct_message("!ping")).await.is_ok());

        let bare = Trigger::builder("hello")
            .options(TriggerOptions::new().command(CommandOptions::contains(["hello"]).ignore_prefix(true)))
            .build();
        bare.attach(services(&bot, &store));
        let message = bare.check(guild_message("well hello there")).await.unwrap();
        assert_eq!(message.content, "well there");
    }

    #[tokio::test]
    async fn test_first_visit_stores_default_prefix() {
        let bot = Arc::new(MockBot::default());
        let store = MemoryStore::new();
        let trigger = Trigger::builder("ping")
            .options(TriggerOptions::new().command(CommandOptions::equals(["ping"])))
            .build();
        trigger.attach(services(&bot, &store).with_default_prefix("."));

        assert!(trigger.check(guild_message(".ping")).await.is_ok());
        assert_eq!(store.get("guilds/g1"), Some(json!({ "prefix": "." })));
    }

    #[tokio::test]
    async fn test_disabled_trigger_rejects() {
        let trigger = attached(Trigger::builder("ping").disabled().build());
        assert!(!trigger.is_enabled());

        let err = trigger.check(guild_message("anything")).await.unwrap_err();
        assert_eq!(err.rejection(), Some(&Rejection::Disabled));

        assert!(trigger.enable());
        assert!(trigger.check(guild_message("anything")).await.is_ok());
        assert!(!trigger.disable());
    }

    #[tokio::test]
    async fn test_guard_order() {
        let trigger = attached(
            Trigger::builder("ban")
                .options(
                    TriggerOptions::new()
                        .channels(Filter::new().exclude(["c1"]))
                        .roles(Filter::new().include(["mod"]))
                        .required_permissions([Permission::BanMembers]),
                )
                .build(),
        );

        // channel is checked before the missing member
        let err = trigger.check(guild_message("x")).await.unwrap_err();
        assert_eq!(err.rejection(), Some(&Rejection::ForbiddenChannel));

        trigger.patch_options(TriggerOptions::new().channels(Filter::new()));
        let err = trigger.check(guild_message("x")).await.unwrap_err();
        assert_eq!(
            err.rejection(),
            Some(&Rejection::UnknownAuthor { checking: "roles" })
        );

        // role is checked before permission
        let member = Member::new().with_permission(Permission::BanMembers);
        let err = trigger
            .check(guild_message("x").with_member(member))
            .await
            .unwrap_err();
        assert_eq!(err.rejection(), Some(&Rejection::MissingRole));

        let member = Member::new().with_role("mod");
        let err = trigger
            .check(guild_message("x").with_member(member))
            .await
            .unwrap_err();
        assert_eq!(err.rejection(), Some(&Rejection::MissingPermission));

        let member = Member::new()
            .with_role("mod")
            .with_permission(Permission::Administrator);
        assert!(trigger.check(guild_message("x").with_member(member)).await.is_ok());
    }

    #[tokio::test]
    async fn test_custom_conditions() {
        let trigger = attached(
            Trigger::builder("secret")
                .options(TriggerOptions::new().condition(Condition::new(|message, _trigger| {
                    if message.content.contains("please") {
                        Ok(())
                    } else {
                        Err(TriggerError::verbose("Say please"))
                    }
                })))
                .build(),
        );
        assert!(trigger.check(guild_message("please")).await.is_ok());
        let err = trigger.check(guild_message("now")).await.unwrap_err();
        assert_eq!(err.user_message().as_deref(), Some("Say please"));

        trigger.patch_options(TriggerOptions::new().condition(Condition::from_async(
            |_message, trigger: Arc<Trigger>| async move {
                if trigger.name() == "secret" {
                    Err(TriggerError::no_match())
                } else {
                    Ok(())
                }
            },
        )));
        assert!(trigger.check(guild_message("please")).await.unwrap_err().is_no_match());
    }

    #[tokio::test]
    async fn test_patch_options_changes_command() {
        let trigger = attached(
            Trigger::builder("ping")
                .options(TriggerOptions::new().command(CommandOptions::starts_with(["ping"])))
                .build(),
        );
        trigger.patch_options(TriggerOptions::new().command(CommandOptions::starts_with(["p"])));

        assert!(trigger.check(guild_message("!ping")).await.unwrap_err().is_no_match());
        assert!(trigger.check(guild_message("!p")).await.is_ok());
    }

    #[tokio::test]
    async fn test_detached_trigger() {
        let trigger = Trigger::builder("ping")
            .options(TriggerOptions::new().command(CommandOptions::starts_with(["ping"])))
            .build();
        let err = trigger.check(guild_message("!ping")).await.unwrap_err();
        assert!(matches!(err, TriggerError::Detached(name) if name == "ping"));
    }

    #[test]
    fn test_reactions_are_bound_to_their_trigger() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let trigger = todo_trigger(&log);
        for reaction in trigger.reactions().iter() {
            let owner = reaction.trigger().unwrap();
            assert!(Arc::ptr_eq(&owner, &trigger));
        }
    }

    #[test]
    fn test_attach_is_set_once() {
        let bot = Arc::new(MockBot::default());
        let trigger = Trigger::builder("ping").build();
        assert!(trigger.bot().is_err());
        assert!(trigger.attach(services(&bot, &MemoryStore::new())));
        assert!(!trigger.attach(services(&bot, &MemoryStore::new())));
        assert_eq!(trigger.bot().unwrap().id(), "mock");
    }

    #[tokio::test]
    async fn test_fan_out_runs_every_reaction_and_reports_first_error() {
        let runs = Arc::new(AtomicUsize::new(0));
        let failing = |name: &'static str| {
            let runs = Arc::clone(&runs);
            Reaction::new(name, ReactionScope::All, move |_ctx: ReactionContext| {
                let runs = Arc::clone(&runs);
                async move {
                    runs.fetch_add(1, Ordering::SeqCst);
                    Err(TriggerError::verbose(format!("{name} failed")))
                }
            })
        };
        let log = Arc::new(Mutex::new(Vec::new()));
        let trigger = attached(
            Trigger::builder("multi")
                .default_reaction(failing("first"))
                .default_reaction(recording("ok", ReactionScope::All, &log))
                .default_reaction(failing("second"))
                .build(),
        );

        let err = trigger.react(guild_message("")).await.unwrap_err();
        assert_eq!(err.user_message().as_deref(), Some("first failed"));
        assert_eq!(runs.load(Ordering::SeqCst), 2);
        assert_eq!(log.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_pre_step_feeds_handler() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let trigger = attached(
            Trigger::builder("roll")
                .sub_reaction(Reaction::with_pre(
                    "d",
                    ReactionScope::All,
                    |ctx: ReactionContext| async move {
                        ctx.content()
                            .parse::<u32>()
                            .map_err(|_| TriggerError::verbose("Not a number"))
                    },
                    move |_ctx: ReactionContext, sides: u32| {
                        let sink = Arc::clone(&sink);
                        async move {
                            sink.lock().push(sides);
                            Ok(())
                        }
                    },
                ))
                .build(),
        );

        assert_eq!(trigger.react(guild_message("d 6")).await.unwrap(), 1);
        assert_eq!(*seen.lock(), vec![6]);

        let err = trigger.react(guild_message("d six")).await.unwrap_err();
        assert_eq!(err.user_message().as_deref(), Some("Not a number"));
        assert_eq!(seen.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_reply_goes_through_bot() {
        let bot = Arc::new(MockBot::default());
        let trigger = Trigger::builder("ping")
            .default_reaction(Reaction::new(
                "pong",
                ReactionScope::All,
                |ctx: ReactionContext| async move {
                    ctx.reply("pong!").await?;
                    Ok(())
                },
            ))
            .build();
        trigger.attach(services(&bot, &MemoryStore::new()));

        trigger.react(guild_message("")).await.unwrap();
        assert_eq!(bot.sent(), vec![("c1".to_string(), "pong!".to_string())]);
    }

    #[tokio::test]
    async fn test_sample_command() {
        let trigger = attached(
            Trigger::builder("audio")
                .options(TriggerOptions::new().command(CommandOptions::starts_with(["audio", "a"])))
                .build(),
        );
        let guild = Guild::new("g1", "home");
        assert_eq!(
            trigger.sample_command(Some(&guild), Some("play")).await.unwrap(),
            "!audio play"
        );
        assert_eq!(trigger.sample_command(None, None).await.unwrap(), "!audio");

        let anonymous = attached(Trigger::builder("any").build());
        let sample = anonymous.sample_command(None, Some("go")).await.unwrap();
        let word = sample
            .strip_prefix('!')
            .and_then(|s| s.strip_suffix(" go"))
            .unwrap();
        assert!((4..=8).contains(&word.len()));
        assert!(word.chars().all(|c| c.is_ascii_lowercase()));
    }
}
