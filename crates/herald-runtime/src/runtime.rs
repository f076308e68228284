//! Runtime orchestration.
//!
//! [`HeraldRuntime`] ties configuration, logging and the [`Dispatcher`]
//! together. The chat client feeds inbound messages through an mpsc channel;
//! each message is dispatched on its own task.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use herald_runtime::HeraldRuntime;
//!
//! let runtime = HeraldRuntime::builder()
//!     .config_file("herald.toml")
//!     .build(bot, store)?;
//!
//! runtime.register(ping_trigger())?;
//! runtime.register(audio_trigger())?;
//!
//! // Runs until the client drops its sender, or Ctrl+C / SIGTERM
//! runtime.run(inbound_rx).await?;
//! ```

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use herald_core::{BoxedBot, BoxedStore, Message};
use herald_framework::{DispatchReport, Dispatcher, Trigger, TriggerServices};
use tokio::signal;
use tokio::sync::mpsc;
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, error, info, trace, warn};

use crate::config::{ConfigLoader, HeraldConfig, TriggerOverride};
use crate::error::{RuntimeError, RuntimeResult};
use crate::logging;

/// Message counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RuntimeStats {
    /// Registered triggers.
    pub triggers: usize,
    /// Messages received.
    pub received: u64,
    /// Messages dropped before dispatch (bot authors).
    pub ignored: u64,
}

#[derive(Debug, Default)]
struct Counters {
    received: AtomicU64,
    ignored: AtomicU64,
}

/// The Herald runtime.
pub struct HeraldRuntime {
    config: HeraldConfig,
    dispatcher: Dispatcher,
    counters: Arc<Counters>,
}

impl HeraldRuntime {
    /// Creates a runtime builder that loads configuration with figment.
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Creates a runtime from configuration.
    ///
    /// Initializes logging from `config.logging` unless a subscriber is
    /// already installed.
    pub fn from_config(config: HeraldConfig, bot: BoxedBot, store: BoxedStore) -> Self {
        logging::init_from_config(&config.logging);

        let services = TriggerServices::new(bot, store)
            .with_default_prefix(config.bot.default_prefix.clone());

        info!(
            log_level = %config.logging.level,
            default_prefix = %config.bot.default_prefix,
            overrides = config.triggers.len(),
            "Runtime initialized from configuration"
        );

        Self {
            config,
            dispatcher: Dispatcher::new(services),
            counters: Arc::new(Counters::default()),
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &HeraldConfig {
        &self.config
    }

    /// Returns the dispatcher.
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Returns a snapshot of the counters.
    pub fn stats(&self) -> RuntimeStats {
        RuntimeStats {
            triggers: self.dispatcher.trigger_count(),
            received: self.counters.received.load(Ordering::Relaxed),
            ignored: self.counters.ignored.load(Ordering::Relaxed),
        }
    }

    /// Registers a trigger, applying the configured override with the same
    /// name.
    pub fn register(&self, trigger: Arc<Trigger>) -> RuntimeResult<()> {
        if self.dispatcher.find(trigger.name()).is_some() {
            return Err(RuntimeError::DuplicateTrigger(trigger.name().to_string()));
        }

        if let Some(over) = self.config.triggers.get(trigger.name()) {
            apply_override(&trigger, over);
        }
        self.dispatcher.register(trigger);
        Ok(())
    }

    /// Registers several triggers.
    pub fn register_all(
        &self,
        triggers: impl IntoIterator<Item = Arc<Trigger>>,
    ) -> RuntimeResult<()> {
        triggers.into_iter().try_for_each(|t| self.register(t))
    }

    /// Dispatches one message on its own task.
    pub fn handle_message(&self, message: Message) -> JoinHandle<DispatchReport> {
        tokio::spawn(self.dispatch_task(message))
    }

    fn dispatch_task(&self, message: Message) -> impl Future<Output = DispatchReport> + Send + use<> {
        dispatch_one(
            self.dispatcher.clone(),
            Arc::clone(&self.counters),
            self.config.bot.ignore_bots,
            message,
        )
    }

    /// Consumes inbound messages until the sender side closes or a shutdown
    /// signal (Ctrl+C, SIGTERM) arrives.
    pub async fn run(&self, inbound: mpsc::Receiver<Message>) -> RuntimeResult<()> {
        self.run_until(inbound, async {
            if let Err(e) = wait_for_shutdown().await {
                error!(error = %e, "Shutdown signal unavailable, running until the inbound channel closes");
                std::future::pending::<()>().await;
            }
        })
        .await
    }

    /// Consumes inbound messages until the sender side closes or `shutdown`
    /// completes. In-flight dispatches are awaited before returning.
    pub async fn run_until<F>(&self, mut inbound: mpsc::Receiver<Message>, shutdown: F) -> RuntimeResult<()>
    where
        F: Future<Output = ()>,
    {
        let mut tasks = JoinSet::new();
        tokio::pin!(shutdown);

        info!(triggers = self.dispatcher.trigger_count(), "Herald runtime started");

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutdown requested");
                    break;
                }
                message = inbound.recv() => match message {
                    Some(message) => {
                        tasks.spawn(self.dispatch_task(message));
                    }
                    None => {
                        debug!("Inbound channel closed");
                        break;
                    }
                },
                Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                    log_join(joined);
                }
            }
        }

        while let Some(joined) = tasks.join_next().await {
            log_join(joined);
        }

        info!(stats = ?self.stats(), "Herald runtime stopped");
        Ok(())
    }
}

impl std::fmt::Debug for HeraldRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeraldRuntime")
            .field("dispatcher", &self.dispatcher)
            .field("stats", &self.stats())
            .finish()
    }
}

/// Applies a configured override to a trigger.
pub fn apply_override(trigger: &Trigger, over: &TriggerOverride) {
    match over.enabled {
        Some(true) => {
            trigger.enable();
        }
        Some(false) => {
            trigger.disable();
        }
        None => {}
    }
    if over.patches_options() {
        trigger.patch_options(over.to_options());
    }
    debug!(trigger = %trigger.name(), enabled = trigger.is_enabled(), "Applied configuration override");
}

async fn dispatch_one(
    dispatcher: Dispatcher,
    counters: Arc<Counters>,
    ignore_bots: bool,
    message: Message,
) -> DispatchReport {
    counters.received.fetch_add(1, Ordering::Relaxed);
    if ignore_bots && message.author.bot {
        counters.ignored.fetch_add(1, Ordering::Relaxed);
        trace!(author = %message.author.id, "Ignoring message from bot");
        return DispatchReport::default();
    }
    dispatcher.dispatch(message).await
}

fn log_join(joined: Result<DispatchReport, tokio::task::JoinError>) {
    match joined {
        Ok(report) => trace!(?report, "Dispatch task finished"),
        Err(e) => warn!(error = %e, "Dispatch task did not complete"),
    }
}

/// Waits for Ctrl+C or, on unix, SIGTERM.
async fn wait_for_shutdown() -> RuntimeResult<()> {
    #[cfg(unix)]
    {
        let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate())?;

        tokio::select! {
            result = signal::ctrl_c() => {
                result?;
                info!("Received Ctrl+C, shutting down");
            }
            _ = sigterm.recv() => {
                info!("Received SIGTERM, shutting down");
            }
        }
    }

    #[cfg(not(unix))]
    {
        signal::ctrl_c().await?;
        info!("Received Ctrl+C, shutting down");
    }

    Ok(())
}

// =============================================================================
// RuntimeBuilder
// =============================================================================

/// Builder loading configuration before creating a [`HeraldRuntime`].
#[derive(Default)]
pub struct RuntimeBuilder {
    loader: ConfigLoader,
}

impl RuntimeBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a specific configuration file.
    pub fn config_file<P: AsRef<std::path::Path>>(mut self, path: P) -> Self {
        self.loader = self.loader.file(path);
        self
    }

    /// Sets the configuration profile.
    pub fn profile(mut self, profile: impl Into<String>) -> Self {
        self.loader = self.loader.profile(profile);
        self
    }

    /// Adds a configuration search path.
    pub fn search_path<P: AsRef<std::path::Path>>(mut self, path: P) -> Self {
        self.loader = self.loader.search_path(path);
        self
    }

    /// Disables environment variable overrides.
    pub fn without_env(mut self) -> Self {
        self.loader = self.loader.without_env();
        self
    }

    /// Merges configuration programmatically.
    pub fn merge(mut self, config: HeraldConfig) -> Self {
        self.loader = self.loader.merge(config);
        self
    }

    /// Loads the configuration and creates the runtime.
    pub fn build(self, bot: BoxedBot, store: BoxedStore) -> RuntimeResult<HeraldRuntime> {
        let config = self.loader.load()?;
        Ok(HeraldRuntime::from_config(config, bot, store))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::any::Any;

    use async_trait::async_trait;
    use herald_core::{ApiResult, Author, Bot, Guild, MemoryStore};
    use herald_framework::{
        CommandOptions, Reaction, ReactionContext, ReactionScope, TriggerOptions,
    };
    use parking_lot::Mutex;

    #[derive(Default)]
    struct MockBot {
        sent: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl Bot for MockBot {
        fn id(&self) -> &str {
            "mock"
        }

        async fn send(&self, channel_id: &str, content: &str) -> ApiResult<String> {
            let mut sent = self.sent.lock();
            sent.push((channel_id.to_string(), content.to_string()));
            Ok(sent.len().to_string())
        }

        async fn edit(&self, _channel_id: &str, _message_id: &str, _content: &str) -> ApiResult<()> {
            Ok(())
        }

        fn as_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
            self
        }
    }

    fn ping() -> Arc<Trigger> {
        Trigger::builder("ping")
            .options(TriggerOptions::new().command(CommandOptions::starts_with(["ping"])))
            .default_reaction(Reaction::new(
                "pong",
                ReactionScope::All,
                |ctx: ReactionContext| async move {
                    ctx.reply("pong!").await?;
                    Ok(())
                },
            ))
            .build()
    }

    fn message(content: &str) -> Message {
        Message::guild(
            "m1",
            "c1",
            Guild::new("g1", "home"),
            Author::new("u1", "alice"),
            content,
        )
    }

    fn runtime(config: HeraldConfig) -> (Arc<MockBot>, HeraldRuntime) {
        let bot = Arc::new(MockBot::default());
        let runtime = HeraldRuntime::from_config(config, bot.clone(), Arc::new(MemoryStore::new()));
        (bot, runtime)
    }

    #[tokio::test]
    async fn test_handle_message() {
        let (bot, runtime) = runtime(HeraldConfig::default());
        runtime.register(ping()).unwrap();

        let report = runtime.handle_message(message("!ping")).await.unwrap();
        assert_eq!(report.matched, 1);
        assert_eq!(
            bot.sent.lock().clone(),
            vec![("c1".to_string(), "pong!".to_string())]
        );
    }

    #[tokio::test]
    async fn test_bot_authors_are_ignored() {
        let (bot, runtime) = runtime(HeraldConfig::default());
        runtime.register(ping()).unwrap();

        let mut from_bot = message("!ping");
        from_bot.author.bot = true;
        let report = runtime.handle_message(from_bot).await.unwrap();

        assert_eq!(report, DispatchReport::default());
        assert!(bot.sent.lock().is_empty());
        assert_eq!(runtime.stats().ignored, 1);
        assert_eq!(runtime.stats().received, 1);
    }

    #[tokio::test]
    async fn test_config_prefix_and_overrides() {
        let mut config = HeraldConfig::default();
        config.bot.default_prefix = "?".into();
        config.triggers.insert(
            "ping".into(),
            TriggerOverride {
                enabled: Some(false),
                command: Some(CommandOptions::starts_with(["p"])),
                ..Default::default()
            },
        );
        let (bot, runtime) = runtime(config);
        runtime.register(ping()).unwrap();

        let trigger = runtime.dispatcher().find("ping").unwrap();
        assert!(!trigger.is_enabled());

        let report = runtime.handle_message(message("?p")).await.unwrap();
        assert_eq!(report.rejected, 1);
        assert_eq!(bot.sent.lock()[0].1, "This command is disabled.");

        trigger.enable();
        let report = runtime.handle_message(message("?p")).await.unwrap();
        assert_eq!(report.matched, 1);
    }

    #[test]
    fn test_duplicate_registration() {
        let (_bot, runtime) = runtime(HeraldConfig::default());
        runtime.register(ping()).unwrap();
        assert!(matches!(
            runtime.register(ping()),
            Err(RuntimeError::DuplicateTrigger(name)) if name == "ping"
        ));
        assert_eq!(runtime.stats().triggers, 1);
    }

    #[tokio::test]
    async fn test_run_until_channel_closes() {
        let (bot, runtime) = runtime(HeraldConfig::default());
        runtime.register(ping()).unwrap();

        let (tx, rx) = mpsc::channel(8);
        for _ in 0..3 {
            tx.send(message("!ping")).await.unwrap();
        }
        drop(tx);

        runtime
            .run_until(rx, std::future::pending::<()>())
            .await
            .unwrap();
        assert_eq!(bot.sent.lock().len(), 3);
        assert_eq!(runtime.stats().received, 3);
    }

    #[tokio::test]
    async fn test_run_until_shutdown() {
        let (_bot, runtime) = runtime(HeraldConfig::default());
        let (_tx, rx) = mpsc::channel::<Message>(1);

        tokio_test::assert_ok!(runtime.run_until(rx, async {}).await);
    }

    #[tokio::test]
    async fn test_builder_merges_config() {
        let mut config = HeraldConfig::default();
        config.bot.default_prefix = "$".into();

        let runtime = HeraldRuntime::builder()
            .without_env()
            .search_path(std::env::temp_dir().join("herald-runtime-test-empty"))
            .merge(config)
            .build(Arc::new(MockBot::default()), Arc::new(MemoryStore::new()))
            .unwrap();
        assert_eq!(runtime.config().bot.default_prefix, "$");
        assert_eq!(runtime.dispatcher().services().default_prefix, "$");
    }
}
