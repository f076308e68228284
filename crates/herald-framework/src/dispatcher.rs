//! Message dispatcher for the Herald framework.
//!
//! The [`Dispatcher`] owns the registered [`Trigger`]s and the services they
//! share. For every inbound message each trigger gets its own copy of the
//! message and runs [`check`](Trigger::check) then
//! [`react`](Trigger::react). Outcomes are sorted as follows:
//!
//! - no match: logged at debug level and otherwise ignored
//! - user-facing rejection: replied to the originating channel
//! - anything else: logged as an error
//!
//! ```rust,ignore
//! use herald_framework::{Dispatcher, TriggerServices};
//!
//! let dispatcher = Dispatcher::new(TriggerServices::new(bot, store));
//! dispatcher.register(ping_trigger());
//! dispatcher.register(audio_trigger());
//!
//! let report = dispatcher.dispatch(message).await;
//! ```

use std::convert::Infallible;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::FutureExt;
use futures::future::{BoxFuture, join_all};
use herald_core::Message;
use parking_lot::RwLock;
use tower::Service;
use tracing::{Instrument, Level, debug, error, span, trace};

use crate::error::{Rejection, TriggerError};
use crate::trigger::{Trigger, TriggerServices};

/// What happened to one message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Triggers whose reactions ran without error.
    pub matched: usize,
    /// Triggers that rejected the message with a user-facing reason.
    pub rejected: usize,
    /// Triggers that failed for any other reason.
    pub failed: usize,
}

impl DispatchReport {
    /// Returns `true` if any trigger handled or answered the message.
    pub fn handled(&self) -> bool {
        self.matched + self.rejected > 0
    }
}

enum Outcome {
    Ignored,
    Matched,
    Rejected,
    Failed,
}

/// The central message dispatcher.
///
/// Clones share the same trigger list.
#[derive(Clone)]
pub struct Dispatcher {
    triggers: Arc<RwLock<Vec<Arc<Trigger>>>>,
    services: TriggerServices,
}

impl Dispatcher {
    /// Creates a dispatcher whose triggers will use `services`.
    pub fn new(services: TriggerServices) -> Self {
        Self {
            triggers: Arc::new(RwLock::new(Vec::new())),
            services,
        }
    }

    /// Registers a trigger and attaches the dispatcher's services to it.
    ///
    /// Triggers are run in registration order.
    pub fn register(&self, trigger: Arc<Trigger>) {
        trigger.attach(self.services.clone());
        debug!(trigger = %trigger.name(), "Registered trigger");
        self.triggers.write().push(trigger);
    }

    /// Registers a trigger (builder pattern).
    pub fn with(self, trigger: Arc<Trigger>) -> Self {
        self.register(trigger);
        self
    }

    /// Looks a trigger up by name.
    pub fn find(&self, name: &str) -> Option<Arc<Trigger>> {
        self.triggers
            .read()
            .iter()
            .find(|t| t.name() == name)
            .cloned()
    }

    /// Returns the registered triggers.
    pub fn triggers(&self) -> Vec<Arc<Trigger>> {
        self.triggers.read().clone()
    }

    /// Returns the number of registered triggers.
    pub fn trigger_count(&self) -> usize {
        self.triggers.read().len()
    }

    /// Returns the shared services.
    pub fn services(&self) -> &TriggerServices {
        &self.services
    }

    /// Runs every trigger against `message`.
    pub async fn dispatch(&self, message: Message) -> DispatchReport {
        let span = span!(
            Level::DEBUG,
            "dispatch",
            message = %message.id,
            channel = %message.channel_id,
        );
        let triggers = self.triggers();

        async {
            let outcomes = join_all(
                triggers
                    .iter()
                    .map(|trigger| self.run_trigger(trigger, message.clone())),
            )
            .await;

            let mut report = DispatchReport::default();
            for outcome in outcomes {
                match outcome {
                    Outcome::Ignored => {}
                    Outcome::Matched => report.matched += 1,
                    Outcome::Rejected => report.rejected += 1,
                    Outcome::Failed => report.failed += 1,
                }
            }
            trace!(?report, "Dispatch finished");
            report
        }
        .instrument(span)
        .await
    }

    async fn run_trigger(&self, trigger: &Arc<Trigger>, message: Message) -> Outcome {
        let channel_id = message.channel_id.clone();
        let original = message.clone();

        let result = match trigger.check(message).await {
            Ok(message) => trigger.react(message).await,
            Err(e) => Err(e),
        };

        if let Err(TriggerError::Verbose(Rejection::Disabled)) = &result
            && !trigger.addresses(&original).await.unwrap_or(false)
        {
            return Outcome::Ignored;
        }

        match result {
            Ok(count) => {
                debug!(trigger = %trigger.name(), reactions = count, "Trigger handled message");
                Outcome::Matched
            }
            Err(e) if e.is_no_match() => {
                debug!(trigger = %trigger.name(), reason = %e, "Trigger did not match");
                Outcome::Ignored
            }
            Err(TriggerError::Verbose(rejection)) => {
                debug!(trigger = %trigger.name(), %rejection, "Trigger rejected message");
                if let Err(e) = self.services.bot.send(&channel_id, &rejection.to_string()).await {
                    error!(trigger = %trigger.name(), error = %e, "Failed to send rejection");
                }
                Outcome::Rejected
            }
            Err(e) => {
                error!(trigger = %trigger.name(), error = %e, "Trigger failed");
                Outcome::Failed
            }
        }
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("trigger_count", &self.trigger_count())
            .field("services", &self.services)
            .finish()
    }
}

impl Service<Message> for Dispatcher {
    type Response = DispatchReport;
    type Error = Infallible;
    type Future = BoxFuture<'static, Result<DispatchReport, Infallible>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, message: Message) -> Self::Future {
        let dispatcher = self.clone();
        async move { Ok(dispatcher.dispatch(message).await) }.boxed()
    }
}
