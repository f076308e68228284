//! Shared fixtures for unit tests.

use std::any::Any;
use std::sync::Arc;

use async_trait::async_trait;
use herald_core::{ApiError, ApiResult, Author, Bot, Guild, MemoryStore, Message};
use parking_lot::Mutex;

use crate::reaction::{Reaction, ReactionContext, ReactionScope};
use crate::trigger::TriggerServices;

/// Records every message sent through it.
#[derive(Default)]
pub(crate) struct MockBot {
    pub sent: Mutex<Vec<(String, String)>>,
    pub fail: bool,
}

impl MockBot {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl Bot for MockBot {
    fn id(&self) -> &str {
        "mock"
    }

    async fn send(&self, channel_id: &str, content: &str) -> ApiResult<String> {
        if self.fail {
            return Err(ApiError::NotConnected);
        }
        let mut sent = self.sent.lock();
        sent.push((channel_id.to_string(), content.to_string()));
        Ok(format!("m{}", sent.len()))
    }

    async fn edit(&self, _channel_id: &str, _message_id: &str, _content: &str) -> ApiResult<()> {
        Ok(())
    }

    fn as_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

pub(crate) fn services(bot: &Arc<MockBot>, store: &MemoryStore) -> TriggerServices {
    TriggerServices::new(bot.clone(), Arc::new(store.clone()))
}

pub(crate) fn guild_message(content: &str) -> Message {
    Message::guild(
        "m1",
        "c1",
        Guild::new("g1", "home"),
        Author::new("u1", "alice"),
        content,
    )
}

pub(crate) fn direct_message(content: &str) -> Message {
    Message::direct("m1", "dm1", Author::new("u1", "alice"), content)
}

/// A reaction that appends `name:content` to `log` when it runs.
pub(crate) fn recording(name: &str, scope: ReactionScope, log: &Arc<Mutex<Vec<String>>>) -> Reaction {
    let log = Arc::clone(log);
    let tag = name.to_string();
    Reaction::new(name, scope, move |ctx: ReactionContext| {
        let log = Arc::clone(&log);
        let tag = tag.clone();
        async move {
            log.lock().push(format!("{tag}:{}", ctx.content()));
            Ok(())
        }
    })
}
