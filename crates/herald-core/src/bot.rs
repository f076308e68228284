//! Bot trait and related types.
//!
//! This module defines the `Bot` trait, the narrow messaging surface Herald
//! needs from the chat client: posting a message to a channel and editing a
//! message it posted earlier.

use std::any::Any;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ApiResult;

/// The messaging surface of a connected bot.
///
/// Implementations wrap the platform client. Connection management, gateway
/// events, embeds and components all stay on the client side.
#[async_trait]
pub trait Bot: Send + Sync + 'static {
    /// Returns the bot's unique identifier.
    fn id(&self) -> &str;

    /// Posts `content` to a channel.
    ///
    /// # Returns
    ///
    /// The ID of the created message.
    async fn send(&self, channel_id: &str, content: &str) -> ApiResult<String>;

    /// Replaces the content of a message previously posted by the bot.
    async fn edit(&self, channel_id: &str, message_id: &str, content: &str) -> ApiResult<()>;

    /// Returns self as an `Arc<dyn Any>` for safe downcasting.
    ///
    /// Implementors should simply return `self`:
    ///
    /// ```rust,ignore
    /// fn as_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
    ///     self
    /// }
    /// ```
    fn as_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

/// A boxed Bot trait object.
pub type BoxedBot = Arc<dyn Bot>;
