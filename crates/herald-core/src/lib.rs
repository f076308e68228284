//! # Herald Core
//!
//! The message model and collaborator interfaces of the Herald command
//! dispatcher.
//!
//! Herald sits on top of a third-party chat client. This crate describes the
//! small surface it needs from that client and from configuration storage:
//!
//! - **Message model**: [`Message`], [`Author`], [`Guild`], [`Member`] and the
//!   [`MessageContext`] a message was sent in
//! - **Permissions**: [`Permission`] flags held by guild members
//! - **Messaging surface**: the [`Bot`] trait (send / edit)
//! - **Configuration store**: the [`ConfigStore`] trait and an in-process
//!   [`MemoryStore`]
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌──────────┐
//! │ chat client │────▶│   Herald     │────▶│ Reaction │──▶ Bot::send
//! │  (gateway)  │     │  (triggers)  │     └──────────┘
//! └─────────────┘     └──────┬───────┘
//!                            └──▶ ConfigStore (guild prefix)
//! ```

pub mod bot;
pub mod error;
pub mod message;
pub mod permission;
pub mod store;

pub use bot::{Bot, BoxedBot};
pub use error::{ApiError, ApiResult, StoreError, StoreResult};
pub use message::{Author, Guild, Member, Message, MessageContext};
pub use permission::{Permission, UnknownPermission};
pub use store::{BoxedStore, ConfigStore, MemoryStore};

/// Prelude for common imports.
pub mod prelude {
    pub use super::bot::{Bot, BoxedBot};
    pub use super::message::*;
    pub use super::permission::Permission;
    pub use super::store::{ConfigStore, MemoryStore};
}
