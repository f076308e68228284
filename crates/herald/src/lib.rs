//! # Herald
//!
//! A command dispatcher for chat bots.
//!
//! ## Overview
//!
//! Herald sits behind a chat client. Each inbound message is offered to every
//! registered [`Trigger`](framework::Trigger); a trigger checks the command
//! alias and its guards, then runs the matching reactions.
//!
//! ```text
//! ┌─────────────┐     ┌────────────┐     ┌──────────────────────────────────┐
//! │   Runtime   │────▶│ Dispatcher │────▶│ Trigger "audio" → guards → react │──▶ Bot::send
//! │ (mpsc loop) │     │            │────▶│ Trigger "ping"  → guards → react │──▶ Bot::send
//! └─────────────┘     └────────────┘     └──────────────────────────────────┘
//! ```
//!
//! - **Runtime**: configuration, logging and the inbound message loop
//! - **Triggers**: command aliases, channel/role/permission filters and a
//!   custom condition
//! - **Reactions**: async handlers, either run on the bare command or picked
//!   by the first word after it
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use herald::prelude::*;
//!
//! fn audio() -> Arc<Trigger> {
//!     Trigger::builder("audio")
//!         .options(TriggerOptions::new().command(CommandOptions::starts_with(["audio"])))
//!         .sub_reaction(Reaction::new("play", ReactionScope::Guild, |ctx: ReactionContext| async move {
//!             ctx.reply("Playing").await?;
//!             Ok(())
//!         }))
//!         .build()
//! }
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let (tx, rx) = tokio::sync::mpsc::channel(64);
//!     let runtime = HeraldRuntime::builder().build(client.bot(), Arc::new(MemoryStore::new()))?;
//!     runtime.register(audio())?;
//!
//!     client.forward_messages(tx);
//!     runtime.run(rx).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `toml-config`: `herald.toml` configuration files (default)
//! - `yaml-config`: `herald.yaml` configuration files
//! - `json-log`: JSON log lines

pub use herald_core as core;
pub use herald_framework as framework;
pub use herald_runtime as runtime;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use herald::prelude::*;
/// ```
pub mod prelude {
    pub use std::sync::Arc;

    // Runtime - main entry point
    pub use herald_runtime::{HeraldConfig, HeraldRuntime, RuntimeError, RuntimeResult};

    // Triggers and reactions
    pub use herald_framework::prelude::*;

    // Message model and collaborators
    pub use herald_core::prelude::*;
    pub use herald_core::{BoxedStore, ConfigStore};
}
