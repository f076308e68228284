//! Per-guild command prefix.
//!
//! Guild settings live in the config store under `guilds/{id}`. The first
//! time a guild is seen its document is created with the default prefix.

use herald_core::{ConfigStore, Guild, StoreError, StoreResult};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Prefix used when a guild has not configured one.
pub const DEFAULT_PREFIX: &str = "!";

/// Per-guild settings document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuildConfig {
    /// The command prefix for the guild.
    pub prefix: String,
}

impl GuildConfig {
    /// Returns the store path of a guild's settings document.
    pub fn path(guild_id: &str) -> String {
        format!("guilds/{guild_id}")
    }
}

/// Resolves the command prefix for a message.
///
/// Direct messages get `default` without touching the store. For guilds the
/// stored prefix is returned; a missing document is created holding
/// `default`.
pub async fn fetch_prefix(
    store: &dyn ConfigStore,
    guild: Option<&Guild>,
    default: &str,
) -> StoreResult<String> {
    let Some(guild) = guild else {
        return Ok(default.to_string());
    };
    let path = GuildConfig::path(&guild.id);

    match store.document(&path).await? {
        Some(document) => {
            let config: GuildConfig = serde_json::from_value(document)
                .map_err(|e| StoreError::malformed(&path, e))?;
            Ok(config.prefix)
        }
        None => {
            debug!(guild = %guild.id, prefix = default, "Storing default prefix");
            let config = GuildConfig {
                prefix: default.to_string(),
            };
            let document =
                serde_json::to_value(&config).map_err(|e| StoreError::malformed(&path, e))?;
            store.store(document, &path).await?;
            Ok(config.prefix)
        }
    }
}
