//! Message types for Herald.
//!
//! [`Message`] is the slice of an inbound chat message the dispatch core
//! reads: its content, author, channel, and (for guild messages) the guild
//! and the author's guild membership. The content is the only field the core
//! ever mutates; guards strip matched command tokens from it.

use std::collections::HashSet;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

use crate::permission::Permission;

// ============================================================================
// Message Context
// ============================================================================

/// Where a message was sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageContext {
    /// A one-to-one conversation with the bot.
    Direct,
    /// A channel inside a guild.
    Guild,
}

impl MessageContext {
    /// Returns the context name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::Guild => "guild",
        }
    }
}

impl Display for MessageContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Participants
// ============================================================================

/// The user who sent a message.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Author {
    /// Platform user ID.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Whether the author is a bot account.
    #[serde(default)]
    pub bot: bool,
}

impl Author {
    /// Creates a human author.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            bot: false,
        }
    }
}

/// The guild a message was sent in.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Guild {
    /// Platform guild ID.
    pub id: String,
    /// Guild name.
    #[serde(default)]
    pub name: String,
}

impl Guild {
    /// Creates a guild reference.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Guild-scoped data about the message author.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Member {
    /// IDs of the roles the member holds.
    #[serde(default)]
    pub roles: HashSet<String>,
    /// Permissions granted to the member in the guild.
    #[serde(default)]
    pub permissions: HashSet<Permission>,
}

impl Member {
    /// Creates a member without roles or permissions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a role (builder pattern).
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.roles.insert(role.into());
        self
    }

    /// Adds a permission (builder pattern).
    pub fn with_permission(mut self, permission: Permission) -> Self {
        self.permissions.insert(permission);
        self
    }

    /// Returns `true` if the member holds the role with the given ID.
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }

    /// Returns `true` if the member holds the permission.
    ///
    /// Administrators implicitly hold every permission.
    pub fn has_permission(&self, permission: Permission) -> bool {
        self.permissions.contains(&Permission::Administrator)
            || self.permissions.contains(&permission)
    }
}

// ============================================================================
// Message
// ============================================================================

/// An inbound chat message.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Message {
    /// Platform message ID.
    pub id: String,
    /// Text content. Guards strip matched command tokens from it.
    pub content: String,
    /// The sender.
    pub author: Author,
    /// The channel the message was posted in.
    pub channel_id: String,
    /// The guild, or `None` for direct messages.
    #[serde(default)]
    pub guild: Option<Guild>,
    /// The sender's membership in `guild`, when it could be resolved.
    #[serde(default)]
    pub member: Option<Member>,
}

impl Message {
    /// Creates a direct message.
    pub fn direct(
        id: impl Into<String>,
        channel_id: impl Into<String>,
        author: Author,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            author,
            channel_id: channel_id.into(),
            guild: None,
            member: None,
        }
    }

    /// Creates a guild message.
    pub fn guild(
        id: impl Into<String>,
        channel_id: impl Into<String>,
        guild: Guild,
        author: Author,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            author,
            channel_id: channel_id.into(),
            guild: Some(guild),
            member: None,
        }
    }

    /// Attaches the author's guild membership (builder pattern).
    pub fn with_member(mut self, member: Member) -> Self {
        self.member = Some(member);
        self
    }

    /// Returns where the message was sent.
    pub fn context(&self) -> MessageContext {
        if self.guild.is_some() {
            MessageContext::Guild
        } else {
            MessageContext::Direct
        }
    }

    /// Returns `true` for guild messages.
    pub fn is_guild(&self) -> bool {
        self.guild.is_some()
    }

    /// Returns the guild ID, if any.
    pub fn guild_id(&self) -> Option<&str> {
        self.guild.as_ref().map(|g| g.id.as_str())
    }
}
