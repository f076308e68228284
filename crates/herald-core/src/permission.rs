//! Guild permission flags.

use std::fmt::{self, Display};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A permission a guild member may hold.
///
/// Names follow the platform's flag names so they can be listed verbatim in
/// configuration files (`"MANAGE_GUILD"`, `"KICK_MEMBERS"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Permission {
    Administrator,
    CreateInstantInvite,
    KickMembers,
    BanMembers,
    ManageChannels,
    ManageGuild,
    AddReactions,
    ViewAuditLog,
    ViewChannel,
    SendMessages,
    ManageMessages,
    EmbedLinks,
    AttachFiles,
    ReadMessageHistory,
    MentionEveryone,
    Connect,
    Speak,
    MuteMembers,
    DeafenMembers,
    MoveMembers,
    ChangeNickname,
    ManageNicknames,
    ManageRoles,
    ManageWebhooks,
}

impl Permission {
    /// Every known permission.
    pub const ALL: &'static [Permission] = &[
        Self::Administrator,
        Self::CreateInstantInvite,
        Self::KickMembers,
        Self::BanMembers,
        Self::ManageChannels,
        Self::ManageGuild,
        Self::AddReactions,
        Self::ViewAuditLog,
        Self::ViewChannel,
        Self::SendMessages,
        Self::ManageMessages,
        Self::EmbedLinks,
        Self::AttachFiles,
        Self::ReadMessageHistory,
        Self::MentionEveryone,
        Self::Connect,
        Self::Speak,
        Self::MuteMembers,
        Self::DeafenMembers,
        Self::MoveMembers,
        Self::ChangeNickname,
        Self::ManageNicknames,
        Self::ManageRoles,
        Self::ManageWebhooks,
    ];

    /// Returns the platform flag name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Administrator => "ADMINISTRATOR",
            Self::CreateInstantInvite => "CREATE_INSTANT_INVITE",
            Self::KickMembers => "KICK_MEMBERS",
            Self::BanMembers => "BAN_MEMBERS",
            Self::ManageChannels => "MANAGE_CHANNELS",
            Self::ManageGuild => "MANAGE_GUILD",
            Self::AddReactions => "ADD_REACTIONS",
            Self::ViewAuditLog => "VIEW_AUDIT_LOG",
            Self::ViewChannel => "VIEW_CHANNEL",
            Self::SendMessages => "SEND_MESSAGES",
            Self::ManageMessages => "MANAGE_MESSAGES",
            Self::EmbedLinks => "EMBED_LINKS",
            Self::AttachFiles => "ATTACH_FILES",
            Self::ReadMessageHistory => "READ_MESSAGE_HISTORY",
            Self::MentionEveryone => "MENTION_EVERYONE",
            Self::Connect => "CONNECT",
            Self::Speak => "SPEAK",
            Self::MuteMembers => "MUTE_MEMBERS",
            Self::DeafenMembers => "DEAFEN_MEMBERS",
            Self::MoveMembers => "MOVE_MEMBERS",
            Self::ChangeNickname => "CHANGE_NICKNAME",
            Self::ManageNicknames => "MANAGE_NICKNAMES",
            Self::ManageRoles => "MANAGE_ROLES",
            Self::ManageWebhooks => "MANAGE_WEBHOOKS",
        }
    }
}

impl Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when parsing an unknown permission name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown permission: {0}")]
pub struct UnknownPermission(pub String);

impl FromStr for Permission {
    type Err = UnknownPermission;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|p| p.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownPermission(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_permission_name() {
        assert_eq!("MANAGE_GUILD".parse(), Ok(Permission::ManageGuild));
        assert_eq!("kick_members".parse(), Ok(Permission::KickMembers));
        assert!("FLY".parse::<Permission>().is_err());
    }

    #[test]
    fn test_serde_uses_flag_names() {
        let json = serde_json::to_string(&Permission::ManageMessages).unwrap();
        assert_eq!(json, "\"MANAGE_MESSAGES\"");

        let parsed: Permission = serde_json::from_str("\"BAN_MEMBERS\"").unwrap();
        assert_eq!(parsed, Permission::BanMembers);
    }

    #[test]
    fn test_display_matches_as_str() {
        for permission in Permission::ALL {
            assert_eq!(permission.to_string(), permission.as_str());
        }
    }
}
