//! Error types for the Herald framework.
//!
//! Two kinds of failure matter to callers:
//!
//! - [`TriggerError::Verbose`] carries a [`Rejection`] whose message is safe
//!   to show to the user who sent the message.
//! - [`TriggerError::NoMatch`] means the trigger simply did not apply. It is
//!   expected and is normally swallowed so other triggers can be tried.
//!
//! Everything else is a collaborator failure and is propagated unchanged.

use herald_core::{ApiError, MessageContext, StoreError};
use thiserror::Error;

/// A user-facing reason a trigger refused a message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    /// The trigger is switched off.
    #[error("This command is disabled.")]
    Disabled,

    /// The channel is not in the include list, or is in the exclude list.
    #[error("This command does not work in this channel")]
    ForbiddenChannel,

    /// The author's guild membership could not be resolved.
    #[error("Unable to retrieve message author! Can't check {checking}")]
    UnknownAuthor {
        /// What was being checked ("roles" or "permissions").
        checking: &'static str,
    },

    /// The author lacks an included role or holds an excluded one.
    #[error("You are missing a required role for this command!")]
    MissingRole,

    /// The author lacks at least one required permission.
    #[error("You do not have permission to issue this command!")]
    MissingPermission,

    /// The command needs a sub-command; carries sample invocations.
    #[error("This is not a standalone command try one of these:\n{}", .suggestions.join(" / "))]
    NotStandalone {
        /// Sample invocations, one per sub-command.
        suggestions: Vec<String>,
    },

    /// No handler is registered for this message context.
    #[error("You cannot use this command in {}", context_phrase(.0))]
    UnsupportedContext(MessageContext),

    /// The trigger has no handlers that could run.
    #[error("This cannot be used as a command")]
    NotACommand,

    /// The sub-command token is not known to this trigger.
    #[error("You cannot run this command with \"{0}\"")]
    InvalidArgument(String),

    /// A rejection raised by a custom condition or a reaction.
    #[error("{0}")]
    Custom(String),
}

fn context_phrase(context: &MessageContext) -> &'static str {
    match context {
        MessageContext::Direct => "direct messages",
        MessageContext::Guild => "servers",
    }
}

/// Errors produced while checking or running a trigger.
#[derive(Debug, Clone, Error)]
pub enum TriggerError {
    /// A rejection meant for the user.
    #[error(transparent)]
    Verbose(#[from] Rejection),

    /// The trigger did not match this message.
    #[error("trigger did not match{}", .0.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
    NoMatch(Option<String>),

    /// The trigger was used before being attached to a bot.
    #[error("trigger '{0}' is not attached to a bot")]
    Detached(String),

    /// The configuration store failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The messaging surface failed.
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl TriggerError {
    /// Creates a user-facing error with a custom message.
    pub fn verbose(message: impl Into<String>) -> Self {
        Self::Verbose(Rejection::Custom(message.into()))
    }

    /// Creates a silent no-match error.
    pub fn no_match() -> Self {
        Self::NoMatch(None)
    }

    /// Returns `true` for the silent no-match case.
    pub fn is_no_match(&self) -> bool {
        matches!(self, Self::NoMatch(_))
    }

    /// Returns the rejection if this error is meant for the user.
    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Self::Verbose(rejection) => Some(rejection),
            _ => None,
        }
    }

    /// Returns the text to show the user, if this error is user-facing.
    pub fn user_message(&self) -> Option<String> {
        self.rejection().map(ToString::to_string)
    }
}

/// Result type for trigger operations.
pub type TriggerResult<T> = Result<T, TriggerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_messages() {
        assert_eq!(Rejection::Disabled.to_string(), "This command is disabled.");
        assert_eq!(
            Rejection::UnsupportedContext(MessageContext::Direct).to_string(),
            "You cannot use this command in direct messages"
        );
        assert_eq!(
            Rejection::UnknownAuthor { checking: "roles" }.to_string(),
            "Unable to retrieve message author! Can't check roles"
        );
        assert_eq!(
            Rejection::InvalidArgument("plya".into()).to_string(),
            "You cannot run this command with \"plya\""
        );
    }

    #[test]
    fn test_not_standalone_lists_suggestions() {
        let rejection = Rejection::NotStandalone {
            suggestions: vec!["!audio play".into(), "!audio list".into()],
        };
        assert_eq!(
            rejection.to_string(),
            "This is not a standalone command try one of these:\n!audio play / !audio list"
        );
    }

    #[test]
    fn test_user_message_only_for_verbose() {
        assert_eq!(
            TriggerError::verbose("nope").user_message().as_deref(),
            Some("nope")
        );
        assert!(TriggerError::no_match().user_message().is_none());
        assert!(TriggerError::no_match().is_no_match());
        assert!(
            TriggerError::Api(ApiError::Timeout)
                .user_message()
                .is_none()
        );
    }

    #[test]
    fn test_no_match_display() {
        assert_eq!(TriggerError::no_match().to_string(), "trigger did not match");
        assert_eq!(
            TriggerError::NoMatch(Some("No reactions defined for <ping>".into())).to_string(),
            "trigger did not match: No reactions defined for <ping>"
        );
    }
}
