//! Channel, role and permission guards.
//!
//! Each guard takes the relevant piece of [`TriggerOptions`](crate::TriggerOptions)
//! and the message, and either admits the message or returns the
//! [`Rejection`] to show the user. An unconfigured guard always admits.

use herald_core::{Member, Message, Permission};
use tracing::debug;

use crate::error::Rejection;
use crate::options::Filter;

/// Admits the message when its channel passes `filter`.
pub fn check_channel(filter: Option<&Filter>, message: &Message) -> Result<(), Rejection> {
    let Some(filter) = filter else {
        return Ok(());
    };

    if filter.admits(|id| id == message.channel_id) {
        Ok(())
    } else {
        debug!(channel = %message.channel_id, "Channel rejected");
        Err(Rejection::ForbiddenChannel)
    }
}

/// Admits the message when the author's roles pass `filter`.
pub fn check_roles(filter: Option<&Filter>, message: &Message) -> Result<(), Rejection> {
    let Some(filter) = filter else {
        return Ok(());
    };
    let member = member_of(message, "roles")?;

    if filter.admits(|id| member.has_role(id)) {
        Ok(())
    } else {
        debug!(author = %message.author.id, "Role rejected");
        Err(Rejection::MissingRole)
    }
}

/// Admits the message when the author holds every permission in `required`.
pub fn check_permissions(
    required: Option<&[Permission]>,
    message: &Message,
) -> Result<(), Rejection> {
    let Some(required) = required else {
        return Ok(());
    };
    let member = member_of(message, "permissions")?;

    match required.iter().find(|p| !member.has_permission(**p)) {
        None => Ok(()),
        Some(missing) => {
            debug!(author = %message.author.id, %missing, "Permission rejected");
            Err(Rejection::MissingPermission)
        }
    }
}

fn member_of<'a>(message: &'a Message, checking: &'static str) -> Result<&'a Member, Rejection> {
    message
        .member
        .as_ref()
        .ok_or(Rejection::UnknownAuthor { checking })
}
