//! Invocation context - who ran a command, and where

use std::collections::HashSet;

use crate::entities::ChannelKind;
use crate::value_objects::Snowflake;

/// Anything that can answer "does this member hold role X"
///
/// Full guild members and the partial members attached to interactions both
/// implement this, so rule evaluation never depends on which one it was given.
pub trait RoleHolder: Send + Sync {
    fn has_role(&self, role_id: Snowflake) -> bool;

    fn has_any_role(&self, role_ids: &[Snowflake]) -> bool {
        role_ids.iter().any(|id| self.has_role(*id))
    }
}

impl RoleHolder for [Snowflake] {
    fn has_role(&self, role_id: Snowflake) -> bool {
        self.contains(&role_id)
    }
}

impl RoleHolder for Vec<Snowflake> {
    fn has_role(&self, role_id: Snowflake) -> bool {
        self.contains(&role_id)
    }
}

impl RoleHolder for HashSet<Snowflake> {
    fn has_role(&self, role_id: Snowflake) -> bool {
        self.contains(&role_id)
    }
}

/// The channel a command was invoked in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelContext {
    pub id: Snowflake,
    pub kind: ChannelKind,
    pub parent_id: Option<Snowflake>,
    pub nsfw: bool,
}

impl ChannelContext {
    /// Category the channel sits in; DMs never have one
    pub fn category(&self) -> Option<Snowflake> {
        if self.kind.is_dm() {
            None
        } else {
            self.parent_id
        }
    }

    pub fn is_nsfw_text(&self) -> bool {
        self.kind == ChannelKind::GuildText && self.nsfw
    }
}

/// Caller identity and surroundings for one command invocation
#[derive(Clone, Copy)]
pub struct Invocation<'a> {
    pub user_id: Snowflake,
    pub channel: Option<ChannelContext>,
    pub guild_id: Option<Snowflake>,
    pub member: Option<&'a dyn RoleHolder>,
}

impl<'a> Invocation<'a> {
    pub fn new(user_id: Snowflake) -> Self {
        Self {
            user_id,
            channel: None,
            guild_id: None,
            member: None,
        }
    }

    pub fn in_channel(mut self, channel: ChannelContext) -> Self {
        self.channel = Some(channel);
        self
    }

    pub fn in_guild(mut self, guild_id: Snowflake) -> Self {
        self.guild_id = Some(guild_id);
        self
    }

    pub fn with_member(mut self, member: &'a dyn RoleHolder) -> Self {
        self.member = Some(member);
        self
    }
}

impl std::fmt::Debug for Invocation<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Invocation")
            .field("user_id", &self.user_id)
            .field("channel", &self.channel)
            .field("guild_id", &self.guild_id)
            .field("member", &self.member.is_some())
            .finish()
    }
}
