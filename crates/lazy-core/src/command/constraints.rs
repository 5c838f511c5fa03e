//! Declared command constraints
//!
//! Every command carries a [`CommandConstraints`] value describing who may run
//! it, where, and how often. Lists that are left unset, or set to an empty
//! list, never deny anyone.

use std::time::Duration;

use crate::value_objects::Snowflake;

/// Allow/block lists, restrictions, and cooldowns declared by a command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandConstraints {
    pub allowed_users: Option<Vec<Snowflake>>,
    pub blocked_users: Option<Vec<Snowflake>>,
    pub allowed_channels: Option<Vec<Snowflake>>,
    pub blocked_channels: Option<Vec<Snowflake>>,
    pub allowed_categories: Option<Vec<Snowflake>>,
    pub blocked_categories: Option<Vec<Snowflake>>,
    pub allowed_guilds: Option<Vec<Snowflake>>,
    pub blocked_guilds: Option<Vec<Snowflake>>,
    pub allowed_roles: Option<Vec<Snowflake>>,
    pub blocked_roles: Option<Vec<Snowflake>>,

    pub optional_allowed_users: Option<Vec<Snowflake>>,
    pub optional_allowed_channels: Option<Vec<Snowflake>>,
    pub optional_allowed_categories: Option<Vec<Snowflake>>,
    pub optional_allowed_guilds: Option<Vec<Snowflake>>,
    pub optional_allowed_roles: Option<Vec<Snowflake>>,

    pub restricted_to_owner: bool,
    pub restricted_to_nsfw: bool,
    pub disabled: bool,

    pub user_cooldown: Option<Duration>,
    pub guild_cooldown: Option<Duration>,
    pub global_cooldown: Option<Duration>,
}

fn list(ids: impl IntoIterator<Item = Snowflake>) -> Option<Vec<Snowflake>> {
    let ids: Vec<Snowflake> = ids.into_iter().filter(|id| !id.is_zero()).collect();
    (!ids.is_empty()).then_some(ids)
}

impl CommandConstraints {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allowed_users(mut self, ids: impl IntoIterator<Item = Snowflake>) -> Self {
        self.allowed_users = list(ids);
        self
    }

    pub fn blocked_users(mut self, ids: impl IntoIterator<Item = Snowflake>) -> Self {
        self.blocked_users = list(ids);
        self
    }

    pub fn allowed_channels(mut self, ids: impl IntoIterator<Item = Snowflake>) -> Self {
        self.allowed_channels = list(ids);
        self
    }

    pub fn blocked_channels(mut self, ids: impl IntoIterator<Item = Snowflake>) -> Self {
        self.blocked_channels = list(ids);
        self
    }

    pub fn allowed_categories(mut self, ids: impl IntoIterator<Item = Snowflake>) -> Self {
        self.allowed_categories = list(ids);
        self
    }

    pub fn blocked_categories(mut self, ids: impl IntoIterator<Item = Snowflake>) -> Self {
        self.blocked_categories = list(ids);
        self
    }

    pub fn allowed_guilds(mut self, ids: impl IntoIterator<Item = Snowflake>) -> Self {
        self.allowed_guilds = list(ids);
        self
    }

    pub fn blocked_guilds(mut self, ids: impl IntoIterator<Item = Snowflake>) -> Self {
        self.blocked_guilds = list(ids);
        self
    }

    pub fn allowed_roles(mut self, ids: impl IntoIterator<Item = Snowflake>) -> Self {
        self.allowed_roles = list(ids);
        self
    }

    pub fn blocked_roles(mut self, ids: impl IntoIterator<Item = Snowflake>) -> Self {
        self.blocked_roles = list(ids);
        self
    }

    pub fn optional_allowed_users(mut self, ids: impl IntoIterator<Item = Snowflake>) -> Self {
        self.optional_allowed_users = list(ids);
        self
    }

    pub fn optional_allowed_channels(mut self, ids: impl IntoIterator<Item = Snowflake>) -> Self {
        self.optional_allowed_channels = list(ids);
        self
    }

    pub fn optional_allowed_categories(mut self, ids: impl IntoIterator<Item = Snowflake>) -> Self {
        self.optional_allowed_categories = list(ids);
        self
    }

    pub fn optional_allowed_guilds(mut self, ids: impl IntoIterator<Item = Snowflake>) -> Self {
        self.optional_allowed_guilds = list(ids);
        self
    }

    pub fn optional_allowed_roles(mut self, ids: impl IntoIterator<Item = Snowflake>) -> Self {
        self.optional_allowed_roles = list(ids);
        self
    }

    pub fn owner_only(mut self) -> Self {
        self.restricted_to_owner = true;
        self
    }

    pub fn nsfw_only(mut self) -> Self {
        self.restricted_to_nsfw = true;
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn user_cooldown(mut self, cooldown: Duration) -> Self {
        self.user_cooldown = Some(cooldown);
        self
    }

    pub fn guild_cooldown(mut self, cooldown: Duration) -> Self {
        self.guild_cooldown = Some(cooldown);
        self
    }

    pub fn global_cooldown(mut self, cooldown: Duration) -> Self {
        self.global_cooldown = Some(cooldown);
        self
    }

    /// Whether any optional allow-list is declared
    pub fn has_optional_lists(&self) -> bool {
        self.optional_allowed_users.is_some()
            || self.optional_allowed_channels.is_some()
            || self.optional_allowed_categories.is_some()
            || self.optional_allowed_guilds.is_some()
            || self.optional_allowed_roles.is_some()
    }
}

/// Named required predicates, in evaluation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Condition {
    AllowedUsers,
    BlockedUsers,
    AllowedChannels,
    BlockedChannels,
    AllowedCategories,
    BlockedCategories,
    AllowedGuilds,
    BlockedGuilds,
    AllowedRoles,
    BlockedRoles,
    RestrictedToOwner,
    RestrictedToNsfw,
    IsDisabled,
}

impl Condition {
    /// Evaluation order; the first failing predicate names the denial
    pub const ORDER: [Condition; 13] = [
        Self::AllowedUsers,
        Self::BlockedUsers,
        Self::AllowedChannels,
        Self::BlockedChannels,
        Self::AllowedCategories,
        Self::BlockedCategories,
        Self::AllowedGuilds,
        Self::BlockedGuilds,
        Self::AllowedRoles,
        Self::BlockedRoles,
        Self::RestrictedToOwner,
        Self::RestrictedToNsfw,
        Self::IsDisabled,
    ];

    /// Name surfaced to the caller
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::AllowedUsers => "allowedUsers",
            Self::BlockedUsers => "blockedUsers",
            Self::AllowedChannels => "allowedChannels",
            Self::BlockedChannels => "blockedChannels",
            Self::AllowedCategories => "allowedCategories",
            Self::BlockedCategories => "blockedCategories",
            Self::AllowedGuilds => "allowedGuilds",
            Self::BlockedGuilds => "blockedGuilds",
            Self::AllowedRoles => "allowedRoles",
            Self::BlockedRoles => "blockedRoles",
            Self::RestrictedToOwner => "restrictedToOwner",
            Self::RestrictedToNsfw => "restrictedToNSFW",
            Self::IsDisabled => "isDisabled",
        }
    }

    /// Reply shown when this predicate denies an invocation
    pub const fn reply(&self) -> &'static str {
        match self {
            Self::AllowedUsers => "You are not allowed to use this command.",
            Self::BlockedUsers => "You are blocked from using this command.",
            Self::AllowedChannels => "This command cannot be used in this channel.",
            Self::BlockedChannels => "This command is blocked in this channel.",
            Self::AllowedCategories => "This command cannot be used in this category.",
            Self::BlockedCategories => "This command is blocked in this category.",
            Self::AllowedGuilds => "This command cannot be used in this server.",
            Self::BlockedGuilds => "This command is blocked in this server.",
            Self::AllowedRoles => "You do not have the required role to use this command.",
            Self::BlockedRoles => "One of your roles is blocked from using this command.",
            Self::RestrictedToOwner => "This command is restricted to the bot owner.",
            Self::RestrictedToNsfw => "This command can only be used in NSFW channels.",
            Self::IsDisabled => "This command is currently disabled.",
        }
    }
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
