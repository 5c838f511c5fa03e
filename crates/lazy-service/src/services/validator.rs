//! Command validator
//!
//! Gates every command invocation in three stages: required conditions,
//! optional allow-lists, then user/guild/global cooldowns. Denials are
//! returned as values.

use std::time::Duration;

use chrono::{DateTime, Utc};
use lazy_cache::{CooldownKey, CooldownStore};
use lazy_core::{
    CommandConstraints, Condition, CooldownHit, Denial, Invocation, Snowflake, Verdict,
};
use tracing::{debug, instrument};

use super::context::ServiceContext;

fn listed(list: Option<&Vec<Snowflake>>, id: Snowflake) -> Option<bool> {
    list.map(|ids| ids.contains(&id))
}

/// Command validator bound to a cooldown store and the bot owner
pub struct CommandValidator<'a> {
    cooldowns: &'a CooldownStore,
    owner_id: Snowflake,
}

impl<'a> CommandValidator<'a> {
    pub fn new(cooldowns: &'a CooldownStore, owner_id: Snowflake) -> Self {
        Self {
            cooldowns,
            owner_id,
        }
    }

    pub fn from_context(ctx: &'a ServiceContext) -> Self {
        Self::new(ctx.cooldowns(), ctx.owner_id())
    }

    /// Decide whether `invocation` may run the command `name`
    ///
    /// Cooldown entries are written only for scopes that did not block, so a
    /// denied call never pushes an expiry further out.
    #[instrument(skip(self, constraints), fields(user_id = %invocation.user_id))]
    pub fn check(
        &self,
        name: &str,
        constraints: &CommandConstraints,
        invocation: &Invocation<'_>,
        now: DateTime<Utc>,
    ) -> Verdict {
        if let Some(condition) = self.first_failed_condition(constraints, invocation) {
            debug!(command = name, condition = %condition, "Required condition failed");
            return Verdict::Denied(Denial::Condition(condition));
        }

        if !Self::optional_lists_pass(constraints, invocation) {
            debug!(command = name, "Optional conditions failed");
            return Verdict::Denied(Denial::General);
        }

        match self.apply_cooldowns(name, constraints, invocation, now.timestamp()) {
            Some(hit) => {
                debug!(command = name, scope = %hit.scope, time_left = hit.time_left, "On cooldown");
                Verdict::Denied(Denial::Cooldown(hit))
            }
            None => Verdict::Allowed,
        }
    }

    fn first_failed_condition(
        &self,
        constraints: &CommandConstraints,
        invocation: &Invocation<'_>,
    ) -> Option<Condition> {
        Condition::ORDER
            .into_iter()
            .find(|condition| !self.condition_passes(*condition, constraints, invocation))
    }

    fn condition_passes(
        &self,
        condition: Condition,
        c: &CommandConstraints,
        inv: &Invocation<'_>,
    ) -> bool {
        let channel = inv.channel.map(|ch| ch.id);
        let category = inv.channel.and_then(|ch| ch.category());

        match condition {
            Condition::AllowedUsers => listed(c.allowed_users.as_ref(), inv.user_id).unwrap_or(true),
            Condition::BlockedUsers => !listed(c.blocked_users.as_ref(), inv.user_id).unwrap_or(false),
            Condition::AllowedChannels => channel
                .and_then(|id| listed(c.allowed_channels.as_ref(), id))
                .unwrap_or(true),
            Condition::BlockedChannels => !channel
                .and_then(|id| listed(c.blocked_channels.as_ref(), id))
                .unwrap_or(false),
            Condition::AllowedCategories => category
                .and_then(|id| listed(c.allowed_categories.as_ref(), id))
                .unwrap_or(true),
            Condition::BlockedCategories => !category
                .and_then(|id| listed(c.blocked_categories.as_ref(), id))
                .unwrap_or(false),
            Condition::AllowedGuilds => inv
                .guild_id
                .and_then(|id| listed(c.allowed_guilds.as_ref(), id))
                .unwrap_or(true),
            Condition::BlockedGuilds => !inv
                .guild_id
                .and_then(|id| listed(c.blocked_guilds.as_ref(), id))
                .unwrap_or(false),
            Condition::AllowedRoles => match (inv.member, c.allowed_roles.as_deref()) {
                (Some(member), Some(roles)) => member.has_any_role(roles),
                _ => true,
            },
            Condition::BlockedRoles => match (inv.member, c.blocked_roles.as_deref()) {
                (Some(member), Some(roles)) => !member.has_any_role(roles),
                _ => true,
            },
            Condition::RestrictedToOwner => {
                !c.restricted_to_owner || (!self.owner_id.is_zero() && inv.user_id == self.owner_id)
            }
            Condition::RestrictedToNsfw => {
                !c.restricted_to_nsfw || inv.channel.is_some_and(|ch| ch.is_nsfw_text())
            }
            Condition::IsDisabled => !c.disabled,
        }
    }

    /// Passes when no declared list applies, or when any applicable one matches
    fn optional_lists_pass(c: &CommandConstraints, inv: &Invocation<'_>) -> bool {
        let channel = inv.channel.map(|ch| ch.id);
        let category = inv.channel.and_then(|ch| ch.category());

        let results = [
            listed(c.optional_allowed_users.as_ref(), inv.user_id),
            channel.and_then(|id| listed(c.optional_allowed_channels.as_ref(), id)),
            category.and_then(|id| listed(c.optional_allowed_categories.as_ref(), id)),
            inv.guild_id
                .and_then(|id| listed(c.optional_allowed_guilds.as_ref(), id)),
            match (inv.member, c.optional_allowed_roles.as_deref()) {
                (Some(member), Some(roles)) => Some(member.has_any_role(roles)),
                _ => None,
            },
        ];

        let mut applicable = results.into_iter().flatten().peekable();
        applicable.peek().is_none() || applicable.any(|passed| passed)
    }

    fn apply_cooldowns(
        &self,
        name: &str,
        c: &CommandConstraints,
        inv: &Invocation<'_>,
        now: i64,
    ) -> Option<CooldownHit> {
        let scopes = [
            (c.user_cooldown, Some(CooldownKey::user(name, inv.user_id))),
            (c.guild_cooldown, inv.guild_id.map(|id| CooldownKey::guild(name, id))),
            (c.global_cooldown, Some(CooldownKey::global(name))),
        ];

        for (cooldown, key) in scopes {
            let (Some(secs), Some(key)) = (cooldown.map(whole_seconds), key) else {
                continue;
            };
            if secs == 0 {
                continue;
            }

            if let Some(expires_at) = self.cooldowns.expiry(&key) {
                if now < expires_at {
                    return Some(CooldownHit {
                        scope: key.scope,
                        time_left: expires_at - now,
                        expires_at,
                    });
                }
            }
            self.cooldowns.set_expiry(key, now.saturating_add(secs));
        }

        None
    }
}

fn whole_seconds(duration: Duration) -> i64 {
    i64::try_from(duration.as_secs()).unwrap_or(i64::MAX)
}
