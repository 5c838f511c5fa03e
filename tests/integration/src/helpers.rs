//! Test helpers for integration tests
//!
//! Shortcuts for running commands through the validator the way the
//! dispatch shell does.

use chrono::{DateTime, Utc};
use lazy_core::{Invocation, RoleHolder, Snowflake, Verdict};
use lazy_service::services::{CommandCatalog, CommandSurface, CommandValidator};
use lazy_service::ServiceContext;

/// Run a slash command through the validator the way the bot does
pub fn validate_slash(
    ctx: &ServiceContext,
    name: &str,
    user_id: Snowflake,
    channel_id: Option<Snowflake>,
    member: &dyn RoleHolder,
    now: DateTime<Utc>,
) -> Verdict {
    validate(ctx, CommandSurface::Slash, name, user_id, channel_id, member, now)
}

/// Run a prefix command through the validator the way the bot does
pub fn validate_prefix(
    ctx: &ServiceContext,
    name: &str,
    user_id: Snowflake,
    channel_id: Option<Snowflake>,
    member: &dyn RoleHolder,
    now: DateTime<Utc>,
) -> Verdict {
    validate(ctx, CommandSurface::Prefix, name, user_id, channel_id, member, now)
}

fn validate(
    ctx: &ServiceContext,
    surface: CommandSurface,
    name: &str,
    user_id: Snowflake,
    channel_id: Option<Snowflake>,
    member: &dyn RoleHolder,
    now: DateTime<Utc>,
) -> Verdict {
    let catalog = CommandCatalog::new(ctx.guild(), ctx.owner_id());
    let Some(constraints) = catalog.get(surface, name) else {
        return Verdict::Allowed;
    };

    let mut invocation = Invocation::new(user_id)
        .in_guild(ctx.guild_id())
        .with_member(member);
    if let Some(channel_id) = channel_id {
        invocation = invocation.in_channel(crate::fixtures::text_channel(channel_id));
    }

    CommandValidator::from_context(ctx).check(name, constraints, &invocation, now)
}
