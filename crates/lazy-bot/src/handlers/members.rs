//! Session start, member joins and invite creation

use std::sync::atomic::Ordering;

use chrono::{DateTime, Duration, Utc};
use serenity::all::{Context, GuildId, InviteCreateEvent, Member, Ready};
use tracing::{error, info, warn};

use lazy_core::Snowflake;
use lazy_service::services::{InviteService, JoinOutcome, JoiningMember};

use super::Handler;
use crate::commands;

/// When an invite stops working; `max_age` of zero never expires
pub fn invite_expiry(created_at: i64, max_age_secs: u32) -> Option<DateTime<Utc>> {
    if max_age_secs == 0 {
        return None;
    }
    DateTime::from_timestamp(created_at, 0).map(|at| at + Duration::seconds(i64::from(max_age_secs)))
}

impl Handler {
    pub(super) async fn on_ready(&self, ctx: &Context, ready: &Ready) {
        info!(user = %ready.user.name, guilds = ready.guilds.len(), "Gateway session ready");
        self.gateway.set_bot_id(ready.user.id);

        let guild_id = self.services.guild_id();
        let guild = GuildId::new(guild_id.as_u64());
        match guild.set_commands(ctx, commands::definitions()).await {
            Ok(registered) => info!(count = registered.len(), "Slash commands registered"),
            Err(e) => error!(error = %e, "Failed to register slash commands"),
        }

        if let Err(e) = InviteService::new(&self.services).seed(guild_id).await {
            // the first join will seed instead
            warn!(error = %e, "Failed to seed invite snapshot");
        }

        self.ready.store(true, Ordering::Release);
    }

    pub(super) async fn on_member_join(&self, member: &Member) {
        if !self.is_home_guild(Some(member.guild_id)) {
            return;
        }
        let joining = JoiningMember {
            user_id: Snowflake::from(member.user.id.get()),
            username: member.user.name.clone(),
            is_bot: member.user.bot,
        };

        match InviteService::new(&self.services)
            .on_member_join(self.services.guild_id(), &joining)
            .await
        {
            Ok(JoinOutcome::Credited {
                inviter_id,
                total_invites,
                reward_key,
                ..
            }) => info!(
                user_id = %joining.user_id,
                inviter_id = %inviter_id,
                total_invites,
                rewarded = reward_key.is_some(),
                "Join credited"
            ),
            Ok(outcome) => info!(user_id = %joining.user_id, ?outcome, "Join processed"),
            Err(e) => error!(user_id = %joining.user_id, error = %e, "Join tracking failed"),
        }
    }

    pub(super) async fn on_invite_create(&self, event: &InviteCreateEvent) {
        if !self.is_home_guild(event.guild_id) {
            return;
        }
        let inviter = event.inviter.as_ref().map(|user| Snowflake::from(user.id.get()));
        let expires_at = invite_expiry(event.created_at.unix_timestamp(), event.max_age);

        if let Err(e) = InviteService::new(&self.services)
            .on_invite_created(self.services.guild_id(), &event.code, inviter, expires_at)
            .await
        {
            error!(code = %event.code, error = %e, "Invite tracking failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invite_expiry() {
        assert_eq!(invite_expiry(1_700_000_000, 0), None);
        let expires = invite_expiry(1_700_000_000, 86_400).unwrap();
        assert_eq!(expires.timestamp(), 1_700_086_400);
    }
}
