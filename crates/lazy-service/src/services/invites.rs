//! Invite-reward tracker
//!
//! Attributes member joins to invite codes by diffing use counts, credits
//! the inviter, and mints a reward key at exact invite totals.

use chrono::{DateTime, Utc};
use lazy_cache::InviteSnapshot;
use lazy_core::entities::colors;
use lazy_core::{
    DomainError, GeneratedKey, InviteRecord, InviteReward, KeyOrder, Notice, OutgoingMessage,
    Snowflake, UserRecord,
};
use tracing::{debug, info, instrument, warn};

use super::context::ServiceContext;
use super::error::ServiceResult;

/// A member who just joined the guild
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoiningMember {
    pub user_id: Snowflake,
    pub username: String,
    pub is_bot: bool,
}

/// What a join event led to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinOutcome {
    /// Bots are not tracked
    Ignored,
    /// No earlier snapshot; this one becomes the baseline
    Seeded,
    /// No tracked inviter could be identified
    Unattributed,
    Credited {
        inviter_id: Snowflake,
        code: String,
        total_invites: i32,
        reward_key: Option<String>,
    },
}

/// Invite tracking service
pub struct InviteService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> InviteService<'a> {
    /// Create a new InviteService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Store a fresh snapshot of the guild's invites
    #[instrument(skip(self))]
    pub async fn seed(&self, guild_id: Snowflake) -> ServiceResult<usize> {
        let current = self.ctx.platform().guild_invites(guild_id).await?;
        let snapshot = InviteSnapshot::from_usages(&current);
        let count = snapshot.len();
        self.ctx.invite_snapshots().replace(guild_id, snapshot);
        info!(guild_id = %guild_id, invites = count, "Invite snapshot seeded");
        Ok(count)
    }

    /// Refresh the snapshot and remember the code on the inviter's record
    ///
    /// Returns whether a new invite record was stored.
    #[instrument(skip(self))]
    pub async fn on_invite_created(
        &self,
        guild_id: Snowflake,
        code: &str,
        inviter_id: Option<Snowflake>,
        expires_at: Option<DateTime<Utc>>,
    ) -> ServiceResult<bool> {
        self.seed(guild_id).await?;

        let Some(inviter_id) = inviter_id else {
            debug!(code, "Invite has no inviter");
            return Ok(false);
        };
        let Some(inviter) = self.ctx.user_repo().find_by_discord_id(inviter_id).await? else {
            debug!(code, inviter_id = %inviter_id, "Inviter is not tracked");
            return Ok(false);
        };
        if inviter.has_invite(code) {
            return Ok(false);
        }

        let invite = InviteRecord::new(code, self.ctx.clock().now(), expires_at);
        match self.ctx.user_repo().add_invite(inviter_id, &invite).await {
            Ok(()) => {
                info!(code, inviter_id = %inviter_id, "Invite recorded");
                Ok(true)
            }
            Err(DomainError::InviteCodeExists(_)) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Attribute a join, credit the inviter, and pay out rewards
    #[instrument(skip(self, member), fields(user_id = %member.user_id))]
    pub async fn on_member_join(
        &self,
        guild_id: Snowflake,
        member: &JoiningMember,
    ) -> ServiceResult<JoinOutcome> {
        if member.is_bot {
            return Ok(JoinOutcome::Ignored);
        }

        let current = self.ctx.platform().guild_invites(guild_id).await?;
        let Some(previous) = self
            .ctx
            .invite_snapshots()
            .replace(guild_id, InviteSnapshot::from_usages(&current))
        else {
            info!(guild_id = %guild_id, "No invite snapshot yet, seeded from this join");
            return Ok(JoinOutcome::Seeded);
        };

        let Some(used) = previous.find_used(&current) else {
            debug!("No invite use increased");
            return Ok(JoinOutcome::Unattributed);
        };
        if used.competing > 0 {
            warn!(
                code = %used.code,
                competing = used.competing,
                "Several invites were used since the last snapshot"
            );
        }

        let Some(inviter_id) = used.inviter_id else {
            return Ok(JoinOutcome::Unattributed);
        };
        let Some(inviter) = self.ctx.user_repo().find_by_discord_id(inviter_id).await? else {
            debug!(inviter_id = %inviter_id, "Inviter is not tracked");
            return Ok(JoinOutcome::Unattributed);
        };

        self.link_invitee(member, inviter_id).await?;

        if !self
            .ctx
            .user_repo()
            .mark_invite_used(inviter_id, &used.code, member.user_id)
            .await?
        {
            debug!(code = %used.code, "Invite code was not on the inviter's record");
        }

        let total_invites = self.ctx.user_repo().increment_total_invites(inviter_id).await?;
        info!(
            inviter_id = %inviter_id,
            code = %used.code,
            total_invites,
            "Invite credited"
        );

        let reward_key = match InviteReward::for_total(total_invites) {
            Some(reward) => self.pay_reward(inviter_id, reward, total_invites).await?,
            None => None,
        };

        self.log_join(member, &inviter, &used.code, total_invites).await;

        Ok(JoinOutcome::Credited {
            inviter_id,
            code: used.code,
            total_invites,
            reward_key,
        })
    }

    async fn link_invitee(&self, member: &JoiningMember, inviter_id: Snowflake) -> ServiceResult<()> {
        let repo = self.ctx.user_repo();
        if repo.find_by_discord_id(member.user_id).await?.is_some() {
            repo.set_invited_by(member.user_id, inviter_id).await?;
        } else {
            let mut record =
                UserRecord::tracking_only(member.user_id, &member.username, self.ctx.clock().now());
            record.invited_by = Some(inviter_id);
            repo.upsert(&record).await?;
        }
        Ok(())
    }

    /// Mint and store the reward key; a panel failure only costs the reward
    async fn pay_reward(
        &self,
        inviter_id: Snowflake,
        reward: &InviteReward,
        total_invites: i32,
    ) -> ServiceResult<Option<String>> {
        let order = KeyOrder::single(reward.days, reward.note);
        let value = match self.ctx.key_panel().generate_key(&order).await {
            Ok(value) => value,
            Err(e) => {
                warn!(inviter_id = %inviter_id, error = %e, "Reward key generation failed");
                return Ok(None);
            }
        };

        let now = self.ctx.clock().now();
        let key = GeneratedKey::new(&value, reward.days, reward.note, now);
        self.ctx.user_repo().push_key(inviter_id, &key).await?;

        info!(inviter_id = %inviter_id, days = reward.days, "Invite reward issued");

        let dm = Notice::success(
            "🎉 Invite Reward!",
            format!("You've reached {total_invites} invites and earned a reward!"),
        )
        .field("Key", format!("`{value}`"), false)
        .field("Duration", format!("{} day(s)", reward.days), true)
        .field("Total Invites", total_invites.to_string(), true)
        .timestamp(now);
        if let Err(e) = self
            .ctx
            .platform()
            .direct_message(inviter_id, OutgoingMessage::notice(dm))
            .await
        {
            warn!(inviter_id = %inviter_id, error = %e, "Could not DM reward");
        }

        Ok(Some(value))
    }

    async fn log_join(&self, member: &JoiningMember, inviter: &UserRecord, code: &str, total_invites: i32) {
        let channel_id = self.ctx.guild().invite_log_channel_id;
        if channel_id.is_zero() {
            return;
        }

        let notice = Notice::new(
            "New Member Joined",
            format!(
                "{} joined using an invite from {}",
                member.username, inviter.username
            ),
            colors::BRAND,
        )
        .field("Invite Code", code, true)
        .field("Inviter", inviter.discord_id.user_mention(), true)
        .field("Member", member.user_id.user_mention(), true)
        .field("Total Invites", total_invites.to_string(), true)
        .timestamp(self.ctx.clock().now());

        if let Err(e) = self
            .ctx
            .platform()
            .send_message(channel_id, OutgoingMessage::notice(notice))
            .await
        {
            warn!(error = %e, "Could not post join log");
        }
    }
}
