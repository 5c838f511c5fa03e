//! Access service
//!
//! Decides whether a member holds a live grant, and lets administrators
//! grant or revoke one.

use chrono::{DateTime, Utc};
use lazy_core::entities::colors;
use lazy_core::{AccessTier, GeneratedKey, Notice, OutgoingMessage, Snowflake, UserRecord};
use tracing::{info, instrument, warn};
use validator::Validate;

use crate::dto::{GrantAccessRequest, KeyListPage, RevokeAccessRequest};

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Reply when the access lookup itself fails
pub const ACCESS_CHECK_FAILED: &str =
    "An error occurred while checking your access. Please try again later.";

/// Keys shown per page of `/list keys`
pub const KEYS_PER_PAGE: usize = 5;

const NO_REASON: &str = "No reason provided";

/// Outcome of an access check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    Granted(UserRecord),
    NoAccess,
    /// The grant lapsed; the record was just flagged inactive
    Expired,
}

impl AccessDecision {
    pub fn is_granted(&self) -> bool {
        matches!(self, Self::Granted(_))
    }

    /// Reply shown to a caller without a live grant
    pub fn denial_notice(&self) -> Option<Notice> {
        match self {
            Self::Granted(_) => None,
            Self::NoAccess => Some(Notice::error(
                "🔒 Access Denied",
                "You do not have access to use this command. Please contact an administrator.",
            )),
            Self::Expired => Some(Notice::warning(
                "⏳ Access Expired",
                "Your access has expired. Please contact an administrator to renew your access.",
            )),
        }
    }
}

/// Result of an access-gated operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Gated<T> {
    Done(T),
    Refused(Notice),
}

impl<T> Gated<T> {
    pub fn is_refused(&self) -> bool {
        matches!(self, Self::Refused(_))
    }

    pub fn done(self) -> Option<T> {
        match self {
            Self::Done(value) => Some(value),
            Self::Refused(_) => None,
        }
    }
}

/// Access service
pub struct AccessService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> AccessService<'a> {
    /// Create a new AccessService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Check whether `user_id` holds a live grant
    ///
    /// A lapsed grant is flagged inactive on the spot.
    #[instrument(skip(self))]
    pub async fn check(&self, user_id: Snowflake) -> ServiceResult<AccessDecision> {
        let Some(record) = self.ctx.user_repo().find_active(user_id).await? else {
            return Ok(AccessDecision::NoAccess);
        };

        if record.is_expired_at(self.ctx.clock().now()) {
            self.ctx.user_repo().set_active(user_id, false).await?;
            info!(user_id = %user_id, tier = %record.access_tier, "Access expired");
            return Ok(AccessDecision::Expired);
        }

        Ok(AccessDecision::Granted(record))
    }

    /// Grant or renew access and hand out the reseller role
    #[instrument(skip(self, request), fields(user_id = %request.user_id, tier = %request.tier))]
    pub async fn grant(&self, request: GrantAccessRequest) -> ServiceResult<Notice> {
        request.validate()?;

        let now = self.ctx.clock().now();
        let record = match self.ctx.user_repo().find_by_discord_id(request.user_id).await? {
            Some(mut existing) => {
                existing.apply_grant(&request.username, request.tier, now);
                existing
            }
            None => UserRecord::granted(request.user_id, &request.username, request.tier, now),
        };
        self.ctx.user_repo().upsert(&record).await?;

        self.ensure_role(request.user_id, true, "Access granted").await?;

        let reason = request.reason.as_deref().unwrap_or(NO_REASON);
        let summary = grant_summary(request.tier, record.access_expires);

        let dm = Notice::success(
            "Access Granted",
            format!("You have been granted access to the bot.\n\n{summary}"),
        )
        .footer(format!("Reason: {reason}"))
        .timestamp(now);
        self.best_effort_dm(request.user_id, dm).await;

        info!(user_id = %request.user_id, tier = %request.tier, "Access granted");

        Ok(Notice::success(
            "Access Granted",
            format!(
                "{} has been granted access to the bot.\n\n{summary}",
                request.user_id.user_mention()
            ),
        )
        .footer(format!("Reason: {reason}"))
        .timestamp(now))
    }

    /// Deactivate a grant and take the reseller role away
    #[instrument(skip(self, request), fields(user_id = %request.user_id))]
    pub async fn revoke(&self, request: RevokeAccessRequest) -> ServiceResult<Notice> {
        request.validate()?;

        if self
            .ctx
            .user_repo()
            .find_by_discord_id(request.user_id)
            .await?
            .is_some()
        {
            self.ctx.user_repo().set_active(request.user_id, false).await?;
        }

        self.ensure_role(request.user_id, false, "Access revoked").await?;

        let now = self.ctx.clock().now();
        let reason = request.reason.as_deref().unwrap_or(NO_REASON);

        let dm = Notice::error("Access Revoked", "Your access to the bot has been revoked.")
            .footer(format!("Reason: {reason}"))
            .timestamp(now);
        self.best_effort_dm(request.user_id, dm).await;

        info!(user_id = %request.user_id, "Access revoked");

        Ok(Notice::error(
            "Access Revoked",
            format!(
                "{} has been revoked access to the bot.",
                request.user_id.user_mention()
            ),
        )
        .footer(format!("Reason: {reason}"))
        .timestamp(now))
    }

    /// One page of the caller's keys, newest first
    ///
    /// Page numbers wrap, so any index is valid.
    #[instrument(skip(self))]
    pub async fn list_keys(&self, user_id: Snowflake, page: usize) -> ServiceResult<Gated<KeyListPage>> {
        let record = match self.check(user_id).await? {
            AccessDecision::Granted(record) => record,
            denied => return Ok(Gated::Refused(denial_or_default(&denied))),
        };

        let keys = record.keys_newest_first();
        if keys.is_empty() {
            return Ok(Gated::Done(KeyListPage {
                notice: Notice::new(
                    "🔑 No Keys Found",
                    "You have not generated any keys yet.",
                    colors::INFO,
                ),
                page: 0,
                total_pages: 1,
            }));
        }

        let total_pages = keys.len().div_ceil(KEYS_PER_PAGE);
        let page = page % total_pages;
        let start = page * KEYS_PER_PAGE;

        let description = keys
            .iter()
            .skip(start)
            .take(KEYS_PER_PAGE)
            .enumerate()
            .map(|(offset, key)| key_line(start + offset + 1, key))
            .collect::<Vec<_>>()
            .join("\n\n");

        Ok(Gated::Done(KeyListPage {
            notice: Notice::success("🔑 Your Generated Keys", description).footer(format!(
                "Page {} of {} • Total keys: {}",
                page + 1,
                total_pages,
                keys.len()
            )),
            page,
            total_pages,
        }))
    }

    async fn ensure_role(&self, user_id: Snowflake, present: bool, reason: &str) -> ServiceResult<()> {
        let role_id = self.ctx.guild().reseller_role_id;
        if role_id.is_zero() {
            return Ok(());
        }

        let guild_id = self.ctx.guild_id();
        let platform = self.ctx.platform();
        let has_role = platform.member_roles(guild_id, user_id).await?.contains(&role_id);

        if present && !has_role {
            platform.add_role(guild_id, user_id, role_id, reason).await?;
        } else if !present && has_role {
            platform.remove_role(guild_id, user_id, role_id, reason).await?;
        }
        Ok(())
    }

    async fn best_effort_dm(&self, user_id: Snowflake, notice: Notice) {
        if let Err(e) = self
            .ctx
            .platform()
            .direct_message(user_id, OutgoingMessage::notice(notice))
            .await
        {
            warn!(user_id = %user_id, error = %e, "Could not DM member");
        }
    }
}

pub(crate) fn denial_or_default(decision: &AccessDecision) -> Notice {
    decision
        .denial_notice()
        .unwrap_or_else(|| Notice::error("🔒 Access Denied", ACCESS_CHECK_FAILED))
}

fn grant_summary(tier: AccessTier, expires: Option<DateTime<Utc>>) -> String {
    let expiry = match expires {
        Some(at) => format!("**Expires:** <t:{}:R>", at.timestamp()),
        None => "**Access:** Lifetime".to_string(),
    };
    format!("**Tier:** {}\n{expiry}", tier.label())
}

fn key_line(number: usize, key: &GeneratedKey) -> String {
    let note = if key.note.is_empty() { "No note" } else { &key.note };
    format!(
        "**{number}.** `{}` - {} days\n   Created: <t:{}:f>\n   Note: {note}",
        key.value,
        key.days,
        key.created_at.timestamp()
    )
}
