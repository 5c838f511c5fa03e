//! Application decisions
//!
//! Staff approve or deny membership applications. A denial blocks
//! reapplication for 31 days.

use chrono::{DateTime, Utc};
use lazy_core::entities::DENIAL_BLOCK_DAYS;
use lazy_core::{Application, Notice, OutgoingMessage, ReapplyGate, Snowflake};
use tracing::{info, instrument, warn};
use validator::Validate;

use crate::dto::{ApplicationDecisionRequest, Reply};

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Application service
pub struct ApplicationService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ApplicationService<'a> {
    /// Create a new ApplicationService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Whether `user_id` may apply now
    #[instrument(skip(self))]
    pub async fn can_reapply(&self, user_id: Snowflake) -> ServiceResult<ReapplyGate> {
        let now = self.ctx.clock().now();
        let latest = self
            .ctx
            .application_repo()
            .latest_active_denial(user_id, now)
            .await?;
        Ok(ReapplyGate::evaluate(latest.as_ref(), now))
    }

    /// Approve an application and hand out the approved role
    #[instrument(skip(self, request), fields(user_id = %request.user_id))]
    pub async fn approve(
        &self,
        request: ApplicationDecisionRequest,
        handler_id: Snowflake,
        handler_tag: &str,
    ) -> ServiceResult<Reply> {
        request.validate()?;

        let now = self.ctx.clock().now();
        let application = Application::approved(request.user_id, handler_id, request.reason, now);
        self.ctx.application_repo().create(&application).await?;

        let role_id = self.ctx.guild().approved_role_id;
        if !role_id.is_zero() {
            self.ctx
                .platform()
                .add_role(self.ctx.guild_id(), request.user_id, role_id, "Application approved")
                .await?;
        }

        let dm = Notice::success(
            "✅ Application Approved",
            format!("Your application has been approved by {handler_tag}"),
        )
        .field("Reason", &application.reason, false)
        .timestamp(now);
        self.best_effort_dm(request.user_id, dm).await;

        info!(user_id = %request.user_id, handler_id = %handler_id, "Application approved");

        Ok(Reply::text(format!(
            "✅ Successfully approved {}'s application.",
            request.username
        )))
    }

    /// Deny an application; the applicant is blocked for 31 days
    #[instrument(skip(self, request), fields(user_id = %request.user_id))]
    pub async fn deny(
        &self,
        request: ApplicationDecisionRequest,
        handler_id: Snowflake,
        handler_tag: &str,
    ) -> ServiceResult<Reply> {
        request.validate()?;

        let now = self.ctx.clock().now();
        let application = Application::denied(request.user_id, handler_id, request.reason, now);
        self.ctx.application_repo().create(&application).await?;

        let reapply_at = application.expires_at.unwrap_or(now);
        let dm = Notice::error(
            "❌ Application Denied",
            format!(
                "Your application has been denied by {handler_tag}\n\n\
                 You can reapply after: <t:{}:D>\n(This is {} days from now)",
                reapply_at.timestamp(),
                days_until(now, reapply_at)
            ),
        )
        .field("Reason", &application.reason, false)
        .timestamp(now);
        self.best_effort_dm(request.user_id, dm).await;

        info!(user_id = %request.user_id, handler_id = %handler_id, "Application denied");

        Ok(Reply::notice(
            Notice::error("✅ Application Denied", format!("{}'s application was denied.", request.username))
                .field("Reason", &application.reason, false)
                .field(
                    "Note",
                    format!("They cannot reapply for {DENIAL_BLOCK_DAYS} days."),
                    false,
                )
                .timestamp(now),
        ))
    }

    async fn best_effort_dm(&self, user_id: Snowflake, notice: Notice) {
        if let Err(e) = self
            .ctx
            .platform()
            .direct_message(user_id, OutgoingMessage::notice(notice))
            .await
        {
            warn!(user_id = %user_id, error = %e, "Could not DM applicant");
        }
    }
}

fn days_until(now: DateTime<Utc>, at: DateTime<Utc>) -> i64 {
    let hours = (at - now).num_hours();
    (hours + 23) / 24
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestHarness;
    use chrono::Duration;

    const ALICE: Snowflake = Snowflake::new(1001);
    const STAFF_MEMBER: Snowflake = Snowflake::new(1002);

    fn decision(reason: Option<&str>) -> ApplicationDecisionRequest {
        ApplicationDecisionRequest {
            user_id: ALICE,
            username: "alice".to_string(),
            reason: reason.map(String::from),
        }
    }

    #[tokio::test]
    async fn test_approve_adds_role_and_dms() {
        let h = TestHarness::new();
        let reply = ApplicationService::new(&h.ctx)
            .approve(decision(None), STAFF_MEMBER, "staff")
            .await
            .unwrap();

        assert_eq!(
            reply.message.content.as_deref(),
            Some("✅ Successfully approved alice's application.")
        );
        assert!(h.platform.has_role(ALICE, h.ctx.guild().approved_role_id));

        let dm = &h.platform.dms_to(ALICE)[0].notices[0];
        assert_eq!(dm.title, "✅ Application Approved");
        assert_eq!(dm.fields[0].value, "No reason provided.");
        assert_eq!(h.applications.len(), 1);
    }

    #[tokio::test]
    async fn test_deny_blocks_for_31_days() {
        let h = TestHarness::new();
        let service = ApplicationService::new(&h.ctx);
        service
            .deny(decision(Some("incomplete answers")), STAFF_MEMBER, "staff")
            .await
            .unwrap();

        let dm = &h.platform.dms_to(ALICE)[0].notices[0];
        assert!(dm.description.contains("(This is 31 days from now)"));
        assert_eq!(dm.fields[0].value, "incomplete answers");

        h.clock.advance(Duration::days(30));
        assert!(matches!(
            service.can_reapply(ALICE).await.unwrap(),
            ReapplyGate::Blocked { days_left: 1, .. }
        ));

        h.clock.advance(Duration::days(2));
        assert_eq!(service.can_reapply(ALICE).await.unwrap(), ReapplyGate::Allowed);
    }

    #[tokio::test]
    async fn test_approval_does_not_block() {
        let h = TestHarness::new();
        let service = ApplicationService::new(&h.ctx);
        service.approve(decision(None), STAFF_MEMBER, "staff").await.unwrap();
        assert!(service.can_reapply(ALICE).await.unwrap().is_allowed());
    }

    #[tokio::test]
    async fn test_latest_denial_wins() {
        let h = TestHarness::new();
        let service = ApplicationService::new(&h.ctx);
        service.deny(decision(None), STAFF_MEMBER, "staff").await.unwrap();
        h.clock.advance(Duration::days(20));
        service.deny(decision(None), STAFF_MEMBER, "staff").await.unwrap();

        h.clock.advance(Duration::days(15));
        assert!(matches!(
            service.can_reapply(ALICE).await.unwrap(),
            ReapplyGate::Blocked { days_left: 16, .. }
        ));
    }

    #[test]
    fn test_days_until_rounds_up() {
        let now = Utc::now();
        assert_eq!(days_until(now, now + Duration::days(31)), 31);
        assert_eq!(days_until(now, now + Duration::hours(25)), 2);
    }
}
