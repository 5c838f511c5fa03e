//! Rules acceptance

use lazy_core::{Notice, RoleHolder, Snowflake};
use tracing::{info, instrument};

use super::context::ServiceContext;
use super::error::ServiceResult;
use crate::dto::Reply;

/// Grants the verified role to members who accept the rules
pub struct VerificationService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> VerificationService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    #[instrument(skip(self, member))]
    pub async fn accept_rules(&self, user_id: Snowflake, member: &dyn RoleHolder) -> ServiceResult<Reply> {
        let role_id = self.ctx.guild().verified_role_id;
        if role_id.is_zero() {
            return Ok(Reply::text(
                "Error: Could not find the verification role. Please contact an administrator.",
            ));
        }
        if member.has_role(role_id) {
            return Ok(Reply::text("You are already verified!"));
        }

        self.ctx
            .platform()
            .add_role(self.ctx.guild_id(), user_id, role_id, "Accepted the rules")
            .await?;

        info!(user_id = %user_id, "Member verified");

        Ok(Notice::success(
            "Verification Successful",
            "You have accepted the rules and have been given access to the server.",
        )
        .timestamp(self.ctx.clock().now())
        .into())
    }
}
