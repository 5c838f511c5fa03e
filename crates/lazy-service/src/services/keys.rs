//! Key service
//!
//! Mints product keys through the licensing panel for members with access,
//! and resets the hardware binding of existing keys.

use lazy_core::entities::colors;
use lazy_core::{GeneratedKey, KeyOrder, Notice, Snowflake};
use tracing::{info, instrument, warn};
use validator::Validate;

use crate::dto::{GenerateKeyRequest, HwidResetRequest};

use super::access::{denial_or_default, AccessDecision, AccessService, Gated};
use super::context::ServiceContext;
use super::error::ServiceResult;

/// Key service
pub struct KeyService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> KeyService<'a> {
    /// Create a new KeyService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Interim reply while the panel works
    pub fn progress_notice() -> Notice {
        Notice::new(
            "Generating Key...",
            "Please wait while we generate your key...",
            colors::INFO,
        )
    }

    /// Generate one key and store it on the caller's record
    #[instrument(skip(self, request), fields(days = request.days))]
    pub async fn generate(
        &self,
        user_id: Snowflake,
        request: GenerateKeyRequest,
    ) -> ServiceResult<Gated<Notice>> {
        if let Some(refusal) = self.refusal(user_id).await? {
            return Ok(Gated::Refused(refusal));
        }
        request.validate()?;

        let order = KeyOrder::single(request.days, request.note.clone());
        let value = self.ctx.key_panel().generate_key(&order).await.inspect_err(|e| {
            warn!(user_id = %user_id, error = %e, "Key generation failed");
        })?;

        let now = self.ctx.clock().now();
        let key = GeneratedKey::new(&value, request.days, &request.note, now);
        self.ctx.user_repo().push_key(user_id, &key).await?;

        info!(user_id = %user_id, days = request.days, "Key generated");

        Ok(Gated::Done(
            Notice::success(
                "✅ Key Generated Successfully",
                format!(
                    "**Key:** `{value}`\n**Days:** {}\n**Note:** {}",
                    request.days, request.note
                ),
            )
            .footer("Key generated successfully")
            .timestamp(now),
        ))
    }

    /// Clear the hardware binding of a key
    #[instrument(skip(self, request))]
    pub async fn reset_hwid(
        &self,
        user_id: Snowflake,
        request: HwidResetRequest,
    ) -> ServiceResult<Gated<Notice>> {
        if let Some(refusal) = self.refusal(user_id).await? {
            return Ok(Gated::Refused(refusal));
        }
        request.validate()?;

        self.ctx.key_panel().reset_hwid(&request.key).await.inspect_err(|e| {
            warn!(user_id = %user_id, error = %e, "HWID reset failed");
        })?;

        info!(user_id = %user_id, "HWID reset");

        Ok(Gated::Done(
            Notice::success(
                "HWID Reset Successful",
                format!(
                    "HWID has been reset for key: `{}`\n\nThe user can now activate the key on a new device.",
                    request.key
                ),
            )
            .timestamp(self.ctx.clock().now()),
        ))
    }

    async fn refusal(&self, user_id: Snowflake) -> ServiceResult<Option<Notice>> {
        let decision = AccessService::new(self.ctx).check(user_id).await?;
        Ok(match decision {
            AccessDecision::Granted(_) => None,
            denied => Some(denial_or_default(&denied)),
        })
    }
}
