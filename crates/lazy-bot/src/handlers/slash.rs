//! Slash command routing

use serenity::all::{
    CommandInteraction, Context, CreateInteractionResponse, EditInteractionResponse,
};
use tracing::{error, info, instrument, warn};

use lazy_core::entities::{ButtonStyle, Component};
use lazy_core::{AccessTier, OutgoingMessage, RoleHolder, Snowflake, Verdict};
use lazy_service::dto::{
    ApplicationDecisionRequest, GenerateKeyRequest, GrantAccessRequest, HwidResetRequest,
    KeyListPage, Reply, RevokeAccessRequest,
};
use lazy_service::services::commands::slash;
use lazy_service::services::{
    AccessService, ApplicationService, CommandSurface, Gated, KeyService,
};
use lazy_service::{ServiceError, ServiceResult};

use super::{member_roles, partial_channel_context, Caller, Handler};
use crate::options::Options;
use crate::render;

const PAGE_PREFIX: &str = "keys:";

/// Key list message with paging buttons when there is more than one page
pub fn key_page_reply(page: KeyListPage) -> Reply {
    let paging = page.has_pages().then(|| (page.previous_page(), page.next_page()));
    let mut message = OutgoingMessage::notice(page.notice);
    if let Some((previous, next)) = paging {
        message.components = vec![
            Component::Button {
                custom_id: format!("{PAGE_PREFIX}prev:{previous}"),
                label: "Previous".to_string(),
                emoji: Some("⬅️".to_string()),
                style: ButtonStyle::Secondary,
                disabled: false,
            },
            Component::Button {
                custom_id: format!("{PAGE_PREFIX}next:{next}"),
                label: "Next".to_string(),
                emoji: Some("➡️".to_string()),
                style: ButtonStyle::Secondary,
                disabled: false,
            },
        ];
    }
    Reply::ephemeral(message)
}

/// Page a paging button points at
pub fn parse_page_id(custom_id: &str) -> Option<usize> {
    let rest = custom_id.strip_prefix(PAGE_PREFIX)?;
    let page = rest
        .strip_prefix("prev:")
        .or_else(|| rest.strip_prefix("next:"))?;
    page.parse().ok()
}

fn unwrap_gated<T>(gated: Gated<T>, done: impl FnOnce(T) -> Reply) -> Reply {
    match gated {
        Gated::Done(value) => done(value),
        Gated::Refused(notice) => Reply::notice(notice),
    }
}

async fn respond(ctx: &Context, command: &CommandInteraction, reply: Reply) {
    let response = CreateInteractionResponse::Message(render::response_message(reply));
    if let Err(e) = command.create_response(ctx, response).await {
        warn!(command = %command.data.name, error = %e, "Failed to answer command");
    }
}

async fn edit(ctx: &Context, command: &CommandInteraction, message: OutgoingMessage) {
    if let Err(e) = command
        .edit_response(ctx, render::edit_response(message))
        .await
    {
        warn!(command = %command.data.name, error = %e, "Failed to edit command response");
    }
}

fn error_reply(command: &str, e: &ServiceError) -> Reply {
    error!(command, code = e.error_code(), error = %e, "Command failed");
    Reply::notice(e.notice())
}

impl Handler {
    #[instrument(skip_all, fields(command = %command.data.name, user_id = %command.user.id))]
    pub(super) async fn on_command(&self, ctx: &Context, command: &CommandInteraction) {
        let name = command.data.name.as_str();
        let user_id = Snowflake::from(command.user.id.get());
        let roles = member_roles(command.member.as_deref());
        let caller = Caller {
            user_id,
            channel_id: command.channel_id,
            carried_channel: command.channel.as_ref().map(partial_channel_context),
            guild_id: command.guild_id,
            member: command.member.as_ref().map(|_| &roles as &dyn RoleHolder),
        };

        match self.validate(CommandSurface::Slash, name, caller).await {
            Ok(Verdict::Allowed) => {}
            Ok(Verdict::Denied(denial)) => {
                info!(reason = %denial.reply(), "Command denied");
                respond(ctx, command, Reply::text(denial.reply())).await;
                return;
            }
            Err(e) => {
                respond(ctx, command, error_reply(name, &e)).await;
                return;
            }
        }

        let options = Options::new(command.data.options());
        let result = match name {
            slash::KEY => return self.generate_key(ctx, command, user_id, options).await,
            slash::HWID_RESET => return self.reset_hwid(ctx, command, user_id, &options).await,
            slash::LIST => self.list_keys(user_id).await,
            slash::ACCESS => self.manage_access(options).await,
            slash::APPLICATION => self.decide_application(command, options).await,
            other => {
                warn!(command = other, "Unknown slash command");
                Ok(Reply::text("Unknown command."))
            }
        };

        let reply = result.unwrap_or_else(|e| error_reply(name, &e));
        respond(ctx, command, reply).await;
    }

    /// The panel takes seconds, so a progress notice goes out first
    async fn generate_key(
        &self,
        ctx: &Context,
        command: &CommandInteraction,
        user_id: Snowflake,
        options: Options<'_>,
    ) {
        let Some(("generate", options)) = options.subcommand() else {
            respond(ctx, command, Reply::text("Unknown subcommand.")).await;
            return;
        };
        let request = GenerateKeyRequest {
            days: options
                .integer("days")
                .and_then(|days| i32::try_from(days).ok())
                .unwrap_or_default(),
            note: options.string("note").unwrap_or_default().to_string(),
        };

        respond(ctx, command, Reply::notice(KeyService::progress_notice())).await;

        let notice = match KeyService::new(&self.services).generate(user_id, request).await {
            Ok(Gated::Done(notice) | Gated::Refused(notice)) => notice,
            Err(e) => {
                error!(code = e.error_code(), error = %e, "Key generation failed");
                e.notice()
            }
        };
        edit(ctx, command, OutgoingMessage::notice(notice)).await;
    }

    async fn reset_hwid(
        &self,
        ctx: &Context,
        command: &CommandInteraction,
        user_id: Snowflake,
        options: &Options<'_>,
    ) {
        if let Err(e) = command.defer_ephemeral(ctx).await {
            warn!(error = %e, "Failed to defer HWID reset");
            return;
        }

        let request = HwidResetRequest {
            key: options.string("key").unwrap_or_default().trim().to_string(),
        };
        let notice = match KeyService::new(&self.services).reset_hwid(user_id, request).await {
            Ok(Gated::Done(notice) | Gated::Refused(notice)) => notice,
            Err(e) => {
                error!(code = e.error_code(), error = %e, "HWID reset failed");
                e.notice()
            }
        };
        if let Err(e) = command
            .edit_response(ctx, EditInteractionResponse::new().embed(render::embed(&notice)))
            .await
        {
            warn!(error = %e, "Failed to edit HWID reset response");
        }
    }

    async fn list_keys(&self, user_id: Snowflake) -> ServiceResult<Reply> {
        let gated = AccessService::new(&self.services).list_keys(user_id, 0).await?;
        Ok(unwrap_gated(gated, key_page_reply))
    }

    async fn manage_access(&self, options: Options<'_>) -> ServiceResult<Reply> {
        let access = AccessService::new(&self.services);
        match options.subcommand() {
            Some(("grant", options)) => {
                let member = options
                    .user("member")
                    .ok_or_else(|| ServiceError::validation("A member is required."))?;
                let tier: AccessTier = options
                    .string("tier")
                    .unwrap_or_default()
                    .parse()
                    .map_err(ServiceError::validation)?;
                let notice = access
                    .grant(GrantAccessRequest {
                        user_id: member.id.get().into(),
                        username: member.name.clone(),
                        tier,
                        reason: options.string("reason").map(str::to_string),
                    })
                    .await?;
                Ok(Reply::notice(notice))
            }
            Some(("revoke", options)) => {
                let member = options
                    .user("member")
                    .ok_or_else(|| ServiceError::validation("A member is required."))?;
                let notice = access
                    .revoke(RevokeAccessRequest {
                        user_id: member.id.get().into(),
                        reason: options.string("reason").map(str::to_string),
                    })
                    .await?;
                Ok(Reply::notice(notice))
            }
            _ => Ok(Reply::text("Unknown subcommand.")),
        }
    }

    async fn decide_application(
        &self,
        command: &CommandInteraction,
        options: Options<'_>,
    ) -> ServiceResult<Reply> {
        let handler_id = Snowflake::from(command.user.id.get());
        let handler_tag = command.user.tag();
        let applications = ApplicationService::new(&self.services);

        let Some((decision, options)) = options.subcommand() else {
            return Ok(Reply::text("Unknown subcommand."));
        };
        let applicant = options
            .user("user")
            .ok_or_else(|| ServiceError::validation("A user is required."))?;
        let request = ApplicationDecisionRequest {
            user_id: applicant.id.get().into(),
            username: applicant.name.clone(),
            reason: options.string("reason").map(str::to_string),
        };

        match decision {
            "approve" => applications.approve(request, handler_id, &handler_tag).await,
            "deny" => applications.deny(request, handler_id, &handler_tag).await,
            _ => Ok(Reply::text("Unknown subcommand.")),
        }
    }
}
