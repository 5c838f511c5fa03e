//! Button and select menu routing

use serenity::all::{
    ComponentInteraction, ComponentInteractionDataKind, Context, CreateInteractionResponse,
    CreateInteractionResponseMessage,
};
use tracing::{error, info, instrument, warn};

use lazy_core::{PrivateChannelKind, Snowflake};
use lazy_service::dto::Reply;
use lazy_service::services::panels::{
    APPLY_BUTTON_ID, PURCHASE_SELECT_ID, RULES_ACCEPT_ID, SUPPORT_BUTTON_ID,
};
use lazy_service::services::tickets::closing_button;
use lazy_service::services::{
    AccessService, CloseOutcome, Gated, TicketService, VerificationService,
};
use lazy_service::{ServiceError, ServiceResult};

use super::slash::{key_page_reply, parse_page_id};
use super::{member_roles, Handler};
use crate::render;

/// Which close button was pressed, if any
fn close_kind(custom_id: &str) -> Option<PrivateChannelKind> {
    [PrivateChannelKind::Application, PrivateChannelKind::Ticket]
        .into_iter()
        .find(|kind| kind.close_button_id() == custom_id)
}

fn selected_value(component: &ComponentInteraction) -> Option<&str> {
    match &component.data.kind {
        ComponentInteractionDataKind::StringSelect { values } => values.first().map(String::as_str),
        _ => None,
    }
}

async fn respond(ctx: &Context, component: &ComponentInteraction, response: CreateInteractionResponse) {
    if let Err(e) = component.create_response(ctx, response).await {
        warn!(custom_id = %component.data.custom_id, error = %e, "Failed to answer component");
    }
}

async fn reply(ctx: &Context, component: &ComponentInteraction, reply: Reply) {
    let response = CreateInteractionResponse::Message(render::response_message(reply));
    respond(ctx, component, response).await;
}

impl Handler {
    #[instrument(skip_all, fields(custom_id = %component.data.custom_id, user_id = %component.user.id))]
    pub(super) async fn on_component(&self, ctx: &Context, component: &ComponentInteraction) {
        let custom_id = component.data.custom_id.as_str();

        if let Some(kind) = close_kind(custom_id) {
            self.close_channel(ctx, component, kind).await;
            return;
        }
        if let Some(page) = parse_page_id(custom_id) {
            self.turn_key_page(ctx, component, page).await;
            return;
        }

        let result = self.open_or_verify(component, custom_id).await;
        let answer = result.unwrap_or_else(|e| {
            error!(code = e.error_code(), error = %e, "Component action failed");
            Reply::notice(e.notice())
        });
        reply(ctx, component, answer).await;
    }

    async fn open_or_verify(
        &self,
        component: &ComponentInteraction,
        custom_id: &str,
    ) -> ServiceResult<Reply> {
        let user_id = Snowflake::from(component.user.id.get());
        let username = component.user.name.as_str();
        let tickets = TicketService::new(&self.services);

        match custom_id {
            SUPPORT_BUTTON_ID => {
                let outcome = tickets.open_ticket(user_id, username).await?;
                Ok(Reply::text(outcome.reply(PrivateChannelKind::Ticket)))
            }
            APPLY_BUTTON_ID => {
                let outcome = tickets.open_application(user_id, username).await?;
                Ok(Reply::text(outcome.reply(PrivateChannelKind::Application)))
            }
            PURCHASE_SELECT_ID => {
                let product = selected_value(component)
                    .and_then(|value| Snowflake::parse(value).ok())
                    .ok_or_else(|| ServiceError::validation("Please pick a product."))?;
                let roles = member_roles(component.member.as_ref());
                let outcome = tickets
                    .open_purchase(user_id, username, &roles, product)
                    .await?;
                Ok(Reply::text(outcome.reply(PrivateChannelKind::Purchase)))
            }
            RULES_ACCEPT_ID => {
                let roles = member_roles(component.member.as_ref());
                VerificationService::new(&self.services)
                    .accept_rules(user_id, &roles)
                    .await
            }
            other => {
                warn!(custom_id = other, "Unknown component");
                Ok(Reply::text("This button is no longer supported."))
            }
        }
    }

    /// Swap the button for a disabled "Closing..." one, then archive and delete
    async fn close_channel(
        &self,
        ctx: &Context,
        component: &ComponentInteraction,
        kind: PrivateChannelKind,
    ) {
        let channel_id = Snowflake::from(component.channel_id.get());
        let closer_id = Snowflake::from(component.user.id.get());
        let closer_tag = component.user.tag();
        let tickets = TicketService::new(&self.services);

        let outcome = match kind {
            PrivateChannelKind::Application => {
                let roles = member_roles(component.member.as_ref());
                tickets
                    .begin_close_application(channel_id, closer_id, &closer_tag, &roles)
                    .await
            }
            PrivateChannelKind::Ticket | PrivateChannelKind::Purchase => {
                tickets
                    .begin_close_ticket(channel_id, closer_id, &closer_tag)
                    .await
            }
        };

        match outcome {
            Ok(CloseOutcome::Pending(pending)) => {
                let update = CreateInteractionResponseMessage::new()
                    .components(render::action_rows(&[closing_button(kind)]));
                respond(ctx, component, CreateInteractionResponse::UpdateMessage(update)).await;
                info!(channel_id = %channel_id, kind = kind.label(), "Closing channel");
                // deletion runs on its own after the configured delay
                let _ = tickets.finish_close(pending).await;
            }
            Ok(CloseOutcome::Refused(text)) => reply(ctx, component, Reply::text(text)).await,
            Err(e) => {
                error!(code = e.error_code(), error = %e, "Close failed");
                reply(ctx, component, Reply::notice(e.notice())).await;
            }
        }
    }

    async fn turn_key_page(&self, ctx: &Context, component: &ComponentInteraction, page: usize) {
        let user_id = Snowflake::from(component.user.id.get());
        let answer = match AccessService::new(&self.services).list_keys(user_id, page).await {
            Ok(Gated::Done(page)) => key_page_reply(page),
            Ok(Gated::Refused(notice)) => Reply::notice(notice),
            Err(e) => {
                error!(code = e.error_code(), error = %e, "Key listing failed");
                Reply::notice(e.notice())
            }
        };
        let update = render::update_message(answer.message);
        respond(ctx, component, CreateInteractionResponse::UpdateMessage(update)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_close_kind() {
        assert_eq!(close_kind("close_ticket"), Some(PrivateChannelKind::Ticket));
        assert_eq!(close_kind("close_application"), Some(PrivateChannelKind::Application));
        assert_eq!(close_kind("apply"), None);
    }
}
