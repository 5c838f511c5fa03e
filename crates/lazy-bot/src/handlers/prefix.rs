//! Staff prefix commands

use serenity::all::{Context, Message};
use tracing::{debug, error, info, instrument};

use lazy_core::{OutgoingMessage, Snowflake, Verdict};
use lazy_service::services::commands::prefix;
use lazy_service::services::panels::INVALID_CHANNEL;
use lazy_service::services::{CommandCatalog, CommandSurface, EmbedTemplate, PanelService};
use lazy_service::ServiceResult;

use super::{role_ids, Caller, Handler};

/// Split `<prefix>word rest...` into the command word and its arguments
pub fn split_command<'a>(content: &'a str, prefix: &str) -> Option<(&'a str, Vec<&'a str>)> {
    let rest = content.strip_prefix(prefix)?;
    let mut words = rest.split_whitespace();
    let word = words.next()?;
    Some((word, words.collect()))
}

/// Accepts a channel mention or a bare id
pub fn channel_arg(arg: &str) -> Option<Snowflake> {
    let raw = arg
        .strip_prefix("<#")
        .and_then(|rest| rest.strip_suffix('>'))
        .unwrap_or(arg);
    Snowflake::parse(raw).ok().filter(|id| !id.is_zero())
}

impl Handler {
    #[instrument(skip_all, fields(channel_id = %message.channel_id, user_id = %message.author.id))]
    pub(super) async fn on_message(&self, ctx: &Context, message: &Message) {
        if message.author.bot || !self.is_home_guild(message.guild_id) {
            return;
        }
        let Some((word, args)) = split_command(&message.content, &self.prefix) else {
            return;
        };
        let Some(name) = CommandCatalog::resolve_prefix(word) else {
            debug!(word, "Not a known prefix command");
            return;
        };

        let user_id = Snowflake::from(message.author.id.get());
        let channel_id = Snowflake::from(message.channel_id.get());
        let roles = match &message.member {
            Some(member) => role_ids(&member.roles),
            None => self
                .services
                .platform()
                .member_roles(self.services.guild_id(), user_id)
                .await
                .unwrap_or_default(),
        };

        let caller = Caller {
            user_id,
            channel_id: message.channel_id,
            carried_channel: None,
            guild_id: message.guild_id,
            member: Some(&roles),
        };
        match self.validate(CommandSurface::Prefix, name, caller).await {
            Ok(Verdict::Allowed) => {}
            Ok(Verdict::Denied(denial)) => {
                info!(command = name, reason = %denial.reply(), "Prefix command denied");
                self.say(channel_id, denial.reply()).await;
                return;
            }
            Err(e) => {
                error!(command = name, code = e.error_code(), error = %e, "Prefix command check failed");
                self.say(channel_id, e.user_message()).await;
                return;
            }
        }

        match self.run_prefix(name, channel_id, &args).await {
            Ok(Some(text)) => self.say(channel_id, text).await,
            Ok(None) => {}
            Err(e) => {
                error!(command = name, code = e.error_code(), error = %e, "Prefix command failed");
                self.say(channel_id, e.user_message()).await;
            }
        }

        // the command message is clutter once handled
        if let Err(e) = message.delete(ctx).await {
            debug!(error = %e, "Could not delete command message");
        }
    }

    /// Returns the text to post back, if any
    async fn run_prefix(
        &self,
        name: &str,
        channel_id: Snowflake,
        args: &[&str],
    ) -> ServiceResult<Option<String>> {
        let panels = PanelService::new(&self.services);
        match name {
            prefix::APPLICATION => {
                panels.post_application_panel(channel_id).await?;
                Ok(None)
            }
            prefix::PURCHASE => panels.post_purchase_panel(channel_id).await,
            prefix::EMBED => {
                let (Some(template), Some(target)) = (args.first(), args.get(1)) else {
                    return Ok(Some(format!(
                        "Usage: {}embed <rules|support> <#channel>",
                        self.prefix
                    )));
                };
                let template: EmbedTemplate = match template.parse() {
                    Ok(template) => template,
                    Err(text) => return Ok(Some(text)),
                };
                let Some(target) = channel_arg(target) else {
                    return Ok(Some(INVALID_CHANNEL.to_string()));
                };
                panels.post_embed(template, target).await.map(Some)
            }
            _ => Ok(None),
        }
    }

    async fn say(&self, channel_id: Snowflake, text: impl Into<String>) {
        if let Err(e) = self
            .services
            .platform()
            .send_message(channel_id, OutgoingMessage::text(text))
            .await
        {
            error!(channel_id = %channel_id, error = %e, "Failed to post reply");
        }
    }
}
