//! Gateway event handlers
//!
//! Translates serenity events into service calls. Every command passes the
//! [`CommandValidator`] before its service runs.

mod components;
mod members;
mod prefix;
mod slash;

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use serenity::all::{
    ChannelId, Context, EventHandler, GuildChannel, GuildId, Interaction, InviteCreateEvent,
    Member, Message, PartialChannel, Ready, RoleId,
};
use async_trait::async_trait;
use tracing::warn;

use lazy_core::{ChannelContext, Invocation, RoleHolder, Snowflake, Verdict};
use lazy_service::services::{CommandCatalog, CommandSurface, CommandValidator};
use lazy_service::{ServiceContext, ServiceError, ServiceResult};

use crate::gateway::{channel_kind, SerenityGateway};

pub use slash::{key_page_reply, parse_page_id};

/// Event handler shared by every shard
pub struct Handler {
    services: Arc<ServiceContext>,
    gateway: Arc<SerenityGateway>,
    catalog: CommandCatalog,
    prefix: String,
    ready: Arc<AtomicBool>,
}

impl Handler {
    pub fn new(
        services: Arc<ServiceContext>,
        gateway: Arc<SerenityGateway>,
        prefix: impl Into<String>,
        ready: Arc<AtomicBool>,
    ) -> Self {
        let catalog = CommandCatalog::new(services.guild(), services.owner_id());
        Self {
            services,
            gateway,
            catalog,
            prefix: prefix.into(),
            ready,
        }
    }

    /// Whether an event belongs to the served guild
    fn is_home_guild(&self, guild_id: Option<GuildId>) -> bool {
        guild_id.is_some_and(|id| Snowflake::from(id.get()) == self.services.guild_id())
    }

    /// Channel facts for the validator; what the event carried stands in
    /// when the lookup fails, otherwise the failure is the caller's error
    async fn channel_context(
        &self,
        channel_id: ChannelId,
        carried: Option<ChannelContext>,
    ) -> ServiceResult<ChannelContext> {
        match self.services.platform().channel(channel_id.get().into()).await {
            Ok(channel) => Ok(ChannelContext {
                id: channel.id,
                kind: channel.kind,
                parent_id: channel.parent_id,
                nsfw: channel.nsfw,
            }),
            Err(e) => {
                warn!(channel_id = %channel_id, error = %e, "Channel lookup failed");
                carried.ok_or_else(|| ServiceError::from(e))
            }
        }
    }

    /// Run the validator for one invocation
    async fn validate(
        &self,
        surface: CommandSurface,
        name: &str,
        caller: Caller<'_>,
    ) -> ServiceResult<Verdict> {
        let Some(constraints) = self.catalog.get(surface, name) else {
            return Ok(Verdict::Allowed);
        };

        let channel = self
            .channel_context(caller.channel_id, caller.carried_channel)
            .await?;
        let mut invocation = Invocation::new(caller.user_id).in_channel(channel);
        if let Some(member) = caller.member {
            invocation = invocation.with_member(member);
        }
        if let Some(guild_id) = caller.guild_id {
            invocation = invocation.in_guild(guild_id.get().into());
        }

        Ok(CommandValidator::from_context(&self.services).check(
            name,
            constraints,
            &invocation,
            self.services.clock().now(),
        ))
    }
}

/// Who invoked a command, and where
struct Caller<'a> {
    user_id: Snowflake,
    channel_id: ChannelId,
    /// Channel facts sent along with the event, if any
    carried_channel: Option<ChannelContext>,
    guild_id: Option<GuildId>,
    /// `None` outside a guild
    member: Option<&'a dyn RoleHolder>,
}

fn partial_channel_context(channel: &PartialChannel) -> ChannelContext {
    ChannelContext {
        id: channel.id.get().into(),
        kind: channel_kind(channel.kind),
        parent_id: channel.parent_id.map(|id| id.get().into()),
        nsfw: false,
    }
}

fn role_ids(roles: &[RoleId]) -> Vec<Snowflake> {
    roles.iter().map(|role| Snowflake::from(role.get())).collect()
}

fn member_roles(member: Option<&Member>) -> Vec<Snowflake> {
    member.map(|m| role_ids(&m.roles)).unwrap_or_default()
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        self.on_ready(&ctx, &ready).await;
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        match interaction {
            Interaction::Command(command) => self.on_command(&ctx, &command).await,
            Interaction::Component(component) => self.on_component(&ctx, &component).await,
            _ => {}
        }
    }

    async fn message(&self, ctx: Context, message: Message) {
        self.on_message(&ctx, &message).await;
    }

    async fn guild_member_addition(&self, _ctx: Context, member: Member) {
        self.on_member_join(&member).await;
    }

    async fn invite_create(&self, _ctx: Context, data: InviteCreateEvent) {
        self.on_invite_create(&data).await;
    }

    async fn channel_delete(
        &self,
        _ctx: Context,
        channel: GuildChannel,
        _messages: Option<Vec<Message>>,
    ) {
        // a manual delete must not leave the close claim behind
        self.services
            .closing_channels()
            .release(channel.id.get().into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serenity::all::Http;

    use lazy_core::{ChannelKind, Condition, Denial};
    use lazy_service::services::commands::slash;
    use lazy_service::testing::{guild_config, TestHarness};

    const USER: Snowflake = Snowflake::new(500);

    fn handler(h: &TestHarness) -> Handler {
        let gateway = Arc::new(SerenityGateway::new(Arc::new(Http::new("test-token"))));
        Handler::new(
            Arc::new(h.ctx.clone()),
            gateway,
            "!",
            Arc::new(AtomicBool::new(false)),
        )
    }

    fn text_channel(id: Snowflake) -> ChannelContext {
        ChannelContext {
            id,
            kind: ChannelKind::GuildText,
            parent_id: None,
            nsfw: false,
        }
    }

    fn caller(channel_id: Snowflake, carried: Option<ChannelContext>) -> Caller<'static> {
        Caller {
            user_id: USER,
            channel_id: ChannelId::new(channel_id.as_u64()),
            carried_channel: carried,
            guild_id: None,
            member: None,
        }
    }

    #[tokio::test]
    async fn test_unknown_channel_without_carried_facts_is_an_error() {
        let h = TestHarness::new();
        let result = handler(&h)
            .validate(CommandSurface::Slash, slash::KEY, caller(Snowflake::new(99), None))
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_failed_lookup_keeps_key_channel_gate() {
        let h = TestHarness::new();
        let handler = handler(&h);
        let elsewhere = Snowflake::new(99);

        let verdict = handler
            .validate(
                CommandSurface::Slash,
                slash::LIST,
                caller(elsewhere, Some(text_channel(elsewhere))),
            )
            .await
            .unwrap();
        assert_eq!(
            verdict,
            Verdict::Denied(Denial::Condition(Condition::AllowedChannels))
        );

        let key_channel = guild_config().key_channel_id;
        let verdict = handler
            .validate(
                CommandSurface::Slash,
                slash::LIST,
                caller(key_channel, Some(text_channel(key_channel))),
            )
            .await
            .unwrap();
        assert_eq!(verdict, Verdict::Allowed);
    }

    #[tokio::test]
    async fn test_fetched_channel_wins_over_carried_facts() {
        let h = TestHarness::new();
        let fetched = h.platform.add_text_channel("general", None);
        let key_channel = guild_config().key_channel_id;

        let verdict = handler(&h)
            .validate(
                CommandSurface::Slash,
                slash::LIST,
                caller(fetched, Some(text_channel(key_channel))),
            )
            .await
            .unwrap();
        assert!(!verdict.is_allowed());
    }

    #[tokio::test]
    async fn test_role_lists_apply_only_to_members() {
        let h = TestHarness::new();
        let handler = handler(&h);
        let channel = h.platform.add_text_channel("staff", None);

        let outside_guild = caller(channel, None);
        let verdict = handler
            .validate(CommandSurface::Slash, slash::APPLICATION, outside_guild)
            .await
            .unwrap();
        assert_eq!(verdict, Verdict::Allowed);

        let no_roles: Vec<Snowflake> = Vec::new();
        let member = Caller {
            member: Some(&no_roles),
            ..caller(channel, None)
        };
        let verdict = handler
            .validate(CommandSurface::Slash, slash::APPLICATION, member)
            .await
            .unwrap();
        assert_eq!(
            verdict,
            Verdict::Denied(Denial::Condition(Condition::AllowedRoles))
        );
    }

    #[test]
    fn test_role_ids() {
        let roles = [RoleId::new(5), RoleId::new(7)];
        assert_eq!(role_ids(&roles), vec![Snowflake::new(5), Snowflake::new(7)]);
        assert!(member_roles(None).is_empty());
    }
}
