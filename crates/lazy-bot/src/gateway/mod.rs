//! serenity-backed implementation of the [`PlatformGateway`] port

use std::sync::Arc;

use async_trait::async_trait;
use chrono::DateTime;
use parking_lot::RwLock;
use serenity::all::{
    Channel, ChannelId, ChannelType, CreateChannel, GetMessages, GuildChannel, GuildId, Http,
    Message, PermissionOverwrite, PermissionOverwriteType, Permissions, RoleId, UserId,
};
use serenity::http::HttpError;
use tracing::{debug, instrument};

use lazy_core::{
    ChannelInfo, ChannelKind, DomainError, HistoryMessage, InviteUsage, OutgoingMessage,
    PlatformGateway, PlatformResult, Snowflake,
};

use crate::render::create_message;

/// Discord history page size limit
const HISTORY_PAGE: u8 = 100;

/// Platform access over Discord's HTTP API
pub struct SerenityGateway {
    http: Arc<Http>,
    bot_id: RwLock<Option<UserId>>,
}

impl SerenityGateway {
    pub fn new(http: Arc<Http>) -> Self {
        Self {
            http,
            bot_id: RwLock::new(None),
        }
    }

    /// Remember the bot's own user once the session is ready
    pub fn set_bot_id(&self, id: UserId) {
        *self.bot_id.write() = Some(id);
    }

    fn http(&self) -> &Http {
        self.http.as_ref()
    }

    fn channel_info(&self, channel: &GuildChannel) -> ChannelInfo {
        let bot_id = *self.bot_id.read();
        ChannelInfo {
            id: channel.id.get().into(),
            name: channel.name.clone(),
            kind: channel_kind(channel.kind),
            guild_id: Some(channel.guild_id.get().into()),
            parent_id: channel.parent_id.map(|id| id.get().into()),
            nsfw: channel.nsfw,
            member_overwrites: channel
                .permission_overwrites
                .iter()
                .filter_map(|overwrite| match overwrite.kind {
                    PermissionOverwriteType::Member(user) if Some(user) != bot_id => {
                        Some(user.get().into())
                    }
                    _ => None,
                })
                .collect(),
        }
    }
}

impl std::fmt::Debug for SerenityGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerenityGateway")
            .field("bot_id", &*self.bot_id.read())
            .finish()
    }
}

pub(crate) fn channel_kind(kind: ChannelType) -> ChannelKind {
    match kind {
        ChannelType::Text => ChannelKind::GuildText,
        ChannelType::Category => ChannelKind::GuildCategory,
        ChannelType::Private => ChannelKind::Direct,
        _ => ChannelKind::Other,
    }
}

fn is_not_found(err: &serenity::Error) -> bool {
    matches!(
        err,
        serenity::Error::Http(HttpError::UnsuccessfulRequest(response))
            if response.status_code.as_u16() == 404
    )
}

fn platform_error(err: serenity::Error) -> DomainError {
    DomainError::PlatformError(err.to_string())
}

/// Id conversion; zero ids are rejected before they reach serenity
fn nonzero(id: Snowflake, what: &'static str) -> PlatformResult<u64> {
    if id.is_zero() {
        return Err(DomainError::MissingContext(what));
    }
    Ok(id.as_u64())
}

fn history_message(message: &Message) -> HistoryMessage {
    HistoryMessage {
        id: message.id.get().into(),
        author_id: message.author.id.get().into(),
        author_name: message.author.name.clone(),
        author_is_bot: message.author.bot,
        content: message.content.clone(),
        attachments: message.attachments.iter().map(|a| a.url.clone()).collect(),
        embed_titles: message.embeds.iter().filter_map(|e| e.title.clone()).collect(),
        created_at: DateTime::from_timestamp(message.timestamp.unix_timestamp(), 0)
            .unwrap_or_default(),
    }
}

#[async_trait]
impl PlatformGateway for SerenityGateway {
    #[instrument(skip(self))]
    async fn guild_channels(&self, guild_id: Snowflake) -> PlatformResult<Vec<ChannelInfo>> {
        let guild = GuildId::new(nonzero(guild_id, "guild")?);
        let channels = guild.channels(self.http()).await.map_err(platform_error)?;
        Ok(channels.values().map(|c| self.channel_info(c)).collect())
    }

    #[instrument(skip(self))]
    async fn channel(&self, channel_id: Snowflake) -> PlatformResult<ChannelInfo> {
        let id = ChannelId::new(nonzero(channel_id, "channel")?);
        match id.to_channel(self.http()).await {
            Ok(Channel::Guild(channel)) => Ok(self.channel_info(&channel)),
            Ok(Channel::Private(channel)) => Ok(ChannelInfo {
                id: channel.id.get().into(),
                name: String::new(),
                kind: ChannelKind::Direct,
                guild_id: None,
                parent_id: None,
                nsfw: false,
                member_overwrites: Vec::new(),
            }),
            Ok(_) => Err(DomainError::ChannelNotFound(channel_id)),
            Err(e) if is_not_found(&e) => Err(DomainError::ChannelNotFound(channel_id)),
            Err(e) => Err(platform_error(e)),
        }
    }

    #[instrument(skip(self))]
    async fn create_private_channel(
        &self,
        guild_id: Snowflake,
        name: &str,
        category_id: Option<Snowflake>,
        member: Snowflake,
    ) -> PlatformResult<ChannelInfo> {
        let guild = GuildId::new(nonzero(guild_id, "guild")?);
        let visible = Permissions::VIEW_CHANNEL
            | Permissions::SEND_MESSAGES
            | Permissions::READ_MESSAGE_HISTORY
            | Permissions::ATTACH_FILES;

        // @everyone shares the guild's id
        let mut overwrites = vec![
            PermissionOverwrite {
                allow: Permissions::empty(),
                deny: Permissions::VIEW_CHANNEL,
                kind: PermissionOverwriteType::Role(RoleId::new(guild.get())),
            },
            PermissionOverwrite {
                allow: visible,
                deny: Permissions::empty(),
                kind: PermissionOverwriteType::Member(UserId::new(nonzero(member, "member")?)),
            },
        ];
        if let Some(bot) = *self.bot_id.read() {
            overwrites.push(PermissionOverwrite {
                allow: visible | Permissions::MANAGE_CHANNELS,
                deny: Permissions::empty(),
                kind: PermissionOverwriteType::Member(bot),
            });
        }

        let mut builder = CreateChannel::new(name)
            .kind(ChannelType::Text)
            .permissions(overwrites);
        if let Some(category) = category_id.filter(|c| !c.is_zero()) {
            builder = builder.category(ChannelId::new(category.as_u64()));
        }

        let channel = guild
            .create_channel(self.http(), builder)
            .await
            .map_err(platform_error)?;
        debug!(channel_id = %channel.id, "Private channel created");
        Ok(self.channel_info(&channel))
    }

    async fn send_message(&self, channel_id: Snowflake, message: OutgoingMessage) -> PlatformResult<()> {
        ChannelId::new(nonzero(channel_id, "channel")?)
            .send_message(self.http(), create_message(message))
            .await
            .map_err(platform_error)?;
        Ok(())
    }

    async fn direct_message(&self, user_id: Snowflake, message: OutgoingMessage) -> PlatformResult<()> {
        UserId::new(nonzero(user_id, "user")?)
            .direct_message(self.http(), create_message(message))
            .await
            .map_err(platform_error)?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn fetch_history(&self, channel_id: Snowflake) -> PlatformResult<Vec<HistoryMessage>> {
        let channel = ChannelId::new(nonzero(channel_id, "channel")?);
        let mut history = Vec::new();
        let mut before = None;

        loop {
            let mut request = GetMessages::new().limit(HISTORY_PAGE);
            if let Some(id) = before {
                request = request.before(id);
            }
            let page = channel
                .messages(self.http(), request)
                .await
                .map_err(platform_error)?;
            let Some(oldest) = page.last() else {
                break;
            };
            before = Some(oldest.id);
            let full = page.len() == usize::from(HISTORY_PAGE);
            history.extend(page.iter().map(history_message));
            if !full {
                break;
            }
        }

        // Pages arrive newest first
        history.reverse();
        Ok(history)
    }

    async fn delete_channel(&self, channel_id: Snowflake) -> PlatformResult<()> {
        match ChannelId::new(nonzero(channel_id, "channel")?)
            .delete(self.http())
            .await
        {
            Ok(_) => Ok(()),
            Err(e) if is_not_found(&e) => Err(DomainError::ChannelNotFound(channel_id)),
            Err(e) => Err(platform_error(e)),
        }
    }

    async fn member_roles(&self, guild_id: Snowflake, user_id: Snowflake) -> PlatformResult<Vec<Snowflake>> {
        let guild = GuildId::new(nonzero(guild_id, "guild")?);
        match guild.member(self.http(), UserId::new(nonzero(user_id, "user")?)).await {
            Ok(member) => Ok(member.roles.iter().map(|r| r.get().into()).collect()),
            Err(e) if is_not_found(&e) => Err(DomainError::MemberNotFound(user_id)),
            Err(e) => Err(platform_error(e)),
        }
    }

    async fn add_role(
        &self,
        guild_id: Snowflake,
        user_id: Snowflake,
        role_id: Snowflake,
        reason: &str,
    ) -> PlatformResult<()> {
        self.http()
            .add_member_role(
                GuildId::new(nonzero(guild_id, "guild")?),
                UserId::new(nonzero(user_id, "user")?),
                RoleId::new(nonzero(role_id, "role")?),
                Some(reason),
            )
            .await
            .map_err(platform_error)
    }

    async fn remove_role(
        &self,
        guild_id: Snowflake,
        user_id: Snowflake,
        role_id: Snowflake,
        reason: &str,
    ) -> PlatformResult<()> {
        self.http()
            .remove_member_role(
                GuildId::new(nonzero(guild_id, "guild")?),
                UserId::new(nonzero(user_id, "user")?),
                RoleId::new(nonzero(role_id, "role")?),
                Some(reason),
            )
            .await
            .map_err(platform_error)
    }

    #[instrument(skip(self))]
    async fn guild_invites(&self, guild_id: Snowflake) -> PlatformResult<Vec<InviteUsage>> {
        let invites = GuildId::new(nonzero(guild_id, "guild")?)
            .invites(self.http())
            .await
            .map_err(platform_error)?;
        Ok(invites
            .into_iter()
            .map(|invite| InviteUsage {
                code: invite.code,
                inviter_id: invite.inviter.map(|user| user.id.get().into()),
                uses: invite.uses,
            })
            .collect())
    }
}
