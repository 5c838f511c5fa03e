//! External capability ports - the chat platform and the licensing panel

use async_trait::async_trait;

use crate::entities::{ChannelInfo, HistoryMessage, InviteUsage, OutgoingMessage};
use crate::error::{DomainError, PanelError};
use crate::value_objects::Snowflake;

/// Result type for platform operations
pub type PlatformResult<T> = Result<T, DomainError>;

/// A key-generation request for the licensing panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyOrder {
    /// Number of keys to create in one submission
    pub count: u32,
    pub days: i32,
    pub note: String,
}

impl KeyOrder {
    pub fn single(days: i32, note: impl Into<String>) -> Self {
        Self {
            count: 1,
            days,
            note: note.into(),
        }
    }
}

/// "Submit key request, get a key back" against the external licensing panel
#[async_trait]
pub trait KeyPanel: Send + Sync {
    /// Generate one key and return its value
    async fn generate_key(&self, order: &KeyOrder) -> Result<String, PanelError>;

    /// Clear the hardware binding of an existing key
    async fn reset_hwid(&self, key: &str) -> Result<(), PanelError>;
}

/// Chat platform operations the services rely on
#[async_trait]
pub trait PlatformGateway: Send + Sync {
    /// All channels of a guild
    async fn guild_channels(&self, guild_id: Snowflake) -> PlatformResult<Vec<ChannelInfo>>;

    /// One channel by id
    async fn channel(&self, channel_id: Snowflake) -> PlatformResult<ChannelInfo>;

    /// Create a text channel visible only to `member` and the bot
    async fn create_private_channel(
        &self,
        guild_id: Snowflake,
        name: &str,
        category_id: Option<Snowflake>,
        member: Snowflake,
    ) -> PlatformResult<ChannelInfo>;

    async fn send_message(&self, channel_id: Snowflake, message: OutgoingMessage) -> PlatformResult<()>;

    async fn direct_message(&self, user_id: Snowflake, message: OutgoingMessage) -> PlatformResult<()>;

    /// Whole channel history, oldest first
    async fn fetch_history(&self, channel_id: Snowflake) -> PlatformResult<Vec<HistoryMessage>>;

    async fn delete_channel(&self, channel_id: Snowflake) -> PlatformResult<()>;

    async fn member_roles(&self, guild_id: Snowflake, user_id: Snowflake) -> PlatformResult<Vec<Snowflake>>;

    async fn add_role(
        &self,
        guild_id: Snowflake,
        user_id: Snowflake,
        role_id: Snowflake,
        reason: &str,
    ) -> PlatformResult<()>;

    async fn remove_role(
        &self,
        guild_id: Snowflake,
        user_id: Snowflake,
        role_id: Snowflake,
        reason: &str,
    ) -> PlatformResult<()>;

    /// Current invites of a guild with their use counts
    async fn guild_invites(&self, guild_id: Snowflake) -> PlatformResult<Vec<InviteUsage>>;
}
