//! In-process fakes for the platform and the licensing panel
//!
//! Record everything the services send so tests can assert on it.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use parking_lot::RwLock;

use lazy_cache::{ClosingChannels, CooldownStore, InviteSnapshotCache};
use lazy_common::GuildConfig;
use lazy_core::{
    ChannelInfo, ChannelKind, DomainError, HistoryMessage, InviteUsage, KeyOrder, KeyPanel,
    ManualClock, OutgoingMessage, PanelError, PlatformGateway, PlatformResult, Snowflake,
};
use lazy_db::{InMemoryApplicationRepository, InMemoryUserRepository};

use crate::services::{ServiceContext, ServiceContextBuilder};

pub const GUILD_ID: Snowflake = Snowflake::new(1);
pub const BOT_OWNER: Snowflake = Snowflake::new(2);

/// Guild settings with every id populated
pub fn guild_config() -> GuildConfig {
    GuildConfig {
        reseller_role_id: Snowflake::new(11),
        approved_role_id: Snowflake::new(12),
        staff_role_id: Snowflake::new(13),
        verified_role_id: Snowflake::new(14),
        ticket_category_id: Snowflake::new(21),
        product_category_id: Snowflake::new(22),
        transcript_log_channel_id: Snowflake::new(31),
        invite_log_channel_id: Snowflake::new(32),
        key_channel_id: Snowflake::new(33),
        application_channel_id: Snowflake::new(34),
        channel_delete_delay_secs: 0,
    }
}

/// Platform fake backed by in-memory channels, roles and invites
#[derive(Debug, Default)]
pub struct FakePlatform {
    next_id: AtomicI64,
    channels: RwLock<Vec<ChannelInfo>>,
    sent: RwLock<Vec<(Snowflake, OutgoingMessage)>>,
    dms: RwLock<Vec<(Snowflake, OutgoingMessage)>>,
    history: RwLock<HashMap<Snowflake, Vec<HistoryMessage>>>,
    deleted: RwLock<Vec<Snowflake>>,
    roles: RwLock<HashMap<Snowflake, HashSet<Snowflake>>>,
    invites: RwLock<Vec<InviteUsage>>,
    dms_fail: RwLock<bool>,
    history_fails: RwLock<bool>,
}

impl FakePlatform {
    pub fn new() -> Self {
        Self {
            next_id: AtomicI64::new(10_000),
            ..Self::default()
        }
    }

    fn platform_error(what: &str) -> DomainError {
        DomainError::PlatformError(format!("{what} unavailable"))
    }

    pub fn add_channel(&self, channel: ChannelInfo) {
        self.channels.write().push(channel);
    }

    /// Add a guild text channel and return its id
    pub fn add_text_channel(&self, name: &str, parent_id: Option<Snowflake>) -> Snowflake {
        let id = Snowflake::new(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.add_channel(ChannelInfo {
            id,
            name: name.to_string(),
            kind: ChannelKind::GuildText,
            guild_id: Some(GUILD_ID),
            parent_id,
            nsfw: false,
            member_overwrites: Vec::new(),
        });
        id
    }

    pub fn channels(&self) -> Vec<ChannelInfo> {
        self.channels.read().clone()
    }

    pub fn channel_named(&self, name: &str) -> Option<ChannelInfo> {
        self.channels.read().iter().find(|c| c.name == name).cloned()
    }

    pub fn set_history(&self, channel_id: Snowflake, messages: Vec<HistoryMessage>) {
        self.history.write().insert(channel_id, messages);
    }

    pub fn set_invites(&self, invites: Vec<InviteUsage>) {
        *self.invites.write() = invites;
    }

    pub fn give_role(&self, user_id: Snowflake, role_id: Snowflake) {
        self.roles.write().entry(user_id).or_default().insert(role_id);
    }

    pub fn has_role(&self, user_id: Snowflake, role_id: Snowflake) -> bool {
        self.roles
            .read()
            .get(&user_id)
            .is_some_and(|roles| roles.contains(&role_id))
    }

    pub fn fail_dms(&self) {
        *self.dms_fail.write() = true;
    }

    pub fn fail_history(&self) {
        *self.history_fails.write() = true;
    }

    pub fn messages_in(&self, channel_id: Snowflake) -> Vec<OutgoingMessage> {
        self.sent
            .read()
            .iter()
            .filter(|(id, _)| *id == channel_id)
            .map(|(_, message)| message.clone())
            .collect()
    }

    pub fn dms_to(&self, user_id: Snowflake) -> Vec<OutgoingMessage> {
        self.dms
            .read()
            .iter()
            .filter(|(id, _)| *id == user_id)
            .map(|(_, message)| message.clone())
            .collect()
    }

    pub fn deleted_channels(&self) -> Vec<Snowflake> {
        self.deleted.read().clone()
    }
}

#[async_trait]
impl PlatformGateway for FakePlatform {
    async fn guild_channels(&self, guild_id: Snowflake) -> PlatformResult<Vec<ChannelInfo>> {
        Ok(self
            .channels
            .read()
            .iter()
            .filter(|c| c.guild_id == Some(guild_id))
            .cloned()
            .collect())
    }

    async fn channel(&self, channel_id: Snowflake) -> PlatformResult<ChannelInfo> {
        self.channels
            .read()
            .iter()
            .find(|c| c.id == channel_id)
            .cloned()
            .ok_or(DomainError::ChannelNotFound(channel_id))
    }

    async fn create_private_channel(
        &self,
        guild_id: Snowflake,
        name: &str,
        category_id: Option<Snowflake>,
        member: Snowflake,
    ) -> PlatformResult<ChannelInfo> {
        let channel = ChannelInfo {
            id: Snowflake::new(self.next_id.fetch_add(1, Ordering::SeqCst)),
            name: name.to_string(),
            kind: ChannelKind::GuildText,
            guild_id: Some(guild_id),
            parent_id: category_id,
            nsfw: false,
            member_overwrites: vec![member],
        };
        self.add_channel(channel.clone());
        Ok(channel)
    }

    async fn send_message(&self, channel_id: Snowflake, message: OutgoingMessage) -> PlatformResult<()> {
        self.sent.write().push((channel_id, message));
        Ok(())
    }

    async fn direct_message(&self, user_id: Snowflake, message: OutgoingMessage) -> PlatformResult<()> {
        if *self.dms_fail.read() {
            return Err(Self::platform_error("DM"));
        }
        self.dms.write().push((user_id, message));
        Ok(())
    }

    async fn fetch_history(&self, channel_id: Snowflake) -> PlatformResult<Vec<HistoryMessage>> {
        if *self.history_fails.read() {
            return Err(Self::platform_error("history"));
        }
        Ok(self.history.read().get(&channel_id).cloned().unwrap_or_default())
    }

    async fn delete_channel(&self, channel_id: Snowflake) -> PlatformResult<()> {
        self.channels.write().retain(|c| c.id != channel_id);
        self.deleted.write().push(channel_id);
        Ok(())
    }

    async fn member_roles(&self, _guild_id: Snowflake, user_id: Snowflake) -> PlatformResult<Vec<Snowflake>> {
        Ok(self
            .roles
            .read()
            .get(&user_id)
            .map(|roles| roles.iter().copied().collect())
            .unwrap_or_default())
    }

    async fn add_role(
        &self,
        _guild_id: Snowflake,
        user_id: Snowflake,
        role_id: Snowflake,
        _reason: &str,
    ) -> PlatformResult<()> {
        self.give_role(user_id, role_id);
        Ok(())
    }

    async fn remove_role(
        &self,
        _guild_id: Snowflake,
        user_id: Snowflake,
        role_id: Snowflake,
        _reason: &str,
    ) -> PlatformResult<()> {
        if let Some(roles) = self.roles.write().get_mut(&user_id) {
            roles.remove(&role_id);
        }
        Ok(())
    }

    async fn guild_invites(&self, _guild_id: Snowflake) -> PlatformResult<Vec<InviteUsage>> {
        Ok(self.invites.read().clone())
    }
}

/// Licensing panel fake that mints sequential keys
#[derive(Debug, Default)]
pub struct FakePanel {
    minted: AtomicUsize,
    orders: RwLock<Vec<KeyOrder>>,
    resets: RwLock<Vec<String>>,
    failure: RwLock<Option<PanelError>>,
}

impl FakePanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following call fail with `error`
    pub fn fail_with(&self, error: PanelError) {
        *self.failure.write() = Some(error);
    }

    pub fn orders(&self) -> Vec<KeyOrder> {
        self.orders.read().clone()
    }

    pub fn resets(&self) -> Vec<String> {
        self.resets.read().clone()
    }
}

#[async_trait]
impl KeyPanel for FakePanel {
    async fn generate_key(&self, order: &KeyOrder) -> Result<String, PanelError> {
        if let Some(error) = self.failure.read().clone() {
            return Err(error);
        }
        self.orders.write().push(order.clone());
        let n = self.minted.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(format!("KEY-{n:04}"))
    }

    async fn reset_hwid(&self, key: &str) -> Result<(), PanelError> {
        if let Some(error) = self.failure.read().clone() {
            return Err(error);
        }
        self.resets.write().push(key.to_string());
        Ok(())
    }
}

/// A service context wired to in-memory stores and fakes
pub struct TestHarness {
    pub ctx: ServiceContext,
    pub users: Arc<InMemoryUserRepository>,
    pub applications: Arc<InMemoryApplicationRepository>,
    pub platform: Arc<FakePlatform>,
    pub panel: Arc<FakePanel>,
    pub clock: Arc<ManualClock>,
    pub closing: Arc<ClosingChannels>,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_guild(guild_config())
    }

    pub fn with_guild(guild: GuildConfig) -> Self {
        let users = Arc::new(InMemoryUserRepository::new());
        let applications = Arc::new(InMemoryApplicationRepository::new());
        let platform = Arc::new(FakePlatform::new());
        let panel = Arc::new(FakePanel::new());
        let start = Utc
            .with_ymd_and_hms(2025, 1, 1, 12, 0, 0)
            .single()
            .unwrap_or_else(Utc::now);
        let clock = Arc::new(ManualClock::new(start));
        let closing = Arc::new(ClosingChannels::new());

        let ctx = ServiceContextBuilder::new()
            .user_repo(users.clone())
            .application_repo(applications.clone())
            .platform(platform.clone())
            .key_panel(panel.clone())
            .clock(clock.clone())
            .cooldowns(Arc::new(CooldownStore::new()))
            .invite_snapshots(Arc::new(InviteSnapshotCache::new()))
            .closing_channels(closing.clone())
            .guild(guild)
            .guild_id(GUILD_ID)
            .owner_id(BOT_OWNER)
            .build()
            .unwrap_or_else(|e| panic!("test context: {e}"));

        Self {
            ctx,
            users,
            applications,
            platform,
            panel,
            clock,
            closing,
        }
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
