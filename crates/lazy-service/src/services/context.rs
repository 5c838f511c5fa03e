//! Service context - dependency container for services
//!
//! Holds the repositories, platform ports, process-local stores and guild
//! settings needed by services.

use std::sync::Arc;

use lazy_cache::{ClosingChannels, CooldownStore, InviteSnapshotCache};
use lazy_common::GuildConfig;
use lazy_core::traits::{
    ApplicationRepository, Clock, KeyPanel, PlatformGateway, SystemClock, UserRepository,
};
use lazy_core::Snowflake;

use super::error::{ServiceError, ServiceResult};

/// Service context containing all dependencies
///
/// This is the main dependency container that gets passed to all services.
/// It provides access to:
/// - Access store repositories
/// - The chat platform and the licensing panel
/// - Cooldown, invite snapshot and closing-channel stores
/// - Guild role and channel ids
#[derive(Clone)]
pub struct ServiceContext {
    // Repositories
    user_repo: Arc<dyn UserRepository>,
    application_repo: Arc<dyn ApplicationRepository>,

    // Ports
    platform: Arc<dyn PlatformGateway>,
    key_panel: Arc<dyn KeyPanel>,
    clock: Arc<dyn Clock>,

    // Process-local stores
    cooldowns: Arc<CooldownStore>,
    invite_snapshots: Arc<InviteSnapshotCache>,
    closing_channels: Arc<ClosingChannels>,

    // Settings
    guild: Arc<GuildConfig>,
    guild_id: Snowflake,
    owner_id: Snowflake,
}

impl ServiceContext {
    // === Repositories ===

    /// Get the user repository
    pub fn user_repo(&self) -> &dyn UserRepository {
        self.user_repo.as_ref()
    }

    /// Get the application repository
    pub fn application_repo(&self) -> &dyn ApplicationRepository {
        self.application_repo.as_ref()
    }

    // === Ports ===

    /// Get the chat platform
    pub fn platform(&self) -> &dyn PlatformGateway {
        self.platform.as_ref()
    }

    /// Shared handle to the platform, for work that outlives the call
    pub fn platform_handle(&self) -> Arc<dyn PlatformGateway> {
        Arc::clone(&self.platform)
    }

    /// Get the licensing panel
    pub fn key_panel(&self) -> &dyn KeyPanel {
        self.key_panel.as_ref()
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    // === Stores ===

    pub fn cooldowns(&self) -> &CooldownStore {
        &self.cooldowns
    }

    pub fn invite_snapshots(&self) -> &InviteSnapshotCache {
        &self.invite_snapshots
    }

    pub fn closing_channels(&self) -> &ClosingChannels {
        &self.closing_channels
    }

    /// Shared handle to the closing registry, for the delayed delete
    pub fn closing_channels_handle(&self) -> Arc<ClosingChannels> {
        Arc::clone(&self.closing_channels)
    }

    // === Settings ===

    /// Role and channel ids of the served guild
    pub fn guild(&self) -> &GuildConfig {
        &self.guild
    }

    pub fn guild_id(&self) -> Snowflake {
        self.guild_id
    }

    /// Bot owner; zero when unset
    pub fn owner_id(&self) -> Snowflake {
        self.owner_id
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("guild_id", &self.guild_id)
            .field("owner_id", &self.owner_id)
            .field("repositories", &"...")
            .field("ports", &"...")
            .field("cooldowns", &self.cooldowns.len())
            .field("closing_channels", &self.closing_channels.len())
            .finish()
    }
}

/// Builder for creating ServiceContext with custom configuration
#[derive(Default)]
pub struct ServiceContextBuilder {
    user_repo: Option<Arc<dyn UserRepository>>,
    application_repo: Option<Arc<dyn ApplicationRepository>>,
    platform: Option<Arc<dyn PlatformGateway>>,
    key_panel: Option<Arc<dyn KeyPanel>>,
    clock: Option<Arc<dyn Clock>>,
    cooldowns: Option<Arc<CooldownStore>>,
    invite_snapshots: Option<Arc<InviteSnapshotCache>>,
    closing_channels: Option<Arc<ClosingChannels>>,
    guild: Option<GuildConfig>,
    guild_id: Option<Snowflake>,
    owner_id: Option<Snowflake>,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user_repo(mut self, repo: Arc<dyn UserRepository>) -> Self {
        self.user_repo = Some(repo);
        self
    }

    pub fn application_repo(mut self, repo: Arc<dyn ApplicationRepository>) -> Self {
        self.application_repo = Some(repo);
        self
    }

    pub fn platform(mut self, platform: Arc<dyn PlatformGateway>) -> Self {
        self.platform = Some(platform);
        self
    }

    pub fn key_panel(mut self, panel: Arc<dyn KeyPanel>) -> Self {
        self.key_panel = Some(panel);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn cooldowns(mut self, store: Arc<CooldownStore>) -> Self {
        self.cooldowns = Some(store);
        self
    }

    pub fn invite_snapshots(mut self, cache: Arc<InviteSnapshotCache>) -> Self {
        self.invite_snapshots = Some(cache);
        self
    }

    pub fn closing_channels(mut self, registry: Arc<ClosingChannels>) -> Self {
        self.closing_channels = Some(registry);
        self
    }

    pub fn guild(mut self, guild: GuildConfig) -> Self {
        self.guild = Some(guild);
        self
    }

    pub fn guild_id(mut self, guild_id: Snowflake) -> Self {
        self.guild_id = Some(guild_id);
        self
    }

    pub fn owner_id(mut self, owner_id: Snowflake) -> Self {
        self.owner_id = Some(owner_id);
        self
    }

    /// Build the ServiceContext
    ///
    /// Stores, clock and settings fall back to fresh defaults.
    ///
    /// # Errors
    /// Returns `ServiceError::Validation` if any required dependency is missing
    pub fn build(self) -> ServiceResult<ServiceContext> {
        Ok(ServiceContext {
            user_repo: self
                .user_repo
                .ok_or_else(|| ServiceError::validation("user_repo is required"))?,
            application_repo: self
                .application_repo
                .ok_or_else(|| ServiceError::validation("application_repo is required"))?,
            platform: self
                .platform
                .ok_or_else(|| ServiceError::validation("platform is required"))?,
            key_panel: self
                .key_panel
                .ok_or_else(|| ServiceError::validation("key_panel is required"))?,
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            cooldowns: self.cooldowns.unwrap_or_default(),
            invite_snapshots: self.invite_snapshots.unwrap_or_default(),
            closing_channels: self.closing_channels.unwrap_or_default(),
            guild: Arc::new(self.guild.unwrap_or_default()),
            guild_id: self
                .guild_id
                .ok_or_else(|| ServiceError::validation("guild_id is required"))?,
            owner_id: self.owner_id.unwrap_or_default(),
        })
    }
}
