//! Application configuration structs
//!
//! Loads configuration from environment variables (and a `.env` file if present).

use lazy_core::Snowflake;
use serde::Deserialize;
use std::env;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub discord: DiscordConfig,
    pub database: DatabaseConfig,
    pub panel: PanelConfig,
    pub guild: GuildConfig,
    pub health: Option<ServerConfig>,
    pub janitor: JanitorConfig,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default = "default_env")]
    pub env: Environment,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "production" => Some(Self::Production),
            "staging" => Some(Self::Staging),
            "development" => Some(Self::Development),
            _ => None,
        }
    }
}

/// Discord client configuration
#[derive(Clone, Deserialize)]
pub struct DiscordConfig {
    pub token: String,
    /// The one guild the bot serves
    pub guild_id: Snowflake,
    /// Owner for owner-only commands; zero when unset
    #[serde(default)]
    pub owner_id: Snowflake,
    #[serde(default = "default_prefix")]
    pub prefix: String,
}

impl std::fmt::Debug for DiscordConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscordConfig")
            .field("token", &"<redacted>")
            .field("guild_id", &self.guild_id)
            .field("owner_id", &self.owner_id)
            .field("prefix", &self.prefix)
            .finish()
    }
}

/// Database configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Licensing panel configuration
///
/// Credentials are optional at startup; their absence is reported per request.
#[derive(Clone, Deserialize)]
pub struct PanelConfig {
    #[serde(default = "default_panel_url")]
    pub url: String,
    pub username: Option<String>,
    pub password: Option<String>,
    #[serde(default = "default_true")]
    pub headless: bool,
    #[serde(default = "default_panel_timeout_secs")]
    pub timeout_secs: u64,
}

impl PanelConfig {
    /// Both credentials, if configured
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (self.username.as_deref(), self.password.as_deref()) {
            (Some(user), Some(pass)) if !user.is_empty() && !pass.is_empty() => Some((user, pass)),
            _ => None,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl std::fmt::Debug for PanelConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PanelConfig")
            .field("url", &self.url)
            .field("username", &self.username.as_ref().map(|_| "<set>"))
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("headless", &self.headless)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Role and channel ids inside the served guild; zero means unset
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GuildConfig {
    pub reseller_role_id: Snowflake,
    pub approved_role_id: Snowflake,
    pub staff_role_id: Snowflake,
    pub verified_role_id: Snowflake,
    pub ticket_category_id: Snowflake,
    pub product_category_id: Snowflake,
    pub transcript_log_channel_id: Snowflake,
    pub invite_log_channel_id: Snowflake,
    pub key_channel_id: Snowflake,
    pub application_channel_id: Snowflake,
    #[serde(default = "default_delete_delay_secs")]
    pub channel_delete_delay_secs: u64,
}

impl GuildConfig {
    pub fn channel_delete_delay(&self) -> Duration {
        Duration::from_secs(self.channel_delete_delay_secs)
    }
}

/// Server configuration (health endpoints)
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Background sweep settings
#[derive(Debug, Clone, Deserialize)]
pub struct JanitorConfig {
    #[serde(default = "default_janitor_interval_secs")]
    pub interval_secs: u64,
}

impl JanitorConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

// Default value functions
fn default_app_name() -> String {
    "lazy-bot".to_string()
}

fn default_env() -> Environment {
    Environment::Development
}

fn default_prefix() -> String {
    "!".to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_panel_url() -> String {
    "https://securexvmcore.com/page/admin/".to_string()
}

fn default_true() -> bool {
    true
}

fn default_panel_timeout_secs() -> u64 {
    30
}

fn default_delete_delay_secs() -> u64 {
    5
}

fn default_janitor_interval_secs() -> u64 {
    3600
}

/// Optional variable; empty counts as unset
fn optional_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Optional snowflake variable; unset yields zero
fn id_var(name: &'static str) -> Result<Snowflake, ConfigError> {
    match optional_var(name) {
        Some(raw) => {
            Snowflake::parse(&raw).map_err(|_| ConfigError::InvalidValue(name, raw))
        }
        None => Ok(Snowflake::default()),
    }
}

fn required_id_var(name: &'static str) -> Result<Snowflake, ConfigError> {
    let id = id_var(name)?;
    if id.is_zero() {
        return Err(ConfigError::MissingVar(name));
    }
    Ok(id)
}

fn parsed_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    optional_var(name).and_then(|s| s.parse().ok())
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if required environment variables are missing
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Ok(Self {
            app: AppSettings {
                name: optional_var("APP_NAME").unwrap_or_else(default_app_name),
                env: optional_var("APP_ENV")
                    .as_deref()
                    .and_then(Environment::parse)
                    .unwrap_or_default(),
            },
            discord: DiscordConfig {
                token: optional_var("DISCORD_TOKEN")
                    .ok_or(ConfigError::MissingVar("DISCORD_TOKEN"))?,
                guild_id: required_id_var("GUILD_ID")?,
                owner_id: id_var("OWNER_ID")?,
                prefix: optional_var("COMMAND_PREFIX").unwrap_or_else(default_prefix),
            },
            database: DatabaseConfig {
                url: optional_var("DATABASE_URL").ok_or(ConfigError::MissingVar("DATABASE_URL"))?,
                max_connections: parsed_var("DATABASE_MAX_CONNECTIONS")
                    .unwrap_or_else(default_max_connections),
                min_connections: parsed_var("DATABASE_MIN_CONNECTIONS")
                    .unwrap_or_else(default_min_connections),
            },
            panel: PanelConfig {
                url: optional_var("PANEL_URL").unwrap_or_else(default_panel_url),
                username: optional_var("PANEL_USERNAME"),
                password: optional_var("PANEL_PASSWORD"),
                headless: parsed_var("PANEL_HEADLESS").unwrap_or_else(default_true),
                timeout_secs: parsed_var("PANEL_TIMEOUT_SECS")
                    .unwrap_or_else(default_panel_timeout_secs),
            },
            guild: GuildConfig {
                reseller_role_id: id_var("RESELLER_ROLE_ID")?,
                approved_role_id: id_var("APPROVED_ROLE_ID")?,
                staff_role_id: id_var("STAFF_ROLE_ID")?,
                verified_role_id: id_var("VERIFIED_ROLE_ID")?,
                ticket_category_id: id_var("TICKET_CATEGORY_ID")?,
                product_category_id: id_var("PRODUCT_CATEGORY_ID")?,
                transcript_log_channel_id: id_var("TRANSCRIPT_LOG_CHANNEL_ID")?,
                invite_log_channel_id: id_var("INVITE_LOG_CHANNEL_ID")?,
                key_channel_id: id_var("KEY_CHANNEL_ID")?,
                application_channel_id: id_var("APPLICATION_CHANNEL_ID")?,
                channel_delete_delay_secs: parsed_var("CHANNEL_DELETE_DELAY_SECS")
                    .unwrap_or_else(default_delete_delay_secs),
            },
            health: parsed_var::<u16>("HEALTH_PORT").map(|port| ServerConfig {
                host: optional_var("HEALTH_HOST").unwrap_or_else(default_host),
                port,
            }),
            janitor: JanitorConfig {
                interval_secs: parsed_var("JANITOR_INTERVAL_SECS")
                    .unwrap_or_else(default_janitor_interval_secs),
            },
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
