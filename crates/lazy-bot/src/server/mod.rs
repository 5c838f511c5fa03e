//! Bot setup and initialization
//!
//! Connects the store, builds the service context, and runs the gateway
//! client next to the janitor and health server.

use std::net::SocketAddr;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use lazy_common::{AppConfig, AppError};
use lazy_db::{create_pool, run_migrations, PgApplicationRepository, PgPool, PgUserRepository};
use lazy_panel::BrowserKeyPanel;
use lazy_service::{ServiceContext, ServiceContextBuilder};
use serenity::all::{Client, GatewayIntents, Http};
use tracing::{error, info};

use crate::gateway::SerenityGateway;
use crate::handlers::Handler;
use crate::health;
use crate::janitor;
use crate::state::AppState;

/// Events the bot subscribes to
pub fn intents() -> GatewayIntents {
    GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MEMBERS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT
        | GatewayIntents::GUILD_INVITES
}

/// Connect to PostgreSQL and apply pending migrations
pub async fn connect_database(config: &AppConfig) -> Result<PgPool, AppError> {
    info!("Connecting to PostgreSQL...");
    let db_config = lazy_db::DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        min_connections: config.database.min_connections,
        ..Default::default()
    };
    let pool = create_pool(&db_config)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    run_migrations(&pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    info!("PostgreSQL connection established");
    Ok(pool)
}

/// Wire repositories and ports into a service context
pub fn create_service_context(
    config: &AppConfig,
    pool: PgPool,
    gateway: Arc<SerenityGateway>,
) -> Result<ServiceContext, AppError> {
    let user_repo = Arc::new(PgUserRepository::new(pool.clone()));
    let application_repo = Arc::new(PgApplicationRepository::new(pool));
    let key_panel = Arc::new(BrowserKeyPanel::new(config.panel.clone()));

    if config.panel.credentials().is_none() {
        // key commands will answer with a configuration error
        error!("Panel credentials are not configured");
    }

    ServiceContextBuilder::new()
        .user_repo(user_repo)
        .application_repo(application_repo)
        .platform(gateway)
        .key_panel(key_panel)
        .guild(config.guild.clone())
        .guild_id(config.discord.guild_id)
        .owner_id(config.discord.owner_id)
        .build()
        .map_err(|e| AppError::Config(e.to_string()))
}

fn spawn_health_server(config: &AppConfig, state: AppState) -> Result<(), AppError> {
    let Some(server) = &config.health else {
        return Ok(());
    };
    let addr: SocketAddr = server
        .address()
        .parse()
        .map_err(|e| AppError::config(format!("Invalid health address {}: {e}", server.address())))?;

    tokio::spawn(async move {
        if let Err(e) = health::serve(addr, state).await {
            error!(error = %e, "Health server stopped");
        }
    });
    Ok(())
}

/// Run the bot until the gateway connection ends
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let pool = connect_database(&config).await?;

    let http = Arc::new(Http::new(&config.discord.token));
    let gateway = Arc::new(SerenityGateway::new(http));
    let services = Arc::new(create_service_context(&config, pool.clone(), gateway.clone())?);
    let ready = Arc::new(AtomicBool::new(false));

    janitor::spawn(services.clone(), config.janitor.interval());
    spawn_health_server(&config, AppState::new(pool, ready.clone()))?;

    let handler = Handler::new(services, gateway, config.discord.prefix.clone(), ready);
    let mut client = Client::builder(&config.discord.token, intents())
        .event_handler(handler)
        .await
        .map_err(|e| AppError::Gateway(e.to_string()))?;

    info!(guild_id = %config.discord.guild_id, "Starting gateway client");
    client
        .start()
        .await
        .map_err(|e| AppError::Gateway(e.to_string()))
}
