//! Bot entry point
//!
//! Run with:
//! ```bash
//! cargo run -p lazy-bot
//! ```
//!
//! Configuration is loaded from environment variables (and `.env`).

use lazy_common::{try_init_tracing_with_config, AppConfig, TracingConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = try_init_tracing_with_config(TracingConfig::for_environment(config.app.env)) {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    info!(
        name = %config.app.name,
        env = ?config.app.env,
        guild_id = %config.discord.guild_id,
        "Configuration loaded"
    );

    if let Err(e) = lazy_bot::run(config).await {
        error!(code = e.error_code(), error = %e, "Bot stopped");
        std::process::exit(1);
    }
}
