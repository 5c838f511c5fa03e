//! Periodic cleanup of expired soft state

use std::sync::Arc;
use std::time::Duration;

use lazy_service::{ServiceContext, ServiceResult};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Sweep {
    pub cooldowns: usize,
    pub applications: u64,
}

/// Drop lapsed cooldowns and application rows past their expiry
pub async fn sweep(ctx: &ServiceContext) -> ServiceResult<Sweep> {
    let now = ctx.clock().now();
    let cooldowns = ctx.cooldowns().purge_expired(now.timestamp());
    let applications = ctx.application_repo().delete_expired(now).await?;
    Ok(Sweep {
        cooldowns,
        applications,
    })
}

pub fn spawn(ctx: Arc<ServiceContext>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        // first tick completes immediately
        ticker.tick().await;
        loop {
            ticker.tick().await;
            match sweep(&ctx).await {
                Ok(swept) if swept == Sweep::default() => debug!("Janitor found nothing to clean"),
                Ok(swept) => info!(
                    cooldowns = swept.cooldowns,
                    applications = swept.applications,
                    "Janitor sweep finished"
                ),
                Err(e) => error!(error = %e, "Janitor sweep failed"),
            }
        }
    })
}
