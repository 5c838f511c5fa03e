//! Shared state of the health server

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use lazy_db::PgPool;

/// State handed to the health handlers
#[derive(Clone)]
pub struct AppState {
    pool: PgPool,
    gateway_ready: Arc<AtomicBool>,
}

impl AppState {
    pub fn new(pool: PgPool, gateway_ready: Arc<AtomicBool>) -> Self {
        Self {
            pool,
            gateway_ready,
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Whether the gateway session has received its ready event
    pub fn gateway_ready(&self) -> bool {
        self.gateway_ready.load(Ordering::Acquire)
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("pool_size", &self.pool.size())
            .field("gateway_ready", &self.gateway_ready())
            .finish()
    }
}
