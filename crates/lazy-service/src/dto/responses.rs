//! Response DTOs
//!
//! Replies handed back to the dispatch shell, plus the health endpoint bodies.

use chrono::{DateTime, Utc};
use lazy_core::{Notice, OutgoingMessage};
use serde::Serialize;

// ============================================================================
// Command Replies
// ============================================================================

/// One page of a user's key list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyListPage {
    pub notice: Notice,
    /// Zero-based
    pub page: usize,
    pub total_pages: usize,
}

impl KeyListPage {
    pub fn has_pages(&self) -> bool {
        self.total_pages > 1
    }

    /// Page shown after `page` when paging forward, wrapping around
    pub fn next_page(&self) -> usize {
        (self.page + 1) % self.total_pages.max(1)
    }

    /// Page shown after `page` when paging back, wrapping around
    pub fn previous_page(&self) -> usize {
        let total = self.total_pages.max(1);
        (self.page + total - 1) % total
    }
}

/// Reply to a command: visible only to the caller unless `public`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub message: OutgoingMessage,
    pub public: bool,
}

impl Reply {
    pub fn ephemeral(message: OutgoingMessage) -> Self {
        Self {
            message,
            public: false,
        }
    }

    pub fn public(message: OutgoingMessage) -> Self {
        Self {
            message,
            public: true,
        }
    }

    pub fn text(content: impl Into<String>) -> Self {
        Self::ephemeral(OutgoingMessage::text(content))
    }

    pub fn notice(notice: Notice) -> Self {
        Self::ephemeral(OutgoingMessage::notice(notice))
    }
}

impl From<Notice> for Reply {
    fn from(notice: Notice) -> Self {
        Self::notice(notice)
    }
}

// ============================================================================
// Health Responses
// ============================================================================

/// Basic health check response
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: Utc::now(),
        }
    }
}

/// Readiness check response
#[derive(Debug, Clone, Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub checks: HealthChecks,
}

/// Health check status for each dependency
#[derive(Debug, Clone, Serialize)]
pub struct HealthChecks {
    pub database: String,
    pub gateway: String,
}

impl ReadinessResponse {
    pub fn ready(database_healthy: bool, gateway_ready: bool) -> Self {
        let all_healthy = database_healthy && gateway_ready;
        Self {
            status: if all_healthy { "ready" } else { "not_ready" }.to_string(),
            timestamp: Utc::now(),
            checks: HealthChecks {
                database: if database_healthy { "healthy" } else { "unhealthy" }.to_string(),
                gateway: if gateway_ready { "connected" } else { "disconnected" }.to_string(),
            },
        }
    }

    pub fn is_ready(&self) -> bool {
        self.status == "ready"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(page: usize, total_pages: usize) -> KeyListPage {
        KeyListPage {
            notice: Notice::success("keys", ""),
            page,
            total_pages,
        }
    }

    #[test]
    fn test_key_page_wraps() {
        assert_eq!(page(2, 3).next_page(), 0);
        assert_eq!(page(0, 3).previous_page(), 2);
        assert_eq!(page(1, 3).next_page(), 2);
        assert!(!page(0, 1).has_pages());
    }

    #[test]
    fn test_health_response() {
        let health = HealthResponse::healthy();
        assert_eq!(health.status, "healthy");
    }

    #[test]
    fn test_readiness_response() {
        let ready = ReadinessResponse::ready(true, true);
        assert!(ready.is_ready());
        assert_eq!(ready.checks.database, "healthy");

        let not_ready = ReadinessResponse::ready(true, false);
        assert_eq!(not_ready.status, "not_ready");
        assert_eq!(not_ready.checks.gateway, "disconnected");

        let json = serde_json::to_string(&not_ready).unwrap();
        assert!(json.contains("\"status\":\"not_ready\""));
    }
}
