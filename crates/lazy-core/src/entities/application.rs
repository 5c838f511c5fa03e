//! Application record - staff decisions on membership applications

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::value_objects::Snowflake;

/// Days a denial blocks reapplication
pub const DENIAL_BLOCK_DAYS: i64 = 31;

/// Default reason when staff give none
pub const DEFAULT_REASON: &str = "No reason provided.";

/// Decision state of an application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Pending,
    Approved,
    Denied,
}

impl ApplicationStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Denied => "denied",
        }
    }
}

impl std::str::FromStr for ApplicationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "denied" => Ok(Self::Denied),
            _ => Err(format!("Invalid application status: {s}")),
        }
    }
}

/// Application entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Application {
    pub id: Uuid,
    pub user_id: Snowflake,
    pub status: ApplicationStatus,
    pub reason: String,
    pub handled_by: Option<Snowflake>,
    pub handled_at: Option<DateTime<Utc>>,
    /// Only set for denials
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Application {
    /// Record an approval
    pub fn approved(
        user_id: Snowflake,
        handled_by: Snowflake,
        reason: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            status: ApplicationStatus::Approved,
            reason: reason.unwrap_or_else(|| DEFAULT_REASON.to_string()),
            handled_by: Some(handled_by),
            handled_at: Some(now),
            expires_at: None,
            created_at: now,
        }
    }

    /// Record a denial that blocks reapplication for [`DENIAL_BLOCK_DAYS`]
    pub fn denied(
        user_id: Snowflake,
        handled_by: Snowflake,
        reason: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            status: ApplicationStatus::Denied,
            reason: reason.unwrap_or_else(|| DEFAULT_REASON.to_string()),
            handled_by: Some(handled_by),
            handled_at: Some(now),
            expires_at: Some(now + Duration::days(DENIAL_BLOCK_DAYS)),
            created_at: now,
        }
    }
}

/// Outcome of the reapplication check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReapplyGate {
    Allowed,
    Blocked {
        days_left: i64,
        expires_at: DateTime<Utc>,
    },
}

impl ReapplyGate {
    /// Evaluate against the most recent denial, if any
    pub fn evaluate(latest_denial: Option<&Application>, now: DateTime<Utc>) -> Self {
        let Some(expires_at) = latest_denial
            .filter(|app| app.status == ApplicationStatus::Denied)
            .and_then(|app| app.expires_at)
        else {
            return Self::Allowed;
        };

        if expires_at <= now {
            return Self::Allowed;
        }

        // Round partial days up
        let day_ms = Duration::days(1).num_milliseconds();
        let remaining_ms = (expires_at - now).num_milliseconds();
        let days_left = (remaining_ms + day_ms - 1) / day_ms;

        Self::Blocked {
            days_left,
            expires_at,
        }
    }

    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn denial_at(now: DateTime<Utc>) -> Application {
        Application::denied(Snowflake::new(1), Snowflake::new(2), None, now)
    }

    #[test]
    fn test_denial_expiry() {
        let now = Utc::now();
        let app = denial_at(now);
        assert_eq!(app.expires_at, Some(now + Duration::days(31)));
        assert_eq!(app.reason, DEFAULT_REASON);
    }

    #[test]
    fn test_approval_has_no_expiry() {
        let app = Application::approved(Snowflake::new(1), Snowflake::new(2), Some("ok".into()), Utc::now());
        assert_eq!(app.status, ApplicationStatus::Approved);
        assert!(app.expires_at.is_none());
    }

    #[test]
    fn test_gate_day_30_blocked_one_day_left() {
        let t0 = Utc::now();
        let app = denial_at(t0);
        let gate = ReapplyGate::evaluate(Some(&app), t0 + Duration::days(30));
        assert!(matches!(gate, ReapplyGate::Blocked { days_left: 1, .. }));
    }

    #[test]
    fn test_gate_day_32_allowed() {
        let t0 = Utc::now();
        let app = denial_at(t0);
        assert!(ReapplyGate::evaluate(Some(&app), t0 + Duration::days(32)).is_allowed());
    }

    #[test]
    fn test_gate_partial_day_rounds_up() {
        let t0 = Utc::now();
        let app = denial_at(t0);
        let gate = ReapplyGate::evaluate(Some(&app), t0 + Duration::hours(1));
        assert!(matches!(gate, ReapplyGate::Blocked { days_left: 31, .. }));
    }

    #[test]
    fn test_gate_without_denial() {
        assert!(ReapplyGate::evaluate(None, Utc::now()).is_allowed());
    }
}
