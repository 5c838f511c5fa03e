//! Access tier - how long a grant lasts

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Grant level controlling how long access lasts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccessTier {
    #[serde(rename = "1day")]
    OneDay,
    #[serde(rename = "1week")]
    OneWeek,
    #[serde(rename = "1month")]
    OneMonth,
    #[serde(rename = "3month")]
    ThreeMonths,
    #[serde(rename = "lifetime")]
    Lifetime,
}

impl AccessTier {
    /// All tiers in ascending order
    pub const ALL: [AccessTier; 5] = [
        Self::OneDay,
        Self::OneWeek,
        Self::OneMonth,
        Self::ThreeMonths,
        Self::Lifetime,
    ];

    /// Stored/wire representation
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::OneDay => "1day",
            Self::OneWeek => "1week",
            Self::OneMonth => "1month",
            Self::ThreeMonths => "3month",
            Self::Lifetime => "lifetime",
        }
    }

    /// Human readable label
    pub const fn label(&self) -> &'static str {
        match self {
            Self::OneDay => "1 Day",
            Self::OneWeek => "1 Week",
            Self::OneMonth => "1 Month",
            Self::ThreeMonths => "3 Months",
            Self::Lifetime => "Lifetime",
        }
    }

    /// Grant length, `None` for lifetime
    pub fn duration(&self) -> Option<Duration> {
        match self {
            Self::OneDay => Some(Duration::days(1)),
            Self::OneWeek => Some(Duration::days(7)),
            Self::OneMonth => Some(Duration::days(30)),
            Self::ThreeMonths => Some(Duration::days(90)),
            Self::Lifetime => None,
        }
    }

    /// Expiry for a grant issued at `now`
    pub fn expiry_from(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.duration().map(|d| now + d)
    }
}

impl fmt::Display for AccessTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AccessTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|tier| tier.as_str() == s)
            .ok_or_else(|| format!("Invalid access tier: {s}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_expiry() {
        let now = Utc::now();
        assert_eq!(AccessTier::OneDay.expiry_from(now), Some(now + Duration::days(1)));
        assert_eq!(AccessTier::OneWeek.expiry_from(now), Some(now + Duration::days(7)));
        assert_eq!(AccessTier::OneMonth.expiry_from(now), Some(now + Duration::days(30)));
        assert_eq!(AccessTier::ThreeMonths.expiry_from(now), Some(now + Duration::days(90)));
        assert_eq!(AccessTier::Lifetime.expiry_from(now), None);
    }

    #[test]
    fn test_tier_parse() {
        for tier in AccessTier::ALL {
            assert_eq!(tier.as_str().parse::<AccessTier>().unwrap(), tier);
        }
        assert!("2week".parse::<AccessTier>().is_err());
    }

    #[test]
    fn test_tier_serde() {
        let json = serde_json::to_string(&AccessTier::ThreeMonths).unwrap();
        assert_eq!(json, "\"3month\"");
    }
}
