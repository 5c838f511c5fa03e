//! Discord ids
//!
//! Users, channels, roles and guilds all share one 64-bit id space. The bot
//! only ever receives ids, it never mints them.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A Discord id; zero stands for "not configured"
///
/// Stored as `i64` so it maps directly onto a Postgres `BIGINT`. Discord never
/// hands out ids with the top bit set, so the conversion from `u64` is lossless.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Snowflake(i64);

impl Snowflake {
    #[inline]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    #[inline]
    pub const fn into_inner(self) -> i64 {
        self.0
    }

    /// The unsigned form used by the Discord API
    #[inline]
    pub const fn as_u64(self) -> u64 {
        self.0 as u64
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Parse a decimal id, tolerating surrounding whitespace
    pub fn parse(s: &str) -> Result<Self, SnowflakeParseError> {
        s.trim()
            .parse::<u64>()
            .map(Self::from)
            .map_err(|_| SnowflakeParseError::InvalidFormat)
    }

    pub fn user_mention(&self) -> String {
        format!("<@{}>", self.0)
    }

    pub fn channel_mention(&self) -> String {
        format!("<#{}>", self.0)
    }

    pub fn role_mention(&self) -> String {
        format!("<@&{}>", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SnowflakeParseError {
    #[error("invalid snowflake format")]
    InvalidFormat,
}

impl fmt::Display for Snowflake {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for Snowflake {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl From<u64> for Snowflake {
    fn from(id: u64) -> Self {
        Self(id as i64)
    }
}

impl From<Snowflake> for i64 {
    fn from(id: Snowflake) -> Self {
        id.0
    }
}

impl std::str::FromStr for Snowflake {
    type Err = SnowflakeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Snowflake::parse(s)
    }
}

// Discord's JSON carries ids as strings
impl Serialize for Snowflake {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Number(u64),
    Text(String),
}

impl<'de> Deserialize<'de> for Snowflake {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match RawId::deserialize(deserializer)? {
            RawId::Number(id) => Ok(Self::from(id)),
            RawId::Text(s) => Self::parse(&s).map_err(serde::de::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        let sf = Snowflake::parse(" 175928847299117063 ").unwrap();
        assert_eq!(sf.into_inner(), 175_928_847_299_117_063);

        assert!(Snowflake::parse("invalid").is_err());
        assert!(Snowflake::parse("-5").is_err());
    }

    #[test]
    fn test_u64_conversion_is_lossless() {
        let raw: u64 = 1_234_567_890_123_456_789;
        assert_eq!(Snowflake::from(raw).as_u64(), raw);
    }

    #[test]
    fn test_mentions() {
        let sf = Snowflake::new(42);
        assert_eq!(sf.user_mention(), "<@42>");
        assert_eq!(sf.channel_mention(), "<#42>");
        assert_eq!(sf.role_mention(), "<@&42>");
    }

    #[test]
    fn test_json_uses_strings() {
        let sf = Snowflake::new(123_456_789_012_345_678);
        assert_eq!(serde_json::to_string(&sf).unwrap(), "\"123456789012345678\"");

        let back: Snowflake = serde_json::from_str("\"123456789012345678\"").unwrap();
        assert_eq!(back, sf);
        let number: Snowflake = serde_json::from_str("12345").unwrap();
        assert_eq!(number.into_inner(), 12345);
    }
}
