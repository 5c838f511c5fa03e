//! Validator outcomes

use std::fmt;

use super::constraints::Condition;

/// Reply used when the optional stage denies
pub const GENERAL_DENIAL: &str = "You do not meet the requirements to use this command.";

/// Granularity of a cooldown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CooldownScope {
    User,
    Guild,
    Global,
}

impl CooldownScope {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Guild => "guild",
            Self::Global => "global",
        }
    }
}

impl fmt::Display for CooldownScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An active cooldown that blocked an invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CooldownHit {
    pub scope: CooldownScope,
    /// Whole seconds until the stored expiry
    pub time_left: i64,
    /// Stored expiry, unix seconds
    pub expires_at: i64,
}

/// Why an invocation was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
    Condition(Condition),
    General,
    Cooldown(CooldownHit),
}

impl Denial {
    /// User-facing reply
    pub fn reply(&self) -> String {
        match self {
            Self::Condition(condition) => condition.reply().to_string(),
            Self::General => GENERAL_DENIAL.to_string(),
            Self::Cooldown(hit) => {
                let who = match hit.scope {
                    CooldownScope::User => "You are",
                    CooldownScope::Guild => "This server is",
                    CooldownScope::Global => "This command is",
                };
                format!(
                    "{who} on cooldown. Try again <t:{}:R> ({}s).",
                    hit.expires_at, hit.time_left
                )
            }
        }
    }
}

/// Validator decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Allowed,
    Denied(Denial),
}

impl Verdict {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }

    pub fn denial(&self) -> Option<&Denial> {
        match self {
            Self::Allowed => None,
            Self::Denied(denial) => Some(denial),
        }
    }
}
