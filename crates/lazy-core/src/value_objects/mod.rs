//! Value objects - immutable types that represent domain concepts

mod access_tier;
mod snowflake;

pub use access_tier::AccessTier;
pub use snowflake::{Snowflake, SnowflakeParseError};
