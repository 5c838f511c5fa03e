//! # lazy-core
//!
//! Domain layer containing access records, command constraints, and the ports
//! the rest of the bot is written against.
//! This crate has zero dependencies on infrastructure (database, chat client, browser).

pub mod command;
pub mod entities;
pub mod error;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use command::{
    ChannelContext, CommandConstraints, Condition, CooldownHit, CooldownScope, Denial, Invocation,
    RoleHolder, Verdict,
};
pub use entities::{
    Application, ApplicationStatus, ChannelInfo, ChannelKind, GeneratedKey, HistoryMessage,
    InviteRecord, InviteReward, InviteUsage, Notice, OutgoingMessage, PrivateChannelKind,
    ReapplyGate, UserRecord,
};
pub use error::{DomainError, PanelError};
pub use traits::{
    ApplicationRepository, Clock, KeyOrder, KeyPanel, ManualClock, PlatformGateway,
    PlatformResult, RepoResult, SystemClock, UserRepository,
};
pub use value_objects::{AccessTier, Snowflake, SnowflakeParseError};
