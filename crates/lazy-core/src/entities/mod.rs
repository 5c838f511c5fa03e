//! Domain entities - core business objects

mod application;
mod channel;
mod invite;
mod message;
mod user;

pub use application::{Application, ApplicationStatus, ReapplyGate, DEFAULT_REASON, DENIAL_BLOCK_DAYS};
pub use channel::{ChannelInfo, ChannelKind, PrivateChannelKind};
pub use invite::{InviteRecord, InviteReward, InviteUsage, INVITE_REWARDS};
pub use message::{
    colors, ButtonStyle, Component, FileAttachment, HistoryMessage, Notice, NoticeField,
    OutgoingMessage, SelectOption,
};
pub use user::{GeneratedKey, UserRecord};
