//! Test fixtures and data generators
//!
//! Provides reusable members, invites and messages for integration tests.

use chrono::{DateTime, Utc};
use lazy_core::{ChannelContext, ChannelKind, HistoryMessage, InviteUsage, Snowflake};

pub const ALICE: Snowflake = Snowflake::new(5001);
pub const BOB: Snowflake = Snowflake::new(5002);
pub const STAFF_MEMBER: Snowflake = Snowflake::new(5003);

pub fn text_channel(id: Snowflake) -> ChannelContext {
    ChannelContext {
        id,
        kind: ChannelKind::GuildText,
        parent_id: None,
        nsfw: false,
    }
}

pub fn invite(code: &str, inviter_id: Snowflake, uses: u64) -> InviteUsage {
    InviteUsage {
        code: code.to_string(),
        inviter_id: Some(inviter_id),
        uses,
    }
}

pub fn chat_line(id: i64, author_id: Snowflake, author: &str, content: &str, at: DateTime<Utc>) -> HistoryMessage {
    HistoryMessage {
        id: Snowflake::new(id),
        author_id,
        author_name: author.to_string(),
        author_is_bot: false,
        content: content.to_string(),
        attachments: Vec::new(),
        embed_titles: Vec::new(),
        created_at: at,
    }
}
