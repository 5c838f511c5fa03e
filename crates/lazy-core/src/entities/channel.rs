//! Channel views - what the domain needs to know about a platform channel

use crate::value_objects::Snowflake;

/// Channel type, reduced to what the rules care about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelKind {
    GuildText,
    GuildCategory,
    Direct,
    Other,
}

impl ChannelKind {
    pub fn is_dm(&self) -> bool {
        matches!(self, Self::Direct)
    }
}

/// Snapshot of a channel as reported by the platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelInfo {
    pub id: Snowflake,
    pub name: String,
    pub kind: ChannelKind,
    pub guild_id: Option<Snowflake>,
    pub parent_id: Option<Snowflake>,
    pub nsfw: bool,
    /// Users holding an explicit permission overwrite
    pub member_overwrites: Vec<Snowflake>,
}

impl ChannelInfo {
    /// Whether the user holds an explicit overwrite on this channel
    pub fn grants_member(&self, user_id: Snowflake) -> bool {
        self.member_overwrites.contains(&user_id)
    }
}

/// Scoped private channel families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrivateChannelKind {
    Ticket,
    Application,
    Purchase,
}

impl PrivateChannelKind {
    /// Name prefix identifying channels of this kind
    pub const fn prefix(&self) -> &'static str {
        match self {
            Self::Ticket => "ticket-",
            Self::Application => "application-",
            Self::Purchase => "purchase-",
        }
    }

    /// Human readable label
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Ticket => "Ticket",
            Self::Application => "Application",
            Self::Purchase => "Purchase",
        }
    }

    /// Button id that closes channels of this kind
    pub const fn close_button_id(&self) -> &'static str {
        match self {
            Self::Application => "close_application",
            Self::Ticket | Self::Purchase => "close_ticket",
        }
    }

    /// Whether the owner gets a copy of the transcript
    pub const fn sends_owner_transcript(&self) -> bool {
        !matches!(self, Self::Application)
    }

    /// Channel name for a user, lowercased the way the platform normalises it
    pub fn channel_name(&self, username: &str) -> String {
        let slug: String = username
            .to_lowercase()
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '-' })
            .collect();
        format!("{}{slug}", self.prefix())
    }

    /// Whether a channel name belongs to this kind
    pub fn matches(&self, channel_name: &str) -> bool {
        channel_name.starts_with(self.prefix())
    }

    /// Which kind a channel name belongs to, if any
    pub fn of_channel(channel_name: &str) -> Option<Self> {
        [Self::Ticket, Self::Application, Self::Purchase]
            .into_iter()
            .find(|kind| kind.matches(channel_name))
    }
}
