//! Messages - channel history read from the platform and messages sent to it

use chrono::{DateTime, Utc};

use crate::value_objects::Snowflake;

/// Embed colours used across replies
pub mod colors {
    pub const SUCCESS: u32 = 0x00FF00;
    pub const ERROR: u32 = 0xFF0000;
    pub const WARNING: u32 = 0xFFA500;
    pub const INFO: u32 = 0x5865F2;
    /// Community panels and join logs
    pub const BRAND: u32 = 0x9B59B6;
}

/// A message from a channel's history
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryMessage {
    pub id: Snowflake,
    pub author_id: Snowflake,
    pub author_name: String,
    pub author_is_bot: bool,
    pub content: String,
    pub attachments: Vec<String>,
    pub embed_titles: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Embed-like block of structured text
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Notice {
    pub title: String,
    pub description: String,
    pub color: u32,
    pub fields: Vec<NoticeField>,
    pub footer: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoticeField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

impl Notice {
    pub fn new(title: impl Into<String>, description: impl Into<String>, color: u32) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            color,
            ..Self::default()
        }
    }

    pub fn success(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(title, description, colors::SUCCESS)
    }

    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(title, description, colors::ERROR)
    }

    pub fn warning(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(title, description, colors::WARNING)
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>, inline: bool) -> Self {
        self.fields.push(NoticeField {
            name: name.into(),
            value: value.into(),
            inline,
        });
        self
    }

    pub fn footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = Some(footer.into());
        self
    }

    pub fn timestamp(mut self, at: DateTime<Utc>) -> Self {
        self.timestamp = Some(at);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonStyle {
    Primary,
    Secondary,
    Success,
    Danger,
}

/// Interactive element attached to a message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Component {
    Button {
        custom_id: String,
        label: String,
        emoji: Option<String>,
        style: ButtonStyle,
        disabled: bool,
    },
    Select {
        custom_id: String,
        placeholder: String,
        options: Vec<SelectOption>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub label: String,
    pub value: String,
    pub description: Option<String>,
}

impl Component {
    pub fn button(custom_id: impl Into<String>, label: impl Into<String>, style: ButtonStyle) -> Self {
        Self::Button {
            custom_id: custom_id.into(),
            label: label.into(),
            emoji: None,
            style,
            disabled: false,
        }
    }

    pub fn with_emoji(self, emoji: impl Into<String>) -> Self {
        match self {
            Self::Button {
                custom_id,
                label,
                style,
                disabled,
                ..
            } => Self::Button {
                custom_id,
                label,
                emoji: Some(emoji.into()),
                style,
                disabled,
            },
            other => other,
        }
    }
}

/// In-memory file sent along with a message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileAttachment {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// A message to send through the platform
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OutgoingMessage {
    pub content: Option<String>,
    pub notices: Vec<Notice>,
    pub components: Vec<Component>,
    pub attachment: Option<FileAttachment>,
}

impl OutgoingMessage {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::default()
        }
    }

    pub fn notice(notice: Notice) -> Self {
        Self {
            notices: vec![notice],
            ..Self::default()
        }
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn with_component(mut self, component: Component) -> Self {
        self.components.push(component);
        self
    }

    pub fn with_attachment(mut self, filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.attachment = Some(FileAttachment {
            filename: filename.into(),
            bytes,
        });
        self
    }
}
