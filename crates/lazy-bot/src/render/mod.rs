//! Rendering domain messages into serenity builders

use serenity::all::{
    ButtonStyle as DiscordButtonStyle, CreateActionRow, CreateAttachment, CreateButton, CreateEmbed,
    CreateEmbedFooter, CreateInteractionResponseMessage, CreateMessage, CreateSelectMenu,
    CreateSelectMenuKind, CreateSelectMenuOption, EditInteractionResponse, ReactionType, Timestamp,
};

use lazy_core::entities::{ButtonStyle, Component};
use lazy_core::{Notice, OutgoingMessage};
use lazy_service::dto::Reply;

/// Buttons per action row allowed by Discord
const BUTTONS_PER_ROW: usize = 5;

pub fn embed(notice: &Notice) -> CreateEmbed {
    let mut embed = CreateEmbed::new()
        .title(&notice.title)
        .description(&notice.description)
        .colour(notice.color);
    for field in &notice.fields {
        embed = embed.field(&field.name, &field.value, field.inline);
    }
    if let Some(footer) = &notice.footer {
        embed = embed.footer(CreateEmbedFooter::new(footer));
    }
    if let Some(at) = notice
        .timestamp
        .and_then(|at| Timestamp::from_unix_timestamp(at.timestamp()).ok())
    {
        embed = embed.timestamp(at);
    }
    embed
}

fn button_style(style: ButtonStyle) -> DiscordButtonStyle {
    match style {
        ButtonStyle::Primary => DiscordButtonStyle::Primary,
        ButtonStyle::Secondary => DiscordButtonStyle::Secondary,
        ButtonStyle::Success => DiscordButtonStyle::Success,
        ButtonStyle::Danger => DiscordButtonStyle::Danger,
    }
}

/// Buttons share rows; every select menu gets a row of its own
pub fn action_rows(components: &[Component]) -> Vec<CreateActionRow> {
    let mut rows = Vec::new();
    let mut buttons = Vec::new();

    for component in components {
        match component {
            Component::Button {
                custom_id,
                label,
                emoji,
                style,
                disabled,
            } => {
                let mut button = CreateButton::new(custom_id)
                    .label(label)
                    .style(button_style(*style))
                    .disabled(*disabled);
                if let Some(emoji) = emoji {
                    button = button.emoji(ReactionType::Unicode(emoji.clone()));
                }
                buttons.push(button);
                if buttons.len() == BUTTONS_PER_ROW {
                    rows.push(CreateActionRow::Buttons(std::mem::take(&mut buttons)));
                }
            }
            Component::Select {
                custom_id,
                placeholder,
                options,
            } => {
                let options = options
                    .iter()
                    .map(|option| {
                        let mut created = CreateSelectMenuOption::new(&option.label, &option.value);
                        if let Some(description) = &option.description {
                            created = created.description(description);
                        }
                        created
                    })
                    .collect();
                rows.push(CreateActionRow::SelectMenu(
                    CreateSelectMenu::new(custom_id, CreateSelectMenuKind::String { options })
                        .placeholder(placeholder),
                ));
            }
        }
    }

    if !buttons.is_empty() {
        rows.push(CreateActionRow::Buttons(buttons));
    }
    rows
}

pub fn create_message(message: OutgoingMessage) -> CreateMessage {
    let mut builder = CreateMessage::new()
        .embeds(message.notices.iter().map(embed).collect())
        .components(action_rows(&message.components));
    if let Some(content) = message.content {
        builder = builder.content(content);
    }
    if let Some(file) = message.attachment {
        builder = builder.add_file(CreateAttachment::bytes(file.bytes, file.filename));
    }
    builder
}

fn interaction_message(message: OutgoingMessage) -> CreateInteractionResponseMessage {
    let mut builder = CreateInteractionResponseMessage::new()
        .embeds(message.notices.iter().map(embed).collect())
        .components(action_rows(&message.components));
    if let Some(content) = message.content {
        builder = builder.content(content);
    }
    if let Some(file) = message.attachment {
        builder = builder.add_file(CreateAttachment::bytes(file.bytes, file.filename));
    }
    builder
}

/// Interaction reply; ephemeral unless the reply is public
pub fn response_message(reply: Reply) -> CreateInteractionResponseMessage {
    interaction_message(reply.message).ephemeral(!reply.public)
}

/// In-place update of the message a component sits on
pub fn update_message(message: OutgoingMessage) -> CreateInteractionResponseMessage {
    interaction_message(message)
}

/// Replacement for a deferred or already sent interaction reply
pub fn edit_response(message: OutgoingMessage) -> EditInteractionResponse {
    EditInteractionResponse::new()
        .content(message.content.unwrap_or_default())
        .embeds(message.notices.iter().map(embed).collect())
        .components(action_rows(&message.components))
}
