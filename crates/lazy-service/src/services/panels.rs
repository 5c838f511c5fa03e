//! Staff-posted panels
//!
//! Messages with the buttons and menus members use to open tickets,
//! applications and purchases, plus the rules and support embeds.

use std::fmt;
use std::str::FromStr;

use lazy_core::entities::{colors, ButtonStyle, Component, SelectOption, DENIAL_BLOCK_DAYS};
use lazy_core::{ChannelKind, Notice, OutgoingMessage, Snowflake};
use tracing::{info, instrument, warn};

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Platform limit on options in one select menu
pub const MAX_SELECT_OPTIONS: usize = 25;

pub const PURCHASE_SELECT_ID: &str = "purchase_select";
pub const APPLY_BUTTON_ID: &str = "apply";
pub const SUPPORT_BUTTON_ID: &str = "support";
pub const RULES_ACCEPT_ID: &str = "rules:accept";

/// Embeds staff can post with the embed command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbedTemplate {
    Rules,
    Support,
}

impl EmbedTemplate {
    pub const ALL: [EmbedTemplate; 2] = [Self::Rules, Self::Support];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Rules => "rules",
            Self::Support => "support",
        }
    }

    fn title_case(&self) -> &'static str {
        match self {
            Self::Rules => "Rules",
            Self::Support => "Support",
        }
    }

    pub fn message(&self) -> OutgoingMessage {
        match self {
            Self::Rules => rules_panel(),
            Self::Support => support_panel(),
        }
    }
}

impl fmt::Display for EmbedTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EmbedTemplate {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "rules" => Ok(Self::Rules),
            "support" => Ok(Self::Support),
            other => Err(format!(
                "Template '{other}' is not available. Available templates: {}.",
                Self::ALL
                    .iter()
                    .map(|t| format!("'{t}'"))
                    .collect::<Vec<_>>()
                    .join(", ")
            )),
        }
    }
}

/// Display label for a product channel
///
/// Drops a leading emoji/pipe decoration, collapses separators and
/// uppercases the rest.
pub fn product_label(channel_name: &str) -> String {
    let decorated = |c: char| !c.is_alphanumeric() && c != '_' && !c.is_whitespace();
    let name = if channel_name.starts_with(decorated) {
        let rest = channel_name.trim_start_matches(decorated).trim_start();
        rest.strip_prefix('|').unwrap_or(rest).trim_start()
    } else {
        channel_name
    };

    let label = name
        .split(|c: char| c == '-' || c == '_' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase();

    if label.is_empty() {
        "PRODUCT".to_string()
    } else {
        label
    }
}

/// The "Apply" panel
pub fn application_panel() -> OutgoingMessage {
    let mut content = String::from(
        "# Application\n\
         Take your time and read everything before applying.\n\
         - Members are expected to follow our behavior guidelines.\n\
         - Product activity such as usage logs and session time is monitored.\n",
    );
    content.push_str(&format!(
        "- A denied application can be resubmitted after {DENIAL_BLOCK_DAYS} days.\n\n"
    ));
    content.push_str(
        "## Interview Process\n\
         1. Staff review and interview\n\
         2. Community review\n\
         3. Purchase, due as soon as the application is approved\n\n",
    );
    content.push_str(
        "Questions? Open a support ticket before applying.\n\n\
         Apply by clicking the button below when you're ready:",
    );

    OutgoingMessage::text(content).with_component(
        Component::button(APPLY_BUTTON_ID, "Apply", ButtonStyle::Primary).with_emoji("📝"),
    )
}

/// Rules embed with the accept button
pub fn rules_panel() -> OutgoingMessage {
    let notice = Notice::new(
        "Rules & Guidelines:",
        "This server follows Discord's Terms of Service. Violations result in kicks or bans.\n\
         https://discord.com/terms",
        colors::BRAND,
    )
    .field(
        "Rule 1: Respectful Conduct",
        "> Treat other members and their opinions with courtesy. Harassment and trolling are not tolerated.",
        false,
    )
    .field(
        "Rule 2: Appropriate Content",
        "> Slurs, threats, offensive or NSFW material are prohibited in every channel.",
        false,
    )
    .field(
        "Rule 3: No Spam or Advertising",
        "> No repeated messages, mass mentions, malicious files or advertising.",
        false,
    )
    .field(
        "Rule 4: Channel Usage",
        "> Keep conversations in the channel meant for them.",
        false,
    )
    .footer("Thank you for helping keep this community a good place.");

    OutgoingMessage::notice(notice)
        .with_component(Component::button(RULES_ACCEPT_ID, "Accept", ButtonStyle::Primary))
}

/// Support embed with the ticket button
pub fn support_panel() -> OutgoingMessage {
    let notice = Notice::new(
        "Need Help?",
        "If you need any assistance or have questions, feel free to open a ticket.",
        colors::BRAND,
    )
    .field(
        "How to get support:",
        "Click the button below to create a support ticket. Our team will assist you as soon as possible.",
        false,
    );

    OutgoingMessage::notice(notice)
        .with_component(Component::button(SUPPORT_BUTTON_ID, "Ticket", ButtonStyle::Primary))
}

/// Posts panels on behalf of staff
pub struct PanelService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> PanelService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Post the application panel into `channel_id`
    #[instrument(skip(self))]
    pub async fn post_application_panel(&self, channel_id: Snowflake) -> ServiceResult<()> {
        self.ctx
            .platform()
            .send_message(channel_id, application_panel())
            .await?;
        info!(channel_id = %channel_id, "Application panel posted");
        Ok(())
    }

    /// Build the product select menu from the product category
    ///
    /// `Err` carries the reply for staff when there is nothing to offer.
    #[instrument(skip(self))]
    pub async fn purchase_panel(&self) -> ServiceResult<Result<OutgoingMessage, String>> {
        let category = self.ctx.guild().product_category_id;
        if category.is_zero() {
            return Ok(Err("❌ Product category not found.".to_string()));
        }

        let channels = self.ctx.platform().guild_channels(self.ctx.guild_id()).await?;
        if !channels
            .iter()
            .any(|c| c.id == category && c.kind == ChannelKind::GuildCategory)
        {
            return Ok(Err("❌ Product category not found.".to_string()));
        }

        let mut options: Vec<SelectOption> = channels
            .iter()
            .filter(|c| c.kind == ChannelKind::GuildText && c.parent_id == Some(category))
            .map(|c| {
                let label = product_label(&c.name);
                SelectOption {
                    description: Some(format!("Purchase {label}")),
                    label,
                    value: c.id.to_string(),
                }
            })
            .collect();

        if options.is_empty() {
            return Ok(Err("❌ No products available at the moment.".to_string()));
        }
        if options.len() > MAX_SELECT_OPTIONS {
            warn!(products = options.len(), "Too many products for one menu, truncating");
            options.truncate(MAX_SELECT_OPTIONS);
        }

        let notice = Notice::new(
            "🛒 Purchase Products",
            "Select a product from the dropdown below to start your purchase.",
            colors::BRAND,
        )
        .footer("Secure Purchase");

        Ok(Ok(OutgoingMessage::notice(notice).with_component(Component::Select {
            custom_id: PURCHASE_SELECT_ID.to_string(),
            placeholder: "Select a product...".to_string(),
            options,
        })))
    }

    /// Post the product menu into `channel_id`; returns the reply for staff on failure
    pub async fn post_purchase_panel(&self, channel_id: Snowflake) -> ServiceResult<Option<String>> {
        match self.purchase_panel().await? {
            Ok(message) => {
                self.ctx.platform().send_message(channel_id, message).await?;
                info!(channel_id = %channel_id, "Purchase panel posted");
                Ok(None)
            }
            Err(reply) => Ok(Some(reply)),
        }
    }

    /// Post a template into a text channel of the guild
    #[instrument(skip(self))]
    pub async fn post_embed(&self, template: EmbedTemplate, target: Snowflake) -> ServiceResult<String> {
        let channel = match self.ctx.platform().channel(target).await {
            Ok(channel) => channel,
            Err(e) if e.is_not_found() => return Ok(INVALID_CHANNEL.to_string()),
            Err(e) => return Err(e.into()),
        };
        if channel.kind != ChannelKind::GuildText || channel.guild_id != Some(self.ctx.guild_id()) {
            return Ok(INVALID_CHANNEL.to_string());
        }

        if let Err(e) = self.ctx.platform().send_message(target, template.message()).await {
            warn!(channel_id = %target, error = %e, "Could not post embed");
            return Ok(
                "There was an error sending the embed. Please check my permissions in the target channel."
                    .to_string(),
            );
        }

        info!(template = %template, channel_id = %target, "Embed posted");
        Ok(format!(
            "{} embed successfully sent to {}!",
            template.title_case(),
            target.channel_mention()
        ))
    }
}

pub const INVALID_CHANNEL: &str = "Invalid channel. Please provide a valid text channel.";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{TestHarness, GUILD_ID};
    use lazy_core::ChannelInfo;

    fn category(h: &TestHarness) -> Snowflake {
        let id = h.ctx.guild().product_category_id;
        h.platform.add_channel(ChannelInfo {
            id,
            name: "products".to_string(),
            kind: ChannelKind::GuildCategory,
            guild_id: Some(GUILD_ID),
            parent_id: None,
            nsfw: false,
            member_overwrites: Vec::new(),
        });
        id
    }

    #[test]
    fn test_product_label() {
        assert_eq!(product_label("🟢｜lazy-spoofer"), "LAZY SPOOFER");
        assert_eq!(product_label("🔥 | temp_spoofer"), "TEMP SPOOFER");
        assert_eq!(product_label("plain-name"), "PLAIN NAME");
        assert_eq!(product_label("🟢｜"), "PRODUCT");
    }

    #[test]
    fn test_template_parse() {
        assert_eq!("Rules".parse::<EmbedTemplate>(), Ok(EmbedTemplate::Rules));
        assert_eq!(" support ".parse::<EmbedTemplate>(), Ok(EmbedTemplate::Support));
        let err = "faq".parse::<EmbedTemplate>().unwrap_err();
        assert_eq!(
            err,
            "Template 'faq' is not available. Available templates: 'rules', 'support'."
        );
    }

    #[test]
    fn test_panels_carry_their_buttons() {
        let ids = |message: OutgoingMessage| -> Vec<String> {
            message
                .components
                .into_iter()
                .filter_map(|c| match c {
                    Component::Button { custom_id, .. } => Some(custom_id),
                    Component::Select { .. } => None,
                })
                .collect()
        };
        assert_eq!(ids(rules_panel()), vec![RULES_ACCEPT_ID]);
        assert_eq!(ids(support_panel()), vec![SUPPORT_BUTTON_ID]);
        assert_eq!(ids(application_panel()), vec![APPLY_BUTTON_ID]);
    }

    #[test]
    fn test_application_panel_mentions_block() {
        let content = application_panel().content.unwrap_or_default();
        assert!(content.contains(&format!("after {DENIAL_BLOCK_DAYS} days")));
    }

    #[tokio::test]
    async fn test_purchase_panel_lists_products() {
        let h = TestHarness::new();
        let cat = category(&h);
        let spoofer = h.platform.add_text_channel("🟢｜spoofer", Some(cat));
        h.platform.add_text_channel("general", None);

        let message = PanelService::new(&h.ctx).purchase_panel().await.unwrap().unwrap();
        let Component::Select {
            custom_id, options, ..
        } = &message.components[0]
        else {
            panic!("expected a select menu");
        };
        assert_eq!(custom_id, PURCHASE_SELECT_ID);
        assert_eq!(options.len(), 1);
        assert_eq!(options[0].label, "SPOOFER");
        assert_eq!(options[0].value, spoofer.to_string());
    }

    #[tokio::test]
    async fn test_purchase_panel_without_products() {
        let h = TestHarness::new();
        let service = PanelService::new(&h.ctx);

        assert_eq!(
            service.purchase_panel().await.unwrap(),
            Err("❌ Product category not found.".to_string())
        );

        category(&h);
        assert_eq!(
            service.post_purchase_panel(Snowflake::new(77)).await.unwrap().as_deref(),
            Some("❌ No products available at the moment.")
        );
        assert!(h.platform.messages_in(Snowflake::new(77)).is_empty());
    }

    #[tokio::test]
    async fn test_post_embed() {
        let h = TestHarness::new();
        let service = PanelService::new(&h.ctx);
        let target = h.platform.add_text_channel("rules", None);

        let reply = service.post_embed(EmbedTemplate::Rules, target).await.unwrap();
        assert_eq!(reply, format!("Rules embed successfully sent to <#{target}>!"));
        assert_eq!(h.platform.messages_in(target).len(), 1);

        let reply = service
            .post_embed(EmbedTemplate::Support, Snowflake::new(999_999))
            .await
            .unwrap();
        assert_eq!(reply, INVALID_CHANNEL);
    }

    #[tokio::test]
    async fn test_post_application_panel() {
        let h = TestHarness::new();
        let target = Snowflake::new(88);
        PanelService::new(&h.ctx).post_application_panel(target).await.unwrap();
        assert_eq!(h.platform.messages_in(target).len(), 1);
    }
}
