//! Private channel lifecycle
//!
//! Tickets, applications and purchases each get a private text channel:
//! none -> open -> closing -> deleted. Closing captures a transcript first.

use std::sync::Arc;
use std::time::Duration;

use lazy_cache::ClosingChannels;
use lazy_core::entities::{ButtonStyle, Component};
use lazy_core::{
    ChannelInfo, ChannelKind, Notice, OutgoingMessage, PlatformGateway, PrivateChannelKind,
    ReapplyGate, RoleHolder, Snowflake,
};
use tokio::task::JoinHandle;
use tracing::{error, info, instrument, warn};

use super::context::ServiceContext;
use super::error::ServiceResult;
use super::panels::product_label;
use super::transcript::{render_transcript, transcript_filename};

const APPLICATION_COLOR: u32 = 0x2F_31_36;
const PURCHASE_COLOR: u32 = 0xF1_C4_0F;

/// Result of an open request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenOutcome {
    Opened(Snowflake),
    /// The member already has a channel of this kind
    AlreadyOpen(Snowflake),
    Refused(String),
}

impl OpenOutcome {
    /// Ephemeral reply for the member who asked
    pub fn reply(&self, kind: PrivateChannelKind) -> String {
        match (self, kind) {
            (Self::Opened(id), PrivateChannelKind::Ticket) => {
                format!("Your ticket has been created: {}", id.channel_mention())
            }
            (Self::Opened(id), PrivateChannelKind::Application) => {
                format!("Your application has been started: {}", id.channel_mention())
            }
            (Self::Opened(id), PrivateChannelKind::Purchase) => {
                format!("Your purchase request has been created: {}", id.channel_mention())
            }
            (Self::AlreadyOpen(id), PrivateChannelKind::Application) => {
                format!("You already have an application in progress: {}", id.channel_mention())
            }
            (Self::AlreadyOpen(id), PrivateChannelKind::Ticket) => {
                format!("You already have an open ticket: {}", id.channel_mention())
            }
            (Self::AlreadyOpen(id), PrivateChannelKind::Purchase) => {
                format!("You already have an open purchase request: {}", id.channel_mention())
            }
            (Self::Refused(reason), _) => reason.clone(),
        }
    }
}

/// A close that passed its checks and holds the closing claim
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingClose {
    pub channel: ChannelInfo,
    pub kind: PrivateChannelKind,
    pub closer_id: Snowflake,
    pub closer_tag: String,
}

impl PendingClose {
    /// Member the channel was opened for
    pub fn owner(&self) -> Option<Snowflake> {
        self.channel
            .member_overwrites
            .iter()
            .copied()
            .find(|id| *id != self.closer_id)
            .or_else(|| self.channel.member_overwrites.first().copied())
    }
}

/// Result of a close request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseOutcome {
    Pending(PendingClose),
    Refused(String),
}

/// Close button in its disabled "Closing..." state
pub fn closing_button(kind: PrivateChannelKind) -> Component {
    Component::Button {
        custom_id: kind.close_button_id().to_string(),
        label: "Closing...".to_string(),
        emoji: Some("🔒".to_string()),
        style: ButtonStyle::Danger,
        disabled: true,
    }
}

/// Ticket service
pub struct TicketService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> TicketService<'a> {
    /// Create a new TicketService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Open a support ticket
    #[instrument(skip(self))]
    pub async fn open_ticket(&self, user_id: Snowflake, username: &str) -> ServiceResult<OpenOutcome> {
        let welcome = OutgoingMessage::notice(Notice::success(
            format!("Ticket - {username}"),
            "Support will be with you shortly. Please describe your issue in detail.",
        ))
        .with_content(format!("{}, welcome to your ticket!", user_id.user_mention()))
        .with_component(close_button(PrivateChannelKind::Ticket));

        self.open(PrivateChannelKind::Ticket, user_id, username, welcome).await
    }

    /// Start an application, unless a recent denial still blocks it
    #[instrument(skip(self))]
    pub async fn open_application(&self, user_id: Snowflake, username: &str) -> ServiceResult<OpenOutcome> {
        let now = self.ctx.clock().now();
        let latest = self
            .ctx
            .application_repo()
            .latest_active_denial(user_id, now)
            .await?;

        if let ReapplyGate::Blocked { days_left, .. } = ReapplyGate::evaluate(latest.as_ref(), now) {
            info!(user_id = %user_id, days_left, "Reapplication blocked");
            return Ok(OpenOutcome::Refused(format!(
                "❌ You cannot apply again yet. Please wait {days_left} more days before reapplying."
            )));
        }

        let welcome = OutgoingMessage::notice(
            Notice::new(
                format!("{username} Application"),
                "Thank you for your interest in joining our platform!\n\
                 All questions during the interview process are unique for every application.\n\
                 A staff member will handle your application as soon as possible.\n\
                 **Note:** If your application is denied, you will need to wait 31 days before reapplying.",
                APPLICATION_COLOR,
            )
            .footer("We appreciate your patience."),
        )
        .with_component(Component::button(
            PrivateChannelKind::Application.close_button_id(),
            "Close",
            ButtonStyle::Danger,
        ));

        self.open(PrivateChannelKind::Application, user_id, username, welcome).await
    }

    /// Open a purchase request for a product channel
    ///
    /// Only approved members may purchase.
    #[instrument(skip(self, member))]
    pub async fn open_purchase(
        &self,
        user_id: Snowflake,
        username: &str,
        member: &dyn RoleHolder,
        product_channel_id: Snowflake,
    ) -> ServiceResult<OpenOutcome> {
        let guild = self.ctx.guild();
        if !guild.approved_role_id.is_zero() && !member.has_role(guild.approved_role_id) {
            return Ok(OpenOutcome::Refused(format!(
                "❌ You need to be approved to make a purchase. Please apply at {} first.",
                guild.application_channel_id.channel_mention()
            )));
        }

        let product = match self.ctx.platform().channel(product_channel_id).await {
            Ok(channel) if self.is_product(&channel) => channel,
            Ok(_) => return Ok(OpenOutcome::Refused(PRODUCT_NOT_FOUND.to_string())),
            Err(e) if e.is_not_found() => {
                return Ok(OpenOutcome::Refused(PRODUCT_NOT_FOUND.to_string()))
            }
            Err(e) => return Err(e.into()),
        };

        let product_mention = product.id.channel_mention();
        let welcome = OutgoingMessage::notice(
            Notice::new(
                format!("Purchase Request - {}", product_label(&product.name)),
                format!("**Customer:** {username} ({user_id})"),
                PURCHASE_COLOR,
            )
            .field("Product", &product_mention, false)
            .timestamp(self.ctx.clock().now()),
        )
        .with_content(format!(
            "{}, a staff member will assist you with your purchase of {product_mention}.",
            user_id.user_mention()
        ))
        .with_component(close_button(PrivateChannelKind::Purchase));

        self.open(PrivateChannelKind::Purchase, user_id, username, welcome).await
    }

    fn is_product(&self, channel: &ChannelInfo) -> bool {
        let category = self.ctx.guild().product_category_id;
        channel.kind == ChannelKind::GuildText
            && (category.is_zero() || channel.parent_id == Some(category))
    }

    async fn open(
        &self,
        kind: PrivateChannelKind,
        user_id: Snowflake,
        username: &str,
        welcome: OutgoingMessage,
    ) -> ServiceResult<OpenOutcome> {
        let guild_id = self.ctx.guild_id();
        let platform = self.ctx.platform();

        if let Some(existing) = platform
            .guild_channels(guild_id)
            .await?
            .into_iter()
            .find(|c| c.kind == ChannelKind::GuildText && kind.matches(&c.name) && c.grants_member(user_id))
        {
            return Ok(OpenOutcome::AlreadyOpen(existing.id));
        }

        let category = self.ctx.guild().ticket_category_id;
        let channel = platform
            .create_private_channel(
                guild_id,
                &kind.channel_name(username),
                (!category.is_zero()).then_some(category),
                user_id,
            )
            .await?;

        platform.send_message(channel.id, welcome).await?;

        info!(
            channel_id = %channel.id,
            user_id = %user_id,
            kind = kind.label(),
            "Private channel opened"
        );

        Ok(OpenOutcome::Opened(channel.id))
    }

    /// Validate a ticket or purchase close and claim the channel
    #[instrument(skip(self))]
    pub async fn begin_close_ticket(
        &self,
        channel_id: Snowflake,
        closer_id: Snowflake,
        closer_tag: &str,
    ) -> ServiceResult<CloseOutcome> {
        let channel = self.ctx.platform().channel(channel_id).await?;
        let kind = match PrivateChannelKind::of_channel(&channel.name) {
            Some(kind @ (PrivateChannelKind::Ticket | PrivateChannelKind::Purchase)) => kind,
            _ => {
                return Ok(CloseOutcome::Refused(
                    "This command can only be used in ticket channels.".to_string(),
                ))
            }
        };
        Ok(self.claim(channel, kind, closer_id, closer_tag))
    }

    /// Validate an application close (staff only) and claim the channel
    #[instrument(skip(self, member))]
    pub async fn begin_close_application(
        &self,
        channel_id: Snowflake,
        closer_id: Snowflake,
        closer_tag: &str,
        member: &dyn RoleHolder,
    ) -> ServiceResult<CloseOutcome> {
        let channel = self.ctx.platform().channel(channel_id).await?;
        if !PrivateChannelKind::Application.matches(&channel.name) {
            return Ok(CloseOutcome::Refused(
                "This command can only be used in application channels.".to_string(),
            ));
        }

        let staff_role = self.ctx.guild().staff_role_id;
        if staff_role.is_zero() || !member.has_role(staff_role) {
            return Ok(CloseOutcome::Refused(
                "You do not have permission to close applications.".to_string(),
            ));
        }

        Ok(self.claim(channel, PrivateChannelKind::Application, closer_id, closer_tag))
    }

    fn claim(
        &self,
        channel: ChannelInfo,
        kind: PrivateChannelKind,
        closer_id: Snowflake,
        closer_tag: &str,
    ) -> CloseOutcome {
        if !self.ctx.closing_channels().try_claim(channel.id) {
            return CloseOutcome::Refused(format!(
                "This {} is already being closed.",
                kind.label().to_lowercase()
            ));
        }

        CloseOutcome::Pending(PendingClose {
            channel,
            kind,
            closer_id,
            closer_tag: closer_tag.to_string(),
        })
    }

    /// Archive the channel and schedule its deletion
    ///
    /// Transcript delivery is best effort; the channel is deleted either way.
    #[instrument(skip(self, pending), fields(channel_id = %pending.channel.id))]
    pub async fn finish_close(&self, pending: PendingClose) -> JoinHandle<()> {
        let platform = self.ctx.platform();
        let channel = &pending.channel;
        let label = pending.kind.label();

        match platform.fetch_history(channel.id).await {
            Ok(history) => {
                let html = render_transcript(&channel.name, &history, self.ctx.clock().now());
                let filename = transcript_filename(&channel.name);

                if pending.kind.sends_owner_transcript() {
                    if let Some(owner) = pending.owner() {
                        let dm = OutgoingMessage::text(format!(
                            "Here is the transcript of your {}:",
                            label.to_lowercase()
                        ))
                        .with_attachment(&filename, html.clone().into_bytes());
                        if let Err(e) = platform.direct_message(owner, dm).await {
                            warn!(user_id = %owner, error = %e, "Could not DM transcript");
                        }
                    }
                }

                let log_channel = self.ctx.guild().transcript_log_channel_id;
                if !log_channel.is_zero() {
                    let log = OutgoingMessage::text(format!(
                        "{label} {} closed by {}",
                        channel.name, pending.closer_tag
                    ))
                    .with_attachment(&filename, html.into_bytes());
                    if let Err(e) = platform.send_message(log_channel, log).await {
                        warn!(error = %e, "Could not post transcript to log channel");
                    }
                }

                let closing = OutgoingMessage::text(format!(
                    "This {} is being closed by {}. The transcript has been saved.",
                    label.to_lowercase(),
                    pending.closer_id.user_mention()
                ));
                if let Err(e) = platform.send_message(channel.id, closing).await {
                    warn!(error = %e, "Could not post closing notice");
                }
            }
            Err(e) => {
                error!(error = %e, "Transcript capture failed");
                let notice = OutgoingMessage::text(format!(
                    "An error occurred while generating the transcript. The {} will still be closed.",
                    label.to_lowercase()
                ));
                if let Err(e) = platform.send_message(channel.id, notice).await {
                    warn!(error = %e, "Could not post transcript failure notice");
                }
            }
        }

        info!(channel = %channel.name, closer_id = %pending.closer_id, "Private channel closing");

        schedule_delete(
            self.ctx.platform_handle(),
            self.ctx.closing_channels_handle(),
            channel.id,
            self.ctx.guild().channel_delete_delay(),
        )
    }
}

const PRODUCT_NOT_FOUND: &str = "❌ Error: Product not found.";

fn close_button(kind: PrivateChannelKind) -> Component {
    Component::button(kind.close_button_id(), "Close Ticket", ButtonStyle::Danger).with_emoji("🔒")
}

/// Delete the channel after `delay`; failures are logged, never retried
fn schedule_delete(
    platform: Arc<dyn PlatformGateway>,
    closing: Arc<ClosingChannels>,
    channel_id: Snowflake,
    delay: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        match platform.delete_channel(channel_id).await {
            Ok(()) => info!(channel_id = %channel_id, "Private channel deleted"),
            Err(e) => error!(channel_id = %channel_id, error = %e, "Failed to delete channel"),
        }
        closing.release(channel_id);
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestHarness;
    use chrono::{Duration as ChronoDuration, Utc};
    use lazy_core::{Application, ApplicationRepository, Clock, HistoryMessage};

    const ALICE: Snowflake = Snowflake::new(1001);
    const STAFF_MEMBER: Snowflake = Snowflake::new(1002);

    fn opened(outcome: OpenOutcome) -> Snowflake {
        match outcome {
            OpenOutcome::Opened(id) => id,
            other => panic!("expected a new channel, got {other:?}"),
        }
    }

    fn pending(outcome: CloseOutcome) -> PendingClose {
        match outcome {
            CloseOutcome::Pending(p) => p,
            CloseOutcome::Refused(reason) => panic!("close refused: {reason}"),
        }
    }

    #[tokio::test]
    async fn test_open_ticket_creates_private_channel() {
        let h = TestHarness::new();
        let service = TicketService::new(&h.ctx);

        let outcome = service.open_ticket(ALICE, "Alice").await.unwrap();
        assert_eq!(
            outcome.reply(PrivateChannelKind::Ticket),
            format!("Your ticket has been created: {}", opened(outcome.clone()).channel_mention())
        );

        let channel = h.platform.channel_named("ticket-alice").unwrap();
        assert_eq!(channel.parent_id, Some(h.ctx.guild().ticket_category_id));
        assert!(channel.grants_member(ALICE));

        let welcome = &h.platform.messages_in(channel.id)[0];
        assert_eq!(welcome.notices[0].title, "Ticket - Alice");
        assert!(welcome.components.contains(&close_button(PrivateChannelKind::Ticket)));
    }

    #[tokio::test]
    async fn test_second_ticket_points_at_first() {
        let h = TestHarness::new();
        let service = TicketService::new(&h.ctx);

        let first = opened(service.open_ticket(ALICE, "alice").await.unwrap());
        let second = service.open_ticket(ALICE, "alice").await.unwrap();

        assert_eq!(second, OpenOutcome::AlreadyOpen(first));
        assert!(second
            .reply(PrivateChannelKind::Ticket)
            .starts_with("You already have an open ticket"));
        assert_eq!(h.platform.channels().len(), 1);
    }

    #[tokio::test]
    async fn test_blocked_application_creates_no_channel() {
        let h = TestHarness::new();
        let denied = Application::denied(ALICE, STAFF_MEMBER, None, h.clock.now());
        h.applications.create(&denied).await.unwrap();
        h.clock.advance(ChronoDuration::days(30));

        let outcome = TicketService::new(&h.ctx)
            .open_application(ALICE, "alice")
            .await
            .unwrap();

        assert_eq!(
            outcome,
            OpenOutcome::Refused(
                "❌ You cannot apply again yet. Please wait 1 more days before reapplying.".to_string()
            )
        );
        assert!(h.platform.channels().is_empty());
    }

    #[tokio::test]
    async fn test_application_after_block_lapses() {
        let h = TestHarness::new();
        let denied = Application::denied(ALICE, STAFF_MEMBER, None, h.clock.now());
        h.applications.create(&denied).await.unwrap();
        h.clock.advance(ChronoDuration::days(32));

        let id = opened(
            TicketService::new(&h.ctx)
                .open_application(ALICE, "alice")
                .await
                .unwrap(),
        );
        let welcome = &h.platform.messages_in(id)[0];
        assert_eq!(welcome.notices[0].title, "alice Application");
    }

    #[tokio::test]
    async fn test_purchase_requires_approved_role() {
        let h = TestHarness::new();
        let product = h
            .platform
            .add_text_channel("🔥│spoofer", Some(h.ctx.guild().product_category_id));
        let roles: Vec<Snowflake> = Vec::new();

        let outcome = TicketService::new(&h.ctx)
            .open_purchase(ALICE, "alice", &roles, product)
            .await
            .unwrap();
        assert!(matches!(outcome, OpenOutcome::Refused(ref r) if r.contains("need to be approved")));
    }

    #[tokio::test]
    async fn test_purchase_unknown_product() {
        let h = TestHarness::new();
        let roles = vec![h.ctx.guild().approved_role_id];
        let outsider = h.platform.add_text_channel("general", None);

        let service = TicketService::new(&h.ctx);
        for product in [outsider, Snowflake::new(424_242)] {
            let outcome = service
                .open_purchase(ALICE, "alice", &roles, product)
                .await
                .unwrap();
            assert_eq!(outcome, OpenOutcome::Refused(PRODUCT_NOT_FOUND.to_string()));
        }
    }

    #[tokio::test]
    async fn test_purchase_opens_channel() {
        let h = TestHarness::new();
        let product = h
            .platform
            .add_text_channel("spoofer", Some(h.ctx.guild().product_category_id));
        let roles = vec![h.ctx.guild().approved_role_id];

        let id = opened(
            TicketService::new(&h.ctx)
                .open_purchase(ALICE, "alice", &roles, product)
                .await
                .unwrap(),
        );
        let welcome = &h.platform.messages_in(id)[0];
        assert_eq!(welcome.notices[0].title, "Purchase Request - SPOOFER");
        assert_eq!(welcome.notices[0].fields[0].value, product.channel_mention());
        assert!(h.platform.channel_named("purchase-alice").is_some());
    }

    #[tokio::test]
    async fn test_close_ticket_full_flow() {
        let h = TestHarness::new();
        let service = TicketService::new(&h.ctx);
        let channel = opened(service.open_ticket(ALICE, "alice").await.unwrap());
        h.platform.set_history(
            channel,
            vec![HistoryMessage {
                id: Snowflake::new(1),
                author_id: ALICE,
                author_name: "alice".to_string(),
                author_is_bot: false,
                content: "my loader crashes".to_string(),
                attachments: Vec::new(),
                embed_titles: Vec::new(),
                created_at: Utc::now(),
            }],
        );

        let pending = pending(
            service
                .begin_close_ticket(channel, STAFF_MEMBER, "staff#0001")
                .await
                .unwrap(),
        );
        assert_eq!(pending.owner(), Some(ALICE));
        assert!(h.closing.is_closing(channel));

        // A second close while closing is refused
        let again = service
            .begin_close_ticket(channel, STAFF_MEMBER, "staff#0001")
            .await
            .unwrap();
        assert!(matches!(again, CloseOutcome::Refused(_)));

        service.finish_close(pending).await.await.unwrap();

        let dm = &h.platform.dms_to(ALICE)[0];
        assert_eq!(dm.content.as_deref(), Some("Here is the transcript of your ticket:"));
        let attachment = dm.attachment.as_ref().unwrap();
        assert_eq!(attachment.filename, "ticket-alice.html");
        assert!(String::from_utf8_lossy(&attachment.bytes).contains("my loader crashes"));

        let log = &h.platform.messages_in(h.ctx.guild().transcript_log_channel_id)[0];
        assert_eq!(log.content.as_deref(), Some("Ticket ticket-alice closed by staff#0001"));

        assert_eq!(h.platform.deleted_channels(), vec![channel]);
        assert!(!h.closing.is_closing(channel));
    }

    #[tokio::test]
    async fn test_close_outside_ticket_channel() {
        let h = TestHarness::new();
        let general = h.platform.add_text_channel("general", None);

        let outcome = TicketService::new(&h.ctx)
            .begin_close_ticket(general, ALICE, "alice")
            .await
            .unwrap();
        assert_eq!(
            outcome,
            CloseOutcome::Refused("This command can only be used in ticket channels.".to_string())
        );
    }

    #[tokio::test]
    async fn test_application_close_requires_staff() {
        let h = TestHarness::new();
        let service = TicketService::new(&h.ctx);
        let channel = opened(service.open_application(ALICE, "alice").await.unwrap());

        let no_roles: Vec<Snowflake> = Vec::new();
        let outcome = service
            .begin_close_application(channel, ALICE, "alice", &no_roles)
            .await
            .unwrap();
        assert_eq!(
            outcome,
            CloseOutcome::Refused("You do not have permission to close applications.".to_string())
        );

        let staff = vec![h.ctx.guild().staff_role_id];
        let pending = pending(
            service
                .begin_close_application(channel, STAFF_MEMBER, "staff", &staff)
                .await
                .unwrap(),
        );
        service.finish_close(pending).await.await.unwrap();

        // Applicants do not get a transcript copy
        assert!(h.platform.dms_to(ALICE).is_empty());
        assert_eq!(h.platform.deleted_channels(), vec![channel]);
    }

    #[tokio::test]
    async fn test_transcript_failure_still_deletes() {
        let h = TestHarness::new();
        let service = TicketService::new(&h.ctx);
        let channel = opened(service.open_ticket(ALICE, "alice").await.unwrap());
        h.platform.fail_history();

        let pending = pending(service.begin_close_ticket(channel, ALICE, "alice").await.unwrap());
        service.finish_close(pending).await.await.unwrap();

        let posted = h.platform.messages_in(channel);
        assert!(posted.iter().any(|m| m.content.as_deref()
            == Some("An error occurred while generating the transcript. The ticket will still be closed.")));
        assert_eq!(h.platform.deleted_channels(), vec![channel]);
    }

    #[test]
    fn test_closing_button_is_disabled() {
        match closing_button(PrivateChannelKind::Application) {
            Component::Button {
                custom_id,
                label,
                disabled,
                ..
            } => {
                assert_eq!(custom_id, "close_application");
                assert_eq!(label, "Closing...");
                assert!(disabled);
            }
            Component::Select { .. } => panic!("expected a button"),
        }
    }
}
