//! Applications, purchases and ticket closing from first click to deletion

use chrono::Duration;
use integration_tests::{chat_line, ALICE, STAFF_MEMBER};
use lazy_core::{Clock, PlatformGateway, PrivateChannelKind, Snowflake};
use lazy_service::dto::ApplicationDecisionRequest;
use lazy_service::services::{ApplicationService, CloseOutcome, OpenOutcome, TicketService};
use lazy_service::testing::TestHarness;

fn decision() -> ApplicationDecisionRequest {
    ApplicationDecisionRequest {
        user_id: ALICE,
        username: "alice".to_string(),
        reason: Some("read the rules".to_string()),
    }
}

#[tokio::test]
async fn test_denied_applicant_waits_out_the_block() {
    let h = TestHarness::new();
    let tickets = TicketService::new(&h.ctx);

    let OpenOutcome::Opened(_) = tickets.open_application(ALICE, "alice").await.unwrap() else {
        panic!("application channel not opened");
    };
    ApplicationService::new(&h.ctx)
        .deny(decision(), STAFF_MEMBER, "staff")
        .await
        .unwrap();
    let dm = &h.platform.dms_to(ALICE)[0];
    assert_eq!(dm.notices[0].title, "❌ Application Denied");

    let outcome = tickets.open_application(ALICE, "alice").await.unwrap();
    assert!(matches!(outcome, OpenOutcome::Refused(ref text) if text.contains("31 more days")));

    let channel = h.platform.channel_named("application-alice").unwrap();
    h.platform.delete_channel(channel.id).await.unwrap();
    h.clock.advance(Duration::days(31) + Duration::minutes(1));
    assert!(matches!(
        tickets.open_application(ALICE, "alice").await.unwrap(),
        OpenOutcome::Opened(_)
    ));
}

#[tokio::test]
async fn test_approved_member_buys_and_closes() {
    let h = TestHarness::new();
    let guild = h.ctx.guild().clone();
    let product = h
        .platform
        .add_text_channel("💎│hwid-spoofer", Some(guild.product_category_id));

    let reply = ApplicationService::new(&h.ctx)
        .approve(decision(), STAFF_MEMBER, "staff")
        .await
        .unwrap();
    assert_eq!(
        reply.message.content.as_deref(),
        Some("✅ Successfully approved alice's application.")
    );
    assert!(h.platform.has_role(ALICE, guild.approved_role_id));

    let tickets = TicketService::new(&h.ctx);
    let roles = vec![guild.approved_role_id];
    let OpenOutcome::Opened(channel) = tickets
        .open_purchase(ALICE, "alice", &roles, product)
        .await
        .unwrap()
    else {
        panic!("purchase channel not opened");
    };
    let welcome = &h.platform.messages_in(channel)[0];
    assert_eq!(welcome.notices[0].title, "Purchase Request - HWID SPOOFER");

    h.platform.set_history(
        channel,
        vec![chat_line(1, ALICE, "alice", "I'd like a monthly key <please>", h.clock.now())],
    );

    let CloseOutcome::Pending(pending) = tickets
        .begin_close_ticket(channel, STAFF_MEMBER, "staff")
        .await
        .unwrap()
    else {
        panic!("close refused");
    };
    assert_eq!(pending.kind, PrivateChannelKind::Purchase);
    tickets.finish_close(pending).await.await.unwrap();

    let transcript = h
        .platform
        .dms_to(ALICE)
        .into_iter()
        .find_map(|dm| dm.attachment)
        .unwrap();
    let html = String::from_utf8_lossy(&transcript.bytes).to_string();
    assert!(html.contains("&lt;please&gt;"));
    assert_eq!(h.platform.deleted_channels(), vec![channel]);
}

#[tokio::test]
async fn test_members_cannot_close_applications() {
    let h = TestHarness::new();
    let tickets = TicketService::new(&h.ctx);
    let OpenOutcome::Opened(channel) = tickets.open_application(ALICE, "alice").await.unwrap() else {
        panic!("application channel not opened");
    };

    let no_roles: Vec<Snowflake> = Vec::new();
    let outcome = tickets
        .begin_close_application(channel, ALICE, "alice", &no_roles)
        .await
        .unwrap();
    assert!(matches!(outcome, CloseOutcome::Refused(_)));
    assert!(!h.closing.is_closing(channel));

    let staff = vec![h.ctx.guild().staff_role_id];
    let outcome = tickets
        .begin_close_application(channel, STAFF_MEMBER, "staff", &staff)
        .await
        .unwrap();
    assert!(matches!(outcome, CloseOutcome::Pending(_)));
}
