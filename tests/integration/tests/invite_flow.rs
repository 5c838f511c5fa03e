//! Invite attribution and rewards across a run of joins

use chrono::Duration;
use integration_tests::{invite, BOB};
use lazy_core::{AccessTier, Clock, PanelError, Snowflake, UserRecord, UserRepository};
use lazy_service::services::{InviteService, JoinOutcome, JoiningMember};
use lazy_service::testing::{TestHarness, GUILD_ID};

fn newcomer(n: i64) -> JoiningMember {
    JoiningMember {
        user_id: Snowflake::new(7000 + n),
        username: format!("newcomer{n}"),
        is_bot: false,
    }
}

async fn tracked_inviter(h: &TestHarness) {
    h.users
        .upsert(&UserRecord::granted(BOB, "bob", AccessTier::Lifetime, h.clock.now()))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_third_join_pays_a_reward() {
    let h = TestHarness::new();
    tracked_inviter(&h).await;
    let invites = InviteService::new(&h.ctx);

    h.platform.set_invites(vec![invite("bobcode", BOB, 0)]);
    assert_eq!(invites.seed(GUILD_ID).await.unwrap(), 1);
    assert!(invites
        .on_invite_created(GUILD_ID, "bobcode", Some(BOB), None)
        .await
        .unwrap());

    let mut outcomes = Vec::new();
    for n in 1..=3 {
        h.platform.set_invites(vec![invite("bobcode", BOB, n as u64)]);
        outcomes.push(invites.on_member_join(GUILD_ID, &newcomer(n)).await.unwrap());
        h.clock.advance(Duration::minutes(5));
    }

    assert!(matches!(
        &outcomes[0],
        JoinOutcome::Credited { total_invites: 1, reward_key: None, .. }
    ));
    assert_eq!(
        outcomes[2],
        JoinOutcome::Credited {
            inviter_id: BOB,
            code: "bobcode".to_string(),
            total_invites: 3,
            reward_key: Some("KEY-0001".to_string()),
        }
    );

    let inviter = h.users.find_by_discord_id(BOB).await.unwrap().unwrap();
    assert_eq!(inviter.total_invites, 3);
    assert_eq!(inviter.generated_keys.len(), 1);
    assert_eq!(inviter.generated_keys[0].days, 1);

    let invitee = h.users.find_by_discord_id(newcomer(1).user_id).await.unwrap().unwrap();
    assert_eq!(invitee.invited_by, Some(BOB));
    assert!(!invitee.is_active);

    let dms = h.platform.dms_to(BOB);
    assert_eq!(dms.len(), 1);
    assert_eq!(dms[0].notices[0].title, "🎉 Invite Reward!");

    let log = h.platform.messages_in(h.ctx.guild().invite_log_channel_id);
    assert_eq!(log.len(), 3);
}

#[tokio::test]
async fn test_reward_survives_a_panel_outage() {
    let h = TestHarness::new();
    tracked_inviter(&h).await;
    let invites = InviteService::new(&h.ctx);
    h.platform.set_invites(vec![invite("bobcode", BOB, 0)]);
    invites.seed(GUILD_ID).await.unwrap();
    h.panel.fail_with(PanelError::NavigationTimeout("submit".to_string()));

    let mut last = JoinOutcome::Ignored;
    for n in 1..=3 {
        h.platform.set_invites(vec![invite("bobcode", BOB, n as u64)]);
        last = invites.on_member_join(GUILD_ID, &newcomer(n)).await.unwrap();
    }

    assert!(matches!(
        last,
        JoinOutcome::Credited { total_invites: 3, reward_key: None, .. }
    ));
    assert!(h.platform.dms_to(BOB).is_empty());
}

#[tokio::test]
async fn test_restart_loses_the_baseline() {
    let h = TestHarness::new();
    tracked_inviter(&h).await;
    let invites = InviteService::new(&h.ctx);

    // No snapshot yet: the first join only seeds
    h.platform.set_invites(vec![invite("bobcode", BOB, 4)]);
    assert_eq!(
        invites.on_member_join(GUILD_ID, &newcomer(1)).await.unwrap(),
        JoinOutcome::Seeded
    );

    h.platform.set_invites(vec![invite("bobcode", BOB, 5)]);
    assert!(matches!(
        invites.on_member_join(GUILD_ID, &newcomer(2)).await.unwrap(),
        JoinOutcome::Credited { total_invites: 1, .. }
    ));
}

#[tokio::test]
async fn test_bots_and_vanity_joins() {
    let h = TestHarness::new();
    let invites = InviteService::new(&h.ctx);
    h.platform.set_invites(vec![invite("bobcode", BOB, 0)]);
    invites.seed(GUILD_ID).await.unwrap();

    let bot = JoiningMember {
        is_bot: true,
        ..newcomer(1)
    };
    assert_eq!(invites.on_member_join(GUILD_ID, &bot).await.unwrap(), JoinOutcome::Ignored);

    // Nothing changed, so the join came through some other path
    assert_eq!(
        invites.on_member_join(GUILD_ID, &newcomer(2)).await.unwrap(),
        JoinOutcome::Unattributed
    );
}
