//! Access grants, key commands and the validator working together

use chrono::Duration;
use integration_tests::{validate_slash, ALICE, BOB, STAFF_MEMBER};
use lazy_core::{AccessTier, Clock, Denial, Snowflake, UserRepository, Verdict};
use lazy_service::dto::{GenerateKeyRequest, GrantAccessRequest, RevokeAccessRequest};
use lazy_service::services::commands::slash;
use lazy_service::services::{AccessDecision, AccessService, Gated, KeyService};
use lazy_service::testing::{TestHarness, BOT_OWNER};

fn grant(user_id: Snowflake, tier: AccessTier) -> GrantAccessRequest {
    GrantAccessRequest {
        user_id,
        username: "alice".to_string(),
        tier,
        reason: Some("customer".to_string()),
    }
}

#[tokio::test]
async fn test_grant_expires_and_stays_expired() {
    let h = TestHarness::new();
    let access = AccessService::new(&h.ctx);

    // Unknown members are refused without a write
    assert_eq!(access.check(ALICE).await.unwrap(), AccessDecision::NoAccess);
    assert!(h.users.is_empty());

    access.grant(grant(ALICE, AccessTier::OneWeek)).await.unwrap();
    assert!(access.check(ALICE).await.unwrap().is_granted());
    assert!(h.platform.has_role(ALICE, h.ctx.guild().reseller_role_id));

    h.clock.advance(Duration::days(8));
    assert_eq!(access.check(ALICE).await.unwrap(), AccessDecision::Expired);
    let record = h.users.find_by_discord_id(ALICE).await.unwrap().unwrap();
    assert!(!record.is_active);

    assert_eq!(access.check(ALICE).await.unwrap(), AccessDecision::NoAccess);
}

#[tokio::test]
async fn test_regrant_after_revoke() {
    let h = TestHarness::new();
    let access = AccessService::new(&h.ctx);

    access.grant(grant(ALICE, AccessTier::Lifetime)).await.unwrap();
    access
        .revoke(RevokeAccessRequest {
            user_id: ALICE,
            reason: None,
        })
        .await
        .unwrap();
    assert_eq!(access.check(ALICE).await.unwrap(), AccessDecision::NoAccess);
    assert!(!h.platform.has_role(ALICE, h.ctx.guild().reseller_role_id));

    access.grant(grant(ALICE, AccessTier::OneDay)).await.unwrap();
    let record = h.users.find_by_discord_id(ALICE).await.unwrap().unwrap();
    assert!(record.is_active);
    assert_eq!(record.access_tier, AccessTier::OneDay);
    assert_eq!(record.access_expires, Some(h.clock.now() + Duration::days(1)));
}

#[tokio::test]
async fn test_key_command_cooldown() {
    let h = TestHarness::new();
    let key_channel = h.ctx.guild().key_channel_id;
    let no_roles: Vec<Snowflake> = Vec::new();
    AccessService::new(&h.ctx)
        .grant(grant(ALICE, AccessTier::Lifetime))
        .await
        .unwrap();

    // Outside the key channel is refused and does not start a cooldown
    let elsewhere = Snowflake::new(999);
    let verdict = validate_slash(&h.ctx, slash::KEY, ALICE, Some(elsewhere), &no_roles, h.clock.now());
    assert!(matches!(verdict, Verdict::Denied(Denial::Condition(_))));

    let verdict = validate_slash(&h.ctx, slash::KEY, ALICE, Some(key_channel), &no_roles, h.clock.now());
    assert_eq!(verdict, Verdict::Allowed);

    let minted = KeyService::new(&h.ctx)
        .generate(
            ALICE,
            GenerateKeyRequest {
                days: 30,
                note: "customer".to_string(),
            },
        )
        .await
        .unwrap();
    assert!(!minted.is_refused());

    let verdict = validate_slash(&h.ctx, slash::KEY, ALICE, Some(key_channel), &no_roles, h.clock.now());
    match verdict {
        Verdict::Denied(Denial::Cooldown(hit)) => assert_eq!(hit.time_left, 15 * 60),
        other => panic!("expected a cooldown, got {other:?}"),
    }

    // Cooldowns are per user
    let verdict = validate_slash(&h.ctx, slash::KEY, BOB, Some(key_channel), &no_roles, h.clock.now());
    assert_eq!(verdict, Verdict::Allowed);

    h.clock.advance(Duration::minutes(15));
    let verdict = validate_slash(&h.ctx, slash::KEY, ALICE, Some(key_channel), &no_roles, h.clock.now());
    assert_eq!(verdict, Verdict::Allowed);

    let record = h.users.find_by_discord_id(ALICE).await.unwrap().unwrap();
    assert_eq!(record.generated_keys.len(), 1);
    assert_eq!(record.generated_keys[0].value, "KEY-0001");
}

#[tokio::test]
async fn test_expired_member_cannot_mint() {
    let h = TestHarness::new();
    AccessService::new(&h.ctx)
        .grant(grant(ALICE, AccessTier::OneDay))
        .await
        .unwrap();
    h.clock.advance(Duration::days(2));

    let outcome = KeyService::new(&h.ctx)
        .generate(
            ALICE,
            GenerateKeyRequest {
                days: 1,
                note: "late".to_string(),
            },
        )
        .await
        .unwrap();

    assert!(outcome.is_refused());
    assert!(h.panel.orders().is_empty());
}

#[tokio::test]
async fn test_key_listing_pages() {
    let h = TestHarness::new();
    AccessService::new(&h.ctx)
        .grant(grant(ALICE, AccessTier::Lifetime))
        .await
        .unwrap();
    let keys = KeyService::new(&h.ctx);
    for n in 0..7 {
        keys.generate(
            ALICE,
            GenerateKeyRequest {
                days: 7,
                note: format!("batch {n}"),
            },
        )
        .await
        .unwrap();
        h.clock.advance(Duration::minutes(1));
    }

    let Gated::Done(page) = AccessService::new(&h.ctx).list_keys(ALICE, 0).await.unwrap() else {
        panic!("listing refused");
    };
    assert_eq!(page.total_pages, 2);
    assert!(page.notice.description.contains("KEY-0007"));
    assert_eq!(page.next_page(), 1);
    assert_eq!(page.previous_page(), 1);
}

#[tokio::test]
async fn test_access_command_audience() {
    let h = TestHarness::new();
    let staff_roles = vec![h.ctx.guild().staff_role_id];
    let no_roles: Vec<Snowflake> = Vec::new();
    let now = h.clock.now();

    assert_eq!(
        validate_slash(&h.ctx, slash::ACCESS, STAFF_MEMBER, None, &staff_roles, now),
        Verdict::Allowed
    );
    assert_eq!(
        validate_slash(&h.ctx, slash::ACCESS, BOT_OWNER, None, &no_roles, now),
        Verdict::Allowed
    );
    assert_eq!(
        validate_slash(&h.ctx, slash::ACCESS, ALICE, None, &no_roles, now),
        Verdict::Denied(Denial::General)
    );
}
