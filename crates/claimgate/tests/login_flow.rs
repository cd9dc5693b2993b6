// SPDX-FileCopyrightText: 2026 Claimgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end login flow tests over the full stack: static claims, temp
//! SQLite mapping stores, mock account directory.

use claimgate_core::{
    AccountDirectory, Attribute, BackendMode, ClaimgateError, IdentityStore, LegacyIdentityStore,
};
use claimgate_test_utils::TestHarness;

#[tokio::test]
async fn known_user_logs_on_without_account_creation() {
    let harness = TestHarness::builder()
        .with_mode(BackendMode::LogonOnly)
        .with_prefix("USERINFO_")
        .with_required(&[Attribute::UserId, Attribute::Email])
        .with_claim("USERINFO_sub", "user0@example.com")
        .with_claim("USERINFO_email", "user0@mail.com")
        .with_current_row("user0@example.com", "user0@example.com")
        .with_existing_user("user0@example.com")
        .build()
        .await
        .unwrap();

    let result = harness.authenticator.authenticate().await.unwrap();
    assert_eq!(result, Some("user0@example.com".to_string()));
    assert!(harness.directory.created_users().is_empty());
}

#[tokio::test]
async fn missing_required_email_aborts_with_claim_list() {
    let harness = TestHarness::builder()
        .with_mode(BackendMode::LogonOnly)
        .with_prefix("USERINFO_")
        .with_required(&[Attribute::UserId, Attribute::Email])
        .with_claim("USERINFO_sub", "user0@example.com")
        .build()
        .await
        .unwrap();

    match harness.authenticator.authenticate().await {
        Err(ClaimgateError::MissingClaims { claims }) => {
            assert_eq!(claims, vec![Attribute::Email]);
        }
        other => panic!("expected MissingClaims, got {other:?}"),
    }
}

#[tokio::test]
async fn first_login_migrates_convergent_legacy_identities() {
    let harness = TestHarness::builder()
        .with_mode(BackendMode::Provisioning)
        .with_claim("OIDC_CLAIM_sub", "alice@new-idp.example")
        .with_claim(
            "OIDC_CLAIM_altuids",
            "alice@old-idp.example,asmith@ancient.example",
        )
        .with_legacy_row("alice@old-idp.example", "alice")
        .with_legacy_row("asmith@ancient.example", "alice")
        .build()
        .await
        .unwrap();

    let result = harness.authenticator.authenticate().await.unwrap();
    assert_eq!(result, Some("alice".to_string()));

    // The account was provisioned and the mapping created.
    assert_eq!(harness.directory.created_users(), vec!["alice".to_string()]);
    let mapping = harness
        .storage
        .find_by_external_id("alice@new-idp.example")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(mapping.local_id, "alice");

    // Both contributing legacy records are flagged migrated.
    for legacy_id in ["alice@old-idp.example", "asmith@ancient.example"] {
        let record = harness
            .storage
            .find_by_legacy_id(legacy_id)
            .await
            .unwrap()
            .unwrap();
        assert!(record.migrated);
    }
}

#[tokio::test]
async fn divergent_legacy_identities_abort_with_full_detail() {
    let harness = TestHarness::builder()
        .with_mode(BackendMode::Provisioning)
        .with_claim("OIDC_CLAIM_sub", "alice@new-idp.example")
        .with_claim(
            "OIDC_CLAIM_altuids",
            "alice@old-idp.example,asmith@ancient.example",
        )
        .with_legacy_row("alice@old-idp.example", "alice")
        .with_legacy_row("asmith@ancient.example", "a.smith")
        .build()
        .await
        .unwrap();

    match harness.authenticator.authenticate().await {
        Err(ClaimgateError::UnresolvableMapping { candidates }) => {
            assert_eq!(candidates.len(), 2);
            assert!(candidates.iter().all(|c| !c.records.is_empty()));
        }
        other => panic!("expected UnresolvableMapping, got {other:?}"),
    }

    // No account, no mapping, no migration flags.
    assert!(harness.directory.created_users().is_empty());
    assert!(
        harness
            .storage
            .find_by_external_id("alice@new-idp.example")
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn strip_domain_derives_bare_local_id() {
    let harness = TestHarness::builder()
        .with_mode(BackendMode::Provisioning)
        .with_strip_domain(true)
        .with_claim("OIDC_CLAIM_sub", "user0@example.com")
        .build()
        .await
        .unwrap();

    let result = harness.authenticator.authenticate().await.unwrap();
    assert_eq!(result, Some("user0".to_string()));
    assert_eq!(harness.directory.created_users(), vec!["user0".to_string()]);
}

#[tokio::test]
async fn post_login_hooks_update_last_seen_and_profile() {
    let harness = TestHarness::builder()
        .with_mode(BackendMode::Provisioning)
        .with_autoupdate(true)
        .with_claim("OIDC_CLAIM_sub", "user0@example.com")
        .with_claim("OIDC_CLAIM_name", "John Smith")
        .with_claim("OIDC_CLAIM_email", "user0@mail.com")
        .build()
        .await
        .unwrap();

    let local_id = harness
        .authenticator
        .authenticate()
        .await
        .unwrap()
        .expect("login should succeed");
    let before = harness
        .storage
        .find_by_external_id("user0@example.com")
        .await
        .unwrap()
        .unwrap();

    harness
        .hooks
        .post_login(&local_id, "user0@example.com")
        .await
        .unwrap();

    let after = harness
        .storage
        .find_by_external_id("user0@example.com")
        .await
        .unwrap()
        .unwrap();
    assert!(after.last_seen >= before.last_seen);
    assert_eq!(
        harness.directory.display_name(&local_id).await.unwrap(),
        Some("John Smith".to_string())
    );
    assert_eq!(
        harness.directory.email_address(&local_id).await.unwrap(),
        Some("user0@mail.com".to_string())
    );
}

#[tokio::test]
async fn second_login_reuses_the_same_mapping() {
    let harness = TestHarness::builder()
        .with_mode(BackendMode::Provisioning)
        .with_claim("OIDC_CLAIM_sub", "user0@example.com")
        .build()
        .await
        .unwrap();

    let first = harness.authenticator.authenticate().await.unwrap();
    let second = harness.authenticator.authenticate().await.unwrap();
    assert_eq!(first, second);
    // Provisioning happened exactly once.
    assert_eq!(harness.directory.created_users().len(), 1);
}
