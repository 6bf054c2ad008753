//! Integration tests for the account tables.
//!
//! Exercises the repository layer against a real database:
//! - User creation, lookup, and the unique-email constraint
//! - Verification and reset token lifecycles
//! - Session registry updates and per-user aggregates
//! - Token pair rotation and revocation

use chrono::{Duration, Utc};
use sqlx::PgPool;
use tessera_core::device::{DeviceClassifier, UserAgentSniffer};
use tessera_db::models::auth_token::CreateAuthToken;
use tessera_db::models::session::CreateSession;
use tessera_db::models::user::CreateUser;
use tessera_db::repositories::{AuthTokenRepo, SessionRepo, UserRepo};

const CHROME_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
const IPHONE_UA: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) \
     AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Mobile/15E148 Safari/604.1";

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn new_user(email: &str) -> CreateUser {
    CreateUser {
        email: email.to_string(),
        password_hash: "$argon2id$v=19$stub".to_string(),
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
        role: "user".to_string(),
    }
}

fn new_session(user_id: i64, user_agent: &str) -> CreateSession {
    CreateSession {
        user_id,
        device: UserAgentSniffer.classify(user_agent),
        ip_address: Some("203.0.113.7".to_string()),
    }
}

fn new_token_pair(user_id: i64, session_id: i64) -> CreateAuthToken {
    CreateAuthToken {
        user_id,
        session_id,
        access_token: "header.payload.signature".to_string(),
        refresh_token: "header.payload2.signature2".to_string(),
        expires_at: Utc::now() + Duration::minutes(30),
    }
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_and_find_user(pool: PgPool) {
    let user = UserRepo::create(&pool, &new_user("ada@example.com"))
        .await
        .unwrap();

    assert_eq!(user.email, "ada@example.com");
    assert_eq!(user.role, "user");
    assert!(user.is_active);
    assert!(!user.is_verified);
    assert!(!user.is_premium);
    assert_eq!(user.display_name(), "Ada Lovelace");

    let by_id = UserRepo::find_by_id(&pool, user.id).await.unwrap();
    assert_eq!(by_id.unwrap().id, user.id);

    let by_email = UserRepo::find_by_email(&pool, "ada@example.com")
        .await
        .unwrap();
    assert_eq!(by_email.unwrap().id, user.id);

    // Lookups are case-sensitive; a differently cased address is a miss.
    let miss = UserRepo::find_by_email(&pool, "Ada@example.com")
        .await
        .unwrap();
    assert!(miss.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_email_rejected(pool: PgPool) {
    UserRepo::create(&pool, &new_user("dup@example.com"))
        .await
        .unwrap();

    let err = UserRepo::create(&pool, &new_user("dup@example.com"))
        .await
        .unwrap_err();

    match err {
        sqlx::Error::Database(db_err) => {
            assert_eq!(db_err.constraint(), Some("uq_users_email"));
        }
        other => panic!("expected unique violation, got {other:?}"),
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_verification_token_lifecycle(pool: PgPool) {
    let user = UserRepo::create(&pool, &new_user("verify@example.com"))
        .await
        .unwrap();

    let expires = Utc::now() + Duration::hours(24);
    assert!(
        UserRepo::set_verification_token(&pool, user.id, "tok-123", expires)
            .await
            .unwrap()
    );

    let stored = UserRepo::find_by_id(&pool, user.id).await.unwrap().unwrap();
    assert_eq!(stored.verification_token.as_deref(), Some("tok-123"));
    assert!(stored.verification_token_expires_at.is_some());

    assert!(UserRepo::mark_verified(&pool, user.id).await.unwrap());

    let verified = UserRepo::find_by_id(&pool, user.id).await.unwrap().unwrap();
    assert!(verified.is_verified);
    assert!(verified.verification_token.is_none());
    assert!(verified.verification_token_expires_at.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_password_update_clears_reset_token(pool: PgPool) {
    let user = UserRepo::create(&pool, &new_user("reset@example.com"))
        .await
        .unwrap();

    let expires = Utc::now() + Duration::hours(1);
    UserRepo::set_reset_token(&pool, user.id, "reset-tok", expires)
        .await
        .unwrap();

    assert!(
        UserRepo::update_password(&pool, user.id, "$argon2id$v=19$newhash")
            .await
            .unwrap()
    );

    let updated = UserRepo::find_by_id(&pool, user.id).await.unwrap().unwrap();
    assert_eq!(updated.password_hash, "$argon2id$v=19$newhash");
    assert!(updated.reset_token.is_none());
    assert!(updated.reset_token_expires_at.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_grant_premium_keeps_existing_customer_id(pool: PgPool) {
    let user = UserRepo::create(&pool, &new_user("premium@example.com"))
        .await
        .unwrap();

    assert!(
        UserRepo::grant_premium(&pool, user.id, Some("cus_123"))
            .await
            .unwrap()
    );

    let upgraded = UserRepo::find_by_id(&pool, user.id).await.unwrap().unwrap();
    assert!(upgraded.is_premium);
    assert!(upgraded.premium_activated_at.is_some());
    assert_eq!(upgraded.payment_customer_id.as_deref(), Some("cus_123"));

    // Granting again without a customer ID must not wipe the stored one.
    UserRepo::grant_premium(&pool, user.id, None).await.unwrap();
    let again = UserRepo::find_by_id(&pool, user.id).await.unwrap().unwrap();
    assert_eq!(again.payment_customer_id.as_deref(), Some("cus_123"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_set_active_toggles_account(pool: PgPool) {
    let user = UserRepo::create(&pool, &new_user("toggle@example.com"))
        .await
        .unwrap();

    assert!(UserRepo::set_active(&pool, user.id, false).await.unwrap());
    let row = UserRepo::find_by_id(&pool, user.id).await.unwrap().unwrap();
    assert!(!row.is_active);

    assert!(UserRepo::set_active(&pool, user.id, true).await.unwrap());
    let row = UserRepo::find_by_id(&pool, user.id).await.unwrap().unwrap();
    assert!(row.is_active);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_user_stats_and_role_lookup(pool: PgPool) {
    assert!(!UserRepo::exists_with_role(&pool, "admin").await.unwrap());

    let mut admin = new_user("admin@example.com");
    admin.role = "admin".to_string();
    UserRepo::create(&pool, &admin).await.unwrap();

    let member = UserRepo::create(&pool, &new_user("member@example.com"))
        .await
        .unwrap();
    UserRepo::grant_premium(&pool, member.id, None).await.unwrap();
    UserRepo::mark_verified(&pool, member.id).await.unwrap();

    let inactive = UserRepo::create(&pool, &new_user("idle@example.com"))
        .await
        .unwrap();
    UserRepo::set_active(&pool, inactive.id, false).await.unwrap();

    assert!(UserRepo::exists_with_role(&pool, "admin").await.unwrap());

    let stats = UserRepo::stats(&pool).await.unwrap();
    assert_eq!(stats.total_users, 3);
    assert_eq!(stats.verified_users, 1);
    assert_eq!(stats.premium_users, 1);
    assert_eq!(stats.active_users, 2);
    assert_eq!(stats.admin_users, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_users_paginates_newest_first(pool: PgPool) {
    for i in 0..3 {
        UserRepo::create(&pool, &new_user(&format!("user{i}@example.com")))
            .await
            .unwrap();
    }

    let first_page = UserRepo::list(&pool, 0, 2).await.unwrap();
    assert_eq!(first_page.len(), 2);

    let second_page = UserRepo::list(&pool, 2, 2).await.unwrap();
    assert_eq!(second_page.len(), 1);

    let all = UserRepo::list(&pool, 0, 10).await.unwrap();
    assert_eq!(all.len(), 3);
    for pair in all.windows(2) {
        assert!(pair[0].created_at >= pair[1].created_at);
    }
}

// ---------------------------------------------------------------------------
// Sessions
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_session_lifecycle(pool: PgPool) {
    let user = UserRepo::create(&pool, &new_user("sess@example.com"))
        .await
        .unwrap();
    let other = UserRepo::create(&pool, &new_user("other@example.com"))
        .await
        .unwrap();

    let session = SessionRepo::create(&pool, &new_session(user.id, CHROME_UA))
        .await
        .unwrap();
    assert!(session.is_active);
    assert_eq!(session.browser, "Chrome");
    assert_eq!(session.os, "Windows");
    assert_eq!(session.device, "Desktop");

    let listed = SessionRepo::list_for_user(&pool, user.id).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, session.id);

    // A session can only be deactivated by its owner.
    assert!(!SessionRepo::deactivate(&pool, session.id, other.id)
        .await
        .unwrap());
    assert!(SessionRepo::deactivate(&pool, session.id, user.id)
        .await
        .unwrap());
    // Second attempt is a no-op.
    assert!(!SessionRepo::deactivate(&pool, session.id, user.id)
        .await
        .unwrap());

    let row = SessionRepo::find_by_id(&pool, session.id)
        .await
        .unwrap()
        .unwrap();
    assert!(!row.is_active);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_deactivate_all_sessions(pool: PgPool) {
    let user = UserRepo::create(&pool, &new_user("multi@example.com"))
        .await
        .unwrap();

    SessionRepo::create(&pool, &new_session(user.id, CHROME_UA))
        .await
        .unwrap();
    SessionRepo::create(&pool, &new_session(user.id, IPHONE_UA))
        .await
        .unwrap();

    assert_eq!(
        SessionRepo::deactivate_all_for_user(&pool, user.id)
            .await
            .unwrap(),
        2
    );
    assert_eq!(
        SessionRepo::deactivate_all_for_user(&pool, user.id)
            .await
            .unwrap(),
        0
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_session_stats_cover_all_sessions(pool: PgPool) {
    let user = UserRepo::create(&pool, &new_user("stats@example.com"))
        .await
        .unwrap();

    let desktop = SessionRepo::create(&pool, &new_session(user.id, CHROME_UA))
        .await
        .unwrap();
    SessionRepo::create(&pool, &new_session(user.id, IPHONE_UA))
        .await
        .unwrap();
    SessionRepo::deactivate(&pool, desktop.id, user.id)
        .await
        .unwrap();

    let stats = SessionRepo::stats_for_user(&pool, user.id).await.unwrap();
    assert_eq!(stats.total_sessions, 2);
    assert_eq!(stats.active_sessions, 1);
    assert_eq!(stats.inactive_sessions, 1);
    assert_eq!(stats.sessions_by_device.get("Desktop"), Some(&1));
    assert_eq!(stats.sessions_by_device.get("Mobile"), Some(&1));
    assert_eq!(stats.sessions_by_browser.get("Chrome"), Some(&1));
    assert_eq!(stats.sessions_by_browser.get("Safari"), Some(&1));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_touch_and_idle_cutoff(pool: PgPool) {
    let user = UserRepo::create(&pool, &new_user("touch@example.com"))
        .await
        .unwrap();
    let session = SessionRepo::create(&pool, &new_session(user.id, CHROME_UA))
        .await
        .unwrap();

    SessionRepo::touch(&pool, session.id).await.unwrap();
    let touched = SessionRepo::find_by_id(&pool, session.id)
        .await
        .unwrap()
        .unwrap();
    assert!(touched.last_activity >= session.last_activity);

    // A cutoff in the past deactivates nothing.
    let past = Utc::now() - Duration::days(30);
    assert_eq!(
        SessionRepo::deactivate_idle_since(&pool, past).await.unwrap(),
        0
    );

    // A future cutoff catches the idle session.
    let future = Utc::now() + Duration::minutes(1);
    assert_eq!(
        SessionRepo::deactivate_idle_since(&pool, future)
            .await
            .unwrap(),
        1
    );
}

// ---------------------------------------------------------------------------
// Token pairs
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_token_rotation_and_cleanup(pool: PgPool) {
    let user = UserRepo::create(&pool, &new_user("tokens@example.com"))
        .await
        .unwrap();
    let session = SessionRepo::create(&pool, &new_session(user.id, CHROME_UA))
        .await
        .unwrap();

    let first = AuthTokenRepo::create(&pool, &new_token_pair(user.id, session.id))
        .await
        .unwrap();
    assert!(first.is_active);

    // Rotation: old pair goes inactive, replacement is inserted.
    assert_eq!(
        AuthTokenRepo::deactivate_for_session(&pool, session.id)
            .await
            .unwrap(),
        1
    );
    AuthTokenRepo::create(&pool, &new_token_pair(user.id, session.id))
        .await
        .unwrap();

    assert_eq!(
        AuthTokenRepo::deactivate_all_for_user(&pool, user.id)
            .await
            .unwrap(),
        1
    );

    // Both rows are gone once the cutoff passes their issue time.
    let cutoff = Utc::now() + Duration::seconds(1);
    assert_eq!(
        AuthTokenRepo::delete_issued_before(&pool, cutoff)
            .await
            .unwrap(),
        2
    );
}
