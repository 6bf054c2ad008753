//! HTTP-level integration tests for the signup, verification, sign-in,
//! refresh, and password recovery flows.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, get_auth, post_json, post_json_auth, seed_user, signin, signin_token, TEST_PASSWORD,
};
use sqlx::PgPool;
use tessera_db::repositories::{AuthTokenRepo, SessionRepo, UserRepo};

// ---------------------------------------------------------------------------
// Signup and verification
// ---------------------------------------------------------------------------

/// Signup creates an unverified account with a stored verification token.
#[sqlx::test(migrations = "../../db/migrations")]
async fn signup_creates_unverified_account(pool: PgPool) {
    let app = common::build_test_app(pool.clone());

    let body = serde_json::json!({
        "email": "newcomer@example.com",
        "password": "Str0ng!pass",
        "first_name": "Ada",
        "last_name": "Lovelace",
    });
    let response = post_json(app, "/api/v1/auth/signup", body).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(
        json["message"],
        "User created successfully. Please check your email for verification."
    );

    let user = UserRepo::find_by_email(&pool, "newcomer@example.com")
        .await
        .unwrap()
        .expect("account should exist");
    assert!(!user.is_verified);
    assert_eq!(user.role, "user");
    assert!(user.verification_token.is_some());
}

/// A duplicate email is rejected with 409.
#[sqlx::test(migrations = "../../db/migrations")]
async fn signup_duplicate_email_conflicts(pool: PgPool) {
    seed_user(&pool, "taken@example.com", "user").await;
    let app = common::build_test_app(pool);

    let body = serde_json::json!({
        "email": "taken@example.com",
        "password": "Str0ng!pass",
        "first_name": "Ada",
        "last_name": "Lovelace",
    });
    let response = post_json(app, "/api/v1/auth/signup", body).await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Email already registered");
}

/// Weak passwords and malformed emails are rejected with 400.
#[sqlx::test(migrations = "../../db/migrations")]
async fn signup_validates_input(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let body = serde_json::json!({
        "email": "not-an-email",
        "password": "Str0ng!pass",
        "first_name": "Ada",
        "last_name": "Lovelace",
    });
    let response = post_json(app, "/api/v1/auth/signup", body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let app = common::build_test_app(pool);
    let body = serde_json::json!({
        "email": "ada@example.com",
        "password": "short",
        "first_name": "Ada",
        "last_name": "Lovelace",
    });
    let response = post_json(app, "/api/v1/auth/signup", body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

/// The full journey: signup, fail to sign in, verify, sign in.
#[sqlx::test(migrations = "../../db/migrations")]
async fn signup_verify_signin_flow(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let body = serde_json::json!({
        "email": "journey@example.com",
        "password": "Str0ng!pass",
        "first_name": "Grace",
        "last_name": "Hopper",
    });
    let response = post_json(app, "/api/v1/auth/signup", body).await;
    assert_eq!(response.status(), StatusCode::OK);

    // Unverified accounts cannot sign in.
    let app = common::build_test_app(pool.clone());
    let body = serde_json::json!({ "email": "journey@example.com", "password": "Str0ng!pass" });
    let response = post_json(app, "/api/v1/auth/signin", body).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(
        json["error"],
        "Email not verified. Please check your email for verification link."
    );

    // Consume the stored verification token.
    let user = UserRepo::find_by_email(&pool, "journey@example.com")
        .await
        .unwrap()
        .unwrap();
    let token = user.verification_token.expect("token should be stored");

    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        "/api/v1/auth/verify-email",
        serde_json::json!({ "token": token }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Email verified successfully");

    // Now sign-in succeeds and returns a token pair.
    let app = common::build_test_app(pool);
    let body = serde_json::json!({ "email": "journey@example.com", "password": "Str0ng!pass" });
    let response = post_json(app, "/api/v1/auth/signin", body).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(json["access_token"].is_string());
    assert!(json["refresh_token"].is_string());
    assert_eq!(json["user"]["email"], "journey@example.com");
}

/// A garbage verification token is rejected with 400.
#[sqlx::test(migrations = "../../db/migrations")]
async fn verify_email_rejects_bad_token(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/auth/verify-email",
        serde_json::json!({ "token": "not.a.jwt" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Invalid verification token");
}

/// Resending verification to an already-verified account returns 400.
#[sqlx::test(migrations = "../../db/migrations")]
async fn resend_verification_rejects_verified_account(pool: PgPool) {
    seed_user(&pool, "settled@example.com", "user").await;
    let app = common::build_test_app(pool);

    let response = post_json(
        app,
        "/api/v1/auth/resend-verification",
        serde_json::json!({ "email": "settled@example.com" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Email already verified");
}

// ---------------------------------------------------------------------------
// Sign-in
// ---------------------------------------------------------------------------

/// Successful sign-in returns tokens, user info, and sets the auth cookies.
#[sqlx::test(migrations = "../../db/migrations")]
async fn signin_success(pool: PgPool) {
    let user = seed_user(&pool, "signer@example.com", "user").await;
    let app = common::build_test_app(pool.clone());

    let body = serde_json::json!({ "email": "signer@example.com", "password": TEST_PASSWORD });
    let response = post_json(app, "/api/v1/auth/signin", body).await;
    assert_eq!(response.status(), StatusCode::OK);

    // Both auth cookies are set.
    let cookies: Vec<_> = response
        .headers()
        .get_all("set-cookie")
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect();
    assert!(cookies.iter().any(|c| c.starts_with("access_token=")));
    assert!(cookies.iter().any(|c| c.starts_with("refresh_token=")));

    let json = body_json(response).await;
    assert_eq!(json["token_type"], "bearer");
    assert_eq!(json["expires_in"], 30 * 60);
    assert_eq!(json["user"]["id"], user.id);
    assert_eq!(json["user"]["is_premium"], false);

    // A session and a token pair were registered.
    let sessions = SessionRepo::list_for_user(&pool, user.id).await.unwrap();
    assert_eq!(sessions.len(), 1);
    assert!(sessions[0].is_active);

    // The login time was recorded.
    let row = UserRepo::find_by_id(&pool, user.id).await.unwrap().unwrap();
    assert!(row.last_login_at.is_some());
}

/// Wrong password and unknown email produce the same 401.
#[sqlx::test(migrations = "../../db/migrations")]
async fn signin_rejects_bad_credentials(pool: PgPool) {
    seed_user(&pool, "victim@example.com", "user").await;

    let app = common::build_test_app(pool.clone());
    let body = serde_json::json!({ "email": "victim@example.com", "password": "wrong" });
    let response = post_json(app, "/api/v1/auth/signin", body).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let wrong_pw = body_json(response).await;

    let app = common::build_test_app(pool);
    let body = serde_json::json!({ "email": "ghost@example.com", "password": "wrong" });
    let response = post_json(app, "/api/v1/auth/signin", body).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let unknown = body_json(response).await;

    // Identical bodies, so accounts cannot be enumerated.
    assert_eq!(wrong_pw, unknown);
    assert_eq!(wrong_pw["error"], "Invalid email or password");
}

/// A deactivated account cannot sign in.
#[sqlx::test(migrations = "../../db/migrations")]
async fn signin_rejects_deactivated_account(pool: PgPool) {
    let user = seed_user(&pool, "disabled@example.com", "user").await;
    UserRepo::set_active(&pool, user.id, false).await.unwrap();

    let app = common::build_test_app(pool);
    let body = serde_json::json!({ "email": "disabled@example.com", "password": TEST_PASSWORD });
    let response = post_json(app, "/api/v1/auth/signin", body).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Account is deactivated");
}

// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

/// GET /auth/details returns the caller's profile.
#[sqlx::test(migrations = "../../db/migrations")]
async fn details_returns_profile(pool: PgPool) {
    let user = seed_user(&pool, "me@example.com", "user").await;
    let token = signin_token(common::build_test_app(pool.clone()), "me@example.com").await;

    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/auth/details", &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["id"], user.id);
    assert_eq!(json["email"], "me@example.com");
    assert_eq!(json["first_name"], "Test");
    // The password hash and token columns must never appear.
    assert!(json.get("password_hash").is_none());
    assert!(json.get("verification_token").is_none());
}

/// Requests without a token are rejected with 401.
#[sqlx::test(migrations = "../../db/migrations")]
async fn details_requires_authentication(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = common::get(app, "/api/v1/auth/details").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Not authenticated");
}

/// A syntactically broken token is rejected with 401.
#[sqlx::test(migrations = "../../db/migrations")]
async fn details_rejects_garbage_token(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/auth/details", "garbage.token.here").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Invalid access token");
}

// ---------------------------------------------------------------------------
// Refresh rotation
// ---------------------------------------------------------------------------

/// A valid refresh token from the body yields a fresh pair and retires the
/// old one.
#[sqlx::test(migrations = "../../db/migrations")]
async fn refresh_rotates_token_pair(pool: PgPool) {
    seed_user(&pool, "rotator@example.com", "user").await;
    let login = signin(common::build_test_app(pool.clone()), "rotator@example.com").await;
    let old_refresh = login["refresh_token"].as_str().unwrap().to_string();

    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        "/api/v1/auth/refresh-token",
        serde_json::json!({ "refresh_token": old_refresh.clone() }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let new_refresh = json["refresh_token"].as_str().unwrap();
    assert_ne!(new_refresh, old_refresh);
    assert!(json["access_token"].is_string());

    // The retired token is no longer accepted.
    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/auth/refresh-token",
        serde_json::json!({ "refresh_token": old_refresh }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Invalid refresh token");
}

/// Refresh without any token returns 401.
#[sqlx::test(migrations = "../../db/migrations")]
async fn refresh_requires_a_token(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = common::post_json(app, "/api/v1/auth/refresh-token", serde_json::json!({})).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Invalid refresh token");
}

/// An access token is not accepted where a refresh token is expected.
#[sqlx::test(migrations = "../../db/migrations")]
async fn refresh_rejects_access_token(pool: PgPool) {
    seed_user(&pool, "mixed@example.com", "user").await;
    let login = signin(common::build_test_app(pool.clone()), "mixed@example.com").await;
    let access_token = login["access_token"].as_str().unwrap();

    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/auth/refresh-token",
        serde_json::json!({ "refresh_token": access_token }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Logout
// ---------------------------------------------------------------------------

/// Logout deactivates every session and token pair and clears the cookies.
#[sqlx::test(migrations = "../../db/migrations")]
async fn logout_revokes_everything(pool: PgPool) {
    let user = seed_user(&pool, "leaver@example.com", "user").await;
    let login = signin(common::build_test_app(pool.clone()), "leaver@example.com").await;
    let token = login["access_token"].as_str().unwrap();
    let refresh = login["refresh_token"].as_str().unwrap().to_string();

    let app = common::build_test_app(pool.clone());
    let response = common::post_auth(app, "/api/v1/auth/logout", token).await;
    assert_eq!(response.status(), StatusCode::OK);

    // Cookies are expired.
    let cookies: Vec<_> = response
        .headers()
        .get_all("set-cookie")
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect();
    assert!(cookies.iter().any(|c| c.contains("Max-Age=0")));

    let json = body_json(response).await;
    assert_eq!(json["message"], "Logged out successfully");

    // Sessions are inactive and the refresh token no longer rotates.
    let sessions = SessionRepo::list_for_user(&pool, user.id).await.unwrap();
    assert!(sessions.iter().all(|s| !s.is_active));
    assert!(
        AuthTokenRepo::find_active_by_refresh_token(&pool, &refresh)
            .await
            .unwrap()
            .is_none()
    );

    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/auth/refresh-token",
        serde_json::json!({ "refresh_token": refresh }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Password recovery
// ---------------------------------------------------------------------------

/// The forgot endpoint answers identically for known and unknown emails.
#[sqlx::test(migrations = "../../db/migrations")]
async fn forgot_password_does_not_leak_accounts(pool: PgPool) {
    seed_user(&pool, "known@example.com", "user").await;

    let app = common::build_test_app(pool.clone());
    let known = post_json(
        app,
        "/api/v1/auth/forgot",
        serde_json::json!({ "email": "known@example.com" }),
    )
    .await;
    assert_eq!(known.status(), StatusCode::OK);
    let known = body_json(known).await;

    let app = common::build_test_app(pool.clone());
    let unknown = post_json(
        app,
        "/api/v1/auth/forgot",
        serde_json::json!({ "email": "ghost@example.com" }),
    )
    .await;
    assert_eq!(unknown.status(), StatusCode::OK);
    let unknown = body_json(unknown).await;

    assert_eq!(known, unknown);

    // But only the real account got a reset token.
    let user = UserRepo::find_by_email(&pool, "known@example.com")
        .await
        .unwrap()
        .unwrap();
    assert!(user.reset_token.is_some());
}

/// Consuming a reset token changes the password and revokes all sessions.
#[sqlx::test(migrations = "../../db/migrations")]
async fn reset_password_flow(pool: PgPool) {
    let user = seed_user(&pool, "resetter@example.com", "user").await;
    signin(common::build_test_app(pool.clone()), "resetter@example.com").await;

    let app = common::build_test_app(pool.clone());
    post_json(
        app,
        "/api/v1/auth/forgot",
        serde_json::json!({ "email": "resetter@example.com" }),
    )
    .await;

    let token = UserRepo::find_by_email(&pool, "resetter@example.com")
        .await
        .unwrap()
        .unwrap()
        .reset_token
        .expect("reset token should be stored");

    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        "/api/v1/auth/reset-password",
        serde_json::json!({ "token": token.clone(), "new_password": "Fresh!pass1" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Password reset successfully");

    // Every session was revoked.
    let sessions = SessionRepo::list_for_user(&pool, user.id).await.unwrap();
    assert!(sessions.iter().all(|s| !s.is_active));

    // The old password no longer works; the new one does.
    let app = common::build_test_app(pool.clone());
    let body = serde_json::json!({ "email": "resetter@example.com", "password": TEST_PASSWORD });
    let response = post_json(app, "/api/v1/auth/signin", body).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let app = common::build_test_app(pool.clone());
    let body = serde_json::json!({ "email": "resetter@example.com", "password": "Fresh!pass1" });
    let response = post_json(app, "/api/v1/auth/signin", body).await;
    assert_eq!(response.status(), StatusCode::OK);

    // The token was single-use.
    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/auth/reset-password",
        serde_json::json!({ "token": token, "new_password": "Another!pass1" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Invalid reset token");
}

// ---------------------------------------------------------------------------
// Cookie-based authentication
// ---------------------------------------------------------------------------

/// The access cookie set at sign-in authenticates requests on its own.
#[sqlx::test(migrations = "../../db/migrations")]
async fn access_cookie_authenticates(pool: PgPool) {
    seed_user(&pool, "cookiejar@example.com", "user").await;

    let app = common::build_test_app(pool.clone());
    let body = serde_json::json!({ "email": "cookiejar@example.com", "password": TEST_PASSWORD });
    let response = post_json(app, "/api/v1/auth/signin", body).await;
    assert_eq!(response.status(), StatusCode::OK);

    let access_cookie = response
        .headers()
        .get_all("set-cookie")
        .iter()
        .map(|v| v.to_str().unwrap())
        .find(|c| c.starts_with("access_token="))
        .expect("access cookie should be set")
        .split(';')
        .next()
        .unwrap()
        .to_string();

    let app = common::build_test_app(pool);
    let request = axum::http::Request::builder()
        .method(axum::http::Method::GET)
        .uri("/api/v1/auth/details")
        .header("cookie", access_cookie)
        .body(axum::body::Body::empty())
        .unwrap();
    let response = tower::ServiceExt::oneshot(app, request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["email"], "cookiejar@example.com");
}
