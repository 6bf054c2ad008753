//! Handlers for the `/auth` resource (signup, email verification, sign-in,
//! token refresh, password recovery, logout).

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use tessera_core::error::CoreError;
use tessera_core::roles::ROLE_USER;
use tessera_core::types::DbId;
use tessera_core::validation::{validate_email, validate_name, validate_password};
use tessera_db::models::auth_token::CreateAuthToken;
use tessera_db::models::session::CreateSession;
use tessera_db::models::user::{CreateUser, User, UserResponse};
use tessera_db::repositories::{AuthTokenRepo, SessionRepo, UserRepo};

use crate::auth::jwt::{
    generate_access_token, generate_refresh_token, generate_reset_token,
    generate_verification_token, validate_email_token, validate_refresh_token, TokenKind,
    RESET_EXPIRY_HOURS, VERIFICATION_EXPIRY_HOURS,
};
use crate::auth::password::{hash_password, verify_password};
use crate::cookies;
use crate::email::{spawn_password_reset_email, spawn_verification_email};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::CurrentUser;
use crate::response::MessageResponse;
use crate::state::AppState;

use super::utils::{client_ip, user_agent};

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/signup`.
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

/// Request body for `POST /auth/signin`.
#[derive(Debug, Deserialize)]
pub struct SigninRequest {
    pub email: String,
    pub password: String,
}

/// Request body for `POST /auth/verify-email`.
#[derive(Debug, Deserialize)]
pub struct VerifyEmailRequest {
    pub token: String,
}

/// Request body for `POST /auth/resend-verification`.
#[derive(Debug, Deserialize)]
pub struct ResendVerificationRequest {
    pub email: String,
}

/// Request body for `POST /auth/forgot`.
#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

/// Request body for `POST /auth/reset-password`.
#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub new_password: String,
}

/// Request body for `POST /auth/refresh-token`.
///
/// The body is optional; clients relying on the refresh cookie may omit it.
#[derive(Debug, Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: Option<String>,
}

/// Successful authentication response returned by signin and refresh.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Always `"bearer"`.
    pub token_type: &'static str,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub user: UserResponse,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/signup
///
/// Create an account and send a verification email. The account stays
/// unverified (and unable to sign in) until the emailed token is consumed.
pub async fn signup(
    State(state): State<AppState>,
    Json(input): Json<SignupRequest>,
) -> AppResult<Json<MessageResponse>> {
    // 1. Validate input fields.
    validate_email(&input.email)?;
    validate_password(&input.password)?;
    validate_name("First name", &input.first_name)?;
    validate_name("Last name", &input.last_name)?;

    // 2. Reject duplicate email addresses.
    if UserRepo::find_by_email(&state.pool, &input.email)
        .await?
        .is_some()
    {
        return Err(AppError::Core(CoreError::Conflict(
            "Email already registered".into(),
        )));
    }

    // 3. Hash the password off the async runtime.
    let password_hash = hash_password(input.password).await?;

    // 4. Create the user with the non-privileged role.
    let new_user = CreateUser {
        email: input.email,
        password_hash,
        first_name: input.first_name,
        last_name: input.last_name,
        role: ROLE_USER.to_string(),
    };
    let user = UserRepo::create(&state.pool, &new_user).await?;

    // 5. Issue and store a verification token, then deliver it in the
    //    background so delivery failures never fail the signup.
    let token = generate_verification_token(&user.email, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;
    let expires_at = Utc::now() + Duration::hours(VERIFICATION_EXPIRY_HOURS);
    UserRepo::set_verification_token(&state.pool, user.id, &token, expires_at).await?;

    spawn_verification_email(&state.mailer, &user.email, &token);

    Ok(Json(MessageResponse::new(
        "User created successfully. Please check your email for verification.",
    )))
}

/// POST /api/v1/auth/signin
///
/// Authenticate with email + password. Creates a session, returns a token
/// pair, and also sets the tokens as HttpOnly cookies.
pub async fn signin(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<SigninRequest>,
) -> AppResult<(HeaderMap, Json<AuthResponse>)> {
    // 1. Find user by email and verify the password. Both failure modes
    //    produce the same response so emails cannot be enumerated.
    let user = UserRepo::find_by_email(&state.pool, &input.email)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized("Invalid email or password".into()))
        })?;

    let password_valid = verify_password(input.password, user.password_hash.clone()).await?;
    if !password_valid {
        return Err(AppError::Core(CoreError::Unauthorized(
            "Invalid email or password".into(),
        )));
    }

    // 2. Deactivated accounts cannot sign in.
    if !user.is_active {
        return Err(AppError::Core(CoreError::Unauthorized(
            "Account is deactivated".into(),
        )));
    }

    // 3. Unverified accounts cannot sign in.
    if !user.is_verified {
        return Err(AppError::Core(CoreError::Unauthorized(
            "Email not verified. Please check your email for verification link.".into(),
        )));
    }

    // 4. Record the login time.
    UserRepo::record_login(&state.pool, user.id).await?;

    // 5. Create a session from the request's device fingerprint and mint
    //    the token pair.
    let response = create_auth_response(&state, &user, &headers).await?;

    let cookie_headers = auth_cookie_headers(&state, &response)?;
    Ok((cookie_headers, Json(response)))
}

/// POST /api/v1/auth/verify-email
///
/// Consume an emailed verification token and mark the account verified.
pub async fn verify_email(
    State(state): State<AppState>,
    Json(input): Json<VerifyEmailRequest>,
) -> AppResult<Json<MessageResponse>> {
    // 1. Decode the token; it embeds the email it was issued for.
    let email = validate_email_token(&input.token, TokenKind::Verification, &state.config.jwt)
        .ok_or_else(|| AppError::BadRequest("Invalid verification token".into()))?;

    // 2. Find the user it belongs to.
    let user = UserRepo::find_by_email(&state.pool, &email)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound("User")))?;

    if user.is_verified {
        return Err(AppError::BadRequest("Email already verified".into()));
    }

    // 3. Flip the flag and clear the stored token.
    UserRepo::mark_verified(&state.pool, user.id).await?;

    Ok(Json(MessageResponse::new("Email verified successfully")))
}

/// POST /api/v1/auth/resend-verification
///
/// Issue a fresh verification token for an unverified account.
pub async fn resend_verification(
    State(state): State<AppState>,
    Json(input): Json<ResendVerificationRequest>,
) -> AppResult<Json<MessageResponse>> {
    let user = UserRepo::find_by_email(&state.pool, &input.email)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound("User")))?;

    if user.is_verified {
        return Err(AppError::BadRequest("Email already verified".into()));
    }

    let token = generate_verification_token(&user.email, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;
    let expires_at = Utc::now() + Duration::hours(VERIFICATION_EXPIRY_HOURS);
    UserRepo::set_verification_token(&state.pool, user.id, &token, expires_at).await?;

    spawn_verification_email(&state.mailer, &user.email, &token);

    Ok(Json(MessageResponse::new(
        "Verification email sent successfully",
    )))
}

/// POST /api/v1/auth/forgot
///
/// Start the password recovery flow. Responds identically whether or not
/// the email exists so accounts cannot be enumerated.
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(input): Json<ForgotPasswordRequest>,
) -> AppResult<Json<MessageResponse>> {
    if let Some(user) = UserRepo::find_by_email(&state.pool, &input.email).await? {
        let token = generate_reset_token(&user.email, &state.config.jwt)
            .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;
        let expires_at = Utc::now() + Duration::hours(RESET_EXPIRY_HOURS);
        UserRepo::set_reset_token(&state.pool, user.id, &token, expires_at).await?;

        spawn_password_reset_email(&state.mailer, &user.email, &token);
    }

    Ok(Json(MessageResponse::new(
        "If the email exists, a password reset link has been sent",
    )))
}

/// POST /api/v1/auth/reset-password
///
/// Consume a reset token and set a new password. Revokes every session and
/// token pair for the account, so existing devices must sign in again.
pub async fn reset_password(
    State(state): State<AppState>,
    Json(input): Json<ResetPasswordRequest>,
) -> AppResult<Json<MessageResponse>> {
    // 1. Decode the token and find the account it was issued for.
    let email = validate_email_token(&input.token, TokenKind::Reset, &state.config.jwt)
        .ok_or_else(|| AppError::BadRequest("Invalid reset token".into()))?;

    let user = UserRepo::find_by_email(&state.pool, &email)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound("User")))?;

    // 2. The token must match the stored one. Resetting clears it, which
    //    makes each token single-use.
    if user.reset_token.as_deref() != Some(input.token.as_str()) {
        return Err(AppError::BadRequest("Invalid reset token".into()));
    }

    // 3. Validate and store the new password.
    validate_password(&input.new_password)?;
    let password_hash = hash_password(input.new_password).await?;
    UserRepo::update_password(&state.pool, user.id, &password_hash).await?;

    // 4. Revoke all sessions and token pairs for the account.
    SessionRepo::deactivate_all_for_user(&state.pool, user.id).await?;
    AuthTokenRepo::deactivate_all_for_user(&state.pool, user.id).await?;

    Ok(Json(MessageResponse::new("Password reset successfully")))
}

/// POST /api/v1/auth/refresh-token
///
/// Exchange a valid refresh token for a new token pair. The token is read
/// from the refresh cookie first, then from the request body.
pub async fn refresh_token(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Option<Json<RefreshTokenRequest>>,
) -> AppResult<(HeaderMap, Json<AuthResponse>)> {
    // 1. Locate the refresh token.
    let provided = cookies::extract_cookie(&headers, cookies::REFRESH_COOKIE)
        .or_else(|| body.and_then(|Json(input)| input.refresh_token))
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("Invalid refresh token".into())))?;

    // 2. Check signature, expiry, and token type.
    let claims = validate_refresh_token(&provided, &state.config.jwt)
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("Invalid refresh token".into())))?;

    // 3. The stored pair must still be active. Logout and session revocation
    //    deactivate pairs, which blocks rotation even for well-signed tokens.
    let token_row = AuthTokenRepo::find_active_by_refresh_token(&state.pool, &provided)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("Invalid refresh token".into())))?;

    // 4. Re-read the user so the new claims carry the current role.
    let user = UserRepo::find_by_id(&state.pool, claims.user_id)
        .await?
        .filter(|u| u.is_active)
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized("User not found or inactive".into()))
        })?;

    // 5. Rotate: retire the old pair, issue a new one on the same session.
    AuthTokenRepo::deactivate_for_session(&state.pool, token_row.session_id).await?;
    let response = issue_token_pair(&state, &user, token_row.session_id).await?;
    SessionRepo::touch(&state.pool, token_row.session_id).await?;

    let cookie_headers = auth_cookie_headers(&state, &response)?;
    Ok((cookie_headers, Json(response)))
}

/// GET /api/v1/auth/details
///
/// Profile of the authenticated user.
pub async fn details(current: CurrentUser) -> Json<UserResponse> {
    Json(UserResponse::from(&current.user))
}

/// POST /api/v1/auth/logout
///
/// Deactivate every session and token pair for the user and clear the auth
/// cookies.
pub async fn logout(
    State(state): State<AppState>,
    current: CurrentUser,
) -> AppResult<(HeaderMap, Json<MessageResponse>)> {
    SessionRepo::deactivate_all_for_user(&state.pool, current.user.id).await?;
    AuthTokenRepo::deactivate_all_for_user(&state.pool, current.user.id).await?;

    let cookie_headers = clear_cookie_headers(&state)?;
    Ok((
        cookie_headers,
        Json(MessageResponse::new("Logged out successfully")),
    ))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Create a session from the request headers, then mint a token pair on it.
async fn create_auth_response(
    state: &AppState,
    user: &User,
    headers: &HeaderMap,
) -> AppResult<AuthResponse> {
    let device = state.classifier.classify(user_agent(headers));

    let session_input = CreateSession {
        user_id: user.id,
        device,
        ip_address: client_ip(headers),
    };
    let session = SessionRepo::create(&state.pool, &session_input).await?;

    issue_token_pair(state, user, session.id).await
}

/// Generate an access + refresh token pair, persist it against the session,
/// and build the response body.
async fn issue_token_pair(
    state: &AppState,
    user: &User,
    session_id: DbId,
) -> AppResult<AuthResponse> {
    let access_token = generate_access_token(user.id, &user.role, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;
    let refresh_token = generate_refresh_token(user.id, &user.role, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    let expires_at = Utc::now() + Duration::minutes(state.config.jwt.access_token_expiry_mins);

    let token_input = CreateAuthToken {
        user_id: user.id,
        session_id,
        access_token: access_token.clone(),
        refresh_token: refresh_token.clone(),
        expires_at,
    };
    AuthTokenRepo::create(&state.pool, &token_input).await?;

    Ok(AuthResponse {
        access_token,
        refresh_token,
        token_type: "bearer",
        expires_in: state.config.jwt.access_token_expiry_mins * 60,
        user: UserResponse::from(user),
    })
}

/// Headers that set both auth cookies from a freshly minted pair.
fn auth_cookie_headers(state: &AppState, response: &AuthResponse) -> AppResult<HeaderMap> {
    let mut headers = HeaderMap::new();
    cookies::set_auth_cookies(
        &mut headers,
        &response.access_token,
        &response.refresh_token,
        &state.config.jwt,
        &state.config.cookies,
    )
    .map_err(|e| AppError::InternalError(format!("Cookie encoding error: {e}")))?;
    Ok(headers)
}

/// Headers that expire both auth cookies.
fn clear_cookie_headers(state: &AppState) -> AppResult<HeaderMap> {
    let mut headers = HeaderMap::new();
    cookies::clear_auth_cookies(&mut headers, &state.config.cookies)
        .map_err(|e| AppError::InternalError(format!("Cookie encoding error: {e}")))?;
    Ok(headers)
}
