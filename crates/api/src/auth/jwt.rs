//! JWT issuance and validation for access, refresh, and email-flow tokens.
//!
//! Access and refresh tokens are HS256-signed JWTs carrying a [`Claims`]
//! payload and are signed with two distinct secrets so that one kind can
//! never be replayed as the other. Email verification and password reset
//! tokens carry an [`EmailClaims`] payload and are signed with the access
//! secret. Every payload embeds a `type` discriminator; the `validate_*`
//! functions check it and fail closed, returning `None` on any signature,
//! expiry, or kind mismatch.

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tessera_core::types::DbId;

/// Discriminator embedded in every token payload as the `type` claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
    Verification,
    Reset,
}

/// Claims embedded in access and refresh tokens.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// The user's internal database id.
    pub user_id: DbId,
    /// Role name captured at issue time. Authorization decisions re-read the
    /// user row; this claim only routes the request to the right checks.
    pub role: String,
    /// Token kind discriminator.
    #[serde(rename = "type")]
    pub kind: TokenKind,
    /// Issued-at time (UTC Unix timestamp).
    pub iat: i64,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
}

/// Claims embedded in email verification and password reset tokens.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct EmailClaims {
    /// The email address the token was issued for.
    pub email: String,
    /// Token kind discriminator ([`TokenKind::Verification`] or [`TokenKind::Reset`]).
    #[serde(rename = "type")]
    pub kind: TokenKind,
    /// Issued-at time (UTC Unix timestamp).
    pub iat: i64,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
}

/// Configuration for JWT token generation and validation.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HMAC-SHA256 secret for access, verification, and reset tokens.
    pub access_secret: String,
    /// HMAC-SHA256 secret for refresh tokens. Must differ from
    /// `access_secret` so the two kinds are not interchangeable.
    pub refresh_secret: String,
    /// Access token lifetime in minutes (default: 30).
    pub access_token_expiry_mins: i64,
    /// Refresh token lifetime in days (default: 7).
    pub refresh_token_expiry_days: i64,
}

/// Default access token expiry in minutes.
const DEFAULT_ACCESS_EXPIRY_MINS: i64 = 30;
/// Default refresh token expiry in days.
const DEFAULT_REFRESH_EXPIRY_DAYS: i64 = 7;
/// Email verification token lifetime in hours.
pub const VERIFICATION_EXPIRY_HOURS: i64 = 24;
/// Password reset token lifetime in hours.
pub const RESET_EXPIRY_HOURS: i64 = 1;

impl JwtConfig {
    /// Load JWT configuration from environment variables.
    ///
    /// | Env Var                      | Required | Default |
    /// |------------------------------|----------|---------|
    /// | `JWT_SECRET_KEY`             | **yes**  | --      |
    /// | `JWT_REFRESH_SECRET_KEY`     | **yes**  | --      |
    /// | `ACCESS_TOKEN_EXPIRE_MINUTES`| no       | `30`    |
    /// | `REFRESH_TOKEN_EXPIRE_DAYS`  | no       | `7`     |
    ///
    /// # Panics
    ///
    /// Panics if either secret is not set, is empty, or the two are equal.
    pub fn from_env() -> Self {
        let access_secret = std::env::var("JWT_SECRET_KEY")
            .expect("JWT_SECRET_KEY must be set in the environment");
        assert!(!access_secret.is_empty(), "JWT_SECRET_KEY must not be empty");

        let refresh_secret = std::env::var("JWT_REFRESH_SECRET_KEY")
            .expect("JWT_REFRESH_SECRET_KEY must be set in the environment");
        assert!(
            !refresh_secret.is_empty(),
            "JWT_REFRESH_SECRET_KEY must not be empty"
        );
        assert!(
            access_secret != refresh_secret,
            "JWT_SECRET_KEY and JWT_REFRESH_SECRET_KEY must differ"
        );

        let access_token_expiry_mins: i64 = std::env::var("ACCESS_TOKEN_EXPIRE_MINUTES")
            .unwrap_or_else(|_| DEFAULT_ACCESS_EXPIRY_MINS.to_string())
            .parse()
            .expect("ACCESS_TOKEN_EXPIRE_MINUTES must be a valid i64");

        let refresh_token_expiry_days: i64 = std::env::var("REFRESH_TOKEN_EXPIRE_DAYS")
            .unwrap_or_else(|_| DEFAULT_REFRESH_EXPIRY_DAYS.to_string())
            .parse()
            .expect("REFRESH_TOKEN_EXPIRE_DAYS must be a valid i64");

        Self {
            access_secret,
            refresh_secret,
            access_token_expiry_mins,
            refresh_token_expiry_days,
        }
    }
}

/// Generate an HS256 access token for the given user.
pub fn generate_access_token(
    user_id: DbId,
    role: &str,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        user_id,
        role: role.to_string(),
        kind: TokenKind::Access,
        iat: now,
        exp: now + config.access_token_expiry_mins * 60,
    };

    encode(
        &Header::default(), // HS256
        &claims,
        &EncodingKey::from_secret(config.access_secret.as_bytes()),
    )
}

/// Generate an HS256 refresh token for the given user, signed with the
/// refresh secret.
pub fn generate_refresh_token(
    user_id: DbId,
    role: &str,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        user_id,
        role: role.to_string(),
        kind: TokenKind::Refresh,
        iat: now,
        exp: now + config.refresh_token_expiry_days * 24 * 3600,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.refresh_secret.as_bytes()),
    )
}

/// Validate an access token, returning its [`Claims`] or `None`.
///
/// Fails closed: a bad signature, a malformed or expired payload, or a
/// non-access `type` claim all yield `None`.
pub fn validate_access_token(token: &str, config: &JwtConfig) -> Option<Claims> {
    let decoded = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.access_secret.as_bytes()),
        &Validation::default(), // HS256, validates exp
    )
    .ok()?;

    if decoded.claims.kind != TokenKind::Access {
        return None;
    }
    Some(decoded.claims)
}

/// Validate a refresh token against the refresh secret, returning its
/// [`Claims`] or `None`. Fails closed like [`validate_access_token`].
pub fn validate_refresh_token(token: &str, config: &JwtConfig) -> Option<Claims> {
    let decoded = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.refresh_secret.as_bytes()),
        &Validation::default(),
    )
    .ok()?;

    if decoded.claims.kind != TokenKind::Refresh {
        return None;
    }
    Some(decoded.claims)
}

/// Generate an email verification token (24 h lifetime, access secret).
pub fn generate_verification_token(
    email: &str,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    generate_email_token(email, TokenKind::Verification, VERIFICATION_EXPIRY_HOURS, config)
}

/// Generate a password reset token (1 h lifetime, access secret).
pub fn generate_reset_token(
    email: &str,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    generate_email_token(email, TokenKind::Reset, RESET_EXPIRY_HOURS, config)
}

fn generate_email_token(
    email: &str,
    kind: TokenKind,
    expiry_hours: i64,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now().timestamp();
    let claims = EmailClaims {
        email: email.to_string(),
        kind,
        iat: now,
        exp: now + expiry_hours * 3600,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.access_secret.as_bytes()),
    )
}

/// Validate an email-flow token of the expected kind, returning the embedded
/// email address or `None`.
///
/// A verification token never validates as a reset token and vice versa.
pub fn validate_email_token(
    token: &str,
    expected: TokenKind,
    config: &JwtConfig,
) -> Option<String> {
    let decoded = decode::<EmailClaims>(
        token,
        &DecodingKey::from_secret(config.access_secret.as_bytes()),
        &Validation::default(),
    )
    .ok()?;

    if decoded.claims.kind != expected {
        return None;
    }
    Some(decoded.claims.email)
}
