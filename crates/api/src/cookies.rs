//! HttpOnly auth cookie construction and extraction.
//!
//! Access and refresh tokens travel as `HttpOnly` cookies so browser scripts
//! cannot read them; an `Authorization: Bearer` header remains available as a
//! fallback for non-browser clients. Cookie attributes come from
//! [`CookieConfig`], which forces `Secure` in production.

use axum::http::header::{InvalidHeaderValue, COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue};

use crate::auth::jwt::JwtConfig;

/// Cookie name carrying the access token.
pub const ACCESS_COOKIE: &str = "access_token";
/// Cookie name carrying the refresh token.
pub const REFRESH_COOKIE: &str = "refresh_token";

/// Cookie attribute configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct CookieConfig {
    /// Whether to set the `Secure` attribute. Always true in production.
    pub secure: bool,
    /// `SameSite` attribute value (default: `Lax`).
    pub same_site: String,
    /// Optional `Domain` attribute.
    pub domain: Option<String>,
}

impl CookieConfig {
    /// Load cookie configuration from environment variables.
    ///
    /// | Env Var           | Default       |
    /// |-------------------|---------------|
    /// | `ENVIRONMENT`     | `development` |
    /// | `COOKIE_SECURE`   | `false`       |
    /// | `COOKIE_SAMESITE` | `Lax`         |
    /// | `COOKIE_DOMAIN`   | unset         |
    ///
    /// `ENVIRONMENT=production` forces `secure = true` regardless of
    /// `COOKIE_SECURE`.
    pub fn from_env() -> Self {
        let environment =
            std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let secure_flag = std::env::var("COOKIE_SECURE")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);
        let secure = environment == "production" || secure_flag;

        let same_site = std::env::var("COOKIE_SAMESITE").unwrap_or_else(|_| "Lax".into());

        let domain = std::env::var("COOKIE_DOMAIN").ok().filter(|d| !d.is_empty());

        Self {
            secure,
            same_site,
            domain,
        }
    }
}

/// Build a `Set-Cookie` header value for an auth cookie.
fn build_cookie(
    name: &str,
    value: &str,
    max_age_secs: i64,
    config: &CookieConfig,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let same_site = &config.same_site;
    let mut cookie =
        format!("{name}={value}; Path=/; HttpOnly; SameSite={same_site}; Max-Age={max_age_secs}");
    if config.secure {
        cookie.push_str("; Secure");
    }
    if let Some(domain) = &config.domain {
        cookie.push_str("; Domain=");
        cookie.push_str(domain);
    }
    HeaderValue::from_str(&cookie)
}

/// Append `Set-Cookie` headers for a fresh access/refresh token pair.
///
/// Cookie lifetimes mirror the token lifetimes from [`JwtConfig`].
pub fn set_auth_cookies(
    headers: &mut HeaderMap,
    access_token: &str,
    refresh_token: &str,
    jwt: &JwtConfig,
    config: &CookieConfig,
) -> Result<(), InvalidHeaderValue> {
    let access_max_age = jwt.access_token_expiry_mins * 60;
    let refresh_max_age = jwt.refresh_token_expiry_days * 24 * 3600;

    headers.append(
        SET_COOKIE,
        build_cookie(ACCESS_COOKIE, access_token, access_max_age, config)?,
    );
    headers.append(
        SET_COOKIE,
        build_cookie(REFRESH_COOKIE, refresh_token, refresh_max_age, config)?,
    );
    Ok(())
}

/// Append `Set-Cookie` headers that expire both auth cookies immediately.
pub fn clear_auth_cookies(
    headers: &mut HeaderMap,
    config: &CookieConfig,
) -> Result<(), InvalidHeaderValue> {
    headers.append(SET_COOKIE, build_cookie(ACCESS_COOKIE, "", 0, config)?);
    headers.append(SET_COOKIE, build_cookie(REFRESH_COOKIE, "", 0, config)?);
    Ok(())
}

/// Extract a named cookie value from the request `Cookie` header.
pub fn extract_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    let header = headers.get(COOKIE)?;
    let value = header.to_str().ok()?;
    for pair in value.split(';') {
        let trimmed = pair.trim();
        let mut parts = trimmed.splitn(2, '=');
        let key = parts.next()?.trim();
        let val = parts.next()?.trim();
        if key == name && !val.is_empty() {
            return Some(val.to_string());
        }
    }
    None
}
