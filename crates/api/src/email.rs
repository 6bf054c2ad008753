//! Verification and password-reset email delivery via SMTP.
//!
//! [`Mailer`] wraps the `lettre` async SMTP transport. Configuration is loaded
//! from environment variables; if `SMTP_HOST` is not set,
//! [`EmailConfig::from_env`] returns `None` and no mailer is constructed.
//!
//! Delivery is best-effort by contract: account and token state changes commit
//! regardless of whether the email goes out. The `spawn_*` helpers run the
//! send on a detached task and log failures instead of surfacing them.

use std::sync::Arc;

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for email delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    /// SMTP transport-level failure (authentication, connection, etc.).
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    /// The recipient or sender address could not be parsed.
    #[error("Email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),

    /// The MIME message could not be assembled.
    #[error("Email build error: {0}")]
    Build(String),
}

// ---------------------------------------------------------------------------
// EmailConfig
// ---------------------------------------------------------------------------

/// Default SMTP port (STARTTLS).
const DEFAULT_SMTP_PORT: u16 = 587;

/// Default sender address when `SMTP_FROM` is not set.
const DEFAULT_FROM_ADDRESS: &str = "noreply@tessera.local";

/// Configuration for the SMTP email delivery service.
#[derive(Debug, Clone)]
pub struct EmailConfig {
    /// SMTP server hostname.
    pub smtp_host: String,
    /// SMTP server port (defaults to 587).
    pub smtp_port: u16,
    /// RFC 5322 "From" address.
    pub from_address: String,
    /// Optional SMTP username.
    pub smtp_user: Option<String>,
    /// Optional SMTP password.
    pub smtp_password: Option<String>,
}

impl EmailConfig {
    /// Load configuration from environment variables.
    ///
    /// Returns `None` if `SMTP_HOST` is not set, signalling that email
    /// delivery is not configured and should be skipped.
    ///
    /// | Variable        | Required | Default                 |
    /// |-----------------|----------|-------------------------|
    /// | `SMTP_HOST`     | yes      | --                       |
    /// | `SMTP_PORT`     | no       | `587`                   |
    /// | `SMTP_FROM`     | no       | `noreply@tessera.local` |
    /// | `SMTP_USER`     | no       | --                       |
    /// | `SMTP_PASSWORD` | no       | --                       |
    pub fn from_env() -> Option<Self> {
        let smtp_host = std::env::var("SMTP_HOST").ok()?;
        Some(Self {
            smtp_host,
            smtp_port: std::env::var("SMTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_SMTP_PORT),
            from_address: std::env::var("SMTP_FROM")
                .unwrap_or_else(|_| DEFAULT_FROM_ADDRESS.to_string()),
            smtp_user: std::env::var("SMTP_USER").ok(),
            smtp_password: std::env::var("SMTP_PASSWORD").ok(),
        })
    }
}

// ---------------------------------------------------------------------------
// Mailer
// ---------------------------------------------------------------------------

/// Sends account emails (verification links, password reset links) via SMTP.
pub struct Mailer {
    config: EmailConfig,
    frontend_url: String,
}

impl Mailer {
    /// Create a new mailer. `frontend_url` is the base URL embedded in links.
    pub fn new(config: EmailConfig, frontend_url: String) -> Self {
        Self {
            config,
            frontend_url: frontend_url.trim_end_matches('/').to_string(),
        }
    }

    /// Send an email verification link to a freshly signed-up user.
    pub async fn send_verification_email(
        &self,
        to_email: &str,
        token: &str,
    ) -> Result<(), EmailError> {
        let link = self.verification_link(token);
        let body = format!(
            "Welcome!\n\nPlease verify your email address by opening the link below:\n\n{link}\n\nThe link expires in 24 hours. If you did not create an account, you can ignore this email.\n"
        );
        self.send(to_email, "Verify your email address", body).await
    }

    /// Send a password reset link.
    pub async fn send_password_reset_email(
        &self,
        to_email: &str,
        token: &str,
    ) -> Result<(), EmailError> {
        let link = self.reset_link(token);
        let body = format!(
            "A password reset was requested for your account.\n\nOpen the link below to choose a new password:\n\n{link}\n\nThe link expires in 1 hour. If you did not request a reset, you can ignore this email.\n"
        );
        self.send(to_email, "Reset your password", body).await
    }

    fn verification_link(&self, token: &str) -> String {
        format!("{}/verify-email?token={token}", self.frontend_url)
    }

    fn reset_link(&self, token: &str) -> String {
        format!("{}/reset-password?token={token}", self.frontend_url)
    }

    async fn send(&self, to_email: &str, subject: &str, body: String) -> Result<(), EmailError> {
        use lettre::{
            message::header::ContentType, transport::smtp::authentication::Credentials,
            AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
        };

        let email = Message::builder()
            .from(self.config.from_address.parse()?)
            .to(to_email.parse()?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body)
            .map_err(|e| EmailError::Build(e.to_string()))?;

        let mut transport_builder =
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.smtp_host)?
                .port(self.config.smtp_port);

        if let (Some(user), Some(pass)) = (&self.config.smtp_user, &self.config.smtp_password) {
            transport_builder =
                transport_builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        let mailer = transport_builder.build();
        mailer.send(email).await?;

        tracing::info!(to = to_email, subject, "Email sent");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Fire-and-forget helpers
// ---------------------------------------------------------------------------

/// Send a verification email on a detached task. Logs and swallows failures;
/// logs a skip when no mailer is configured.
pub fn spawn_verification_email(mailer: &Option<Arc<Mailer>>, to_email: &str, token: &str) {
    let Some(mailer) = mailer else {
        tracing::info!(to = to_email, "Email delivery not configured, skipping verification email");
        return;
    };
    let mailer = Arc::clone(mailer);
    let to_email = to_email.to_string();
    let token = token.to_string();
    tokio::spawn(async move {
        if let Err(e) = mailer.send_verification_email(&to_email, &token).await {
            tracing::warn!(to = %to_email, error = %e, "Verification email delivery failed");
        }
    });
}

/// Send a password reset email on a detached task. Same best-effort contract
/// as [`spawn_verification_email`].
pub fn spawn_password_reset_email(mailer: &Option<Arc<Mailer>>, to_email: &str, token: &str) {
    let Some(mailer) = mailer else {
        tracing::info!(to = to_email, "Email delivery not configured, skipping reset email");
        return;
    };
    let mailer = Arc::clone(mailer);
    let to_email = to_email.to_string();
    let token = token.to_string();
    tokio::spawn(async move {
        if let Err(e) = mailer.send_password_reset_email(&to_email, &token).await {
            tracing::warn!(to = %to_email, error = %e, "Password reset email delivery failed");
        }
    });
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
