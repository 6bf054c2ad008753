//! Startup seeding for the first admin account.
//!
//! Reads `ADMIN_EMAIL` and `ADMIN_PASSWORD` from the environment and creates
//! a pre-verified admin user when the database has none. Skipped silently
//! when the variables are unset, so production deployments can manage admins
//! out of band.

use sqlx::PgPool;

use crate::auth::password::hash_password;
use tessera_core::roles::ROLE_ADMIN;
use tessera_db::models::user::CreateUser;
use tessera_db::repositories::user_repo::UserRepo;

/// Seed the initial admin account if configured and not already present.
///
/// The seed is skipped when `ADMIN_EMAIL`/`ADMIN_PASSWORD` are unset, when an
/// admin account already exists, or when the email is already taken. Errors
/// are logged but never abort startup; a marketplace without its seed admin
/// still serves traffic.
pub async fn seed_admin(pool: &PgPool) {
    let (Ok(email), Ok(password)) = (
        std::env::var("ADMIN_EMAIL"),
        std::env::var("ADMIN_PASSWORD"),
    ) else {
        tracing::debug!("Admin seed skipped: ADMIN_EMAIL/ADMIN_PASSWORD not set");
        return;
    };

    if let Err(e) = try_seed(pool, email, password).await {
        tracing::error!(error = %e, "Admin seed failed");
    }
}

async fn try_seed(pool: &PgPool, email: String, password: String) -> Result<(), sqlx::Error> {
    if UserRepo::exists_with_role(pool, ROLE_ADMIN).await? {
        tracing::debug!("Admin seed skipped: an admin account already exists");
        return Ok(());
    }
    if UserRepo::find_by_email(pool, &email).await?.is_some() {
        tracing::warn!(email, "Admin seed skipped: email already registered");
        return Ok(());
    }

    let password_hash = match hash_password(password).await {
        Ok(hash) => hash,
        Err(e) => {
            tracing::error!(error = %e, "Admin seed: password hashing failed");
            return Ok(());
        }
    };

    let user = UserRepo::create(
        pool,
        &CreateUser {
            email: email.clone(),
            password_hash,
            first_name: "Admin".into(),
            last_name: "User".into(),
            role: ROLE_ADMIN.into(),
        },
    )
    .await?;
    UserRepo::mark_verified(pool, user.id).await?;

    tracing::info!(email, user_id = user.id, "Seeded initial admin account");
    Ok(())
}
