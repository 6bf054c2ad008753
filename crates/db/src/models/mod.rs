//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` entity struct matching the database row
//! - Create/update DTOs for inserts and patches
//! - `Serialize` response shapes safe for API output

pub mod analytics;
pub mod auth_token;
pub mod session;
pub mod template;
pub mod user;
