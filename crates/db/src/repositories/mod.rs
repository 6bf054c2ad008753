//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod analytics_repo;
pub mod auth_token_repo;
pub mod session_repo;
pub mod template_repo;
pub mod user_repo;

pub use analytics_repo::AnalyticsRepo;
pub use auth_token_repo::AuthTokenRepo;
pub use session_repo::SessionRepo;
pub use template_repo::TemplateRepo;
pub use user_repo::UserRepo;
