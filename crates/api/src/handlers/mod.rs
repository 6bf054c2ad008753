//! Request handlers for the marketplace API.
//!
//! Each submodule provides the async handler functions for a single resource.
//! Handlers delegate to the repositories in `tessera_db` and map errors via
//! [`AppError`].
//!
//! [`AppError`]: crate::error::AppError

pub mod admin;
pub mod auth;
pub mod payment;
pub mod sessions;
pub mod templates;

mod utils;
