//! Tessera API server library.
//!
//! Exposes the building blocks (config, state, error handling, routes,
//! auth plumbing) so integration tests and the binary entrypoint can both
//! access them.

pub mod auth;
pub mod background;
pub mod bootstrap;
pub mod config;
pub mod cookies;
pub mod email;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod payment;
pub mod query;
pub mod response;
pub mod routes;
pub mod state;
