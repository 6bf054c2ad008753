//! Domain types and pure logic shared across the backend crates.
//!
//! Everything in this crate is synchronous and free of HTTP, database,
//! and I/O concerns so it can be unit tested in isolation.

pub mod access;
pub mod device;
pub mod error;
pub mod roles;
pub mod types;
pub mod validation;
