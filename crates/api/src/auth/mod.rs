//! Authentication and authorization primitives.
//!
//! - [`password`] -- Argon2id password hashing and verification.
//! - [`jwt`] -- two-secret JWT issuance and validation for access, refresh,
//!   verification, and reset tokens.

pub mod jwt;
pub mod password;
