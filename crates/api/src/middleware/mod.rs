//! Authentication and authorization middleware extractors.
//!
//! - [`auth::CurrentUser`] -- Resolves the requester from the auth cookie or
//!   Bearer header and re-reads the user row.
//! - [`auth::MaybeUser`] -- Same resolution, but optional; never rejects.
//! - [`rbac::RequireAdmin`] -- Requires the `admin` role.
//! - [`rbac::RequirePremium`] -- Requires the premium entitlement.

pub mod auth;
pub mod rbac;
