//! Well-known role name constants.
//!
//! These must match the CHECK constraint on `users.role` in the initial
//! migration. Roles are a closed two-value set; premium is an orthogonal
//! flag on the user record, not a role.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_USER: &str = "user";

/// True when `role` names the admin role.
pub fn is_admin(role: &str) -> bool {
    role == ROLE_ADMIN
}

/// True when `role` is one of the known role names.
pub fn is_valid_role(role: &str) -> bool {
    role == ROLE_ADMIN || role == ROLE_USER
}
