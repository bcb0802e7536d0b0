//! Authentication types for the domain layer.
//!
//! These types represent an authenticated caller as produced by the external
//! identity verifier. They have **no provider dependencies** - any auth
//! backend can populate them via the `AuthVerifier` port.

use super::UserId;

/// Authenticated caller identity and role.
///
/// This is a **domain type**: the auth provider is a black box that yields
/// a user id plus an admin flag, nothing more.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthContext {
    /// The authenticated user.
    pub user_id: UserId,

    /// Whether the caller holds the admin role.
    pub is_admin: bool,
}

impl AuthContext {
    /// Creates a regular user context.
    pub fn user(user_id: UserId) -> Self {
        Self {
            user_id,
            is_admin: false,
        }
    }

    /// Creates an admin context.
    pub fn admin(user_id: UserId) -> Self {
        Self {
            user_id,
            is_admin: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_context_is_not_admin() {
        assert!(!AuthContext::user(UserId::new(1)).is_admin);
    }

    #[test]
    fn admin_context_is_admin() {
        assert!(AuthContext::admin(UserId::new(1)).is_admin);
    }
}
