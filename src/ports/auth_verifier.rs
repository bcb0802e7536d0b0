//! Auth verifier port.
//!
//! Admin authentication is an external collaborator: something turns request
//! credentials into an identity plus a role flag. This core treats it as
//! opaque.

use async_trait::async_trait;

use crate::domain::foundation::{AuthContext, DomainError};

/// Black-box identity and role verifier.
#[async_trait]
pub trait AuthVerifier: Send + Sync {
    /// Resolves request credentials into an authenticated caller.
    ///
    /// # Errors
    ///
    /// Returns an `Unauthorized` error for missing or invalid credentials.
    async fn verify(&self, credentials: &str) -> Result<AuthContext, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_verifier_is_object_safe() {
        fn _accepts_dyn(_verifier: &dyn AuthVerifier) {}
    }
}
