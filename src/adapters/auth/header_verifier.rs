//! Header token auth verifier.
//!
//! Development stand-in for the real identity provider: tokens are
//! `user:<id>` or `admin:<id>`. Production deployments swap in a verifier
//! that validates real credentials behind the same port.

use async_trait::async_trait;

use crate::domain::foundation::{AuthContext, DomainError, ErrorCode, UserId};
use crate::ports::AuthVerifier;

/// Verifier accepting `user:<id>` / `admin:<id>` tokens.
pub struct HeaderAuthVerifier;

#[async_trait]
impl AuthVerifier for HeaderAuthVerifier {
    async fn verify(&self, credentials: &str) -> Result<AuthContext, DomainError> {
        let unauthorized =
            || DomainError::new(ErrorCode::Unauthorized, "Invalid credentials");

        let (role, id) = credentials.split_once(':').ok_or_else(unauthorized)?;
        let user_id: UserId = id.parse().map_err(|_| unauthorized())?;

        match role {
            "user" => Ok(AuthContext::user(user_id)),
            "admin" => Ok(AuthContext::admin(user_id)),
            _ => Err(unauthorized()),
        }
    }
}
