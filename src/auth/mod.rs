//! Access token verification and account resolution for the UP domain.

pub mod identity;
pub mod jwt;

pub use identity::{Account, AccountStore, IdentityResolver, ResolvedIdentity, identity_hash};
pub use jwt::{Claims, JwtValidator, TokenError};

/// Identity attached to every authenticated request.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct AuthContext {
    pub account_id: i64,
    pub username: String,
}

impl From<ResolvedIdentity> for AuthContext {
    fn from(resolved: ResolvedIdentity) -> Self {
        Self {
            account_id: resolved.account_id,
            username: resolved.username,
        }
    }
}
