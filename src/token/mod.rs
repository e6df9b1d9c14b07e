//! Signed bearer tokens.
//!
//! # Data Flow
//! ```text
//! Login:   uid + User-Agent → TokenIssuer::issue → "x-jwt-token" header
//! Request: "Authorization: Bearer <jwt>" → TokenKeys::verify → UserClaims
//! Refresh: UserClaims::renewed → TokenIssuer::reissue → "x-jwt-token" header
//! ```
//!
//! # Design Decisions
//! - HS256 with a key built once from config and shared through `Arc`
//! - Tokens are never edited; a refresh mints a new one
//! - The issuer is the only place a lifetime is applied, for login and
//!   refresh alike

pub mod claims;
pub mod keys;

use std::sync::Arc;

use chrono::TimeDelta;

use crate::clock::Clock;

pub use claims::UserClaims;
pub use keys::{TokenError, TokenKeys};

/// Mints tokens with the configured lifetime.
#[derive(Clone)]
pub struct TokenIssuer {
    keys: Arc<TokenKeys>,
    lifetime: TimeDelta,
    clock: Arc<dyn Clock>,
}

impl TokenIssuer {
    pub fn new(keys: Arc<TokenKeys>, lifetime: TimeDelta, clock: Arc<dyn Clock>) -> Self {
        Self {
            keys,
            lifetime,
            clock,
        }
    }

    /// Issue a token for `uid`, bound to the client's `User-Agent`.
    pub fn issue(&self, uid: i64, user_agent: &str) -> Result<String, TokenError> {
        let claims = UserClaims::new(uid, user_agent, self.clock.now(), self.lifetime);
        self.keys.sign(&claims)
    }

    /// Issue a successor for `claims` expiring one lifetime from now.
    pub fn reissue(&self, claims: &UserClaims) -> Result<(String, UserClaims), TokenError> {
        let renewed = claims.renewed(self.clock.now(), self.lifetime);
        let token = self.keys.sign(&renewed)?;
        Ok((token, renewed))
    }

    pub fn keys(&self) -> &TokenKeys {
        &self.keys
    }

    pub fn lifetime(&self) -> TimeDelta {
        self.lifetime
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use chrono::DateTime;

    #[test]
    fn test_issue_then_reissue() {
        let start = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let clock = Arc::new(ManualClock::new(start));
        let issuer = TokenIssuer::new(
            Arc::new(TokenKeys::from_secret(b"secret")),
            TimeDelta::minutes(30),
            clock.clone(),
        );

        let token = issuer.issue(3, "ua").unwrap();
        let claims = issuer.keys().verify(&token).unwrap();
        assert_eq!(claims.exp, start.timestamp() + 1_800);

        clock.advance(TimeDelta::minutes(26));
        let (next, renewed) = issuer.reissue(&claims).unwrap();
        assert_ne!(next, token);
        assert_eq!(renewed.exp, clock.now().timestamp() + 1_800);
        assert_eq!(issuer.keys().verify(&next).unwrap(), renewed);
    }
}
