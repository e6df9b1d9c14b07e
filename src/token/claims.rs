//! Token payload.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// Claims carried by a bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserClaims {
    /// Numeric user id.
    pub uid: i64,
    /// `User-Agent` of the client the token was issued to.
    pub user_agent: String,
    /// Issued at (unix seconds).
    pub iat: i64,
    /// Expires at (unix seconds).
    pub exp: i64,
}

impl UserClaims {
    /// Claims for `uid` bound to `user_agent`, valid for `lifetime` from `now`.
    pub fn new(uid: i64, user_agent: impl Into<String>, now: DateTime<Utc>, lifetime: TimeDelta) -> Self {
        let iat = now.timestamp();
        Self {
            uid,
            user_agent: user_agent.into(),
            iat,
            exp: iat.saturating_add(lifetime.num_seconds()),
        }
    }

    /// Internal consistency: a positive subject and a non-inverted lifetime.
    pub fn is_well_formed(&self) -> bool {
        self.uid > 0 && self.iat <= self.exp
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.exp <= now.timestamp()
    }

    /// Seconds of validity left at `now` (negative once expired).
    pub fn remaining_at(&self, now: DateTime<Utc>) -> TimeDelta {
        TimeDelta::seconds(self.exp.saturating_sub(now.timestamp()))
    }

    /// The same identity and binding, re-dated to `now` with a new lifetime.
    pub fn renewed(&self, now: DateTime<Utc>, lifetime: TimeDelta) -> Self {
        Self::new(self.uid, self.user_agent.clone(), now, lifetime)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    #[test]
    fn test_claims_creation() {
        let claims = UserClaims::new(1, "curl/8.0", at(1_000), TimeDelta::minutes(30));
        assert_eq!(claims.iat, 1_000);
        assert_eq!(claims.exp, 1_000 + 1_800);
        assert!(claims.is_well_formed());
    }

    #[test]
    fn test_expiry_is_inclusive() {
        let claims = UserClaims::new(1, "ua", at(0), TimeDelta::seconds(10));
        assert!(!claims.is_expired_at(at(9)));
        assert!(claims.is_expired_at(at(10)));
        assert!(claims.is_expired_at(at(11)));
    }

    #[test]
    fn test_renewed_keeps_identity_and_binding() {
        let claims = UserClaims::new(5, "ua", at(0), TimeDelta::minutes(30));
        let renewed = claims.renewed(at(1_560), TimeDelta::minutes(30));
        assert_eq!(renewed.uid, 5);
        assert_eq!(renewed.user_agent, "ua");
        assert_eq!(renewed.exp, 1_560 + 1_800);
    }

    #[test]
    fn test_malformed_claims() {
        let mut claims = UserClaims::new(5, "ua", at(100), TimeDelta::minutes(1));
        claims.exp = 50;
        assert!(!claims.is_well_formed());

        let claims = UserClaims::new(0, "ua", at(100), TimeDelta::minutes(1));
        assert!(!claims.is_well_formed());
    }
}
