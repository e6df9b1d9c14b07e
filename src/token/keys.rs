//! Signing and verification keys.

use std::collections::HashSet;
use std::fmt;

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use super::claims::UserClaims;

/// Errors from signing or verifying a token.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("token signing failed: {0}")]
    Sign(#[source] jsonwebtoken::errors::Error),
    #[error("token rejected: {0}")]
    Verify(#[source] jsonwebtoken::errors::Error),
}

/// HMAC key pair built once at startup and shared read-only.
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenKeys {
    pub fn from_secret(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is judged by the authenticator against its own clock.
        validation.validate_exp = false;
        validation.required_spec_claims = HashSet::new();

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        }
    }

    pub fn sign(&self, claims: &UserClaims) -> Result<String, TokenError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding).map_err(TokenError::Sign)
    }

    /// Parse `token` and check its signature. Timestamps are not judged here.
    pub fn verify(&self, token: &str) -> Result<UserClaims, TokenError> {
        decode::<UserClaims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(TokenError::Verify)
    }
}

impl fmt::Debug for TokenKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenKeys").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeDelta};

    fn claims() -> UserClaims {
        let issued = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        UserClaims::new(9, "Mozilla/5.0", issued, TimeDelta::minutes(30))
    }

    #[test]
    fn test_sign_and_verify() {
        let keys = TokenKeys::from_secret(b"0123456789abcdef0123456789abcdef");
        let token = keys.sign(&claims()).unwrap();
        assert_eq!(keys.verify(&token).unwrap(), claims());
    }

    #[test]
    fn test_expired_claims_still_verify() {
        // 2023 timestamps are long past; verification must not care.
        let keys = TokenKeys::from_secret(b"k");
        let token = keys.sign(&claims()).unwrap();
        assert!(keys.verify(&token).is_ok());
    }

    #[test]
    fn test_foreign_key_is_rejected() {
        let ours = TokenKeys::from_secret(b"ours");
        let theirs = TokenKeys::from_secret(b"theirs");
        let forged = theirs.sign(&claims()).unwrap();
        assert!(matches!(ours.verify(&forged), Err(TokenError::Verify(_))));
    }

    #[test]
    fn test_garbage_is_rejected() {
        let keys = TokenKeys::from_secret(b"k");
        assert!(keys.verify("not.a.token").is_err());
        assert!(keys.verify("").is_err());
    }

    #[test]
    fn test_tampered_payload_is_rejected() {
        let keys = TokenKeys::from_secret(b"k");
        let token = keys.sign(&claims()).unwrap();
        let other = keys
            .sign(&UserClaims { uid: 1, ..claims() })
            .unwrap();

        // Splice the other payload onto the original signature.
        let parts: Vec<&str> = token.split('.').collect();
        let other_parts: Vec<&str> = other.split('.').collect();
        let spliced = format!("{}.{}.{}", parts[0], other_parts[1], parts[2]);
        assert!(keys.verify(&spliced).is_err());
    }
}
