//! Stateless bearer access tokens.
//!
//! Tokens are HS256 JWTs bound to an account id. There is no persisted
//! token store; validity is signature plus expiry, nothing else.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// JWT claims carried by an access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Account id.
    pub sub: String,
    /// Issued-at, seconds since epoch.
    pub iat: i64,
    /// Expiry, seconds since epoch.
    pub exp: i64,
}

/// Signing/verification keys plus token lifetime.
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenKeys {
    pub fn from_secret(secret: &[u8], ttl_minutes: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl: Duration::minutes(ttl_minutes),
        }
    }

    /// Mint an access token for the given account id.
    pub fn mint(&self, account_id: &str) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: account_id.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        Ok(token)
    }

    /// Verify a token and return its claims. Fails on bad signature,
    /// malformed input, or expiry.
    pub fn verify(&self, token: &str) -> Result<Claims> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::default())?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mint_verify_round_trip() {
        let keys = TokenKeys::from_secret(b"test-secret", 60);
        let token = keys.mint("01J0000000000000000000TEST").unwrap();
        assert!(!token.is_empty());

        let claims = keys.verify(&token).unwrap();
        assert_eq!(claims.sub, "01J0000000000000000000TEST");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let keys = TokenKeys::from_secret(b"secret-a", 60);
        let other = TokenKeys::from_secret(b"secret-b", 60);
        let token = keys.mint("acct").unwrap();
        assert!(other.verify(&token).is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        // Negative TTL backdates the expiry past jsonwebtoken's leeway.
        let keys = TokenKeys::from_secret(b"test-secret", -2);
        let token = keys.mint("acct").unwrap();
        assert!(keys.verify(&token).is_err());
    }

    #[test]
    fn garbage_is_rejected() {
        let keys = TokenKeys::from_secret(b"test-secret", 60);
        assert!(keys.verify("not-a-jwt").is_err());
    }
}
