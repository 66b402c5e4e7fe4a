pub mod password;

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::SecurityConfig;

pub use password::{hash_password, verify_password, PasswordError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Username the token was issued to
    pub sub: String,
    pub exp: i64,
    /// Absent from tokens minted before `iat` was added
    #[serde(default)]
    pub iat: i64,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("Token expired")]
    Expired,

    #[error("Invalid token")]
    Invalid,

    #[error("JWT generation error: {0}")]
    Generation(String),
}

/// Issues and verifies HS256 session tokens.
///
/// Tokens are stateless: validity is the signature plus the `exp` claim,
/// checked with zero leeway. There is no refresh, revocation or key rotation.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    pub fn from_config(security: &SecurityConfig) -> Self {
        Self::new(&security.jwt_secret, Duration::minutes(security.jwt_expiry_minutes))
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn issue(&self, subject: &str) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = Claims {
            sub: subject.to_string(),
            exp: (now + self.ttl).timestamp(),
            iat: now.timestamp(),
        };
        self.encode_claims(&claims)
    }

    fn encode_claims(&self, claims: &Claims) -> Result<String, TokenError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| TokenError::Generation(e.to_string()))
    }

    /// Returns the subject of a valid token.
    pub fn verify(&self, token: &str) -> Result<String, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        match decode::<Claims>(token, &self.decoding_key, &validation) {
            Ok(data) => Ok(data.claims.sub),
            Err(e) => match e.kind() {
                ErrorKind::ExpiredSignature => Err(TokenError::Expired),
                _ => Err(TokenError::Invalid),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issuer() -> TokenIssuer {
        TokenIssuer::new("test-secret-that-is-long-enough-for-hmac", Duration::hours(1))
    }

    #[test]
    fn issued_token_verifies_to_subject() {
        let issuer = issuer();
        let token = issuer.issue("alice").unwrap();
        assert_eq!(issuer.verify(&token).unwrap(), "alice");
    }

    #[test]
    fn expiry_is_one_hour_after_issue() {
        let issuer = issuer();
        let before = Utc::now().timestamp();
        let token = issuer.issue("alice").unwrap();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.insecure_disable_signature_validation();
        let claims = decode::<Claims>(&token, &DecodingKey::from_secret(b""), &validation)
            .unwrap()
            .claims;

        assert!(claims.iat >= before);
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn expired_token_is_rejected_as_expired() {
        let issuer = issuer();
        let now = Utc::now().timestamp();
        let token = issuer
            .encode_claims(&Claims {
                sub: "alice".to_string(),
                exp: now - 5,
                iat: now - 3605,
            })
            .unwrap();

        assert_eq!(issuer.verify(&token), Err(TokenError::Expired));
    }

    #[test]
    fn tampered_token_is_rejected_as_invalid() {
        let issuer = issuer();
        let token = issuer.issue("alice").unwrap();

        // Swap the payload for one claiming a different subject, keep the signature.
        let forged = TokenIssuer::new("test-secret-that-is-long-enough-for-hmac", Duration::hours(1))
            .issue("mallory")
            .unwrap();
        let parts: Vec<&str> = token.split('.').collect();
        let forged_parts: Vec<&str> = forged.split('.').collect();
        let tampered = format!("{}.{}.{}", parts[0], forged_parts[1], parts[2]);

        assert_eq!(issuer.verify(&tampered), Err(TokenError::Invalid));
    }

    #[test]
    fn foreign_secret_and_garbage_are_invalid() {
        let issuer = issuer();
        let other = TokenIssuer::new("some-other-secret", Duration::hours(1));
        let token = other.issue("alice").unwrap();

        assert_eq!(issuer.verify(&token), Err(TokenError::Invalid));
        assert_eq!(issuer.verify("not-a-jwt"), Err(TokenError::Invalid));
        assert_eq!(issuer.verify(""), Err(TokenError::Invalid));
    }

    #[test]
    fn tokens_without_issued_at_still_verify() {
        #[derive(Serialize)]
        struct SubjectAndExpiry {
            sub: String,
            exp: i64,
        }

        let issuer = TokenIssuer::new(crate::config::FALLBACK_JWT_SECRET, Duration::hours(1));
        let claims = SubjectAndExpiry {
            sub: "alice".to_string(),
            exp: Utc::now().timestamp() + 3600,
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &issuer.encoding_key).unwrap();

        assert_eq!(issuer.verify(&token), Ok("alice".to_string()));
    }
}
