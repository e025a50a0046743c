//! Session Token Codec
//!
//! Issues and validates the signed, time-bounded session tokens handed to
//! clients after successful authentication.
//!
//! Wire format is a compact three-part JWS (`header.payload.signature`)
//! signed with HMAC-SHA256. The claim set is fixed:
//! `authorities`, `id`, `role`, `personalNo`, `firstName`, `lastName`,
//! `nationality`, `hasVoted`, plus the standard `sub`/`iat`/`exp`.
//!
//! Both the signature check and the expiration check are mandatory: the
//! decoder pins the algorithm to HS256 (an unsigned or algorithm-"none"
//! token never parses) and validates `exp` with zero clock-skew leeway.
//! The codec keeps no record of issued tokens.
//!
//! # Usage
//!
//! ```ignore
//! use portcullis::secret::SigningSecret;
//! use portcullis::token::TokenCodec;
//!
//! let codec = TokenCodec::new(&SigningSecret::new(secret)?);
//!
//! let token = codec.issue(&identity, &identity.identifier)?;
//! let claims = codec.validate(&token)?;
//! assert_eq!(claims.sub, identity.identifier);
//! ```

use chrono::Utc;
use jsonwebtoken::{
    decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::authn::Identity;
use crate::events::SecurityEvent;
use crate::secret::SigningSecret;

/// Default token validity window: 24 hours.
pub const DEFAULT_VALIDITY_SECS: i64 = 86_400;

/// Error type for token issuance and validation failures.
///
/// Each validation failure is distinct; callers must not collapse them into
/// "unauthenticated-but-continue".
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// Signature does not verify with the process secret
    #[error("token signature is invalid")]
    InvalidSignature,

    /// Current time is past the expiration claim
    #[error("token has expired")]
    Expired,

    /// Token structure cannot be parsed
    #[error("token is malformed")]
    Malformed,

    /// Internal signing error at issuance (unexpected)
    #[error("token signing failed: {0}")]
    Signing(String),
}

/// The claims embedded in every issued token.
///
/// Created fresh per issuance and immutable once signed. Wire names are
/// fixed for interoperability with existing consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Granted authorities, primary role first
    pub authorities: Vec<String>,
    /// Numeric internal id
    pub id: i64,
    /// Primary role
    pub role: String,
    /// Personal-number string
    #[serde(rename = "personalNo")]
    pub personal_no: String,
    /// Given name
    #[serde(rename = "firstName")]
    pub first_name: String,
    /// Family name
    #[serde(rename = "lastName")]
    pub last_name: String,
    /// Nationality
    pub nationality: String,
    /// Whether the principal has already cast a vote
    #[serde(rename = "hasVoted")]
    pub has_voted: bool,
    /// Subject: the identifier the token was issued for
    pub sub: String,
    /// Issued-at (Unix timestamp, seconds)
    pub iat: i64,
    /// Expiration (Unix timestamp, seconds)
    pub exp: i64,
}

/// Stateless codec over the process-wide signing secret.
///
/// Issuance and validation are pure, re-entrant computations; the only
/// shared state is the immutable key material, so a codec can be shared
/// freely across request handlers.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    validity_secs: i64,
}

impl TokenCodec {
    /// Create a codec with the default 24 h validity window.
    pub fn new(secret: &SigningSecret) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            validity_secs: DEFAULT_VALIDITY_SECS,
        }
    }

    /// Override the validity window.
    pub fn with_validity(mut self, validity: std::time::Duration) -> Self {
        self.validity_secs = validity.as_secs() as i64;
        self
    }

    /// Issue a signed token for an identity.
    ///
    /// `subject` is the identifier the token is issued for, typically
    /// `identity.identifier`. Sets `iat` to the current time and `exp` to
    /// `iat` plus the validity window. No side effects beyond signing.
    pub fn issue(&self, identity: &Identity, subject: &str) -> Result<String, TokenError> {
        let now = Utc::now().timestamp();

        let claims = Claims {
            authorities: identity.authorities.clone(),
            id: identity.id,
            role: identity.role.clone(),
            personal_no: identity.personal_no.clone(),
            first_name: identity.first_name.clone(),
            last_name: identity.last_name.clone(),
            nationality: identity.nationality.clone(),
            has_voted: identity.has_voted,
            sub: subject.to_string(),
            iat: now,
            exp: now + self.validity_secs,
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))?;

        crate::security_event!(
            SecurityEvent::TokenIssued,
            subject = %subject,
            expires_at = claims.exp,
            "Session token issued"
        );

        Ok(token)
    }

    /// Verify a token and return its claims.
    ///
    /// Rejects with [`TokenError::InvalidSignature`] when the signature does
    /// not match the process secret (or the token claims a different
    /// algorithm), [`TokenError::Expired`] when past `exp`, and
    /// [`TokenError::Malformed`] when the structure does not parse.
    pub fn validate(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                let err = match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
                    jsonwebtoken::errors::ErrorKind::InvalidSignature
                    | jsonwebtoken::errors::ErrorKind::InvalidAlgorithm => {
                        TokenError::InvalidSignature
                    }
                    _ => TokenError::Malformed,
                };

                crate::security_event!(
                    SecurityEvent::TokenRejected,
                    reason = %err,
                    "Token failed validation"
                );

                err
            })
    }

    /// Verify a token and return only its subject claim.
    ///
    /// Same failure modes as [`validate`](Self::validate).
    pub fn extract_subject(&self, token: &str) -> Result<String, TokenError> {
        self.validate(token).map(|claims| claims.sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secret() -> SigningSecret {
        SigningSecret::new("fK2#mW9!xQ4$eR7@tY1&uI5*oP8(aS3)dG6-hJ0+").unwrap()
    }

    fn other_secret() -> SigningSecret {
        SigningSecret::new("zB5%nV2@cX8#vM1!bL4$kD7^jF0&gH3*sA6(pQ9)").unwrap()
    }

    fn identity() -> Identity {
        Identity {
            identifier: "a@x.com".to_string(),
            id: 42,
            first_name: "Arta".to_string(),
            last_name: "Berisha".to_string(),
            role: "VOTER".to_string(),
            nationality: "XK".to_string(),
            personal_no: "1234567890".to_string(),
            has_voted: true,
            authorities: vec!["ROLE_VOTER".to_string(), "ROLE_OBSERVER".to_string()],
        }
    }

    #[test]
    fn test_round_trip() {
        let codec = TokenCodec::new(&secret());
        let identity = identity();

        let token = codec.issue(&identity, &identity.identifier).unwrap();
        let claims = codec.validate(&token).unwrap();

        assert_eq!(claims.sub, "a@x.com");
        assert_eq!(claims.id, 42);
        assert_eq!(claims.role, "VOTER");
        assert_eq!(claims.personal_no, "1234567890");
        assert_eq!(claims.first_name, "Arta");
        assert_eq!(claims.last_name, "Berisha");
        assert_eq!(claims.nationality, "XK");
        assert!(claims.has_voted);
        assert_eq!(claims.authorities, identity.authorities);
        assert_eq!(claims.exp, claims.iat + DEFAULT_VALIDITY_SECS);
    }

    #[test]
    fn test_extract_subject() {
        let codec = TokenCodec::new(&secret());
        let token = codec.issue(&identity(), "a@x.com").unwrap();

        assert_eq!(codec.extract_subject(&token).unwrap(), "a@x.com");
    }

    #[test]
    fn test_compact_three_part_format() {
        let codec = TokenCodec::new(&secret());
        let token = codec.issue(&identity(), "a@x.com").unwrap();

        assert_eq!(token.split('.').count(), 3);
    }

    #[test]
    fn test_wire_claim_names() {
        let codec = TokenCodec::new(&secret());
        let token = codec.issue(&identity(), "a@x.com").unwrap();
        let claims = codec.validate(&token).unwrap();

        let value = serde_json::to_value(&claims).unwrap();
        for name in [
            "authorities", "id", "role", "personalNo", "firstName",
            "lastName", "nationality", "hasVoted", "sub", "iat", "exp",
        ] {
            assert!(value.get(name).is_some(), "missing wire claim {name}");
        }
        assert_eq!(value.as_object().unwrap().len(), 11);
    }

    #[test]
    fn test_expired_token_rejected_even_when_correctly_signed() {
        let codec = TokenCodec::new(&secret());

        // Correctly signed, but exp is an hour in the past
        let now = Utc::now().timestamp();
        let claims = Claims {
            authorities: vec!["ROLE_VOTER".to_string()],
            id: 42,
            role: "VOTER".to_string(),
            personal_no: "1234567890".to_string(),
            first_name: "Arta".to_string(),
            last_name: "Berisha".to_string(),
            nationality: "XK".to_string(),
            has_voted: false,
            sub: "a@x.com".to_string(),
            iat: now - 7200,
            exp: now - 3600,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret().as_bytes()),
        )
        .unwrap();

        assert_eq!(codec.validate(&token).unwrap_err(), TokenError::Expired);
        assert_eq!(codec.extract_subject(&token).unwrap_err(), TokenError::Expired);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let issuing = TokenCodec::new(&secret());
        let validating = TokenCodec::new(&other_secret());

        let token = issuing.issue(&identity(), "a@x.com").unwrap();

        assert_eq!(
            validating.validate(&token).unwrap_err(),
            TokenError::InvalidSignature
        );
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let codec = TokenCodec::new(&secret());

        let token_a = codec.issue(&identity(), "a@x.com").unwrap();
        let token_b = codec.issue(&identity(), "b@x.com").unwrap();

        // b's payload with a's signature
        let parts_a: Vec<&str> = token_a.split('.').collect();
        let parts_b: Vec<&str> = token_b.split('.').collect();
        let spliced = format!("{}.{}.{}", parts_b[0], parts_b[1], parts_a[2]);

        assert_eq!(
            codec.validate(&spliced).unwrap_err(),
            TokenError::InvalidSignature
        );
    }

    #[test]
    fn test_garbage_rejected_as_malformed() {
        let codec = TokenCodec::new(&secret());

        assert_eq!(codec.validate("not-a-token").unwrap_err(), TokenError::Malformed);
        assert_eq!(codec.validate("a.b.c").unwrap_err(), TokenError::Malformed);
        assert_eq!(codec.validate("").unwrap_err(), TokenError::Malformed);
    }

    #[test]
    fn test_foreign_algorithm_rejected() {
        let codec = TokenCodec::new(&secret());

        // Same secret, but signed as HS384: must not verify under the pinned
        // HS256 validation
        let token = encode(
            &Header::new(Algorithm::HS384),
            &Claims {
                authorities: vec![],
                id: 1,
                role: "VOTER".to_string(),
                personal_no: String::new(),
                first_name: String::new(),
                last_name: String::new(),
                nationality: String::new(),
                has_voted: false,
                sub: "a@x.com".to_string(),
                iat: Utc::now().timestamp(),
                exp: Utc::now().timestamp() + 3600,
            },
            &EncodingKey::from_secret(secret().as_bytes()),
        )
        .unwrap();

        assert_eq!(
            codec.validate(&token).unwrap_err(),
            TokenError::InvalidSignature
        );
    }

    #[test]
    fn test_unsigned_token_rejected() {
        let codec = TokenCodec::new(&secret());
        let token = codec.issue(&identity(), "a@x.com").unwrap();
        let payload = token.split('.').nth(1).unwrap();

        // {"alg":"none","typ":"JWT"} header with an empty signature part
        let none_token = format!("eyJhbGciOiJub25lIiwidHlwIjoiSldUIn0.{payload}.");

        let err = codec.validate(&none_token).unwrap_err();
        assert!(matches!(err, TokenError::Malformed | TokenError::InvalidSignature));
    }

    #[test]
    fn test_custom_validity_window() {
        let codec = TokenCodec::new(&secret())
            .with_validity(std::time::Duration::from_secs(300));

        let token = codec.issue(&identity(), "a@x.com").unwrap();
        let claims = codec.validate(&token).unwrap();

        assert_eq!(claims.exp - claims.iat, 300);
    }
}
