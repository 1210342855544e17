//! Session token issuance and verification
//!
//! HS256 tokens, signed with the process-wide [`SigningSecret`]. The service
//! keeps no record of issued tokens; a token is valid while its signature
//! matches and the clock is before `exp`.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::auth::types::{Claims, Role};
use crate::config::SigningSecret;
use crate::error::{AuthError, PortalError, Result};
use crate::logging::sanitize_token;

/// Session lifetime: 8 hours.
pub const SESSION_TTL_SECONDS: i64 = 8 * 60 * 60;

const TOKEN_ISSUER: &str = "cluster-access";

/// Signed session token as handed to the client.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    /// Compact JWS form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the token, e.g. for a JSON response body.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionToken({})", sanitize_token(&self.0))
    }
}

/// Wire payload of a session token
#[derive(Debug, Serialize, Deserialize)]
struct TokenPayload {
    /// Subject id, string encoded
    sub: String,
    role: Role,
    region_ids: BTreeSet<i32>,
    email: String,
    iss: String,
    iat: i64,
    exp: i64,
    jti: String,
}

/// Issues and verifies session tokens
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenService {
    /// Create a token service bound to the signing secret
    #[must_use]
    pub fn new(secret: &SigningSecret) -> Self {
        let encoding_key = EncodingKey::from_secret(secret.expose());
        let decoding_key = DecodingKey::from_secret(secret.expose());

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[TOKEN_ISSUER]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);
        // expiry is compared against an injectable clock in `verify_at`
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.leeway = 0;

        Self {
            encoding_key,
            decoding_key,
            validation,
            ttl: Duration::seconds(SESSION_TTL_SECONDS),
        }
    }

    /// Token lifetime in seconds
    #[must_use]
    pub fn ttl_seconds(&self) -> i64 {
        self.ttl.num_seconds()
    }

    /// Issue a token valid for the session TTL starting now
    pub fn issue(&self, claims: &Claims) -> Result<SessionToken> {
        self.issue_at(claims, Utc::now(), self.ttl)
    }

    /// Issue a token with an explicit issue time and lifetime
    pub fn issue_at(
        &self,
        claims: &Claims,
        issued_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<SessionToken> {
        let payload = TokenPayload {
            sub: claims.subject_id().to_string(),
            role: claims.role(),
            region_ids: claims.region_ids().clone(),
            email: claims.email().to_string(),
            iss: TOKEN_ISSUER.to_string(),
            iat: issued_at.timestamp(),
            exp: (issued_at + ttl).timestamp(),
            jti: uuid::Uuid::new_v4().to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &payload, &self.encoding_key)
            .map(SessionToken)
            .map_err(|e| PortalError::internal_with_source("Token generation failed", e))
    }

    /// Verify a raw token against the current time
    pub fn verify(&self, raw_token: &str) -> std::result::Result<Claims, AuthError> {
        self.verify_at(raw_token, Utc::now())
    }

    /// Verify a raw token against the given time
    ///
    /// Signature and structure are checked first, so a forged token is
    /// `TokenInvalid` even when its `exp` has passed.
    pub fn verify_at(
        &self,
        raw_token: &str,
        now: DateTime<Utc>,
    ) -> std::result::Result<Claims, AuthError> {
        let data = decode::<TokenPayload>(raw_token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                tracing::debug!(
                    token = %sanitize_token(raw_token),
                    "session token rejected: {}",
                    e
                );
                AuthError::TokenInvalid
            })?;
        let payload = data.claims;

        let subject_id: i32 = payload.sub.parse().map_err(|_| AuthError::TokenInvalid)?;

        if now.timestamp() >= payload.exp {
            return Err(AuthError::TokenExpired);
        }

        Ok(Claims::new(
            subject_id,
            payload.role,
            payload.region_ids,
            payload.email,
        ))
    }
}
