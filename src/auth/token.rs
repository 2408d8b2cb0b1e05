//! Signed identity tokens.
//!
//! Tokens are compact HS256 JWTs:
//!
//! ```text
//! base64url(header) "." base64url(claims) "." base64url(HMAC-SHA256(secret, header "." claims))
//! ```
//!
//! with claims `{"userId": <id>, "iat": <unix secs>, "exp": <unix secs>}`.
//! Nothing is stored server-side; a token is valid while its signature
//! matches the configured secret and the current time is before `exp`.
//!
//! # Example
//!
//! ```rust
//! use camwatch::auth::TokenService;
//!
//! let tokens = TokenService::new("a-long-random-process-secret");
//! let token = tokens.issue(7);
//! assert_eq!(tokens.verify(&token).unwrap(), 7);
//! ```

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::error::TokenError;
use crate::store::UserId;

type HmacSha256 = Hmac<Sha256>;

/// Default token lifetime: 24 hours.
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(24 * 60 * 60);

const ALGORITHM: &str = "HS256";

#[derive(Debug, Serialize, Deserialize)]
struct Header {
    alg: String,
    typ: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Claims {
    user_id: UserId,
    iat: u64,
    exp: u64,
}

/// Issues and verifies tokens with one process-wide secret.
#[derive(Clone)]
pub struct TokenService {
    secret_key: Vec<u8>,
    ttl: Duration,
}

impl TokenService {
    /// Create a token service with the default 24 hour lifetime.
    pub fn new(secret_key: impl AsRef<[u8]>) -> Self {
        Self::with_ttl(secret_key, DEFAULT_TOKEN_TTL)
    }

    pub fn with_ttl(secret_key: impl AsRef<[u8]>, ttl: Duration) -> Self {
        Self {
            secret_key: secret_key.as_ref().to_vec(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a token for `user_id`, valid for the configured lifetime from now.
    pub fn issue(&self, user_id: UserId) -> String {
        self.issue_at(user_id, unix_now())
    }

    /// Issue a token as if it had been issued at `issued_at` (Unix seconds).
    pub fn issue_at(&self, user_id: UserId, issued_at: u64) -> String {
        let header = Header {
            alg: ALGORITHM.to_string(),
            typ: "JWT".to_string(),
        };
        let claims = Claims {
            user_id,
            iat: issued_at,
            exp: issued_at.saturating_add(self.ttl.as_secs()),
        };

        let signing_input = format!("{}.{}", encode_segment(&header), encode_segment(&claims));
        let signature = URL_SAFE_NO_PAD.encode(self.compute_signature(&signing_input));
        format!("{}.{}", signing_input, signature)
    }

    /// Verify a token against the current time and return its user id.
    pub fn verify(&self, token: &str) -> Result<UserId, TokenError> {
        self.verify_at(token, unix_now())
    }

    /// Verify a token against an explicit clock (Unix seconds).
    pub fn verify_at(&self, token: &str, now: u64) -> Result<UserId, TokenError> {
        let mut segments = token.split('.');
        let (Some(header_b64), Some(claims_b64), Some(signature_b64), None) = (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) else {
            return Err(TokenError::Malformed);
        };

        let header: Header = decode_segment(header_b64)?;
        if header.alg != ALGORITHM {
            return Err(TokenError::UnsupportedAlgorithm(header.alg));
        }

        // Signature before claims: nothing in an unsigned payload is trusted
        let provided = URL_SAFE_NO_PAD
            .decode(signature_b64)
            .map_err(|_| TokenError::Malformed)?;
        let expected = self.compute_signature(&format!("{}.{}", header_b64, claims_b64));
        if !bool::from(provided.ct_eq(&expected)) {
            return Err(TokenError::InvalidSignature);
        }

        let claims: Claims = decode_segment(claims_b64)?;
        if now >= claims.exp {
            return Err(TokenError::Expired {
                expired_at: claims.exp,
                current_time: now,
            });
        }

        Ok(claims.user_id)
    }

    fn compute_signature(&self, signing_input: &str) -> Vec<u8> {
        let mut mac =
            HmacSha256::new_from_slice(&self.secret_key).expect("HMAC can take key of any size");
        mac.update(signing_input.as_bytes());
        mac.finalize().into_bytes().to_vec()
    }
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("secret_key", &"<redacted>")
            .field("ttl", &self.ttl)
            .finish()
    }
}

fn encode_segment<T: Serialize>(value: &T) -> String {
    // Serializing these plain structs cannot fail
    let json = serde_json::to_vec(value).unwrap_or_default();
    URL_SAFE_NO_PAD.encode(json)
}

fn decode_segment<T: for<'de> Deserialize<'de>>(segment: &str) -> Result<T, TokenError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_| TokenError::Malformed)?;
    serde_json::from_slice(&bytes).map_err(|_| TokenError::Malformed)
}

/// Current Unix time in seconds.
pub(crate) fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}
