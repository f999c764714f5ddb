/// Bearer token issuance and verification
///
/// Tokens are JWTs signed with HS256 (HMAC-SHA256) asserting a single
/// subject: the authenticated user's id. Expiry is a fixed window from
/// issuance, read from configuration at service construction.
///
/// Verification is pure computation over the token and the in-memory keys;
/// it never touches storage. A valid token does NOT guarantee the subject
/// still exists; the auth middleware performs that lookup separately.
///
/// # Example
///
/// ```
/// use tasknest_shared::auth::jwt::TokenService;
/// use chrono::Duration;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let service = TokenService::new("a-secret-of-at-least-32-bytes-long", Duration::days(7));
///
/// let user_id = Uuid::new_v4();
/// let token = service.issue(user_id)?;
/// assert_eq!(service.verify(&token)?, user_id);
/// # Ok(())
/// # }
/// ```
use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Issuer claim stamped into every token
const ISSUER: &str = "tasknest";

/// Error type for token operations
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// The encoding could not be parsed as a token at all
    #[error("Malformed token: {0}")]
    Malformed(String),

    /// The signature does not verify against the current secret
    #[error("Invalid token signature")]
    InvalidSignature,

    /// Current time is past the encoded expiry
    #[error("Token has expired")]
    Expired,

    /// Failed to encode a new token
    #[error("Failed to create token: {0}")]
    CreateError(String),
}

/// JWT claims carried by a TaskNest bearer token
///
/// - `sub`: Subject (user id)
/// - `iss`: Issuer (always "tasknest")
/// - `iat`: Issued at (Unix timestamp)
/// - `exp`: Expiration (Unix timestamp)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - user id
    pub sub: Uuid,

    /// Issuer
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Creates claims for a subject expiring `ttl` from now
    pub fn new(subject: Uuid, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            sub: subject,
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        }
    }

    /// Checks if the claims are already past expiry
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// Issues and verifies signed, time-limited bearer tokens
///
/// Holds the signing keys and expiry window in memory. The keys are derived
/// from the configured secret once at construction; nothing in this service
/// reads global state, so rotating the secret means building a new instance.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl TokenService {
    /// Creates a token service from the signing secret and expiry window
    ///
    /// The secret should be at least 32 bytes for HS256; length is enforced
    /// at the configuration boundary, not here.
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    /// Issues a signed token asserting `subject`
    ///
    /// Pure encoding; no side effects beyond the signature itself.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::CreateError` if encoding fails.
    pub fn issue(&self, subject: Uuid) -> Result<String, TokenError> {
        let claims = Claims::new(subject, self.ttl);
        let header = Header::new(Algorithm::HS256);

        encode(&header, &claims, &self.encoding_key)
            .map_err(|e| TokenError::CreateError(format!("Token encoding failed: {}", e)))
    }

    /// Verifies a token and returns its subject id
    ///
    /// Checks, in order of the error variants:
    /// - the encoding parses (`Malformed` otherwise)
    /// - the HS256 signature matches (`InvalidSignature` otherwise)
    /// - the current time is before `exp` (`Expired` otherwise)
    ///
    /// Success means only that the token is authentic and current. Whether
    /// the subject still exists is a separate storage lookup owned by the
    /// caller.
    pub fn verify(&self, token: &str) -> Result<Uuid, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[ISSUER]);
        validation.validate_exp = true;

        let token_data =
            decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
                use jsonwebtoken::errors::ErrorKind;
                match e.kind() {
                    ErrorKind::ExpiredSignature => TokenError::Expired,
                    ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                    _ => TokenError::Malformed(format!("Token validation failed: {}", e)),
                }
            })?;

        Ok(token_data.claims.sub)
    }

    /// Expiry window tokens from this service are issued with
    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}
