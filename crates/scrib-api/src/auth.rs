//! Authentication: JWT issuance/verification and password hashing.
//!
//! Identity is resolved exactly once per request by the [`AuthUser`]
//! extractor; handlers receive the validated claims by value and never
//! re-parse the token or re-fetch the account row to establish identity.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use scrib_core::{Error, Result, User};

use crate::{ApiError, AppState};

/// Default token lifetime in hours.
pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 72;

/// HS256 key pair derived from the configured secret.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl JwtKeys {
    /// Build keys from the shared secret.
    pub fn from_secret(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }
}

/// Typed, validated JWT claims.
///
/// Carrying the user id in `sub` means handlers never look an account up
/// by email just to learn who is calling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Owning user id.
    pub sub: Uuid,
    /// Account email at issuance time.
    pub email: String,
    /// Issued-at, seconds since epoch.
    pub iat: i64,
    /// Expiry, seconds since epoch.
    pub exp: i64,
}

impl Claims {
    /// Claims for a freshly authenticated user.
    pub fn new(user: &User, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            sub: user.id,
            email: user.email.clone(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        }
    }
}

/// Sign a token for the given user.
pub fn issue_token(keys: &JwtKeys, user: &User, ttl: Duration) -> Result<String> {
    let claims = Claims::new(user, ttl);
    encode(&Header::default(), &claims, &keys.encoding)
        .map_err(|e| Error::Internal(format!("Failed to sign token: {}", e)))
}

/// Decode and validate a token, returning its claims.
pub fn verify_token(keys: &JwtKeys, token: &str) -> Result<Claims> {
    decode::<Claims>(token, &keys.decoding, &Validation::default())
        .map(|data| data.claims)
        .map_err(|e| Error::Unauthorized(format!("Invalid token: {}", e)))
}

/// The authenticated caller, resolved from the Bearer token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
}

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> std::result::Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok());

        let token = match auth_header {
            Some(header) if header.starts_with("Bearer ") => {
                header.trim_start_matches("Bearer ").trim()
            }
            _ => {
                return Err(ApiError::Unauthorized(
                    "Authentication required".to_string(),
                ))
            }
        };

        let claims = verify_token(&state.jwt, token)
            .map_err(|_| ApiError::Unauthorized("Invalid or expired token".to_string()))?;

        Ok(AuthUser {
            id: claims.sub,
            email: claims.email,
        })
    }
}

// =============================================================================
// PASSWORD HASHING
// =============================================================================

/// Hash a plaintext password with Argon2id and a fresh random salt.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| Error::Internal(format!("Failed to hash password: {}", e)))
}

/// Verify a plaintext password against a stored PHC hash string.
///
/// An unparseable stored hash counts as a failed verification rather
/// than an error; login must not distinguish the two cases.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: Uuid::new_v4(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            password_hash: String::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_token_roundtrip() {
        let keys = JwtKeys::from_secret(b"test-secret");
        let user = sample_user();

        let token = issue_token(&keys, &user, Duration::hours(1)).unwrap();
        let claims = verify_token(&keys, &token).unwrap();

        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.email, user.email);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let keys = JwtKeys::from_secret(b"test-secret");
        let user = sample_user();

        // Well past the default validation leeway.
        let token = issue_token(&keys, &user, Duration::hours(-2)).unwrap();
        assert!(verify_token(&keys, &token).is_err());
    }

    #[test]
    fn test_token_signed_with_other_secret_is_rejected() {
        let user = sample_user();
        let token =
            issue_token(&JwtKeys::from_secret(b"secret-a"), &user, Duration::hours(1)).unwrap();

        let err = verify_token(&JwtKeys::from_secret(b"secret-b"), &token).unwrap_err();
        assert!(matches!(err, Error::Unauthorized(_)));
    }

    #[test]
    fn test_garbage_token_is_rejected() {
        let keys = JwtKeys::from_secret(b"test-secret");
        assert!(verify_token(&keys, "not.a.token").is_err());
    }

    #[test]
    fn test_password_hash_verifies() {
        let hash = hash_password("hunter2hunter2").unwrap();
        assert!(verify_password("hunter2hunter2", &hash));
        assert!(!verify_password("wrong", &hash));
    }

    #[test]
    fn test_password_hashes_are_salted() {
        let a = hash_password("same-password").unwrap();
        let b = hash_password("same-password").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_unparseable_stored_hash_fails_verification() {
        assert!(!verify_password("anything", "not-a-phc-string"));
    }
}
