//! Bearer token verification
//!
//! # Token format
//!
//! ```text
//! <subject>.<expires_at_ms>.<signature>
//! ```
//!
//! - `subject`: caller identity (may not contain `.`)
//! - `expires_at_ms`: Unix epoch milliseconds after which the token is rejected
//! - `signature`: lowercase hex HMAC-SHA256 of `<subject>.<expires_at_ms>`
//!   keyed with the shared token secret
//!
//! Tokens are issued by an external mechanism that holds the same secret.
//! [`issue_token`] exists for operators and tests.
//!
//! This module contains ONLY pure functions.
//! No HTTP framework dependencies - the axum middleware lives in alp-api.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

// ========================================
// Error Types
// ========================================

/// Authentication error types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiAuthError {
    /// No `Authorization` header present
    MissingToken,

    /// Header present but not `Bearer <token>`, or token not three segments
    MalformedToken(String),

    /// Signature does not match
    InvalidSignature,

    /// Token expiry is in the past
    Expired { expires_at: i64, now: i64 },
}

impl std::fmt::Display for ApiAuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiAuthError::MissingToken => write!(f, "Missing bearer token"),
            ApiAuthError::MalformedToken(reason) => write!(f, "Malformed token: {}", reason),
            ApiAuthError::InvalidSignature => write!(f, "Invalid token signature"),
            ApiAuthError::Expired { expires_at, now } => {
                write!(f, "Token expired {}ms ago", now - expires_at)
            }
        }
    }
}

impl std::error::Error for ApiAuthError {}

/// Verified token contents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenClaims {
    pub subject: String,
    pub expires_at: i64,
}

// ========================================
// Signing
// ========================================

/// Calculate the hex signature for a subject/expiry pair
pub fn sign(subject: &str, expires_at: i64, secret: &str) -> Result<String, ApiAuthError> {
    let mut mac = keyed_mac(secret)?;
    mac.update(signing_input(subject, expires_at).as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

fn keyed_mac(secret: &str) -> Result<HmacSha256, ApiAuthError> {
    match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(mac) => Ok(mac),
        Err(_) => Err(ApiAuthError::InvalidSignature),
    }
}

/// Issue a token for `subject` valid until `expires_at` (Unix ms)
///
/// # Examples
///
/// ```
/// use alp_common::api::auth::{issue_token, verify_token};
///
/// let token = issue_token("instructor-42", 2_000_000_000_000, "secret").unwrap();
/// let claims = verify_token(&token, "secret", 1_900_000_000_000).unwrap();
/// assert_eq!(claims.subject, "instructor-42");
/// ```
pub fn issue_token(subject: &str, expires_at: i64, secret: &str) -> Result<String, ApiAuthError> {
    if subject.is_empty() || subject.contains('.') {
        return Err(ApiAuthError::MalformedToken(
            "subject must be non-empty and must not contain '.'".to_string(),
        ));
    }
    Ok(format!(
        "{}.{}",
        signing_input(subject, expires_at),
        sign(subject, expires_at, secret)?
    ))
}

fn signing_input(subject: &str, expires_at: i64) -> String {
    format!("{}.{}", subject, expires_at)
}

// ========================================
// Verification
// ========================================

/// Extract the token from an `Authorization` header value
pub fn parse_bearer(header: Option<&str>) -> Result<&str, ApiAuthError> {
    let header = header.ok_or(ApiAuthError::MissingToken)?;
    let (scheme, token) = header
        .split_once(' ')
        .ok_or_else(|| ApiAuthError::MalformedToken("expected 'Bearer <token>'".to_string()))?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(ApiAuthError::MalformedToken(format!(
            "unsupported scheme '{}'",
            scheme
        )));
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(ApiAuthError::MissingToken);
    }
    Ok(token)
}

/// Verify a token against the secret at time `now` (Unix ms)
pub fn verify_token(token: &str, secret: &str, now: i64) -> Result<TokenClaims, ApiAuthError> {
    let mut parts = token.splitn(3, '.');
    let (subject, expires_at, signature) = match (parts.next(), parts.next(), parts.next()) {
        (Some(s), Some(e), Some(sig)) if !s.is_empty() => (s, e, sig),
        _ => {
            return Err(ApiAuthError::MalformedToken(
                "expected three '.'-separated segments".to_string(),
            ))
        }
    };

    let expires_at: i64 = expires_at
        .parse()
        .map_err(|_| ApiAuthError::MalformedToken("expiry is not an integer".to_string()))?;

    let provided = hex::decode(signature)
        .map_err(|_| ApiAuthError::MalformedToken("signature is not hex".to_string()))?;

    let mut mac = keyed_mac(secret)?;
    mac.update(signing_input(subject, expires_at).as_bytes());
    // Constant-time comparison
    mac.verify_slice(&provided)
        .map_err(|_| ApiAuthError::InvalidSignature)?;

    if expires_at <= now {
        return Err(ApiAuthError::Expired { expires_at, now });
    }

    Ok(TokenClaims {
        subject: subject.to_string(),
        expires_at,
    })
}

/// Verify an `Authorization` header value at the current time
pub fn verify_authorization(header: Option<&str>, secret: &str) -> Result<TokenClaims, ApiAuthError> {
    let token = parse_bearer(header)?;
    verify_token(token, secret, chrono::Utc::now().timestamp_millis())
}

// ========================================
// Tests
// ========================================
