//! Purpose tokens for email verification and password reset.
//!
//! Short-lived JWTs whose `fp` claim fingerprints the user state the
//! token is bound to. Any change to that state — the flag flips, the
//! email changes, the password changes — invalidates every outstanding
//! token without server-side bookkeeping.

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::model::User;
use crate::service::{AccountError, AccountService};

pub const PURPOSE_EMAIL_VERIFY: &str = "email_verify";
pub const PURPOSE_PASSWORD_RESET: &str = "password_reset";

/// Claims carried by a purpose token.
#[derive(Debug, Serialize, Deserialize)]
pub struct PurposeClaims {
    pub sub: String,
    pub purpose: String,
    pub fp: String,
    pub iat: i64,
    pub exp: i64,
}

fn fingerprint(parts: &[&str]) -> String {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part.as_bytes());
        hasher.update(b"\n");
    }
    hex::encode(hasher.finalize())
}

/// State bound by an email verification token.
pub(crate) fn email_verify_fingerprint(user: &User) -> String {
    fingerprint(&[
        &user.id,
        &user.email,
        if user.is_email_verified { "1" } else { "0" },
    ])
}

/// State bound by a password reset token.
pub(crate) fn password_reset_fingerprint(user: &User) -> String {
    fingerprint(&[&user.id, &user.password_hash, &user.password_updated_at])
}

impl AccountService {
    pub(crate) fn issue_purpose_token(
        &self,
        user: &User,
        purpose: &str,
        fp: String,
        ttl: i64,
    ) -> Result<String, AccountError> {
        let now = chrono::Utc::now().timestamp();
        let claims = PurposeClaims {
            sub: user.id.clone(),
            purpose: purpose.to_string(),
            fp,
            iat: now,
            exp: now + ttl,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .map_err(|e| AccountError::Internal(format!("JWT encode failed: {}", e)))
    }

    /// Verify a purpose token against the user's current state.
    pub(crate) fn check_purpose_token(
        &self,
        user: &User,
        token: &str,
        purpose: &str,
        expected_fp: &str,
    ) -> Result<(), AccountError> {
        let token_data = decode::<PurposeClaims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|_| AccountError::Unauthorized("invalid or expired token".into()))?;

        let claims = token_data.claims;
        if claims.purpose != purpose || claims.sub != user.id || claims.fp != expected_fp {
            return Err(AccountError::Unauthorized("invalid or expired token".into()));
        }

        Ok(())
    }
}
