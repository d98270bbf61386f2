//! Password-reset tokens
//!
//! A reset token is an HS256 JWT whose `fp` claim is an HMAC over the account's
//! current password hash, last login and email. Setting a new password (or logging in)
//! changes that state, so a token works at most once and only until `exp`.

use chrono::{Duration, Utc};
use jsonwebtoken::{crypto, decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use portal_core::{User, UserId};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Token type enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    PasswordReset,
}

/// Reset token claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetClaims {
    /// Subject (user ID)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    pub token_type: TokenType,
    /// Fingerprint of the account state the token was issued for
    pub fp: String,
}

impl ResetClaims {
    /// Get the user ID the token was issued for
    ///
    /// # Errors
    /// Returns an error if the subject is not numeric
    pub fn user_id(&self) -> Result<UserId, AppError> {
        self.sub.parse().map_err(|_| AppError::InvalidToken)
    }
}

/// Issues and checks password-reset tokens
#[derive(Clone)]
pub struct PasswordResetTokens {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    timeout_seconds: i64,
}

impl PasswordResetTokens {
    #[must_use]
    pub fn new(secret: &str, timeout_seconds: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            timeout_seconds,
        }
    }

    #[must_use]
    pub fn timeout_seconds(&self) -> i64 {
        self.timeout_seconds
    }

    /// Issue a token for `user` whose stored hash is `password_hash`
    ///
    /// # Errors
    /// Returns an error if signing fails
    pub fn make_token(&self, user: &User, password_hash: &str) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = ResetClaims {
            sub: user.id.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(self.timeout_seconds)).timestamp(),
            token_type: TokenType::PasswordReset,
            fp: self.fingerprint(user, password_hash)?,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|_| AppError::Internal(anyhow::anyhow!("Failed to encode reset token")))
    }

    /// Check a token against the account's current state
    ///
    /// # Errors
    /// `TokenExpired` once `exp` has passed, `InvalidToken` for anything else that does not match
    pub fn check_token(&self, user: &User, password_hash: &str, token: &str) -> Result<(), AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let claims = decode::<ResetClaims>(token, &self.decoding_key, &validation)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AppError::TokenExpired,
                _ => AppError::InvalidToken,
            })?
            .claims;

        if claims.token_type != TokenType::PasswordReset || claims.user_id()? != user.id {
            return Err(AppError::InvalidToken);
        }

        let matches = crypto::verify(
            &claims.fp,
            Self::state(user, password_hash).as_bytes(),
            &self.decoding_key,
            Algorithm::HS256,
        )
        .map_err(|_| AppError::InvalidToken)?;

        if matches {
            Ok(())
        } else {
            Err(AppError::InvalidToken)
        }
    }

    fn fingerprint(&self, user: &User, password_hash: &str) -> Result<String, AppError> {
        crypto::sign(
            Self::state(user, password_hash).as_bytes(),
            &self.encoding_key,
            Algorithm::HS256,
        )
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Failed to sign reset fingerprint")))
    }

    // Seconds resolution so the value survives a database round trip.
    fn state(user: &User, password_hash: &str) -> String {
        let last_login = user
            .last_login
            .map(|at| at.timestamp().to_string())
            .unwrap_or_default();
        format!("{}:{password_hash}:{last_login}:{}", user.id, user.email)
    }
}

impl std::fmt::Debug for PasswordResetTokens {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordResetTokens")
            .field("timeout_seconds", &self.timeout_seconds)
            .finish_non_exhaustive()
    }
}
