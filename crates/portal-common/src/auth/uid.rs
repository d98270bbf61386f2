//! URL-safe encoding of account ids for reset links
//!
//! The id's decimal digits are base64url-encoded without padding, so user 42 becomes `NDI`.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use portal_core::UserId;

use crate::error::AppError;

pub fn encode_uid(id: UserId) -> String {
    URL_SAFE_NO_PAD.encode(id.to_string())
}

/// Decode a `uidb64` path segment
///
/// # Errors
/// Returns `InvalidToken` when the segment is not a base64url-encoded integer
pub fn decode_uid(uidb64: &str) -> Result<UserId, AppError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(uidb64.trim_end_matches('='))
        .map_err(|_| AppError::InvalidToken)?;
    let digits = String::from_utf8(bytes).map_err(|_| AppError::InvalidToken)?;
    digits.parse().map_err(|_| AppError::InvalidToken)
}
