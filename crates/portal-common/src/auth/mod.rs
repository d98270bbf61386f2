//! Authentication utilities

mod password;
mod reset_token;
mod uid;

pub use password::{
    hash_password, is_password_usable, make_unusable_password, password_problems,
    validate_password_strength, verify_password, PasswordService,
};
pub use reset_token::{PasswordResetTokens, ResetClaims, TokenType};
pub use uid::{decode_uid, encode_uid};
