/// Password hashing and verification with bcrypt.

use crate::error::AppError;

/// Work factor for hashing user passwords. Fixed: bumping it only affects
/// hashes created afterwards, existing ones verify at their stored cost.
pub const PASSWORD_HASH_COST: u32 = 11;

/// Hash a password.
///
/// An internal bcrypt failure is fatal to the calling operation and is never
/// retried.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    bcrypt::hash(password, PASSWORD_HASH_COST).map_err(|e| AppError::Hashing(e.to_string()))
}

/// Check a password against a stored hash.
///
/// Any internal verification error is treated as a non-match.
pub fn password_match(hash: &str, password: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or(false)
}
