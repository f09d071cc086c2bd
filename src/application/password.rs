//! Password hashing. Argon2id in PHC string format; callers only ever see
//! the opaque hash string.

use argon2::{Argon2, PasswordHasher, password_hash::SaltString};

use crate::app_error::{AppError, AppResult};

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut rand::rngs::OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("password hashing failed: {e}")))
}
