//! Credential hashing for stored users.
//!
//! Every `password_hash` column holds an Argon2id PHC string produced here.
//! The work factor is fixed, so the same parameters are used for new
//! registrations and for password changes made through `/update`.

use anyhow::anyhow;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use tracing::error;

use crate::users::repo_types::User;

fn hasher() -> Argon2<'static> {
    Argon2::new(Algorithm::Argon2id, Version::V0x13, Params::default())
}

/// Hash a plaintext password into the form stored on [`User::password_hash`].
pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    hasher()
        .hash_password(plain.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| anyhow!("hash password: {e}"))
}

/// `Ok(false)` on mismatch; `Err` only when the stored hash is unreadable.
pub fn verify_password(plain: &str, stored: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(stored).map_err(|e| anyhow!("parse stored hash: {e}"))?;
    Ok(hasher().verify_password(plain.as_bytes(), &parsed).is_ok())
}

/// Check a login attempt against the user's stored hash.
pub fn credentials_match(user: &User, plain: &str) -> anyhow::Result<bool> {
    verify_password(plain, &user.password_hash).map_err(|e| {
        error!(error = %e, user_id = %user.id, "stored password hash is unreadable");
        e
    })
}
