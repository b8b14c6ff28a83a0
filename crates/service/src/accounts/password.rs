//! Salted PBKDF2-HMAC-SHA512 password hashing.
//!
//! Hash and salt are stored hex-encoded. The salt's hex text (not the raw
//! bytes) is the PBKDF2 salt input, which keeps tables written by earlier
//! EmuDock builds verifiable.

use pbkdf2::pbkdf2_hmac;
use rand::{rngs::OsRng, RngCore};
use sha2::Sha512;

pub const PBKDF2_ITERATIONS: u32 = 10_000;

/// Derived key length in bytes.
pub const HASH_LENGTH: usize = 64;

/// Random salt length in bytes (before hex encoding).
pub const SALT_LENGTH: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordDigest {
    pub hash: String,
    pub salt: String,
}

pub fn generate_salt() -> String {
    let mut bytes = [0u8; SALT_LENGTH];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

pub fn derive_hash(password: &str, salt: &str) -> String {
    let mut key = [0u8; HASH_LENGTH];
    pbkdf2_hmac::<Sha512>(password.as_bytes(), salt.as_bytes(), PBKDF2_ITERATIONS, &mut key);
    hex::encode(key)
}

/// Hash with a fresh random salt.
pub fn hash_password(password: &str) -> PasswordDigest {
    let salt = generate_salt();
    let hash = derive_hash(password, &salt);
    PasswordDigest { hash, salt }
}

/// Re-derive with the stored salt and compare against the stored hash.
pub fn verify_password(password: &str, hash: &str, salt: &str) -> bool {
    let candidate = derive_hash(password, salt);
    constant_time_eq(candidate.as_bytes(), hash.as_bytes())
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
