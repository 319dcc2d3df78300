//! Password digests. Only the hex SHA-256 of a password is ever stored.

use alloc::string::String;
use sha2::{Digest, Sha256};

/// Hex-encoded SHA-256 of `password`.
pub fn hash_password(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

/// Check `password` against a digest produced by [`hash_password`].
pub fn verify_password(password: &str, digest: &str) -> bool {
    hash_password(password) == digest
}
