//! Opaque tokens for password reset links.
//!
//! The raw token only ever leaves the server inside the reset email; the
//! database keeps its SHA-256 digest so a leaked table cannot be replayed.

use rand::RngCore;
use sha2::{Digest, Sha256};

const RESET_TOKEN_BYTES: usize = 32;

/// Generates a random 64 character hex token.
pub fn generate_reset_token() -> String {
    let mut bytes = [0u8; RESET_TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Hex encoded SHA-256 digest of `token`.
pub fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}
