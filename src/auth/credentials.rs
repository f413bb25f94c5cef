use rand::rngs::OsRng;
use rand::seq::SliceRandom;
use rand::{Rng, RngCore};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::config;

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("Password hashing failed: {0}")]
    Hashing(#[from] bcrypt::BcryptError),
}

const UPPERCASE: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const LOWERCASE: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const DIGITS: &[u8] = b"0123456789";
const SYMBOLS: &[u8] = b"!@#$%^&*()-_=+[]{}<>?";

/// One-way adaptive hash. Non-deterministic: bcrypt embeds a fresh salt.
pub fn hash_password(plaintext: &str) -> Result<String, CredentialError> {
    let cost = config::config().security.bcrypt_cost;
    Ok(bcrypt::hash(plaintext, cost)?)
}

/// Verify a plaintext password against a stored bcrypt hash.
/// A malformed hash reads as a mismatch, never an error.
pub fn verify_password(plaintext: &str, hash: &str) -> bool {
    bcrypt::verify(plaintext, hash).unwrap_or(false)
}

/// Cryptographically secure random token, hex encoded.
/// Used for email verification, password reset, and share-grant tokens.
pub fn generate_token(byte_length: usize) -> String {
    let mut bytes = vec![0u8; byte_length];
    OsRng.fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Produce a password that satisfies validate_password by construction:
/// 3 uppercase, 3 digits, 2 symbols, 4 lowercase, securely shuffled.
pub fn generate_secure_password() -> String {
    let mut chars: Vec<u8> = Vec::with_capacity(12);

    let mut pick = |set: &[u8], count: usize, out: &mut Vec<u8>| {
        for _ in 0..count {
            out.push(set[OsRng.gen_range(0..set.len())]);
        }
    };

    pick(UPPERCASE, 3, &mut chars);
    pick(DIGITS, 3, &mut chars);
    pick(SYMBOLS, 2, &mut chars);
    pick(LOWERCASE, 4, &mut chars);

    chars.shuffle(&mut OsRng);
    String::from_utf8(chars).expect("password alphabet is ascii")
}

/// Fail-fast strength policy: length >= 8, at least one uppercase letter,
/// one digit, and one non-alphanumeric symbol. Returns the first failing
/// rule's message.
pub fn validate_password(plaintext: &str) -> Result<(), &'static str> {
    if plaintext.len() < 8 {
        return Err("Password must be at least 8 characters long");
    }
    if !plaintext.chars().any(|c| c.is_ascii_uppercase()) {
        return Err("Password must contain at least one uppercase letter");
    }
    if !plaintext.chars().any(|c| c.is_ascii_digit()) {
        return Err("Password must contain at least one digit");
    }
    if !plaintext.chars().any(|c| !c.is_alphanumeric()) {
        return Err("Password must contain at least one special character");
    }
    Ok(())
}

/// Deterministic sha-256 hex digest. The session store only ever holds
/// digests, never usable bearer tokens.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}
