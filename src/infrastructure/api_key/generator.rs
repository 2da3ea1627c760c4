//! Secret generation for issued keys
//!
//! Secrets are random bytes encoded as URL-safe base64 and wrapped in
//! `SecretString` so they never reach logs or Debug output.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Utc};
use rand::distributions::Alphanumeric;
use rand::{Rng, RngCore};
use secrecy::SecretString;

use crate::domain::user::UserId;

/// Lower bound on secret entropy (256 bits)
pub const MIN_SECRET_BYTES: usize = 32;

const VAULT_NAME_SUFFIX_LEN: usize = 8;

/// Generator for key secrets and their vault entry names
#[derive(Debug, Clone)]
pub struct SecretGenerator {
    /// Optional prefix prepended to every secret (e.g. "kp_")
    prefix: String,
    /// Number of random bytes per secret
    secret_bytes: usize,
}

impl SecretGenerator {
    pub fn new() -> Self {
        Self {
            prefix: String::new(),
            secret_bytes: MIN_SECRET_BYTES,
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Set the number of random bytes. Values below 32 are raised to 32.
    pub fn with_secret_bytes(mut self, bytes: usize) -> Self {
        self.secret_bytes = bytes.max(MIN_SECRET_BYTES);
        self
    }

    pub fn secret_bytes(&self) -> usize {
        self.secret_bytes
    }

    /// Generate a new secret from the OS-seeded CSPRNG
    pub fn generate(&self) -> SecretString {
        let mut random_bytes = vec![0u8; self.secret_bytes];
        rand::thread_rng().fill_bytes(&mut random_bytes);

        let encoded = URL_SAFE_NO_PAD.encode(&random_bytes);
        SecretString::from(format!("{}{}", self.prefix, encoded))
    }

    /// Vault entry name for a new key: `api-{user}-{millis}-{suffix}`.
    ///
    /// The random suffix keeps names distinct for concurrent issuance by the
    /// same user within one millisecond.
    pub fn vault_entry_name(&self, user_id: &UserId, at: DateTime<Utc>) -> String {
        let suffix: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(VAULT_NAME_SUFFIX_LEN)
            .map(|c| char::from(c).to_ascii_lowercase())
            .collect();

        format!("api-{}-{}-{}", user_id, at.timestamp_millis(), suffix)
    }
}

impl Default for SecretGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Constant-time string comparison to prevent timing attacks
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let a_bytes = a.as_bytes();
    let b_bytes = b.as_bytes();

    let mut result = 0u8;

    for i in 0..a.len() {
        result |= a_bytes[i] ^ b_bytes[i];
    }

    result == 0
}
