//! Hash-based ID generation.
//!
//! IDs have the form `{prefix}-{hash}` (e.g. `dep-a3f8`), where the hash is
//! the base36 encoding of a SHA-256 digest over the seed, a timestamp, and a
//! retry nonce. The hash grows from 4 to 6 characters as more IDs are
//! registered, keeping collisions rare while IDs stay short.
//!
//! ```
//! use sanad::id_generation::IdGenerator;
//!
//! let mut generator = IdGenerator::new("ms");
//! let id = generator.generate("prj-1|Prototype").unwrap();
//! assert!(id.starts_with("ms-"));
//! ```

use chrono::Utc;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use thiserror::Error;
use tracing::{debug, warn};

const BASE36_CHARS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const MAX_NONCE: u32 = 100;
const MAX_HASH_LENGTH: usize = 6;

/// Prefix of project IDs
pub const PROJECT_ID_PREFIX: &str = "prj";

/// Prefix of milestone IDs
pub const MILESTONE_ID_PREFIX: &str = "ms";

/// Prefix of dependency IDs
pub const DEPENDENCY_ID_PREFIX: &str = "dep";

/// Errors that can occur during ID generation
#[derive(Debug, Error)]
pub enum IdGenerationError {
    /// All nonces collided even at the longest hash length
    #[error("Unable to generate unique ID after {attempts} attempts")]
    CollisionExhausted {
        /// Number of nonces tried
        attempts: u32,
    },
}

/// Hash-based ID generator with collision detection.
///
/// Remembers every ID it generated or was told about via
/// [`register_id`](Self::register_id).
#[derive(Debug, Clone)]
pub struct IdGenerator {
    prefix: String,
    existing_ids: HashSet<String>,
}

impl IdGenerator {
    /// Create a generator for IDs starting with `prefix-`
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            existing_ids: HashSet::new(),
        }
    }

    /// Register an existing ID to prevent collisions
    pub fn register_id(&mut self, id: impl Into<String>) {
        self.existing_ids.insert(id.into());
    }

    /// Number of known IDs
    pub fn known_ids(&self) -> usize {
        self.existing_ids.len()
    }

    /// Generate a new unique ID from a seed string.
    ///
    /// # Errors
    ///
    /// Returns `CollisionExhausted` if no unique ID could be found.
    pub fn generate(&mut self, seed: &str) -> Result<String, IdGenerationError> {
        let base_length = self.adaptive_length();

        for length in base_length..=MAX_HASH_LENGTH {
            for nonce in 0..MAX_NONCE {
                let id = self.hash_id(seed, nonce, length);
                if self.existing_ids.insert(id.clone()) {
                    if nonce > 0 {
                        debug!(nonce, length, "Generated unique ID after collision retries");
                    }
                    return Ok(id);
                }
            }
            warn!(
                length,
                max_nonce = MAX_NONCE,
                "All nonces exhausted, increasing ID length"
            );
        }

        Err(IdGenerationError::CollisionExhausted {
            attempts: MAX_NONCE,
        })
    }

    fn hash_id(&self, seed: &str, nonce: u32, length: usize) -> String {
        let timestamp = Utc::now().timestamp_nanos_opt().unwrap_or_default();
        let content = format!("{}|{}|{}|{}", self.prefix, seed, timestamp, nonce);

        let mut hasher = Sha256::new();
        hasher.update(content.as_bytes());
        let digest = hasher.finalize();

        format!("{}-{}", self.prefix, encode_base36(&digest[..8], length))
    }

    /// - 0-500 IDs: 4 chars
    /// - 501-1,500: 5 chars
    /// - 1,500+: 6 chars
    fn adaptive_length(&self) -> usize {
        match self.existing_ids.len() {
            0..=500 => 4,
            501..=1500 => 5,
            _ => MAX_HASH_LENGTH,
        }
    }
}

/// Encode up to 8 bytes as a fixed-length base36 string
fn encode_base36(bytes: &[u8], length: usize) -> String {
    let mut n = bytes
        .iter()
        .fold(0u64, |acc, &b| acc.wrapping_shl(8).wrapping_add(u64::from(b)));

    let mut out = Vec::with_capacity(length);
    while out.len() < length {
        out.push(char::from(BASE36_CHARS[(n % 36) as usize]));
        n /= 36;
    }
    out.iter().rev().collect()
}

/// Check that `id` looks like `{prefix}-{4..=6 base36 chars}`
pub fn validate_id(id: &str, prefix: &str) -> bool {
    let Some(hash) = id
        .strip_prefix(prefix)
        .and_then(|rest| rest.strip_prefix('-'))
    else {
        return false;
    };

    (4..=MAX_HASH_LENGTH).contains(&hash.len())
        && hash
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_base36_encoding_has_requested_length() {
        let encoded = encode_base36(&[0x12, 0x34, 0x56, 0x78], 5);
        assert_eq!(encoded.len(), 5);
        assert!(encoded.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_generated_ids_are_unique_and_valid() {
        let mut generator = IdGenerator::new("dep");
        let mut seen = HashSet::new();
        for _ in 0..200 {
            let id = generator.generate("ms-a|ms-b").unwrap();
            assert!(validate_id(&id, "dep"), "bad id {id}");
            assert!(seen.insert(id));
        }
        assert_eq!(generator.known_ids(), 200);
    }

    #[test]
    fn test_adaptive_length_grows() {
        let mut generator = IdGenerator::new("ms");
        assert_eq!(generator.adaptive_length(), 4);
        for i in 0..501 {
            generator.register_id(format!("ms-{i:04}"));
        }
        assert_eq!(generator.adaptive_length(), 5);
    }

    #[rstest]
    #[case::valid("ms-a3f8", "ms", true)]
    #[case::valid_six("dep-0a1b2c", "dep", true)]
    #[case::wrong_prefix("prj-a3f8", "ms", false)]
    #[case::too_short("ms-a3", "ms", false)]
    #[case::too_long("ms-a3f8a3f", "ms", false)]
    #[case::uppercase("ms-A3F8", "ms", false)]
    #[case::no_hyphen("msa3f8", "ms", false)]
    fn test_validate_id(#[case] id: &str, #[case] prefix: &str, #[case] expected: bool) {
        assert_eq!(validate_id(id, prefix), expected);
    }
}
