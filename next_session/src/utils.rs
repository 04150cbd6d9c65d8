use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use ring::rand::SecureRandom;
use thiserror::Error;

/// Number of random bytes behind session ids and CSRF tokens.
pub(crate) const RANDOM_TOKEN_BYTES: usize = 32;

pub(crate) fn base64url_encode(input: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(input)
}

/// Generate `len` bytes from the system CSPRNG and return them base64url encoded (no padding).
pub fn gen_random_string(len: usize) -> Result<String, UtilError> {
    let rng = ring::rand::SystemRandom::new();
    let mut buf = vec![0u8; len];
    rng.fill(&mut buf)
        .map_err(|_| UtilError::Crypto("Failed to generate random string".to_string()))?;
    Ok(base64url_encode(&buf))
}

/// Shorten an opaque secret for log output.
pub(crate) fn redact(value: &str) -> String {
    let prefix: String = value.chars().take(6).collect();
    format!("{prefix}...")
}

#[derive(Debug, Error, Clone)]
pub enum UtilError {
    #[error("Crypto error: {0}")]
    Crypto(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gen_random_string_length() {
        // Given 32 random bytes
        let value = gen_random_string(32).expect("random generation should succeed");

        // Then the base64url (no pad) encoding is 43 characters long
        assert_eq!(value.len(), 43);
        assert!(
            value
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[test]
    fn test_gen_random_string_is_unique() {
        let a = gen_random_string(RANDOM_TOKEN_BYTES).unwrap();
        let b = gen_random_string(RANDOM_TOKEN_BYTES).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_redact_keeps_short_prefix() {
        assert_eq!(redact("abcdefghijkl"), "abcdef...");
        assert_eq!(redact("abc"), "abc...");
    }
}
