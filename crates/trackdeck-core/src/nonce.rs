//! Random nonce generation for CSRF state tokens.
//!
//! The authorization flow issues a fresh nonce per login attempt and accepts
//! a callback only when it echoes the exact value back. Nonces are
//! single-use and short-lived, so no uniqueness guarantee beyond the
//! birthday bound of the random source is needed.

use rand::Rng;
use rand::distr::Alphanumeric;

/// Nonce length used for authorization-flow state tokens.
pub const STATE_NONCE_LEN: usize = 16;

/// Generates a random alphanumeric string of the given length.
///
/// Values are drawn uniformly from the 62-symbol `[A-Za-z0-9]` alphabet
/// using the thread-local RNG, which is cryptographically secure.
pub fn nonce(length: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nonce_has_requested_length() {
        assert_eq!(nonce(STATE_NONCE_LEN).len(), 16);
        assert_eq!(nonce(43).len(), 43);
        assert!(nonce(0).is_empty());
    }

    #[test]
    fn nonce_is_alphanumeric() {
        let value = nonce(256);
        assert!(value.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn nonce_is_random() {
        assert_ne!(nonce(STATE_NONCE_LEN), nonce(STATE_NONCE_LEN));
    }
}
