//! Non-cryptographic random helpers for identifiers and test data.

use rand::Rng;

const CHARACTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0987654321";

/// Random integer in `min..=max`.
///
/// # Panics
///
/// Panics if `min > max`.
pub fn random_int(min: i64, max: i64) -> i64 {
    rand::rng().random_range(min..=max)
}

/// Random alphanumeric string of `len` characters.
pub fn random_string(len: usize) -> String {
    let mut rng = rand::rng();
    (0..len)
        .map(|_| char::from(CHARACTERS[rng.random_range(0..CHARACTERS.len())]))
        .collect()
}
