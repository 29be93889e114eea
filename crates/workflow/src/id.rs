//! Random identifiers for generated file names.

use rand::Rng;

/// Symbols identifiers are drawn from.
pub const ALPHABET: &[u8; 62] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Length of upload identifiers (~125 bits of entropy).
pub const DEFAULT_ID_LEN: usize = 21;

/// Generates a `len`-character identifier from [`ALPHABET`] using a CSPRNG.
pub fn generate_id(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect()
}
