//! Stable contact pseudonyms.

use sha2::{Digest, Sha256};

const BUCKETS: u64 = 10_000;

/// `user_<n>` with `n` taken from the first eight bytes of the SHA-256 of
/// `name`, big-endian, modulo 10 000. Deterministic across runs and
/// platforms; distinct names may collide.
pub fn pseudonymize(name: &str) -> String {
  let digest = Sha256::digest(name.as_bytes());
  let mut head = [0u8; 8];
  head.copy_from_slice(&digest[..8]);
  format!("user_{}", u64::from_be_bytes(head) % BUCKETS)
}
