//! Cache Key Fingerprinting Module
//!
//! Derives deterministic, collision-resistant cache keys from an ordered
//! list of request-defining components.

use sha2::{Digest, Sha256};

// == Fingerprint ==
/// Hashes an ordered component list into a 64-character hex cache key.
///
/// Each component is fed to the digest followed by a single zero byte, so
/// component boundaries survive hashing: `["ab"]` and `["a", "b"]` produce
/// different keys, as do reorderings. Two requests collide only when their
/// component lists are identical.
pub fn fingerprint<S: AsRef<str>>(components: &[S]) -> String {
    let mut hasher = Sha256::new();
    for component in components {
        hasher.update(component.as_ref().as_bytes());
        hasher.update([0u8]);
    }
    let digest = hasher.finalize();
    format!("{digest:x}")
}
