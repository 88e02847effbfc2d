//! Opaque identifiers for agents, contexts and files.
//!
//! IDs are 16 lowercase hex characters drawn from 8 random bytes. There is
//! no registry and collisions are not detected: the 2^64 space is only
//! adequate because the store has a single local writer. Do not treat IDs as
//! cryptographically unique.

use sha2::{Digest, Sha256};
use std::sync::atomic::{AtomicU64, Ordering};

/// Number of random bytes behind each ID.
pub const ID_BYTES: usize = 8;

/// Length of a generated ID in characters.
pub const ID_LEN: usize = ID_BYTES * 2;

static FALLBACK_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Generate a fresh random ID.
pub fn generate_id() -> String {
    let mut bytes = [0u8; ID_BYTES];
    if getrandom::getrandom(&mut bytes).is_err() {
        bytes = fallback_bytes();
    }
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Derive ID bytes from the clock and a process-wide counter when the OS
/// random source is unavailable.
fn fallback_bytes() -> [u8; ID_BYTES] {
    let mut hasher = Sha256::new();
    hasher.update(
        chrono::Utc::now()
            .timestamp_nanos_opt()
            .unwrap_or(0)
            .to_le_bytes(),
    );
    hasher.update(FALLBACK_COUNTER.fetch_add(1, Ordering::Relaxed).to_le_bytes());
    hasher.update(std::process::id().to_le_bytes());
    let hash = hasher.finalize();

    let mut bytes = [0u8; ID_BYTES];
    bytes.copy_from_slice(&hash[..ID_BYTES]);
    bytes
}
