use sha2::{Digest, Sha256};

/// Stable content-derived id with a readable prefix, e.g. `ledger-<sha256>`.
pub fn compute_mdhash_id(content: &str, prefix: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{prefix}{:x}", hasher.finalize())
}
