//! Deterministic default covers for posts without a usable image.

use sha2::{Digest, Sha256};
use std::path::Path;

pub const COVER_COUNT: u64 = 100;
const COVER_DIRS: [&str; 2] = ["/image/cover", "/images/cover"];

/// Stable index in `1..=n` derived from `key` (the note's relative path).
pub fn stable_cover_index(key: &str, n: u64) -> u64 {
    let digest = Sha256::digest(key.as_bytes());
    let mut head = [0u8; 8];
    head.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(head) % n.max(1) + 1
}

/// Pick a cover under `<site_root>/source`, probing forward from the stable index with wrap-around
/// when numbers are missing. Falls back to the stable choice when no cover file exists at all.
pub fn default_cover_url(site_root: &Path, key: &str) -> String {
    let start = stable_cover_index(key, COVER_COUNT);
    let source = site_root.join("source");
    for offset in 0..COVER_COUNT {
        let i = (start - 1 + offset) % COVER_COUNT + 1;
        for dir in COVER_DIRS {
            let url = format!("{dir}/cover-{i}.jpg");
            if source.join(url.trim_start_matches('/')).exists() {
                return url;
            }
        }
    }
    format!("/images/cover/cover-{start}.jpg")
}
