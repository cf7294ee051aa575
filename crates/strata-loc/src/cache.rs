//! On-disk memoization of parsed loc reports.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use strata_core::Result;

use crate::cloc::LocRecord;

/// Caches parsed cloc reports keyed by the exact invocation.
///
/// Counting lines over a large tree is the slowest step of an analysis
/// session, so parsed records are written to a JSON document under the
/// cache directory. The key is a SHA-256 digest of the program name and
/// arguments: any change to either misses.
///
/// # Examples
///
/// ```
/// use strata_loc::LocCache;
///
/// let key = LocCache::key("cloc", &["--csv", "--by-file", "."]);
/// assert_eq!(key.len(), 64);
/// assert_ne!(key, LocCache::key("cloc", &["--csv", "--by-file", "src"]));
/// ```
#[derive(Debug, Clone)]
pub struct LocCache {
    dir: PathBuf,
}

#[derive(Serialize, Deserialize)]
struct CacheEntry {
    created: DateTime<Utc>,
    command: String,
    records: Vec<LocRecord>,
}

impl LocCache {
    /// A cache rooted at `dir`; the directory is created on first store.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Digest of an invocation, in lowercase hex.
    pub fn key(program: &str, args: &[&str]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(program.as_bytes());
        for arg in args {
            hasher.update([0u8]);
            hasher.update(arg.as_bytes());
        }
        let digest = hasher.finalize();
        format!("{digest:x}")
    }

    /// Fetch cached records for `key`, or `None` on miss or any read /
    /// decode failure (a corrupt entry is just a miss).
    pub fn load(&self, key: &str) -> Option<Vec<LocRecord>> {
        let content = std::fs::read_to_string(self.entry_path(key)).ok()?;
        let entry: CacheEntry = serde_json::from_str(&content).ok()?;
        Some(entry.records)
    }

    /// Persist `records` under `key`, recording the originating command
    /// line for inspection.
    ///
    /// # Errors
    ///
    /// Returns an error when the cache directory or entry cannot be
    /// written.
    pub fn store(&self, key: &str, command: &str, records: &[LocRecord]) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let entry = CacheEntry {
            created: Utc::now(),
            command: command.to_string(),
            records: records.to_vec(),
        };
        let json = serde_json::to_string_pretty(&entry)?;
        std::fs::write(self.entry_path(key), json)?;
        Ok(())
    }

    /// Location of the cache directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("loc-{key}.json"))
    }
}
