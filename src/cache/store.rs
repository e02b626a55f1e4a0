//! Disk-backed store for raw fetched payloads
//!
//! Provides a `CacheStore` that persists one file per resource key, named by
//! a digest of the key, with the file's modification time serving as the
//! freshness signal. Writes go through a unique temp file and a rename so a
//! concurrent reader always sees a complete payload.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;
use thiserror::Error;

/// File name suffix for cached payloads
const ENTRY_SUFFIX: &str = ".http.raw";

/// Errors that can occur when reading or writing cached payloads
///
/// `NotFound` and `Storage` are deliberately distinct: an unreadable entry
/// must never be mistaken for a missing one, or disk problems would be
/// masked as extra network traffic.
#[derive(Debug, Error)]
pub enum CacheError {
    /// No entry has ever been stored for this key
    #[error("no cached entry for key: {key}")]
    NotFound { key: String },

    /// The entry (or the cache directory) could not be read or written
    #[error("cache storage failure: {0}")]
    Storage(#[from] io::Error),
}

/// Returns the deterministic fingerprint of a resource key
///
/// The fingerprint is the SHA-256 digest of the key rendered as lowercase
/// hex. It is stable across runs, which is what makes cache reuse work, and
/// collision-free for any practical set of URLs.
pub fn fingerprint(key: &str) -> String {
    hex::encode(Sha256::digest(key.as_bytes()))
}

/// Manages reading and writing raw payloads to disk
///
/// The store keeps one file per key in a single directory. Lookups are O(1)
/// because the file name is derived from the key's fingerprint. Entries are
/// overwritten wholesale on every successful fetch and never proactively
/// deleted here; cleanup is an operational concern.
#[derive(Debug, Clone)]
pub struct CacheStore {
    /// Directory where cached payloads are stored
    cache_dir: PathBuf,
}

impl CacheStore {
    /// Creates a new CacheStore using the XDG-compliant cache directory
    ///
    /// Uses `~/.cache/politefetch/` on Linux, or the equivalent path on other
    /// platforms. Returns `None` if no cache directory can be determined
    /// (e.g., no home directory).
    pub fn new() -> Option<Self> {
        let project_dirs = ProjectDirs::from("", "", "politefetch")?;
        let cache_dir = project_dirs.cache_dir().to_path_buf();
        Some(Self { cache_dir })
    }

    /// Creates a new CacheStore with a custom cache directory
    pub fn with_dir(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }

    /// Returns the directory this store writes into
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Returns the path of the entry for the given key
    fn entry_path(&self, key: &str) -> PathBuf {
        self.cache_dir
            .join(format!("{}{}", fingerprint(key), ENTRY_SUFFIX))
    }

    /// Ensures the cache directory exists
    fn ensure_dir(&self) -> io::Result<()> {
        fs::create_dir_all(&self.cache_dir)
    }

    /// Returns true iff an entry for `key` exists and is younger than `max_age`
    ///
    /// A non-existent entry is never fresh, regardless of `max_age`. Any I/O
    /// failure other than not-found is surfaced as `CacheError::Storage`.
    pub fn is_fresh(&self, key: &str, max_age: Duration) -> Result<bool, CacheError> {
        let metadata = match fs::metadata(self.entry_path(key)) {
            Ok(metadata) => metadata,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(false),
            Err(err) => return Err(CacheError::Storage(err)),
        };

        let stored_at = metadata.modified()?;
        match SystemTime::now().duration_since(stored_at) {
            Ok(age) => Ok(age < max_age),
            // Entry is dated in the future (clock stepped backwards); serve
            // it rather than refetch.
            Err(_) => Ok(true),
        }
    }

    /// Reads the stored payload for `key`
    ///
    /// # Returns
    /// * `Ok(bytes)` with the complete payload
    /// * `Err(CacheError::NotFound)` if no entry exists for the key
    /// * `Err(CacheError::Storage)` if an existing entry cannot be read
    pub fn read(&self, key: &str) -> Result<Vec<u8>, CacheError> {
        fs::read(self.entry_path(key)).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => CacheError::NotFound {
                key: key.to_string(),
            },
            _ => CacheError::Storage(err),
        })
    }

    /// Persists `payload` for `key`, replacing any prior entry
    ///
    /// The payload is written to a uniquely named temp file in the cache
    /// directory and renamed into place, so a concurrent reader sees either
    /// the old payload or the new one, never a partial write. Failures are
    /// reported to the caller; there are no retries here.
    pub fn write(&self, key: &str, payload: &[u8]) -> Result<(), CacheError> {
        self.ensure_dir()?;

        let mut tmp = NamedTempFile::new_in(&self.cache_dir)?;
        tmp.write_all(payload)?;
        tmp.persist(self.entry_path(key))
            .map_err(|err| CacheError::Storage(err.error))?;
        Ok(())
    }

    /// Returns when the entry for `key` was last written
    pub fn stored_at(&self, key: &str) -> Result<DateTime<Utc>, CacheError> {
        let metadata = fs::metadata(self.entry_path(key)).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => CacheError::NotFound {
                key: key.to_string(),
            },
            _ => CacheError::Storage(err),
        })?;
        Ok(DateTime::<Utc>::from(metadata.modified()?))
    }
}
