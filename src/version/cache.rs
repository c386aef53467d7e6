use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::version::error::CacheError;
use crate::version::fetcher::Fetcher;

/// Flat-file cache of HTTP response bodies
///
/// Each entry lives at `<dir>/<sha256(url)>`; its mtime is the fetch time.
/// Stale entries are ignored but never deleted, and writes are not atomic:
/// concurrent runs against the same directory race and the last writer wins.
pub struct ResponseCache {
    dir: PathBuf,
    ttl: Duration,
    read_enabled: bool,
}

impl ResponseCache {
    pub fn new(dir: impl Into<PathBuf>, ttl: Duration) -> Self {
        let dir = dir.into();
        info!("Using response cache at {:?} (ttl {}s)", dir, ttl.as_secs());
        Self {
            dir,
            ttl,
            read_enabled: true,
        }
    }

    /// Disables cache reads. Successful fetches are still written.
    pub fn without_reads(mut self) -> Self {
        self.read_enabled = false;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Cache key for a URL: lowercase hex SHA-256
    pub fn key(url: &str) -> String {
        hex::encode(Sha256::digest(url.as_bytes()))
    }

    pub fn entry_path(&self, url: &str) -> PathBuf {
        self.dir.join(Self::key(url))
    }

    /// Returns the cached body if the entry exists and is younger than the TTL
    pub fn read_fresh(&self, url: &str) -> Result<Option<String>, CacheError> {
        let path = self.entry_path(url);

        let metadata = match std::fs::metadata(&path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let modified = metadata.modified()?;
        // mtime in the future counts as fresh
        let age = SystemTime::now()
            .duration_since(modified)
            .unwrap_or(Duration::ZERO);

        if age >= self.ttl {
            debug!("Cache entry for {} is stale ({}s old)", url, age.as_secs());
            return Ok(None);
        }

        Ok(Some(std::fs::read_to_string(&path)?))
    }

    /// Overwrites the entry for `url`. Empty bodies are not stored.
    pub fn store(&self, url: &str, body: &str) -> Result<(), CacheError> {
        if body.is_empty() {
            return Ok(());
        }

        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(self.entry_path(url), body)?;
        debug!("Cached {} bytes for {}", body.len(), url);
        Ok(())
    }

    /// Returns fresh cached content or delegates to `fetcher`
    ///
    /// Cache I/O failures are logged and treated as a miss; the result is an
    /// empty string whenever the fetch fails.
    pub async fn get_or_fetch(&self, fetcher: &dyn Fetcher, url: &str) -> String {
        if self.read_enabled {
            match self.read_fresh(url) {
                Ok(Some(body)) => {
                    debug!("Cache hit for {}", url);
                    return body;
                }
                Ok(None) => {}
                Err(e) => warn!("Failed to read cache entry for {}: {}", url, e),
            }
        }

        let body = fetcher.fetch(url).await;

        if let Err(e) = self.store(url, &body) {
            warn!("Failed to write cache entry for {}: {}", url, e);
        }

        body
    }
}
