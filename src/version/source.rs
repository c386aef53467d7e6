//! Upstream version sources and fallback resolution

use tracing::{debug, warn};

use crate::version::cache::ResponseCache;
use crate::version::extract::Extractor;
use crate::version::fetcher::Fetcher;

/// An endpoint and the way to read a version out of it
#[derive(Debug, Clone)]
pub struct VersionSource {
    pub url: String,
    pub extractor: Extractor,
    /// Prefix removed from the extracted value (e.g. "v", "go")
    pub trim_prefix: Option<String>,
}

impl VersionSource {
    pub fn new(url: impl Into<String>, extractor: Extractor) -> Self {
        Self {
            url: url.into(),
            extractor,
            trim_prefix: None,
        }
    }

    pub fn trim_prefix(mut self, prefix: &str) -> Self {
        self.trim_prefix = Some(prefix.to_string());
        self
    }

    /// Extract a version from `body`, applying the prefix trim
    pub fn extract(&self, body: &str) -> Option<String> {
        let version = self.extractor.extract(body)?;
        let version = match &self.trim_prefix {
            Some(prefix) => version
                .strip_prefix(prefix.as_str())
                .map(str::to_string)
                .unwrap_or(version),
            None => version,
        };
        (!version.is_empty()).then_some(version)
    }
}

/// Resolve the latest version by trying each source in order
///
/// An empty response or a failed extraction falls through to the next
/// source. Returns an empty string when every source fails.
pub async fn resolve_latest(
    sources: &[VersionSource],
    cache: &ResponseCache,
    fetcher: &dyn Fetcher,
) -> String {
    for (i, source) in sources.iter().enumerate() {
        let body = cache.get_or_fetch(fetcher, &source.url).await;
        if body.is_empty() {
            debug!("No response from source #{} ({})", i + 1, source.url);
            continue;
        }

        match source.extract(&body) {
            Some(version) => return version,
            None => warn!("Could not extract a version from {}", source.url),
        }
    }

    String::new()
}
