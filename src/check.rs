//! Check pipeline: discover pins, fetch latest versions, classify

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::tools::{PinError, ToolRegistry};
use crate::version::cache::ResponseCache;
use crate::version::checker::{VersionStatus, classify, normalize_latest};
use crate::version::fetcher::Fetcher;

/// One tool's state within a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolRecord {
    pub name: String,
    pub current_version: String,
    /// Normalized latest version; empty until checked or for manual tools
    pub latest_version: String,
    /// Pin file relative to the repository root
    pub source_file: PathBuf,
    pub status: VersionStatus,
}

impl ToolRecord {
    /// Record for a freshly discovered pin
    pub fn discovered(name: &str, current_version: &str, source_file: &Path) -> Self {
        Self {
            name: name.to_string(),
            current_version: current_version.to_string(),
            latest_version: String::new(),
            source_file: source_file.to_path_buf(),
            status: VersionStatus::Unchecked,
        }
    }

    /// Complete the record with the fetched latest version
    pub fn resolve(&mut self, latest: &str) {
        self.latest_version = normalize_latest(latest);
        self.status = classify(&self.current_version, &self.latest_version);
    }

    pub fn mark_manual(&mut self) {
        self.status = VersionStatus::Manual;
    }
}

/// Runs every registered tool through the pipeline, one at a time
pub struct VersionChecker<'a> {
    registry: &'a ToolRegistry,
    cache: &'a ResponseCache,
    fetcher: &'a dyn Fetcher,
    root: PathBuf,
}

impl<'a> VersionChecker<'a> {
    pub fn new(
        registry: &'a ToolRegistry,
        cache: &'a ResponseCache,
        fetcher: &'a dyn Fetcher,
        root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            registry,
            cache,
            fetcher,
            root: root.into(),
        }
    }

    /// Check all tools in registration order
    ///
    /// Tools whose pin file or pin line is missing are skipped with a warning.
    pub async fn run(&self) -> Vec<ToolRecord> {
        let mut records = Vec::with_capacity(self.registry.len());

        for tool in self.registry.iter() {
            let current = match tool.current_version(&self.root) {
                Ok(current) => current,
                Err(e) => {
                    if is_optional_pin_missing(&e) {
                        info!("Skipping {}: {}", tool.name(), e);
                    } else {
                        warn!("Skipping {}: {}", tool.name(), e);
                    }
                    continue;
                }
            };

            let mut record = ToolRecord::discovered(tool.name(), &current, &tool.pin().file);

            if tool.is_manual() {
                record.mark_manual();
            } else {
                let latest = tool.fetch_latest(self.cache, self.fetcher).await;
                record.resolve(&latest);
            }

            info!(
                "{}: current={} latest={} status={}",
                record.name, record.current_version, record.latest_version, record.status
            );
            records.push(record);
        }

        records
    }
}

/// A missing pin file means the feature is not part of this image
fn is_optional_pin_missing(error: &PinError) -> bool {
    matches!(error, PinError::MissingFile(_))
}
