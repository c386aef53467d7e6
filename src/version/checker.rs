//! Version comparison for tool pins

use serde::{Deserialize, Serialize};

/// Placeholder for a latest version that could not be determined
pub const ERROR_SENTINEL: &str = "error";

/// Status of a tool pin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VersionStatus {
    /// Pin discovered, remote check not done yet
    Unchecked,
    /// Pin matches the latest upstream version
    Current,
    /// A newer upstream version exists
    Outdated,
    /// Latest version could not be determined
    Error,
    /// No automated source; must be checked by hand
    Manual,
}

impl VersionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VersionStatus::Unchecked => "unchecked",
            VersionStatus::Current => "current",
            VersionStatus::Outdated => "outdated",
            VersionStatus::Error => "error",
            VersionStatus::Manual => "manual",
        }
    }
}

impl std::fmt::Display for VersionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Replaces unusable fetch results with [`ERROR_SENTINEL`]
///
/// Empty, `null` and `undefined` values come from failed fetches or from
/// JSON queries against a response of the wrong shape.
pub fn normalize_latest(latest: &str) -> String {
    let trimmed = latest.trim();
    match trimmed {
        "" | "null" | "undefined" => ERROR_SENTINEL.to_string(),
        _ => trimmed.to_string(),
    }
}

/// Whether `current` denotes `latest`
///
/// Exact equality, or a partial pin: `latest` starts with `current` followed
/// by a dot. "22" matches "22.18.0" but not "220.0.0".
pub fn version_matches(current: &str, latest: &str) -> bool {
    if current == latest {
        return true;
    }
    latest
        .strip_prefix(current)
        .is_some_and(|rest| rest.starts_with('.'))
}

/// Classify a pin against the latest upstream version
pub fn classify(current: &str, latest: &str) -> VersionStatus {
    if latest.is_empty() || latest == ERROR_SENTINEL {
        return VersionStatus::Error;
    }
    if !current.is_empty() && version_matches(current, latest) {
        VersionStatus::Current
    } else {
        VersionStatus::Outdated
    }
}
