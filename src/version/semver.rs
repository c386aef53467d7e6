use std::sync::LazyLock;

use regex::Regex;
use semver::Version;

/// Shape a version must have before it is written into a pin
static VERSION_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^v?\d+(\.\d+)*([-+][0-9A-Za-z.]+)?$").expect("version shape regex is valid")
});

/// Semver component to increment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BumpLevel {
    #[default]
    Patch,
    Minor,
    Major,
}

/// Parse a version string into a semver::Version, normalizing partial versions.
///
/// Handles partial versions like "1" or "1.2" by padding with zeros.
/// Does NOT strip 'v' prefix.
///
/// Examples:
/// - "1" -> Version(1, 0, 0)
/// - "1.2" -> Version(1, 2, 0)
/// - "1.2.3" -> Version(1, 2, 3)
pub fn parse_version(version: &str) -> Option<Version> {
    let parts: Vec<&str> = version.split('.').collect();
    let normalized = match parts.len() {
        1 => format!("{}.0.0", parts[0]),
        2 => format!("{}.{}.0", parts[0], parts[1]),
        _ => version.to_string(),
    };
    Version::parse(&normalized).ok()
}

/// Find the semantically highest stable version from a list
///
/// `v`-prefixed and partial versions are accepted; pre-releases and
/// unparseable entries are skipped. The original string is returned.
pub fn find_stable_max<'a, I>(versions: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    versions
        .into_iter()
        .filter_map(|v| {
            let stripped = v.strip_prefix('v').unwrap_or(v);
            let parsed = parse_version(stripped)?;
            parsed.pre.is_empty().then_some((v, parsed))
        })
        .max_by(|(_, a), (_, b)| a.cmp(b))
        .map(|(original, _)| original.to_string())
}

/// Whether `version` looks like something that may be written into a pin
pub fn is_version_shaped(version: &str) -> bool {
    VERSION_SHAPE.is_match(version)
}

/// Increment a semantic version, resetting lower components
///
/// Returns None when `version` is not a valid semver string.
pub fn bump(version: &str, level: BumpLevel) -> Option<String> {
    let mut parsed = parse_version(version.trim())?;
    match level {
        BumpLevel::Patch => {
            parsed.patch += 1;
        }
        BumpLevel::Minor => {
            parsed.minor += 1;
            parsed.patch = 0;
        }
        BumpLevel::Major => {
            parsed.major += 1;
            parsed.minor = 0;
            parsed.patch = 0;
        }
    }
    parsed.pre = semver::Prerelease::EMPTY;
    parsed.build = semver::BuildMetadata::EMPTY;
    Some(parsed.to_string())
}
