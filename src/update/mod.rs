//! Updater: rewrites outdated pins from a check report
//!
//! Each outdated entry is handled on its own. An invalid version, an unknown
//! tool or a missing pin is a warning and the batch continues. There is no
//! rollback: when committing fails, applied rewrites stay in the working tree.

pub mod git;

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};

use crate::report::Report;
use crate::tools::{PinChange, PinError, ToolRegistry};
use crate::update::git::{Git, GitError};
use crate::version::semver::{BumpLevel, bump, is_version_shaped};

/// File holding the image's own semantic version
pub const VERSION_FILE: &str = "VERSION";

#[derive(Debug, Error)]
pub enum UpdateError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid version '{version}' for {tool}")]
    InvalidVersion { tool: String, version: String },

    #[error(transparent)]
    Pin(#[from] PinError),

    #[error(transparent)]
    Git(#[from] GitError),

    #[error("Failed to update {path}: {reason}")]
    VersionFile { path: PathBuf, reason: String },
}

/// One outdated tool to update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateRecord {
    pub tool: String,
    pub current: String,
    pub latest: String,
    pub target_file: PathBuf,
}

impl UpdateRecord {
    /// Records for every outdated entry of `report`, in report order
    pub fn from_report(report: &Report) -> Vec<Self> {
        report
            .outdated()
            .map(|entry| Self {
                tool: entry.tool.clone(),
                current: entry.current.clone(),
                latest: entry.latest.clone(),
                target_file: PathBuf::from(&entry.file),
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateOptions {
    pub dry_run: bool,
    pub commit: bool,
    /// Bump the VERSION file after committing
    pub bump: Option<BumpLevel>,
}

impl Default for UpdateOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            commit: true,
            bump: Some(BumpLevel::Patch),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedUpdate {
    pub tool: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CommitStatus {
    /// Nothing to commit, committing disabled, or dry run
    #[default]
    NotAttempted,
    Committed,
    Failed(String),
}

/// Result of bumping the VERSION file after the update commit
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum BumpStatus {
    /// Bumping disabled, or the update commit did not happen
    #[default]
    NotAttempted,
    /// VERSION missing or unreadable as semver; nothing written
    Skipped(String),
    Bumped { from: String, to: String },
    /// VERSION was rewritten but committing it failed
    CommitFailed {
        from: String,
        to: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UpdateOutcome {
    pub changes: Vec<(String, PinChange)>,
    pub skipped: Vec<SkippedUpdate>,
    pub commit: CommitStatus,
    pub bump: BumpStatus,
}

impl UpdateOutcome {
    pub fn applied(&self) -> impl Iterator<Item = (&str, &PinChange)> {
        self.changes
            .iter()
            .filter(|(_, change)| matches!(change, PinChange::Applied { .. }))
            .map(|(tool, change)| (tool.as_str(), change))
    }

    pub fn applied_count(&self) -> usize {
        self.applied().count()
    }

    /// Whether a git step failed and left changes uncommitted
    pub fn has_failure(&self) -> bool {
        matches!(self.commit, CommitStatus::Failed(_))
            || matches!(self.bump, BumpStatus::CommitFailed { .. })
    }
}

pub struct Updater<'a> {
    registry: &'a ToolRegistry,
    git: &'a dyn Git,
    root: PathBuf,
    options: UpdateOptions,
}

impl<'a> Updater<'a> {
    pub fn new(
        registry: &'a ToolRegistry,
        git: &'a dyn Git,
        root: impl Into<PathBuf>,
        options: UpdateOptions,
    ) -> Self {
        Self {
            registry,
            git,
            root: root.into(),
            options,
        }
    }

    pub fn run(&self, report: &Report) -> UpdateOutcome {
        let mut outcome = UpdateOutcome::default();

        for record in UpdateRecord::from_report(report) {
            match self.apply(&record) {
                Ok(change) => outcome.changes.push((record.tool, change)),
                Err(e) => {
                    warn!("Skipping {}: {}", record.tool, e);
                    outcome.skipped.push(SkippedUpdate {
                        tool: record.tool,
                        reason: e.to_string(),
                    });
                }
            }
        }

        if self.options.dry_run || !self.options.commit || outcome.applied_count() == 0 {
            return outcome;
        }

        if let Err(e) = self.commit(&commit_message(&outcome)) {
            warn!("Commit failed, changes left in the working tree: {}", e);
            outcome.commit = CommitStatus::Failed(e.to_string());
            return outcome;
        }
        outcome.commit = CommitStatus::Committed;

        if let Some(level) = self.options.bump {
            outcome.bump = self.bump_version(level);
        }

        outcome
    }

    fn apply(&self, record: &UpdateRecord) -> Result<PinChange, UpdateError> {
        if !is_version_shaped(&record.latest) {
            return Err(UpdateError::InvalidVersion {
                tool: record.tool.clone(),
                version: record.latest.clone(),
            });
        }

        let tool = self
            .registry
            .get(&record.tool)
            .ok_or_else(|| UpdateError::UnknownTool(record.tool.clone()))?;

        if tool.pin().file != record.target_file {
            warn!(
                "{}: report names {:?}, updating registered pin file {:?}",
                record.tool,
                record.target_file,
                tool.pin().file
            );
        }

        let change = tool.apply_update(&self.root, &record.latest, self.options.dry_run)?;
        info!("{}: {:?}", record.tool, change);
        Ok(change)
    }

    fn commit(&self, message: &str) -> Result<(), GitError> {
        self.git.add_all()?;
        self.git.commit(message)
    }

    fn bump_version(&self, level: BumpLevel) -> BumpStatus {
        let (from, to) = match bump_version_file(&self.root.join(VERSION_FILE), level) {
            Ok(bumped) => bumped,
            Err(e) => {
                warn!("Version bump skipped: {}", e);
                return BumpStatus::Skipped(e.to_string());
            }
        };

        match self.commit(&format!("chore: bump version to {to}")) {
            Ok(()) => BumpStatus::Bumped { from, to },
            Err(e) => {
                warn!("Bump commit failed, VERSION left modified: {}", e);
                BumpStatus::CommitFailed {
                    from,
                    to,
                    reason: e.to_string(),
                }
            }
        }
    }
}

/// Commit message listing every applied change
pub fn commit_message(outcome: &UpdateOutcome) -> String {
    let mut message = String::from("chore(deps): update tool versions\n");
    for (tool, change) in outcome.applied() {
        if let PinChange::Applied { file, from, to } = change {
            message.push_str(&format!("\n- {tool}: {from} -> {to} ({})", file.display()));
        }
    }
    message
}

/// Increment the semantic version stored in `path`
///
/// Returns the old and new versions.
pub fn bump_version_file(path: &Path, level: BumpLevel) -> Result<(String, String), UpdateError> {
    let version_file_error = |reason: String| UpdateError::VersionFile {
        path: path.to_path_buf(),
        reason,
    };

    let content = std::fs::read_to_string(path).map_err(|e| version_file_error(e.to_string()))?;
    let old = content.trim().to_string();
    let new = bump(&old, level)
        .ok_or_else(|| version_file_error(format!("'{old}' is not a semantic version")))?;

    std::fs::write(path, format!("{new}\n")).map_err(|e| version_file_error(e.to_string()))?;
    Ok((old, new))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{Summary, ToolEntry};
    use crate::tools::DeclaredTool;
    use crate::tools::pin::PinLocation;
    use crate::update::git::MockGit;
    use crate::version::checker::VersionStatus;
    use mockall::Sequence;
    use mockall::predicate::{eq, function};
    use tempfile::TempDir;

    fn entry(tool: &str, current: &str, latest: &str, file: &str, status: VersionStatus) -> ToolEntry {
        ToolEntry {
            tool: tool.to_string(),
            current: current.to_string(),
            latest: latest.to_string(),
            file: file.to_string(),
            status,
        }
    }

    fn report(tools: Vec<ToolEntry>) -> Report {
        Report {
            timestamp: "2024-12-01T08:30:00Z".to_string(),
            tools,
            summary: Summary::default(),
            exit_code: 1,
        }
    }

    fn registry() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry
            .register(DeclaredTool::new(
                "node",
                PinLocation::docker_arg("Dockerfile", "NODE_VERSION"),
            ))
            .register(DeclaredTool::new(
                "helm",
                PinLocation::shell_var("features/kubernetes.sh", "HELM_VERSION"),
            ));
        registry
    }

    fn fixture() -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        std::fs::create_dir_all(root.join("features")).unwrap();
        std::fs::write(root.join("Dockerfile"), "ARG NODE_VERSION=20\n").unwrap();
        std::fs::write(
            root.join("features/kubernetes.sh"),
            "HELM_VERSION=\"3.16.2\"\n",
        )
        .unwrap();
        std::fs::write(root.join(VERSION_FILE), "1.4.2\n").unwrap();
        temp_dir
    }

    fn outdated_report() -> Report {
        report(vec![
            entry("node", "20", "22.18.0", "Dockerfile", VersionStatus::Outdated),
            entry("helm", "3.16.2", "3.16.2", "features/kubernetes.sh", VersionStatus::Current),
        ])
    }

    #[test]
    fn from_report_keeps_only_outdated_entries() {
        let records = UpdateRecord::from_report(&outdated_report());

        assert_eq!(
            records,
            vec![UpdateRecord {
                tool: "node".to_string(),
                current: "20".to_string(),
                latest: "22.18.0".to_string(),
                target_file: PathBuf::from("Dockerfile"),
            }]
        );
    }

    #[test]
    fn run_commits_then_bumps_version() {
        let temp_dir = fixture();
        let registry = registry();
        let mut git = MockGit::new();
        let mut seq = Sequence::new();
        git.expect_add_all().times(2).returning(|| Ok(()));
        git.expect_commit()
            .with(function(|m: &str| {
                m.starts_with("chore(deps): update tool versions")
                    && m.contains("- node: 20 -> 22.18.0 (Dockerfile)")
            }))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        git.expect_commit()
            .with(eq("chore: bump version to 1.4.3"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));

        let updater = Updater::new(&registry, &git, temp_dir.path(), UpdateOptions::default());
        let outcome = updater.run(&outdated_report());

        assert_eq!(outcome.applied_count(), 1);
        assert!(outcome.skipped.is_empty());
        assert_eq!(outcome.commit, CommitStatus::Committed);
        assert_eq!(
            outcome.bump,
            BumpStatus::Bumped {
                from: "1.4.2".to_string(),
                to: "1.4.3".to_string(),
            }
        );
        assert!(!outcome.has_failure());
        let dockerfile = std::fs::read_to_string(temp_dir.path().join("Dockerfile")).unwrap();
        assert_eq!(dockerfile, "ARG NODE_VERSION=22.18.0\n");
        let version = std::fs::read_to_string(temp_dir.path().join(VERSION_FILE)).unwrap();
        assert_eq!(version, "1.4.3\n");
    }

    #[test]
    fn dry_run_without_commit_never_touches_git_or_files() {
        let temp_dir = fixture();
        let registry = registry();
        let mut git = MockGit::new();
        git.expect_add_all().never();
        git.expect_commit().never();
        let options = UpdateOptions {
            dry_run: true,
            commit: false,
            bump: None,
        };

        let outcome = Updater::new(&registry, &git, temp_dir.path(), options).run(&outdated_report());

        assert_eq!(outcome.applied_count(), 0);
        assert!(matches!(outcome.changes[0].1, PinChange::Planned { .. }));
        assert_eq!(outcome.commit, CommitStatus::NotAttempted);
        let dockerfile = std::fs::read_to_string(temp_dir.path().join("Dockerfile")).unwrap();
        assert_eq!(dockerfile, "ARG NODE_VERSION=20\n");
    }

    #[test]
    fn invalid_and_unknown_entries_are_skipped_without_aborting() {
        let temp_dir = fixture();
        let registry = registry();
        let mut git = MockGit::new();
        git.expect_add_all().returning(|| Ok(()));
        git.expect_commit().times(1).returning(|_| Ok(()));
        let report = report(vec![
            entry("node", "20", "error", "Dockerfile", VersionStatus::Outdated),
            entry("kustomize", "5.0.0", "5.5.0", "features/kubernetes.sh", VersionStatus::Outdated),
            entry("helm", "3.16.2", "3.17.0", "features/kubernetes.sh", VersionStatus::Outdated),
        ]);
        let options = UpdateOptions {
            bump: None,
            ..UpdateOptions::default()
        };

        let outcome = Updater::new(&registry, &git, temp_dir.path(), options).run(&report);

        assert_eq!(outcome.applied_count(), 1);
        let skipped: Vec<_> = outcome.skipped.iter().map(|s| s.tool.as_str()).collect();
        assert_eq!(skipped, vec!["node", "kustomize"]);
        assert!(outcome.skipped[0].reason.contains("Invalid version"));
        assert!(outcome.skipped[1].reason.contains("Unknown tool"));
    }

    #[test]
    fn commit_failure_leaves_changes_in_working_tree() {
        let temp_dir = fixture();
        let registry = registry();
        let mut git = MockGit::new();
        git.expect_add_all().returning(|| Ok(()));
        git.expect_commit().times(1).returning(|_| {
            Err(GitError::Failed {
                command: "commit".to_string(),
                stderr: "Author identity unknown".to_string(),
            })
        });

        let outcome =
            Updater::new(&registry, &git, temp_dir.path(), UpdateOptions::default()).run(&outdated_report());

        assert!(matches!(outcome.commit, CommitStatus::Failed(ref m) if m.contains("Author identity")));
        assert_eq!(outcome.bump, BumpStatus::NotAttempted);
        assert!(outcome.has_failure());
        let dockerfile = std::fs::read_to_string(temp_dir.path().join("Dockerfile")).unwrap();
        assert_eq!(dockerfile, "ARG NODE_VERSION=22.18.0\n");
        let version = std::fs::read_to_string(temp_dir.path().join(VERSION_FILE)).unwrap();
        assert_eq!(version, "1.4.2\n");
    }

    #[test]
    fn bump_commit_failure_is_reported_with_version_left_modified() {
        let temp_dir = fixture();
        let registry = registry();
        let mut git = MockGit::new();
        git.expect_add_all().times(2).returning(|| Ok(()));
        git.expect_commit()
            .with(function(|m: &str| m.starts_with("chore(deps):")))
            .times(1)
            .returning(|_| Ok(()));
        git.expect_commit()
            .with(eq("chore: bump version to 1.4.3"))
            .times(1)
            .returning(|_| {
                Err(GitError::Failed {
                    command: "commit".to_string(),
                    stderr: "pre-commit hook rejected".to_string(),
                })
            });

        let outcome =
            Updater::new(&registry, &git, temp_dir.path(), UpdateOptions::default()).run(&outdated_report());

        assert_eq!(outcome.commit, CommitStatus::Committed);
        assert!(matches!(
            outcome.bump,
            BumpStatus::CommitFailed { ref from, ref to, ref reason }
                if from == "1.4.2" && to == "1.4.3" && reason.contains("pre-commit hook")
        ));
        assert!(outcome.has_failure());
        let version = std::fs::read_to_string(temp_dir.path().join(VERSION_FILE)).unwrap();
        assert_eq!(version, "1.4.3\n");
    }

    #[test]
    fn missing_version_file_skips_bump_without_failure() {
        let temp_dir = fixture();
        std::fs::remove_file(temp_dir.path().join(VERSION_FILE)).unwrap();
        let registry = registry();
        let mut git = MockGit::new();
        git.expect_add_all().times(1).returning(|| Ok(()));
        git.expect_commit().times(1).returning(|_| Ok(()));

        let outcome =
            Updater::new(&registry, &git, temp_dir.path(), UpdateOptions::default()).run(&outdated_report());

        assert_eq!(outcome.commit, CommitStatus::Committed);
        assert!(matches!(outcome.bump, BumpStatus::Skipped(_)));
        assert!(!outcome.has_failure());
    }

    #[test]
    fn nothing_to_commit_when_pins_already_current() {
        let temp_dir = fixture();
        std::fs::write(temp_dir.path().join("Dockerfile"), "ARG NODE_VERSION=22.18.0\n").unwrap();
        let registry = registry();
        let mut git = MockGit::new();
        git.expect_add_all().never();
        git.expect_commit().never();

        let outcome =
            Updater::new(&registry, &git, temp_dir.path(), UpdateOptions::default()).run(&outdated_report());

        assert!(matches!(outcome.changes[0].1, PinChange::AlreadyCurrent { .. }));
        assert_eq!(outcome.commit, CommitStatus::NotAttempted);
    }

    #[test]
    fn bump_version_file_rejects_non_semver_content() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(VERSION_FILE);
        std::fs::write(&path, "latest\n").unwrap();

        let err = bump_version_file(&path, BumpLevel::Patch).unwrap_err();

        assert!(matches!(err, UpdateError::VersionFile { .. }));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "latest\n");
    }

    #[test]
    fn bump_version_file_reports_missing_file() {
        let temp_dir = TempDir::new().unwrap();

        let err = bump_version_file(&temp_dir.path().join(VERSION_FILE), BumpLevel::Minor);

        assert!(matches!(err, Err(UpdateError::VersionFile { .. })));
    }
}
