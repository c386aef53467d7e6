//! Git boundary for committing pin updates
//!
//! The `git` binary is an external collaborator; nothing here reimplements it.

use std::path::PathBuf;
use std::process::{Command, Stdio};

#[cfg(test)]
use mockall::automock;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum GitError {
    #[error("Failed to run git: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("git {command} failed: {stderr}")]
    Failed { command: String, stderr: String },
}

/// The git operations the updater needs
#[cfg_attr(test, automock)]
pub trait Git {
    /// Stage every change in the working tree
    fn add_all(&self) -> Result<(), GitError>;

    fn commit(&self, message: &str) -> Result<(), GitError>;
}

/// Runs the `git` binary against a repository
pub struct CommandGit {
    repo: PathBuf,
}

impl CommandGit {
    pub fn new(repo: impl Into<PathBuf>) -> Self {
        Self { repo: repo.into() }
    }

    fn run(&self, args: &[&str]) -> Result<(), GitError> {
        debug!("git -C {:?} {}", self.repo, args.join(" "));
        let output = Command::new("git")
            .arg("-C")
            .arg(&self.repo)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()?;

        if output.status.success() {
            Ok(())
        } else {
            Err(GitError::Failed {
                command: args.first().copied().unwrap_or_default().to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }
}

impl Git for CommandGit {
    fn add_all(&self) -> Result<(), GitError> {
        self.run(&["add", "-A"])
    }

    fn commit(&self, message: &str) -> Result<(), GitError> {
        self.run(&["commit", "-m", message])
    }
}
