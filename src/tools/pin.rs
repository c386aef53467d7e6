//! Version pins inside repository files
//!
//! Two pin shapes are supported:
//! - Dockerfile build args: `ARG NODE_VERSION=22`
//! - Shell assignments in feature scripts: `HELM_VERSION="3.16.2"`,
//!   `export GH_VERSION=2.62.0`, `TERRAFORM_VERSION="${TERRAFORM_VERSION:-1.9.8}"`
//!
//! Rewriting is a targeted text substitution of the value only. Lines that
//! do not match are left byte-for-byte untouched.

use std::path::PathBuf;

use regex::{Captures, Regex};

/// Kind of line a pin lives on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinKind {
    DockerArg,
    ShellVar,
}

/// Where a tool's version is pinned
#[derive(Debug, Clone)]
pub struct PinLocation {
    /// Path relative to the repository root
    pub file: PathBuf,
    /// Variable name (e.g. `NODE_VERSION`)
    pub variable: String,
    pub kind: PinKind,
    pattern: Regex,
}

/// Result of rewriting a pin in memory
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rewrite {
    /// Pin found and changed; `previous` is the first old value
    Updated { content: String, previous: String },
    /// Every matching pin already holds the requested version
    Unchanged,
    /// No pin line for the variable
    NotFound,
}

impl PinLocation {
    pub fn docker_arg(file: impl Into<PathBuf>, variable: &str) -> Self {
        let var = regex::escape(variable);
        let pattern = format!(r#"(?m)^(?P<prefix>[ \t]*ARG[ \t]+{var}=["']?)(?P<value>[^"'\s]+)"#);
        Self::build(file.into(), variable, PinKind::DockerArg, &pattern)
    }

    pub fn shell_var(file: impl Into<PathBuf>, variable: &str) -> Self {
        let var = regex::escape(variable);
        let pattern = format!(
            r#"(?m)^(?P<prefix>[ \t]*(?:export[ \t]+|readonly[ \t]+|local[ \t]+)?{var}=["']?(?:\$\{{{var}:-)?)(?P<value>[^"'\s}}]+)"#
        );
        Self::build(file.into(), variable, PinKind::ShellVar, &pattern)
    }

    fn build(file: PathBuf, variable: &str, kind: PinKind, pattern: &str) -> Self {
        Self {
            file,
            variable: variable.to_string(),
            kind,
            pattern: Regex::new(pattern).expect("escaped pin pattern is valid"),
        }
    }

    /// First pinned value in `content`
    pub fn read(&self, content: &str) -> Option<String> {
        self.pattern
            .captures(content)
            .and_then(|caps| caps.name("value"))
            .map(|m| m.as_str().to_string())
    }

    /// Replace the value of every matching pin line with `version`
    pub fn rewrite(&self, content: &str, version: &str) -> Rewrite {
        let Some(previous) = self.read(content) else {
            return Rewrite::NotFound;
        };

        let all_current = self
            .pattern
            .captures_iter(content)
            .all(|caps| &caps["value"] == version);
        if all_current {
            return Rewrite::Unchanged;
        }

        let content = self
            .pattern
            .replace_all(content, |caps: &Captures| format!("{}{}", &caps["prefix"], version))
            .into_owned();

        Rewrite::Updated { content, previous }
    }
}
