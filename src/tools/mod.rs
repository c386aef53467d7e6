//! Tool registry
//!
//! A tool couples a version pin in the repository with the upstream sources
//! that say what its latest version is. Tools are registered by name, so a
//! new one is added by registering an implementation.

pub mod builtin;
pub mod pin;

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use thiserror::Error;
use tracing::debug;

use crate::tools::pin::{PinLocation, Rewrite};
use crate::version::cache::ResponseCache;
use crate::version::fetcher::Fetcher;
use crate::version::source::{VersionSource, resolve_latest};

#[derive(Debug, Error)]
pub enum PinError {
    #[error("Pin file not found: {0}")]
    MissingFile(PathBuf),

    #[error("No {variable} pin in {file}")]
    NotFound { variable: String, file: PathBuf },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Outcome of applying a version to a tool's pin
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PinChange {
    /// File rewritten
    Applied { file: PathBuf, from: String, to: String },
    /// Dry run: file would be rewritten
    Planned { file: PathBuf, from: String, to: String },
    /// Pin already holds the version; nothing written
    AlreadyCurrent { file: PathBuf },
}

/// A version-pinned tool
#[async_trait::async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    fn pin(&self) -> &PinLocation;

    /// Tools without an automated source are reported for manual checking
    fn is_manual(&self) -> bool {
        false
    }

    /// Latest upstream version, or an empty string if it cannot be determined
    async fn fetch_latest(&self, cache: &ResponseCache, fetcher: &dyn Fetcher) -> String;

    /// Read the currently pinned version under `root`
    fn current_version(&self, root: &Path) -> Result<String, PinError> {
        let pin = self.pin();
        let path = root.join(&pin.file);
        let content = read_pin_file(&path)?;
        pin.read(&content).ok_or_else(|| PinError::NotFound {
            variable: pin.variable.clone(),
            file: pin.file.clone(),
        })
    }

    /// Rewrite the pin under `root` to `version`
    fn apply_update(&self, root: &Path, version: &str, dry_run: bool) -> Result<PinChange, PinError> {
        let pin = self.pin();
        let path = root.join(&pin.file);
        let content = read_pin_file(&path)?;

        match pin.rewrite(&content, version) {
            Rewrite::NotFound => Err(PinError::NotFound {
                variable: pin.variable.clone(),
                file: pin.file.clone(),
            }),
            Rewrite::Unchanged => Ok(PinChange::AlreadyCurrent {
                file: pin.file.clone(),
            }),
            Rewrite::Updated { content, previous } => {
                if dry_run {
                    return Ok(PinChange::Planned {
                        file: pin.file.clone(),
                        from: previous,
                        to: version.to_string(),
                    });
                }
                std::fs::write(&path, content).map_err(|source| PinError::Io {
                    path: path.clone(),
                    source,
                })?;
                debug!("Rewrote {} in {:?}", pin.variable, path);
                Ok(PinChange::Applied {
                    file: pin.file.clone(),
                    from: previous,
                    to: version.to_string(),
                })
            }
        }
    }
}

fn read_pin_file(path: &Path) -> Result<String, PinError> {
    std::fs::read_to_string(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            PinError::MissingFile(path.to_path_buf())
        } else {
            PinError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })
}

/// Tool described by data: a pin plus an ordered list of sources
pub struct DeclaredTool {
    name: String,
    pin: PinLocation,
    sources: Vec<VersionSource>,
}

impl DeclaredTool {
    pub fn new(name: &str, pin: PinLocation) -> Self {
        Self {
            name: name.to_string(),
            pin,
            sources: Vec::new(),
        }
    }

    /// Add a source; sources are tried in the order added
    pub fn source(mut self, source: VersionSource) -> Self {
        self.sources.push(source);
        self
    }

    pub fn sources(&self) -> &[VersionSource] {
        &self.sources
    }
}

#[async_trait::async_trait]
impl Tool for DeclaredTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn pin(&self) -> &PinLocation {
        &self.pin
    }

    fn is_manual(&self) -> bool {
        self.sources.is_empty()
    }

    async fn fetch_latest(&self, cache: &ResponseCache, fetcher: &dyn Fetcher) -> String {
        resolve_latest(&self.sources, cache, fetcher).await
    }
}

/// Registry of tools keyed by name, iterated in registration order
#[derive(Default)]
pub struct ToolRegistry {
    tools: IndexMap<String, Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool, replacing any tool with the same name
    pub fn register(&mut self, tool: impl Tool + 'static) -> &mut Self {
        self.tools.insert(tool.name().to_string(), Box::new(tool));
        self
    }

    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.get(name).map(|tool| tool.as_ref())
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Tool> {
        self.tools.values().map(|tool| tool.as_ref())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tools.keys().map(String::as_str)
    }

    /// Drop tools by name; unknown names are ignored
    pub fn without<S: AsRef<str>>(mut self, names: &[S]) -> Self {
        for name in names {
            self.tools.shift_remove(name.as_ref());
        }
        self
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
