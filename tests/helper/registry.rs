//! Registry, fetcher and git test doubles

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use container_version_checker::tools::pin::PinLocation;
use container_version_checker::tools::{DeclaredTool, ToolRegistry};
use container_version_checker::update::git::{Git, GitError};
use container_version_checker::version::extract::{Extractor, Pick};
use container_version_checker::version::fetcher::Fetcher;
use container_version_checker::version::source::VersionSource;

/// Fetcher serving canned bodies and recording every requested URL
#[derive(Default)]
pub struct RecordingFetcher {
    bodies: HashMap<String, String>,
    requests: Mutex<Vec<String>>,
}

impl RecordingFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_body(mut self, url: &str, body: &str) -> Self {
        self.bodies.insert(url.to_string(), body.to_string());
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Fetcher for RecordingFetcher {
    async fn fetch(&self, url: &str) -> String {
        self.requests.lock().unwrap().push(url.to_string());
        self.bodies.get(url).cloned().unwrap_or_default()
    }
}

/// Git double that records commit messages
#[derive(Default)]
pub struct RecordingGit {
    pub calls: Mutex<Vec<String>>,
}

impl RecordingGit {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl Git for RecordingGit {
    fn add_all(&self) -> Result<(), GitError> {
        self.calls.lock().unwrap().push("add -A".to_string());
        Ok(())
    }

    fn commit(&self, message: &str) -> Result<(), GitError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("commit {}", message.lines().next().unwrap_or_default()));
        Ok(())
    }
}

/// Registry mirroring the built-in layout with every feed under `base_url`
pub fn create_test_registry(base_url: &str) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry
        .register(
            DeclaredTool::new("node", PinLocation::docker_arg("Dockerfile", "NODE_VERSION"))
                .source(VersionSource::new(
                    format!("{base_url}/api/nodejs.json"),
                    Extractor::json("/0/latest"),
                )),
        )
        .register(
            DeclaredTool::new(
                "python",
                PinLocation::docker_arg("Dockerfile", "PYTHON_VERSION"),
            )
            .source(VersionSource::new(
                format!("{base_url}/api/python.json"),
                Extractor::json("/0/latest"),
            ))
            .source(VersionSource::new(
                format!("{base_url}/downloads/"),
                Extractor::regex(r"Python (\d+\.\d+\.\d+)", Pick::Max),
            )),
        )
        .register(
            DeclaredTool::new(
                "helm",
                PinLocation::shell_var("features/kubernetes.sh", "HELM_VERSION"),
            )
            .source(
                VersionSource::new(
                    format!("{base_url}/repos/helm/helm/releases/latest"),
                    Extractor::json("/tag_name"),
                )
                .trim_prefix("v"),
            ),
        )
        .register(DeclaredTool::new(
            "gcloud",
            PinLocation::shell_var("features/gcloud.sh", "GCLOUD_VERSION"),
        ));
    registry
}
