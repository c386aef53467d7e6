//! Fixture repository with version pins

use std::path::Path;

use tempfile::TempDir;

pub const DOCKERFILE: &str = "\
FROM debian:bookworm-slim
ARG NODE_VERSION=20
ARG PYTHON_VERSION=3.12
RUN echo \"node ${NODE_VERSION}\"
";

pub const KUBERNETES_FEATURE: &str = "\
#!/usr/bin/env bash
set -euo pipefail
HELM_VERSION=\"${HELM_VERSION:-3.16.2}\"
curl -fsSL \"https://get.helm.sh/helm-v${HELM_VERSION}-linux-amd64.tar.gz\" | tar -xz
";

pub const GCLOUD_FEATURE: &str = "GCLOUD_VERSION=502.0.0\n";

/// Create a repository with a Dockerfile, feature scripts and a VERSION file
pub fn create_test_repo() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    std::fs::create_dir_all(root.join("features")).unwrap();
    std::fs::write(root.join("Dockerfile"), DOCKERFILE).unwrap();
    std::fs::write(root.join("features/kubernetes.sh"), KUBERNETES_FEATURE).unwrap();
    std::fs::write(root.join("features/gcloud.sh"), GCLOUD_FEATURE).unwrap();
    std::fs::write(root.join("VERSION"), "0.9.0\n").unwrap();
    temp_dir
}

pub fn read(root: &Path, file: &str) -> String {
    std::fs::read_to_string(root.join(file)).unwrap()
}
