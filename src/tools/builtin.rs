//! Built-in tool definitions for the dev-container image
//!
//! Language runtimes are pinned as Dockerfile build args; cloud CLIs and dev
//! tools are pinned inside their feature install scripts.

use crate::tools::pin::PinLocation;
use crate::tools::{DeclaredTool, ToolRegistry};
use crate::version::extract::{Extractor, Pick};
use crate::version::source::VersionSource;

const DOCKERFILE: &str = "Dockerfile";

fn github_latest_release(repo: &str) -> VersionSource {
    VersionSource::new(
        format!("https://api.github.com/repos/{repo}/releases/latest"),
        Extractor::json("/tag_name"),
    )
    .trim_prefix("v")
}

fn github_tags(repo: &str) -> VersionSource {
    VersionSource::new(
        format!("https://api.github.com/repos/{repo}/tags?per_page=100"),
        Extractor::json_max("", Some("name")),
    )
    .trim_prefix("v")
}

fn end_of_life(product: &str) -> VersionSource {
    VersionSource::new(
        format!("https://endoflife.date/api/{product}.json"),
        Extractor::json("/0/latest"),
    )
}

fn feature(name: &str) -> String {
    format!("features/{name}.sh")
}

/// Registry with every built-in tool, in report order
pub fn registry() -> ToolRegistry {
    let mut registry = ToolRegistry::new();

    registry
        .register(
            DeclaredTool::new("node", PinLocation::docker_arg(DOCKERFILE, "NODE_VERSION"))
                .source(end_of_life("nodejs"))
                .source(
                    VersionSource::new(
                        "https://nodejs.org/dist/index.json",
                        Extractor::json_max("", Some("version")),
                    )
                    .trim_prefix("v"),
                ),
        )
        .register(
            DeclaredTool::new(
                "python",
                PinLocation::docker_arg(DOCKERFILE, "PYTHON_VERSION"),
            )
            .source(end_of_life("python"))
            .source(VersionSource::new(
                "https://www.python.org/downloads/",
                Extractor::regex(r"Python (\d+\.\d+\.\d+)", Pick::Max),
            )),
        )
        .register(
            DeclaredTool::new("go", PinLocation::docker_arg(DOCKERFILE, "GO_VERSION"))
                .source(VersionSource::new(
                    "https://go.dev/VERSION?m=text",
                    Extractor::regex(r"go(\d+\.\d+(?:\.\d+)?)", Pick::First),
                ))
                .source(end_of_life("go")),
        )
        .register(
            DeclaredTool::new("rust", PinLocation::docker_arg(DOCKERFILE, "RUST_VERSION"))
                .source(VersionSource::new(
                    "https://static.rust-lang.org/dist/channel-rust-stable.toml",
                    Extractor::regex(
                        r#"(?m)^\[pkg\.rust\]\s*\nversion = "(\d+\.\d+\.\d+)"#,
                        Pick::First,
                    ),
                ))
                .source(github_latest_release("rust-lang/rust")),
        )
        .register(
            DeclaredTool::new(
                "java",
                PinLocation::shell_var(feature("java"), "JAVA_VERSION"),
            )
            .source(VersionSource::new(
                "https://api.adoptium.net/v3/info/available_releases",
                Extractor::json("/most_recent_lts"),
            )),
        )
        .register(
            DeclaredTool::new(
                "maven",
                PinLocation::shell_var(feature("java"), "MAVEN_VERSION"),
            )
            .source(VersionSource::new(
                "https://repo1.maven.org/maven2/org/apache/maven/apache-maven/maven-metadata.xml",
                Extractor::regex(r"<release>([^<]+)</release>", Pick::First),
            )),
        )
        .register(
            DeclaredTool::new("r", PinLocation::shell_var(feature("r"), "R_VERSION")).source(
                VersionSource::new(
                    "https://cran.r-project.org/src/base/VERSION-INFO.dcf",
                    Extractor::regex(r"(?m)^Release:\s*(\d+\.\d+\.\d+)", Pick::First),
                ),
            ),
        )
        .register(
            DeclaredTool::new(
                "terraform",
                PinLocation::shell_var(feature("terraform"), "TERRAFORM_VERSION"),
            )
            .source(VersionSource::new(
                "https://checkpoint-api.hashicorp.com/v1/check/terraform",
                Extractor::json("/current_version"),
            ))
            .source(github_latest_release("hashicorp/terraform")),
        )
        .register(
            DeclaredTool::new(
                "kubectl",
                PinLocation::shell_var(feature("kubernetes"), "KUBECTL_VERSION"),
            )
            .source(VersionSource::new(
                "https://dl.k8s.io/release/stable.txt",
                Extractor::regex(r"v?(\d+\.\d+\.\d+)", Pick::First),
            ))
            .source(github_latest_release("kubernetes/kubernetes")),
        )
        .register(
            DeclaredTool::new(
                "helm",
                PinLocation::shell_var(feature("kubernetes"), "HELM_VERSION"),
            )
            .source(github_latest_release("helm/helm"))
            .source(github_tags("helm/helm")),
        )
        .register(
            DeclaredTool::new(
                "github-cli",
                PinLocation::shell_var(feature("dev-tools"), "GH_VERSION"),
            )
            .source(github_latest_release("cli/cli")),
        )
        .register(
            DeclaredTool::new(
                "glab",
                PinLocation::shell_var(feature("dev-tools"), "GLAB_VERSION"),
            )
            .source(
                VersionSource::new(
                    "https://gitlab.com/api/v4/projects/gitlab-org%2Fcli/releases",
                    Extractor::json("/0/tag_name"),
                )
                .trim_prefix("v"),
            ),
        )
        .register(
            DeclaredTool::new(
                "awscli",
                PinLocation::shell_var(feature("aws"), "AWS_CLI_VERSION"),
            )
            .source(github_tags("aws/aws-cli")),
        )
        .register(
            DeclaredTool::new(
                "pnpm",
                PinLocation::shell_var(feature("node-tools"), "PNPM_VERSION"),
            )
            .source(VersionSource::new(
                "https://registry.npmjs.org/pnpm/latest",
                Extractor::json("/version"),
            )),
        )
        // No stable machine-readable feed for the Cloud SDK
        .register(DeclaredTool::new(
            "gcloud",
            PinLocation::shell_var(feature("gcloud"), "GCLOUD_VERSION"),
        ));

    registry
}
