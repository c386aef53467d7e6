//! Fetcher trait for retrieving version feeds over HTTP

use std::time::Duration;

#[cfg(test)]
use mockall::automock;
use tracing::{debug, warn};

use crate::version::error::FetchError;

/// Host that receives the GitHub token, when one is configured
const GITHUB_API_HOST: &str = "api.github.com";

/// Trait for fetching a version feed
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetches `url` and returns the response body
    ///
    /// # Returns
    /// The body text, or an empty string on network error, timeout or a
    /// non-2xx status. Failures are never retried.
    async fn fetch(&self, url: &str) -> String;
}

/// Fetcher backed by reqwest
pub struct HttpFetcher {
    client: reqwest::Client,
    github_token: Option<String>,
}

impl HttpFetcher {
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            github_token: None,
        })
    }

    /// Token sent as a bearer credential to the GitHub API
    pub fn with_github_token(mut self, token: Option<String>) -> Self {
        self.github_token = token.filter(|t| !t.is_empty());
        self
    }

    /// Reads the GitHub token from GITHUB_TOKEN, then GH_TOKEN
    pub fn github_token_from_env() -> Option<String> {
        std::env::var("GITHUB_TOKEN")
            .ok()
            .filter(|t| !t.is_empty())
            .or_else(|| std::env::var("GH_TOKEN").ok())
            .filter(|t| !t.is_empty())
    }

    async fn try_fetch(&self, url: &str) -> Result<String, FetchError> {
        let mut request = self.client.get(url);

        if let Some(token) = &self.github_token
            && is_github_api(url)
        {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response.text().await?)
    }
}

#[async_trait::async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> String {
        debug!("Fetching {}", url);
        match self.try_fetch(url).await {
            Ok(body) => body,
            Err(e) => {
                warn!("Fetch failed: {}", e);
                String::new()
            }
        }
    }
}

fn is_github_api(url: &str) -> bool {
    reqwest::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h == GITHUB_API_HOST))
        .unwrap_or(false)
}
