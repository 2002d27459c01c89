//! Remote file fetching against the configured repository base URL

use anyhow::{Context, Result};
use std::time::Duration;
use tokio::time::timeout;
use url::Url;

/// Deadline for a single fetch; a dead remote fails the run instead of
/// stalling the completion count forever
const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Fetches `repo://` file contents from the repository base URL
///
/// Cheap to clone so every remote leaf task can own one.
#[derive(Debug, Clone)]
pub struct FileFetcher {
    client: reqwest::Client,
    repository: Url,
}

impl FileFetcher {
    /// Create a new fetcher with a custom user agent
    pub fn new(repository: Url, user_agent: &str) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent(user_agent)
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            repository,
        }
    }

    /// Resolve a remote-relative path against the repository base URL,
    /// preserving query parameters
    pub fn resolve(&self, relative: &str) -> Result<Url> {
        let mut url = self.repository.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                anyhow::anyhow!(
                    "Repository URL cannot have path segments: {}",
                    self.repository
                )
            })?;
            segments.pop_if_empty();
            for segment in relative.split('/').filter(|s| !s.is_empty()) {
                segments.push(segment);
            }
        }
        Ok(url)
    }

    /// Fetch a remote file's bytes; non-success status and timeout are errors
    pub async fn fetch_bytes(&self, relative: &str) -> Result<Vec<u8>> {
        let url = self.resolve(relative)?;

        let response = timeout(FETCH_TIMEOUT, self.client.get(url.clone()).send())
            .await
            .map_err(|_| {
                anyhow::anyhow!(
                    "Timed out fetching {} after {}s",
                    url,
                    FETCH_TIMEOUT.as_secs()
                )
            })?
            .with_context(|| format!("Failed to fetch {}", url))?;

        if !response.status().is_success() {
            anyhow::bail!("Failed to fetch {}: HTTP {}", url, response.status());
        }

        let body = timeout(FETCH_TIMEOUT, response.bytes())
            .await
            .map_err(|_| {
                anyhow::anyhow!(
                    "Timed out reading {} after {}s",
                    url,
                    FETCH_TIMEOUT.as_secs()
                )
            })?
            .with_context(|| format!("Failed to read body of {}", url))?;

        Ok(body.to_vec())
    }
}
