//! Latest game version from the CommunityDragon patch feed.

use super::VersionFeed;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::instrument;

#[derive(Debug, Deserialize)]
struct PatchFeed {
    patches: Vec<Patch>,
}

#[derive(Debug, Deserialize)]
struct Patch {
    name: String,
}

pub struct HttpVersionFeed {
    http: reqwest::Client,
    url: String,
}

impl HttpVersionFeed {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: url.into(),
        }
    }
}

/// The newest patch name in a feed body; patches are listed oldest first.
fn latest_patch(body: &str) -> Result<String> {
    let feed: PatchFeed = serde_json::from_str(body).context("Invalid patch feed")?;
    feed.patches
        .into_iter()
        .last()
        .map(|p| p.name)
        .context("Patch feed is empty")
}

#[async_trait]
impl VersionFeed for HttpVersionFeed {
    #[instrument(skip(self))]
    async fn latest_version(&self) -> Result<String> {
        let body = self
            .http
            .get(&self.url)
            .send()
            .await
            .with_context(|| format!("Failed to fetch {}", self.url))?
            .error_for_status()
            .context("Patch feed returned error status")?
            .text()
            .await
            .context("Failed to read patch feed")?;
        latest_patch(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latest_patch_is_last_entry() {
        let body = r#"{"patches": [
            {"name": "14.1", "start": 1704844800, "season": 14},
            {"name": "14.2", "start": 1705968000, "season": 14},
            {"name": "14.3", "start": 1707177600, "season": 14}
        ]}"#;
        assert_eq!(latest_patch(body).unwrap(), "14.3");
    }

    #[test]
    fn test_empty_feed_is_error() {
        assert!(latest_patch(r#"{"patches": []}"#).is_err());
        assert!(latest_patch("not json").is_err());
    }
}
