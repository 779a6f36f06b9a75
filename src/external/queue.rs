//! Append-only publication queue backed by a JSON-lines file.

use super::PublicationQueue;
use crate::match_info::PublicationJob;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

pub struct JsonlQueue {
    path: PathBuf,
}

impl JsonlQueue {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Every job currently in the queue, oldest first.
    pub fn jobs(&self) -> Result<Vec<PublicationJob>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&self.path).context("Failed to read queue file")?;
        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).context("Invalid queue entry"))
            .collect()
    }
}

#[async_trait]
impl PublicationQueue for JsonlQueue {
    async fn enqueue(&self, job: PublicationJob) -> Result<()> {
        let mut line = serde_json::to_string(&job).context("Failed to serialize job")?;
        line.push('\n');

        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .context("Failed to open queue file")?
            .write_all(line.as_bytes())
            .context("Failed to write queue entry")?;

        info!(job = %job.id, path = %job.path.display(), "queued for publication");
        Ok(())
    }
}
