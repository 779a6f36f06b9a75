//! Latest game version: `spectator version`.

use anyhow::Result;
use spectator::external::{HttpVersionFeed, VersionFeed};

use super::super::Cli;

pub async fn cmd_version(cli: &Cli) -> Result<()> {
    let config = super::load_config(cli)?;
    let feed = HttpVersionFeed::new(config.version_feed.url);
    println!("{}", feed.latest_version().await?);
    Ok(())
}
