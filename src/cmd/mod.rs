//! CLI command implementations.
//!
//! | Module     | Commands handled |
//! |------------|------------------|
//! | `spectate` | `Spectate`       |
//! | `config`   | `Config`         |
//! | `version`  | `Version`        |

pub mod config;
pub mod spectate;
pub mod version;

pub use config::cmd_config;
pub use spectate::cmd_spectate;
pub use version::cmd_version;

use anyhow::Result;
use spectator::config::{CONFIG_FILE, SpectatorConfig};
use std::path::PathBuf;

use super::Cli;

pub fn config_path(cli: &Cli) -> PathBuf {
    cli.config
        .clone()
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE))
}

/// Configuration file plus environment overrides.
pub fn load_config(cli: &Cli) -> Result<SpectatorConfig> {
    SpectatorConfig::load(&config_path(cli))
}
