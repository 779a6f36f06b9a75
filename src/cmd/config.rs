//! Configuration view and initialization: `spectator config`.

use anyhow::{Context, Result};
use spectator::config::SpectatorConfig;

use super::super::{Cli, ConfigCommands};

const MASK: &str = "********";

pub fn cmd_config(cli: &Cli, command: Option<ConfigCommands>) -> Result<()> {
    let config_path = super::config_path(cli);

    match command {
        None | Some(ConfigCommands::Show) => {
            let mut config = super::load_config(cli)?;
            if config.riot.api_key.is_some() {
                config.riot.api_key = Some(MASK.to_string());
            }

            println!();
            if config_path.exists() {
                println!("Config file: {}", config_path.display());
            } else {
                println!("No {} found, using defaults.", config_path.display());
                println!("Run 'spectator config init' to create one.");
            }
            println!();
            println!("{}", config.to_toml()?);
        }
        Some(ConfigCommands::Init) => {
            if config_path.exists() {
                println!("{} already exists.", config_path.display());
                println!("Delete it first if you want to recreate it.");
                return Ok(());
            }
            if let Some(parent) = config_path.parent()
                && !parent.as_os_str().is_empty()
            {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }

            let toml = SpectatorConfig::default().to_toml()?;
            std::fs::write(&config_path, toml)
                .with_context(|| format!("Failed to write {}", config_path.display()))?;

            println!("Created {}", config_path.display());
            println!();
            println!("You can now customize:");
            println!("  - [timing] intervals and output_directory");
            println!("  - [recorder] capture tool commands");
            println!("  - [settings] client settings file and values");
            println!();
        }
    }

    Ok(())
}
