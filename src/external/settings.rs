//! Client settings file toggle.
//!
//! The game client reads an INI-style `game.cfg`. Enabling and disabling
//! rewrites only the configured keys and leaves every other line untouched.

use super::SettingsToggle;
use crate::config::SettingsConfig;
use crate::errors::CaptureError;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::debug;

pub struct GameConfigToggle {
    path: PathBuf,
    enabled: BTreeMap<String, String>,
    disabled: BTreeMap<String, String>,
}

impl GameConfigToggle {
    pub fn new(config: SettingsConfig) -> Self {
        Self {
            path: config.path,
            enabled: config.enabled,
            disabled: config.disabled,
        }
    }

    fn apply(&self, values: &BTreeMap<String, String>) -> Result<(), CaptureError> {
        let settings_err = |source| CaptureError::Settings {
            path: self.path.clone(),
            source,
        };

        let current = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => return Err(settings_err(e)),
        };

        let updated = apply_values(&current, values);
        if updated != current {
            debug!(path = %self.path.display(), "updating client settings");
            std::fs::write(&self.path, updated).map_err(settings_err)?;
        }
        Ok(())
    }
}

#[async_trait]
impl SettingsToggle for GameConfigToggle {
    async fn enable(&self) -> Result<(), CaptureError> {
        self.apply(&self.enabled)
    }

    async fn disable(&self) -> Result<(), CaptureError> {
        self.apply(&self.disabled)
    }
}

/// Set each `key=value` pair in `content`, appending keys that are absent.
fn apply_values(content: &str, values: &BTreeMap<String, String>) -> String {
    let mut remaining: BTreeMap<&str, &str> = values
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();

    let mut lines: Vec<String> = content
        .lines()
        .map(|line| {
            let Some((key, _)) = line.split_once('=') else {
                return line.to_string();
            };
            let key = key.trim();
            match remaining.remove(key) {
                Some(value) => format!("{}={}", key, value),
                None => line.to_string(),
            }
        })
        .collect();

    for (key, value) in remaining {
        lines.push(format!("{}={}", key, value));
    }

    let mut out = lines.join("\n");
    if !out.is_empty() {
        out.push('\n');
    }
    out
}
