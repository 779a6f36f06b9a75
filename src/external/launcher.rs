//! Launch command retrieval and replay client start-up.

use super::process::spawn_detached;
use super::{LaunchSource, ReplayLauncher};
use crate::errors::CaptureError;
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::{debug, instrument};

/// Fetches the launch command text from an HTTP endpoint.
pub struct HttpLaunchSource {
    http: reqwest::Client,
    url_template: String,
}

impl HttpLaunchSource {
    pub fn new(url_template: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), url_template)
    }

    pub fn with_client(http: reqwest::Client, url_template: impl Into<String>) -> Self {
        Self {
            http,
            url_template: url_template.into(),
        }
    }

    pub fn url_for(&self, match_id: &str, region: &str) -> String {
        self.url_template
            .replace("{region}", &region.to_lowercase())
            .replace("{match_id}", match_id)
    }
}

#[async_trait]
impl LaunchSource for HttpLaunchSource {
    #[instrument(skip(self))]
    async fn launch_command(&self, match_id: &str, region: &str) -> Result<String, CaptureError> {
        let url = self.url_for(match_id, region);
        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| CaptureError::launch(format!("Failed to fetch launch command: {}", e)))?;

        if !resp.status().is_success() {
            return Err(CaptureError::launch(format!(
                "Launch command source returned {} for {}",
                resp.status(),
                url
            )));
        }

        resp.text()
            .await
            .map_err(|e| CaptureError::launch(format!("Failed to read launch command: {}", e)))
    }
}

/// Writes the launch command to a script file and runs it.
pub struct ScriptLauncher {
    script_path: PathBuf,
}

impl ScriptLauncher {
    pub fn new(script_path: impl Into<PathBuf>) -> Self {
        Self {
            script_path: script_path.into(),
        }
    }

    fn write_script(&self, command: &str) -> Result<(), CaptureError> {
        std::fs::write(&self.script_path, command).map_err(|e| {
            CaptureError::launch_io(
                format!("Failed to write {}", self.script_path.display()),
                e,
            )
        })?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.script_path, std::fs::Permissions::from_mode(0o755))
                .map_err(|e| {
                    CaptureError::launch_io(
                        format!("Failed to mark {} executable", self.script_path.display()),
                        e,
                    )
                })?;
        }

        Ok(())
    }
}

#[async_trait]
impl ReplayLauncher for ScriptLauncher {
    async fn launch(&self, command: &str) -> Result<(), CaptureError> {
        self.write_script(command)?;
        let invocation = format!("\"{}\"", self.script_path.display());
        debug!(script = %self.script_path.display(), "starting replay client");
        spawn_detached(&invocation)
    }
}
