//! Configuration for the spectator.
//!
//! Settings are read from `spectator.toml`, then environment overrides are
//! applied, then CLI flags. Every field has a default, so a missing file is
//! equivalent to an empty one.
//!
//! # Configuration File Format
//!
//! ```toml
//! [timing]
//! settle_interval_ms = 2000
//! poll_interval_ms = 1000
//! finish_poll_interval_ms = 500
//! start_threshold_secs = 5.0
//! lookup_retry_budget = 3
//! lookup_backoff_ms = 1000
//! finalize_settle_multiplier = 5
//! output_directory = "D:\\LeagueReplays"
//!
//! [replay_api]
//! base_url = "https://127.0.0.1:2999"
//!
//! [recorder]
//! start_command = "obs64.exe --minimize-to-tray"
//! record_command = "obs-cli recording start"
//! stop_command = "obs-cli recording stop"
//! process_name = "obs64.exe"
//!
//! [settings]
//! path = "C:\\Riot Games\\League of Legends\\Config\\game.cfg"
//! enabled = { EnableReplayApi = "1" }
//! disabled = { EnableReplayApi = "0" }
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default configuration file name, looked up in the working directory.
pub const CONFIG_FILE: &str = "spectator.toml";

/// Wait and retry settings that drive the match lifecycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Pause after every state-changing action.
    #[serde(default = "default_settle_interval_ms")]
    pub settle_interval_ms: u64,
    /// Interval between "has the client launched" polls.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Interval between elapsed-time reads while recording.
    #[serde(default = "default_finish_poll_interval_ms")]
    pub finish_poll_interval_ms: u64,
    /// Elapsed game time at or below which the match is not yet started.
    #[serde(default = "default_start_threshold_secs")]
    pub start_threshold_secs: f64,
    /// Number of active-match lookups before giving up.
    #[serde(default = "default_lookup_retry_budget")]
    pub lookup_retry_budget: u32,
    #[serde(default = "default_lookup_backoff_ms")]
    pub lookup_backoff_ms: u64,
    /// Multiple of the settle interval waited before handing off a capture.
    #[serde(default = "default_finalize_settle_multiplier")]
    pub finalize_settle_multiplier: u32,
    /// Directory the capture tool writes its videos to.
    #[serde(default = "default_output_directory")]
    pub output_directory: PathBuf,
}

fn default_settle_interval_ms() -> u64 {
    2000
}

fn default_poll_interval_ms() -> u64 {
    1000
}

fn default_finish_poll_interval_ms() -> u64 {
    500
}

fn default_start_threshold_secs() -> f64 {
    5.0
}

fn default_lookup_retry_budget() -> u32 {
    3
}

fn default_lookup_backoff_ms() -> u64 {
    1000
}

fn default_finalize_settle_multiplier() -> u32 {
    5
}

fn default_output_directory() -> PathBuf {
    dirs::video_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join("LeagueReplays")
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            settle_interval_ms: default_settle_interval_ms(),
            poll_interval_ms: default_poll_interval_ms(),
            finish_poll_interval_ms: default_finish_poll_interval_ms(),
            start_threshold_secs: default_start_threshold_secs(),
            lookup_retry_budget: default_lookup_retry_budget(),
            lookup_backoff_ms: default_lookup_backoff_ms(),
            finalize_settle_multiplier: default_finalize_settle_multiplier(),
            output_directory: default_output_directory(),
        }
    }
}

impl OrchestratorConfig {
    pub fn settle_interval(&self) -> Duration {
        Duration::from_millis(self.settle_interval_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn finish_poll_interval(&self) -> Duration {
        Duration::from_millis(self.finish_poll_interval_ms)
    }

    pub fn lookup_backoff(&self) -> Duration {
        Duration::from_millis(self.lookup_backoff_ms)
    }

    pub fn finalize_settle(&self) -> Duration {
        self.settle_interval() * self.finalize_settle_multiplier
    }
}

/// Replay client HTTP API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayApiConfig {
    #[serde(default = "default_replay_base_url")]
    pub base_url: String,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Shell command that closes the game client.
    #[serde(default = "default_close_game_command")]
    pub close_command: String,
}

fn default_replay_base_url() -> String {
    "https://127.0.0.1:2999".to_string()
}

fn default_request_timeout_ms() -> u64 {
    3000
}

fn default_close_game_command() -> String {
    kill_by_name_command("League of Legends.exe")
}

impl Default for ReplayApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_replay_base_url(),
            request_timeout_ms: default_request_timeout_ms(),
            close_command: default_close_game_command(),
        }
    }
}

/// Capture tool driven through shell commands.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecorderConfig {
    /// Launches the capture tool.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_command: Option<String>,
    /// Begins writing a recording.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_command: Option<String>,
    /// Ends the current recording.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_command: Option<String>,
    /// Process name killed when closing the capture tool.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub process_name: Option<String>,
}

/// Crash reporter watched while the replay runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrashConfig {
    #[serde(default = "default_crash_process")]
    pub process_name: String,
}

fn default_crash_process() -> String {
    "BsSndRpt.exe".to_string()
}

impl Default for CrashConfig {
    fn default() -> Self {
        Self {
            process_name: default_crash_process(),
        }
    }
}

/// Launch command source and the script it is written to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaunchConfig {
    /// URL template with `{region}` and `{match_id}` placeholders.
    #[serde(default = "default_launch_url")]
    pub url_template: String,
    #[serde(default = "default_script_path")]
    pub script_path: PathBuf,
}

fn default_launch_url() -> String {
    "https://www.op.gg/api/v1.0/internal/bypass/spectates/{region}/{match_id}".to_string()
}

fn default_script_path() -> PathBuf {
    if cfg!(windows) {
        PathBuf::from("replay.bat")
    } else {
        PathBuf::from("replay.sh")
    }
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            url_template: default_launch_url(),
            script_path: default_script_path(),
        }
    }
}

/// Client settings file toggled around a capture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsConfig {
    #[serde(default = "default_settings_path")]
    pub path: PathBuf,
    /// Key/value pairs written by `enable`.
    #[serde(default = "default_enabled_settings")]
    pub enabled: BTreeMap<String, String>,
    /// Key/value pairs written by `disable`.
    #[serde(default = "default_disabled_settings")]
    pub disabled: BTreeMap<String, String>,
}

fn default_settings_path() -> PathBuf {
    PathBuf::from("C:\\Riot Games\\League of Legends\\Config\\game.cfg")
}

fn default_enabled_settings() -> BTreeMap<String, String> {
    BTreeMap::from([("EnableReplayApi".to_string(), "1".to_string())])
}

fn default_disabled_settings() -> BTreeMap<String, String> {
    BTreeMap::from([("EnableReplayApi".to_string(), "0".to_string())])
}

impl Default for SettingsConfig {
    fn default() -> Self {
        Self {
            path: default_settings_path(),
            enabled: default_enabled_settings(),
            disabled: default_disabled_settings(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RiotConfig {
    /// API key; usually supplied through `RIOT_API_KEY`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionFeedConfig {
    #[serde(default = "default_version_feed_url")]
    pub url: String,
}

fn default_version_feed_url() -> String {
    "https://raw.githubusercontent.com/CommunityDragon/Data/master/patches.json".to_string()
}

impl Default for VersionFeedConfig {
    fn default() -> Self {
        Self {
            url: default_version_feed_url(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueConfig {
    #[serde(default = "default_queue_path")]
    pub path: PathBuf,
}

fn default_queue_path() -> PathBuf {
    PathBuf::from("upload-queue.jsonl")
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            path: default_queue_path(),
        }
    }
}

/// The full contents of `spectator.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpectatorConfig {
    #[serde(default)]
    pub timing: OrchestratorConfig,
    #[serde(default)]
    pub replay_api: ReplayApiConfig,
    #[serde(default)]
    pub recorder: RecorderConfig,
    #[serde(default)]
    pub crash: CrashConfig,
    #[serde(default)]
    pub launch: LaunchConfig,
    #[serde(default)]
    pub settings: SettingsConfig,
    #[serde(default)]
    pub riot: RiotConfig,
    #[serde(default)]
    pub version_feed: VersionFeedConfig,
    #[serde(default)]
    pub queue: QueueConfig,
}

impl SpectatorConfig {
    /// Load configuration from a file, falling back to defaults if the file
    /// does not exist, then apply environment overrides.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            Self::parse(&content).with_context(|| format!("Failed to parse {}", path.display()))?
        } else {
            Self::default()
        };
        config.apply_env();
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Invalid spectator configuration")
    }

    /// Apply `SPECTATOR_OUTPUT_DIR` and `RIOT_API_KEY` overrides.
    pub fn apply_env(&mut self) {
        if let Ok(dir) = std::env::var("SPECTATOR_OUTPUT_DIR") {
            if !dir.is_empty() {
                self.timing.output_directory = PathBuf::from(dir);
            }
        }
        if let Ok(key) = std::env::var("RIOT_API_KEY") {
            if !key.is_empty() {
                self.riot.api_key = Some(key);
            }
        }
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration")
    }
}

/// Platform command that force-kills every process with the given name.
///
/// On unix the name is matched against the full command line, since `comm`
/// is truncated to 15 characters.
pub fn kill_by_name_command(process_name: &str) -> String {
    if cfg!(windows) {
        format!("taskkill /F /IM \"{}\"", process_name)
    } else {
        format!("pkill -f '{}'", command_line_pattern(process_name))
    }
}

/// `pgrep -f`/`pkill -f` pattern for a process name that does not match the
/// `sh -c` wrapper carrying it: the first character goes in a bracket class.
pub fn command_line_pattern(process_name: &str) -> String {
    let mut chars = process_name.chars();
    match chars.next() {
        Some(first) if first.is_alphanumeric() => format!("[{}]{}", first, chars.as_str()),
        _ => process_name.to_string(),
    }
}
