//! Contracts with the external programs and services a capture depends on.
//!
//! The orchestrator only talks to these traits. Concrete implementations live
//! in the submodules:
//! - `replay_api`: game client HTTP API
//! - `process`: shell-driven capture tool and crash detector
//! - `launcher`: launch command source and script launcher
//! - `settings`: client settings file toggle
//! - `lookup`: active match lookup through the Riot API
//! - `version`: latest game version feed
//! - `queue`: publication queue

pub mod launcher;
pub mod lookup;
pub mod process;
pub mod queue;
pub mod replay_api;
pub mod settings;
pub mod version;

use crate::errors::{CaptureError, LookupError};
use crate::match_info::{ActiveMatch, Item, PublicationJob, Runes, SummonerSpells};
use async_trait::async_trait;

pub use launcher::{HttpLaunchSource, ScriptLauncher};
pub use lookup::RiotMatchLocator;
pub use process::{CommandRecorder, ProcessCrashDetector};
pub use queue::JsonlQueue;
pub use replay_api::LiveReplayClient;
pub use settings::GameConfigToggle;
pub use version::HttpVersionFeed;

/// The replay client's query and control surface.
///
/// Must tolerate being queried before the client is reachable: such calls
/// fail with `CaptureError::Connectivity`.
#[async_trait]
pub trait ReplayClient: Send + Sync {
    /// Elapsed in-game time in seconds.
    async fn elapsed_time(&self) -> Result<f64, CaptureError>;

    async fn is_launched(&self) -> Result<bool, CaptureError>;

    /// Apply the display settings used while recording.
    async fn enable_recording_settings(&self) -> Result<(), CaptureError>;

    /// Client slot of the given champion. Fails with
    /// `CaptureError::PositionNotResolvable` if no active slot matches.
    async fn player_position(&self, champion: &str) -> Result<usize, CaptureError>;

    async fn skin(&self, champion: &str) -> Result<String, CaptureError>;

    async fn runes(&self, champion: &str) -> Result<Runes, CaptureError>;

    async fn summoner_spells(&self, champion: &str) -> Result<SummonerSpells, CaptureError>;

    async fn items(&self, champion: &str) -> Result<Vec<Item>, CaptureError>;

    /// Focus the camera on the player in the given slot.
    async fn select_player(&self, position: usize) -> Result<(), CaptureError>;

    /// Show the selected player's runes on screen.
    async fn show_runes(&self) -> Result<(), CaptureError>;

    /// Close the game client. Safe to call when it is not running.
    async fn close(&self) -> Result<(), CaptureError>;
}

#[async_trait]
pub trait CrashDetector: Send + Sync {
    async fn is_crashed(&self) -> bool;

    async fn kill_crashed_process(&self);
}

/// Capture tool control. All operations are idempotent.
#[async_trait]
pub trait Recorder: Send + Sync {
    /// Launch the capture tool.
    async fn start(&self) -> Result<(), CaptureError>;

    /// Begin writing a recording.
    async fn record(&self) -> Result<(), CaptureError>;

    /// End the current recording, if any.
    async fn stop(&self) -> Result<(), CaptureError>;

    /// Shut the capture tool down.
    async fn close(&self) -> Result<(), CaptureError>;
}

/// Turns a match id into the command text that launches a replay.
#[async_trait]
pub trait LaunchSource: Send + Sync {
    async fn launch_command(&self, match_id: &str, region: &str) -> Result<String, CaptureError>;
}

/// Starts the replay client from a launch command.
#[async_trait]
pub trait ReplayLauncher: Send + Sync {
    async fn launch(&self, command: &str) -> Result<(), CaptureError>;
}

/// Client display/recording settings. Both operations are idempotent.
#[async_trait]
pub trait SettingsToggle: Send + Sync {
    async fn enable(&self) -> Result<(), CaptureError>;

    async fn disable(&self) -> Result<(), CaptureError>;
}

#[async_trait]
pub trait MatchLocator: Send + Sync {
    /// The summoner's current match, or `LookupError::NotFound`.
    async fn active_match(&self, summoner: &str, region: &str)
    -> Result<ActiveMatch, LookupError>;
}

#[async_trait]
pub trait VersionFeed: Send + Sync {
    async fn latest_version(&self) -> anyhow::Result<String>;
}

#[async_trait]
pub trait PublicationQueue: Send + Sync {
    async fn enqueue(&self, job: PublicationJob) -> anyhow::Result<()>;
}

/// Every collaborator one orchestrator drives.
pub struct Collaborators {
    pub client: Box<dyn ReplayClient>,
    pub crash: Box<dyn CrashDetector>,
    pub recorder: Box<dyn Recorder>,
    pub launch_source: Box<dyn LaunchSource>,
    pub launcher: Box<dyn ReplayLauncher>,
    pub settings: Box<dyn SettingsToggle>,
    pub locator: Box<dyn MatchLocator>,
    pub version_feed: Box<dyn VersionFeed>,
    pub queue: Box<dyn PublicationQueue>,
}
