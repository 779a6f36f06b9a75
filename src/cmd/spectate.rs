//! One spectate attempt: `spectator spectate <job>`.

use anyhow::{Context, Result};
use spectator::config::SpectatorConfig;
use spectator::external::{
    Collaborators, CommandRecorder, GameConfigToggle, HttpLaunchSource, HttpVersionFeed,
    JsonlQueue, LiveReplayClient, ProcessCrashDetector, RiotMatchLocator, ScriptLauncher,
};
use spectator::match_info::SpectateJob;
use spectator::orchestrator::{MatchOrchestrator, SpectateOutcome};
use spectator::ui::StatusLine;
use std::path::Path;
use tracing::info;

use super::super::Cli;

/// Wire the real collaborators described by the configuration.
pub fn build_collaborators(config: &SpectatorConfig) -> Result<Collaborators> {
    Ok(Collaborators {
        client: Box::new(LiveReplayClient::new(&config.replay_api)?),
        crash: Box::new(ProcessCrashDetector::new(config.crash.clone())),
        recorder: Box::new(CommandRecorder::new(config.recorder.clone())),
        launch_source: Box::new(HttpLaunchSource::new(config.launch.url_template.clone())),
        launcher: Box::new(ScriptLauncher::new(config.launch.script_path.clone())),
        settings: Box::new(GameConfigToggle::new(config.settings.clone())),
        locator: Box::new(RiotMatchLocator::new(config.riot.api_key.clone())),
        version_feed: Box::new(HttpVersionFeed::new(config.version_feed.url.clone())),
        queue: Box::new(JsonlQueue::new(config.queue.path.clone())),
    })
}

pub async fn cmd_spectate(cli: &Cli, job_path: &Path, output_dir: Option<&Path>) -> Result<()> {
    let job = SpectateJob::load(job_path)?;

    let mut config = super::load_config(cli)?;
    if let Some(dir) = output_dir {
        config.timing.output_directory = dir.to_path_buf();
    }
    if config.riot.api_key.is_none() {
        anyhow::bail!("No Riot API key configured. Set RIOT_API_KEY or [riot] api_key.");
    }

    let collab = build_collaborators(&config)?;
    let queue_path = config.queue.path.clone();
    let mut orchestrator = MatchOrchestrator::new(config.timing.clone(), collab);
    let status = StatusLine::new();

    let outcome = orchestrator
        .spectate(&job)
        .await
        .with_context(|| format!("Failed to spectate {}", job.summoner_name))?;

    match outcome {
        SpectateOutcome::NotInGame => {
            info!(summoner = %job.summoner_name, "no active match");
        }
        SpectateOutcome::Published(published) => {
            info!(id = %published.id, queue = %queue_path.display(), "publication job queued");
            status.success(format!("Job {} added to {}", published.id, queue_path.display()));
        }
        SpectateOutcome::Failed {
            error,
            removed_artifact,
        } => {
            info!(
                error = %error,
                removed = ?removed_artifact,
                "capture failed and was cleaned up"
            );
        }
    }

    Ok(())
}
