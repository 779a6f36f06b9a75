use crate::artifact;
use crate::config::OrchestratorConfig;
use crate::errors::{CaptureError, LookupError, SpectateError};
use crate::external::Collaborators;
use crate::match_info::{ActiveMatch, MatchInfo, PublicationJob, SpectateJob};
use crate::orchestrator::state::MatchPhase;
use crate::ui::StatusLine;
use anyhow::anyhow;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

/// How a spectate attempt ended.
#[derive(Debug)]
pub enum SpectateOutcome {
    /// No active match was found within the lookup budget.
    NotInGame,
    /// The capture finished and was queued for publication.
    Published(PublicationJob),
    /// The capture failed; cleanup ran and any partial artifact was removed.
    Failed {
        error: CaptureError,
        removed_artifact: Option<PathBuf>,
    },
}

/// Drives one match through lookup, launch, recording and hand-off.
pub struct MatchOrchestrator {
    config: OrchestratorConfig,
    collab: Collaborators,
    status: StatusLine,
    phase: MatchPhase,
    history: Vec<MatchPhase>,
}

impl MatchOrchestrator {
    pub fn new(config: OrchestratorConfig, collab: Collaborators) -> Self {
        Self {
            config,
            collab,
            status: StatusLine::new(),
            phase: MatchPhase::Idle,
            history: vec![MatchPhase::Idle],
        }
    }

    pub fn with_status(mut self, status: StatusLine) -> Self {
        self.status = status;
        self
    }

    pub fn phase(&self) -> MatchPhase {
        self.phase
    }

    /// Every phase entered so far, starting with `Idle`.
    pub fn phase_history(&self) -> &[MatchPhase] {
        &self.history
    }

    fn enter(&mut self, next: MatchPhase) {
        if !self.phase.can_transition_to(next) {
            warn!(from = %self.phase, to = %next, "unexpected phase transition");
        }
        debug!(from = %self.phase, to = %next, "phase transition");
        self.phase = next;
        self.history.push(next);
        if !next.is_terminal() {
            self.status.phase(next);
        }
    }

    async fn pause(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }

    async fn settle(&self) {
        self.pause(self.config.settle_interval()).await;
    }

    /// Run one spectate attempt for the job's summoner.
    ///
    /// Capture failures do not surface as errors: they end in
    /// `SpectateOutcome::Failed` once cleanup has run. Errors are returned
    /// only for bad input, lookup failures, and a failed hand-off.
    pub async fn spectate(&mut self, job: &SpectateJob) -> Result<SpectateOutcome, SpectateError> {
        self.enter(MatchPhase::LookingUp);

        let active = match self.find_match(&job.summoner_name, &job.region).await {
            Ok(Some(active)) => active,
            Ok(None) => {
                self.status
                    .info(format!("\"{}\" is not in game", job.summoner_name));
                self.enter(MatchPhase::Done);
                return Ok(SpectateOutcome::NotInGame);
            }
            Err(e) => {
                self.enter(MatchPhase::Failed);
                return Err(e.into());
            }
        };

        let version = match self.collab.version_feed.latest_version().await {
            Ok(version) => Some(version),
            Err(e) => {
                warn!(error = %e, "game version unavailable, continuing without it");
                None
            }
        };

        let mut info = match MatchInfo::new(job, &active, version) {
            Ok(info) => info,
            Err(e) => {
                self.enter(MatchPhase::Failed);
                return Err(e.into());
            }
        };

        // A previous run may have left the capture tool or client open.
        self.cleanup().await;

        info!(match_id = %info.match_id, summoner = %info.summoner_name, "spectating");
        self.status.info(format!("Spectating {}", info.title()));

        match self.capture(&mut info).await {
            Ok(()) => self.finalize(&info).await.map(SpectateOutcome::Published),
            Err(error) => Ok(self.fail(error, &mut info).await),
        }
    }

    /// Query the active match, retrying "not found" up to the lookup budget.
    async fn find_match(
        &self,
        summoner: &str,
        region: &str,
    ) -> Result<Option<ActiveMatch>, LookupError> {
        let budget = self.config.lookup_retry_budget;
        for attempt in 1..=budget {
            match self.collab.locator.active_match(summoner, region).await {
                Ok(active) => return Ok(Some(active)),
                Err(LookupError::NotFound { .. }) => {
                    debug!(attempt, budget, summoner, "no active match yet");
                    if attempt < budget {
                        self.pause(self.config.lookup_backoff()).await;
                    }
                }
                Err(e) => return Err(e),
            }
        }
        Ok(None)
    }

    async fn capture(&mut self, info: &mut MatchInfo) -> Result<(), CaptureError> {
        self.enter(MatchPhase::Launching);
        self.collab.recorder.start().await?;
        self.collab.settings.enable().await?;
        self.settle().await;
        let command = self
            .collab
            .launch_source
            .launch_command(&info.match_id, &info.region)
            .await?;
        self.collab.launcher.launch(&command).await?;

        self.enter(MatchPhase::AwaitingLaunch);
        self.wait_for_launch().await?;

        self.enter(MatchPhase::Settling);
        self.settle().await;
        self.collab.client.enable_recording_settings().await?;
        self.settle().await;

        self.enter(MatchPhase::AwaitingStart);
        self.wait_for_start().await?;

        self.enter(MatchPhase::Recording);
        self.start_recording(info).await?;

        self.enter(MatchPhase::AwaitingFinish);
        self.wait_for_finish().await?;

        self.enter(MatchPhase::Finalizing);
        info.items = Some(self.collab.client.items(&info.player_champion).await?);
        self.cleanup().await;
        Ok(())
    }

    /// Poll until the replay client reports it has launched.
    ///
    /// Connectivity failures are expected until the client is up and count
    /// as "not launched yet".
    async fn wait_for_launch(&self) -> Result<(), CaptureError> {
        loop {
            match self.collab.client.is_launched().await {
                Ok(true) => {
                    self.status.info("Game has launched");
                    return Ok(());
                }
                Ok(false) => {}
                Err(e) if e.is_transient() => {
                    debug!(error = %e, "game not yet launched");
                }
                Err(e) => return Err(e),
            }
            if self.collab.crash.is_crashed().await {
                return Err(CaptureError::Crashed);
            }
            self.pause(self.config.poll_interval()).await;
        }
    }

    /// Poll until elapsed game time passes the start threshold.
    async fn wait_for_start(&self) -> Result<(), CaptureError> {
        loop {
            if self.collab.crash.is_crashed().await {
                return Err(CaptureError::Crashed);
            }
            let elapsed = self.collab.client.elapsed_time().await?;
            if elapsed > self.config.start_threshold_secs {
                self.status.info("Match has started");
                return Ok(());
            }
            self.pause(self.config.poll_interval()).await;
        }
    }

    async fn start_recording(&self, info: &mut MatchInfo) -> Result<(), CaptureError> {
        let champion = info.player_champion.clone();
        let client = &self.collab.client;

        info.skin_name = Some(client.skin(&champion).await?);
        info.runes = Some(client.runes(&champion).await?);
        info.summoner_spells = Some(client.summoner_spells(&champion).await?);
        let position = client.player_position(&champion).await?;

        client.select_player(position).await?;
        client.show_runes().await?;
        self.settle().await;

        self.collab.recorder.record().await?;
        self.settle().await;

        let dir = &self.config.output_directory;
        let path = artifact::newest_file(dir).map_err(|e| CaptureError::NoArtifact {
            dir: dir.clone(),
            reason: e.to_string(),
        })?;
        info!(path = %path.display(), "capture output located");
        info.path = Some(path);
        self.settle().await;
        Ok(())
    }

    /// Poll elapsed time until two consecutive reads are equal.
    ///
    /// A frozen clock means the game has ended. There is no upper bound on
    /// how long this waits.
    async fn wait_for_finish(&self) -> Result<(), CaptureError> {
        let mut current = self.collab.client.elapsed_time().await?;
        loop {
            self.pause(self.config.finish_poll_interval()).await;
            if self.collab.crash.is_crashed().await {
                return Err(CaptureError::Crashed);
            }
            let next = self.collab.client.elapsed_time().await?;
            if next == current {
                self.status.info("Game ended");
                return Ok(());
            }
            current = next;
        }
    }

    /// Stop recording and close everything a capture may have opened.
    ///
    /// Runs on every exit path, so failures are logged rather than returned.
    async fn cleanup(&self) {
        if let Err(e) = self.collab.recorder.stop().await {
            warn!(error = %e, "failed to stop recording");
        }
        if let Err(e) = self.collab.recorder.close().await {
            warn!(error = %e, "failed to close capture tool");
        }
        if let Err(e) = self.collab.client.close().await {
            warn!(error = %e, "failed to close game client");
        }
        if let Err(e) = self.collab.settings.disable().await {
            warn!(error = %e, "failed to revert client settings");
        }
    }

    async fn finalize(&mut self, info: &MatchInfo) -> Result<PublicationJob, SpectateError> {
        self.pause(self.config.finalize_settle()).await;

        let job = match PublicationJob::from_match(info) {
            Some(job) => job,
            None => {
                self.enter(MatchPhase::Failed);
                return Err(SpectateError::Handoff(anyhow!(
                    "capture of match {} is incomplete",
                    info.match_id
                )));
            }
        };

        if let Err(e) = self.collab.queue.enqueue(job.clone()).await {
            self.enter(MatchPhase::Failed);
            return Err(SpectateError::Handoff(e));
        }

        self.enter(MatchPhase::Done);
        self.status.queued(format!("Queued {}", job.title));
        Ok(job)
    }

    async fn fail(&mut self, error: CaptureError, info: &mut MatchInfo) -> SpectateOutcome {
        self.enter(MatchPhase::Failed);
        warn!(error = %error, match_id = %info.match_id, "capture failed");
        self.status
            .failure(format!("{} was raised during the process", error));

        self.collab.crash.kill_crashed_process().await;
        self.cleanup().await;
        self.settle().await;

        let removed_artifact = match info.path.take() {
            Some(path) => match artifact::remove(&path) {
                Ok(true) => {
                    self.status.cleanup(format!("{} Removed!", path.display()));
                    Some(path)
                }
                Ok(false) => {
                    debug!(path = %path.display(), "partial artifact already gone");
                    None
                }
                Err(e) => {
                    warn!(error = %e, "failed to remove partial artifact");
                    None
                }
            },
            None => None,
        };

        SpectateOutcome::Failed {
            error,
            removed_artifact,
        }
    }
}
