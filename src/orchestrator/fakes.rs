//! Scripted collaborators for orchestrator tests.
//!
//! Every fake records its calls in a shared `CallLog` so a test can inspect
//! the order of external effects after handing the fakes to the orchestrator.

use crate::errors::{CaptureError, LookupError};
use crate::external::{
    Collaborators, CrashDetector, LaunchSource, MatchLocator, PublicationQueue, Recorder,
    ReplayClient, ReplayLauncher, SettingsToggle, VersionFeed,
};
use crate::match_info::{ActiveMatch, Item, PublicationJob, Runes, SummonerSpells};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
pub struct CallLog {
    calls: Mutex<Vec<String>>,
}

impl CallLog {
    pub fn push(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, call: &str) -> usize {
        self.calls().iter().filter(|c| c.as_str() == call).count()
    }

    /// Calls recorded after the first occurrence of `marker`.
    pub fn after(&self, marker: &str) -> Vec<String> {
        let calls = self.calls();
        match calls.iter().position(|c| c == marker) {
            Some(i) => calls[i + 1..].to_vec(),
            None => Vec::new(),
        }
    }
}

/// Knobs for the scripted replay client.
#[derive(Debug, Default)]
pub struct ClientScript {
    /// `is_launched` fails with a connectivity error for this many polls.
    pub unreachable_polls: usize,
    /// `is_launched` returns `false` until this many polls have been made
    /// (counting unreachable ones).
    pub launched_after: usize,
    /// Fail `is_launched` with a launch error on this poll (1-based).
    pub launch_error_on_poll: Option<usize>,
    /// Elapsed times returned in order; the last value repeats.
    pub times: Vec<f64>,
    /// Slot returned by `player_position`; `None` fails to resolve.
    pub position: Option<usize>,
    /// Fail `items` with a connectivity error.
    pub items_unreachable: bool,
}

pub struct FakeClient {
    log: Arc<CallLog>,
    script: ClientScript,
    launch_polls: AtomicUsize,
    times: Mutex<VecDeque<f64>>,
    last_time: Mutex<f64>,
}

impl FakeClient {
    pub fn new(log: Arc<CallLog>, script: ClientScript) -> Self {
        let times = script.times.iter().copied().collect();
        Self {
            log,
            script,
            launch_polls: AtomicUsize::new(0),
            times: Mutex::new(times),
            last_time: Mutex::new(0.0),
        }
    }
}

#[async_trait]
impl ReplayClient for FakeClient {
    async fn elapsed_time(&self) -> Result<f64, CaptureError> {
        self.log.push("client.elapsed_time");
        let mut last = self.last_time.lock().unwrap();
        if let Some(next) = self.times.lock().unwrap().pop_front() {
            *last = next;
        }
        Ok(*last)
    }

    async fn is_launched(&self) -> Result<bool, CaptureError> {
        self.log.push("client.is_launched");
        let poll = self.launch_polls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.script.launch_error_on_poll == Some(poll) {
            return Err(CaptureError::launch("replay process exited"));
        }
        if poll <= self.script.unreachable_polls {
            return Err(CaptureError::connectivity(
                "https://127.0.0.1:2999/replay/game",
                "connection refused",
            ));
        }
        Ok(poll > self.script.launched_after)
    }

    async fn enable_recording_settings(&self) -> Result<(), CaptureError> {
        self.log.push("client.enable_recording_settings");
        Ok(())
    }

    async fn player_position(&self, champion: &str) -> Result<usize, CaptureError> {
        self.log.push("client.player_position");
        self.script
            .position
            .ok_or_else(|| CaptureError::PositionNotResolvable {
                champion: champion.to_string(),
            })
    }

    async fn skin(&self, _champion: &str) -> Result<String, CaptureError> {
        self.log.push("client.skin");
        Ok("Arcade".to_string())
    }

    async fn runes(&self, _champion: &str) -> Result<Runes, CaptureError> {
        self.log.push("client.runes");
        Ok(Runes {
            keystone: "Electrocute".into(),
            primary_tree: "Domination".into(),
            secondary_tree: "Sorcery".into(),
        })
    }

    async fn summoner_spells(&self, _champion: &str) -> Result<SummonerSpells, CaptureError> {
        self.log.push("client.summoner_spells");
        Ok(SummonerSpells {
            first: "Flash".into(),
            second: "Ignite".into(),
        })
    }

    async fn items(&self, _champion: &str) -> Result<Vec<Item>, CaptureError> {
        self.log.push("client.items");
        if self.script.items_unreachable {
            return Err(CaptureError::connectivity(
                "https://127.0.0.1:2999/liveclientdata/playerlist",
                "connection reset",
            ));
        }
        Ok(vec![Item {
            id: 3089,
            name: "Rabadon's Deathcap".into(),
        }])
    }

    async fn select_player(&self, position: usize) -> Result<(), CaptureError> {
        self.log.push(format!("client.select_player:{}", position));
        Ok(())
    }

    async fn show_runes(&self) -> Result<(), CaptureError> {
        self.log.push("client.show_runes");
        Ok(())
    }

    async fn close(&self) -> Result<(), CaptureError> {
        self.log.push("client.close");
        Ok(())
    }
}

/// Reports a crash from the given `is_crashed` call onwards (1-based).
pub struct FakeCrash {
    log: Arc<CallLog>,
    crash_on_check: Option<usize>,
    checks: AtomicUsize,
}

impl FakeCrash {
    pub fn new(log: Arc<CallLog>, crash_on_check: Option<usize>) -> Self {
        Self {
            log,
            crash_on_check,
            checks: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl CrashDetector for FakeCrash {
    async fn is_crashed(&self) -> bool {
        self.log.push("crash.is_crashed");
        let check = self.checks.fetch_add(1, Ordering::SeqCst) + 1;
        self.crash_on_check.is_some_and(|at| check >= at)
    }

    async fn kill_crashed_process(&self) {
        self.log.push("crash.kill");
    }
}

/// Recorder that writes a video file into the output directory when
/// recording begins.
pub struct FakeRecorder {
    log: Arc<CallLog>,
    output: Option<PathBuf>,
    recording: AtomicBool,
}

impl FakeRecorder {
    pub fn new(log: Arc<CallLog>, output: Option<PathBuf>) -> Self {
        Self {
            log,
            output,
            recording: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl Recorder for FakeRecorder {
    async fn start(&self) -> Result<(), CaptureError> {
        self.log.push("recorder.start");
        Ok(())
    }

    async fn record(&self) -> Result<(), CaptureError> {
        self.log.push("recorder.record");
        self.recording.store(true, Ordering::SeqCst);
        if let Some(ref path) = self.output {
            std::fs::write(path, b"partial video").unwrap();
        }
        Ok(())
    }

    async fn stop(&self) -> Result<(), CaptureError> {
        self.log.push("recorder.stop");
        self.recording.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn close(&self) -> Result<(), CaptureError> {
        self.log.push("recorder.close");
        Ok(())
    }
}

pub struct FakeLaunchSource {
    log: Arc<CallLog>,
}

#[async_trait]
impl LaunchSource for FakeLaunchSource {
    async fn launch_command(&self, match_id: &str, region: &str) -> Result<String, CaptureError> {
        self.log.push("launch_source.launch_command");
        Ok(format!("replay --match {} --region {}", match_id, region))
    }
}

pub struct FakeLauncher {
    log: Arc<CallLog>,
    fail: bool,
}

#[async_trait]
impl ReplayLauncher for FakeLauncher {
    async fn launch(&self, command: &str) -> Result<(), CaptureError> {
        self.log.push(format!("launcher.launch:{}", command));
        if self.fail {
            return Err(CaptureError::launch("spawn failed"));
        }
        Ok(())
    }
}

/// Idempotent settings toggle tracking its current state.
pub struct FakeSettings {
    log: Arc<CallLog>,
    pub enabled: Arc<AtomicBool>,
}

#[async_trait]
impl SettingsToggle for FakeSettings {
    async fn enable(&self) -> Result<(), CaptureError> {
        self.log.push("settings.enable");
        self.enabled.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn disable(&self) -> Result<(), CaptureError> {
        self.log.push("settings.disable");
        self.enabled.store(false, Ordering::SeqCst);
        Ok(())
    }
}

/// Returns "not found" for the first `not_found` lookups.
pub struct FakeLocator {
    log: Arc<CallLog>,
    not_found: usize,
    api_error: bool,
    lookups: AtomicUsize,
}

#[async_trait]
impl MatchLocator for FakeLocator {
    async fn active_match(
        &self,
        summoner: &str,
        region: &str,
    ) -> Result<ActiveMatch, LookupError> {
        self.log.push("locator.active_match");
        if self.api_error {
            return Err(LookupError::Api(anyhow::anyhow!("403 Forbidden")));
        }
        let lookup = self.lookups.fetch_add(1, Ordering::SeqCst) + 1;
        if lookup <= self.not_found {
            return Err(LookupError::NotFound {
                summoner: summoner.to_string(),
            });
        }
        Ok(ActiveMatch {
            id: "6543210".to_string(),
            region: region.to_string(),
        })
    }
}

pub struct FakeVersionFeed {
    available: bool,
}

#[async_trait]
impl VersionFeed for FakeVersionFeed {
    async fn latest_version(&self) -> anyhow::Result<String> {
        if self.available {
            Ok("14.3".to_string())
        } else {
            anyhow::bail!("feed unreachable")
        }
    }
}

pub struct FakeQueue {
    log: Arc<CallLog>,
    fail: bool,
    pub jobs: Arc<Mutex<Vec<PublicationJob>>>,
}

#[async_trait]
impl PublicationQueue for FakeQueue {
    async fn enqueue(&self, job: PublicationJob) -> anyhow::Result<()> {
        self.log.push("queue.enqueue");
        if self.fail {
            anyhow::bail!("queue file is read-only");
        }
        self.jobs.lock().unwrap().push(job);
        Ok(())
    }
}

/// Builder for a full set of fakes.
pub struct Fakes {
    pub log: Arc<CallLog>,
    pub client: ClientScript,
    pub crash_on_check: Option<usize>,
    pub output: Option<PathBuf>,
    pub launcher_fails: bool,
    pub not_found: usize,
    pub lookup_api_error: bool,
    pub version_available: bool,
    pub queue_fails: bool,
    pub settings_enabled: Arc<AtomicBool>,
    pub jobs: Arc<Mutex<Vec<PublicationJob>>>,
}

impl Fakes {
    /// A scripted match: launches on the third poll, starts at 10s of game
    /// time and ends when the clock freezes at 30s.
    pub fn new(output: Option<PathBuf>) -> Self {
        Self {
            log: Arc::new(CallLog::default()),
            client: ClientScript {
                unreachable_polls: 1,
                launched_after: 2,
                launch_error_on_poll: None,
                times: vec![0.0, 3.0, 10.0, 10.0, 20.0, 30.0, 30.0],
                position: Some(2),
                items_unreachable: false,
            },
            crash_on_check: None,
            output,
            launcher_fails: false,
            not_found: 0,
            lookup_api_error: false,
            version_available: true,
            queue_fails: false,
            settings_enabled: Arc::new(AtomicBool::new(false)),
            jobs: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn build(self) -> (Collaborators, FakeHandles) {
        let log = self.log;
        let handles = FakeHandles {
            log: log.clone(),
            settings_enabled: self.settings_enabled.clone(),
            jobs: self.jobs.clone(),
        };
        let collab = Collaborators {
            client: Box::new(FakeClient::new(log.clone(), self.client)),
            crash: Box::new(FakeCrash::new(log.clone(), self.crash_on_check)),
            recorder: Box::new(FakeRecorder::new(log.clone(), self.output)),
            launch_source: Box::new(FakeLaunchSource { log: log.clone() }),
            launcher: Box::new(FakeLauncher {
                log: log.clone(),
                fail: self.launcher_fails,
            }),
            settings: Box::new(FakeSettings {
                log: log.clone(),
                enabled: self.settings_enabled,
            }),
            locator: Box::new(FakeLocator {
                log: log.clone(),
                not_found: self.not_found,
                api_error: self.lookup_api_error,
                lookups: AtomicUsize::new(0),
            }),
            version_feed: Box::new(FakeVersionFeed {
                available: self.version_available,
            }),
            queue: Box::new(FakeQueue {
                log,
                fail: self.queue_fails,
                jobs: self.jobs,
            }),
        };
        (collab, handles)
    }
}

/// What a test can still observe after the fakes are moved.
pub struct FakeHandles {
    pub log: Arc<CallLog>,
    pub settings_enabled: Arc<AtomicBool>,
    pub jobs: Arc<Mutex<Vec<PublicationJob>>>,
}

impl FakeHandles {
    pub fn settings_enabled(&self) -> bool {
        self.settings_enabled.load(Ordering::SeqCst)
    }

    pub fn published(&self) -> usize {
        self.jobs.lock().unwrap().len()
    }
}
