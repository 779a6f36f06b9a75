//! Shell-driven collaborators: the capture tool and the crash detector.

use super::{CrashDetector, Recorder};
use crate::config::{CrashConfig, RecorderConfig, command_line_pattern, kill_by_name_command};
use crate::errors::CaptureError;
use async_trait::async_trait;
use std::process::{Output, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::process::Command;
use tracing::{debug, warn};

fn shell(command: &str) -> Command {
    if cfg!(windows) {
        let mut cmd = Command::new("cmd");
        cmd.arg("/C").arg(command);
        cmd
    } else {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(command);
        cmd
    }
}

/// Run a shell command to completion and capture its output.
pub async fn run_shell(command: &str) -> Result<Output, CaptureError> {
    debug!(command, "running shell command");
    shell(command)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|e| CaptureError::launch_io(format!("Failed to run '{}'", command), e))
}

/// Run a shell command and require a zero exit status.
pub async fn run_checked(command: &str) -> Result<(), CaptureError> {
    let output = run_shell(command).await?;
    if output.status.success() {
        return Ok(());
    }
    let stderr = String::from_utf8_lossy(&output.stderr);
    Err(CaptureError::launch(format!(
        "'{}' exited with code {}: {}",
        command,
        output.status.code().unwrap_or(-1),
        stderr.trim()
    )))
}

/// Spawn a shell command without waiting for it to finish.
pub fn spawn_detached(command: &str) -> Result<(), CaptureError> {
    debug!(command, "spawning detached command");
    shell(command)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map(|_| ())
        .map_err(|e| CaptureError::launch_io(format!("Failed to spawn '{}'", command), e))
}

/// Kill every process with the given name. A missing process is not an error.
pub async fn kill_by_name(process_name: &str) -> Result<(), CaptureError> {
    run_shell(&kill_by_name_command(process_name)).await.map(|_| ())
}

/// Whether a process with the given name is currently running.
pub async fn process_running(process_name: &str) -> Result<bool, CaptureError> {
    if cfg!(windows) {
        let filter = format!(
            "tasklist /NH /FI \"IMAGENAME eq {}\"",
            process_name
        );
        let output = run_shell(&filter).await?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(stdout
            .to_lowercase()
            .contains(&process_name.to_lowercase()))
    } else {
        let pattern = command_line_pattern(process_name);
        let output = run_shell(&format!("pgrep -f '{}'", pattern)).await?;
        Ok(output.status.success())
    }
}

/// Capture tool controlled by configured shell commands.
///
/// Tracks whether this process started a recording so that a repeated
/// `record` does not restart it.
pub struct CommandRecorder {
    config: RecorderConfig,
    recording: AtomicBool,
}

impl CommandRecorder {
    pub fn new(config: RecorderConfig) -> Self {
        Self {
            config,
            recording: AtomicBool::new(false),
        }
    }

    pub fn is_recording(&self) -> bool {
        self.recording.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Recorder for CommandRecorder {
    async fn start(&self) -> Result<(), CaptureError> {
        if let Some(ref process) = self.config.process_name {
            if process_running(process).await? {
                debug!(process, "capture tool already running");
                return Ok(());
            }
        }
        match self.config.start_command {
            Some(ref cmd) => spawn_detached(cmd),
            None => Ok(()),
        }
    }

    async fn record(&self) -> Result<(), CaptureError> {
        if self.recording.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        if let Some(ref cmd) = self.config.record_command {
            if let Err(e) = run_checked(cmd).await {
                self.recording.store(false, Ordering::SeqCst);
                return Err(e);
            }
        }
        Ok(())
    }

    /// Always runs the stop command, so a recording left behind by an
    /// earlier process is stopped too. A non-zero exit means nothing was
    /// recording.
    async fn stop(&self) -> Result<(), CaptureError> {
        self.recording.store(false, Ordering::SeqCst);
        let Some(ref cmd) = self.config.stop_command else {
            return Ok(());
        };
        let output = run_shell(cmd).await?;
        if !output.status.success() {
            debug!(code = output.status.code(), "stop command exited non-zero");
        }
        Ok(())
    }

    async fn close(&self) -> Result<(), CaptureError> {
        self.stop().await?;
        match self.config.process_name {
            Some(ref process) => kill_by_name(process).await,
            None => Ok(()),
        }
    }
}

/// Detects a crashed game client by the presence of its crash reporter.
pub struct ProcessCrashDetector {
    config: CrashConfig,
}

impl ProcessCrashDetector {
    pub fn new(config: CrashConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl CrashDetector for ProcessCrashDetector {
    async fn is_crashed(&self) -> bool {
        match process_running(&self.config.process_name).await {
            Ok(running) => running,
            Err(e) => {
                warn!(error = %e, "crash check failed, assuming no crash");
                false
            }
        }
    }

    async fn kill_crashed_process(&self) {
        if let Err(e) = kill_by_name(&self.config.process_name).await {
            warn!(error = %e, "failed to kill crash reporter");
        }
    }
}
