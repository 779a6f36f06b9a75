use crate::orchestrator::MatchPhase;
use crate::ui::icons::{BROOM, CAMERA, CHECK, CLOCK, CROSS, INBOX};
use console::style;

const PREFIX: &str = "[SPECTATOR]";

/// Human-readable status lines printed as a capture moves through its phases.
///
/// A quiet reporter prints nothing; structured `tracing` events are emitted
/// independently of this.
#[derive(Debug, Clone, Copy)]
pub struct StatusLine {
    enabled: bool,
}

impl StatusLine {
    pub fn new() -> Self {
        Self { enabled: true }
    }

    pub fn quiet() -> Self {
        Self { enabled: false }
    }

    fn print(&self, msg: impl AsRef<str>) {
        if self.enabled {
            println!("{} - {}", style(PREFIX).bold().dim(), msg.as_ref());
        }
    }

    pub fn phase(&self, phase: MatchPhase) {
        let icon = match phase {
            MatchPhase::Recording => CAMERA.to_string(),
            MatchPhase::AwaitingLaunch
            | MatchPhase::AwaitingStart
            | MatchPhase::AwaitingFinish => CLOCK.to_string(),
            _ => String::new(),
        };
        self.print(format!("{}{}", icon, style(phase.description()).cyan()));
    }

    pub fn info(&self, msg: impl AsRef<str>) {
        self.print(msg);
    }

    pub fn success(&self, msg: impl AsRef<str>) {
        self.print(format!("{}{}", CHECK, style(msg.as_ref()).green()));
    }

    pub fn failure(&self, msg: impl AsRef<str>) {
        self.print(format!("{}{}", CROSS, style(msg.as_ref()).red()));
    }

    pub fn cleanup(&self, msg: impl AsRef<str>) {
        self.print(format!("{}{}", BROOM, msg.as_ref()));
    }

    pub fn queued(&self, msg: impl AsRef<str>) {
        self.print(format!("{}{}", INBOX, style(msg.as_ref()).green()));
    }
}

impl Default for StatusLine {
    fn default() -> Self {
        Self::new()
    }
}
