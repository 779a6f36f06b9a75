use serde::{Deserialize, Serialize};

/// Phases a single spectate attempt moves through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPhase {
    Idle,
    LookingUp,
    Launching,
    AwaitingLaunch,
    Settling,
    AwaitingStart,
    Recording,
    AwaitingFinish,
    Finalizing,
    Done,
    Failed,
}

impl MatchPhase {
    /// Whether the orchestrator may move from `self` to `next`.
    ///
    /// Every phase from `Launching` onwards may fail. `LookingUp` may end in
    /// `Done` when the summoner is not in a game.
    pub fn can_transition_to(self, next: MatchPhase) -> bool {
        use MatchPhase::*;
        match (self, next) {
            (Idle, LookingUp) => true,
            (LookingUp, Launching) | (LookingUp, Done) | (LookingUp, Failed) => true,
            (Launching, AwaitingLaunch) => true,
            (AwaitingLaunch, Settling) => true,
            (Settling, AwaitingStart) => true,
            (AwaitingStart, Recording) => true,
            (Recording, AwaitingFinish) => true,
            (AwaitingFinish, Finalizing) => true,
            (Finalizing, Done) => true,
            (
                Launching | AwaitingLaunch | Settling | AwaitingStart | Recording
                | AwaitingFinish | Finalizing,
                Failed,
            ) => true,
            _ => false,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, MatchPhase::Done | MatchPhase::Failed)
    }

    /// Status line shown when the phase is entered.
    pub fn description(self) -> &'static str {
        match self {
            MatchPhase::Idle => "Idle",
            MatchPhase::LookingUp => "Looking up active match",
            MatchPhase::Launching => "Launching replay",
            MatchPhase::AwaitingLaunch => "Waiting for game to launch",
            MatchPhase::Settling => "Applying recording settings",
            MatchPhase::AwaitingStart => "Waiting for match to start",
            MatchPhase::Recording => "Recording",
            MatchPhase::AwaitingFinish => "Waiting for game to end",
            MatchPhase::Finalizing => "Finalizing capture",
            MatchPhase::Done => "Done",
            MatchPhase::Failed => "Failed",
        }
    }
}

impl std::fmt::Display for MatchPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            MatchPhase::Idle => "idle",
            MatchPhase::LookingUp => "looking_up",
            MatchPhase::Launching => "launching",
            MatchPhase::AwaitingLaunch => "awaiting_launch",
            MatchPhase::Settling => "settling",
            MatchPhase::AwaitingStart => "awaiting_start",
            MatchPhase::Recording => "recording",
            MatchPhase::AwaitingFinish => "awaiting_finish",
            MatchPhase::Finalizing => "finalizing",
            MatchPhase::Done => "done",
            MatchPhase::Failed => "failed",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use MatchPhase::*;

    const HAPPY_PATH: [MatchPhase; 10] = [
        Idle,
        LookingUp,
        Launching,
        AwaitingLaunch,
        Settling,
        AwaitingStart,
        Recording,
        AwaitingFinish,
        Finalizing,
        Done,
    ];

    #[test]
    fn test_happy_path_transitions_are_valid() {
        for pair in HAPPY_PATH.windows(2) {
            assert!(
                pair[0].can_transition_to(pair[1]),
                "{} -> {} should be valid",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn test_phases_cannot_be_skipped() {
        assert!(!Launching.can_transition_to(Recording));
        assert!(!AwaitingLaunch.can_transition_to(AwaitingStart));
        assert!(!Idle.can_transition_to(Launching));
    }

    #[test]
    fn test_capture_phases_may_fail() {
        for phase in &HAPPY_PATH[2..9] {
            assert!(phase.can_transition_to(Failed), "{} -> failed", phase);
        }
        assert!(!Idle.can_transition_to(Failed));
    }

    #[test]
    fn test_terminal_phases_have_no_exits() {
        for next in HAPPY_PATH {
            assert!(!Done.can_transition_to(next));
            assert!(!Failed.can_transition_to(next));
        }
        assert!(Done.is_terminal());
        assert!(Failed.is_terminal());
        assert!(!Recording.is_terminal());
    }

    #[test]
    fn test_not_in_game_ends_lookup() {
        assert!(LookingUp.can_transition_to(Done));
    }

    #[test]
    fn test_display_is_snake_case() {
        assert_eq!(AwaitingFinish.to_string(), "awaiting_finish");
        assert_eq!(
            serde_json::to_string(&AwaitingFinish).unwrap(),
            "\"awaiting_finish\""
        );
    }
}
