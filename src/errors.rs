//! Typed error hierarchy for the spectator.
//!
//! Four enums cover the stages of one spectate attempt:
//! - `CaptureError`: fatal conditions once the replay client is being driven
//! - `LookupError`: active-match lookup failures
//! - `RosterError`: malformed job input
//! - `SpectateError`: everything that reaches the caller before or after capture

use std::path::PathBuf;
use thiserror::Error;

/// Fatal conditions raised while a match is being captured.
///
/// Every variant is routed to the same cleanup routine by the orchestrator;
/// none of them is retried.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("Failed to launch process: {reason}")]
    Launch {
        reason: String,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("Lost connection to game client at {endpoint}: {reason}")]
    Connectivity { endpoint: String, reason: String },

    #[error("Game client crashed")]
    Crashed,

    #[error("Could not resolve a client slot for champion {champion}")]
    PositionNotResolvable { champion: String },

    #[error("Capture tool produced no output in {dir}: {reason}")]
    NoArtifact { dir: PathBuf, reason: String },

    #[error("Failed to update client settings at {path}: {source}")]
    Settings {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CaptureError {
    pub fn launch(reason: impl Into<String>) -> Self {
        CaptureError::Launch {
            reason: reason.into(),
            source: None,
        }
    }

    pub fn launch_io(reason: impl Into<String>, source: std::io::Error) -> Self {
        CaptureError::Launch {
            reason: reason.into(),
            source: Some(source),
        }
    }

    pub fn connectivity(endpoint: impl Into<String>, reason: impl ToString) -> Self {
        CaptureError::Connectivity {
            endpoint: endpoint.into(),
            reason: reason.to_string(),
        }
    }

    /// Whether the pre-launch poll may treat this as "not launched yet".
    pub fn is_transient(&self) -> bool {
        matches!(self, CaptureError::Connectivity { .. })
    }
}

/// Errors from looking up a summoner's active match.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("Summoner {summoner} has no active match")]
    NotFound { summoner: String },

    #[error("Match lookup failed: {0}")]
    Api(#[source] anyhow::Error),
}

/// Errors from validating a spectate job's roster.
#[derive(Debug, Error)]
pub enum RosterError {
    #[error("Roster must hold {expected} players, got {actual}")]
    WrongSize { expected: usize, actual: usize },

    #[error("Summoner {0} is not part of the roster")]
    MissingSummoner(String),

    #[error("Summoner {0} appears more than once in the roster")]
    DuplicateSummoner(String),

    #[error("Unrecognized rank string '{0}'")]
    InvalidRank(String),
}

/// Errors surfaced to the caller of a spectate attempt.
///
/// Capture failures are not part of this enum: they end in
/// `SpectateOutcome::Failed` after cleanup.
#[derive(Debug, Error)]
pub enum SpectateError {
    #[error(transparent)]
    Roster(#[from] RosterError),

    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error("Failed to hand off finished match: {0}")]
    Handoff(#[source] anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_error_launch_carries_io_source() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "replay.bat missing");
        let err = CaptureError::launch_io("spawn replay script", io_err);
        match &err {
            CaptureError::Launch {
                source: Some(e), ..
            } => assert_eq!(e.kind(), std::io::ErrorKind::NotFound),
            _ => panic!("Expected Launch with source"),
        }
        assert!(err.to_string().contains("spawn replay script"));
    }

    #[test]
    fn only_connectivity_is_transient() {
        assert!(CaptureError::connectivity("https://127.0.0.1:2999", "refused").is_transient());
        assert!(!CaptureError::launch("exit 1").is_transient());
        assert!(!CaptureError::Crashed.is_transient());
        assert!(
            !CaptureError::PositionNotResolvable {
                champion: "Ahri".into()
            }
            .is_transient()
        );
    }

    #[test]
    fn position_error_names_champion() {
        let err = CaptureError::PositionNotResolvable {
            champion: "Jinx".into(),
        };
        assert!(err.to_string().contains("Jinx"));
    }

    #[test]
    fn spectate_error_converts_from_roster_error() {
        let err: SpectateError = RosterError::MissingSummoner("Alice".into()).into();
        match &err {
            SpectateError::Roster(RosterError::MissingSummoner(name)) => assert_eq!(name, "Alice"),
            _ => panic!("Expected SpectateError::Roster(MissingSummoner)"),
        }
    }

    #[test]
    fn lookup_not_found_is_matchable() {
        let err = LookupError::NotFound {
            summoner: "Bob".into(),
        };
        assert!(matches!(err, LookupError::NotFound { .. }));
        assert!(err.to_string().contains("Bob"));
    }

    #[test]
    fn all_error_types_implement_std_error_trait() {
        fn assert_std_error<E: std::error::Error>(_: &E) {}
        assert_std_error(&CaptureError::Crashed);
        assert_std_error(&RosterError::InvalidRank("x".into()));
        assert_std_error(&LookupError::NotFound {
            summoner: "x".into(),
        });
        assert_std_error(&SpectateError::Handoff(anyhow::anyhow!("queue full")));
    }
}
