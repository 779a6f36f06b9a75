pub mod runner;
pub mod state;

#[cfg(test)]
pub(crate) mod fakes;

pub use runner::{MatchOrchestrator, SpectateOutcome};
pub use state::MatchPhase;
