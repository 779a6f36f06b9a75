//! Ordered match roster and rank parsing.
//!
//! The roster order is the draft/display order reported for the match. The
//! first half of the entries is one team and the second half is the other,
//! so a player's lane opponent sits exactly one team-length further along.

use crate::errors::RosterError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::LazyLock;

/// Number of players in a spectated match.
pub const ROSTER_SIZE: usize = 10;

static RANK_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([a-zA-Z]*) \(([0-9]*) LP\)").expect("rank pattern is a valid static regex")
});

/// One player in the roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub summoner_name: String,
    pub champion: String,
    #[serde(default)]
    pub role: String,
    /// Display rank, e.g. `"GOLD (42 LP)"`.
    #[serde(default)]
    pub rank: String,
}

/// Ten players in draft order, validated on construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Roster {
    entries: Vec<RosterEntry>,
}

impl Roster {
    pub fn new(entries: Vec<RosterEntry>) -> Result<Self, RosterError> {
        if entries.len() != ROSTER_SIZE {
            return Err(RosterError::WrongSize {
                expected: ROSTER_SIZE,
                actual: entries.len(),
            });
        }

        let mut seen = HashSet::new();
        for entry in &entries {
            if !seen.insert(entry.summoner_name.as_str()) {
                return Err(RosterError::DuplicateSummoner(entry.summoner_name.clone()));
            }
        }

        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[RosterEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn team_size(&self) -> usize {
        self.entries.len() / 2
    }

    /// Position of a summoner in draft order.
    pub fn index_of(&self, summoner_name: &str) -> Result<usize, RosterError> {
        self.entries
            .iter()
            .position(|e| e.summoner_name == summoner_name)
            .ok_or_else(|| RosterError::MissingSummoner(summoner_name.to_string()))
    }

    pub fn opponent_index(&self, index: usize) -> usize {
        opponent_index(index, self.team_size(), self.len())
    }

    /// The lane opponent of the given summoner.
    pub fn opponent_of(&self, summoner_name: &str) -> Result<&RosterEntry, RosterError> {
        let own = self.index_of(summoner_name)?;
        Ok(&self.entries[self.opponent_index(own)])
    }

    /// Which half of the roster the entry at `index` belongs to (0 or 1).
    pub fn team_of(&self, index: usize) -> usize {
        index / self.team_size()
    }
}

impl<'de> Deserialize<'de> for Roster {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let entries = Vec::<RosterEntry>::deserialize(deserializer)?;
        Roster::new(entries).map_err(serde::de::Error::custom)
    }
}

/// Index of the lane opponent for the player at `index`.
pub fn opponent_index(index: usize, team_size: usize, roster_size: usize) -> usize {
    (index + team_size) % roster_size
}

/// Split a rank string such as `"GOLD (42 LP)"` into tier and league points.
pub fn parse_rank(rank: &str) -> Result<(String, String), RosterError> {
    let caps = RANK_PATTERN
        .captures(rank)
        .ok_or_else(|| RosterError::InvalidRank(rank.to_string()))?;
    let tier = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
    let lp = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
    Ok((tier.to_string(), lp.to_string()))
}
