//! Records carried through a spectate attempt.
//!
//! `SpectateJob` is the input, `MatchInfo` is filled in phase by phase, and
//! `PublicationJob` is the immutable record handed to the publication queue.

use crate::errors::RosterError;
use crate::roster::{Roster, parse_rank};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// A request to spectate one summoner's current match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpectateJob {
    pub region: String,
    pub summoner_name: String,
    /// Players in draft order.
    pub players: Roster,
}

impl SpectateJob {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read job file {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse job file {}", path.display()))
    }
}

/// The active match resolved for a summoner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveMatch {
    pub id: String,
    pub region: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Runes {
    pub keystone: String,
    pub primary_tree: String,
    pub secondary_tree: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummonerSpells {
    pub first: String,
    pub second: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: u32,
    pub name: String,
}

/// Everything known about the match being captured.
///
/// Identity and roster fields are set before capture starts. The recording
/// artifacts are only appended during the capture phases; `path` is set once
/// the capture tool has produced its output file.
#[derive(Debug, Clone, Serialize)]
pub struct MatchInfo {
    pub match_id: String,
    pub region: String,
    pub summoner_name: String,
    pub rank: String,
    pub tier: String,
    pub lp: String,
    pub role: String,
    pub version: Option<String>,
    pub players: Roster,
    pub player_champion: String,
    pub enemy_champion: String,

    pub skin_name: Option<String>,
    pub runes: Option<Runes>,
    pub summoner_spells: Option<SummonerSpells>,
    pub items: Option<Vec<Item>>,
    pub path: Option<PathBuf>,
}

impl MatchInfo {
    /// Build the pre-capture record from a job and its resolved match.
    pub fn new(
        job: &SpectateJob,
        active: &ActiveMatch,
        version: Option<String>,
    ) -> Result<Self, RosterError> {
        let players = &job.players;
        let own = players.index_of(&job.summoner_name)?;
        let player = &players.entries()[own];
        let enemy = &players.entries()[players.opponent_index(own)];
        let (tier, lp) = parse_rank(&player.rank)?;

        Ok(Self {
            match_id: active.id.clone(),
            region: job.region.clone(),
            summoner_name: job.summoner_name.clone(),
            rank: player.rank.clone(),
            tier,
            lp,
            role: player.role.clone(),
            version,
            players: players.clone(),
            player_champion: player.champion.clone(),
            enemy_champion: enemy.champion.clone(),
            skin_name: None,
            runes: None,
            summoner_spells: None,
            items: None,
            path: None,
        })
    }

    /// Short human-readable label used in status lines and titles.
    pub fn title(&self) -> String {
        format!(
            "{} vs {} - {} {} {} LP",
            self.player_champion, self.enemy_champion, self.region, self.tier, self.lp
        )
    }
}

/// Immutable record queued for publication.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicationJob {
    pub id: Uuid,
    pub enqueued_at: DateTime<Utc>,
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub match_id: String,
    pub player_champion: String,
    pub enemy_champion: String,
    pub skin_name: String,
    pub items: Vec<Item>,
    pub runes: Runes,
    pub summoner_spells: SummonerSpells,
    pub path: PathBuf,
    pub region: String,
    pub tier: String,
    pub lp: String,
    pub role: String,
    pub version: Option<String>,
}

impl PublicationJob {
    /// Convert a fully captured match. Returns `None` if any capture
    /// artifact is still missing.
    pub fn from_match(info: &MatchInfo) -> Option<Self> {
        let path = info.path.clone()?;
        let mut tags = vec![
            info.player_champion.clone(),
            info.enemy_champion.clone(),
            info.role.clone(),
            info.tier.clone(),
            info.region.clone(),
        ];
        if let Some(ref version) = info.version {
            tags.push(format!("patch {}", version));
        }
        tags.retain(|t| !t.is_empty());

        let description = format!(
            "{} ({}) {} in {} - {} {} LP{}",
            info.summoner_name,
            info.player_champion,
            info.role,
            info.region,
            info.tier,
            info.lp,
            info.version
                .as_ref()
                .map(|v| format!(" - patch {}", v))
                .unwrap_or_default()
        );

        Some(Self {
            id: Uuid::new_v4(),
            enqueued_at: Utc::now(),
            title: info.title(),
            description,
            tags,
            match_id: info.match_id.clone(),
            player_champion: info.player_champion.clone(),
            enemy_champion: info.enemy_champion.clone(),
            skin_name: info.skin_name.clone()?,
            items: info.items.clone()?,
            runes: info.runes.clone()?,
            summoner_spells: info.summoner_spells.clone()?,
            path,
            region: info.region.clone(),
            tier: info.tier.clone(),
            lp: info.lp.clone(),
            role: info.role.clone(),
            version: info.version.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::tests::sample_roster;

    fn sample_job() -> SpectateJob {
        SpectateJob {
            region: "EUW".to_string(),
            summoner_name: "Alice".to_string(),
            players: sample_roster(&[
                "Zed", "Yuna", "Alice", "Xavier", "Wren", "Vic", "Uma", "Bob", "Sam", "Rin",
            ]),
        }
    }

    fn sample_match() -> ActiveMatch {
        ActiveMatch {
            id: "6543210".to_string(),
            region: "EUW".to_string(),
        }
    }

    #[test]
    fn test_match_info_derives_opponent_and_rank() {
        let info = MatchInfo::new(&sample_job(), &sample_match(), Some("14.3".into())).unwrap();
        assert_eq!(info.player_champion, "Champion2");
        assert_eq!(info.enemy_champion, "Champion7");
        assert_eq!(info.tier, "GOLD");
        assert_eq!(info.lp, "42");
        assert_eq!(info.match_id, "6543210");
        assert!(info.path.is_none());
    }

    #[test]
    fn test_match_info_requires_summoner_in_roster() {
        let mut job = sample_job();
        job.summoner_name = "Nobody".into();
        assert!(matches!(
            MatchInfo::new(&job, &sample_match(), None),
            Err(RosterError::MissingSummoner(_))
        ));
    }

    #[test]
    fn test_publication_job_requires_all_artifacts() {
        let mut info = MatchInfo::new(&sample_job(), &sample_match(), None).unwrap();
        assert!(PublicationJob::from_match(&info).is_none());

        info.skin_name = Some("Default".into());
        info.runes = Some(Runes::default());
        info.summoner_spells = Some(SummonerSpells::default());
        info.path = Some(PathBuf::from("/videos/match.mp4"));
        assert!(PublicationJob::from_match(&info).is_none());

        info.items = Some(vec![Item {
            id: 3031,
            name: "Infinity Edge".into(),
        }]);
        let job = PublicationJob::from_match(&info).unwrap();
        assert_eq!(job.path, PathBuf::from("/videos/match.mp4"));
        assert_eq!(job.tier, "GOLD");
        assert_eq!(job.items.len(), 1);
        assert!(job.tags.contains(&"Champion2".to_string()));
        assert!(job.title.contains("Champion2 vs Champion7"));
    }

    #[test]
    fn test_spectate_job_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("job.json");
        std::fs::write(&path, serde_json::to_string(&sample_job()).unwrap()).unwrap();
        let job = SpectateJob::load(&path).unwrap();
        assert_eq!(job.summoner_name, "Alice");
        assert_eq!(job.players.len(), 10);
    }

    #[test]
    fn test_spectate_job_load_rejects_short_roster() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("job.json");
        std::fs::write(
            &path,
            r#"{"region":"EUW","summoner_name":"Alice","players":[]}"#,
        )
        .unwrap();
        assert!(SpectateJob::load(&path).is_err());
    }
}
