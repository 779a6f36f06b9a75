//! HTTP client for the replay client's local API.
//!
//! The replay client serves a self-signed HTTPS API on localhost once it is
//! running. Until then every request fails to connect, which callers see as
//! `CaptureError::Connectivity`.

use super::ReplayClient;
use super::process::run_shell;
use crate::config::ReplayApiConfig;
use crate::errors::CaptureError;
use crate::match_info::{Item, Runes, SummonerSpells};
use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, instrument};

#[derive(Debug, Deserialize)]
struct Playback {
    time: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DisplayName {
    display_name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LiveItem {
    #[serde(rename = "itemID")]
    item_id: u32,
    display_name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LiveRunes {
    keystone: DisplayName,
    primary_rune_tree: DisplayName,
    secondary_rune_tree: DisplayName,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LiveSpells {
    summoner_spell_one: DisplayName,
    summoner_spell_two: DisplayName,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LivePlayer {
    champion_name: String,
    #[serde(default)]
    summoner_name: String,
    #[serde(default)]
    skin_name: Option<String>,
    #[serde(default)]
    items: Vec<LiveItem>,
    runes: Option<LiveRunes>,
    summoner_spells: Option<LiveSpells>,
}

/// Client for the replay API at `base_url`.
pub struct LiveReplayClient {
    http: reqwest::Client,
    base_url: String,
    close_command: String,
}

impl LiveReplayClient {
    pub fn new(config: &ReplayApiConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .danger_accept_invalid_certs(true)
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .context("Failed to build replay API client")?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            close_command: config.close_command.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, CaptureError> {
        let url = self.url(path);
        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| CaptureError::connectivity(&url, e))?;
        if !resp.status().is_success() {
            return Err(CaptureError::connectivity(
                &url,
                format!("unexpected status {}", resp.status()),
            ));
        }
        resp.json::<T>()
            .await
            .map_err(|e| CaptureError::connectivity(&url, e))
    }

    async fn post_render(&self, body: serde_json::Value) -> Result<(), CaptureError> {
        let url = self.url("/replay/render");
        let resp = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| CaptureError::connectivity(&url, e))?;
        if !resp.status().is_success() {
            return Err(CaptureError::connectivity(
                &url,
                format!("unexpected status {}", resp.status()),
            ));
        }
        Ok(())
    }

    async fn players(&self) -> Result<Vec<LivePlayer>, CaptureError> {
        self.get_json("/liveclientdata/playerlist").await
    }

    async fn player(&self, champion: &str) -> Result<LivePlayer, CaptureError> {
        self.players()
            .await?
            .into_iter()
            .find(|p| p.champion_name.eq_ignore_ascii_case(champion))
            .ok_or_else(|| CaptureError::PositionNotResolvable {
                champion: champion.to_string(),
            })
    }
}

#[async_trait]
impl ReplayClient for LiveReplayClient {
    async fn elapsed_time(&self) -> Result<f64, CaptureError> {
        let playback: Playback = self.get_json("/replay/playback").await?;
        Ok(playback.time)
    }

    async fn is_launched(&self) -> Result<bool, CaptureError> {
        let game: serde_json::Value = self.get_json("/replay/game").await?;
        Ok(game.get("processID").is_some())
    }

    #[instrument(skip(self))]
    async fn enable_recording_settings(&self) -> Result<(), CaptureError> {
        self.post_render(json!({
            "interfaceChat": false,
            "interfaceReplay": false,
            "interfaceTimeline": false,
            "interfaceScore": true,
            "interfaceFrames": true,
            "interfaceMinimap": true,
        }))
        .await
    }

    #[instrument(skip(self))]
    async fn player_position(&self, champion: &str) -> Result<usize, CaptureError> {
        self.players()
            .await?
            .iter()
            .position(|p| p.champion_name.eq_ignore_ascii_case(champion))
            .ok_or_else(|| CaptureError::PositionNotResolvable {
                champion: champion.to_string(),
            })
    }

    async fn skin(&self, champion: &str) -> Result<String, CaptureError> {
        let player = self.player(champion).await?;
        Ok(player.skin_name.unwrap_or_else(|| "default".to_string()))
    }

    async fn runes(&self, champion: &str) -> Result<Runes, CaptureError> {
        let player = self.player(champion).await?;
        Ok(player
            .runes
            .map(|r| Runes {
                keystone: r.keystone.display_name,
                primary_tree: r.primary_rune_tree.display_name,
                secondary_tree: r.secondary_rune_tree.display_name,
            })
            .unwrap_or_default())
    }

    async fn summoner_spells(&self, champion: &str) -> Result<SummonerSpells, CaptureError> {
        let player = self.player(champion).await?;
        Ok(player
            .summoner_spells
            .map(|s| SummonerSpells {
                first: s.summoner_spell_one.display_name,
                second: s.summoner_spell_two.display_name,
            })
            .unwrap_or_default())
    }

    async fn items(&self, champion: &str) -> Result<Vec<Item>, CaptureError> {
        let player = self.player(champion).await?;
        Ok(player
            .items
            .into_iter()
            .map(|i| Item {
                id: i.item_id,
                name: i.display_name,
            })
            .collect())
    }

    #[instrument(skip(self))]
    async fn select_player(&self, position: usize) -> Result<(), CaptureError> {
        let players = self.players().await?;
        let player = players
            .get(position)
            .ok_or_else(|| CaptureError::PositionNotResolvable {
                champion: format!("slot {}", position),
            })?;
        debug!(summoner = %player.summoner_name, "selecting player");
        self.post_render(json!({
            "selectionName": player.summoner_name,
            "cameraAttached": true,
        }))
        .await
    }

    async fn show_runes(&self) -> Result<(), CaptureError> {
        self.post_render(json!({ "interfaceScoreboard": true })).await
    }

    async fn close(&self) -> Result<(), CaptureError> {
        let output = run_shell(&self.close_command).await?;
        if !output.status.success() {
            // Non-zero when the client is already gone.
            debug!(code = output.status.code(), "close command exited non-zero");
        }
        Ok(())
    }
}
