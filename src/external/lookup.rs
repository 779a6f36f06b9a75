//! Active match lookup through the Riot API.

use super::MatchLocator;
use crate::errors::LookupError;
use crate::match_info::ActiveMatch;
use anyhow::anyhow;
use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::instrument;

#[derive(Debug, Deserialize)]
struct Account {
    puuid: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CurrentGame {
    game_id: i64,
}

/// Platform host and regional routing value for a region short name.
pub fn region_hosts(region: &str) -> Option<(&'static str, &'static str)> {
    let hosts = match region.to_uppercase().as_str() {
        "NA" => ("na1", "americas"),
        "BR" => ("br1", "americas"),
        "LAN" => ("la1", "americas"),
        "LAS" => ("la2", "americas"),
        "EUW" => ("euw1", "europe"),
        "EUNE" => ("eun1", "europe"),
        "TR" => ("tr1", "europe"),
        "RU" => ("ru", "europe"),
        "KR" => ("kr", "asia"),
        "JP" => ("jp1", "asia"),
        "OCE" => ("oc1", "sea"),
        _ => return None,
    };
    Some(hosts)
}

/// Split `"Name#TAG"` into game name and tag line.
pub fn split_riot_id(summoner: &str) -> Option<(&str, &str)> {
    let (name, tag) = summoner.rsplit_once('#')?;
    if name.is_empty() || tag.is_empty() {
        return None;
    }
    Some((name, tag))
}

pub struct RiotMatchLocator {
    http: reqwest::Client,
    api_key: Option<String>,
}

impl RiotMatchLocator {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
        }
    }

    async fn get<T: DeserializeOwned>(&self, url: &str, summoner: &str) -> Result<T, LookupError> {
        let key = self
            .api_key
            .as_deref()
            .ok_or_else(|| LookupError::Api(anyhow!("RIOT_API_KEY is not set")))?;

        let resp = self
            .http
            .get(url)
            .header("X-Riot-Token", key)
            .send()
            .await
            .map_err(|e| LookupError::Api(anyhow!("request to {} failed: {}", url, e)))?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(LookupError::NotFound {
                summoner: summoner.to_string(),
            });
        }
        if !resp.status().is_success() {
            return Err(LookupError::Api(anyhow!(
                "unexpected status {} for {}",
                resp.status(),
                url
            )));
        }

        resp.json::<T>()
            .await
            .map_err(|e| LookupError::Api(anyhow!("invalid response from {}: {}", url, e)))
    }
}

#[async_trait]
impl MatchLocator for RiotMatchLocator {
    #[instrument(skip(self))]
    async fn active_match(
        &self,
        summoner: &str,
        region: &str,
    ) -> Result<ActiveMatch, LookupError> {
        let (platform, routing) = region_hosts(region)
            .ok_or_else(|| LookupError::Api(anyhow!("unknown region '{}'", region)))?;
        let (name, tag) = split_riot_id(summoner).ok_or_else(|| {
            LookupError::Api(anyhow!("'{}' is not a Riot ID (Name#TAG)", summoner))
        })?;

        let account: Account = self
            .get(
                &format!(
                    "https://{}.api.riotgames.com/riot/account/v1/accounts/by-riot-id/{}/{}",
                    routing, name, tag
                ),
                summoner,
            )
            .await?;

        let game: CurrentGame = self
            .get(
                &format!(
                    "https://{}.api.riotgames.com/lol/spectator/v5/active-games/by-summoner/{}",
                    platform, account.puuid
                ),
                summoner,
            )
            .await?;

        Ok(ActiveMatch {
            id: game.game_id.to_string(),
            region: region.to_string(),
        })
    }
}
