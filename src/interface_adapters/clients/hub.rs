// Thin reqwest client for the external scoring hub. Both calls are
// fire-and-forget from the simulation's perspective: failures are logged and
// never mutate ship state.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug)]
pub enum HubError {
    Unavailable,
    BadStatus(StatusCode),
}

#[derive(Debug, Deserialize)]
struct CurrentGameResponse {
    #[serde(rename = "Players", default)]
    players: Vec<HubPlayer>,
}

#[derive(Debug, Clone, Deserialize)]
struct HubPlayer {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "PlayerKey")]
    player_key: String,
}

/// One player's final placement score.
#[derive(Debug, Clone)]
pub struct ScoreSubmission {
    pub score: u32,
    pub name: String,
    pub player_key: String,
}

#[derive(Debug, Serialize)]
struct ScorePayload<'a> {
    #[serde(rename = "HostedGameKey")]
    hosted_game_key: &'a str,
    #[serde(rename = "PlayerScores")]
    player_scores: Vec<PlayerScore<'a>>,
}

#[derive(Debug, Serialize)]
struct PlayerScore<'a> {
    #[serde(rename = "Score")]
    score: u32,
    #[serde(rename = "Player")]
    player: PlayerRef<'a>,
}

#[derive(Debug, Serialize)]
struct PlayerRef<'a> {
    #[serde(rename = "Name")]
    name: &'a str,
    #[serde(rename = "PlayerKey")]
    player_key: &'a str,
}

#[derive(Clone)]
pub struct HubClient {
    http: reqwest::Client,
    base_url: String,
    hosted_game_key: String,
}

impl HubClient {
    pub fn new(
        base_url: impl Into<String>,
        hosted_game_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into(),
            hosted_game_key: hosted_game_key.into(),
        })
    }

    /// Resolves a player's display name from the hub's current-game roster.
    pub async fn display_name(&self, player_key: &str) -> Result<Option<String>, HubError> {
        let url = format!("{}/Game/currentGame", self.base_url);
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|_| HubError::Unavailable)?;

        if !response.status().is_success() {
            return Err(HubError::BadStatus(response.status()));
        }

        let game = response
            .json::<CurrentGameResponse>()
            .await
            .map_err(|_| HubError::Unavailable)?;
        Ok(game
            .players
            .into_iter()
            .find(|player| player.player_key == player_key)
            .map(|player| player.name))
    }

    /// Submits final placement scores. Scores are already in [0, 100].
    pub async fn submit_scores(&self, scores: &[ScoreSubmission]) -> Result<(), HubError> {
        let url = format!("{}/Game/Score", self.base_url);
        let payload = ScorePayload {
            hosted_game_key: &self.hosted_game_key,
            player_scores: scores
                .iter()
                .map(|entry| PlayerScore {
                    score: entry.score.min(100),
                    player: PlayerRef {
                        name: &entry.name,
                        player_key: &entry.player_key,
                    },
                })
                .collect(),
        };

        let response = self
            .http
            .post(url)
            .json(&payload)
            .send()
            .await
            .map_err(|_| HubError::Unavailable)?;

        if !response.status().is_success() {
            return Err(HubError::BadStatus(response.status()));
        }
        Ok(())
    }
}
