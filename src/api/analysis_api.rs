//! Client for the language-model analysis service.
//!
//! The model's answer is treated as an opaque black box: the only contract
//! is that the completion content parses as JSON. Nothing downstream
//! validates a schema on it.

use std::time::Duration;

use serde_json::{json, Value};
use tracing::error;

use crate::api::history::HistoricalData;
use crate::error::{ApiError, ApiResult};
use crate::models::Game;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug)]
pub struct AnalysisClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    timeout: Duration,
}

impl AnalysisClient {
    /// Build the client from the environment. A missing key is an immediate
    /// typed failure at the call site, never a silently degraded client.
    pub fn from_env() -> ApiResult<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| ApiError::MissingConfig("OPENAI_API_KEY"))?;
        let model = std::env::var("OPENAI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_owned());
        Ok(Self::new(api_key, model))
    }

    pub fn new(api_key: String, model: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: DEFAULT_BASE_URL.to_owned(),
            model,
            timeout: REQUEST_TIMEOUT,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Submit a prompt and return the model's JSON answer.
    pub async fn analyze(&self, prompt: &str) -> ApiResult<Value> {
        let body = json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": prompt }],
            "response_format": { "type": "json_object" },
        });

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|err| {
                error!(%err, "analysis api transport failure");
                ApiError::from_transport("analyze", err)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(%status, %body, "analysis api request failed");
            return Err(ApiError::Remote {
                status: status.as_u16(),
                body,
            });
        }

        let completion: Value = response.json().await.map_err(|err| {
            error!(%err, "analysis api response was not json");
            ApiError::Decode(format!("analyze: {err}"))
        })?;

        let content = completion["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| {
                error!("analysis api returned no completion content");
                ApiError::Decode("analyze: no content in completion".to_owned())
            })?;

        serde_json::from_str(content).map_err(|err| {
            error!(%err, "analysis content was not valid json");
            ApiError::Decode(format!("analyze: {err}"))
        })
    }
}

/// Render the analysis prompt from the game, the caller's selected metric
/// names, and (when already fetched) the historical bundle.
pub fn build_game_prompt(
    game: &Game,
    metrics: &[String],
    historical: Option<&HistoricalData>,
) -> String {
    let date = game
        .game_date
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "TBD".to_string());

    let mut prompt = format!(
        "Analyze this MLB game for betting purposes:\n\n\
         Game Information:\n\
         {matchup}\n\
         Date: {date}\n\
         Venue: {venue}\n\n\
         Selected Analysis Points:\n\
         {metrics}\n",
        matchup = game.matchup(),
        date = date,
        venue = game.venue.name,
        metrics = metrics.join(", "),
    );

    if let Some(historical) = historical {
        prompt.push_str(&format!(
            "\nAvailable Data:\n{}\n",
            serde_json::to_string_pretty(historical).unwrap_or_default()
        ));
    }

    prompt.push_str(
        "\nPlease provide:\n\
         1. Detailed statistical analysis of the selected data points\n\
         2. Key insights and patterns identified\n\
         3. Specific betting recommendations with confidence levels\n\
         4. Risk factors and potential impact on predictions\n\n\
         Format as JSON with:\n\
         - Analysis of each data point\n\
         - Betting recommendations\n\
         - Confidence scores\n\
         - Risk assessment\n",
    );

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GameSide, GameStatus, Team, TeamRecord, Venue};

    fn sample_game() -> Game {
        Game {
            game_pk: 1,
            game_date: None,
            status: GameStatus::Preview,
            home: GameSide {
                team: Team {
                    id: 1,
                    name: "Dodgers".into(),
                    abbreviation: None,
                    venue_name: None,
                },
                record: TeamRecord::default(),
                score: None,
                probable_pitcher: None,
            },
            away: GameSide {
                team: Team {
                    id: 2,
                    name: "Giants".into(),
                    abbreviation: None,
                    venue_name: None,
                },
                record: TeamRecord::default(),
                score: None,
                probable_pitcher: None,
            },
            venue: Venue {
                id: 22,
                name: "Dodger Stadium".into(),
            },
            weather: None,
        }
    }

    #[test]
    fn prompt_names_the_matchup_and_metrics() {
        let prompt = build_game_prompt(
            &sample_game(),
            &["recent_games".to_string(), "vs_team".to_string()],
            None,
        );
        assert!(prompt.contains("Giants @ Dodgers"));
        assert!(prompt.contains("Dodger Stadium"));
        assert!(prompt.contains("recent_games, vs_team"));
        assert!(prompt.contains("Format as JSON"));
    }

    #[tokio::test]
    async fn analyze_unwraps_the_completion_content() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(
                r#"{"choices":[{"message":{"content":"{\"prediction\":{\"winner\":\"Dodgers\"}}"}}]}"#,
            )
            .create_async()
            .await;

        let client = AnalysisClient::new("test-key".into(), "gpt-4".into())
            .with_base_url(server.url());
        let analysis = client.analyze("prompt").await.unwrap();
        assert_eq!(analysis["prediction"]["winner"], "Dodgers");
    }

    #[tokio::test]
    async fn analyze_rejects_non_json_content() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(r#"{"choices":[{"message":{"content":"not json"}}]}"#)
            .create_async()
            .await;

        let client = AnalysisClient::new("test-key".into(), "gpt-4".into())
            .with_base_url(server.url());
        let err = client.analyze("prompt").await.unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)), "got: {err}");
    }

    #[test]
    fn from_env_fails_loudly_without_a_key() {
        // Serialize access to the process environment with a local lock.
        static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
        let _guard = ENV_LOCK.lock().unwrap();

        let saved = std::env::var("OPENAI_API_KEY").ok();
        std::env::remove_var("OPENAI_API_KEY");

        let err = AnalysisClient::from_env().unwrap_err();
        assert!(matches!(err, ApiError::MissingConfig("OPENAI_API_KEY")));

        if let Some(value) = saved {
            std::env::set_var("OPENAI_API_KEY", value);
        }
    }
}
