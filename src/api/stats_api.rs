use std::time::Duration;

use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, error};

use crate::api::wire::{games_from_schedule, ScheduleResponse};
use crate::cache::{cache_key, TtlCache};
use crate::error::{ApiError, ApiResult};
use crate::models::Game;

const DEFAULT_BASE_URL: &str = "https://statsapi.mlb.com/api/v1";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Cached responses live for one hour before a re-fetch.
pub const CACHE_TTL: Duration = Duration::from_secs(60 * 60);

/// Hydrate directive asking the schedule endpoint to inline the sub-objects
/// the board renders, so one request covers a game card.
const SCHEDULE_HYDRATE: &str = "team,venue,probablePitcher,weather,linescore";

/// Client for the MLB Stats API.
///
/// Every public method memoizes its raw response in a TTL cache keyed by the
/// method name and its parameters. The mutex around the cache is held only
/// for the lookup and the store, never across the network call: two
/// overlapping requests for the same key may both fetch, and both writes
/// land the same remote truth.
pub struct StatsApiClient {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
    cache: Mutex<TtlCache<Value>>,
}

impl StatsApiClient {
    /// Client against the production stats API, honoring the
    /// `MLB_STATS_API_BASE_URL` override when set.
    pub fn new() -> Self {
        let base_url =
            std::env::var("MLB_STATS_API_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_owned());
        Self::with_base_url(base_url)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            timeout: REQUEST_TIMEOUT,
            cache: Mutex::new(TtlCache::new(CACHE_TTL)),
        }
    }

    /// All games scheduled on a date (`YYYY-MM-DD`). A day with no games is
    /// an empty list, not an error.
    pub async fn schedule(&self, date: &str) -> ApiResult<Vec<Game>> {
        let params = [
            ("sportId", "1".to_string()),
            ("date", date.to_string()),
            ("hydrate", SCHEDULE_HYDRATE.to_string()),
        ];
        let raw = self.cached_get("schedule", &params, "/schedule", &params).await?;
        Ok(games_from_schedule(decode("schedule", raw)?))
    }

    /// A single game by its identifier.
    pub async fn game(&self, game_pk: i64) -> ApiResult<Game> {
        let params = [
            ("sportId", "1".to_string()),
            ("gamePk", game_pk.to_string()),
            ("hydrate", SCHEDULE_HYDRATE.to_string()),
        ];
        let raw = self.cached_get("game", &params, "/schedule", &params).await?;
        let response: ScheduleResponse = decode("game", raw)?;
        games_from_schedule(response)
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::NotFound(format!("game {game_pk}")))
    }

    /// A team's regular-season games for one season, optionally restricted
    /// to one opponent and/or a most-recent-N limit. This is the sub-request
    /// primitive behind the history aggregates.
    pub async fn team_schedule(
        &self,
        team_id: i64,
        season: u16,
        opponent_id: Option<i64>,
        limit: Option<u32>,
    ) -> ApiResult<Vec<Game>> {
        let mut params = vec![
            ("sportId", "1".to_string()),
            ("teamId", team_id.to_string()),
            ("season", season.to_string()),
            ("gameType", "R".to_string()),
            ("hydrate", SCHEDULE_HYDRATE.to_string()),
        ];
        if let Some(opponent_id) = opponent_id {
            params.push(("opponentId", opponent_id.to_string()));
        }
        if let Some(limit) = limit {
            params.push(("limit", limit.to_string()));
        }

        let raw = self
            .cached_get("teamSchedule", &params, "/schedule", &params)
            .await?;
        Ok(games_from_schedule(decode("teamSchedule", raw)?))
    }

    /// Season hitting and pitching stats for a team. The payload is passed
    /// through opaque; downstream consumers pick what they need.
    pub async fn team_stats(&self, team_id: i64, season: u16) -> ApiResult<Value> {
        let key_params = [
            ("teamId", team_id.to_string()),
            ("season", season.to_string()),
        ];
        let query = [
            ("stats", "season".to_string()),
            ("group", "hitting,pitching".to_string()),
            ("season", season.to_string()),
        ];
        self.cached_get(
            "teamStats",
            &key_params,
            &format!("/teams/{team_id}/stats"),
            &query,
        )
        .await
    }

    /// Venue splits for one season, opaque.
    pub async fn venue_stats(&self, venue_id: i64, season: u16) -> ApiResult<Value> {
        let key_params = [
            ("venueId", venue_id.to_string()),
            ("season", season.to_string()),
        ];
        let query = [(
            "hydrate",
            format!("stats(group=[venue],season={season})"),
        )];
        self.cached_get(
            "venueStats",
            &key_params,
            &format!("/venues/{venue_id}"),
            &query,
        )
        .await
    }

    /// Head-to-head player splits for a set of people, opaque.
    pub async fn player_matchups(&self, person_ids: &[i64], season: u16) -> ApiResult<Value> {
        let ids = person_ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",");
        let params = [
            ("personIds", ids),
            (
                "hydrate",
                format!(
                    "stats(group=[hitting,pitching],type=[vsPlayer,statSplits],season={season})"
                ),
            ),
        ];
        self.cached_get("playerMatchups", &params, "/people", &params)
            .await
    }

    /// Check the cache for an aggregate result. Used by the history
    /// aggregator, which caches combined results under its own keys.
    pub(crate) async fn cache_fetch(&self, key: &str) -> Option<Value> {
        let hit = self.cache.lock().await.get(key);
        if hit.is_some() {
            debug!(key, "cache hit");
        }
        hit
    }

    pub(crate) async fn cache_store(&self, key: String, value: Value) {
        self.cache.lock().await.insert(key, value);
    }

    /// Cache-through GET. `key_params` identify the request logically and
    /// feed the cache key; `query` is what goes on the URL. The two differ
    /// only for endpoints with path-embedded identifiers.
    async fn cached_get(
        &self,
        method: &'static str,
        key_params: &[(&str, String)],
        path: &str,
        query: &[(&str, String)],
    ) -> ApiResult<Value> {
        let key = cache_key(method, key_params);
        if let Some(hit) = self.cache_fetch(&key).await {
            return Ok(hit);
        }

        let value = self.get_json(method, path, query).await?;
        self.cache_store(key, value.clone()).await;
        Ok(value)
    }

    /// One GET attempt with timeout and error classification. No retry.
    async fn get_json(
        &self,
        method: &'static str,
        path: &str,
        query: &[(&str, String)],
    ) -> ApiResult<Value> {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .query(query)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|err| {
                error!(method, ?query, %err, "stats api transport failure");
                ApiError::from_transport(method, err)
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            error!(method, ?query, %status, "stats api resource not found");
            return Err(ApiError::NotFound(format!("{method}: {url}")));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(method, ?query, %status, %body, "stats api request failed");
            return Err(ApiError::Remote {
                status: status.as_u16(),
                body,
            });
        }

        response.json::<Value>().await.map_err(|err| {
            error!(method, ?query, %err, "stats api response was not json");
            ApiError::Decode(format!("{method}: {err}"))
        })
    }
}

impl Default for StatsApiClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Deserialize a cached raw value, converting shape violations into the
/// typed error taxonomy instead of letting them escape as panics.
fn decode<T: serde::de::DeserializeOwned>(method: &'static str, raw: Value) -> ApiResult<T> {
    serde_json::from_value(raw).map_err(|err| {
        error!(method, %err, "stats api response shape mismatch");
        ApiError::Decode(format!("{method}: {err}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn schedule_maps_games_and_tolerates_missing_optionals() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/schedule")
            .match_query(mockito::Matcher::UrlEncoded("date".into(), "2024-07-01".into()))
            .with_status(200)
            .with_body(
                r#"{"dates":[{"games":[
                    {"gamePk":1,"teams":{"home":{"team":{"id":1,"name":"A"}},"away":{"team":{"id":2,"name":"B"}}},"venue":{"id":9,"name":"V"}}
                ]}]}"#,
            )
            .create_async()
            .await;

        let api = StatsApiClient::with_base_url(server.url());
        let games = api.schedule("2024-07-01").await.unwrap();

        mock.assert_async().await;
        assert_eq!(games.len(), 1);
        assert_eq!(games[0].game_pk, 1);
        assert_eq!(games[0].home.record.wins, 0);
        assert!(games[0].home.score.is_none());
    }

    #[tokio::test]
    async fn schedule_with_no_dates_is_empty() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/schedule")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        let api = StatsApiClient::with_base_url(server.url());
        let games = api.schedule("2024-12-25").await.unwrap();
        assert!(games.is_empty());
    }

    #[tokio::test]
    async fn repeated_request_is_served_from_cache() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/schedule")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(r#"{"dates":[]}"#)
            .expect(1)
            .create_async()
            .await;

        let api = StatsApiClient::with_base_url(server.url());
        api.schedule("2024-07-01").await.unwrap();
        api.schedule("2024-07-01").await.unwrap();

        // Exactly one remote hit despite two logical requests.
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn team_stats_is_cached_per_team_and_season() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/teams/5/stats")
            .match_query(mockito::Matcher::UrlEncoded("season".into(), "2024".into()))
            .with_status(200)
            .with_body(r#"{"stats":[{"group":{"displayName":"hitting"}}]}"#)
            .expect(1)
            .create_async()
            .await;

        let api = StatsApiClient::with_base_url(server.url());
        let first = api.team_stats(5, 2024).await.unwrap();
        let second = api.team_stats(5, 2024).await.unwrap();

        mock.assert_async().await;
        assert_eq!(first, second);
        assert!(first["stats"].is_array());
    }

    #[tokio::test]
    async fn not_found_is_classified() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/schedule")
            .match_query(mockito::Matcher::Any)
            .with_status(404)
            .create_async()
            .await;

        let api = StatsApiClient::with_base_url(server.url());
        let err = api.schedule("2024-07-01").await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)), "got: {err}");
    }

    #[tokio::test]
    async fn server_error_carries_status_and_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/schedule")
            .match_query(mockito::Matcher::Any)
            .with_status(502)
            .with_body("bad gateway")
            .create_async()
            .await;

        let api = StatsApiClient::with_base_url(server.url());
        match api.schedule("2024-07-01").await.unwrap_err() {
            ApiError::Remote { status, body } => {
                assert_eq!(status, 502);
                assert_eq!(body, "bad gateway");
            }
            other => panic!("expected Remote, got: {other}"),
        }
    }

    #[tokio::test]
    async fn unreachable_host_is_a_network_error() {
        // Port 9 on localhost refuses connections.
        let api = StatsApiClient::with_base_url("http://127.0.0.1:9");
        let err = api.schedule("2024-07-01").await.unwrap_err();
        assert!(matches!(err, ApiError::Network(_)), "got: {err}");
    }

    #[tokio::test]
    async fn missing_game_is_not_found() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/schedule")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(r#"{"dates":[]}"#)
            .create_async()
            .await;

        let api = StatsApiClient::with_base_url(server.url());
        let err = api.game(999).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    #[ignore]
    async fn live_schedule_fetch() {
        dotenv::dotenv().ok();
        let api = StatsApiClient::new();
        let games = api.schedule("2024-07-01").await.unwrap();
        assert!(!games.is_empty());
    }
}
