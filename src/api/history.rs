//! Aggregate queries that combine several calendar-scoped schedule requests
//! into one historical view of a matchup.
//!
//! Sub-requests are issued concurrently and joined; if any one of them
//! fails, the whole aggregate fails and already-resolved sibling results are
//! dropped. Combined results are cached under the aggregate's own key, on
//! top of whatever the per-sub-request caching already saved.

use futures_util::future::{try_join, try_join4, try_join_all};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::error;

use crate::api::stats_api::StatsApiClient;
use crate::cache::cache_key;
use crate::error::{ApiError, ApiResult};
use crate::models::Game;
use crate::utils::season::{current_season, season_of, season_range};

/// Last-N-games window used for form queries.
pub const RECENT_FORM_LIMIT: u32 = 10;

/// Most recent games for each side of a matchup, fetched independently.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentForm {
    pub home: Vec<Game>,
    pub away: Vec<Game>,
}

/// Everything the research view shows for one game.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoricalData {
    pub head_to_head: Vec<Game>,
    pub recent_form: RecentForm,
    pub player_matchups: Value,
    pub venue_stats: Value,
}

impl StatsApiClient {
    /// Every meeting between two teams across an inclusive season range.
    ///
    /// One schedule sub-request per season, all in flight at once. The
    /// flattened result keeps sub-request (season) order; callers wanting
    /// strict chronology sort by `game_date` themselves.
    pub async fn head_to_head(
        &self,
        home_team: i64,
        away_team: i64,
        first_season: u16,
        last_season: u16,
    ) -> ApiResult<Vec<Game>> {
        let key_params = [
            ("homeTeam", home_team.to_string()),
            ("awayTeam", away_team.to_string()),
            ("firstSeason", first_season.to_string()),
            ("lastSeason", last_season.to_string()),
        ];
        let key = cache_key("headToHead", &key_params);
        if let Some(hit) = self.cache_fetch(&key).await {
            return decode_games(hit);
        }

        let seasons = season_range(first_season, last_season);
        let per_season = try_join_all(
            seasons
                .iter()
                .map(|&season| self.team_schedule(home_team, season, Some(away_team), None)),
        )
        .await?;

        let games: Vec<Game> = per_season.into_iter().flatten().collect();
        self.cache_store(key, encode_games(&games)?).await;
        Ok(games)
    }

    /// Last `limit` regular-season games for both teams, in parallel.
    pub async fn recent_form(
        &self,
        home_team: i64,
        away_team: i64,
        season: u16,
        limit: u32,
    ) -> ApiResult<RecentForm> {
        let (home, away) = try_join(
            self.team_schedule(home_team, season, None, Some(limit)),
            self.team_schedule(away_team, season, None, Some(limit)),
        )
        .await?;
        Ok(RecentForm { home, away })
    }

    /// The full historical bundle for one game: current-season head-to-head,
    /// player matchup splits, venue splits, and both teams' recent form.
    pub async fn historical_data(&self, game_pk: i64) -> ApiResult<HistoricalData> {
        let game = self.game(game_pk).await?;

        let season = game.game_date.map(season_of).unwrap_or_else(current_season);
        let home = game.home.team.id;
        let away = game.away.team.id;

        let (head_to_head, player_matchups, venue_stats, recent_form) = try_join4(
            self.head_to_head(home, away, season, season),
            self.player_matchups(&[home, away], season),
            self.venue_stats(game.venue.id, season),
            self.recent_form(home, away, season, RECENT_FORM_LIMIT),
        )
        .await?;

        Ok(HistoricalData {
            head_to_head,
            recent_form,
            player_matchups,
            venue_stats,
        })
    }
}

fn encode_games(games: &[Game]) -> ApiResult<Value> {
    serde_json::to_value(games).map_err(|err| {
        error!(%err, "failed to serialize aggregate result for caching");
        ApiError::Decode(format!("headToHead cache encode: {err}"))
    })
}

fn decode_games(raw: Value) -> ApiResult<Vec<Game>> {
    serde_json::from_value(raw).map_err(|err| {
        error!(%err, "cached aggregate result did not deserialize");
        ApiError::Decode(format!("headToHead cache decode: {err}"))
    })
}
