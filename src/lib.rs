pub mod api;
pub mod cache;
pub mod error;
pub mod models;
pub mod utils;

pub use api::*;
pub use error::{ApiError, ApiResult};
pub use models::*;
pub use utils::*;

use anyhow::{Context, Result};
use serde::Serialize;

use api::stats_api::StatsApiClient;
use utils::season::today_ymd;

/// All the data the board page needs for one date
#[derive(Debug, Clone, Serialize)]
pub struct BoardData {
    pub date: String,
    pub games: Vec<Game>,
    pub live_count: usize,
    pub final_count: usize,
}

/// Fetch the slate for a date (today when `None`)
pub async fn fetch_board(api: &StatsApiClient, date: Option<String>) -> Result<BoardData> {
    let date = date.unwrap_or_else(today_ymd);

    let games = api
        .schedule(&date)
        .await
        .with_context(|| format!("Failed to fetch schedule for {date}"))?;

    let live_count = games.iter().filter(|g| g.is_live()).count();
    let final_count = games.iter().filter(|g| g.is_final()).count();

    Ok(BoardData {
        date,
        games,
        live_count,
        final_count,
    })
}
