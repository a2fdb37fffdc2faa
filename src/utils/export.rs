use anyhow::{Context, Result};

use crate::models::Game;

/// Save a day's slate to a CSV file
pub fn save_slate_to_csv(games: &[Game], filename: &str) -> Result<()> {
    let mut writer = csv::Writer::from_path(filename).context("Failed to create CSV file")?;

    writer.write_record([
        "Game Id",
        "Date (UTC)",
        "Status",
        "Away Team",
        "Away Record",
        "Away Score",
        "Home Team",
        "Home Record",
        "Home Score",
        "Venue",
    ])?;

    for game in games {
        writer.write_record([
            game.game_pk.to_string(),
            game.game_date
                .map(|d| d.to_rfc3339())
                .unwrap_or_else(|| "TBD".to_string()),
            game.status.label().to_string(),
            game.away.team.name.clone(),
            format!("{}-{}", game.away.record.wins, game.away.record.losses),
            game.away.score.map(|s| s.to_string()).unwrap_or_default(),
            game.home.team.name.clone(),
            format!("{}-{}", game.home.record.wins, game.home.record.losses),
            game.home.score.map(|s| s.to_string()).unwrap_or_default(),
            game.venue.name.clone(),
        ])?;
    }

    writer.flush().context("Failed to write CSV file")?;
    Ok(())
}

/// Save head-to-head history to a CSV file
pub fn save_history_to_csv(games: &[Game], filename: &str) -> Result<()> {
    let mut writer = csv::Writer::from_path(filename).context("Failed to create CSV file")?;

    writer.write_record(["Game Id", "Date (UTC)", "Matchup", "Score", "Status"])?;

    for game in games {
        let score = match (game.away.score, game.home.score) {
            (Some(away), Some(home)) => format!("{}-{}", away, home),
            _ => String::new(),
        };
        writer.write_record([
            game.game_pk.to_string(),
            game.game_date
                .map(|d| d.to_rfc3339())
                .unwrap_or_default(),
            game.matchup(),
            score,
            game.status.label().to_string(),
        ])?;
    }

    writer.flush().context("Failed to write CSV file")?;
    Ok(())
}
