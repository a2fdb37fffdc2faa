use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single MLB game as this application sees it, assembled fresh on every
/// response-mapping call and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Game {
    pub game_pk: i64,
    pub game_date: Option<DateTime<Utc>>,
    pub status: GameStatus,
    pub home: GameSide,
    pub away: GameSide,
    pub venue: Venue,
    pub weather: Option<Weather>,
}

/// Coarse game state derived from the remote service's free-text status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    Preview,
    Live,
    Final,
}

impl GameStatus {
    /// Collapse the remote free-text status into the three states the board
    /// cares about. Unrecognized text ("Scheduled", "Warmup", "Pre-Game",
    /// rain-delay variants) reads as a preview.
    pub fn from_remote(state: &str) -> Self {
        let state = state.to_lowercase();
        if state.contains("final") || state.contains("game over") || state.contains("completed") {
            GameStatus::Final
        } else if state.contains("in progress") || state.contains("live") {
            GameStatus::Live
        } else {
            GameStatus::Preview
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            GameStatus::Preview => "Preview",
            GameStatus::Live => "Live",
            GameStatus::Final => "Final",
        }
    }
}

/// One side of a matchup: the team plus its game-scoped extras.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSide {
    pub team: Team,
    pub record: TeamRecord,
    pub score: Option<u32>,
    pub probable_pitcher: Option<Pitcher>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    pub id: i64,
    pub name: String,
    pub abbreviation: Option<String>,
    pub venue_name: Option<String>,
}

/// Season win/loss record. Missing upstream records map to 0-0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamRecord {
    pub wins: u32,
    pub losses: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Venue {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pitcher {
    pub id: i64,
    pub name: String,
}

/// Ballpark weather summary, present only when the remote inlines it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Weather {
    pub condition: Option<String>,
    pub temp: Option<String>,
    pub wind: Option<String>,
}

impl Game {
    pub fn is_live(&self) -> bool {
        self.status == GameStatus::Live
    }

    pub fn is_final(&self) -> bool {
        self.status == GameStatus::Final
    }

    /// "Away Team @ Home Team"
    pub fn matchup(&self) -> String {
        format!("{} @ {}", self.away.team.name, self.home.team.name)
    }

    /// Format one line for the terminal slate listing.
    pub fn format(&self) -> String {
        let when = self
            .game_date
            .map(|d| d.format("%Y-%m-%d %H:%M UTC").to_string())
            .unwrap_or_else(|| "TBD".to_string());

        let score = match (self.away.score, self.home.score) {
            (Some(away), Some(home)) => format!(" | {}-{}", away, home),
            _ => String::new(),
        };

        format!(
            "{} [{}] | {} ({}-{}) @ {} ({}-{}){}",
            when,
            self.status.label(),
            self.away.team.name,
            self.away.record.wins,
            self.away.record.losses,
            self.home.team.name,
            self.home.record.wins,
            self.home.record.losses,
            score
        )
    }
}
