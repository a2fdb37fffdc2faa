//! Wire-format types for the MLB Stats API schedule responses, and their
//! mapping into the domain models.
//!
//! The mapper is pure and total for any payload that carries the required
//! identifiers (`gamePk`, both `teams.*.team.id`). Everything optional gets
//! an explicit default: a missing `leagueRecord` becomes 0-0, missing
//! scores/weather/pitchers become `None`. A payload missing a required
//! identifier fails `serde` deserialization upstream and surfaces as
//! `ApiError::Decode` rather than being silently defaulted.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::models::{Game, GameSide, GameStatus, Pitcher, Team, TeamRecord, Venue, Weather};

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ScheduleResponse {
    /// Absent or empty `dates` means zero results, not an error.
    #[serde(default)]
    pub dates: Vec<ScheduleDate>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ScheduleDate {
    #[serde(default)]
    pub games: Vec<GameWire>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GameWire {
    pub game_pk: i64,
    #[serde(default)]
    pub game_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: Option<StatusWire>,
    pub teams: TeamsWire,
    #[serde(default)]
    pub venue: Option<VenueWire>,
    #[serde(default)]
    pub weather: Option<WeatherWire>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StatusWire {
    #[serde(default)]
    pub detailed_state: Option<String>,
    #[serde(default)]
    pub abstract_game_state: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TeamsWire {
    pub home: TeamSideWire,
    pub away: TeamSideWire,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TeamSideWire {
    pub team: TeamWire,
    #[serde(default)]
    pub league_record: Option<RecordWire>,
    #[serde(default)]
    pub score: Option<u32>,
    #[serde(default)]
    pub probable_pitcher: Option<PersonWire>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TeamWire {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub abbreviation: Option<String>,
    #[serde(default)]
    pub venue: Option<VenueWire>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RecordWire {
    #[serde(default)]
    pub wins: Option<u32>,
    #[serde(default)]
    pub losses: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct VenueWire {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PersonWire {
    pub id: i64,
    #[serde(default)]
    pub full_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct WeatherWire {
    #[serde(default)]
    pub condition: Option<String>,
    #[serde(default)]
    pub temp: Option<String>,
    #[serde(default)]
    pub wind: Option<String>,
}

/// Flatten a schedule response into its games, preserving remote order.
pub(crate) fn games_from_schedule(response: ScheduleResponse) -> Vec<Game> {
    response
        .dates
        .into_iter()
        .flat_map(|date| date.games)
        .map(map_game)
        .collect()
}

pub(crate) fn map_game(wire: GameWire) -> Game {
    let status = wire
        .status
        .as_ref()
        .and_then(|s| s.detailed_state.as_deref().or(s.abstract_game_state.as_deref()))
        .map(GameStatus::from_remote)
        .unwrap_or(GameStatus::Preview);

    Game {
        game_pk: wire.game_pk,
        game_date: wire.game_date,
        status,
        home: map_side(wire.teams.home),
        away: map_side(wire.teams.away),
        venue: wire.venue.map(map_venue).unwrap_or_default(),
        weather: wire.weather.map(map_weather),
    }
}

fn map_side(wire: TeamSideWire) -> GameSide {
    let record = wire
        .league_record
        .map(|r| TeamRecord {
            wins: r.wins.unwrap_or(0),
            losses: r.losses.unwrap_or(0),
        })
        .unwrap_or_default();

    GameSide {
        team: map_team(wire.team),
        record,
        score: wire.score,
        probable_pitcher: wire.probable_pitcher.map(|p| Pitcher {
            id: p.id,
            name: p.full_name.unwrap_or_default(),
        }),
    }
}

fn map_team(wire: TeamWire) -> Team {
    Team {
        id: wire.id,
        name: wire.name.unwrap_or_default(),
        abbreviation: wire.abbreviation,
        venue_name: wire.venue.and_then(|v| v.name),
    }
}

fn map_venue(wire: VenueWire) -> Venue {
    Venue {
        id: wire.id,
        name: wire.name.unwrap_or_default(),
    }
}

fn map_weather(wire: WeatherWire) -> Weather {
    Weather {
        condition: wire.condition,
        temp: wire.temp,
        wind: wire.wind,
    }
}
