use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mlb_betting_board::analysis_api::{build_game_prompt, AnalysisClient};
use mlb_betting_board::export::save_history_to_csv;
use mlb_betting_board::history::RECENT_FORM_LIMIT;
use mlb_betting_board::parlay::{
    decimal_odds_to_american, format_american_odds, parlay_decimal_odds, parlay_payout,
    parlay_probability,
};
use mlb_betting_board::season::{current_season, today_ymd};
use mlb_betting_board::stats_api::StatsApiClient;

#[derive(Parser)]
#[command(
    name = "mlb-board",
    about = "MLB schedules, matchup history and betting analysis from the terminal"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the slate for a date (today by default)
    Schedule {
        /// Date as YYYY-MM-DD
        #[arg(long)]
        date: Option<String>,
    },
    /// Show one game with pitchers and weather
    Game { game_pk: i64 },
    /// Head-to-head meetings between two teams across a season range
    HeadToHead {
        home_team: i64,
        away_team: i64,
        #[arg(long)]
        first_season: Option<u16>,
        #[arg(long)]
        last_season: Option<u16>,
        /// Also save the meetings to this CSV file
        #[arg(long)]
        csv: Option<String>,
    },
    /// The full historical bundle for a game
    History { game_pk: i64 },
    /// Season hitting and pitching stats for a team, as raw JSON
    TeamStats {
        team_id: i64,
        #[arg(long)]
        season: Option<u16>,
    },
    /// Ask the language model for a betting read on a game
    Analyze {
        game_pk: i64,
        #[arg(
            long,
            value_delimiter = ',',
            default_value = "recent_games,vs_team,at_venue"
        )]
        metrics: Vec<String>,
    },
    /// Price a parlay from its American-odds legs
    Parlay {
        #[arg(required = true, allow_negative_numbers = true)]
        legs: Vec<i32>,
        #[arg(long, default_value_t = 100.0)]
        stake: f64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let api = StatsApiClient::new();

    match cli.command {
        Command::Schedule { date } => {
            let date = date.unwrap_or_else(today_ymd);
            let games = api
                .schedule(&date)
                .await
                .context("Failed to fetch schedule")?;

            if games.is_empty() {
                println!("No games scheduled for {date}.");
            } else {
                println!("{} games on {}:\n", games.len(), date);
                for (i, game) in games.iter().enumerate() {
                    println!("{}. {}", i + 1, game.format());
                }
            }
        }
        Command::Game { game_pk } => {
            let game = api.game(game_pk).await.context("Failed to fetch game")?;
            println!("{}", game.format());
            println!("Venue: {}", game.venue.name);

            if let (Some(away), Some(home)) = (
                game.away.probable_pitcher.as_ref(),
                game.home.probable_pitcher.as_ref(),
            ) {
                println!("Probable pitchers: {} vs {}", away.name, home.name);
            }

            if let Some(weather) = &game.weather {
                println!(
                    "Weather: {} {} {}",
                    weather.condition.as_deref().unwrap_or("-"),
                    weather.temp.as_deref().unwrap_or("-"),
                    weather.wind.as_deref().unwrap_or("-")
                );
            }
        }
        Command::HeadToHead {
            home_team,
            away_team,
            first_season,
            last_season,
            csv,
        } => {
            let last = last_season.unwrap_or_else(current_season);
            let first = first_season.unwrap_or_else(|| last.saturating_sub(2));

            let games = api
                .head_to_head(home_team, away_team, first, last)
                .await
                .context("Failed to fetch head-to-head history")?;

            println!(
                "{} meetings between teams {} and {} ({}-{}):\n",
                games.len(),
                home_team,
                away_team,
                first,
                last
            );
            for (i, game) in games.iter().enumerate() {
                println!("{}. {}", i + 1, game.format());
            }

            if let Some(path) = csv {
                save_history_to_csv(&games, &path)?;
                println!("\nSaved head-to-head history to {path}");
            }
        }
        Command::History { game_pk } => {
            let data = api
                .historical_data(game_pk)
                .await
                .context("Failed to fetch historical data")?;

            println!("HEAD TO HEAD ({} games)\n", data.head_to_head.len());
            for (i, game) in data.head_to_head.iter().enumerate() {
                println!("{}. {}", i + 1, game.format());
            }

            println!("\nRECENT FORM (last {} games)\n", RECENT_FORM_LIMIT);
            println!("Home team:");
            for game in &data.recent_form.home {
                println!("  {}", game.format());
            }
            println!("Away team:");
            for game in &data.recent_form.away {
                println!("  {}", game.format());
            }
        }
        Command::TeamStats { team_id, season } => {
            let season = season.unwrap_or_else(current_season);
            let stats = api
                .team_stats(team_id, season)
                .await
                .context("Failed to fetch team stats")?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        Command::Analyze { game_pk, metrics } => {
            let analysis_client = AnalysisClient::from_env()?;

            let game = api.game(game_pk).await.context("Failed to fetch game")?;
            let historical = api
                .historical_data(game_pk)
                .await
                .context("Failed to fetch historical data")?;

            let prompt = build_game_prompt(&game, &metrics, Some(&historical));
            let analysis = analysis_client
                .analyze(&prompt)
                .await
                .context("Analysis request failed")?;

            println!("{}", serde_json::to_string_pretty(&analysis)?);
        }
        Command::Parlay { legs, stake } => {
            let formatted: Vec<String> = legs.iter().map(|&l| format_american_odds(l)).collect();
            println!("Parlay legs: {}", formatted.join(", "));

            let decimal = parlay_decimal_odds(&legs);
            println!("Combined decimal odds: {:.2}", decimal);
            println!(
                "Combined American odds: {}",
                format_american_odds(decimal_odds_to_american(decimal))
            );
            println!(
                "Implied win probability: {:.1}%",
                parlay_probability(&legs) * 100.0
            );
            println!("Payout on a {:.2} stake: {:.2}", stake, parlay_payout(&legs, stake));
        }
    }

    Ok(())
}
