use anyhow::Result;
use mlb_betting_board::export::save_slate_to_csv;
use mlb_betting_board::fetch_board;
use mlb_betting_board::stats_api::StatsApiClient;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt::init();

    println!("MLB Betting Board\n");
    println!("Fetching the slate...\n");

    let api = StatsApiClient::new();
    let date = std::env::args().nth(1);
    let board = fetch_board(&api, date).await?;

    if board.games.is_empty() {
        println!("No games scheduled for {}.", board.date);
        return Ok(());
    }

    println!(
        "{} games on {} ({} live, {} final)\n",
        board.games.len(),
        board.date,
        board.live_count,
        board.final_count
    );

    for (i, game) in board.games.iter().enumerate() {
        println!("{}. {}", i + 1, game.format());
    }

    let save_csv = std::env::var("SAVE_CSV").unwrap_or_default() == "1";
    if save_csv {
        std::fs::create_dir_all("cache")?;
        save_slate_to_csv(&board.games, "cache/slate.csv")?;
        println!("\nSaved slate to cache/slate.csv");
    }

    Ok(())
}
