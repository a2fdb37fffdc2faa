use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::NaiveDate;
use mlb_betting_board::analysis_api::{build_game_prompt, AnalysisClient};
use mlb_betting_board::history::HistoricalData;
use mlb_betting_board::models::Game;
use mlb_betting_board::season::{date_window, today_ymd};
use mlb_betting_board::stats_api::StatsApiClient;
use mlb_betting_board::ApiError;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tower_http::services::ServeDir;

/// One stats client shared by every request so all handlers see one cache.
type SharedApi = Arc<StatsApiClient>;

/// Wraps the typed API failure so each class maps to an HTTP status.
struct ApiFailure(ApiError);

impl From<ApiError> for ApiFailure {
    fn from(err: ApiError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Network(_) | ApiError::Remote { .. } | ApiError::Decode(_) => {
                StatusCode::BAD_GATEWAY
            }
            ApiError::MissingConfig(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({ "message": self.0.to_string() }))).into_response()
    }
}

#[derive(Deserialize)]
struct GamesQuery {
    date: Option<String>,
}

async fn games(
    State(api): State<SharedApi>,
    Query(query): Query<GamesQuery>,
) -> Result<Json<serde_json::Value>, ApiFailure> {
    let date = query.date.unwrap_or_else(today_ymd);
    let games = api.schedule(&date).await?;

    // Dates for the navigation strip around the requested day.
    let nav_dates: Vec<String> = date
        .parse::<NaiveDate>()
        .map(|center| {
            date_window(center, 3)
                .iter()
                .map(|d| d.to_string())
                .collect()
        })
        .unwrap_or_default();

    Ok(Json(json!({
        "date": date,
        "nav_dates": nav_dates,
        "games": games,
    })))
}

async fn game(
    State(api): State<SharedApi>,
    Path(game_pk): Path<i64>,
) -> Result<Json<Game>, ApiFailure> {
    Ok(Json(api.game(game_pk).await?))
}

async fn history(
    State(api): State<SharedApi>,
    Path(game_pk): Path<i64>,
) -> Result<Json<HistoricalData>, ApiFailure> {
    Ok(Json(api.historical_data(game_pk).await?))
}

#[derive(Deserialize)]
struct AnalyzeRequest {
    game_pk: i64,
    #[serde(default)]
    metrics: Vec<String>,
}

/// Same-origin proxy in front of the language-model API. The model's JSON
/// answer is passed through untouched.
async fn analyze(
    State(api): State<SharedApi>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<serde_json::Value>, ApiFailure> {
    // Configuration is read per call; a missing key fails this request,
    // not server startup.
    let analysis_client = AnalysisClient::from_env()?;

    let game = api.game(request.game_pk).await?;
    let historical = api.historical_data(request.game_pk).await?;

    let prompt = build_game_prompt(&game, &request.metrics, Some(&historical));
    let analysis = analysis_client.analyze(&prompt).await?;

    Ok(Json(analysis))
}

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt::init();

    let api: SharedApi = Arc::new(StatsApiClient::new());

    println!("Starting web server at http://127.0.0.1:3000");
    println!("Press Ctrl+C to stop\n");

    // Build router with routes
    let app = Router::new()
        // This will serve files from the "static" directory at the "/static" URL path
        .nest_service("/static", ServeDir::new("static"))
        .route("/api/games", get(games))
        .route("/api/games/:game_pk", get(game))
        .route("/api/games/:game_pk/history", get(history))
        .route("/api/analyze", post(analyze))
        .with_state(api);

    // Run server
    let listener = tokio::net::TcpListener::bind("127.0.0.1:3000")
        .await
        .unwrap();

    axum::serve(listener, app).await.unwrap();
}
