//! Single binary web server exposing the Swiss tournament over a JSON REST API.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default. Override with env: HOST, PORT.
//! Set DATABASE_URL to use PostgreSQL; otherwise state lives in memory.

use actix_web::{
    delete, get, post,
    http::StatusCode,
    web::{Bytes, Data, Json},
    App, HttpResponse, HttpServer, Responder,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use swiss_tournament::{MemoryStore, PgStore, ServerConfig, SharedStore, Tournament, TournamentError};

type AppState = Data<Tournament>;

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Serialize)]
struct CountResponse {
    count: usize,
}

#[derive(Serialize)]
struct RegisteredResponse {
    id: i64,
}

#[derive(Serialize)]
struct ImportedResponse {
    ids: Vec<i64>,
}

#[derive(Serialize)]
struct ReconcileResponse {
    rebuilt: usize,
}

#[derive(Deserialize)]
struct RegisterPlayerBody {
    name: String,
}

#[derive(Deserialize)]
struct ReportMatchBody {
    winner: i64,
    loser: i64,
}

fn status_for(e: &TournamentError) -> StatusCode {
    match e {
        TournamentError::UnknownPlayer(_) => StatusCode::NOT_FOUND,
        TournamentError::InvalidPair(_)
        | TournamentError::InvalidName
        | TournamentError::InvalidCsv(_) => StatusCode::BAD_REQUEST,
        TournamentError::OddPlayerCount { .. } => StatusCode::CONFLICT,
        TournamentError::StorageFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(e: TournamentError) -> HttpResponse {
    let status = status_for(&e);
    if status.is_server_error() {
        log::error!("{}", e);
    }
    HttpResponse::build(status).json(serde_json::json!({ "error": e.to_string() }))
}

fn json_or_error<T: Serialize>(result: Result<T, TournamentError>) -> HttpResponse {
    match result {
        Ok(value) => HttpResponse::Ok().json(value),
        Err(e) => error_response(e),
    }
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "swiss-tournament",
    })
}

/// List registered players.
#[get("/api/players")]
async fn api_list_players(state: AppState) -> HttpResponse {
    json_or_error(state.players().await)
}

/// Register one player; returns the assigned id.
#[post("/api/players")]
async fn api_register_player(state: AppState, body: Json<RegisterPlayerBody>) -> HttpResponse {
    json_or_error(
        state
            .register_player(&body.name)
            .await
            .map(|id| RegisteredResponse { id }),
    )
}

#[get("/api/players/count")]
async fn api_count_players(state: AppState) -> HttpResponse {
    json_or_error(state.count_players().await.map(|count| CountResponse { count }))
}

/// Delete all players and every match referencing them.
#[delete("/api/players")]
async fn api_delete_players(state: AppState) -> HttpResponse {
    match state.delete_players().await {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => error_response(e),
    }
}

/// Register a roster from a CSV body with a `name` column.
#[post("/api/players/import")]
async fn api_import_players(state: AppState, body: Bytes) -> HttpResponse {
    json_or_error(
        state
            .import_players_csv(&body)
            .await
            .map(|ids| ImportedResponse { ids }),
    )
}

#[get("/api/matches")]
async fn api_list_matches(state: AppState) -> HttpResponse {
    json_or_error(state.matches().await)
}

/// Record a match result.
#[post("/api/matches")]
async fn api_report_match(state: AppState, body: Json<ReportMatchBody>) -> HttpResponse {
    json_or_error(state.report_match(body.winner, body.loser).await)
}

/// Restart the tournament: clear match data, keep players.
#[delete("/api/matches")]
async fn api_delete_matches(state: AppState) -> HttpResponse {
    match state.delete_matches().await {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => error_response(e),
    }
}

#[get("/api/standings")]
async fn api_standings(state: AppState) -> HttpResponse {
    json_or_error(state.player_standings().await)
}

#[get("/api/standings.csv")]
async fn api_standings_csv(state: AppState) -> HttpResponse {
    match state.standings_csv().await {
        Ok(body) => HttpResponse::Ok()
            .content_type("text/csv; charset=utf-8")
            .body(body),
        Err(e) => error_response(e),
    }
}

/// Pairings for the next round (409 if the player count is odd).
#[get("/api/pairings")]
async fn api_pairings(state: AppState) -> HttpResponse {
    json_or_error(state.swiss_pairings().await)
}

#[get("/api/ledger/audit")]
async fn api_ledger_audit(state: AppState) -> HttpResponse {
    json_or_error(state.audit_aggregates().await)
}

#[post("/api/ledger/reconcile")]
async fn api_ledger_reconcile(state: AppState) -> HttpResponse {
    json_or_error(
        state
            .reconcile_aggregates()
            .await
            .map(|rebuilt| ReconcileResponse { rebuilt }),
    )
}

async fn open_store(config: &ServerConfig) -> std::io::Result<SharedStore> {
    match &config.database_url {
        Some(url) => {
            let store = PgStore::connect(url, config.max_connections)
                .await
                .map_err(std::io::Error::other)?;
            store.migrate().await.map_err(std::io::Error::other)?;
            log::info!("Using PostgreSQL store");
            Ok(Arc::new(store))
        }
        None => {
            log::warn!("DATABASE_URL not set; using in-memory store (data is lost on restart)");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = ServerConfig::from_env();
    let store = open_store(&config).await?;
    let state = Data::new(Tournament::new(store));

    let bind = (config.host.as_str(), config.port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .service(api_health)
            .service(api_count_players)
            .service(api_import_players)
            .service(api_list_players)
            .service(api_register_player)
            .service(api_delete_players)
            .service(api_list_matches)
            .service(api_report_match)
            .service(api_delete_matches)
            .service(api_standings_csv)
            .service(api_standings)
            .service(api_pairings)
            .service(api_ledger_audit)
            .service(api_ledger_reconcile)
    })
    .bind(bind)?
    .run()
    .await
}
