//! Web server: one in-memory club state per id, driven through a REST API.
//! Run with: cargo run --bin web
//! Env: HOST (default 0.0.0.0), PORT (default 8080), INACTIVITY_HOURS (default 12).

use actix_web::{
    delete, get, post, put,
    web::{Data, Json, Path},
    App, HttpResponse, HttpServer, Responder,
};
use court_rotation::{
    advance_court_batch, advance_tournament, end_session, import_roster_csv,
    modify_active_session_players, next_round, record_score, remove_player, start_session,
    AppState, PlayerId, ScoreEntry, SessionError, SessionSetup,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};
use uuid::Uuid;

type ClubId = Uuid;

/// Per-club entry: persisted state + last activity time (for auto-cleanup).
struct ClubEntry {
    state: AppState,
    last_activity: Instant,
}

type Clubs = Data<RwLock<HashMap<ClubId, ClubEntry>>>;

const CLEANUP_INTERVAL: Duration = Duration::from_secs(30 * 60);

/// Server settings read from the environment.
#[derive(Clone, Debug)]
struct ServerConfig {
    host: String,
    port: u16,
    inactivity_timeout: Duration,
}

impl ServerConfig {
    fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);
        let hours: u64 = std::env::var("INACTIVITY_HOURS")
            .ok()
            .and_then(|h| h.parse().ok())
            .unwrap_or(12);
        Self {
            host,
            port,
            inactivity_timeout: Duration::from_secs(hours * 3600),
        }
    }
}

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Serialize)]
struct ClubResponse<'a> {
    id: ClubId,
    state: &'a AppState,
}

#[derive(Deserialize)]
struct PlayerNameBody {
    name: String,
}

#[derive(Deserialize)]
struct SessionPlayersBody {
    players: Vec<PlayerId>,
}

#[derive(Deserialize)]
struct ScoreBody {
    round: usize,
    #[serde(rename = "match")]
    match_index: usize,
    score: ScoreEntry,
}

#[derive(Deserialize)]
struct ClubPath {
    id: ClubId,
}

#[derive(Deserialize)]
struct ClubPlayerPath {
    id: ClubId,
    player_id: PlayerId,
}

/// Drop clubs idle for at least `timeout`; returns how many went.
fn purge_inactive(clubs: &mut HashMap<ClubId, ClubEntry>, timeout: Duration) -> usize {
    let before = clubs.len();
    clubs.retain(|_, entry| entry.last_activity.elapsed() < timeout);
    before - clubs.len()
}

fn error_json(e: impl std::fmt::Display) -> serde_json::Value {
    serde_json::json!({ "error": e.to_string() })
}

/// Look up a club, refresh its activity and apply `action` to its state.
fn with_club<F>(clubs: &Clubs, id: ClubId, action: F) -> HttpResponse
where
    F: FnOnce(&mut AppState) -> Result<(), SessionError>,
{
    let mut g = match clubs.write() {
        Ok(guard) => guard,
        Err(_) => {
            log::warn!("club map lock poisoned");
            return HttpResponse::InternalServerError().body("lock error");
        }
    };
    let entry = match g.get_mut(&id) {
        Some(e) => e,
        None => return HttpResponse::NotFound().json(error_json("No club")),
    };
    entry.last_activity = Instant::now();
    match action(&mut entry.state) {
        Ok(()) => HttpResponse::Ok().json(ClubResponse {
            id,
            state: &entry.state,
        }),
        Err(e) => HttpResponse::BadRequest().json(error_json(e)),
    }
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "court-rotation",
    })
}

/// Create an empty club. The client keeps the id for later requests.
#[post("/api/clubs")]
async fn api_create_club(clubs: Clubs) -> HttpResponse {
    let id = Uuid::new_v4();
    let mut g = match clubs.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = g.entry(id).or_insert(ClubEntry {
        state: AppState::new(),
        last_activity: Instant::now(),
    });
    log::info!("club {} created", id);
    HttpResponse::Ok().json(ClubResponse {
        id,
        state: &entry.state,
    })
}

#[get("/api/clubs/{id}")]
async fn api_get_club(clubs: Clubs, path: Path<ClubPath>) -> HttpResponse {
    with_club(&clubs, path.id, |_| Ok(()))
}

/// Replace a club's state with a previously exported JSON document.
#[put("/api/clubs/{id}/state")]
async fn api_import_state(clubs: Clubs, path: Path<ClubPath>, body: String) -> HttpResponse {
    let imported = match AppState::from_json(&body) {
        Ok(state) => state,
        Err(e) => return HttpResponse::BadRequest().json(error_json(e)),
    };
    with_club(&clubs, path.id, move |state| {
        *state = imported;
        Ok(())
    })
}

#[post("/api/clubs/{id}/players")]
async fn api_add_player(clubs: Clubs, path: Path<ClubPath>, body: Json<PlayerNameBody>) -> HttpResponse {
    with_club(&clubs, path.id, |state| state.roster.add(body.name.as_str()).map(|_| ()))
}

/// Import roster names from CSV (first column).
#[post("/api/clubs/{id}/players/import")]
async fn api_import_players(clubs: Clubs, path: Path<ClubPath>, body: String) -> HttpResponse {
    with_club(&clubs, path.id, |state| {
        import_roster_csv(&mut state.roster, &body).map(|_| ())
    })
}

#[put("/api/clubs/{id}/players/{player_id}")]
async fn api_rename_player(
    clubs: Clubs,
    path: Path<ClubPlayerPath>,
    body: Json<PlayerNameBody>,
) -> HttpResponse {
    with_club(&clubs, path.id, |state| {
        state.roster.rename(path.player_id, body.name.as_str())
    })
}

#[delete("/api/clubs/{id}/players/{player_id}")]
async fn api_remove_player(clubs: Clubs, path: Path<ClubPlayerPath>) -> HttpResponse {
    with_club(&clubs, path.id, |state| remove_player(state, path.player_id))
}

#[post("/api/clubs/{id}/session")]
async fn api_start_session(clubs: Clubs, path: Path<ClubPath>, body: Json<SessionSetup>) -> HttpResponse {
    let setup = body.into_inner();
    with_club(&clubs, path.id, |state| {
        start_session(state, setup, &mut rand::thread_rng())
    })
}

/// Change who plays in the running free/structured session.
#[put("/api/clubs/{id}/session/players")]
async fn api_modify_session_players(
    clubs: Clubs,
    path: Path<ClubPath>,
    body: Json<SessionPlayersBody>,
) -> HttpResponse {
    let players = body.into_inner().players;
    with_club(&clubs, path.id, |state| {
        modify_active_session_players(state, players, &mut rand::thread_rng())
    })
}

#[put("/api/clubs/{id}/session/score")]
async fn api_record_score(clubs: Clubs, path: Path<ClubPath>, body: Json<ScoreBody>) -> HttpResponse {
    let ScoreBody {
        round,
        match_index,
        score,
    } = body.into_inner();
    with_club(&clubs, path.id, |state| record_score(state, round, match_index, score))
}

#[post("/api/clubs/{id}/session/next-round")]
async fn api_next_round(clubs: Clubs, path: Path<ClubPath>) -> HttpResponse {
    with_club(&clubs, path.id, |state| {
        next_round(state, &mut rand::thread_rng()).map(|_| ())
    })
}

/// Advance the tournament (next bracket round, or champion).
#[post("/api/clubs/{id}/session/advance")]
async fn api_advance(clubs: Clubs, path: Path<ClubPath>) -> HttpResponse {
    with_club(&clubs, path.id, |state| {
        let advancement = advance_tournament(state)?;
        log::info!("club {}: {:?}", path.id, advancement);
        Ok(())
    })
}

#[post("/api/clubs/{id}/session/next-batch")]
async fn api_next_batch(clubs: Clubs, path: Path<ClubPath>) -> HttpResponse {
    with_club(&clubs, path.id, |state| advance_court_batch(state).map(|_| ()))
}

#[post("/api/clubs/{id}/session/end")]
async fn api_end_session(clubs: Clubs, path: Path<ClubPath>) -> HttpResponse {
    with_club(&clubs, path.id, end_session)
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = ServerConfig::from_env();
    log::info!("Starting server at http://{}:{}", config.host, config.port);

    let clubs = Data::new(RwLock::new(HashMap::<ClubId, ClubEntry>::new()));

    // Background task: drop clubs nobody has touched for the inactivity timeout
    let clubs_cleanup = clubs.clone();
    let timeout = config.inactivity_timeout;
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(CLEANUP_INTERVAL);
        loop {
            interval.tick().await;
            let mut g = match clubs_cleanup.write() {
                Ok(guard) => guard,
                Err(_) => continue,
            };
            let removed = purge_inactive(&mut g, timeout);
            if removed > 0 {
                log::info!("Cleaned up {} inactive club(s)", removed);
            }
        }
    });

    HttpServer::new(move || {
        App::new()
            .app_data(clubs.clone())
            .service(api_health)
            .service(api_create_club)
            .service(api_get_club)
            .service(api_import_state)
            .service(api_add_player)
            .service(api_import_players)
            .service(api_rename_player)
            .service(api_remove_player)
            .service(api_start_session)
            .service(api_modify_session_players)
            .service(api_record_score)
            .service(api_next_round)
            .service(api_advance)
            .service(api_next_batch)
            .service(api_end_session)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry() -> ClubEntry {
        ClubEntry {
            state: AppState::new(),
            last_activity: Instant::now(),
        }
    }

    #[tokio::test]
    async fn idle_clubs_are_purged_on_tick() {
        let mut clubs = HashMap::new();
        let idle = Uuid::new_v4();
        clubs.insert(idle, entry());

        let mut interval = tokio::time::interval(Duration::from_millis(20));
        interval.tick().await;
        interval.tick().await;

        let fresh = Uuid::new_v4();
        clubs.insert(fresh, entry());
        assert_eq!(purge_inactive(&mut clubs, Duration::from_millis(15)), 1);
        assert!(clubs.contains_key(&fresh));
        assert!(!clubs.contains_key(&idle));
        assert_eq!(purge_inactive(&mut clubs, Duration::from_secs(3600)), 0);
    }
}
