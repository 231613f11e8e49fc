//! HTTP surface: maps requests onto engine actions for the caller's session.
//!
//! Each response carries a JSON snapshot of the game. Rendering it is left to
//! the client.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tracing::{debug, instrument, warn};

use crate::games::cricket::{
    Difficulty, GameEngine, GameError, GameState, MatchResult, Role, RoundOutcome, TossCall,
    TossOutcome,
};
use crate::session::{ResolvedSession, SessionStore, StoreError};

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "session";

/// How-to-play text served by `/api/help` and the console.
pub const INSTRUCTIONS: &str = "\
1. TOSS: Call HEAD or TAILS. The winner chooses to bat or bowl.
2. GAMEPLAY: Pick a number from 0 to 10. The computer picks too.
3. OUT: If both numbers match, the batting side is out.
4. SCORING: Batting, your number is added to your score. Bowling, the computer's number is added to its score.
5. ZERO: Batting with 0 scores the computer's number instead.
6. REPEATS: Batting with the same number 5 times in a row gets you out.
7. INNINGS: After the first dismissal roles swap and the second side chases the target.
8. DIFFICULTY: Easy plays randomly, Medium sometimes copies your last pick, Hard reads your patterns.";

/// Shared state for all request handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    store: SessionStore,
    engine: Arc<GameEngine>,
}

impl AppState {
    /// Creates handler state from a store and an engine.
    pub fn new(store: SessionStore, engine: GameEngine) -> Self {
        Self {
            store,
            engine: Arc::new(engine),
        }
    }
}

/// Body returned by every game endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct GameResponse {
    /// Session token, also set as a cookie.
    pub token: String,
    /// Status message for this request.
    pub message: String,
    /// Full game snapshot.
    pub state: GameState,
    /// Target for the chasing side, during the second innings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<u32>,
    /// Final result once the game is over.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<MatchResult>,
    /// Toss details, for `/api/toss`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub toss: Option<TossOutcome>,
    /// Round details, for `/api/play`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub round: Option<RoundOutcome>,
}

impl GameResponse {
    fn new(token: &str, message: String, state: &GameState) -> Self {
        Self {
            token: token.to_string(),
            message,
            state: state.clone(),
            target: state.target(),
            result: state.result(),
            toss: None,
            round: None,
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

/// Errors returned by handlers.
#[derive(Debug, derive_more::Display, derive_more::From)]
pub enum ApiError {
    /// Action rejected by the game rules.
    #[display("{}", _0)]
    Game(GameError),
    /// No session could be allocated.
    #[display("{}", _0)]
    Store(StoreError),
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = match &self {
            ApiError::Game(e @ GameError::InvalidPhase { .. }) => (StatusCode::CONFLICT, e.kind()),
            ApiError::Game(e @ GameError::InvalidInput(_)) => (StatusCode::BAD_REQUEST, e.kind()),
            ApiError::Store(StoreError::PoolExhausted { .. }) => {
                (StatusCode::SERVICE_UNAVAILABLE, "pool_exhausted")
            }
        };
        warn!(%status, error, message = %self, "Request failed");
        (
            status,
            Json(ErrorBody {
                error,
                message: self.to_string(),
            }),
        )
            .into_response()
    }
}

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/api/help", get(help))
        .route("/api/state", get(snapshot))
        .route("/api/new-game", post(new_game))
        .route("/api/menu", post(menu))
        .route("/api/difficulty/{level}", post(difficulty))
        .route("/api/toss/{call}", post(toss))
        .route("/api/role/{role}", post(role))
        .route("/api/play/{pick}", post(play))
        .with_state(state)
}

/// Reads the session token from the `Cookie` header, if any.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Resolves the caller's session and runs `action` against it while holding its lock.
fn with_session<F>(app: &AppState, headers: &HeaderMap, action: F) -> Result<Response, ApiError>
where
    F: FnOnce(&GameEngine, &mut GameState) -> Result<GameResponseParts, GameError>,
{
    let presented = session_token(headers);
    let resolved: ResolvedSession = app.store.resolve(presented.as_deref())?;

    let result = {
        let mut session = resolved.lock();
        action(&app.engine, session.state_mut()).map(|parts| {
            let mut body = GameResponse::new(resolved.token(), parts.message, session.state());
            body.toss = parts.toss;
            body.round = parts.round;
            body
        })
    };

    // Rejected actions still hand back the token so a new session is not lost.
    let mut response = match result {
        Ok(body) => {
            debug!(token = %resolved.token(), created = resolved.created(), phase = %body.state.phase(), "Request handled");
            Json(body).into_response()
        }
        Err(e) => ApiError::from(e).into_response(),
    };
    let cookie = format!("{}={}; Path=/; HttpOnly", SESSION_COOKIE, resolved.token());
    if let Ok(value) = HeaderValue::from_str(&cookie) {
        response.headers_mut().insert(SET_COOKIE, value);
    }
    Ok(response)
}

/// What an action contributes to the response beyond the snapshot.
struct GameResponseParts {
    message: String,
    toss: Option<TossOutcome>,
    round: Option<RoundOutcome>,
}

impl GameResponseParts {
    fn message(state: &GameState) -> Self {
        Self {
            message: state.message().clone(),
            toss: None,
            round: None,
        }
    }
}

async fn healthz() -> &'static str {
    "ok"
}

async fn help() -> &'static str {
    INSTRUCTIONS
}

#[instrument(skip_all)]
async fn snapshot(State(app): State<AppState>, headers: HeaderMap) -> Result<Response, ApiError> {
    with_session(&app, &headers, |_, state| Ok(GameResponseParts::message(state)))
}

#[instrument(skip_all)]
async fn new_game(State(app): State<AppState>, headers: HeaderMap) -> Result<Response, ApiError> {
    with_session(&app, &headers, |engine, state| {
        engine.start_new_game(state);
        Ok(GameResponseParts::message(state))
    })
}

#[instrument(skip_all)]
async fn menu(State(app): State<AppState>, headers: HeaderMap) -> Result<Response, ApiError> {
    with_session(&app, &headers, |engine, state| {
        engine.reset_to_menu(state);
        Ok(GameResponseParts::message(state))
    })
}

#[instrument(skip(app, headers))]
async fn difficulty(
    State(app): State<AppState>,
    headers: HeaderMap,
    Path(level): Path<String>,
) -> Result<Response, ApiError> {
    let difficulty = Difficulty::parse(&level)?;
    with_session(&app, &headers, |engine, state| {
        engine.set_difficulty(state, difficulty);
        Ok(GameResponseParts {
            message: format!("Difficulty: {}", difficulty),
            toss: None,
            round: None,
        })
    })
}

#[instrument(skip(app, headers))]
async fn toss(
    State(app): State<AppState>,
    headers: HeaderMap,
    Path(call): Path<String>,
) -> Result<Response, ApiError> {
    let call: TossCall = call
        .parse()
        .map_err(|_| GameError::InvalidInput(format!("toss call must be head or tails, got '{}'", call)))?;
    with_session(&app, &headers, |engine, state| {
        let outcome = engine.call_toss(state, call, &mut rand::thread_rng())?;
        Ok(GameResponseParts {
            toss: Some(outcome),
            ..GameResponseParts::message(state)
        })
    })
}

#[instrument(skip(app, headers))]
async fn role(
    State(app): State<AppState>,
    headers: HeaderMap,
    Path(role): Path<String>,
) -> Result<Response, ApiError> {
    let role: Role = role
        .parse()
        .map_err(|_| GameError::InvalidInput(format!("role must be bat or bowl, got '{}'", role)))?;
    with_session(&app, &headers, |engine, state| {
        engine.choose_role(state, role)?;
        Ok(GameResponseParts::message(state))
    })
}

#[instrument(skip(app, headers))]
async fn play(
    State(app): State<AppState>,
    headers: HeaderMap,
    Path(pick): Path<String>,
) -> Result<Response, ApiError> {
    let pick: i64 = pick
        .trim()
        .parse()
        .map_err(|_| GameError::InvalidInput(format!("pick must be a number, got '{}'", pick)))?;
    with_session(&app, &headers, |engine, state| {
        let outcome = engine.play_round(state, pick, &mut rand::thread_rng())?;
        Ok(GameResponseParts {
            round: Some(outcome),
            ..GameResponseParts::message(state)
        })
    })
}
