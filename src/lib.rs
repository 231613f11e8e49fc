//! Hand Cricket library - odd-or-even cricket as a session-backed service
//!
//! # Architecture
//!
//! - **Games**: The cricket engine, opponent move generation and game state
//! - **Session**: Fixed-capacity, concurrency-safe session storage
//! - **Server**: HTTP routes mapping requests onto engine actions
//! - **Console**: Single-player line-based variant of the same game
//!
//! # Example
//!
//! ```
//! use hand_cricket::{GameEngine, GameState, Phase, Role, ScriptedRandom, TossCall};
//!
//! let engine = GameEngine::default();
//! let mut state = GameState::new();
//! let mut rng = ScriptedRandom::new([0]);
//!
//! engine.start_new_game(&mut state);
//! engine.call_toss(&mut state, TossCall::Head, &mut rng).unwrap();
//! engine.choose_role(&mut state, Role::Bat).unwrap();
//! assert_eq!(*state.phase(), Phase::InningsActive);
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod console;
mod games;
mod server;
mod session;

// Crate-level exports - Configuration
pub use config::{ConfigError, ServerConfig};

// Crate-level exports - Console variant
pub use console::{Console, scoreboard};

// Crate-level exports - Server
pub use server::{
    ApiError, AppState, GameResponse, INSTRUCTIONS, SESSION_COOKIE, router, session_token,
};

// Crate-level exports - Session management
pub use session::{
    DEFAULT_CAPACITY, DEFAULT_SESSION_TIMEOUT_SECS, ResolvedSession, Session, SessionHandle,
    SessionStore, SessionToken, StoreError,
};

// Crate-level exports - Game types
pub use games::cricket::{
    DEFAULT_HISTORY_CAP, DEFAULT_REPEAT_LIMIT, Difficulty, Dismissal, EchoStrategy, GameEngine,
    GameError, GameState, HardPolicy, MatchResult, MoveGenerator, MoveStrategy, PatternStrategy,
    Phase, Pick, RandomSource, RandomStrategy, RepeatWarning, Role, RoundOutcome, Rules,
    ScriptedRandom, Side, TossCall, TossOutcome, WELCOME_MESSAGE, predict,
};
