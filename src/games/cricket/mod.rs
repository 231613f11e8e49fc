//! Odd-or-even hand cricket.

mod engine;
mod error;
mod generator;
mod random;
mod state;
mod types;

pub use engine::{
    DEFAULT_HISTORY_CAP, DEFAULT_REPEAT_LIMIT, Dismissal, GameEngine, RepeatWarning, RoundOutcome,
    Rules, TossOutcome,
};
pub use error::GameError;
pub use generator::{
    EchoStrategy, HardPolicy, MoveGenerator, MoveStrategy, PatternStrategy, RandomStrategy,
    predict,
};
pub use random::{RandomSource, ScriptedRandom};
pub use state::{GameState, WELCOME_MESSAGE};
pub use types::{Difficulty, MatchResult, Phase, Pick, Role, Side, TossCall};
