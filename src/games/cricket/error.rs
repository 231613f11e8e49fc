//! Errors raised when an action cannot be applied to a game.

use super::types::Phase;

/// Error that can occur when validating a player action.
///
/// The game state is never modified when one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum GameError {
    /// The action is not allowed in the current phase.
    #[display("Cannot {} while in phase {}", action, phase)]
    InvalidPhase {
        /// Name of the rejected action.
        action: &'static str,
        /// Phase the game was in.
        phase: Phase,
    },

    /// A parameter was outside its allowed range.
    #[display("Invalid input: {}", _0)]
    InvalidInput(String),
}

impl GameError {
    /// Short machine-readable kind, used in API error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidPhase { .. } => "invalid_phase",
            Self::InvalidInput(_) => "invalid_input",
        }
    }
}

impl std::error::Error for GameError {}
