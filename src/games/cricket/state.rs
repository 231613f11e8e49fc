//! Per-session game record.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};

use super::types::{Difficulty, MatchResult, Phase, Pick, Side};

/// Status shown when a fresh session is created.
pub const WELCOME_MESSAGE: &str = "Welcome! Start a new game to play.";

/// Complete state of one player's game.
///
/// Only [`GameEngine`](super::GameEngine) mutates this; everything else
/// reads it through the getters or a serialized snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct GameState {
    /// Runs scored by the player.
    pub(crate) player_score: u32,
    /// Runs scored by the opponent.
    pub(crate) opponent_score: u32,
    /// Opponent difficulty.
    pub(crate) difficulty: Difficulty,
    /// Lifecycle phase.
    pub(crate) phase: Phase,
    /// Whether the player is the batting side.
    pub(crate) is_batting: bool,
    /// Whether the second innings is under way (or finished).
    pub(crate) is_second_innings: bool,
    /// Score the chasing side must exceed, set when the first innings ends.
    pub(crate) first_innings_target: Option<u32>,
    /// Player picks from the current innings only.
    pub(crate) move_history: Vec<Pick>,
    /// Consecutive identical player picks.
    pub(crate) repeat_count: u32,
    /// The pick being repeated.
    pub(crate) last_player_pick: Option<Pick>,
    /// Last opponent pick, for display.
    pub(crate) last_opponent_pick: Option<Pick>,
    /// Human-readable status of the last action.
    pub(crate) message: String,
}

impl GameState {
    /// Creates an idle game at the menu.
    pub fn new() -> Self {
        Self {
            player_score: 0,
            opponent_score: 0,
            difficulty: Difficulty::default(),
            phase: Phase::Menu,
            is_batting: false,
            is_second_innings: false,
            first_innings_target: None,
            move_history: Vec::new(),
            repeat_count: 0,
            last_player_pick: None,
            last_opponent_pick: None,
            message: WELCOME_MESSAGE.to_string(),
        }
    }

    /// The side currently batting.
    pub fn batting_side(&self) -> Side {
        if self.is_batting {
            Side::Player
        } else {
            Side::Opponent
        }
    }

    /// Score of `side`.
    pub fn score_of(&self, side: Side) -> u32 {
        match side {
            Side::Player => self.player_score,
            Side::Opponent => self.opponent_score,
        }
    }

    /// Runs the chasing side needs to win, once the second innings starts.
    pub fn target(&self) -> Option<u32> {
        if self.is_second_innings {
            self.first_innings_target.map(|score| score + 1)
        } else {
            None
        }
    }

    /// Runs still required by the chasing side.
    pub fn runs_needed(&self) -> Option<u32> {
        self.target()
            .map(|target| target.saturating_sub(self.score_of(self.batting_side())))
    }

    /// Final result, once the game is over.
    pub fn result(&self) -> Option<MatchResult> {
        if self.phase != Phase::GameOver {
            return None;
        }
        let (player, opponent) = (self.player_score, self.opponent_score);
        Some(if player > opponent {
            MatchResult::PlayerWon {
                margin: player - opponent,
            }
        } else if opponent > player {
            MatchResult::OpponentWon {
                margin: opponent - player,
            }
        } else {
            MatchResult::Tie { runs: player }
        })
    }

    /// Resets everything except difficulty for a fresh match.
    pub(crate) fn reset_match(&mut self) {
        *self = Self {
            difficulty: self.difficulty,
            ..Self::new()
        };
    }

    /// Clears per-innings tracking.
    pub(crate) fn clear_innings_tracking(&mut self) {
        self.move_history.clear();
        self.repeat_count = 0;
        self.last_player_pick = None;
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_is_idle() {
        let state = GameState::new();
        assert_eq!(*state.phase(), Phase::Menu);
        assert_eq!(*state.first_innings_target(), None);
        assert!(state.move_history().is_empty());
        assert_eq!(state.result(), None);
    }

    #[test]
    fn test_reset_keeps_difficulty() {
        let mut state = GameState::new();
        state.difficulty = Difficulty::Hard;
        state.player_score = 12;
        state.phase = Phase::GameOver;
        state.reset_match();
        assert_eq!(*state.difficulty(), Difficulty::Hard);
        assert_eq!(*state.player_score(), 0);
        assert_eq!(*state.phase(), Phase::Menu);
    }

    #[test]
    fn test_result_margins() {
        let mut state = GameState::new();
        state.phase = Phase::GameOver;
        state.player_score = 30;
        state.opponent_score = 21;
        assert_eq!(state.result(), Some(MatchResult::PlayerWon { margin: 9 }));
        state.opponent_score = 30;
        assert_eq!(state.result(), Some(MatchResult::Tie { runs: 30 }));
    }

    #[test]
    fn test_runs_needed_in_chase() {
        let mut state = GameState::new();
        state.is_second_innings = true;
        state.is_batting = true;
        state.first_innings_target = Some(20);
        state.player_score = 7;
        assert_eq!(state.target(), Some(21));
        assert_eq!(state.runs_needed(), Some(14));
    }
}
