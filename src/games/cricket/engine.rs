//! Rules of hand cricket, applied one player action at a time.
//!
//! Every operation validates first and only then writes to the
//! [`GameState`], so a rejected action leaves the state untouched.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use super::error::GameError;
use super::generator::{HardPolicy, MoveGenerator};
use super::random::RandomSource;
use super::state::GameState;
use super::types::{Difficulty, Phase, Pick, Role, Side, TossCall};

/// Consecutive identical picks that dismiss a batting player.
pub const DEFAULT_REPEAT_LIMIT: u32 = 5;

/// Most picks remembered per innings.
pub const DEFAULT_HISTORY_CAP: usize = 100;

/// Tunable rule parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Getters)]
pub struct Rules {
    /// Consecutive identical picks that dismiss a batting player.
    repeat_limit: u32,
    /// Most picks remembered per innings.
    history_cap: usize,
    /// Hard difficulty behaviour.
    hard_policy: HardPolicy,
}

impl Rules {
    /// Creates a rule set.
    pub fn new(repeat_limit: u32, history_cap: usize, hard_policy: HardPolicy) -> Self {
        Self {
            repeat_limit: repeat_limit.max(1),
            history_cap,
            hard_policy,
        }
    }
}

impl Default for Rules {
    fn default() -> Self {
        Self::new(DEFAULT_REPEAT_LIMIT, DEFAULT_HISTORY_CAP, HardPolicy::default())
    }
}

/// What happened on the coin toss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "winner", rename_all = "snake_case")]
pub enum TossOutcome {
    /// The player called correctly and must now choose a role.
    Player {
        /// Face the coin landed on.
        coin: TossCall,
    },
    /// The opponent won and picked roles.
    Opponent {
        /// Face the coin landed on.
        coin: TossCall,
        /// Role the player was given.
        player_role: Role,
    },
}

/// Why the batting side was dismissed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dismissal {
    /// Both sides showed the same number.
    Matched,
    /// The batting player repeated the same pick too many times.
    Repetition,
}

/// Advance notice that the batting player is repeating themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepeatWarning {
    /// Two repeats left before dismissal.
    Caution,
    /// The next repeat is a dismissal.
    Final,
}

/// Result of one round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct RoundOutcome {
    /// Player's number.
    player_pick: Pick,
    /// Opponent's number.
    opponent_pick: Pick,
    /// Side that was batting on this ball.
    batting: Side,
    /// Runs credited to the batting side.
    runs: u32,
    /// Dismissal, if the batting side is out.
    dismissal: Option<Dismissal>,
    /// Repetition warning for the batting player.
    warning: Option<RepeatWarning>,
    /// Whether this ball ended the innings.
    innings_over: bool,
    /// Phase after the round.
    phase_after: Phase,
}

impl RoundOutcome {
    /// Whether the batting side was dismissed.
    pub fn is_out(&self) -> bool {
        self.dismissal.is_some()
    }
}

/// Applies player actions to a [`GameState`].
#[derive(Debug, Clone, Copy, Default)]
pub struct GameEngine {
    rules: Rules,
    generator: MoveGenerator,
}

impl GameEngine {
    /// Creates an engine with the given rules.
    #[instrument]
    pub fn new(rules: Rules) -> Self {
        info!("Creating game engine");
        Self {
            rules,
            generator: MoveGenerator::new(*rules.hard_policy()),
        }
    }

    /// Returns the rules in force.
    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    /// Resets scores and tracking and moves to the toss.
    #[instrument(skip(self, state), fields(phase = %state.phase))]
    pub fn start_new_game(&self, state: &mut GameState) {
        state.reset_match();
        state.phase = Phase::AwaitingTossCall;
        state.message = "Choose HEAD or TAILS for the toss!".to_string();
        info!(difficulty = %state.difficulty, "New game started");
    }

    /// Resolves the coin toss.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidPhase`] unless the game is waiting for a toss call.
    #[instrument(skip(self, state, rng), fields(phase = %state.phase))]
    pub fn call_toss(
        &self,
        state: &mut GameState,
        call: TossCall,
        rng: &mut dyn RandomSource,
    ) -> Result<TossOutcome, GameError> {
        require_phase(state, Phase::AwaitingTossCall, "call the toss")?;

        let coin = if rng.coin() { TossCall::Head } else { TossCall::Tails };
        let outcome = if coin == call {
            state.phase = Phase::AwaitingRoleChoice;
            state.message = format!(
                "Coin: {} | You called: {} | You won the toss! Choose to bat or bowl.",
                coin, call
            );
            TossOutcome::Player { coin }
        } else {
            let opponent_role = if rng.coin() { Role::Bat } else { Role::Bowl };
            let player_role = opponent_role.opposite();
            begin_first_innings(state, player_role);
            state.message = format!(
                "Coin: {} | You called: {} | Computer won the toss! You are {}.",
                coin,
                call,
                role_label(player_role)
            );
            TossOutcome::Opponent { coin, player_role }
        };

        info!(?outcome, "Toss resolved");
        Ok(outcome)
    }

    /// Sets the player's role after winning the toss.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidPhase`] unless the player has just won the toss.
    #[instrument(skip(self, state), fields(phase = %state.phase))]
    pub fn choose_role(&self, state: &mut GameState, role: Role) -> Result<(), GameError> {
        require_phase(state, Phase::AwaitingRoleChoice, "choose a role")?;

        begin_first_innings(state, role);
        state.message = format!("You chose to {} first. Pick a number!", role_label(role));
        info!(%role, "Role chosen");
        Ok(())
    }

    /// Plays one round with the player's pick.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidPhase`] outside an innings and
    /// [`GameError::InvalidInput`] for a pick outside `0..=10`.
    #[instrument(skip(self, state, rng), fields(phase = %state.phase))]
    pub fn play_round(
        &self,
        state: &mut GameState,
        pick: i64,
        rng: &mut dyn RandomSource,
    ) -> Result<RoundOutcome, GameError> {
        require_phase(state, Phase::InningsActive, "play a round")?;
        let pick = Pick::new(pick).inspect_err(|e| warn!(error = %e, "Rejected pick"))?;

        let opponent_pick = self
            .generator
            .generate(state.difficulty, &state.move_history, rng);

        let repeat_count = if state.last_player_pick == Some(pick) {
            state.repeat_count + 1
        } else {
            1
        };

        let batting = state.batting_side();
        let limit = self.rules.repeat_limit;
        let dismissal = if state.is_batting && repeat_count >= limit {
            Some(Dismissal::Repetition)
        } else if pick == opponent_pick {
            Some(Dismissal::Matched)
        } else {
            None
        };
        let warning = match (state.is_batting, dismissal) {
            (true, None) if limit > 2 && repeat_count == limit - 2 => Some(RepeatWarning::Caution),
            (true, None) if limit > 1 && repeat_count == limit - 1 => Some(RepeatWarning::Final),
            _ => None,
        };
        let runs = match (dismissal, batting) {
            (Some(_), _) => 0,
            (None, Side::Player) if pick.value() == 0 => u32::from(opponent_pick.value()),
            (None, Side::Player) => u32::from(pick.value()),
            (None, Side::Opponent) => u32::from(opponent_pick.value()),
        };

        // Everything is validated; commit.
        state.repeat_count = repeat_count;
        state.last_player_pick = Some(pick);
        state.last_opponent_pick = Some(opponent_pick);
        if state.move_history.len() < self.rules.history_cap {
            state.move_history.push(pick);
        }
        match batting {
            Side::Player => state.player_score += runs,
            Side::Opponent => state.opponent_score += runs,
        }
        state.message = round_message(batting, pick, opponent_pick, runs, dismissal, warning);

        debug!(
            player_pick = %pick,
            opponent_pick = %opponent_pick,
            %batting,
            runs,
            ?dismissal,
            repeat_count,
            "Round played"
        );

        let mut innings_over = false;
        let batting_score = state.score_of(batting);
        let chased = dismissal.is_none()
            && state.is_second_innings
            && state.first_innings_target.is_some_and(|target| batting_score > target);

        if chased {
            state.phase = Phase::GameOver;
            innings_over = true;
            state.message = match batting {
                Side::Player => "You chased the target! YOU WIN!".to_string(),
                Side::Opponent => "Computer chased the target! You lost.".to_string(),
            };
            info!(%batting, score = batting_score, "Target chased, game over");
        } else if dismissal.is_some() {
            innings_over = true;
            if state.is_second_innings {
                state.phase = Phase::GameOver;
                if let Some(result) = state.result() {
                    state.message = format!("{} {}", state.message, result);
                }
                info!(
                    player_score = state.player_score,
                    opponent_score = state.opponent_score,
                    "Second innings over, game over"
                );
            } else {
                state.first_innings_target = Some(batting_score);
                state.is_batting = !state.is_batting;
                state.is_second_innings = true;
                state.clear_innings_tracking();
                state.message = format!(
                    "{} Innings over! Now {}. Target: {}",
                    state.message,
                    if state.is_batting { "BATTING" } else { "BOWLING" },
                    batting_score + 1
                );
                info!(target = batting_score + 1, "First innings over");
            }
        }

        Ok(RoundOutcome {
            player_pick: pick,
            opponent_pick,
            batting,
            runs,
            dismissal,
            warning,
            innings_over,
            phase_after: state.phase,
        })
    }

    /// Changes the opponent difficulty. Allowed in any phase.
    #[instrument(skip(self, state))]
    pub fn set_difficulty(&self, state: &mut GameState, difficulty: Difficulty) {
        state.difficulty = difficulty;
        debug!(%difficulty, "Difficulty set");
    }

    /// Returns to the menu, keeping scores.
    #[instrument(skip(self, state), fields(phase = %state.phase))]
    pub fn reset_to_menu(&self, state: &mut GameState) {
        state.phase = Phase::Menu;
        state.message = "Game reset!".to_string();
        debug!("Returned to menu");
    }
}

fn require_phase(state: &GameState, expected: Phase, action: &'static str) -> Result<(), GameError> {
    if state.phase == expected {
        Ok(())
    } else {
        warn!(action, phase = %state.phase, %expected, "Action rejected in wrong phase");
        Err(GameError::InvalidPhase {
            action,
            phase: state.phase,
        })
    }
}

fn begin_first_innings(state: &mut GameState, player_role: Role) {
    state.is_batting = player_role == Role::Bat;
    state.is_second_innings = false;
    state.first_innings_target = None;
    state.clear_innings_tracking();
    state.phase = Phase::InningsActive;
}

fn role_label(role: Role) -> &'static str {
    match role {
        Role::Bat => "BATTING",
        Role::Bowl => "BOWLING",
    }
}

fn round_message(
    batting: Side,
    pick: Pick,
    opponent_pick: Pick,
    runs: u32,
    dismissal: Option<Dismissal>,
    warning: Option<RepeatWarning>,
) -> String {
    let mut message = match (dismissal, batting) {
        (Some(Dismissal::Repetition), _) => "Same number too many times! YOU'RE OUT!".to_string(),
        (Some(Dismissal::Matched), Side::Player) => format!("OUT! Both picked {}! You're out!", pick),
        (Some(Dismissal::Matched), Side::Opponent) => {
            format!("OUT! Both picked {}! Computer is out!", pick)
        }
        (None, Side::Player) => format!("You: {} | Computer: {} | +{} runs!", pick, opponent_pick, runs),
        (None, Side::Opponent) => {
            format!("You: {} | Computer: {} | Computer +{}", pick, opponent_pick, runs)
        }
    };
    match warning {
        Some(RepeatWarning::Caution) => message.push_str(" Don't repeat the same number!"),
        Some(RepeatWarning::Final) => message.push_str(" One more repeat and you're OUT!"),
        None => {}
    }
    message
}
