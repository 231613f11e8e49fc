//! Opponent move generation.
//!
//! Each [`Difficulty`] maps to one [`MoveStrategy`]. Strategies only look at
//! the player's picks from the current innings and consume randomness; they
//! never touch game state.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tracing::{debug, instrument};

use super::random::RandomSource;
use super::types::{Difficulty, Pick};

/// Chance (percent) that medium difficulty replays the player's last pick.
pub const MEDIUM_REPLAY_PERCENT: u32 = 30;

/// Chance (percent) that hard difficulty plays its prediction unchanged.
pub const HARD_EXACT_PERCENT: u32 = 50;

/// How hard difficulty uses its prediction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum HardPolicy {
    /// Half the time play the prediction, otherwise a neighbour of it.
    #[default]
    Varied,
    /// Always play the prediction.
    Exact,
}

/// One opponent behaviour.
pub trait MoveStrategy {
    /// Chooses the opponent's pick given the player's picks so far this innings.
    fn next_pick(&self, history: &[Pick], rng: &mut dyn RandomSource) -> Pick;
}

/// Uniformly random picks.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomStrategy;

impl MoveStrategy for RandomStrategy {
    fn next_pick(&self, _history: &[Pick], rng: &mut dyn RandomSource) -> Pick {
        rng.pick()
    }
}

/// Occasionally replays the player's most recent pick.
#[derive(Debug, Clone, Copy)]
pub struct EchoStrategy {
    replay_percent: u32,
}

impl Default for EchoStrategy {
    fn default() -> Self {
        Self {
            replay_percent: MEDIUM_REPLAY_PERCENT,
        }
    }
}

impl MoveStrategy for EchoStrategy {
    fn next_pick(&self, history: &[Pick], rng: &mut dyn RandomSource) -> Pick {
        match history.last() {
            Some(&last) if rng.percent(self.replay_percent) => last,
            _ => rng.pick(),
        }
    }
}

/// Plays around the player's most frequent pick.
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternStrategy {
    policy: HardPolicy,
}

impl PatternStrategy {
    /// Creates a pattern strategy using `policy`.
    pub fn new(policy: HardPolicy) -> Self {
        Self { policy }
    }
}

impl MoveStrategy for PatternStrategy {
    fn next_pick(&self, history: &[Pick], rng: &mut dyn RandomSource) -> Pick {
        let Some(predicted) = predict(history) else {
            return rng.pick();
        };

        match self.policy {
            HardPolicy::Exact => predicted,
            HardPolicy::Varied => {
                if rng.percent(HARD_EXACT_PERCENT) {
                    predicted
                } else if rng.percent(50) {
                    Pick::wrapping(predicted.index() + 1)
                } else {
                    Pick::wrapping(predicted.index() + Pick::COUNT - 1)
                }
            }
        }
    }
}

/// Most frequent pick in `history`, lowest value winning ties.
///
/// Returns `None` for an empty history.
pub fn predict(history: &[Pick]) -> Option<Pick> {
    let mut freq = [0usize; Pick::COUNT];
    for pick in history {
        freq[pick.index()] += 1;
    }

    let mut best: Option<(usize, usize)> = None;
    for (value, &count) in freq.iter().enumerate() {
        if count > best.map_or(0, |(_, c)| c) {
            best = Some((value, count));
        }
    }
    best.map(|(value, _)| Pick::wrapping(value))
}

/// Picks the opponent's number for each difficulty.
#[derive(Debug, Clone, Copy, Default)]
pub struct MoveGenerator {
    hard_policy: HardPolicy,
}

impl MoveGenerator {
    /// Creates a generator whose hard difficulty follows `hard_policy`.
    pub fn new(hard_policy: HardPolicy) -> Self {
        Self { hard_policy }
    }

    /// Generates the opponent's next pick.
    #[instrument(skip(self, history, rng), fields(history_len = history.len()))]
    pub fn generate(
        &self,
        difficulty: Difficulty,
        history: &[Pick],
        rng: &mut dyn RandomSource,
    ) -> Pick {
        let pick = match difficulty {
            Difficulty::Easy => RandomStrategy.next_pick(history, rng),
            Difficulty::Medium => EchoStrategy::default().next_pick(history, rng),
            Difficulty::Hard => PatternStrategy::new(self.hard_policy).next_pick(history, rng),
        };
        debug!(%difficulty, opponent_pick = %pick, "Opponent pick generated");
        pick
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::cricket::random::ScriptedRandom;

    fn picks(values: &[i64]) -> Vec<Pick> {
        values.iter().map(|&v| Pick::new(v).unwrap()).collect()
    }

    #[test]
    fn test_predict_first_to_max_frequency() {
        assert_eq!(predict(&picks(&[3, 3, 3, 5, 5])), Some(Pick::new(3).unwrap()));
        assert_eq!(predict(&picks(&[7, 2, 7, 2])), Some(Pick::new(2).unwrap()));
        assert_eq!(predict(&[]), None);
    }

    #[test]
    fn test_medium_replays_last_pick() {
        let history = picks(&[4, 9]);
        let mut rng = ScriptedRandom::new([10]);
        let pick = EchoStrategy::default().next_pick(&history, &mut rng);
        assert_eq!(pick.value(), 9);
    }

    #[test]
    fn test_medium_falls_back_to_random() {
        let history = picks(&[4, 9]);
        let mut rng = ScriptedRandom::new([30, 6]);
        let pick = EchoStrategy::default().next_pick(&history, &mut rng);
        assert_eq!(pick.value(), 6);
    }

    #[test]
    fn test_medium_empty_history_is_random() {
        let mut rng = ScriptedRandom::new([2]);
        let pick = EchoStrategy::default().next_pick(&[], &mut rng);
        assert_eq!(pick.value(), 2);
        assert_eq!(rng.remaining(), 0);
    }

    #[test]
    fn test_hard_varied_neighbours_wrap() {
        let history = picks(&[10, 10, 0]);
        let strategy = PatternStrategy::new(HardPolicy::Varied);

        let mut exact = ScriptedRandom::new([10]);
        assert_eq!(strategy.next_pick(&history, &mut exact).value(), 10);

        let mut up = ScriptedRandom::new([80, 10]);
        assert_eq!(strategy.next_pick(&history, &mut up).value(), 0);

        let mut down = ScriptedRandom::new([80, 80]);
        assert_eq!(strategy.next_pick(&history, &mut down).value(), 9);
    }

    #[test]
    fn test_hard_exact_ignores_randomness() {
        let history = picks(&[1, 6, 6]);
        let mut rng = ScriptedRandom::new([99, 99]);
        let pick = MoveGenerator::new(HardPolicy::Exact).generate(Difficulty::Hard, &history, &mut rng);
        assert_eq!(pick.value(), 6);
        assert_eq!(rng.remaining(), 2);
    }
}
