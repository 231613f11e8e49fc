//! Core domain types for hand cricket.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::error::GameError;

/// A number shown by either side in a round, always in `0..=10`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Pick(u8);

impl Pick {
    /// Largest value a side may show.
    pub const MAX: u8 = 10;

    /// Number of distinct picks (`0..=10`).
    pub const COUNT: usize = Self::MAX as usize + 1;

    /// Creates a pick, rejecting anything outside `0..=10`.
    pub fn new(value: i64) -> Result<Self, GameError> {
        if (0..=i64::from(Self::MAX)).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(GameError::InvalidInput(format!(
                "pick must be between 0 and {}, got {}",
                Self::MAX,
                value
            )))
        }
    }

    /// Builds a pick from an index already known to be in range, wrapping otherwise.
    pub(crate) fn wrapping(value: usize) -> Self {
        Self((value % Self::COUNT) as u8)
    }

    /// Returns the raw value.
    pub fn value(self) -> u8 {
        self.0
    }

    /// Returns the value as a frequency-table index.
    pub(crate) fn index(self) -> usize {
        usize::from(self.0)
    }
}

impl TryFrom<i64> for Pick {
    type Error = GameError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Pick> for u8 {
    fn from(pick: Pick) -> Self {
        pick.0
    }
}

impl std::fmt::Display for Pick {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How hard the opponent tries to read the player.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Difficulty {
    /// Uniformly random picks.
    #[default]
    Easy,
    /// Sometimes replays the player's last pick.
    Medium,
    /// Predicts the player's most frequent pick.
    Hard,
}

impl Difficulty {
    /// Maps the numbered menu level (1-3) to a difficulty.
    pub fn from_level(level: u8) -> Result<Self, GameError> {
        match level {
            1 => Ok(Self::Easy),
            2 => Ok(Self::Medium),
            3 => Ok(Self::Hard),
            other => Err(GameError::InvalidInput(format!(
                "difficulty level must be 1, 2 or 3, got {}",
                other
            ))),
        }
    }

    /// Returns the numbered menu level (1-3).
    pub fn level(self) -> u8 {
        match self {
            Self::Easy => 1,
            Self::Medium => 2,
            Self::Hard => 3,
        }
    }

    /// Parses either a level number or a name such as `"hard"`.
    pub fn parse(input: &str) -> Result<Self, GameError> {
        let input = input.trim();
        if let Ok(level) = input.parse::<u8>() {
            return Self::from_level(level);
        }
        input
            .parse()
            .map_err(|_| GameError::InvalidInput(format!("unknown difficulty '{}'", input)))
    }
}

/// Where a game is in its lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Phase {
    /// Idle at the main menu.
    #[default]
    Menu,
    /// Waiting for the player to call heads or tails.
    AwaitingTossCall,
    /// Player won the toss and must choose to bat or bowl.
    AwaitingRoleChoice,
    /// An innings is being played.
    InningsActive,
    /// Both innings finished or the chase succeeded.
    GameOver,
}

/// The player's call on the coin toss.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum TossCall {
    /// Heads.
    #[strum(to_string = "head", serialize = "heads")]
    Head,
    /// Tails.
    #[strum(to_string = "tails", serialize = "tail")]
    Tails,
}

/// Batting or bowling.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Role {
    /// Scores runs until dismissed.
    Bat,
    /// Tries to match the batter's pick.
    Bowl,
}

impl Role {
    /// Returns the complementary role.
    pub fn opposite(self) -> Self {
        match self {
            Self::Bat => Self::Bowl,
            Self::Bowl => Self::Bat,
        }
    }
}

/// One of the two sides in a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Side {
    /// The human player.
    Player,
    /// The computer opponent.
    Opponent,
}

/// Final result of a completed match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::Display)]
#[serde(tag = "winner", rename_all = "snake_case")]
pub enum MatchResult {
    /// Player finished ahead.
    #[display("You win by {} run(s)!", margin)]
    PlayerWon {
        /// Run difference.
        margin: u32,
    },
    /// Opponent finished ahead.
    #[display("Computer wins by {} run(s).", margin)]
    OpponentWon {
        /// Run difference.
        margin: u32,
    },
    /// Scores level.
    #[display("It's a tie! Both scored {} run(s).", runs)]
    Tie {
        /// Each side's score.
        runs: u32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pick_bounds() {
        assert!(Pick::new(0).is_ok());
        assert!(Pick::new(10).is_ok());
        assert!(matches!(Pick::new(11), Err(GameError::InvalidInput(_))));
        assert!(matches!(Pick::new(-1), Err(GameError::InvalidInput(_))));
    }

    #[test]
    fn test_difficulty_parse_accepts_levels_and_names() {
        assert_eq!(Difficulty::parse("1").unwrap(), Difficulty::Easy);
        assert_eq!(Difficulty::parse("HARD").unwrap(), Difficulty::Hard);
        assert_eq!(Difficulty::parse("medium").unwrap(), Difficulty::Medium);
        assert!(Difficulty::parse("4").is_err());
        assert!(Difficulty::parse("insane").is_err());
    }

    #[test]
    fn test_toss_call_aliases() {
        assert_eq!("head".parse::<TossCall>().unwrap(), TossCall::Head);
        assert_eq!("Heads".parse::<TossCall>().unwrap(), TossCall::Head);
        assert_eq!("tail".parse::<TossCall>().unwrap(), TossCall::Tails);
    }

    #[test]
    fn test_pick_serde_rejects_out_of_range() {
        let pick: Pick = serde_json::from_str("7").unwrap();
        assert_eq!(pick.value(), 7);
        assert!(serde_json::from_str::<Pick>("12").is_err());
    }
}
