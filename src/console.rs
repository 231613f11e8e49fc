//! Single-player console variant.
//!
//! Drives the same [`GameEngine`] as the HTTP server from a line-based menu.

use std::io::{self, BufRead, Write};

use tracing::{info, instrument};

use crate::games::cricket::{
    Difficulty, GameEngine, GameState, Phase, RandomSource, Role, TossCall,
};
use crate::server::INSTRUCTIONS;

const RULE: &str = "==================================================";

/// Interactive console game over any reader and writer.
pub struct Console<R, W, S> {
    input: R,
    output: W,
    rng: S,
    engine: GameEngine,
    state: GameState,
}

impl<R, W, S> Console<R, W, S>
where
    R: BufRead,
    W: Write,
    S: RandomSource,
{
    /// Creates a console session.
    pub fn new(input: R, output: W, rng: S, engine: GameEngine) -> Self {
        Self {
            input,
            output,
            rng,
            engine,
            state: GameState::new(),
        }
    }

    /// Current game state.
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Runs the main menu until the player exits or input ends.
    #[instrument(skip(self))]
    pub fn run(&mut self) -> io::Result<()> {
        info!("Console game started");
        loop {
            self.show_menu()?;
            let Some(choice) = self.read_number("Enter your choice (1-4): ", 1, 4)? else {
                break;
            };
            match choice {
                1 => {
                    if !self.play_game()? {
                        break;
                    }
                }
                2 => {
                    if !self.choose_difficulty()? {
                        break;
                    }
                }
                3 => {
                    writeln!(self.output, "\nHOW TO PLAY\n{}\n{}", RULE, INSTRUCTIONS)?;
                }
                _ => break,
            }
        }
        writeln!(self.output, "\nThanks for playing!")?;
        info!("Console game finished");
        Ok(())
    }

    fn show_menu(&mut self) -> io::Result<()> {
        writeln!(self.output, "\n{}\n  ODD OR EVEN HAND CRICKET\n{}", RULE, RULE)?;
        writeln!(self.output, "  1. Start new game")?;
        writeln!(
            self.output,
            "  2. Change difficulty (current: {} - {})",
            self.state.difficulty().level(),
            self.state.difficulty().to_string().to_uppercase()
        )?;
        writeln!(self.output, "  3. How to play")?;
        writeln!(self.output, "  4. Exit")
    }

    /// Returns `false` if input ended.
    fn choose_difficulty(&mut self) -> io::Result<bool> {
        writeln!(self.output, "\n  1. EASY\n  2. MEDIUM\n  3. HARD")?;
        let Some(level) = self.read_number("Enter your choice (1-3): ", 1, 3)? else {
            return Ok(false);
        };
        let difficulty = Difficulty::from_level(level as u8)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        self.engine.set_difficulty(&mut self.state, difficulty);
        writeln!(
            self.output,
            "Difficulty set to {}.",
            difficulty.to_string().to_uppercase()
        )?;
        Ok(true)
    }

    /// Plays one full match. Returns `false` if input ended.
    fn play_game(&mut self) -> io::Result<bool> {
        self.engine.start_new_game(&mut self.state);

        let Some(call) = self.read_toss_call()? else {
            return Ok(false);
        };
        self.engine
            .call_toss(&mut self.state, call, &mut self.rng)
            .map_err(io::Error::other)?;
        writeln!(self.output, "{}", self.state.message())?;

        if *self.state.phase() == Phase::AwaitingRoleChoice {
            writeln!(self.output, "  1. BAT first\n  2. BOWL first")?;
            let Some(choice) = self.read_number("Enter your choice (1-2): ", 1, 2)? else {
                return Ok(false);
            };
            let role = if choice == 1 { Role::Bat } else { Role::Bowl };
            self.engine
                .choose_role(&mut self.state, role)
                .map_err(io::Error::other)?;
            writeln!(self.output, "{}", self.state.message())?;
        }

        while *self.state.phase() == Phase::InningsActive {
            writeln!(self.output, "\n{}", scoreboard(&self.state))?;
            let Some(pick) = self.read_number("Enter your number (0-10): ", 0, 10)? else {
                return Ok(false);
            };
            self.engine
                .play_round(&mut self.state, pick, &mut self.rng)
                .map_err(io::Error::other)?;
            writeln!(self.output, "{}", self.state.message())?;
        }

        writeln!(self.output, "\n{}\n  GAME OVER!\n{}", RULE, RULE)?;
        writeln!(self.output, "{}", scoreboard(&self.state))?;
        if let Some(result) = self.state.result() {
            writeln!(self.output, "{}", result)?;
        }
        Ok(true)
    }

    fn read_toss_call(&mut self) -> io::Result<Option<TossCall>> {
        loop {
            write!(self.output, "Call the toss, HEAD or TAILS (H/T): ")?;
            self.output.flush()?;
            let Some(line) = self.read_line()? else {
                return Ok(None);
            };
            match line.chars().next().map(|c| c.to_ascii_lowercase()) {
                Some('h') => return Ok(Some(TossCall::Head)),
                Some('t') => return Ok(Some(TossCall::Tails)),
                _ => writeln!(self.output, "Invalid input! Enter H or T.")?,
            }
        }
    }

    /// Reads an integer in `min..=max`, re-prompting until one is given.
    fn read_number(&mut self, prompt: &str, min: i64, max: i64) -> io::Result<Option<i64>> {
        loop {
            write!(self.output, "{}", prompt)?;
            self.output.flush()?;
            let Some(line) = self.read_line()? else {
                return Ok(None);
            };
            match line.parse::<i64>() {
                Ok(n) if (min..=max).contains(&n) => return Ok(Some(n)),
                _ => writeln!(
                    self.output,
                    "Invalid input! Enter a number between {} and {}.",
                    min, max
                )?,
            }
        }
    }

    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }
}

/// Text rendering of the scores and innings status.
pub fn scoreboard(state: &GameState) -> String {
    let role = if *state.is_batting() { "BATTING" } else { "BOWLING" };
    let innings = if *state.is_second_innings() { "2nd" } else { "1st" };
    let mut board = format!(
        "You: {} | Computer: {} | {} ({} innings)",
        state.player_score(),
        state.opponent_score(),
        role,
        innings
    );
    if *state.phase() == Phase::InningsActive
        && let (Some(target), Some(needed)) = (state.target(), state.runs_needed())
    {
        let chaser = if *state.is_batting() { "You need" } else { "Computer needs" };
        board.push_str(&format!("\nTarget: {} | {} {} more", target, chaser, needed));
    }
    board
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::cricket::ScriptedRandom;

    fn run_console(input: &str, draws: &[u32]) -> (String, GameState) {
        let mut output = Vec::new();
        let state = {
            let mut console = Console::new(
                input.as_bytes(),
                &mut output,
                ScriptedRandom::new(draws.iter().copied()),
                GameEngine::default(),
            );
            console.run().unwrap();
            console.state().clone()
        };
        (String::from_utf8(output).unwrap(), state)
    }

    #[test]
    fn test_instructions_and_difficulty() {
        let (output, state) = run_console("3\n2\n3\n4\n", &[]);
        assert!(output.contains("HOW TO PLAY"));
        assert!(output.contains("(current: 1 - EASY)"));
        assert!(output.contains("Difficulty set to HARD."));
        assert!(output.contains("(current: 3 - HARD)"));
        assert_eq!(*state.difficulty(), Difficulty::Hard);
    }

    #[test]
    fn test_invalid_input_reprompts() {
        let (output, _) = run_console("9\nabc\n4\n", &[]);
        assert_eq!(output.matches("Invalid input!").count(), 2);
    }

    #[test]
    fn test_full_match_against_scripted_opponent() {
        // Win toss, bat, out first ball for 0; opponent then scores 4 to win.
        let (output, state) = run_console("1\nh\n1\n5\n3\n4\n", &[0, 5, 4]);
        assert_eq!(*state.phase(), Phase::GameOver);
        assert!(output.contains("Computer chased the target!"));
        assert!(output.contains("Computer wins by 4 run(s)."));
    }
}
