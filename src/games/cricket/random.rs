//! Source of randomness consumed by the opponent and the coin toss.
//!
//! Everything random in a game goes through [`RandomSource::below`], so a
//! scripted source can replay an exact sequence of draws.

use std::collections::VecDeque;

use rand::Rng;
use rand::rngs::{StdRng, ThreadRng};
use tracing::warn;

use super::types::Pick;

/// Uniform integer draws.
pub trait RandomSource {
    /// Returns a uniformly distributed value in `0..bound`.
    fn below(&mut self, bound: u32) -> u32;

    /// Uniform pick in `0..=10`.
    fn pick(&mut self) -> Pick {
        Pick::wrapping(self.below(Pick::COUNT as u32) as usize)
    }

    /// True with the given percentage probability.
    fn percent(&mut self, chance: u32) -> bool {
        self.below(100) < chance
    }

    /// Fair coin.
    fn coin(&mut self) -> bool {
        self.below(2) == 0
    }
}

impl RandomSource for ThreadRng {
    fn below(&mut self, bound: u32) -> u32 {
        self.gen_range(0..bound.max(1))
    }
}

impl RandomSource for StdRng {
    fn below(&mut self, bound: u32) -> u32 {
        self.gen_range(0..bound.max(1))
    }
}

/// Replays a fixed queue of draws, for tests and replays.
///
/// Each queued value is reduced modulo the requested bound. Once the queue is
/// empty every draw returns 0.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRandom {
    draws: VecDeque<u32>,
}

impl ScriptedRandom {
    /// Creates a source that yields `draws` in order.
    pub fn new(draws: impl IntoIterator<Item = u32>) -> Self {
        Self {
            draws: draws.into_iter().collect(),
        }
    }

    /// Number of draws not yet consumed.
    pub fn remaining(&self) -> usize {
        self.draws.len()
    }
}

impl RandomSource for ScriptedRandom {
    fn below(&mut self, bound: u32) -> u32 {
        match self.draws.pop_front() {
            Some(draw) => draw % bound.max(1),
            None => {
                warn!(bound, "Scripted randomness exhausted, returning 0");
                0
            }
        }
    }
}
