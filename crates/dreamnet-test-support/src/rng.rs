//! Test RNGs: scripted `DeterministicRng` implementations.

use std::collections::VecDeque;

use dreamnet_core::rng::DeterministicRng;

/// Always answers the low end of every range.
///
/// Against the built-in catalog this draws the first challenge of each
/// pool and puts the Warden challenge first.
#[derive(Debug)]
pub struct MockRng;

impl DeterministicRng for MockRng {
    fn next_u32_range(&mut self, min: u32, _max: u32) -> u32 {
        min
    }
}

/// Answers from a script of picks, one per draw, clamped into the
/// requested range.
///
/// A catalog draw consumes three picks: the Warden index, the Scholar
/// index, then the order (0 puts the Warden first).
#[derive(Debug)]
pub struct SequenceRng {
    picks: VecDeque<u32>,
    drawn: usize,
}

impl SequenceRng {
    /// Creates an RNG that answers with `picks` in order.
    #[must_use]
    pub fn new(picks: Vec<u32>) -> Self {
        Self {
            picks: picks.into(),
            drawn: 0,
        }
    }

    /// Picks not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.picks.len()
    }
}

impl DeterministicRng for SequenceRng {
    /// # Panics
    ///
    /// Panics when the script runs out, so a test never silently draws
    /// more than it scripted.
    fn next_u32_range(&mut self, min: u32, max: u32) -> u32 {
        let Some(pick) = self.picks.pop_front() else {
            panic!("SequenceRng script exhausted after {} picks", self.drawn);
        };
        self.drawn += 1;
        pick.clamp(min, max.max(min))
    }
}
