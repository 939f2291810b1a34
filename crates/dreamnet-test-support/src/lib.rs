//! Shared test doubles and utilities for the Dreamnet quest engine.

mod clock;
mod narrator;
mod rng;

pub use clock::FixedClock;
pub use narrator::{FailingNarrator, ScriptedNarrator, StallingNarrator};
pub use rng::{MockRng, SequenceRng};
