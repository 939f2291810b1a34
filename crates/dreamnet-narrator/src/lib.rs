//! Dreamnet: narrative service adapters.

pub mod gemini;

pub use gemini::{GeminiConfig, GeminiNarrator};
