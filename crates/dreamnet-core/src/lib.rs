//! Dreamnet Core: shared domain abstractions.
//!
//! This crate defines the fundamental traits and types that every quest
//! context depends on. It contains no infrastructure code.

pub mod aggregate;
pub mod command;
pub mod error;
pub mod event;
pub mod narrative;
pub mod rng;
pub mod role;
