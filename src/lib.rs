//! Metrogrid - chunk streaming engine for open-world city maps
//!
//! Streams a grid of square chunks in and out around the player with
//! hysteresis, frame-time and concurrency budgets, and generates each chunk's
//! buildings, roads and street furniture deterministically from a seed.

pub mod core;
pub mod math;
pub mod world;
pub mod generation;
pub mod streaming;

pub use crate::core::Error;
pub use crate::core::types::Result;
