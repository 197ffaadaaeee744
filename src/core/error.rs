//! Error types for the Metrogrid streaming engine

use thiserror::Error;

use crate::world::{ChunkCoord, ChunkState};

/// Main error type for the crate
#[derive(Debug, Error)]
pub enum Error {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Invalid chunk key: {0:?}")]
    InvalidChunkKey(String),

    #[error("Illegal transition for chunk {coord}: {from:?} -> {to:?}")]
    IllegalTransition {
        coord: ChunkCoord,
        from: ChunkState,
        to: ChunkState,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
