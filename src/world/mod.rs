//! World grid: chunk coordinates, handles, and per-chunk records

pub mod coord;
pub mod handle;
pub mod chunk;

pub use coord::{
    ChunkCoord,
    world_to_chunk, chunk_to_bounds, parse_key, chunks_in_radius, distance,
};
pub use handle::{VisualHandle, PhysicsHandle, VisualGroup, ChunkVisuals};
pub use chunk::{ChunkState, ChunkRecord};
