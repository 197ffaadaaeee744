//! Per-chunk lifecycle record

use std::collections::BTreeMap;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::core::Error;
use crate::core::types::Result;
use crate::generation::{BuildingDefinition, BuildingId, ChunkContent, DistrictKind};
use crate::math::Rect;
use crate::world::coord::ChunkCoord;
use crate::world::handle::{ChunkVisuals, PhysicsHandle};

/// Lifecycle state of a chunk.
///
/// A coordinate absent from the registry is implicitly `Unloaded`; records
/// are only ever observed in the other four states.
///
/// ```text
/// (absent) -> Loading -> Loaded <-> Active
///                        Loaded -> Unloading -> (absent)
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChunkState {
    Unloaded,
    Loading,
    Loaded,
    Active,
    Unloading,
}

impl ChunkState {
    /// Whether `self -> next` is an edge of the lifecycle graph
    pub fn can_transition_to(self, next: ChunkState) -> bool {
        use ChunkState::*;
        matches!(
            (self, next),
            (Unloaded, Loading)
                | (Loading, Loaded)
                | (Loaded, Active)
                | (Active, Loaded)
                | (Loaded, Unloading)
                | (Unloading, Unloaded)
        )
    }

    /// Visual content is attached in these states
    pub fn is_resident(self) -> bool {
        matches!(self, ChunkState::Loaded | ChunkState::Active)
    }
}

/// State and resource handles for one grid cell.
///
/// Invariants maintained by the chunk manager:
/// - `physics` is empty unless `state == Active`
/// - `visuals` is `Some` iff `state` is `Loaded` or `Active`
#[derive(Debug)]
pub struct ChunkRecord {
    coord: ChunkCoord,
    key: String,
    state: ChunkState,
    /// World-space rectangle covered by the chunk
    pub bounds: Rect,
    /// Scene nodes owned by this chunk while resident
    pub visuals: Option<ChunkVisuals>,
    /// Collision bodies, in creation order
    pub physics: Vec<PhysicsHandle>,
    /// Generated content definitions
    pub content: ChunkContent,
    /// When the placeholder was reserved
    pub load_started: Instant,
    /// Last time the chunk was looked up or seen within load range
    pub last_access: Instant,
    /// Rank in the load queue batch that produced this record
    pub priority: u32,
    /// Heuristic size of the chunk's content (count based)
    pub memory_estimate_bytes: usize,
}

impl ChunkRecord {
    /// Create a placeholder record in the `Loading` state
    pub fn placeholder(coord: ChunkCoord, chunk_size: f32, priority: u32) -> Self {
        let now = Instant::now();
        Self {
            coord,
            key: coord.key(),
            state: ChunkState::Loading,
            bounds: coord.bounds(chunk_size),
            visuals: None,
            physics: Vec::new(),
            content: ChunkContent::empty(coord),
            load_started: now,
            last_access: now,
            priority,
            memory_estimate_bytes: 0,
        }
    }

    pub fn coord(&self) -> ChunkCoord {
        self.coord
    }

    /// Canonical `"x,z"` identity
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn state(&self) -> ChunkState {
        self.state
    }

    /// Building definitions keyed by id
    pub fn buildings(&self) -> &BTreeMap<BuildingId, BuildingDefinition> {
        &self.content.buildings
    }

    pub fn district(&self) -> Option<DistrictKind> {
        self.content.district
    }

    /// Move to `next`, rejecting edges outside the lifecycle graph
    pub fn transition(&mut self, next: ChunkState) -> Result<()> {
        if !self.state.can_transition_to(next) {
            return Err(Error::IllegalTransition {
                coord: self.coord,
                from: self.state,
                to: next,
            });
        }
        log::trace!("chunk {}: {:?} -> {:?}", self.key, self.state, next);
        self.state = next;
        Ok(())
    }

    /// Mark this chunk as recently accessed
    pub fn touch(&mut self) {
        self.last_access = Instant::now();
    }
}
