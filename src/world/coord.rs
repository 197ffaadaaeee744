//! Chunk grid coordinates and pure grid utilities

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::Error;
use crate::core::types::{Result, Vec2};
use crate::math::Rect;

/// Integer coordinate identifying a chunk in the ground-plane grid
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkCoord {
    pub x: i32,
    pub z: i32,
}

impl ChunkCoord {
    /// Create a new chunk coordinate
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// World-space rectangle covered by this chunk
    pub fn bounds(&self, chunk_size: f32) -> Rect {
        chunk_to_bounds(*self, chunk_size)
    }

    /// World-space center of this chunk
    pub fn centroid(&self, chunk_size: f32) -> Vec2 {
        self.bounds(chunk_size).center()
    }

    /// Canonical identity string, `"x,z"`
    pub fn key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ChunkCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.z)
    }
}

impl FromStr for ChunkCoord {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_key(s)
    }
}

/// Convert world position to chunk coordinate (floor division)
pub fn world_to_chunk(x: f32, z: f32, chunk_size: f32) -> ChunkCoord {
    ChunkCoord {
        x: (x / chunk_size).floor() as i32,
        z: (z / chunk_size).floor() as i32,
    }
}

/// World-space bounds of a chunk: `min = coord * chunk_size`, `max = min + chunk_size`
pub fn chunk_to_bounds(coord: ChunkCoord, chunk_size: f32) -> Rect {
    let min_x = coord.x as f32 * chunk_size;
    let min_z = coord.z as f32 * chunk_size;
    Rect::from_extents(min_x, min_x + chunk_size, min_z, min_z + chunk_size)
}

/// Parse a `"x,z"` key back into a coordinate
pub fn parse_key(key: &str) -> Result<ChunkCoord> {
    let invalid = || Error::InvalidChunkKey(key.to_string());

    let (x, z) = key.split_once(',').ok_or_else(invalid)?;
    let x = x.trim().parse::<i32>().map_err(|_| invalid())?;
    let z = z.trim().parse::<i32>().map_err(|_| invalid())?;

    Ok(ChunkCoord { x, z })
}

/// Full square neighborhood of `center`, `(2 * radius + 1)^2` entries.
///
/// Ordered by the nested loop `x` outer, `z` inner. Cells that would fall
/// outside the `i32` grid are left out, so a center on the grid edge yields
/// a clipped square.
pub fn chunks_in_radius(center: ChunkCoord, radius: u32) -> Vec<ChunkCoord> {
    let r = i32::try_from(radius).unwrap_or(i32::MAX);
    let side = (2 * radius as usize) + 1;
    let mut coords = Vec::with_capacity(side * side);

    for dx in -r..=r {
        let Some(x) = center.x.checked_add(dx) else {
            continue;
        };
        for dz in -r..=r {
            let Some(z) = center.z.checked_add(dz) else {
                continue;
            };
            coords.push(ChunkCoord::new(x, z));
        }
    }

    coords
}

/// Chebyshev distance `max(|dx|, |dz|)`; loading regions are grid squares
pub fn distance(a: ChunkCoord, b: ChunkCoord) -> i32 {
    let d = a.x.abs_diff(b.x).max(a.z.abs_diff(b.z));
    i32::try_from(d).unwrap_or(i32::MAX)
}
