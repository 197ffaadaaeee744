//! Load and unload queues for the chunk manager

use std::collections::{HashSet, VecDeque};

use crate::world::{ChunkCoord, distance};

/// A coordinate waiting to be loaded
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QueuedLoad {
    pub coord: ChunkCoord,
    /// Chebyshev distance from the player chunk at enqueue time
    pub distance: i32,
    /// Position within the batch that enqueued it
    pub rank: u32,
}

/// FIFO of load candidates, nearest first within each batch.
///
/// A coordinate appears at most once.
#[derive(Debug, Default)]
pub struct LoadQueue {
    entries: VecDeque<QueuedLoad>,
    members: HashSet<ChunkCoord>,
}

impl LoadQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a batch sorted ascending by distance to `center`.
    ///
    /// The sort is stable, so ties keep their input order. Coordinates
    /// already queued are skipped. Returns the number appended.
    pub fn push_batch(&mut self, candidates: impl IntoIterator<Item = ChunkCoord>, center: ChunkCoord) -> usize {
        let mut batch: Vec<QueuedLoad> = candidates
            .into_iter()
            .filter(|coord| !self.members.contains(coord))
            .map(|coord| QueuedLoad {
                coord,
                distance: distance(coord, center),
                rank: 0,
            })
            .collect();
        batch.sort_by_key(|entry| entry.distance);

        let mut added = 0;
        for mut entry in batch {
            if !self.members.insert(entry.coord) {
                continue;
            }
            entry.rank = added;
            self.entries.push_back(entry);
            added += 1;
        }
        added as usize
    }

    pub fn pop(&mut self) -> Option<QueuedLoad> {
        let entry = self.entries.pop_front()?;
        self.members.remove(&entry.coord);
        Some(entry)
    }

    /// Drop a coordinate from the queue
    pub fn remove(&mut self, coord: ChunkCoord) -> bool {
        if !self.members.remove(&coord) {
            return false;
        }
        self.entries.retain(|entry| entry.coord != coord);
        true
    }

    pub fn contains(&self, coord: ChunkCoord) -> bool {
        self.members.contains(&coord)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.members.clear();
    }

    /// Queued entries in pop order
    pub fn iter(&self) -> impl Iterator<Item = &QueuedLoad> {
        self.entries.iter()
    }
}

/// FIFO of unload candidates without duplicates
#[derive(Debug, Default)]
pub struct UnloadQueue {
    entries: VecDeque<ChunkCoord>,
    members: HashSet<ChunkCoord>,
}

impl UnloadQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` if the coordinate is already queued
    pub fn push(&mut self, coord: ChunkCoord) -> bool {
        if !self.members.insert(coord) {
            return false;
        }
        self.entries.push_back(coord);
        true
    }

    pub fn pop(&mut self) -> Option<ChunkCoord> {
        let coord = self.entries.pop_front()?;
        self.members.remove(&coord);
        Some(coord)
    }

    pub fn contains(&self, coord: ChunkCoord) -> bool {
        self.members.contains(&coord)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.members.clear();
    }
}
