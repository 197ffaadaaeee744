//! Seeded Park–Miller generator for reproducible per-chunk content

use crate::world::ChunkCoord;

const MODULUS: u64 = 2_147_483_647;
const MULTIPLIER: u64 = 16_807;

/// Minimal-standard linear congruential generator.
///
/// `state = state * 16807 mod (2^31 - 1)`; `next()` maps the state to
/// `[0, 1)`. One instance is created per chunk generation and never shared.
#[derive(Clone, Debug)]
pub struct SeededRng {
    state: u64,
}

impl SeededRng {
    /// Create a generator from an arbitrary 32-bit seed.
    ///
    /// Seeds congruent to zero would lock the sequence at zero, so they are
    /// shifted into the valid range `[1, 2^31 - 2]`.
    pub fn new(seed: u32) -> Self {
        let mut state = seed as u64 % MODULUS;
        if state == 0 {
            state = MODULUS - 1;
        }
        Self { state }
    }

    /// Generator for one chunk of a world
    pub fn for_chunk(coord: ChunkCoord, world_seed: u32) -> Self {
        Self::new(chunk_seed(coord, world_seed))
    }

    /// Advance and return a value in `[0, 1)`
    pub fn next_f64(&mut self) -> f64 {
        self.state = self.state * MULTIPLIER % MODULUS;
        (self.state - 1) as f64 / (MODULUS - 1) as f64
    }

    /// Uniform float in `[min, max)`; `min` when the range is empty
    pub fn range(&mut self, min: f32, max: f32) -> f32 {
        let value = (min as f64 + self.next_f64() * (max as f64 - min as f64)) as f32;
        if max > min {
            // Narrowing to f32 can round up onto `max`
            value.min(max.next_down())
        } else {
            min
        }
    }

    /// Uniform integer in `[min, max]` (inclusive)
    pub fn int(&mut self, min: i32, max: i32) -> i32 {
        let span = (max as i64 - min as i64 + 1) as f64;
        (min as i64 + (self.next_f64() * span).floor() as i64) as i32
    }

    /// Uniformly pick one element; `None` for an empty slice
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let index = self.int(0, items.len() as i32 - 1) as usize;
        items.get(index)
    }

    /// `true` with probability `p`
    pub fn chance(&mut self, p: f32) -> bool {
        self.next_f64() < p as f64
    }
}

/// Hash-combine a chunk coordinate with the world seed.
///
/// `(x * 73856093) ^ (z * 19349663) ^ world_seed`, truncated to 32 bits.
pub fn chunk_seed(coord: ChunkCoord, world_seed: u32) -> u32 {
    let hx = coord.x.wrapping_mul(73_856_093) as u32;
    let hz = coord.z.wrapping_mul(19_349_663) as u32;
    hx ^ hz ^ world_seed
}
