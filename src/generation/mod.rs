//! Deterministic content rule engine: turns a chunk coordinate into
//! building, park, road and street-furniture definitions.
//!
//! Generation for one chunk:
//! 1. Classify the chunk centroid against the district map (no match = empty chunk)
//! 2. Seed a fresh PRNG from `(x, z, world_seed)`
//! 3. Emit road segments owned by the chunk
//! 4. Roll for a park or plaza
//! 5. Walk the district's building grid, skipping road lanes and the park
//! 6. Scatter street furniture along the sidewalks
//!
//! The output depends only on the coordinate and configuration, so the same
//! chunk regenerates identically no matter where or when it is requested.

pub mod config;
pub mod rng;
pub mod district;
pub mod roads;
pub mod content;

pub use config::GenerationConfig;
pub use rng::{SeededRng, chunk_seed};
pub use district::{DistrictKind, DistrictRules, DistrictBounds, DistrictMap};
pub use roads::{RoadKind, RoadLayout, RoadSegment};
pub use content::{
    BuildingDefinition, BuildingId, BuildingStyle, ChunkContent,
    FurnitureDefinition, FurnitureKind, ParkDefinition, ParkKind,
};

use rayon::prelude::*;

use crate::core::types::{Vec2, Vec3};
use crate::math::Rect;
use crate::world::ChunkCoord;

/// Distance between furniture slots along a road
const FURNITURE_SPACING: f32 = 25.0;
/// Offset from the lane edge to the sidewalk line
const SIDEWALK_OFFSET: f32 = 3.0;

/// Generates chunk content definitions from configuration.
///
/// Stateless apart from configuration; share it behind an `Arc` to
/// generate from worker threads.
#[derive(Clone, Debug)]
pub struct ContentGenerator {
    config: GenerationConfig,
    chunk_size: f32,
}

impl ContentGenerator {
    pub fn new(config: GenerationConfig, chunk_size: f32) -> Self {
        Self { config, chunk_size }
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    pub fn chunk_size(&self) -> f32 {
        self.chunk_size
    }

    /// Generate the content of one chunk.
    pub fn generate(&self, coord: ChunkCoord) -> ChunkContent {
        let bounds = coord.bounds(self.chunk_size);
        let centroid = bounds.center();

        let Some(district) = self.config.districts.classify(centroid.x, centroid.y) else {
            log::trace!("chunk {}: no district at centroid, skipping generation", coord);
            return ChunkContent::empty(coord);
        };

        let rules = district.rules();
        let mut rng = SeededRng::for_chunk(coord, self.config.world_seed);

        let mut content = ChunkContent::empty(coord);
        content.district = Some(district);
        content.roads = self.config.roads.segments_in(&bounds);

        let park = self.roll_park(&mut rng, rules, &bounds);
        self.place_buildings(&mut rng, district, rules, &bounds, park.as_ref(), &mut content);
        content.parks.extend(park);
        self.place_furniture(&mut rng, rules, &mut content);

        log::trace!(
            "chunk {}: {:?}, {} buildings, {} parks, {} furniture, {} roads",
            coord,
            district,
            content.buildings.len(),
            content.parks.len(),
            content.furniture.len(),
            content.roads.len(),
        );

        content
    }

    /// Generate many chunks in parallel, preserving input order.
    pub fn generate_region(&self, coords: &[ChunkCoord]) -> Vec<ChunkContent> {
        coords.par_iter().map(|&coord| self.generate(coord)).collect()
    }

    fn roll_park(&self, rng: &mut SeededRng, rules: &DistrictRules, bounds: &Rect) -> Option<ParkDefinition> {
        if !rng.chance(rules.park_chance) {
            return None;
        }

        let size = self.chunk_size;
        let half = Vec2::new(rng.range(0.25, 0.45) * size, rng.range(0.25, 0.45) * size) * 0.5;
        let center = bounds.min + Vec2::new(rng.range(0.3, 0.7) * size, rng.range(0.3, 0.7) * size);

        Some(ParkDefinition {
            kind: rules.park_kind,
            bounds: Rect::from_center_half_extent(center, half),
        })
    }

    fn place_buildings(
        &self,
        rng: &mut SeededRng,
        district: DistrictKind,
        rules: &DistrictRules,
        bounds: &Rect,
        park: Option<&ParkDefinition>,
        content: &mut ChunkContent,
    ) {
        if !(rules.spacing.is_finite() && rules.spacing > 0.0) {
            log::warn!("chunk {}: {:?} has unusable spacing {}, no buildings", content.coord, district, rules.spacing);
            return;
        }

        let cells = (self.chunk_size / rules.spacing).floor() as i32;
        let mut index = 0u32;

        for i in 0..cells {
            for j in 0..cells {
                let min_x = bounds.min_x() + i as f32 * rules.spacing;
                let min_z = bounds.min_z() + j as f32 * rules.spacing;
                let cell = Rect::from_extents(min_x, min_x + rules.spacing, min_z, min_z + rules.spacing);

                if self.config.roads.overlaps_cell(&cell) {
                    continue;
                }
                if park.is_some_and(|p| p.bounds.intersects(&cell)) {
                    continue;
                }
                if !rng.chance(rules.density) {
                    continue;
                }

                let width = rng.range(rules.width.0, rules.width.1);
                let depth = rng.range(rules.depth.0, rules.depth.1);
                let height = rng.range(rules.height.0, rules.height.1);
                let Some(&style) = rng.pick(rules.styles) else {
                    continue;
                };

                let center = cell.center();
                let id = BuildingId { chunk: content.coord, index };
                index += 1;

                content.buildings.insert(id, BuildingDefinition {
                    id,
                    position: Vec3::new(center.x, height * 0.5, center.y),
                    width,
                    height,
                    depth,
                    style,
                    district,
                });
            }
        }
    }

    fn place_furniture(&self, rng: &mut SeededRng, rules: &DistrictRules, content: &mut ChunkContent) {
        for road in &content.roads {
            let direction = (road.end - road.start).normalize_or_zero();
            let normal = direction.perp();
            let length = road.length();
            let offset = road.width * 0.5 + SIDEWALK_OFFSET;

            let mut t = FURNITURE_SPACING * 0.5;
            while t < length {
                for side in [-1.0f32, 1.0] {
                    if !rng.chance(rules.furniture_chance) {
                        continue;
                    }
                    let Some(&kind) = rng.pick(rules.furniture) else {
                        continue;
                    };

                    let spot = road.start + direction * t + normal * (side * offset);
                    // Face back toward the lane
                    let facing = normal * -side;

                    content.furniture.push(FurnitureDefinition {
                        kind,
                        position: Vec3::new(spot.x, 0.0, spot.y),
                        rotation: facing.x.atan2(facing.y),
                    });
                }
                t += FURNITURE_SPACING;
            }
        }
    }
}
