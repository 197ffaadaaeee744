//! Content definitions produced by the rule engine.
//!
//! These are plain data: positions, dimensions and tags. Turning them into
//! meshes or collision bodies is the job of external collaborators.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Serialize, Serializer};

use crate::core::types::{Vec2, Vec3};
use crate::generation::district::DistrictKind;
use crate::generation::roads::RoadSegment;
use crate::math::Rect;
use crate::world::ChunkCoord;

/// Heuristic per-item memory weights used for chunk size estimates
pub const BUILDING_BYTES: usize = 64 * 1024;
pub const PARK_BYTES: usize = 32 * 1024;
pub const ROAD_BYTES: usize = 16 * 1024;
pub const FURNITURE_BYTES: usize = 4 * 1024;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildingStyle {
    GlassTower,
    Office,
    ArtDeco,
    Retail,
    MixedUse,
    Brownstone,
    Apartment,
    Townhouse,
    Warehouse,
    Factory,
    Pier,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParkKind {
    Park,
    Plaza,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FurnitureKind {
    StreetLamp,
    Bench,
    Hydrant,
    TrashBin,
    Tree,
    BusStop,
}

/// Identity of a building: owning chunk plus generation index
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BuildingId {
    pub chunk: ChunkCoord,
    pub index: u32,
}

impl fmt::Display for BuildingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.chunk, self.index)
    }
}

impl Serialize for BuildingId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A box-shaped building.
///
/// `position` is the center of the box; its base sits on `y = 0`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BuildingDefinition {
    pub id: BuildingId,
    pub position: Vec3,
    pub width: f32,
    pub height: f32,
    pub depth: f32,
    pub style: BuildingStyle,
    pub district: DistrictKind,
}

impl BuildingDefinition {
    /// Ground-plane footprint
    pub fn footprint(&self) -> Rect {
        Rect::from_center_half_extent(
            Vec2::new(self.position.x, self.position.z),
            Vec2::new(self.width * 0.5, self.depth * 0.5),
        )
    }
}

/// Open space that replaces building cells
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ParkDefinition {
    pub kind: ParkKind,
    pub bounds: Rect,
}

/// Street furniture item placed on a sidewalk
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FurnitureDefinition {
    pub kind: FurnitureKind,
    pub position: Vec3,
    /// Rotation about Y in radians, facing the road
    pub rotation: f32,
}

/// Everything generated for one chunk
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChunkContent {
    pub coord: ChunkCoord,
    /// `None` when the chunk was skipped (core region or no matching district)
    pub district: Option<DistrictKind>,
    pub buildings: BTreeMap<BuildingId, BuildingDefinition>,
    pub parks: Vec<ParkDefinition>,
    pub furniture: Vec<FurnitureDefinition>,
    pub roads: Vec<RoadSegment>,
}

impl ChunkContent {
    /// Content of a skipped chunk
    pub fn empty(coord: ChunkCoord) -> Self {
        Self {
            coord,
            district: None,
            buildings: BTreeMap::new(),
            parks: Vec::new(),
            furniture: Vec::new(),
            roads: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.buildings.is_empty()
            && self.parks.is_empty()
            && self.furniture.is_empty()
            && self.roads.is_empty()
    }

    /// Count-based size estimate; zero for an empty chunk
    pub fn memory_estimate_bytes(&self) -> usize {
        self.buildings.len() * BUILDING_BYTES
            + self.parks.len() * PARK_BYTES
            + self.roads.len() * ROAD_BYTES
            + self.furniture.len() * FURNITURE_BYTES
    }

    /// Drop all definitions, keeping the coordinate
    pub fn clear(&mut self) {
        self.district = None;
        self.buildings.clear();
        self.parks.clear();
        self.furniture.clear();
        self.roads.clear();
    }
}
