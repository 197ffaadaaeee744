//! District classification and per-district generation rules

use serde::{Deserialize, Serialize};

use crate::generation::content::{BuildingStyle, FurnitureKind, ParkKind};
use crate::math::Rect;

/// District classification tag assigned to a chunk by its centroid
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistrictKind {
    Downtown,
    Commercial,
    Residential,
    Industrial,
    Waterfront,
}

impl DistrictKind {
    pub const ALL: [DistrictKind; 5] = [
        DistrictKind::Downtown,
        DistrictKind::Commercial,
        DistrictKind::Residential,
        DistrictKind::Industrial,
        DistrictKind::Waterfront,
    ];

    /// Generation ruleset for this district
    pub fn rules(self) -> &'static DistrictRules {
        match self {
            DistrictKind::Downtown => &DOWNTOWN,
            DistrictKind::Commercial => &COMMERCIAL,
            DistrictKind::Residential => &RESIDENTIAL,
            DistrictKind::Industrial => &INDUSTRIAL,
            DistrictKind::Waterfront => &WATERFRONT,
        }
    }
}

/// Density, dimension, and style rules for one district type.
///
/// Ranges are `(min, max)` in world units. `width.1` and `depth.1` stay
/// below `spacing` so a building never leaves its grid cell.
#[derive(Clone, Debug, PartialEq)]
pub struct DistrictRules {
    /// Edge length of one building grid cell
    pub spacing: f32,
    /// Probability that a free cell receives a building
    pub density: f32,
    pub width: (f32, f32),
    pub depth: (f32, f32),
    pub height: (f32, f32),
    pub styles: &'static [BuildingStyle],
    /// Probability of one park or plaza per chunk
    pub park_chance: f32,
    pub park_kind: ParkKind,
    /// Probability that a sidewalk slot receives a furniture item
    pub furniture_chance: f32,
    pub furniture: &'static [FurnitureKind],
}

static DOWNTOWN: DistrictRules = DistrictRules {
    spacing: 40.0,
    density: 0.85,
    width: (24.0, 34.0),
    depth: (24.0, 34.0),
    height: (60.0, 220.0),
    styles: &[BuildingStyle::GlassTower, BuildingStyle::Office, BuildingStyle::ArtDeco],
    park_chance: 0.10,
    park_kind: ParkKind::Plaza,
    furniture_chance: 0.5,
    furniture: &[
        FurnitureKind::StreetLamp,
        FurnitureKind::Bench,
        FurnitureKind::BusStop,
        FurnitureKind::Hydrant,
        FurnitureKind::TrashBin,
    ],
};

static COMMERCIAL: DistrictRules = DistrictRules {
    spacing: 32.0,
    density: 0.75,
    width: (18.0, 28.0),
    depth: (18.0, 28.0),
    height: (15.0, 60.0),
    styles: &[BuildingStyle::Retail, BuildingStyle::Office, BuildingStyle::MixedUse],
    park_chance: 0.12,
    park_kind: ParkKind::Plaza,
    furniture_chance: 0.4,
    furniture: &[
        FurnitureKind::StreetLamp,
        FurnitureKind::Bench,
        FurnitureKind::BusStop,
        FurnitureKind::TrashBin,
    ],
};

static RESIDENTIAL: DistrictRules = DistrictRules {
    spacing: 25.0,
    density: 0.6,
    width: (10.0, 18.0),
    depth: (10.0, 18.0),
    height: (6.0, 24.0),
    styles: &[BuildingStyle::Brownstone, BuildingStyle::Apartment, BuildingStyle::Townhouse],
    park_chance: 0.25,
    park_kind: ParkKind::Park,
    furniture_chance: 0.25,
    furniture: &[
        FurnitureKind::StreetLamp,
        FurnitureKind::Tree,
        FurnitureKind::Bench,
        FurnitureKind::Hydrant,
    ],
};

static INDUSTRIAL: DistrictRules = DistrictRules {
    spacing: 45.0,
    density: 0.5,
    width: (28.0, 40.0),
    depth: (28.0, 42.0),
    height: (8.0, 20.0),
    styles: &[BuildingStyle::Warehouse, BuildingStyle::Factory],
    park_chance: 0.03,
    park_kind: ParkKind::Park,
    furniture_chance: 0.1,
    furniture: &[FurnitureKind::StreetLamp, FurnitureKind::Hydrant],
};

static WATERFRONT: DistrictRules = DistrictRules {
    spacing: 35.0,
    density: 0.4,
    width: (14.0, 26.0),
    depth: (14.0, 26.0),
    height: (8.0, 30.0),
    styles: &[BuildingStyle::Pier, BuildingStyle::Warehouse, BuildingStyle::MixedUse],
    park_chance: 0.3,
    park_kind: ParkKind::Plaza,
    furniture_chance: 0.3,
    furniture: &[
        FurnitureKind::StreetLamp,
        FurnitureKind::Bench,
        FurnitureKind::Tree,
    ],
};

/// A rectangle of the world tagged with a district type
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DistrictBounds {
    pub kind: DistrictKind,
    pub bounds: Rect,
}

impl DistrictBounds {
    pub fn new(kind: DistrictKind, bounds: Rect) -> Self {
        Self { kind, bounds }
    }
}

/// Static district layout of the world.
///
/// Points inside `excluded_core` are populated by a separate subsystem and
/// never classified. Otherwise the first region containing the point wins.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DistrictMap {
    pub regions: Vec<DistrictBounds>,
    #[serde(default)]
    pub excluded_core: Option<Rect>,
}

impl DistrictMap {
    /// Map with no districts; every chunk generates empty
    pub fn empty() -> Self {
        Self {
            regions: Vec::new(),
            excluded_core: None,
        }
    }

    /// Single district covering `bounds`
    pub fn uniform(kind: DistrictKind, bounds: Rect) -> Self {
        Self {
            regions: vec![DistrictBounds::new(kind, bounds)],
            excluded_core: None,
        }
    }

    /// Ring city: hand-built core, downtown and commercial rings, an
    /// industrial west side and a waterfront strip on the east shore,
    /// residential everywhere else out to the city limit.
    pub fn city_default() -> Self {
        Self {
            regions: vec![
                DistrictBounds::new(DistrictKind::Waterfront, Rect::from_extents(2000.0, 2600.0, -4000.0, 4000.0)),
                DistrictBounds::new(DistrictKind::Downtown, Rect::from_extents(-1000.0, 1000.0, -1000.0, 1000.0)),
                DistrictBounds::new(DistrictKind::Commercial, Rect::from_extents(-2000.0, 2000.0, -2000.0, 2000.0)),
                DistrictBounds::new(DistrictKind::Industrial, Rect::from_extents(-4000.0, -2000.0, -4000.0, 4000.0)),
                DistrictBounds::new(DistrictKind::Residential, Rect::from_extents(-4000.0, 4000.0, -4000.0, 4000.0)),
            ],
            excluded_core: Some(Rect::from_extents(-300.0, 300.0, -300.0, 300.0)),
        }
    }

    /// District at a world position, or `None` when generation is skipped
    pub fn classify(&self, x: f32, z: f32) -> Option<DistrictKind> {
        if let Some(core) = &self.excluded_core {
            if core.contains_point(x, z) {
                return None;
            }
        }

        self.regions
            .iter()
            .find(|region| region.bounds.contains_point(x, z))
            .map(|region| region.kind)
    }
}

impl Default for DistrictMap {
    fn default() -> Self {
        Self::city_default()
    }
}
