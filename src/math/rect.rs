//! Axis-aligned rectangle on the ground (XZ) plane

use serde::{Deserialize, Serialize};

use crate::core::types::Vec2;

/// Axis-aligned rectangle defined by min and max corners.
///
/// `x` of each corner is world X, `y` is world Z. Containment is half-open
/// (`min <= p < max`) so rectangles that share an edge tile the plane
/// without double-counting points on the seam.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    /// Create rectangle from min and max corners
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Create rectangle from scalar extents
    pub fn from_extents(min_x: f32, max_x: f32, min_z: f32, max_z: f32) -> Self {
        Self::new(Vec2::new(min_x, min_z), Vec2::new(max_x, max_z))
    }

    /// Create rectangle from center and half-extents
    pub fn from_center_half_extent(center: Vec2, half_extent: Vec2) -> Self {
        Self::new(center - half_extent, center + half_extent)
    }

    pub fn min_x(&self) -> f32 {
        self.min.x
    }

    pub fn max_x(&self) -> f32 {
        self.max.x
    }

    pub fn min_z(&self) -> f32 {
        self.min.y
    }

    pub fn max_z(&self) -> f32 {
        self.max.y
    }

    /// Get center point
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Get size (max - min)
    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    /// Check if a ground-plane point lies inside the rectangle
    pub fn contains_point(&self, x: f32, z: f32) -> bool {
        x >= self.min.x && x < self.max.x && z >= self.min.y && z < self.max.y
    }

    /// Check if two rectangles overlap with positive area.
    ///
    /// Rectangles that only touch along an edge do not intersect.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.min.x < other.max.x && self.max.x > other.min.x &&
        self.min.y < other.max.y && self.max.y > other.min.y
    }
}
