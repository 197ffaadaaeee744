//! Periodic road grid: avenues along Z, streets along X

use serde::{Deserialize, Serialize};

use crate::core::types::Vec2;
use crate::math::Rect;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoadKind {
    /// Runs along Z at `x = k * avenue_period`
    Avenue,
    /// Runs along X at `z = k * street_period`
    Street,
}

/// One lane segment clipped to a chunk
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RoadSegment {
    pub kind: RoadKind,
    pub start: Vec2,
    pub end: Vec2,
    pub width: f32,
}

impl RoadSegment {
    pub fn length(&self) -> f32 {
        self.start.distance(self.end)
    }
}

/// Spacing and width of the city's road lanes.
///
/// Lane centers sit on multiples of the period; a lane covers
/// `center ± width / 2`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoadLayout {
    pub avenue_period: f32,
    pub avenue_width: f32,
    pub street_period: f32,
    pub street_width: f32,
}

impl Default for RoadLayout {
    fn default() -> Self {
        Self {
            avenue_period: 200.0,
            avenue_width: 24.0,
            street_period: 100.0,
            street_width: 14.0,
        }
    }
}

impl RoadLayout {
    /// Whether any lane overlaps the cell with positive area
    pub fn overlaps_cell(&self, cell: &Rect) -> bool {
        lane_overlaps(cell.min_x(), cell.max_x(), self.avenue_period, self.avenue_width)
            || lane_overlaps(cell.min_z(), cell.max_z(), self.street_period, self.street_width)
    }

    /// Lane segments whose center line starts inside `bounds`.
    ///
    /// Lanes are owned by the chunk containing their center line so a
    /// segment is emitted by exactly one chunk.
    pub fn segments_in(&self, bounds: &Rect) -> Vec<RoadSegment> {
        let mut segments = Vec::new();

        for x in lane_centers(bounds.min_x(), bounds.max_x(), self.avenue_period) {
            segments.push(RoadSegment {
                kind: RoadKind::Avenue,
                start: Vec2::new(x, bounds.min_z()),
                end: Vec2::new(x, bounds.max_z()),
                width: self.avenue_width,
            });
        }

        for z in lane_centers(bounds.min_z(), bounds.max_z(), self.street_period) {
            segments.push(RoadSegment {
                kind: RoadKind::Street,
                start: Vec2::new(bounds.min_x(), z),
                end: Vec2::new(bounds.max_x(), z),
                width: self.street_width,
            });
        }

        segments
    }
}

/// Modulo test: does a lane of `width` centered on a multiple of `period`
/// overlap the open interval `(min, max)`?
fn lane_overlaps(min: f32, max: f32, period: f32, width: f32) -> bool {
    if period <= 0.0 || width <= 0.0 {
        return false;
    }
    let half = width * 0.5;
    // First lane center strictly greater than `min - half`
    let k = ((min - half) / period).floor() + 1.0;
    let center = k * period;
    center - half < max
}

/// Lane centers in `[min, max)`
fn lane_centers(min: f32, max: f32, period: f32) -> Vec<f32> {
    if period <= 0.0 {
        return Vec::new();
    }
    let mut centers = Vec::new();
    let mut k = (min / period).ceil();
    while k * period < max {
        centers.push(k * period);
        let next = k + 1.0;
        // Past f32 integer precision the lane index stops advancing
        if next == k {
            break;
        }
        k = next;
    }
    centers
}
