//! Streaming configuration and platform presets

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::Error;
use crate::core::types::Result;

/// Target hardware class, chosen by an external capability check
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    /// Desktop / high-memory clients
    Desktop,
    /// Mobile / low-memory clients
    Mobile,
}

/// Configuration for the chunk manager.
///
/// Radii are in chunks and must satisfy
/// `active_radius < load_radius < unload_radius`; the gap between load and
/// unload radius is the hysteresis band that keeps chunks resident near a
/// boundary.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamingConfig {
    /// World units per grid cell
    pub chunk_size: f32,
    /// Visual content radius
    pub load_radius: u32,
    /// Physics radius
    pub active_radius: u32,
    /// Residency radius
    pub unload_radius: u32,
    /// Cap on chunks simultaneously in `Loading`
    pub max_concurrent_loads: usize,
    /// Wall-clock ceiling for load-queue draining per tick
    pub frame_budget_ms: f32,
    /// Advisory memory total; reported, never enforced
    pub memory_budget_mb: f32,
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self::desktop()
    }
}

impl StreamingConfig {
    /// Preset for desktop / high-memory clients
    pub fn desktop() -> Self {
        Self {
            chunk_size: 200.0,
            load_radius: 3,
            active_radius: 1,
            unload_radius: 5,
            max_concurrent_loads: 4,
            frame_budget_ms: 8.0,
            memory_budget_mb: 512.0,
        }
    }

    /// Preset for mobile / low-memory clients
    pub fn mobile() -> Self {
        Self {
            chunk_size: 200.0,
            load_radius: 2,
            active_radius: 1,
            unload_radius: 3,
            max_concurrent_loads: 2,
            frame_budget_ms: 4.0,
            memory_budget_mb: 192.0,
        }
    }

    pub fn for_platform(platform: Platform) -> Self {
        match platform {
            Platform::Desktop => Self::desktop(),
            Platform::Mobile => Self::mobile(),
        }
    }

    /// Check option ranges and radius ordering
    pub fn validate(&self) -> Result<()> {
        if !(self.chunk_size.is_finite() && self.chunk_size > 0.0) {
            return Err(Error::Config(format!("chunk_size must be positive, got {}", self.chunk_size)));
        }
        if self.active_radius >= self.load_radius {
            return Err(Error::Config(format!(
                "active_radius ({}) must be less than load_radius ({})",
                self.active_radius, self.load_radius
            )));
        }
        if self.unload_radius <= self.load_radius {
            return Err(Error::Config(format!(
                "unload_radius ({}) must be greater than load_radius ({})",
                self.unload_radius, self.load_radius
            )));
        }
        if self.max_concurrent_loads == 0 {
            return Err(Error::Config("max_concurrent_loads must be at least 1".to_string()));
        }
        if !(self.frame_budget_ms.is_finite() && self.frame_budget_ms > 0.0) {
            return Err(Error::Config(format!("frame_budget_ms must be positive, got {}", self.frame_budget_ms)));
        }
        if !(self.memory_budget_mb.is_finite() && self.memory_budget_mb >= 0.0) {
            return Err(Error::Config(format!("memory_budget_mb must be non-negative, got {}", self.memory_budget_mb)));
        }
        Ok(())
    }

    /// Parse and validate from JSON text
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from file (sync)
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Save to file (sync)
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, json)?;
        Ok(())
    }
}
