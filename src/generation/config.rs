//! Content generation configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::Error;
use crate::core::types::Result;
use crate::generation::district::DistrictMap;
use crate::generation::roads::RoadLayout;

/// Configuration for the content rule engine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// World seed mixed into every chunk seed.
    pub world_seed: u32,
    /// Road grid used for lane skipping and road segments.
    pub roads: RoadLayout,
    /// District layout used to pick each chunk's ruleset.
    pub districts: DistrictMap,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            world_seed: 12345,
            roads: RoadLayout::default(),
            districts: DistrictMap::city_default(),
        }
    }
}

impl GenerationConfig {
    /// Default city layout with a specific seed.
    pub fn with_seed(world_seed: u32) -> Self {
        Self {
            world_seed,
            ..Default::default()
        }
    }

    /// Reject road layouts the lane test cannot handle.
    pub fn validate(&self) -> Result<()> {
        let roads = &self.roads;
        for (name, period, width) in [
            ("avenue", roads.avenue_period, roads.avenue_width),
            ("street", roads.street_period, roads.street_width),
        ] {
            if !(period.is_finite() && period > 0.0) {
                return Err(Error::Config(format!("{name}_period must be positive, got {period}")));
            }
            if !(width.is_finite() && width >= 0.0 && width < period) {
                return Err(Error::Config(format!(
                    "{name}_width must be in [0, {name}_period), got {width}"
                )));
            }
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
