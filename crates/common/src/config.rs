use std::path::Path;

use serde::{Deserialize, Serialize};

/// Largest supported half-extent. Keeps `(2h + 1)^2` comfortably inside `i32`
/// coordinate space and sane per-shift generation cost.
pub const MAX_HALF_EXTENT: u32 = 1024;

/// Errors raised while loading or validating a [`FieldConfig`].
///
/// All of these are fatal at startup; nothing is validated mid-run.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("sector_size must be a positive finite number, got {0}")]
    NonPositiveSectorSize(f32),
    #[error("active_half_extent {got} exceeds the maximum of {max}")]
    HalfExtentTooLarge { got: u32, max: u32 },
    #[error("shift_threshold must be a non-negative finite number, got {0}")]
    InvalidThreshold(f32),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Asteroid field configuration, fixed for the lifetime of a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    /// Edge length of a sector in world units.
    pub sector_size: f32,
    /// Asteroids generated per sector.
    pub asteroid_density: u32,
    /// Sectors kept active on each side of the player's sector, per axis.
    pub active_half_extent: u32,
    /// Base seed every sector seed is derived from.
    pub world_seed: u64,
    /// Squared world distance from the current sector centre that triggers a
    /// shift. `None` uses the total active sector count, see
    /// [`FieldConfig::shift_threshold`].
    pub shift_threshold: Option<f32>,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            sector_size: 1000.0,
            asteroid_density: 3,
            active_half_extent: 5,
            world_seed: 0,
            shift_threshold: None,
        }
    }
}

impl FieldConfig {
    /// Parse a configuration from YAML. Missing keys take their defaults.
    /// The result is validated.
    pub fn from_yaml_str(source: &str) -> Result<Self, ConfigError> {
        let config: FieldConfig = serde_yaml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a YAML configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&source)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.sector_size.is_finite() && self.sector_size > 0.0) {
            return Err(ConfigError::NonPositiveSectorSize(self.sector_size));
        }
        if self.active_half_extent > MAX_HALF_EXTENT {
            return Err(ConfigError::HalfExtentTooLarge {
                got: self.active_half_extent,
                max: MAX_HALF_EXTENT,
            });
        }
        if let Some(t) = self.shift_threshold {
            if !(t.is_finite() && t >= 0.0) {
                return Err(ConfigError::InvalidThreshold(t));
            }
        }
        Ok(())
    }

    /// Sectors per axis of the active region.
    pub fn sectors_per_axis(&self) -> u32 {
        2 * self.active_half_extent + 1
    }

    /// Number of sectors in the active region.
    pub fn total_sector_count(&self) -> u32 {
        self.sectors_per_axis() * self.sectors_per_axis()
    }

    /// Squared distance that triggers a region shift.
    ///
    /// Defaults to the total sector count read as a squared world distance.
    /// This is a cheap trigger, not a containment test.
    pub fn shift_threshold(&self) -> f32 {
        self.shift_threshold
            .unwrap_or(self.total_sector_count() as f32)
    }
}
