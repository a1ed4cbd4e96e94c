//! Shared types for sectorfield: sector coordinates, placements, host
//! capabilities and field configuration.

pub mod config;
pub mod host;
pub mod types;

pub use config::{ConfigError, FieldConfig, MAX_HALF_EXTENT};
pub use host::{EntityFactory, Presentation};
pub use types::{Placement, SectorCoord};
