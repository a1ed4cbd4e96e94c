//! Streaming: deterministic asteroid sector generation around a moving player.
//!
//! # Invariants
//! - A sector's contents depend only on the world seed, its coordinate and
//!   the field configuration. Revisiting a sector regenerates it exactly.
//! - After every tick the active sectors are exactly the square neighbourhood
//!   of the current sector.
//! - Sectors are populated atomically: all of their asteroids or none.

mod controller;
mod sector;
mod seed;

pub use controller::{ShiftReport, StreamStats, StreamingController, TickOutcome};
pub use sector::{GeneratedSector, PlacedEntity, SCALE_RANGE, Sector, SectorIndex};
pub use seed::sector_seed;

pub fn crate_info() -> &'static str {
    "sectorfield-stream v0.1.0"
}
