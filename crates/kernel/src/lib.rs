//! Headless host: an in-memory world that spawns and destroys asteroids on
//! behalf of the sector streamer and records every mutation.
//!
//! # Invariants
//! - Entity ids are allocated sequentially and never reused.
//! - All state mutations flow through explicit operations and are logged.

pub mod world;

pub use world::{EntityId, World, WorldEvent};
