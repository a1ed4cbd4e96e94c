use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Integer coordinate of a sector in the world grid.
///
/// Ordering is x first, then y, so sorted collections iterate sectors
/// row-major.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct SectorCoord {
    pub x: i32,
    pub y: i32,
}

impl SectorCoord {
    pub const ORIGIN: SectorCoord = SectorCoord { x: 0, y: 0 };

    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// World-space centre of this sector for the given sector edge length.
    pub fn world_center(self, sector_size: f32) -> Vec2 {
        Vec2::new(self.x as f32, self.y as f32) * sector_size
    }

    /// Coordinate shifted by a whole number of sectors on each axis.
    /// Saturates at the edge of the `i32` grid.
    pub fn offset(self, dx: i64, dy: i64) -> Self {
        let shift = |v: i32, d: i64| {
            (v as i64)
                .saturating_add(d)
                .clamp(i32::MIN as i64, i32::MAX as i64) as i32
        };
        Self::new(shift(self.x, dx), shift(self.y, dy))
    }

    /// Clamp each axis so that a square of `half_extent` around the result
    /// still fits inside the `i32` grid.
    pub fn clamp_for_extent(self, half_extent: u32) -> Self {
        let limit = i32::MAX - half_extent.min(i32::MAX as u32) as i32;
        Self::new(self.x.clamp(-limit, limit), self.y.clamp(-limit, limit))
    }

    /// All coordinates within a square of `half_extent` sectors around `self`,
    /// row-major over x then y. Always `(2 * half_extent + 1)^2` entries.
    pub fn neighborhood(self, half_extent: u32) -> Vec<SectorCoord> {
        let r = half_extent as i64;
        let side = 2 * half_extent as usize + 1;
        let mut result = Vec::with_capacity(side * side);
        for dx in -r..=r {
            for dy in -r..=r {
                result.push(self.offset(dx, dy));
            }
        }
        result
    }
}

impl std::fmt::Display for SectorCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Where and how a single asteroid sits in the world.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub position: Vec2,
    /// Radians, in `[-PI, PI]`.
    pub rotation: f32,
    /// Uniform scale multiplier.
    pub scale: f32,
}

impl Default for Placement {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            rotation: 0.0,
            scale: 1.0,
        }
    }
}
