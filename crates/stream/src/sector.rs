use std::collections::BTreeMap;
use std::f32::consts::PI;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sectorfield_common::{EntityFactory, FieldConfig, Placement, SectorCoord};

use crate::seed::sector_seed;

/// Smallest and largest scale multiplier an asteroid can be generated with.
pub const SCALE_RANGE: (f32, f32) = (0.2, 1.0);

/// Contents of a sector as produced by generation, before anything is spawned.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedSector {
    pub coord: SectorCoord,
    pub seed: u64,
    pub placements: Vec<Placement>,
}

/// An asteroid spawned in the host, owned by its sector.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedEntity<H> {
    pub placement: Placement,
    pub handle: H,
}

/// An active sector and every asteroid it spawned.
#[derive(Debug)]
pub struct Sector<H> {
    coord: SectorCoord,
    seed: u64,
    entities: Vec<PlacedEntity<H>>,
}

impl<H> Sector<H> {
    pub fn coord(&self) -> SectorCoord {
        self.coord
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn entities(&self) -> &[PlacedEntity<H>] {
        &self.entities
    }

    pub fn placements(&self) -> impl Iterator<Item = &Placement> {
        self.entities.iter().map(|e| &e.placement)
    }
}

/// Seeds, generates and owns the active sectors.
///
/// Generation is a pure function of the configuration and the coordinate, so
/// a sector released and later materialized again comes back identical.
pub struct SectorIndex<H> {
    sector_size: f32,
    asteroid_density: u32,
    world_seed: u64,
    sectors: BTreeMap<SectorCoord, Sector<H>>,
}

impl<H> SectorIndex<H> {
    /// Create an empty index. `config` is expected to be validated.
    pub fn new(config: &FieldConfig) -> Self {
        Self {
            sector_size: config.sector_size,
            asteroid_density: config.asteroid_density,
            world_seed: config.world_seed,
            sectors: BTreeMap::new(),
        }
    }

    pub fn sector_size(&self) -> f32 {
        self.sector_size
    }

    /// Deterministic seed of the sector at `coord`.
    pub fn seed_for(&self, coord: SectorCoord) -> u64 {
        sector_seed(self.world_seed, coord)
    }

    /// Generate the contents of a sector without spawning anything.
    ///
    /// Draw order per asteroid is x, y, rotation, scale. Changing it changes
    /// every world ever generated.
    pub fn generate(&self, coord: SectorCoord) -> GeneratedSector {
        let seed = self.seed_for(coord);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let center = coord.world_center(self.sector_size);
        let half = self.sector_size / 2.0;

        // Positions are not clamped: an asteroid near the edge may overlap the
        // neighbouring sector.
        let placements = (0..self.asteroid_density)
            .map(|_| {
                let x = rng.gen_range(-half..=half);
                let y = rng.gen_range(-half..=half);
                let rotation = rng.gen_range(-PI..=PI);
                let scale = rng.gen_range(SCALE_RANGE.0..=SCALE_RANGE.1);
                Placement {
                    position: center + Vec2::new(x, y),
                    rotation,
                    scale,
                }
            })
            .collect();

        GeneratedSector {
            coord,
            seed,
            placements,
        }
    }

    /// Generate the sector at `coord` and spawn all of its asteroids.
    ///
    /// Returns `false` without touching the host if the sector is already
    /// active.
    pub fn materialize<F>(&mut self, coord: SectorCoord, factory: &mut F) -> bool
    where
        F: EntityFactory<Handle = H>,
    {
        if self.sectors.contains_key(&coord) {
            return false;
        }
        let generated = self.generate(coord);
        let entities = generated
            .placements
            .into_iter()
            .map(|placement| PlacedEntity {
                handle: factory.spawn(&placement),
                placement,
            })
            .collect::<Vec<_>>();
        tracing::debug!(%coord, seed = generated.seed, count = entities.len(), "sector generated");
        self.sectors.insert(
            coord,
            Sector {
                coord,
                seed: generated.seed,
                entities,
            },
        );
        true
    }

    /// Destroy the sector at `coord` and every asteroid it owns.
    ///
    /// Returns `false` and does nothing if the sector is not active.
    pub fn release<F>(&mut self, coord: SectorCoord, factory: &mut F) -> bool
    where
        F: EntityFactory<Handle = H>,
    {
        let Some(sector) = self.sectors.remove(&coord) else {
            return false;
        };
        let count = sector.entities.len();
        for entity in sector.entities {
            factory.destroy(entity.handle);
        }
        tracing::debug!(%coord, count, "sector released");
        true
    }

    /// Release every active sector. Returns how many were released.
    pub fn release_all<F>(&mut self, factory: &mut F) -> usize
    where
        F: EntityFactory<Handle = H>,
    {
        let coords = self.active_coords();
        for coord in &coords {
            self.release(*coord, factory);
        }
        coords.len()
    }

    pub fn is_active(&self, coord: SectorCoord) -> bool {
        self.sectors.contains_key(&coord)
    }

    /// Active coordinates in row-major order.
    pub fn active_coords(&self) -> Vec<SectorCoord> {
        self.sectors.keys().copied().collect()
    }

    pub fn sector(&self, coord: SectorCoord) -> Option<&Sector<H>> {
        self.sectors.get(&coord)
    }

    pub fn sectors(&self) -> impl Iterator<Item = &Sector<H>> {
        self.sectors.values()
    }

    /// Number of active sectors.
    pub fn len(&self) -> usize {
        self.sectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sectors.is_empty()
    }

    /// Number of live asteroids across all active sectors.
    pub fn entity_count(&self) -> usize {
        self.sectors.values().map(|s| s.entities.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sectorfield_kernel::{EntityId, World};

    fn config(density: u32) -> FieldConfig {
        FieldConfig {
            sector_size: 100.0,
            asteroid_density: density,
            active_half_extent: 1,
            world_seed: 42,
            shift_threshold: None,
        }
    }

    #[test]
    fn generate_respects_density_and_bounds() {
        let index: SectorIndex<EntityId> = SectorIndex::new(&config(50));
        for coord in [SectorCoord::ORIGIN, SectorCoord::new(-3, 7), SectorCoord::new(1000, -1000)] {
            let sector = index.generate(coord);
            assert_eq!(sector.placements.len(), 50);
            let center = coord.world_center(100.0);
            for p in &sector.placements {
                assert!(p.position.x >= center.x - 50.0 && p.position.x <= center.x + 50.0);
                assert!(p.position.y >= center.y - 50.0 && p.position.y <= center.y + 50.0);
                assert!((-PI..=PI).contains(&p.rotation));
                assert!((0.2..=1.0).contains(&p.scale));
            }
        }
    }

    #[test]
    fn generate_is_deterministic() {
        let a: SectorIndex<EntityId> = SectorIndex::new(&config(3));
        let b: SectorIndex<EntityId> = SectorIndex::new(&config(3));
        let c = SectorCoord::new(4, -2);
        assert_eq!(a.generate(c), b.generate(c));
        assert_eq!(a.generate(c).seed, a.seed_for(c));
    }

    #[test]
    fn different_sectors_differ() {
        let index: SectorIndex<EntityId> = SectorIndex::new(&config(3));
        let a = index.generate(SectorCoord::new(0, 0));
        let b = index.generate(SectorCoord::new(1, 0));
        let offset = Vec2::new(100.0, 0.0);
        let shifted: Vec<Vec2> = a.placements.iter().map(|p| p.position + offset).collect();
        let other: Vec<Vec2> = b.placements.iter().map(|p| p.position).collect();
        assert_ne!(shifted, other);
    }

    #[test]
    fn zero_density_generates_nothing() {
        let mut index = SectorIndex::new(&config(0));
        let mut world = World::new();
        assert!(index.generate(SectorCoord::ORIGIN).placements.is_empty());
        assert!(index.materialize(SectorCoord::ORIGIN, &mut world));
        assert!(index.is_active(SectorCoord::ORIGIN));
        assert_eq!(world.entity_count(), 0);
    }

    #[test]
    fn materialize_spawns_every_placement() {
        let mut index = SectorIndex::new(&config(3));
        let mut world = World::new();
        let coord = SectorCoord::new(2, 1);

        assert!(index.materialize(coord, &mut world));
        assert_eq!(world.entity_count(), 3);
        assert_eq!(index.entity_count(), 3);

        let sector = index.sector(coord).unwrap();
        assert_eq!(sector.coord(), coord);
        assert_eq!(sector.seed(), index.seed_for(coord));
        for e in sector.entities() {
            assert_eq!(world.get(e.handle), Some(&e.placement));
        }
    }

    #[test]
    fn materialize_twice_is_noop() {
        let mut index = SectorIndex::new(&config(3));
        let mut world = World::new();
        assert!(index.materialize(SectorCoord::ORIGIN, &mut world));
        assert!(!index.materialize(SectorCoord::ORIGIN, &mut world));
        assert_eq!(world.entity_count(), 3);
    }

    #[test]
    fn release_destroys_owned_entities() {
        let mut index = SectorIndex::new(&config(3));
        let mut world = World::new();
        index.materialize(SectorCoord::ORIGIN, &mut world);
        index.materialize(SectorCoord::new(1, 0), &mut world);

        assert!(index.release(SectorCoord::ORIGIN, &mut world));
        assert!(!index.is_active(SectorCoord::ORIGIN));
        assert_eq!(world.entity_count(), 3);
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn release_inactive_is_noop() {
        let mut index = SectorIndex::new(&config(3));
        let mut world = World::new();
        index.materialize(SectorCoord::ORIGIN, &mut world);
        let events = world.events().len();

        assert!(!index.release(SectorCoord::new(9, 9), &mut world));
        assert_eq!(world.entity_count(), 3);
        assert_eq!(world.events().len(), events);
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn regenerated_sector_is_identical() {
        let mut index = SectorIndex::new(&config(3));
        let mut world = World::new();
        let coord = SectorCoord::new(-5, 3);

        index.materialize(coord, &mut world);
        let before: Vec<Placement> = index.sector(coord).unwrap().placements().copied().collect();
        index.release(coord, &mut world);
        index.materialize(coord, &mut world);
        let after: Vec<Placement> = index.sector(coord).unwrap().placements().copied().collect();

        assert_eq!(before, after);
    }

    #[test]
    fn release_all_empties_index_and_host() {
        let mut index = SectorIndex::new(&config(2));
        let mut world = World::new();
        for c in SectorCoord::ORIGIN.neighborhood(1) {
            index.materialize(c, &mut world);
        }
        assert_eq!(world.entity_count(), 18);

        assert_eq!(index.release_all(&mut world), 9);
        assert!(index.is_empty());
        assert_eq!(world.entity_count(), 0);
    }

    #[test]
    fn active_coords_are_row_major() {
        let mut index = SectorIndex::new(&config(1));
        let mut world = World::new();
        let mut coords = SectorCoord::new(3, -3).neighborhood(1);
        coords.reverse();
        for c in &coords {
            index.materialize(*c, &mut world);
        }
        assert_eq!(index.active_coords(), SectorCoord::new(3, -3).neighborhood(1));
    }
}
