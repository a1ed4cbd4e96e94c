use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use sectorfield_common::{EntityFactory, Placement};

/// Handle to an asteroid spawned in a [`World`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u64);

/// An event record produced by every mutation to the world.
///
/// The event log is the foundation for replay and determinism checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WorldEvent {
    /// Asteroid was spawned with the given placement.
    Spawned { id: EntityId, placement: Placement },
    /// Asteroid was destroyed. Carries the placement it had.
    Destroyed { id: EntityId, placement: Placement },
}

/// The host-side world holding every live asteroid.
///
/// Uses BTreeMap for deterministic iteration order. Because ids are
/// sequential, two worlds driven by the same sequence of operations end up
/// with identical contents and identical [`World::state_hash`] values.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct World {
    entities: BTreeMap<EntityId, Placement>,
    next_id: u64,
    /// Append-only event log of all mutations.
    #[serde(skip)]
    event_log: Vec<WorldEvent>,
}

impl World {
    /// Create an empty world.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live asteroids.
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Read-only access to the event log.
    pub fn events(&self) -> &[WorldEvent] {
        &self.event_log
    }

    /// Get the placement of a live asteroid.
    pub fn get(&self, id: EntityId) -> Option<&Placement> {
        self.entities.get(&id)
    }

    /// Total asteroids ever spawned.
    pub fn spawned_total(&self) -> u64 {
        self.next_id
    }

    /// Spawn an asteroid. Returns its id.
    pub fn spawn(&mut self, placement: Placement) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        self.entities.insert(id, placement);
        self.event_log.push(WorldEvent::Spawned { id, placement });
        id
    }

    /// Remove an asteroid. Returns its placement if it existed.
    pub fn despawn(&mut self, id: EntityId) -> Option<Placement> {
        let placement = self.entities.remove(&id);
        match placement {
            Some(placement) => self.event_log.push(WorldEvent::Destroyed { id, placement }),
            None => tracing::warn!(?id, "despawn of unknown entity"),
        }
        placement
    }

    /// Reconstruct world state from a sequence of events.
    pub fn replay(events: &[WorldEvent]) -> Self {
        let mut world = Self::new();
        for event in events {
            match event {
                WorldEvent::Spawned { id, placement } => {
                    world.next_id = world.next_id.max(id.0 + 1);
                    world.entities.insert(*id, *placement);
                }
                WorldEvent::Destroyed { id, .. } => {
                    world.entities.remove(id);
                }
            }
        }
        world
    }

    /// Compute a deterministic hash of the world state for comparison.
    /// Uses canonical (BTreeMap) iteration order.
    pub fn state_hash(&self) -> u64 {
        let mut h: u64 = 0xcbf2_9ce4_8422_2325; // FNV offset basis
        let mix = |h: &mut u64, bytes: &[u8]| {
            for &b in bytes {
                *h ^= b as u64;
                *h = h.wrapping_mul(0x0100_0000_01b3);
            }
        };
        for (id, p) in &self.entities {
            mix(&mut h, &id.0.to_le_bytes());
            mix(&mut h, &p.position.x.to_le_bytes());
            mix(&mut h, &p.position.y.to_le_bytes());
            mix(&mut h, &p.rotation.to_le_bytes());
            mix(&mut h, &p.scale.to_le_bytes());
        }
        h
    }
}

impl EntityFactory for World {
    type Handle = EntityId;

    fn spawn(&mut self, placement: &Placement) -> EntityId {
        World::spawn(self, *placement)
    }

    fn destroy(&mut self, handle: EntityId) {
        self.despawn(handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    fn at(x: f32, y: f32) -> Placement {
        Placement {
            position: Vec2::new(x, y),
            ..Placement::default()
        }
    }

    #[test]
    fn world_starts_empty() {
        let w = World::new();
        assert_eq!(w.entity_count(), 0);
        assert!(w.events().is_empty());
    }

    #[test]
    fn spawn_and_despawn() {
        let mut w = World::new();
        let id = w.spawn(at(1.0, 2.0));
        assert_eq!(w.entity_count(), 1);
        assert_eq!(w.get(id).unwrap().position, Vec2::new(1.0, 2.0));

        let p = w.despawn(id);
        assert!(p.is_some());
        assert_eq!(w.entity_count(), 0);
    }

    #[test]
    fn ids_are_sequential_and_not_reused() {
        let mut w = World::new();
        let a = w.spawn(Placement::default());
        let b = w.spawn(Placement::default());
        w.despawn(a);
        let c = w.spawn(Placement::default());
        assert_eq!((a.0, b.0, c.0), (0, 1, 2));
        assert_eq!(w.spawned_total(), 3);
    }

    #[test]
    fn despawn_unknown_is_harmless() {
        let mut w = World::new();
        assert!(w.despawn(EntityId(99)).is_none());
        assert!(w.events().is_empty());
    }

    #[test]
    fn factory_logs_spawn_and_destroy() {
        let mut w = World::new();
        let id = EntityFactory::spawn(&mut w, &at(3.0, 4.0));
        EntityFactory::destroy(&mut w, id);

        assert_eq!(
            w.events(),
            &[
                WorldEvent::Spawned { id, placement: at(3.0, 4.0) },
                WorldEvent::Destroyed { id, placement: at(3.0, 4.0) },
            ]
        );
        assert_eq!(w.entity_count(), 0);
    }

    #[test]
    fn replay_equivalence() {
        let mut world = World::new();
        let mut ids = Vec::new();
        for i in 0..20 {
            ids.push(world.spawn(at(i as f32 * 2.0, i as f32)));
        }
        for i in (1..20).step_by(5) {
            world.despawn(ids[i]);
        }

        let replayed = World::replay(world.events());
        assert_eq!(world.state_hash(), replayed.state_hash());
        assert_eq!(world.entity_count(), replayed.entity_count());
        assert_eq!(world.spawned_total(), replayed.spawned_total());
    }

    #[test]
    fn state_hash_tracks_contents() {
        let mut w1 = World::new();
        let mut w2 = World::new();
        w1.spawn(at(1.0, 1.0));
        w2.spawn(at(1.0, 1.0));
        assert_eq!(w1.state_hash(), w2.state_hash());

        w2.spawn(at(2.0, 2.0));
        assert_ne!(w1.state_hash(), w2.state_hash());
    }
}
