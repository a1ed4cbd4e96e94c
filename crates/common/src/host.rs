//! Capabilities the host runtime lends to the sector streamer.

use glam::Vec2;

use crate::types::{Placement, SectorCoord};

/// Creates and destroys the objects that represent asteroids in the host.
///
/// Both operations are assumed to succeed; failures are the host's concern.
pub trait EntityFactory {
    /// Opaque handle to a spawned object. Owned by the sector that spawned it.
    type Handle;

    fn spawn(&mut self, placement: &Placement) -> Self::Handle;

    fn destroy(&mut self, handle: Self::Handle);
}

/// Receives the new active-region centre after a shift, so overlays that
/// follow the grid can reposition without redrawing unchanged content.
pub trait Presentation {
    fn recenter(&mut self, sector: SectorCoord, world_center: Vec2);
}

impl Presentation for () {
    fn recenter(&mut self, _sector: SectorCoord, _world_center: Vec2) {}
}

impl<F: EntityFactory + ?Sized> EntityFactory for &mut F {
    type Handle = F::Handle;

    fn spawn(&mut self, placement: &Placement) -> Self::Handle {
        (**self).spawn(placement)
    }

    fn destroy(&mut self, handle: Self::Handle) {
        (**self).destroy(handle)
    }
}

impl<P: Presentation + ?Sized> Presentation for &mut P {
    fn recenter(&mut self, sector: SectorCoord, world_center: Vec2) {
        (**self).recenter(sector, world_center)
    }
}
