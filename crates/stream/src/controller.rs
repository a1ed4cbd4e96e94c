use std::collections::BTreeSet;
use std::time::{Duration, Instant};

use glam::Vec2;
use sectorfield_common::{ConfigError, EntityFactory, FieldConfig, Presentation, SectorCoord};

use crate::sector::SectorIndex;

/// What a single tick did.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// The player is still near the current sector; nothing changed.
    Stable,
    /// The active region moved.
    Shifted(ShiftReport),
}

/// Coordinates touched by a region shift.
#[derive(Debug, Clone, PartialEq)]
pub struct ShiftReport {
    pub from: SectorCoord,
    pub to: SectorCoord,
    /// Released sectors, in row-major order.
    pub released: Vec<SectorCoord>,
    /// Generated sectors, in row-major order.
    pub generated: Vec<SectorCoord>,
}

/// Per-tick streaming statistics for instrumentation.
#[derive(Debug, Clone, Default)]
pub struct StreamStats {
    pub sectors_generated_this_tick: usize,
    pub sectors_released_this_tick: usize,
    pub total_active_sectors: usize,
    pub total_entities: usize,
    pub tick_time: Duration,
}

/// Keeps the square of sectors around the player populated.
///
/// Owns the [`SectorIndex`] and the host collaborators. Driven by the host
/// calling [`StreamingController::tick`] once per frame.
pub struct StreamingController<F: EntityFactory, P: Presentation = ()> {
    config: FieldConfig,
    threshold: f32,
    current: SectorCoord,
    index: SectorIndex<F::Handle>,
    factory: F,
    presentation: P,
    stats: StreamStats,
}

impl<F: EntityFactory, P: Presentation> StreamingController<F, P> {
    /// Validate `config` and populate the region around the origin sector.
    pub fn new(config: FieldConfig, factory: F, presentation: P) -> Result<Self, ConfigError> {
        Self::starting_at(config, SectorCoord::ORIGIN, factory, presentation)
    }

    /// Validate `config` and populate the region around `origin`, clamped so
    /// the region fits the coordinate grid.
    pub fn starting_at(
        config: FieldConfig,
        origin: SectorCoord,
        factory: F,
        presentation: P,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let origin = origin.clamp_for_extent(config.active_half_extent);
        let mut controller = Self {
            threshold: config.shift_threshold(),
            index: SectorIndex::new(&config),
            config,
            current: origin,
            factory,
            presentation,
            stats: StreamStats::default(),
        };

        let start = Instant::now();
        let generated = controller
            .current
            .neighborhood(controller.config.active_half_extent)
            .into_iter()
            .filter(|c| controller.index.materialize(*c, &mut controller.factory))
            .count();
        let center = controller.current.world_center(controller.config.sector_size);
        controller.presentation.recenter(controller.current, center);
        controller.record_stats(generated, 0, start);

        tracing::info!(
            origin = %controller.current,
            sectors = controller.index.len(),
            entities = controller.index.entity_count(),
            "sector field initialized"
        );
        Ok(controller)
    }

    /// Advance one frame with the player at `player_position`.
    pub fn tick(&mut self, player_position: Vec2) -> TickOutcome {
        let _span = tracing::info_span!("sector_stream_tick").entered();
        let start = Instant::now();

        let center = self.current.world_center(self.config.sector_size);
        if player_position.distance_squared(center) <= self.threshold {
            self.record_stats(0, 0, start);
            return TickOutcome::Stable;
        }

        let offset = ((player_position - center) / self.config.sector_size).floor();
        // Float-to-int casts saturate and map NaN to zero; the region is then
        // kept inside the i32 grid.
        let (dx, dy) = (offset.x as i64, offset.y as i64);
        let target = self
            .current
            .offset(dx, dy)
            .clamp_for_extent(self.config.active_half_extent);
        if target == self.current {
            tracing::trace!(?player_position, "threshold crossed without leaving sector");
            self.record_stats(0, 0, start);
            return TickOutcome::Stable;
        }

        let report = self.shift_to(target);
        self.record_stats(report.generated.len(), report.released.len(), start);

        tracing::trace!(
            generated = report.generated.len(),
            released = report.released.len(),
            total = self.index.len(),
            "stream shift complete"
        );
        TickOutcome::Shifted(report)
    }

    /// Move the active region to be centred on `target` and apply the diff.
    fn shift_to(&mut self, target: SectorCoord) -> ShiftReport {
        let from = self.current;
        let desired = target.neighborhood(self.config.active_half_extent);
        let desired_set: BTreeSet<SectorCoord> = desired.iter().copied().collect();

        let released: Vec<SectorCoord> = self
            .index
            .active_coords()
            .into_iter()
            .filter(|c| !desired_set.contains(c))
            .collect();
        for c in &released {
            self.index.release(*c, &mut self.factory);
        }

        let generated: Vec<SectorCoord> = desired
            .into_iter()
            .filter(|c| self.index.materialize(*c, &mut self.factory))
            .collect();

        self.current = target;
        let center = target.world_center(self.config.sector_size);
        self.presentation.recenter(target, center);
        tracing::debug!(%from, to = %target, "active region shifted");

        ShiftReport {
            from,
            to: target,
            released,
            generated,
        }
    }

    fn record_stats(&mut self, generated: usize, released: usize, start: Instant) {
        self.stats = StreamStats {
            sectors_generated_this_tick: generated,
            sectors_released_this_tick: released,
            total_active_sectors: self.index.len(),
            total_entities: self.index.entity_count(),
            tick_time: start.elapsed(),
        };
    }

    /// Sector the active region is centred on.
    pub fn current_sector(&self) -> SectorCoord {
        self.current
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    /// Squared distance that triggers a shift.
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn index(&self) -> &SectorIndex<F::Handle> {
        &self.index
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    pub fn presentation(&self) -> &P {
        &self.presentation
    }

    /// Statistics from the last tick (or from construction).
    pub fn stats(&self) -> &StreamStats {
        &self.stats
    }

    /// End the session: release every sector and hand the collaborators back.
    pub fn shutdown(mut self) -> (F, P) {
        let released = self.index.release_all(&mut self.factory);
        tracing::info!(released, "sector field shut down");
        (self.factory, self.presentation)
    }

    /// Hand the collaborators back without releasing anything; the host keeps
    /// every asteroid of the active region.
    pub fn into_parts(self) -> (F, P) {
        (self.factory, self.presentation)
    }
}
