//! Logging setup and per-frame diagnostics.
//!
//! [`init_logger`] installs `env_logger` with `info` as the floor, so
//! placement and selection messages show up without `RUST_LOG`. With the
//! `diagnostics` feature the [`App`](crate::app::App) also logs entity pool
//! counters and system timings at `debug` level once per frame.

#[cfg(feature = "diagnostics")]
use crate::ecs::{Schedule, World};

/// Initialize logging. Honors `RUST_LOG`; defaults to `info`.
///
/// Safe to call more than once: later calls only print a warning.
pub fn init_logger() {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(log::LevelFilter::Info).parse_default_env();

    if builder.try_init().is_err() {
        eprintln!("[troupe] Warning: a logger is already set.");
    }
}

/// Entity pool counters, reset each time they are read.
#[cfg(feature = "diagnostics")]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EntityPoolStats {
    pub total_slots: usize,
    pub free_count: usize,
    pub alive_count: usize,
    pub spawned_this_frame: u32,
    pub despawned_this_frame: u32,
}

/// Take this frame's entity counters.
#[cfg(feature = "diagnostics")]
pub fn entity_stats(world: &mut World) -> EntityPoolStats {
    world.diagnostics_entity_stats()
}

/// Log entity churn and the slowest system of `schedule`.
#[cfg(feature = "diagnostics")]
pub fn log_frame(world: &mut World, schedule: &Schedule) {
    let stats = entity_stats(world);
    if stats.spawned_this_frame > 0 || stats.despawned_this_frame > 0 {
        log::debug!(
            "entities: {} alive, {} free of {} slots (+{} / -{})",
            stats.alive_count,
            stats.free_count,
            stats.total_slots,
            stats.spawned_this_frame,
            stats.despawned_this_frame
        );
    }

    let slowest = schedule
        .timings()
        .iter()
        .max_by(|a, b| a.duration_us.total_cmp(&b.duration_us));
    if let Some(timing) = slowest {
        log::trace!("slowest system: {} ({:.1}us)", timing.name, timing.duration_us);
    }
}
