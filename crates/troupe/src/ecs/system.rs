//! # System: Functions That Operate on the World
//!
//! A system is any `FnMut(&mut World)`. Systems run in the order they were
//! added; there is no parallelism and no dependency graph.
//!
//! The [`App`](crate::app::App) keeps three schedules: startup (once), fixed
//! (once per fixed tick, where leafs rise) and frame (once per update, where
//! the placer reads input).

use super::world::World;

/// A system that can be executed on a [`World`].
pub trait System {
    fn run(&mut self, world: &mut World);
}

impl<F: FnMut(&mut World)> System for F {
    fn run(&mut self, world: &mut World) {
        (self)(world);
    }
}

struct NamedSystem {
    #[cfg(feature = "diagnostics")]
    name: String,
    system: Box<dyn System>,
}

/// Per-system timing from the most recent run.
#[cfg(feature = "diagnostics")]
#[derive(Debug, Clone)]
pub struct SystemTiming {
    pub name: String,
    pub duration_us: f64,
}

/// An ordered list of systems.
pub struct Schedule {
    systems: Vec<NamedSystem>,
    #[cfg(feature = "diagnostics")]
    timings: Vec<SystemTiming>,
}

impl Schedule {
    pub fn new() -> Self {
        Self {
            systems: Vec::new(),
            #[cfg(feature = "diagnostics")]
            timings: Vec::new(),
        }
    }

    /// Add a system to the end of the schedule.
    pub fn add_system<S: System + 'static>(&mut self, system: S) {
        self.systems.push(NamedSystem {
            #[cfg(feature = "diagnostics")]
            name: short_system_name(std::any::type_name::<S>()),
            system: Box::new(system),
        });
    }

    /// Run all systems in order.
    pub fn run(&mut self, world: &mut World) {
        #[cfg(feature = "diagnostics")]
        self.timings.clear();

        for ns in &mut self.systems {
            #[cfg(feature = "diagnostics")]
            let start = std::time::Instant::now();

            ns.system.run(world);

            #[cfg(feature = "diagnostics")]
            self.timings.push(SystemTiming {
                name: ns.name.clone(),
                duration_us: start.elapsed().as_secs_f64() * 1_000_000.0,
            });
        }
    }

    pub fn len(&self) -> usize {
        self.systems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }

    /// Timings recorded by the last [`run`](Self::run).
    #[cfg(feature = "diagnostics")]
    pub fn timings(&self) -> &[SystemTiming] {
        &self.timings
    }
}

impl Default for Schedule {
    fn default() -> Self {
        Self::new()
    }
}

/// `troupe::placer::placer_system` → `placer_system`; closures → `<closure>`.
#[cfg(feature = "diagnostics")]
fn short_system_name(full: &str) -> String {
    let name = full.rsplit("::").next().unwrap_or(full);
    if name.contains("closure") {
        "<closure>".to_string()
    } else {
        name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Log(Vec<&'static str>);

    fn first(world: &mut World) {
        world.resource_mut::<Log>().0.push("first");
    }

    fn second(world: &mut World) {
        world.resource_mut::<Log>().0.push("second");
    }

    #[test]
    fn systems_run_in_insertion_order() {
        let mut world = World::new();
        world.insert_resource(Log(Vec::new()));

        let mut schedule = Schedule::new();
        schedule.add_system(first);
        schedule.add_system(second);
        schedule.run(&mut world);
        schedule.run(&mut world);

        assert_eq!(
            world.resource::<Log>().0,
            vec!["first", "second", "first", "second"]
        );
    }

    #[cfg(feature = "diagnostics")]
    #[test]
    fn timings_carry_short_system_names() {
        let mut world = World::new();
        world.insert_resource(Log(Vec::new()));
        let mut schedule = Schedule::new();
        schedule.add_system(first);
        schedule.add_system(|_world: &mut World| {});
        schedule.run(&mut world);

        let names: Vec<&str> = schedule.timings().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["first", "<closure>"]);
        assert_eq!(schedule.len(), 2);
    }
}
