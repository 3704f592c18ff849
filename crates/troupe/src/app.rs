//! App builder, plugins and the frame loop.
//!
//! The [`App`] owns the world and three schedules. The host drives it by
//! feeding input into the world and calling [`App::update`] once per frame:
//!
//! ```text
//! update(frame_delta)
//!   ├─ startup schedule        (first update only)
//!   ├─ Time::advance
//!   ├─ fixed schedule × N      (N = whole fixed steps in the accumulator)
//!   ├─ frame schedule
//!   └─ clear just_pressed / just_released
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use troupe::prelude::*;
//!
//! let mut app = App::new()
//!     .add_plugins(DefaultPlugins)
//!     .add_plugins(PlacerPlugin::default());
//!
//! app.world.resource_mut::<Input<MouseButton>>().tap(MouseButton::Left);
//! app.update(Duration::from_millis(16));
//! ```

use std::time::Duration;

use crate::camera::Camera2d;
use crate::character::{RiseSettings, rise_system};
use crate::config::{ConfigError, PlacerConfig};
use crate::ecs::{Schedule, System, World};
use crate::input::{CursorPosition, Input, KeyCode, MouseButton};
use crate::placer::{CharacterPlacer, placer_startup_system, placer_system};
use crate::prefab::PrefabRegistry;
use crate::time::{FixedTime, Time};

/// A plugin can add resources and systems to the app.
pub trait Plugin {
    fn build(&self, app: &mut App);
}

/// The app builder. Configure it, then call [`update()`](App::update) once
/// per frame.
pub struct App {
    pub world: World,
    pub startup_systems: Schedule,
    pub systems: Schedule,
    pub fixed_systems: Schedule,
    started: bool,
}

impl App {
    /// Create a new app with an empty world and no systems.
    pub fn new() -> Self {
        Self {
            world: World::new(),
            startup_systems: Schedule::new(),
            systems: Schedule::new(),
            fixed_systems: Schedule::new(),
            started: false,
        }
    }

    /// Insert a resource into the world.
    pub fn insert_resource<T: 'static>(mut self, value: T) -> Self {
        self.world.insert_resource(value);
        self
    }

    /// Add a system that runs once, on the first update.
    pub fn add_startup_system<S: System + 'static>(mut self, system: S) -> Self {
        self.startup_systems.add_system(system);
        self
    }

    /// Add a system that runs every frame.
    pub fn add_system<S: System + 'static>(mut self, system: S) -> Self {
        self.systems.add_system(system);
        self
    }

    /// Add a system that runs once per fixed tick.
    pub fn add_fixed_system<S: System + 'static>(mut self, system: S) -> Self {
        self.fixed_systems.add_system(system);
        self
    }

    /// Apply a plugin.
    pub fn add_plugins<P: Plugin>(mut self, plugin: P) -> Self {
        plugin.build(&mut self);
        self
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Run one frame that took `frame_delta`.
    ///
    /// Without a [`FixedTime`] resource the fixed schedule never runs.
    pub fn update(&mut self, frame_delta: Duration) {
        if !self.started {
            self.started = true;
            log::info!(
                "Starting: {} startup, {} fixed, {} frame system(s)",
                self.startup_systems.len(),
                self.fixed_systems.len(),
                self.systems.len()
            );
            self.startup_systems.run(&mut self.world);
        }

        if let Some(time) = self.world.get_resource_mut::<Time>() {
            time.advance(frame_delta);
        }

        let ticks = self
            .world
            .get_resource_mut::<FixedTime>()
            .map_or(0, |fixed| fixed.accumulate(frame_delta));
        for _ in 0..ticks {
            self.fixed_systems.run(&mut self.world);
        }

        self.systems.run(&mut self.world);

        #[cfg(feature = "diagnostics")]
        crate::diag::log_frame(&mut self.world, &self.systems);

        if let Some(keys) = self.world.get_resource_mut::<Input<KeyCode>>() {
            keys.clear_just();
        }
        if let Some(buttons) = self.world.get_resource_mut::<Input<MouseButton>>() {
            buttons.clear_just();
        }
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

// ── Default Plugins ──────────────────────────────────────────────────────

/// Core resources: clocks, rise settings, input, cursor and camera.
pub struct DefaultPlugins;

impl Plugin for DefaultPlugins {
    fn build(&self, app: &mut App) {
        app.world.insert_resource(Time::new());
        app.world.insert_resource(FixedTime::default());
        app.world.insert_resource(RiseSettings::default());
        app.world.insert_resource(Input::<KeyCode>::new());
        app.world.insert_resource(Input::<MouseButton>::new());
        app.world.insert_resource(CursorPosition::default());
        app.world.insert_resource(Camera2d::default());
    }
}

// ── Placer Plugin ────────────────────────────────────────────────────────

/// Installs the character placer and the rise pass.
///
/// Config values override what [`DefaultPlugins`] inserted, so add this
/// plugin second.
#[derive(Debug, Clone)]
pub struct PlacerPlugin {
    config: PlacerConfig,
    registry: PrefabRegistry,
}

impl PlacerPlugin {
    /// Rejects configs that fail [`PlacerConfig::validate`].
    pub fn new(config: PlacerConfig, registry: PrefabRegistry) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config, registry })
    }

    /// Load the prefab file named by `config`, or use the built-in groups.
    pub fn from_config(config: PlacerConfig) -> Result<Self, ConfigError> {
        let registry = match &config.prefabs {
            Some(path) => PrefabRegistry::load(path)?,
            None => PrefabRegistry::builtin(),
        };
        Self::new(config, registry)
    }
}

impl Default for PlacerPlugin {
    fn default() -> Self {
        Self {
            config: PlacerConfig::default(),
            registry: PrefabRegistry::builtin(),
        }
    }
}

impl Plugin for PlacerPlugin {
    fn build(&self, app: &mut App) {
        let config = &self.config;
        app.world
            .insert_resource(FixedTime::from_secs(config.fixed_timestep_secs));
        app.world.insert_resource(RiseSettings {
            height: config.rise_height,
        });
        app.world.insert_resource(config.camera);
        app.world.insert_resource(config.bindings);
        app.world
            .insert_resource(CharacterPlacer::new(self.registry.clone()));

        app.startup_systems.add_system(placer_startup_system);
        app.systems.add_system(placer_system);
        app.fixed_systems.add_system(rise_system);
    }
}
