//! Convenience re-exports: `use troupe::prelude::*` for the common items.

pub use crate::app::{App, DefaultPlugins, PlacerPlugin, Plugin};
pub use crate::camera::Camera2d;
pub use crate::character::{
    Capability, Character, CharacterComposite, CharacterError, CharacterLeaf, CompositeBuilder,
    LeafState, RiseSettings, Variant, add_character, child_character, remove_character,
    spawn_character, start_rise,
};
pub use crate::config::{ConfigError, PlacerConfig};
pub use crate::ecs::{Entity, Schedule, System, World};
pub use crate::input::{CursorPosition, Input, KeyCode, MouseButton};
pub use crate::math::{Transform, Vec2, Vec3};
pub use crate::placer::{CharacterPlacer, GroupTag, PlacerBindings, PlacerCommands};
pub use crate::prefab::{Prefab, PrefabError, PrefabNode, PrefabRegistry};
pub use crate::time::{FixedTime, Time};
#[cfg(feature = "diagnostics")]
pub use crate::diag::EntityPoolStats;

pub use std::time::Duration;
