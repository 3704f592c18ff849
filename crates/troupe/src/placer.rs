//! # Character Placer: Aim, Select, Place
//!
//! The placer keeps one preview instance of the selected group glued to the
//! aim point. Placing spawns the preview and immediately builds the next one.
//!
//! ```text
//!              select(other group)
//!   ┌──────────┐ ───────────────► ┌──────────┐
//!   │ preview  │                  │ preview  │   old preview destroyed,
//!   │ (Small)  │ ◄─────────────── │ (Large)  │   new one instantiated
//!   └──────────┘  select(Small)   └──────────┘
//!        │  place
//!        ▼
//!   spawn_character(preview) → preview = None → forced select(current)
//! ```
//!
//! Each frame [`CharacterPlacer::step`] runs: selection triggers (Small,
//! Medium, Large in that order), then aim, then place.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::camera::Camera2d;
use crate::character::{CharacterError, spawn_character};
use crate::ecs::{Entity, World};
use crate::input::{CursorPosition, Input, KeyCode, MouseButton};
use crate::math::{Vec2, Vec3};
use crate::prefab::PrefabRegistry;

/// The three selectable groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GroupTag {
    #[default]
    Small,
    Medium,
    Large,
}

impl GroupTag {
    pub const ALL: [GroupTag; 3] = [GroupTag::Small, GroupTag::Medium, GroupTag::Large];

    /// Slot in the prefab registry.
    pub fn index(self) -> usize {
        match self {
            GroupTag::Small => 0,
            GroupTag::Medium => 1,
            GroupTag::Large => 2,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            GroupTag::Small => "Small Group",
            GroupTag::Medium => "Medium Group",
            GroupTag::Large => "Large Group",
        }
    }
}

impl fmt::Display for GroupTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Which inputs drive the placer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacerBindings {
    pub small: KeyCode,
    pub medium: KeyCode,
    pub large: KeyCode,
    pub place: MouseButton,
}

impl PlacerBindings {
    pub fn key_for(&self, tag: GroupTag) -> KeyCode {
        match tag {
            GroupTag::Small => self.small,
            GroupTag::Medium => self.medium,
            GroupTag::Large => self.large,
        }
    }
}

impl Default for PlacerBindings {
    fn default() -> Self {
        Self {
            small: KeyCode::KeyA,
            medium: KeyCode::KeyS,
            large: KeyCode::KeyD,
            place: MouseButton::Left,
        }
    }
}

/// One frame's worth of placer input.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlacerCommands {
    /// Selection triggers that fired this frame, in Small/Medium/Large order.
    pub select: Vec<GroupTag>,
    pub place: bool,
    pub aim: Vec2,
}

impl PlacerCommands {
    /// Commands that only move the aim point.
    pub fn aim_at(aim: Vec2) -> Self {
        Self {
            aim,
            ..Default::default()
        }
    }

    pub fn from_input(
        keys: &Input<KeyCode>,
        buttons: &Input<MouseButton>,
        bindings: &PlacerBindings,
        aim: Vec2,
    ) -> Self {
        Self {
            select: GroupTag::ALL
                .into_iter()
                .filter(|&tag| keys.just_pressed(bindings.key_for(tag)))
                .collect(),
            place: buttons.just_pressed(bindings.place),
            aim,
        }
    }
}

/// Owns the current selection and the single preview instance.
#[derive(Debug)]
pub struct CharacterPlacer {
    registry: PrefabRegistry,
    current: GroupTag,
    preview: Option<Entity>,
}

impl CharacterPlacer {
    pub fn new(registry: PrefabRegistry) -> Self {
        Self {
            registry,
            current: GroupTag::Small,
            preview: None,
        }
    }

    pub fn current_group(&self) -> GroupTag {
        self.current
    }

    pub fn preview(&self) -> Option<Entity> {
        self.preview
    }

    /// Select the small group and build its preview, even though it is
    /// already the current selection.
    pub fn init(&mut self, world: &mut World, aim: Vec2) {
        self.current = GroupTag::Small;
        self.change_group(world, GroupTag::Small, true, aim);
    }

    /// Run one frame: selection, aim, placement.
    pub fn step(&mut self, world: &mut World, commands: &PlacerCommands) -> Result<(), CharacterError> {
        for &tag in &commands.select {
            self.change_group(world, tag, false, commands.aim);
        }
        self.aim(world, commands.aim);
        if commands.place {
            self.place(world, commands.aim)?;
        }
        Ok(())
    }

    /// Switch to `tag` and rebuild the preview.
    ///
    /// Re-selecting the current group does nothing unless `force` is set. A
    /// group without a prefab leaves selection and preview untouched.
    /// Returns whether a new preview was created.
    pub fn change_group(&mut self, world: &mut World, tag: GroupTag, force: bool, aim: Vec2) -> bool {
        if !force && tag == self.current {
            return false;
        }

        let Some(prefab) = self.registry.get(tag) else {
            log::warn!("No prefab configured for {tag}, keeping {}", self.current);
            return false;
        };

        if let Some(old) = self.preview.take() {
            world.despawn_recursive(old);
        }
        let preview = prefab.instantiate(world, aim);
        log::info!("Previewing {tag} (\"{}\") as {preview}", prefab.name);

        self.preview = Some(preview);
        self.current = tag;
        true
    }

    /// Move the preview to the aim point.
    pub fn aim(&self, world: &mut World, aim: Vec2) {
        if let Some(preview) = self.preview {
            let z = world.global_translation(preview).map_or(0.0, |p| p.z);
            world.set_global_translation(preview, Vec3::new(aim.x, aim.y, z));
        }
    }

    /// Spawn the preview and start a fresh one of the same group.
    ///
    /// The next preview is built even when spawning fails; the failed
    /// preview is destroyed. Returns the entity that was placed, if there
    /// was a preview.
    pub fn place(&mut self, world: &mut World, aim: Vec2) -> Result<Option<Entity>, CharacterError> {
        let placed = self.preview.take();
        let spawned = match placed {
            Some(preview) => {
                log::info!("Placing {} at ({:.2}, {:.2})", self.current, aim.x, aim.y);
                let spawned = spawn_character(world, preview);
                if spawned.is_err() {
                    world.despawn_recursive(preview);
                }
                spawned
            }
            None => {
                log::warn!("Place requested with no {} preview", self.current);
                Ok(())
            }
        };
        self.change_group(world, self.current, true, aim);
        spawned.map(|()| placed)
    }
}

// ── Systems ──────────────────────────────────────────────────────────────

/// World-space aim point from the cursor and the active camera.
pub fn aim_point(world: &World) -> Vec2 {
    let cursor = world.get_resource::<CursorPosition>().copied().unwrap_or_default();
    world
        .get_resource::<Camera2d>()
        .copied()
        .unwrap_or_default()
        .viewport_to_world(cursor)
}

/// Startup system: build the initial preview.
pub fn placer_startup_system(world: &mut World) {
    let aim = aim_point(world);
    let Some(mut placer) = world.resource_remove::<CharacterPlacer>() else {
        log::warn!("placer_startup_system ran without a CharacterPlacer resource");
        return;
    };
    placer.init(world, aim);
    world.insert_resource(placer);
}

/// Frame system: read input and run one placer step.
///
/// # Panics
///
/// Panics on a fatal [`CharacterError`]: a placed prefab that breaks the
/// character contract is a wiring bug.
pub fn placer_system(world: &mut World) {
    let aim = aim_point(world);
    let bindings = world
        .get_resource::<PlacerBindings>()
        .copied()
        .unwrap_or_default();
    let commands = PlacerCommands::from_input(
        world.resource::<Input<KeyCode>>(),
        world.resource::<Input<MouseButton>>(),
        &bindings,
        aim,
    );

    let Some(mut placer) = world.resource_remove::<CharacterPlacer>() else {
        return;
    };
    let result = placer.step(world, &commands);
    world.insert_resource(placer);

    match result {
        Err(e) if e.is_fatal() => panic!("Character placement failed: {e}"),
        Err(e) => log::error!("Character placement failed: {e}"),
        Ok(()) => {}
    }
}
