//! Single units and their rise.
//!
//! A spawned leaf doesn't run its own routine. It flips to
//! [`LeafState::Rising`] and [`rise_system`] moves every rising leaf once
//! per fixed tick:
//!
//! ```text
//! fixed tick ──► for each rising leaf (slot order):
//!                  y += move_speed × dt
//!                  if world y ≥ rise height → despawn now
//! ```
//!
//! A despawned leaf is gone before the next leaf in the same pass is
//! visited, so it never receives another update.

use crate::ecs::{Entity, World};
use crate::time::{DEFAULT_FIXED_STEP_SECS, FixedTime};

use super::{Character, CharacterError};

/// World-space Y at which a rising leaf is destroyed.
pub const DEFAULT_RISE_HEIGHT: f32 = 15.0;

/// Move speed used when none is configured, in world units per second.
pub const DEFAULT_MOVE_SPEED: f32 = 15.0;

/// Rise parameters shared by all leafs. Optional resource; without it
/// [`DEFAULT_RISE_HEIGHT`] applies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiseSettings {
    pub height: f32,
}

impl Default for RiseSettings {
    fn default() -> Self {
        Self {
            height: DEFAULT_RISE_HEIGHT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LeafState {
    /// Not placed yet (for example, part of a preview).
    #[default]
    Idle,
    Rising,
}

/// A terminal character with its own rise behavior.
#[derive(Debug, Clone, PartialEq)]
pub struct CharacterLeaf {
    move_speed: f32,
    state: LeafState,
}

impl CharacterLeaf {
    pub fn new(move_speed: f32) -> Self {
        Self {
            move_speed,
            state: LeafState::Idle,
        }
    }

    pub fn move_speed(&self) -> f32 {
        self.move_speed
    }

    pub fn state(&self) -> LeafState {
        self.state
    }

    pub fn is_rising(&self) -> bool {
        self.state == LeafState::Rising
    }
}

impl Default for CharacterLeaf {
    fn default() -> Self {
        Self::new(DEFAULT_MOVE_SPEED)
    }
}

fn rise_height(world: &World) -> f32 {
    world
        .get_resource::<RiseSettings>()
        .map_or(DEFAULT_RISE_HEIGHT, |s| s.height)
}

/// Begin rising. A leaf that is already at or above the rise height is
/// destroyed on the spot.
pub(super) fn start(world: &mut World, entity: Entity) -> Result<(), CharacterError> {
    let height = rise_height(world);
    let y = world
        .global_translation(entity)
        .ok_or(CharacterError::NotACharacter(entity))?
        .y;

    if y >= height {
        log::debug!("Leaf {entity} spawned above rise height ({y} >= {height}), despawning");
        world.despawn_recursive(entity);
        return Ok(());
    }

    let leaf = world
        .character_mut(entity)
        .and_then(Character::as_leaf_mut)
        .ok_or(CharacterError::NotACharacter(entity))?;
    leaf.state = LeafState::Rising;
    Ok(())
}

/// Advance every rising leaf by `dt` seconds. Returns the leafs that reached
/// the rise height and were despawned.
pub fn advance_rising(world: &mut World, dt: f32) -> Vec<Entity> {
    let height = rise_height(world);
    let mut finished = Vec::new();

    for entity in world.characters() {
        // Dead handles (despawned earlier in this pass) read as `None`.
        let Some(speed) = world
            .character(entity)
            .and_then(Character::as_leaf)
            .filter(|leaf| leaf.is_rising())
            .map(CharacterLeaf::move_speed)
        else {
            continue;
        };

        if let Some(transform) = world.transform_mut(entity) {
            transform.translation.y += speed * dt;
        }

        let reached = world
            .global_translation(entity)
            .is_some_and(|p| p.y >= height);
        if reached {
            log::debug!("Leaf {entity} reached rise height {height}");
            world.despawn_recursive(entity);
            finished.push(entity);
        }
    }

    finished
}

/// Fixed-tick system: advance all rising leafs by one fixed step.
pub fn rise_system(world: &mut World) {
    let dt = world
        .get_resource::<FixedTime>()
        .map_or(DEFAULT_FIXED_STEP_SECS, FixedTime::step_secs);
    advance_rising(world, dt);
}
