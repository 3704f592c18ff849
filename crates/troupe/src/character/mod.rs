//! # Placeable Characters
//!
//! A character is either a single unit ([`CharacterLeaf`]) or an ordered
//! group of characters ([`CharacterComposite`]). Groups nest freely, so a
//! "large group" can be a composite of composites of leafs.
//!
//! ```text
//!            Composite (large group)
//!           ╱          ╲
//!   Composite          Leaf
//!   ╱      ╲
//! Leaf    Leaf
//! ```
//!
//! ## Capabilities
//!
//! | operation              | Leaf | Composite |
//! |------------------------|------|-----------|
//! | [`spawn_character`]    | yes  | yes       |
//! | [`start_rise`]         | yes  | no        |
//! | [`child_character`]    | no   | yes       |
//! | [`add_character`]      | no   | yes       |
//! | [`remove_character`]   | no   | yes       |
//!
//! Calling an operation a variant doesn't support returns
//! [`CharacterError::Unsupported`]. That is a wiring bug, not a runtime
//! condition: the placer treats it as fatal. Check
//! [`Character::supports`] first when the variant isn't known.

mod composite;
mod leaf;

use std::collections::HashSet;
use std::fmt;

pub use composite::{CharacterComposite, CompositeBuilder};
pub use leaf::{
    CharacterLeaf, DEFAULT_MOVE_SPEED, DEFAULT_RISE_HEIGHT, LeafState, RiseSettings, advance_rising,
    rise_system,
};

use crate::ecs::{Entity, World};

/// A placeable entity: one unit or a group of them.
#[derive(Debug, Clone, PartialEq)]
pub enum Character {
    Leaf(CharacterLeaf),
    Composite(CharacterComposite),
}

/// Which variant a [`Character`] is, without its data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    Leaf,
    Composite,
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variant::Leaf => f.write_str("CharacterLeaf"),
            Variant::Composite => f.write_str("CharacterComposite"),
        }
    }
}

/// Capability sets: leafs are `{Spawn}`, composites are `{Spawn, Compose}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Can be placed and start its active behavior.
    Spawn,
    /// Owns child characters.
    Compose,
}

/// The character operations, for error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Spawn,
    Rise,
    ChildCharacter,
    AddCharacter,
    RemoveCharacter,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Spawn => "spawn_character",
            Operation::Rise => "start_rise",
            Operation::ChildCharacter => "child_character",
            Operation::AddCharacter => "add_character",
            Operation::RemoveCharacter => "remove_character",
        };
        f.write_str(name)
    }
}

// ── Errors ──────────────────────────────────────────────────────────────

/// Errors from character operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CharacterError {
    /// The operation isn't part of this variant's capability set.
    Unsupported { operation: Operation, variant: Variant },
    /// The entity is dead or carries no character.
    NotACharacter(Entity),
    /// Adding `child` would make `composite` contain itself.
    Cycle { composite: Entity, child: Entity },
}

impl CharacterError {
    /// Misuse of the character contract. Not meant to be recovered from.
    pub fn is_fatal(&self) -> bool {
        matches!(self, CharacterError::Unsupported { .. })
    }
}

impl fmt::Display for CharacterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CharacterError::Unsupported { operation, variant } => {
                write!(f, "{operation}() is not supported for {variant}")
            }
            CharacterError::NotACharacter(entity) => {
                write!(f, "entity {entity} is not a live character")
            }
            CharacterError::Cycle { composite, child } => {
                write!(f, "adding {child} to {composite} would make the group contain itself")
            }
        }
    }
}

impl std::error::Error for CharacterError {}

// ── Character ───────────────────────────────────────────────────────────

impl Character {
    pub fn variant(&self) -> Variant {
        match self {
            Character::Leaf(_) => Variant::Leaf,
            Character::Composite(_) => Variant::Composite,
        }
    }

    pub fn supports(&self, capability: Capability) -> bool {
        match capability {
            Capability::Spawn => true,
            Capability::Compose => matches!(self, Character::Composite(_)),
        }
    }

    pub fn as_leaf(&self) -> Option<&CharacterLeaf> {
        match self {
            Character::Leaf(leaf) => Some(leaf),
            Character::Composite(_) => None,
        }
    }

    pub fn as_composite(&self) -> Option<&CharacterComposite> {
        match self {
            Character::Composite(composite) => Some(composite),
            Character::Leaf(_) => None,
        }
    }

    pub(crate) fn as_leaf_mut(&mut self) -> Option<&mut CharacterLeaf> {
        match self {
            Character::Leaf(leaf) => Some(leaf),
            Character::Composite(_) => None,
        }
    }

    pub(crate) fn as_composite_mut(&mut self) -> Option<&mut CharacterComposite> {
        match self {
            Character::Composite(composite) => Some(composite),
            Character::Leaf(_) => None,
        }
    }
}

impl From<CharacterLeaf> for Character {
    fn from(leaf: CharacterLeaf) -> Self {
        Character::Leaf(leaf)
    }
}

impl From<CharacterComposite> for Character {
    fn from(composite: CharacterComposite) -> Self {
        Character::Composite(composite)
    }
}

// ── Operations ──────────────────────────────────────────────────────────

fn variant_of(world: &World, entity: Entity) -> Result<Variant, CharacterError> {
    world
        .character(entity)
        .map(Character::variant)
        .ok_or(CharacterError::NotACharacter(entity))
}

fn composite_mut(
    world: &mut World,
    entity: Entity,
    operation: Operation,
) -> Result<&mut CharacterComposite, CharacterError> {
    let character = world
        .character_mut(entity)
        .ok_or(CharacterError::NotACharacter(entity))?;
    let variant = character.variant();
    character
        .as_composite_mut()
        .ok_or(CharacterError::Unsupported { operation, variant })
}

/// Place a character and start its active behavior.
///
/// Leafs start rising. Composites spawn every child in order, release each
/// from the group, and then destroy themselves.
pub fn spawn_character(world: &mut World, entity: Entity) -> Result<(), CharacterError> {
    match variant_of(world, entity)? {
        Variant::Leaf => leaf::start(world, entity),
        Variant::Composite => composite::spawn_children(world, entity),
    }
}

/// Start a leaf's rise. Composites have no rise of their own.
pub fn start_rise(world: &mut World, entity: Entity) -> Result<(), CharacterError> {
    match variant_of(world, entity)? {
        Variant::Leaf => leaf::start(world, entity),
        variant => Err(CharacterError::Unsupported {
            operation: Operation::Rise,
            variant,
        }),
    }
}

/// The child at position `index` of a composite.
///
/// An out-of-range index is reported with a warning and yields `Ok(None)`.
pub fn child_character(
    world: &World,
    entity: Entity,
    index: usize,
) -> Result<Option<Entity>, CharacterError> {
    let character = world
        .character(entity)
        .ok_or(CharacterError::NotACharacter(entity))?;
    let composite = character
        .as_composite()
        .ok_or(CharacterError::Unsupported {
            operation: Operation::ChildCharacter,
            variant: character.variant(),
        })?;

    let child = composite.get(index);
    if child.is_none() {
        log::warn!(
            "Character index {index} is invalid for {entity} ({} children)",
            composite.len()
        );
    }
    Ok(child)
}

/// Whether `target` is reachable from `root` through scene children or
/// composite membership. `root` reaches itself.
fn reaches(world: &World, root: Entity, target: Entity) -> bool {
    let mut stack = vec![root];
    let mut seen = HashSet::new();
    while let Some(entity) = stack.pop() {
        if entity == target {
            return true;
        }
        if !seen.insert(entity) {
            continue;
        }
        stack.extend_from_slice(world.children(entity));
        if let Some(composite) = world.character(entity).and_then(Character::as_composite) {
            stack.extend_from_slice(composite.children());
        }
    }
    false
}

/// Append `child` to a composite. The child must be a live character that
/// doesn't already contain the composite.
pub fn add_character(world: &mut World, entity: Entity, child: Entity) -> Result<(), CharacterError> {
    if world.character(child).is_none() {
        return Err(CharacterError::NotACharacter(child));
    }
    if variant_of(world, entity)? == Variant::Composite && reaches(world, child, entity) {
        return Err(CharacterError::Cycle {
            composite: entity,
            child,
        });
    }
    composite_mut(world, entity, Operation::AddCharacter)?.push(child);
    Ok(())
}

/// Remove the first occurrence of `child` from a composite.
///
/// Only membership changes: the child stays in the composite's scene
/// subtree. Returns whether the child was a member.
pub fn remove_character(
    world: &mut World,
    entity: Entity,
    child: Entity,
) -> Result<bool, CharacterError> {
    Ok(composite_mut(world, entity, Operation::RemoveCharacter)?.remove(child))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Transform;

    fn leaf(world: &mut World) -> Entity {
        world.spawn_with(Transform::default(), CharacterLeaf::new(15.0))
    }

    fn group_of(world: &mut World, count: usize) -> (Entity, Vec<Entity>) {
        let mut builder = CompositeBuilder::new(Transform::default());
        for i in 0..count {
            builder = builder.with_leaf(Transform::from_xy(i as f32, 0.0), CharacterLeaf::new(15.0));
        }
        let group = builder.spawn(world);
        let members = world
            .character(group)
            .and_then(Character::as_composite)
            .map(|c| c.children().to_vec())
            .unwrap();
        (group, members)
    }

    #[test]
    fn capability_sets() {
        let l = Character::from(CharacterLeaf::new(1.0));
        let c = Character::from(CharacterComposite::default());
        assert!(l.supports(Capability::Spawn));
        assert!(!l.supports(Capability::Compose));
        assert!(c.supports(Capability::Spawn));
        assert!(c.supports(Capability::Compose));
        assert_eq!(l.variant(), Variant::Leaf);
        assert_eq!(c.variant(), Variant::Composite);
    }

    #[test]
    fn child_lookup_by_index() {
        let mut world = World::new();
        let (group, members) = group_of(&mut world, 3);

        assert_eq!(child_character(&world, group, 0), Ok(Some(members[0])));
        assert_eq!(child_character(&world, group, 2), Ok(Some(members[2])));
        assert_eq!(child_character(&world, group, 3), Ok(None));
    }

    #[test]
    fn leaf_rejects_child_operations() {
        let mut world = World::new();
        let a = leaf(&mut world);
        let b = leaf(&mut world);

        let unsupported = |operation| CharacterError::Unsupported {
            operation,
            variant: Variant::Leaf,
        };
        assert_eq!(
            child_character(&world, a, 0),
            Err(unsupported(Operation::ChildCharacter))
        );
        assert_eq!(
            add_character(&mut world, a, b),
            Err(unsupported(Operation::AddCharacter))
        );
        assert_eq!(
            remove_character(&mut world, a, b),
            Err(unsupported(Operation::RemoveCharacter))
        );
        assert!(unsupported(Operation::AddCharacter).is_fatal());
    }

    #[test]
    fn composite_has_no_rise_of_its_own() {
        let mut world = World::new();
        let (group, _) = group_of(&mut world, 1);
        let err = start_rise(&mut world, group).unwrap_err();
        assert_eq!(
            err,
            CharacterError::Unsupported {
                operation: Operation::Rise,
                variant: Variant::Composite,
            }
        );
        assert_eq!(
            err.to_string(),
            "start_rise() is not supported for CharacterComposite"
        );
    }

    #[test]
    fn composite_cannot_contain_itself() {
        let mut world = World::new();
        let (group, _) = group_of(&mut world, 1);

        assert_eq!(
            add_character(&mut world, group, group),
            Err(CharacterError::Cycle {
                composite: group,
                child: group,
            })
        );
        let members = world
            .character(group)
            .and_then(Character::as_composite)
            .map(CharacterComposite::len);
        assert_eq!(members, Some(1));

        // Membership is untouched, so spawning still terminates.
        spawn_character(&mut world, group).unwrap();
        assert!(!world.is_alive(group));
    }

    #[test]
    fn outer_group_cannot_join_its_nested_group() {
        let mut world = World::new();
        let outer = CompositeBuilder::new(Transform::default())
            .with_composite(
                CompositeBuilder::new(Transform::default())
                    .with_leaf(Transform::default(), CharacterLeaf::default()),
            )
            .spawn(&mut world);
        let inner = child_character(&world, outer, 0).unwrap().unwrap();

        let err = add_character(&mut world, inner, outer).unwrap_err();
        assert!(matches!(err, CharacterError::Cycle { .. }));
        assert!(!err.is_fatal());
    }

    #[test]
    fn membership_loop_is_rejected() {
        let mut world = World::new();
        let (a, _) = group_of(&mut world, 1);
        let (b, _) = group_of(&mut world, 1);

        add_character(&mut world, a, b).unwrap();
        assert!(matches!(
            add_character(&mut world, b, a),
            Err(CharacterError::Cycle { .. })
        ));

        // A and B stay separate trees in the scene, and a contains b once.
        spawn_character(&mut world, a).unwrap();
        assert!(!world.is_alive(a));
        assert!(!world.is_alive(b));
    }

    #[test]
    fn add_and_remove_by_identity() {
        let mut world = World::new();
        let (group, members) = group_of(&mut world, 2);
        let extra = leaf(&mut world);

        add_character(&mut world, group, extra).unwrap();
        add_character(&mut world, group, extra).unwrap();
        assert_eq!(child_character(&world, group, 3), Ok(Some(extra)));

        // Only the first occurrence goes.
        assert_eq!(remove_character(&mut world, group, extra), Ok(true));
        assert_eq!(child_character(&world, group, 2), Ok(Some(extra)));
        assert_eq!(child_character(&world, group, 3), Ok(None));

        assert_eq!(remove_character(&mut world, group, members[0]), Ok(true));
        assert_eq!(child_character(&world, group, 0), Ok(Some(members[1])));
        assert_eq!(remove_character(&mut world, group, members[0]), Ok(false));
    }

    #[test]
    fn removed_child_stays_in_scene_subtree() {
        let mut world = World::new();
        let (group, members) = group_of(&mut world, 2);

        remove_character(&mut world, group, members[0]).unwrap();
        assert_eq!(world.parent(members[0]), Some(group));

        spawn_character(&mut world, group).unwrap();
        assert!(!world.is_alive(members[0]));
        assert!(world.is_alive(members[1]));
    }

    #[test]
    fn add_requires_a_character() {
        let mut world = World::new();
        let (group, _) = group_of(&mut world, 0);
        let prop = world.spawn(Transform::default());
        assert_eq!(
            add_character(&mut world, group, prop),
            Err(CharacterError::NotACharacter(prop))
        );
    }

    #[test]
    fn operations_on_dead_entities_fail() {
        let mut world = World::new();
        let a = leaf(&mut world);
        world.despawn(a);
        assert_eq!(
            spawn_character(&mut world, a),
            Err(CharacterError::NotACharacter(a))
        );
    }
}
