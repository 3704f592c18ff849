//! Groups of characters.
//!
//! A composite's members are given to it when it is built. The
//! [`CompositeBuilder`] creates the group node, creates every child under it
//! in the scene graph, and hands the character children to the composite in
//! the order they were added. Prop children are part of the scene subtree
//! but never members.

use crate::ecs::{Entity, World};
use crate::math::Transform;

use super::{Character, CharacterError, CharacterLeaf, spawn_character};

/// An ordered collection of child characters.
///
/// Membership is by entity identity; duplicates are allowed.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CharacterComposite {
    children: Vec<Entity>,
}

impl CharacterComposite {
    pub fn children(&self) -> &[Entity] {
        &self.children
    }

    pub fn get(&self, index: usize) -> Option<Entity> {
        self.children.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub(crate) fn push(&mut self, child: Entity) {
        self.children.push(child);
    }

    pub(crate) fn remove(&mut self, child: Entity) -> bool {
        match self.children.iter().position(|&c| c == child) {
            Some(pos) => {
                self.children.remove(pos);
                true
            }
            None => false,
        }
    }
}

/// Spawn every member in order, release each from the group, then destroy
/// the group node (and whatever is still in its subtree).
pub(super) fn spawn_children(world: &mut World, entity: Entity) -> Result<(), CharacterError> {
    let members = world
        .character(entity)
        .and_then(Character::as_composite)
        .map(|c| c.children.clone())
        .ok_or(CharacterError::NotACharacter(entity))?;

    log::debug!("Spawning composite {entity} with {} children", members.len());

    for child in members {
        if !world.is_alive(child) {
            log::warn!("Composite {entity} lists dead child {child}, skipping");
            continue;
        }
        spawn_character(world, child)?;
        // The child may already be gone: a leaf above the rise height, or a
        // nested composite that destroyed itself.
        world.detach(child);
    }

    world.despawn_recursive(entity);
    Ok(())
}

enum ChildSpec {
    Leaf(Transform, CharacterLeaf),
    Composite(CompositeBuilder),
    Prop(Transform),
}

/// Builds a composite and its children in one go.
///
/// ```ignore
/// let squad = CompositeBuilder::new(Transform::from_xy(0.0, 0.0))
///     .with_leaf(Transform::from_xy(-1.0, 0.0), CharacterLeaf::new(12.0))
///     .with_leaf(Transform::from_xy(1.0, 0.0), CharacterLeaf::new(12.0))
///     .with_composite(
///         CompositeBuilder::new(Transform::from_xy(0.0, -2.0))
///             .with_leaf(Transform::default(), CharacterLeaf::default()),
///     )
///     .spawn(&mut world);
/// ```
pub struct CompositeBuilder {
    transform: Transform,
    children: Vec<ChildSpec>,
}

impl CompositeBuilder {
    pub fn new(transform: Transform) -> Self {
        Self {
            transform,
            children: Vec::new(),
        }
    }

    /// Add a leaf member, positioned relative to the group.
    pub fn with_leaf(mut self, transform: Transform, leaf: CharacterLeaf) -> Self {
        self.children.push(ChildSpec::Leaf(transform, leaf));
        self
    }

    /// Add a nested group member.
    pub fn with_composite(mut self, composite: CompositeBuilder) -> Self {
        self.children.push(ChildSpec::Composite(composite));
        self
    }

    /// Add a scene child that isn't a character.
    pub fn with_prop(mut self, transform: Transform) -> Self {
        self.children.push(ChildSpec::Prop(transform));
        self
    }

    /// Spawn as a root node.
    pub fn spawn(self, world: &mut World) -> Entity {
        let root = world.spawn_with(self.transform, CharacterComposite::default());
        self.populate(world, root);
        root
    }

    /// Spawn under `parent` in the scene graph.
    pub fn spawn_child(self, world: &mut World, parent: Entity) -> Entity {
        let node = world.spawn_child(
            parent,
            self.transform,
            Some(CharacterComposite::default().into()),
        );
        self.populate(world, node);
        node
    }

    fn populate(self, world: &mut World, group: Entity) {
        let mut members = Vec::new();
        for child in self.children {
            match child {
                ChildSpec::Leaf(transform, leaf) => {
                    members.push(world.spawn_child(group, transform, Some(leaf.into())));
                }
                ChildSpec::Composite(builder) => {
                    members.push(builder.spawn_child(world, group));
                }
                ChildSpec::Prop(transform) => {
                    world.spawn_child(group, transform, None);
                }
            }
        }

        if let Some(composite) = world
            .character_mut(group)
            .and_then(Character::as_composite_mut)
        {
            composite.children = members;
        }
    }
}
