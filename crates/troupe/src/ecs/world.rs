//! # World: The Scene Container
//!
//! The [`World`] owns every scene node and every global resource.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │ World                                                │
//! │                                                      │
//! │  allocator: generational entity handles              │
//! │                                                      │
//! │  nodes: Vec<Option<Node>>   (indexed by slot)        │
//! │    Node { transform, parent, children, character }   │
//! │                                                      │
//! │  resources: HashMap<TypeId, Box<dyn Any>>            │
//! │    Time, FixedTime, Input, Camera2d, placer, ...     │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! Nodes are stored densely by slot index, so iterating them (for example in
//! the rise pass) always visits entities in index order.
//!
//! Parent/child operations live in [`hierarchy`](super::hierarchy).

use std::any::{Any, TypeId};
use std::collections::HashMap;

use super::entity::{Entity, EntityAllocator};
use crate::character::Character;
use crate::math::Transform;

/// Per-entity storage.
#[derive(Debug)]
pub(crate) struct Node {
    pub(crate) transform: Transform,
    pub(crate) parent: Option<Entity>,
    /// Scene-graph children in attach order.
    pub(crate) children: Vec<Entity>,
    pub(crate) character: Option<Character>,
}

impl Node {
    pub(crate) fn new(transform: Transform, character: Option<Character>) -> Self {
        Self {
            transform,
            parent: None,
            children: Vec::new(),
            character,
        }
    }
}

/// The central container for scene nodes and resources.
pub struct World {
    allocator: EntityAllocator,
    nodes: Vec<Option<Node>>,
    resources: HashMap<TypeId, Box<dyn Any>>,
    #[cfg(feature = "diagnostics")]
    pub(crate) spawned_this_frame: u32,
    #[cfg(feature = "diagnostics")]
    pub(crate) despawned_this_frame: u32,
}

impl World {
    pub fn new() -> Self {
        Self {
            allocator: EntityAllocator::new(),
            nodes: Vec::new(),
            resources: HashMap::new(),
            #[cfg(feature = "diagnostics")]
            spawned_this_frame: 0,
            #[cfg(feature = "diagnostics")]
            despawned_this_frame: 0,
        }
    }

    // ── Resources ────────────────────────────────────────────────────

    /// Insert a resource, replacing any existing one of the same type.
    pub fn insert_resource<T: 'static>(&mut self, value: T) {
        self.resources.insert(TypeId::of::<T>(), Box::new(value));
    }

    /// Get a shared reference to a resource.
    ///
    /// # Panics
    ///
    /// Panics if the resource hasn't been inserted.
    pub fn resource<T: 'static>(&self) -> &T {
        self.get_resource::<T>().unwrap_or_else(|| {
            panic!(
                "Resource `{}` not found. Did you forget to insert it?",
                std::any::type_name::<T>()
            )
        })
    }

    /// Get a mutable reference to a resource.
    ///
    /// # Panics
    ///
    /// Panics if the resource hasn't been inserted.
    pub fn resource_mut<T: 'static>(&mut self) -> &mut T {
        self.get_resource_mut::<T>().unwrap_or_else(|| {
            panic!(
                "Resource `{}` not found. Did you forget to insert it?",
                std::any::type_name::<T>()
            )
        })
    }

    pub fn get_resource<T: 'static>(&self) -> Option<&T> {
        self.resources
            .get(&TypeId::of::<T>())
            .and_then(|r| r.downcast_ref::<T>())
    }

    pub fn get_resource_mut<T: 'static>(&mut self) -> Option<&mut T> {
        self.resources
            .get_mut(&TypeId::of::<T>())
            .and_then(|r| r.downcast_mut::<T>())
    }

    /// Remove a resource, taking ownership.
    ///
    /// Used to run a resource's own update step against the world it lives
    /// in: take it out, call it with `&mut World`, put it back.
    pub fn resource_remove<T: 'static>(&mut self) -> Option<T> {
        self.resources
            .remove(&TypeId::of::<T>())
            .and_then(|r| r.downcast::<T>().ok())
            .map(|b| *b)
    }

    // ── Entity Management ────────────────────────────────────────────

    pub fn entity_count(&self) -> usize {
        self.allocator.alive_count()
    }

    pub fn is_alive(&self, entity: Entity) -> bool {
        self.allocator.is_alive(entity)
    }

    /// All live entities in slot order.
    pub fn entities(&self) -> Vec<Entity> {
        self.live_entities(|_| true)
    }

    /// Live entities that carry a [`Character`], in slot order.
    pub fn characters(&self) -> Vec<Entity> {
        self.live_entities(|node| node.character.is_some())
    }

    fn live_entities(&self, mut filter: impl FnMut(&Node) -> bool) -> Vec<Entity> {
        let mut out = Vec::new();
        for (index, slot) in self.nodes.iter().enumerate() {
            let Some(node) = slot else { continue };
            if filter(node) {
                out.push(self.allocator.handle_at(index as u32));
            }
        }
        out
    }

    /// Spawn a root node with no character (a prop).
    pub fn spawn(&mut self, transform: Transform) -> Entity {
        self.insert_node(Node::new(transform, None))
    }

    /// Spawn a root node carrying a character.
    pub fn spawn_with(&mut self, transform: Transform, character: impl Into<Character>) -> Entity {
        self.insert_node(Node::new(transform, Some(character.into())))
    }

    pub(crate) fn insert_node(&mut self, node: Node) -> Entity {
        let entity = self.allocator.allocate();
        let idx = entity.index as usize;
        if idx >= self.nodes.len() {
            self.nodes.resize_with(idx + 1, || None);
        }
        self.nodes[idx] = Some(node);
        #[cfg(feature = "diagnostics")]
        {
            self.spawned_this_frame += 1;
        }
        entity
    }

    /// Despawn a single entity. Its scene children are detached and become
    /// roots at their current world position.
    ///
    /// Returns `true` if the entity was alive.
    pub fn despawn(&mut self, entity: Entity) -> bool {
        if !self.is_alive(entity) {
            return false;
        }
        for child in self.children(entity).to_vec() {
            self.detach(child);
        }
        self.unlink_from_parent(entity);
        self.remove_node(entity);
        true
    }

    /// Drop the node and free its handle without touching the hierarchy.
    pub(crate) fn remove_node(&mut self, entity: Entity) {
        if let Some(slot) = self.nodes.get_mut(entity.index as usize) {
            *slot = None;
        }
        self.allocator.deallocate(entity);
        #[cfg(feature = "diagnostics")]
        {
            self.despawned_this_frame += 1;
        }
    }

    // ── Per-Entity Access ────────────────────────────────────────────

    pub(crate) fn node(&self, entity: Entity) -> Option<&Node> {
        if !self.is_alive(entity) {
            return None;
        }
        self.nodes.get(entity.index as usize)?.as_ref()
    }

    pub(crate) fn node_mut(&mut self, entity: Entity) -> Option<&mut Node> {
        if !self.is_alive(entity) {
            return None;
        }
        self.nodes.get_mut(entity.index as usize)?.as_mut()
    }

    /// Local transform (relative to the parent, if any).
    pub fn transform(&self, entity: Entity) -> Option<&Transform> {
        self.node(entity).map(|n| &n.transform)
    }

    pub fn transform_mut(&mut self, entity: Entity) -> Option<&mut Transform> {
        self.node_mut(entity).map(|n| &mut n.transform)
    }

    pub fn character(&self, entity: Entity) -> Option<&Character> {
        self.node(entity)?.character.as_ref()
    }

    pub fn character_mut(&mut self, entity: Entity) -> Option<&mut Character> {
        self.node_mut(entity)?.character.as_mut()
    }

    /// Entity pool counters for diagnostics. Resets the per-frame counts.
    #[cfg(feature = "diagnostics")]
    pub(crate) fn diagnostics_entity_stats(&mut self) -> crate::diag::EntityPoolStats {
        let stats = crate::diag::EntityPoolStats {
            total_slots: self.allocator.total_slots(),
            free_count: self.allocator.free_count(),
            alive_count: self.allocator.alive_count(),
            spawned_this_frame: self.spawned_this_frame,
            despawned_this_frame: self.despawned_this_frame,
        };
        self.spawned_this_frame = 0;
        self.despawned_this_frame = 0;
        stats
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}
