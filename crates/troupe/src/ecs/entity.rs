//! # Entity: Handles to Scene Nodes
//!
//! An [`Entity`] names one node in the [`World`](super::world::World): a
//! placed leaf, a composite group, a preview, or a plain prop. The handle
//! carries no data of its own.
//!
//! ## Generations
//!
//! Characters are created and destroyed constantly: every placement consumes
//! a preview, and every risen leaf is destroyed. Slots are therefore
//! recycled, and each slot carries a generation counter that is bumped on
//! release:
//!
//! ```text
//! Entity { index: 3, generation: 0 }  ← preview, later placed and destroyed
//! Entity { index: 3, generation: 1 }  ← a new leaf reusing slot 3
//! ```
//!
//! A composite that still lists the old handle sees it as dead instead of
//! accidentally spawning the new leaf.

use std::fmt;

/// A handle to a node in the [`World`](super::world::World).
///
/// Only valid for the world that created it, and only until it is despawned.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Entity {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl Entity {
    /// Returns the raw slot index.
    pub fn index(self) -> u32 {
        self.index
    }

    /// Returns the slot generation.
    pub fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({}v{})", self.index, self.generation)
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

/// Hands out entity slots and recycles released ones.
///
/// ```text
/// generations: [1, 0, 2]   ← current generation of every slot
/// free_list:   [0]         ← released slots, reused LIFO
/// ```
pub(crate) struct EntityAllocator {
    generations: Vec<u32>,
    free_list: Vec<u32>,
}

impl EntityAllocator {
    pub fn new() -> Self {
        Self {
            generations: Vec::new(),
            free_list: Vec::new(),
        }
    }

    /// Allocate a handle, reusing the most recently released slot if any.
    pub fn allocate(&mut self) -> Entity {
        match self.free_list.pop() {
            Some(index) => Entity {
                index,
                generation: self.generations[index as usize],
            },
            None => {
                let index = self.generations.len() as u32;
                self.generations.push(0);
                Entity {
                    index,
                    generation: 0,
                }
            }
        }
    }

    /// Release a handle. Returns `false` if it was already stale.
    pub fn deallocate(&mut self, entity: Entity) -> bool {
        if !self.is_alive(entity) {
            return false;
        }
        self.generations[entity.index as usize] += 1;
        self.free_list.push(entity.index);
        true
    }

    pub fn is_alive(&self, entity: Entity) -> bool {
        self.generations
            .get(entity.index as usize)
            .is_some_and(|&generation| generation == entity.generation)
    }

    /// The handle that currently owns `index`. Only meaningful when the
    /// caller knows the slot is occupied.
    pub fn handle_at(&self, index: u32) -> Entity {
        Entity {
            index,
            generation: self.generations[index as usize],
        }
    }

    /// Number of live handles.
    pub fn alive_count(&self) -> usize {
        self.generations.len() - self.free_list.len()
    }

    /// Number of released slots waiting for reuse.
    #[cfg(any(feature = "diagnostics", test))]
    pub(crate) fn free_count(&self) -> usize {
        self.free_list.len()
    }

    /// Total number of slots ever handed out.
    #[cfg(any(feature = "diagnostics", test))]
    pub(crate) fn total_slots(&self) -> usize {
        self.generations.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_slots_are_sequential() {
        let mut alloc = EntityAllocator::new();
        let a = alloc.allocate();
        let b = alloc.allocate();
        assert_eq!((a.index, a.generation), (0, 0));
        assert_eq!((b.index, b.generation), (1, 0));
    }

    #[test]
    fn released_slot_comes_back_with_new_generation() {
        let mut alloc = EntityAllocator::new();
        let preview = alloc.allocate();
        assert!(alloc.deallocate(preview));

        let leaf = alloc.allocate();
        assert_eq!(leaf.index, preview.index);
        assert_eq!(leaf.generation, 1);
        assert!(!alloc.is_alive(preview));
        assert!(alloc.is_alive(leaf));
    }

    #[test]
    fn stale_handle_cannot_be_released_twice() {
        let mut alloc = EntityAllocator::new();
        let e = alloc.allocate();
        assert!(alloc.deallocate(e));
        assert!(!alloc.deallocate(e));
    }

    #[test]
    fn counts_track_live_and_free_slots() {
        let mut alloc = EntityAllocator::new();
        let a = alloc.allocate();
        let _b = alloc.allocate();
        assert_eq!(alloc.alive_count(), 2);
        assert_eq!(alloc.free_count(), 0);

        alloc.deallocate(a);
        assert_eq!(alloc.alive_count(), 1);
        assert_eq!(alloc.free_count(), 1);
        assert_eq!(alloc.total_slots(), 2);
    }

    #[test]
    fn unknown_index_is_not_alive() {
        let alloc = EntityAllocator::new();
        assert!(!alloc.is_alive(Entity {
            index: 7,
            generation: 0
        }));
    }
}
