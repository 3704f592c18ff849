//! # Entity Hierarchies: Parent/Child Relationships
//!
//! Every node can have one parent and an ordered list of children. A child's
//! [`Transform`] is local to its parent, so moving a group's root moves every
//! unit in the group.
//!
//! ## Usage
//!
//! ```ignore
//! let group = world.spawn(Transform::from_xy(4.0, 0.0));
//! let unit = world.spawn_child(group, Transform::from_xy(1.0, 0.0), None);
//! assert_eq!(world.global_translation(unit).unwrap().x, 5.0);
//!
//! // Release the unit: it stays where it is in world space.
//! world.detach(unit);
//! assert_eq!(world.transform(unit).unwrap().translation.x, 5.0);
//! ```

use crate::character::Character;
use crate::ecs::Entity;
use crate::ecs::world::{Node, World};
use crate::math::{Transform, Vec3};

impl World {
    /// Spawn a node under `parent`, appended to the parent's child list.
    ///
    /// # Panics
    ///
    /// Panics if the parent entity is not alive.
    pub fn spawn_child(
        &mut self,
        parent: Entity,
        transform: Transform,
        character: Option<Character>,
    ) -> Entity {
        assert!(
            self.is_alive(parent),
            "Cannot spawn child on dead parent {:?}",
            parent
        );

        let mut node = Node::new(transform, character);
        node.parent = Some(parent);
        let child = self.insert_node(node);

        if let Some(parent_node) = self.node_mut(parent) {
            parent_node.children.push(child);
        }
        child
    }

    /// The scene parent of `entity`, if any.
    pub fn parent(&self, entity: Entity) -> Option<Entity> {
        self.node(entity)?.parent
    }

    /// Scene children of `entity` in attach order. Empty for dead entities.
    pub fn children(&self, entity: Entity) -> &[Entity] {
        self.node(entity)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    /// World-space position: the sum of local translations up to the root.
    pub fn global_translation(&self, entity: Entity) -> Option<Vec3> {
        let mut node = self.node(entity)?;
        let mut translation = node.transform.translation;
        while let Some(parent) = node.parent {
            let Some(parent_node) = self.node(parent) else {
                break;
            };
            translation += parent_node.transform.translation;
            node = parent_node;
        }
        Some(translation)
    }

    /// Move `entity` so its world-space position becomes `target`.
    pub fn set_global_translation(&mut self, entity: Entity, target: Vec3) {
        let Some(current) = self.global_translation(entity) else {
            return;
        };
        if let Some(transform) = self.transform_mut(entity) {
            transform.translation += target - current;
        }
    }

    /// Detach `entity` from its parent, making it a root node that stays at
    /// the same world position.
    ///
    /// Returns `false` if the entity is dead or already a root.
    pub fn detach(&mut self, entity: Entity) -> bool {
        let Some(global) = self.global_translation(entity) else {
            return false;
        };
        if !self.unlink_from_parent(entity) {
            return false;
        }
        if let Some(node) = self.node_mut(entity) {
            node.transform.translation = global;
        }
        true
    }

    /// Clear the parent link on both sides. Local transform is untouched.
    pub(crate) fn unlink_from_parent(&mut self, entity: Entity) -> bool {
        let Some(parent) = self.node_mut(entity).and_then(|n| n.parent.take()) else {
            return false;
        };
        if let Some(parent_node) = self.node_mut(parent) {
            parent_node.children.retain(|&c| c != entity);
        }
        true
    }

    /// Despawn an entity and all its descendants.
    ///
    /// Also removes the entity from its parent's child list.
    ///
    /// Returns `true` if the entity was alive.
    pub fn despawn_recursive(&mut self, entity: Entity) -> bool {
        if !self.is_alive(entity) {
            return false;
        }
        self.unlink_from_parent(entity);

        let mut to_despawn = vec![entity];
        let mut i = 0;
        while i < to_despawn.len() {
            let current = to_despawn[i];
            to_despawn.extend_from_slice(self.children(current));
            i += 1;
        }

        for e in to_despawn {
            self.remove_node(e);
        }
        true
    }

    /// Number of nodes in the subtree rooted at `entity`, including itself.
    pub fn subtree_len(&self, entity: Entity) -> usize {
        if !self.is_alive(entity) {
            return 0;
        }
        1 + self
            .children(entity)
            .iter()
            .map(|&c| self.subtree_len(c))
            .sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use crate::ecs::World;
    use crate::math::{Transform, Vec3};

    #[test]
    fn root_global_is_local() {
        let mut world = World::new();
        let root = world.spawn(Transform::from_xy(10.0, 20.0));
        assert_eq!(
            world.global_translation(root),
            Some(Vec3::new(10.0, 20.0, 0.0))
        );
    }

    #[test]
    fn child_inherits_parent_translation() {
        let mut world = World::new();
        let parent = world.spawn(Transform::from_xy(100.0, 0.0));
        let child = world.spawn_child(parent, Transform::from_xy(10.0, 0.0), None);

        assert_eq!(world.parent(child), Some(parent));
        assert_eq!(world.children(parent), &[child]);
        assert_eq!(world.global_translation(child).unwrap().x, 110.0);
    }

    #[test]
    fn parent_moves_child_follows() {
        let mut world = World::new();
        let parent = world.spawn(Transform::default());
        let child = world.spawn_child(parent, Transform::from_xy(5.0, 0.0), None);

        world.transform_mut(parent).unwrap().translation = Vec3::new(50.0, 0.0, 0.0);
        assert_eq!(world.global_translation(child).unwrap().x, 55.0);
    }

    #[test]
    fn deep_hierarchy_sums_translations() {
        let mut world = World::new();
        let a = world.spawn(Transform::from_xy(1.0, 0.0));
        let b = world.spawn_child(a, Transform::from_xy(2.0, 0.0), None);
        let c = world.spawn_child(b, Transform::from_xy(3.0, 1.0), None);
        assert_eq!(
            world.global_translation(c),
            Some(Vec3::new(6.0, 1.0, 0.0))
        );
    }

    #[test]
    fn detach_keeps_world_position() {
        let mut world = World::new();
        let parent = world.spawn(Transform::from_xy(4.0, 2.0));
        let child = world.spawn_child(parent, Transform::from_xy(1.0, 1.0), None);

        assert!(world.detach(child));
        assert_eq!(world.parent(child), None);
        assert!(world.children(parent).is_empty());
        assert_eq!(
            world.transform(child).unwrap().translation,
            Vec3::new(5.0, 3.0, 0.0)
        );

        // Moving the old parent no longer affects the child.
        world.transform_mut(parent).unwrap().translation = Vec3::ZERO;
        assert_eq!(world.global_translation(child).unwrap().x, 5.0);
    }

    #[test]
    fn detach_root_or_dead_is_noop() {
        let mut world = World::new();
        let root = world.spawn(Transform::default());
        assert!(!world.detach(root));
        world.despawn(root);
        assert!(!world.detach(root));
    }

    #[test]
    fn set_global_translation_accounts_for_parent() {
        let mut world = World::new();
        let parent = world.spawn(Transform::from_xy(10.0, 0.0));
        let child = world.spawn_child(parent, Transform::default(), None);

        world.set_global_translation(child, Vec3::new(12.0, 3.0, 0.0));
        assert_eq!(
            world.transform(child).unwrap().translation,
            Vec3::new(2.0, 3.0, 0.0)
        );
    }

    #[test]
    fn despawn_recursive_removes_descendants() {
        let mut world = World::new();
        let parent = world.spawn(Transform::default());
        let child1 = world.spawn_child(parent, Transform::default(), None);
        let grandchild = world.spawn_child(child1, Transform::default(), None);
        let _child2 = world.spawn_child(parent, Transform::default(), None);
        assert_eq!(world.subtree_len(parent), 4);

        world.despawn_recursive(parent);

        assert_eq!(world.entity_count(), 0);
        assert!(!world.is_alive(child1));
        assert!(!world.is_alive(grandchild));
    }

    #[test]
    fn despawn_recursive_cleans_up_parent_children() {
        let mut world = World::new();
        let parent = world.spawn(Transform::default());
        let child1 = world.spawn_child(parent, Transform::default(), None);
        let child2 = world.spawn_child(parent, Transform::default(), None);

        world.despawn_recursive(child1);

        assert!(world.is_alive(parent));
        assert_eq!(world.children(parent), &[child2]);
    }

    #[test]
    fn plain_despawn_releases_children_in_place() {
        let mut world = World::new();
        let parent = world.spawn(Transform::from_xy(3.0, 0.0));
        let child = world.spawn_child(parent, Transform::from_xy(1.0, 0.0), None);

        world.despawn(parent);

        assert!(world.is_alive(child));
        assert_eq!(world.parent(child), None);
        assert_eq!(world.global_translation(child).unwrap().x, 4.0);
    }
}
