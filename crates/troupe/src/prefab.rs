//! # Prefabs: Templates for Placeable Groups
//!
//! A [`Prefab`] describes a character tree; [`Prefab::instantiate`] builds a
//! fresh copy of it in the world. The [`PrefabRegistry`] holds one optional
//! prefab per [`GroupTag`].
//!
//! ## JSON format
//!
//! ```json
//! {
//!   "groups": [
//!     { "name": "Small Group", "root": {
//!         "kind": "composite",
//!         "children": [
//!           { "kind": "leaf", "offset": [-0.5, 0.0], "move_speed": 12.0 },
//!           { "kind": "leaf", "offset": [0.5, 0.0] }
//!         ] } },
//!     null,
//!     { "name": "Large Group", "root": { "kind": "leaf" } }
//!   ]
//! }
//! ```
//!
//! Slots are positional: 0 = small, 1 = medium, 2 = large. `null` or a
//! missing trailing entry leaves that group without a prefab.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::character::{CharacterLeaf, CompositeBuilder, DEFAULT_MOVE_SPEED};
use crate::ecs::{Entity, World};
use crate::math::{Transform, Vec2};
use crate::placer::GroupTag;

// ── Errors ──────────────────────────────────────────────────────────────

#[derive(Debug)]
pub enum PrefabError {
    /// The prefab file could not be read.
    Io { path: PathBuf, source: std::io::Error },
    /// The prefab JSON is malformed.
    Parse(serde_json::Error),
    /// More groups than there are [`GroupTag`]s.
    TooManyGroups(usize),
    /// A prefab's root is a prop, so instances couldn't be placed.
    RootNotCharacter(String),
}

impl fmt::Display for PrefabError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrefabError::Io { path, source } => {
                write!(f, "failed to read prefabs from '{}': {source}", path.display())
            }
            PrefabError::Parse(e) => write!(f, "invalid prefab JSON: {e}"),
            PrefabError::TooManyGroups(n) => {
                write!(f, "{n} prefab groups given, at most {} supported", GroupTag::ALL.len())
            }
            PrefabError::RootNotCharacter(name) => {
                write!(f, "prefab \"{name}\" has a prop as its root")
            }
        }
    }
}

impl std::error::Error for PrefabError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PrefabError::Io { source, .. } => Some(source),
            PrefabError::Parse(e) => Some(e),
            _ => None,
        }
    }
}

// ── Prefab ──────────────────────────────────────────────────────────────

fn default_move_speed() -> f32 {
    DEFAULT_MOVE_SPEED
}

/// One node of a prefab tree. Offsets are relative to the parent node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PrefabNode {
    Leaf {
        #[serde(default)]
        offset: Vec2,
        #[serde(default = "default_move_speed")]
        move_speed: f32,
    },
    Composite {
        #[serde(default)]
        offset: Vec2,
        #[serde(default)]
        children: Vec<PrefabNode>,
    },
    Prop {
        #[serde(default)]
        offset: Vec2,
    },
}

impl PrefabNode {
    pub fn leaf(offset: Vec2, move_speed: f32) -> Self {
        PrefabNode::Leaf { offset, move_speed }
    }

    pub fn composite(offset: Vec2, children: Vec<PrefabNode>) -> Self {
        PrefabNode::Composite { offset, children }
    }

    pub fn prop(offset: Vec2) -> Self {
        PrefabNode::Prop { offset }
    }

    fn offset(&self) -> Vec2 {
        match self {
            PrefabNode::Leaf { offset, .. }
            | PrefabNode::Composite { offset, .. }
            | PrefabNode::Prop { offset } => *offset,
        }
    }

    /// Number of leafs in this subtree.
    pub fn leaf_count(&self) -> usize {
        match self {
            PrefabNode::Leaf { .. } => 1,
            PrefabNode::Composite { children, .. } => children.iter().map(Self::leaf_count).sum(),
            PrefabNode::Prop { .. } => 0,
        }
    }

    fn to_builder(&self, transform: Transform) -> CompositeBuilder {
        let mut builder = CompositeBuilder::new(transform);
        let PrefabNode::Composite { children, .. } = self else {
            return builder;
        };
        for child in children {
            let local = Transform::from_vec2(child.offset());
            builder = match child {
                PrefabNode::Leaf { move_speed, .. } => {
                    builder.with_leaf(local, CharacterLeaf::new(*move_speed))
                }
                PrefabNode::Composite { .. } => builder.with_composite(child.to_builder(local)),
                PrefabNode::Prop { .. } => builder.with_prop(local),
            };
        }
        builder
    }
}

/// A named character template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prefab {
    pub name: String,
    pub root: PrefabNode,
}

impl Prefab {
    pub fn new(name: impl Into<String>, root: PrefabNode) -> Result<Self, PrefabError> {
        let prefab = Self {
            name: name.into(),
            root,
        };
        prefab.validate()?;
        Ok(prefab)
    }

    fn validate(&self) -> Result<(), PrefabError> {
        match self.root {
            PrefabNode::Prop { .. } => Err(PrefabError::RootNotCharacter(self.name.clone())),
            _ => Ok(()),
        }
    }

    /// Build a new instance with its root at `position` (plus the root's
    /// own offset). Returns the root entity.
    pub fn instantiate(&self, world: &mut World, position: Vec2) -> Entity {
        let transform = Transform::from_vec2(position + self.root.offset());
        match &self.root {
            PrefabNode::Leaf { move_speed, .. } => {
                world.spawn_with(transform, CharacterLeaf::new(*move_speed))
            }
            PrefabNode::Composite { .. } => self.root.to_builder(transform).spawn(world),
            PrefabNode::Prop { .. } => world.spawn(transform),
        }
    }
}

// ── Registry ────────────────────────────────────────────────────────────

#[derive(Debug, Default, Serialize, Deserialize)]
struct PrefabFile {
    #[serde(default)]
    groups: Vec<Option<Prefab>>,
}

/// One optional prefab per group, indexed by [`GroupTag::index`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PrefabRegistry {
    slots: [Option<Prefab>; 3],
}

impl PrefabRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from an ordered list: small, medium, large.
    pub fn from_list(prefabs: Vec<Option<Prefab>>) -> Result<Self, PrefabError> {
        if prefabs.len() > GroupTag::ALL.len() {
            return Err(PrefabError::TooManyGroups(prefabs.len()));
        }
        let mut registry = Self::new();
        for (tag, prefab) in GroupTag::ALL.into_iter().zip(prefabs) {
            if let Some(prefab) = prefab {
                registry.set(tag, prefab)?;
            }
        }
        Ok(registry)
    }

    pub fn from_json(json: &str) -> Result<Self, PrefabError> {
        let file: PrefabFile = serde_json::from_str(json).map_err(PrefabError::Parse)?;
        Self::from_list(file.groups)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, PrefabError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| PrefabError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let registry = Self::from_json(&json)?;
        log::info!(
            "Loaded {} prefab group(s) from '{}'",
            registry.len(),
            path.display()
        );
        Ok(registry)
    }

    pub fn to_json(&self) -> Result<String, PrefabError> {
        let file = PrefabFile {
            groups: self.slots.to_vec(),
        };
        serde_json::to_string_pretty(&file).map_err(PrefabError::Parse)
    }

    pub fn get(&self, tag: GroupTag) -> Option<&Prefab> {
        self.slots[tag.index()].as_ref()
    }

    /// Assign the prefab for `tag`. Rejects prefabs whose root is a prop.
    pub fn set(&mut self, tag: GroupTag, prefab: Prefab) -> Result<(), PrefabError> {
        prefab.validate()?;
        self.slots[tag.index()] = Some(prefab);
        Ok(())
    }

    pub fn clear(&mut self, tag: GroupTag) -> Option<Prefab> {
        self.slots[tag.index()].take()
    }

    /// Number of groups that have a prefab.
    pub fn len(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The stock three groups: a trio, two trios, and a trio of pairs
    /// around a pair of trios.
    pub fn builtin() -> Self {
        let trio = |offset: Vec2| {
            PrefabNode::composite(
                offset,
                vec![
                    PrefabNode::leaf(Vec2::new(-1.0, 0.0), 12.0),
                    PrefabNode::leaf(Vec2::new(0.0, 0.5), 15.0),
                    PrefabNode::leaf(Vec2::new(1.0, 0.0), 12.0),
                ],
            )
        };
        let pair = |offset: Vec2| {
            PrefabNode::composite(
                offset,
                vec![
                    PrefabNode::leaf(Vec2::new(-0.5, 0.0), 18.0),
                    PrefabNode::leaf(Vec2::new(0.5, 0.0), 18.0),
                ],
            )
        };

        let small = Prefab {
            name: GroupTag::Small.label().to_string(),
            root: trio(Vec2::ZERO),
        };
        let medium = Prefab {
            name: GroupTag::Medium.label().to_string(),
            root: PrefabNode::composite(
                Vec2::ZERO,
                vec![trio(Vec2::new(-2.0, 0.0)), trio(Vec2::new(2.0, 0.0))],
            ),
        };
        let large = Prefab {
            name: GroupTag::Large.label().to_string(),
            root: PrefabNode::composite(
                Vec2::ZERO,
                vec![
                    PrefabNode::composite(
                        Vec2::new(0.0, -1.5),
                        vec![
                            pair(Vec2::new(-3.0, 0.0)),
                            pair(Vec2::ZERO),
                            pair(Vec2::new(3.0, 0.0)),
                        ],
                    ),
                    trio(Vec2::new(-2.0, 1.5)),
                    trio(Vec2::new(2.0, 1.5)),
                    PrefabNode::prop(Vec2::new(0.0, 3.0)),
                ],
            ),
        };
        Self {
            slots: [Some(small), Some(medium), Some(large)],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::{Character, spawn_character};
    use crate::math::Vec3;

    #[test]
    fn parses_positional_groups_with_defaults() {
        let json = r#"{
            "groups": [
                { "name": "Small Group", "root": {
                    "kind": "composite",
                    "children": [
                        { "kind": "leaf", "offset": [-0.5, 0.0], "move_speed": 12.0 },
                        { "kind": "leaf", "offset": [0.5, 0.0] }
                    ] } },
                null,
                { "name": "Large Group", "root": { "kind": "leaf" } }
            ]
        }"#;
        let registry = PrefabRegistry::from_json(json).unwrap();

        assert_eq!(registry.len(), 2);
        assert!(registry.get(GroupTag::Medium).is_none());
        assert_eq!(
            registry.get(GroupTag::Large).unwrap().root,
            PrefabNode::leaf(Vec2::ZERO, DEFAULT_MOVE_SPEED)
        );
        assert_eq!(registry.get(GroupTag::Small).unwrap().root.leaf_count(), 2);
    }

    #[test]
    fn short_list_leaves_trailing_groups_empty() {
        let json = r#"{ "groups": [ { "name": "only", "root": { "kind": "leaf" } } ] }"#;
        let registry = PrefabRegistry::from_json(json).unwrap();
        assert!(registry.get(GroupTag::Small).is_some());
        assert!(registry.get(GroupTag::Medium).is_none());
        assert!(registry.get(GroupTag::Large).is_none());
    }

    #[test]
    fn rejects_too_many_groups() {
        let leaf = || Some(Prefab::new("x", PrefabNode::leaf(Vec2::ZERO, 1.0)).unwrap());
        let err = PrefabRegistry::from_list(vec![leaf(), leaf(), leaf(), leaf()]).unwrap_err();
        assert!(matches!(err, PrefabError::TooManyGroups(4)));
    }

    #[test]
    fn rejects_prop_root() {
        let json = r#"{ "groups": [ { "name": "rock", "root": { "kind": "prop" } } ] }"#;
        let err = PrefabRegistry::from_json(json).unwrap_err();
        assert!(matches!(err, PrefabError::RootNotCharacter(ref n) if n == "rock"));
    }

    #[test]
    fn set_rejects_prop_root() {
        let mut registry = PrefabRegistry::builtin();
        let rock = Prefab {
            name: "rock".to_string(),
            root: PrefabNode::prop(Vec2::ZERO),
        };
        let err = registry.set(GroupTag::Small, rock).unwrap_err();
        assert!(matches!(err, PrefabError::RootNotCharacter(_)));
        assert_eq!(registry.get(GroupTag::Small), PrefabRegistry::builtin().get(GroupTag::Small));
    }

    #[test]
    fn rejects_malformed_json() {
        let err = PrefabRegistry::from_json("{ \"groups\": [ { \"kind\": 3 } ] }").unwrap_err();
        assert!(matches!(err, PrefabError::Parse(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = PrefabRegistry::load("/definitely/not/here/prefabs.json").unwrap_err();
        assert!(matches!(err, PrefabError::Io { .. }));
        assert!(err.to_string().contains("prefabs.json"));
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("groups.json");
        std::fs::write(&path, PrefabRegistry::builtin().to_json().unwrap()).unwrap();

        let registry = PrefabRegistry::load(&path).unwrap();
        assert_eq!(registry, PrefabRegistry::builtin());
    }

    #[test]
    fn instantiate_builds_nested_tree_at_position() {
        let mut world = World::new();
        let prefab = Prefab::new(
            "test",
            PrefabNode::composite(
                Vec2::ZERO,
                vec![
                    PrefabNode::leaf(Vec2::new(1.0, 0.0), 10.0),
                    PrefabNode::composite(
                        Vec2::new(0.0, 2.0),
                        vec![PrefabNode::leaf(Vec2::new(0.0, 1.0), 10.0)],
                    ),
                    PrefabNode::prop(Vec2::ZERO),
                ],
            ),
        )
        .unwrap();

        let root = prefab.instantiate(&mut world, Vec2::new(5.0, 0.0));
        assert_eq!(world.subtree_len(root), 5);

        let composite = world
            .character(root)
            .and_then(Character::as_composite)
            .unwrap();
        assert_eq!(composite.len(), 2);
        let nested = composite.get(1).unwrap();
        let nested_leaf = world.children(nested)[0];
        assert_eq!(
            world.global_translation(nested_leaf),
            Some(Vec3::new(5.0, 3.0, 0.0))
        );
    }

    #[test]
    fn every_builtin_instance_spawns_down_to_its_leafs() {
        let registry = PrefabRegistry::builtin();
        for tag in GroupTag::ALL {
            let mut world = World::new();
            let prefab = registry.get(tag).unwrap();
            let root = prefab.instantiate(&mut world, Vec2::ZERO);
            spawn_character(&mut world, root).unwrap();

            // Only released leafs remain; groups and props are gone.
            assert_eq!(world.entity_count(), prefab.root.leaf_count(), "{tag:?}");
            assert_eq!(world.characters().len(), prefab.root.leaf_count());
        }
    }

    #[test]
    fn bundled_groups_file_loads() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/assets/groups.json");
        let registry = PrefabRegistry::load(path).unwrap();
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.get(GroupTag::Small).unwrap().root.leaf_count(), 2);
        assert_eq!(registry.get(GroupTag::Large).unwrap().root.leaf_count(), 5);
    }
}
