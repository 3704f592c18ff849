//! # Scene Storage
//!
//! A small entity store: generational handles, one node per
//! entity (transform, hierarchy links, optional character) and typed
//! singleton resources.
//!
//! - [`entity`]: Generational entity IDs
//! - [`world`]: Nodes and resources
//! - [`hierarchy`]: Parent/child links, world-space positions, recursive despawn
//! - [`system`]: System trait and schedule runner

pub mod entity;
pub mod hierarchy;
pub mod system;
pub mod world;

pub use entity::Entity;
pub use system::{Schedule, System};
pub use world::World;
