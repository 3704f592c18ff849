//! # Troupe: Placeable Character Groups
//!
//! Units and nested groups of units share one interface: a group is a
//! composite of characters, a unit is a leaf. A placer keeps a preview of
//! the selected group under the cursor; placing it releases every unit in
//! the group, and each unit rises until it leaves the play area.
//!
//! Start with `use troupe::prelude::*` and build an [`App`](app::App).

pub mod app;
pub mod camera;
pub mod character;
pub mod config;
pub mod diag;
pub mod ecs;
pub mod input;
pub mod math;
pub mod placer;
pub mod prefab;
pub mod prelude;
pub mod time;
