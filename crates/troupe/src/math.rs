//! Math types and glam re-exports.
//!
//! Characters live on a 2D plane; the Z axis is carried so nodes can still
//! be layered, but placement and rising only ever touch X and Y.

pub use glam::{Vec2, Vec3};

use serde::{Deserialize, Serialize};

/// Local position of a node, relative to its parent (or to the world for
/// root nodes).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub translation: Vec3,
}

impl Transform {
    /// Transform at the origin.
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
    };

    pub fn from_xyz(x: f32, y: f32, z: f32) -> Self {
        Self {
            translation: Vec3::new(x, y, z),
        }
    }

    /// Transform at a 2D position (z = 0).
    pub fn from_xy(x: f32, y: f32) -> Self {
        Self::from_xyz(x, y, 0.0)
    }

    /// Transform at a 2D point (z = 0).
    pub fn from_vec2(position: Vec2) -> Self {
        Self::from_xy(position.x, position.y)
    }

    /// The X/Y part of the translation.
    pub fn xy(&self) -> Vec2 {
        self.translation.truncate()
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_vec2_sits_on_plane() {
        let t = Transform::from_vec2(Vec2::new(3.0, -2.0));
        assert_eq!(t.translation, Vec3::new(3.0, -2.0, 0.0));
        assert_eq!(t.xy(), Vec2::new(3.0, -2.0));
    }

    #[test]
    fn default_is_identity() {
        assert_eq!(Transform::default(), Transform::IDENTITY);
    }
}
