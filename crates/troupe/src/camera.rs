//! Orthographic 2D camera for turning the cursor into an aim point.
//!
//! The viewport center maps to the camera position; screen Y grows down,
//! world Y grows up.

use serde::{Deserialize, Serialize};

use crate::input::CursorPosition;
use crate::math::Vec2;

/// The active 2D camera. Stored as a resource.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Camera2d {
    /// World-space point at the center of the viewport.
    pub position: Vec2,
    /// Viewport size in pixels.
    pub viewport: Vec2,
    /// Screen pixels per world unit.
    pub pixels_per_unit: f32,
}

impl Camera2d {
    /// Project a cursor position onto the world plane.
    pub fn viewport_to_world(&self, cursor: CursorPosition) -> Vec2 {
        let half = self.viewport / 2.0;
        let x = (cursor.x - half.x) / self.pixels_per_unit;
        let y = -(cursor.y - half.y) / self.pixels_per_unit;
        self.position + Vec2::new(x, y)
    }
}

impl Default for Camera2d {
    /// 1280×720 showing 20 world units vertically.
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            viewport: Vec2::new(1280.0, 720.0),
            pixels_per_unit: 36.0,
        }
    }
}
