//! Axis-aligned box helpers shared by the collision, pickup and sword systems.

use crate::components::{Collider, Position};
use serde::{Deserialize, Serialize};

/// Axis-aligned box, top-left origin.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Aabb {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Aabb {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn from_parts(pos: &Position, collider: &Collider) -> Self {
        Self::new(pos.x, pos.y, collider.w, collider.h)
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.w / 2.0
    }

    pub fn center_y(&self) -> f32 {
        self.y + self.h / 2.0
    }

    /// Strict overlap: boxes that only touch along an edge do not overlap.
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }

    /// Horizontal penetration depth. Only meaningful when the boxes overlap.
    pub fn horizontal_overlap(&self, other: &Aabb) -> f32 {
        let into_other = self.right() - other.x;
        let into_self = other.right() - self.x;
        into_other.min(into_self)
    }

    /// Grow the box by `margin` on every side.
    pub fn expanded(&self, margin: f32) -> Self {
        Self::new(
            self.x - margin,
            self.y - margin,
            self.w + margin * 2.0,
            self.h + margin * 2.0,
        )
    }

    pub fn center_distance(&self, other: &Aabb) -> f32 {
        let dx = other.center_x() - self.center_x();
        let dy = other.center_y() - self.center_y();
        dx.hypot(dy)
    }
}
