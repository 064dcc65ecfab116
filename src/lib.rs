pub mod data;
pub mod graph;
pub mod patrol;
pub mod spatial;

use serde::{Deserialize, Serialize};

/// A point in the graph's local 2D coordinate space.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub fn new(x: f32, y: f32) -> Self {
        Vec2 { x, y }
    }

    /// Euclidean distance to `other`.
    pub fn distance(self, other: Vec2) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Manhattan (L1) distance to `other`.
    pub fn manhattan_distance(self, other: Vec2) -> f32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    /// Chebyshev (L∞) distance to `other`.
    pub fn chebyshev_distance(self, other: Vec2) -> f32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }
}
