use serde::{Deserialize, Serialize};

use crate::Vec2;

/// Node in a 2D k-d tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KdNode {
    pub point: Vec2,
    pub index: usize,
    pub axis: usize,
    pub left: Option<Box<KdNode>>,
    pub right: Option<Box<KdNode>>,
}

/// Simple 2D k-d tree supporting N-nearest-within-radius queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KdTree {
    pub root: Option<Box<KdNode>>,
}

fn axis_value(point: Vec2, axis: usize) -> f32 {
    if axis == 0 {
        point.x
    } else {
        point.y
    }
}

impl KdTree {
    pub fn build(points: &[Vec2]) -> Self {
        let mut indices: Vec<usize> = (0..points.len()).collect();
        let root = Self::build_recursive(points, &mut indices, 0);
        KdTree { root }
    }

    fn build_recursive(points: &[Vec2], idx: &mut [usize], depth: usize) -> Option<Box<KdNode>> {
        if idx.is_empty() {
            return None;
        }

        let axis = depth % 2;
        idx.sort_by(|&a, &b| axis_value(points[a], axis).total_cmp(&axis_value(points[b], axis)));
        let mid = idx.len() / 2;
        let median = idx[mid];

        Some(Box::new(KdNode {
            point: points[median],
            index: median,
            axis,
            left: Self::build_recursive(points, &mut idx[..mid], depth + 1),
            right: Self::build_recursive(points, &mut idx[mid + 1..], depth + 1),
        }))
    }

    /// Returns up to `n` nearest neighbours within the given radius of
    /// the target point, ascending by distance.
    pub fn nearest_n_within_radius(&self, target: Vec2, radius: f32, n: usize) -> Vec<(usize, f32)> {
        let mut results = Vec::new();
        let radius2 = radius * radius;
        self.search_recursive(&self.root, target, radius2, &mut results);
        results.sort_by(|a, b| a.1.total_cmp(&b.1));
        results.truncate(n);
        results
    }

    #[allow(clippy::only_used_in_recursion)]
    fn search_recursive(
        &self,
        node: &Option<Box<KdNode>>,
        target: Vec2,
        radius2: f32,
        results: &mut Vec<(usize, f32)>,
    ) {
        if let Some(noderef) = node {
            let dx = noderef.point.x - target.x;
            let dy = noderef.point.y - target.y;
            let dist2 = dx * dx + dy * dy;
            if dist2 <= radius2 {
                results.push((noderef.index, dist2.sqrt()));
            }

            let delta = axis_value(target, noderef.axis) - axis_value(noderef.point, noderef.axis);
            let (first, second) = if delta < 0.0 {
                (&noderef.left, &noderef.right)
            } else {
                (&noderef.right, &noderef.left)
            };

            self.search_recursive(first, target, radius2, results);
            if delta * delta <= radius2 {
                self.search_recursive(second, target, radius2, results);
            }
        }
    }
}
