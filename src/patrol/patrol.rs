use crate::graph::graph::NavGraph;
use crate::graph::node::NodeId;
use crate::Vec2;

/// Greedy patrol route: starting from the active node closest to
/// `center` within `radius`, repeatedly visit the nearest unvisited
/// active node within that radius.
///
/// Returns (visit order, total leg distance). Inactive and out-of-range
/// nodes are never visited; an empty candidate set yields an empty
/// route.
pub fn greedy_patrol_route(graph: &NavGraph, center: Vec2, radius: f32) -> (Vec<NodeId>, f32) {
    let mut candidates: Vec<(NodeId, Vec2)> = graph
        .iter()
        .filter(|(_, node)| node.active && node.position.distance(center) <= radius)
        .map(|(id, node)| (id, node.position))
        .collect();

    if candidates.is_empty() {
        return (Vec::new(), 0.0);
    }

    // Start at the candidate closest to center
    candidates.sort_by(|a, b| a.1.distance(center).total_cmp(&b.1.distance(center)));

    let mut route = Vec::with_capacity(candidates.len());
    let mut total_distance = 0.0_f32;

    let (first, mut current_position) = candidates.remove(0);
    route.push(first);

    while !candidates.is_empty() {
        let mut nearest = 0;
        let mut nearest_distance = candidates[0].1.distance(current_position);
        for (i, &(_, position)) in candidates.iter().enumerate().skip(1) {
            let d = position.distance(current_position);
            if d < nearest_distance {
                nearest = i;
                nearest_distance = d;
            }
        }

        total_distance += nearest_distance;
        let (id, position) = candidates.remove(nearest);
        route.push(id);
        current_position = position;
    }

    (route, total_distance)
}
