use std::collections::{HashMap, HashSet};

use crate::graph::graph::NavGraph;
use crate::graph::node::{Connection, NodeFilter, NodeId};
use crate::graph::queue::SearchQueue;
use crate::Vec2;

/// Remaining-distance estimate guiding the search toward a target.
///
/// Only `Euclidean` and `None` are admissible for Euclidean edge
/// weights; `Manhattan` and `Chebyshev` are caller options for
/// grid-constrained movement and are not validated here.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Heuristic {
    #[default]
    None,
    Euclidean,
    Manhattan,
    Chebyshev,
}

impl Heuristic {
    fn estimate(self, from: Vec2, to: Vec2) -> f32 {
        match self {
            Heuristic::None => 0.0,
            Heuristic::Euclidean => from.distance(to),
            Heuristic::Manhattan => from.manhattan_distance(to),
            Heuristic::Chebyshev => from.chebyshev_distance(to),
        }
    }
}

/// Shortest-path tree produced by a single-source search: for every
/// reached node, the connection it was reached through and its tentative
/// travel distance from the source.
#[derive(Clone, Debug, Default)]
pub struct PathTree {
    source: Option<NodeId>,
    previous: HashMap<NodeId, Connection>,
    distances: HashMap<NodeId, f32>,
}

impl PathTree {
    /// Whether the search reached `id` at all. True for the source of a
    /// non-empty search.
    pub fn reached(&self, id: NodeId) -> bool {
        self.distances.contains_key(&id)
    }

    /// Travel distance from the source, `None` if `id` was not reached.
    pub fn distance_to(&self, id: NodeId) -> Option<f32> {
        self.distances.get(&id).copied()
    }

    /// The connection `id` was reached through. `None` for the source
    /// and for unreached nodes.
    pub fn previous(&self, id: NodeId) -> Option<&Connection> {
        self.previous.get(&id)
    }

    /// The ordered connection chain from the source to `target`, rebuilt
    /// by walking the previous-edge map backward. Empty when `target`
    /// was not reached or equals the source.
    pub fn path_to(&self, target: NodeId) -> Vec<Connection> {
        let mut path = Vec::new();
        let mut current = target;
        // the walk can take at most one hop per recorded edge
        let mut budget = self.previous.len();
        while let Some(&conn) = self.previous.get(&current) {
            if budget == 0 {
                debug_assert!(false, "previous-edge map contains a cycle");
                return Vec::new();
            }
            budget -= 1;
            path.push(conn);
            current = conn.from;
        }
        if Some(current) != self.source {
            return Vec::new();
        }
        path.reverse();
        path
    }
}

/// Single-source shortest-path search (Dijkstra, A* when a heuristic
/// other than `None` is chosen and a target is given).
///
/// A source that is not live in the graph yields an empty tree. Without
/// a target the heuristic weight is zero and the whole reachable graph
/// is explored. Inactive connections and inactive destination nodes are
/// treated as absent; the source itself is not filtered by its flag.
/// The search stops early only when the target is popped as the current
/// minimum, so the returned path is optimal whenever the heuristic is
/// admissible.
pub fn shortest_path_tree(
    graph: &NavGraph,
    source: NodeId,
    target: Option<NodeId>,
    heuristic: Heuristic,
) -> PathTree {
    let Some(source_node) = graph.node(source) else {
        return PathTree::default();
    };
    let target_position = target.and_then(|t| graph.node(t)).map(|n| n.position);
    let estimate = |position: Vec2| {
        target_position.map_or(0.0, |goal| heuristic.estimate(position, goal))
    };

    let mut tree = PathTree {
        source: Some(source),
        ..PathTree::default()
    };
    let mut visited: HashSet<NodeId> = HashSet::new();
    let mut open = SearchQueue::new();

    tree.distances.insert(source, 0.0);
    open.push(source, estimate(source_node.position));

    while let Some(current) = open.pop() {
        if !visited.insert(current) {
            // stale duplicate of an already-settled node
            continue;
        }
        if target == Some(current) {
            break;
        }
        let Some(node) = graph.node(current) else {
            continue;
        };
        let current_distance = tree.distances.get(&current).copied().unwrap_or(f32::INFINITY);

        for conn in &node.connections {
            if !conn.active || visited.contains(&conn.to) {
                continue;
            }
            let Some(next) = graph.node(conn.to) else {
                continue;
            };
            if !next.active {
                continue;
            }
            let tentative = current_distance + node.position.distance(next.position);
            let known = tree.distances.get(&conn.to).copied().unwrap_or(f32::INFINITY);
            if tentative < known {
                tree.distances.insert(conn.to, tentative);
                tree.previous.insert(conn.to, *conn);
                open.push(conn.to, tentative + estimate(next.position));
            }
        }
    }

    tree
}

/// Path between the active nodes closest to two positions. Empty when
/// either position snaps to no node or no route exists.
pub fn find_path(graph: &NavGraph, from: Vec2, to: Vec2, heuristic: Heuristic) -> Vec<Connection> {
    let Some(source) = graph.closest_node(from, 0.0, NodeFilter::Active) else {
        return Vec::new();
    };
    let Some(target) = graph.closest_node(to, 0.0, NodeFilter::Active) else {
        return Vec::new();
    };
    shortest_path_tree(graph, source, Some(target), heuristic).path_to(target)
}

/// Path from the active node closest to `from` to a specific node,
/// with the total travel distance. `f32::INFINITY` when no path exists.
pub fn find_path_to_node(
    graph: &NavGraph,
    from: Vec2,
    target: NodeId,
    heuristic: Heuristic,
) -> (Vec<Connection>, f32) {
    let Some(source) = graph.closest_node(from, 0.0, NodeFilter::Active) else {
        return (Vec::new(), f32::INFINITY);
    };
    let tree = shortest_path_tree(graph, source, Some(target), heuristic);
    let distance = tree.distance_to(target).unwrap_or(f32::INFINITY);
    (tree.path_to(target), distance)
}
