use std::collections::HashSet;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::graph::node::{Connection, Node, NodeFilter, NodeId};
use crate::spatial::kd_tree::KdTree;
use crate::Vec2;

/// Optional reference frame translating between the graph's local
/// coordinates and world coordinates. Identity when a graph has none.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Frame {
    pub origin: Vec2,
    /// Rotation in radians, counter-clockwise.
    pub rotation: f32,
    pub scale: f32,
}

impl Frame {
    pub fn to_world(&self, local: Vec2) -> Vec2 {
        let (sin, cos) = self.rotation.sin_cos();
        let x = local.x * self.scale;
        let y = local.y * self.scale;
        Vec2::new(
            x * cos - y * sin + self.origin.x,
            x * sin + y * cos + self.origin.y,
        )
    }

    pub fn to_local(&self, world: Vec2) -> Vec2 {
        let (sin, cos) = self.rotation.sin_cos();
        let x = world.x - self.origin.x;
        let y = world.y - self.origin.y;
        Vec2::new(
            (x * cos + y * sin) / self.scale,
            (-x * sin + y * cos) / self.scale,
        )
    }
}

/// Navigation graph: a slot-addressed collection of nodes plus an
/// optional local↔world reference frame.
///
/// Removal tombstones a slot instead of shifting later nodes, and slots
/// are never recycled, so a `NodeId` stays valid (or permanently dead)
/// for the graph's lifetime. Scan order for queries is slot order.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct NavGraph {
    nodes: Vec<Option<Node>>,
    frame: Option<Frame>,
}

impl NavGraph {
    pub fn new() -> Self {
        NavGraph::default()
    }

    pub fn with_frame(frame: Frame) -> Self {
        NavGraph {
            nodes: Vec::new(),
            frame: Some(frame),
        }
    }

    pub fn frame(&self) -> Option<&Frame> {
        self.frame.as_ref()
    }

    pub fn set_frame(&mut self, frame: Option<Frame>) {
        self.frame = frame;
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.nodes.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index()).and_then(|slot| slot.as_ref())
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index()).and_then(|slot| slot.as_mut())
    }

    /// Live nodes in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|n| (NodeId(i as u32), n)))
    }

    /// Adds a node at `position`, active and non-extreme.
    pub fn add_node(&mut self, position: Vec2) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Some(Node::new(position)));
        id
    }

    /// Adds the directed connection `from`→`to`. A second connection to
    /// the same destination is a no-op. Unknown endpoints are refused
    /// with a warning. Returns whether a connection was created.
    pub fn connect(&mut self, from: NodeId, to: NodeId) -> bool {
        if self.node(to).is_none() {
            warn!("connect: unknown destination node {:?}", to);
            return false;
        }
        let Some(node) = self.node_mut(from) else {
            warn!("connect: unknown source node {:?}", from);
            return false;
        };
        if node.connection_to(to).is_some() {
            return false;
        }
        node.connections.push(Connection {
            from,
            to,
            active: true,
        });
        true
    }

    /// Wires `a` and `b` in both directions. Returns whether any
    /// connection was created.
    pub fn connect_both(&mut self, a: NodeId, b: NodeId) -> bool {
        let forward = self.connect(a, b);
        let backward = self.connect(b, a);
        forward || backward
    }

    /// Tombstones the node and removes every connection referencing it,
    /// incoming as well as outgoing.
    pub fn remove_node(&mut self, id: NodeId) -> bool {
        match self.nodes.get_mut(id.index()) {
            Some(slot) if slot.is_some() => *slot = None,
            _ => return false,
        }
        for node in self.nodes.iter_mut().flatten() {
            node.connections.retain(|c| c.to != id);
        }
        true
    }

    /// Drops connections whose destination slot is dead. Returns the
    /// number removed.
    pub fn prune_dangling_connections(&mut self) -> usize {
        let live: HashSet<NodeId> = self.iter().map(|(id, _)| id).collect();
        let mut removed = 0;
        for node in self.nodes.iter_mut().flatten() {
            let before = node.connections.len();
            node.connections.retain(|c| live.contains(&c.to));
            removed += before - node.connections.len();
        }
        removed
    }

    /// Removes live nodes with no outgoing connections and no incoming
    /// connections from any live node. Returns the number removed.
    pub fn remove_orphan_nodes(&mut self) -> usize {
        let mut incoming: HashSet<NodeId> = HashSet::new();
        for (_, node) in self.iter() {
            for c in &node.connections {
                incoming.insert(c.to);
            }
        }
        let orphans: Vec<NodeId> = self
            .iter()
            .filter(|(id, node)| node.connections.is_empty() && !incoming.contains(id))
            .map(|(id, _)| id)
            .collect();
        for &id in &orphans {
            self.remove_node(id);
        }
        orphans.len()
    }

    /// Wires every pair of live nodes within `radius` of each other in
    /// both directions, k-d-tree assisted. Returns the number of
    /// connections created (existing ones are left alone).
    pub fn link_within_radius(&mut self, radius: f32) -> usize {
        let live: Vec<(NodeId, Vec2)> = self.iter().map(|(id, n)| (id, n.position)).collect();
        if live.len() < 2 {
            return 0;
        }
        let points: Vec<Vec2> = live.iter().map(|&(_, p)| p).collect();
        let tree = KdTree::build(&points);
        let mut created = 0;
        for (i, &(id, position)) in live.iter().enumerate() {
            for (j, _) in tree.nearest_n_within_radius(position, radius, points.len()) {
                if j == i {
                    continue;
                }
                let other = live[j].0;
                if self.connect(id, other) {
                    created += 1;
                }
                if self.connect(other, id) {
                    created += 1;
                }
            }
        }
        created
    }

    pub fn set_node_active(&mut self, id: NodeId, active: bool) -> bool {
        match self.node_mut(id) {
            Some(node) => {
                node.active = active;
                true
            }
            None => false,
        }
    }

    pub fn set_node_extreme(&mut self, id: NodeId, extreme: bool) -> bool {
        match self.node_mut(id) {
            Some(node) => {
                node.extreme = extreme;
                true
            }
            None => false,
        }
    }

    pub fn set_connection_active(&mut self, from: NodeId, to: NodeId, active: bool) -> bool {
        let Some(node) = self.node_mut(from) else {
            return false;
        };
        match node.connections.iter_mut().find(|c| c.to == to) {
            Some(c) => {
                c.active = active;
                true
            }
            None => false,
        }
    }

    /// The node closest to `position` among those `filter` admits, by
    /// linear scan in slot order (ties keep the first encountered).
    /// `max_distance == 0.0` means unbounded; otherwise nodes strictly
    /// farther than `max_distance` are excluded.
    pub fn closest_node(
        &self,
        position: Vec2,
        max_distance: f32,
        filter: NodeFilter,
    ) -> Option<NodeId> {
        let mut best: Option<(NodeId, f32)> = None;
        for (id, node) in self.iter() {
            if !filter.admits(node) {
                continue;
            }
            let d = node.position.distance(position);
            if max_distance != 0.0 && d > max_distance {
                continue;
            }
            match best {
                Some((_, best_d)) if d >= best_d => {}
                _ => best = Some((id, d)),
            }
        }
        best.map(|(id, _)| id)
    }

    /// Removes nodes occupying a position already held by a lower slot,
    /// keeping the lowest-slot occurrence. Returns the number removed.
    /// Idempotent.
    pub fn dedup_positions(&mut self) -> usize {
        let mut seen: HashSet<(u32, u32)> = HashSet::new();
        let mut duplicates: Vec<NodeId> = Vec::new();
        for (id, node) in self.iter() {
            if !seen.insert(position_key(node.position)) {
                duplicates.push(id);
            }
        }
        for &id in &duplicates {
            self.remove_node(id);
        }
        duplicates.len()
    }

    /// Euclidean length of a connection, derived from the endpoint
    /// positions. `None` if either endpoint is dead.
    pub fn connection_distance(&self, conn: &Connection) -> Option<f32> {
        let from = self.node(conn.from)?;
        let to = self.node(conn.to)?;
        Some(from.position.distance(to.position))
    }

    /// True only when both endpoints are live and flagged extreme: the
    /// connection crosses between islands via a special transition.
    pub fn connection_is_extreme(&self, conn: &Connection) -> bool {
        matches!(
            (self.node(conn.from), self.node(conn.to)),
            (Some(a), Some(b)) if a.extreme && b.extreme
        )
    }

    pub fn to_world(&self, local: Vec2) -> Vec2 {
        match &self.frame {
            Some(frame) => frame.to_world(local),
            None => local,
        }
    }

    pub fn to_local(&self, world: Vec2) -> Vec2 {
        match &self.frame {
            Some(frame) => frame.to_local(world),
            None => world,
        }
    }

    pub fn node_world_position(&self, id: NodeId) -> Option<Vec2> {
        self.node(id).map(|n| self.to_world(n.position))
    }
}

// 0.0 and -0.0 must collide.
fn position_key(p: Vec2) -> (u32, u32) {
    let bits = |v: f32| if v == 0.0 { 0.0_f32.to_bits() } else { v.to_bits() };
    (bits(p.x), bits(p.y))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_graph() -> (NavGraph, NodeId, NodeId, NodeId) {
        let mut g = NavGraph::new();
        let a = g.add_node(Vec2::new(0.0, 0.0));
        let b = g.add_node(Vec2::new(1.0, 0.0));
        let c = g.add_node(Vec2::new(2.0, 0.0));
        g.connect_both(a, b);
        g.connect_both(b, c);
        (g, a, b, c)
    }

    #[test]
    fn duplicate_connect_is_a_no_op() {
        let (mut g, a, b, _) = line_graph();
        assert!(!g.connect(a, b));
        let outgoing = &g.node(a).unwrap().connections;
        assert_eq!(outgoing.len(), 1);
        assert_eq!(outgoing[0].to, b);
    }

    #[test]
    fn connect_unknown_node_is_refused() {
        let (mut g, a, _, _) = line_graph();
        assert!(!g.connect(a, NodeId(99)));
        assert!(!g.connect(NodeId(99), a));
        assert_eq!(g.node(a).unwrap().connections.len(), 1);
    }

    #[test]
    fn remove_node_cleans_incoming_connections() {
        let (mut g, a, b, c) = line_graph();
        assert!(g.remove_node(b));
        assert!(g.node(b).is_none());
        assert!(g.node(a).unwrap().connections.is_empty());
        assert!(g.node(c).unwrap().connections.is_empty());
        assert_eq!(g.len(), 2);
        // the slot stays dead
        assert!(!g.remove_node(b));
    }

    #[test]
    fn closest_node_respects_filter_and_radius() {
        let (mut g, a, b, _) = line_graph();
        let probe = Vec2::new(0.9, 0.0);
        assert_eq!(g.closest_node(probe, 0.0, NodeFilter::Active), Some(b));
        g.set_node_active(b, false);
        assert_eq!(g.closest_node(probe, 0.0, NodeFilter::Active), Some(a));
        assert_eq!(g.closest_node(probe, 0.0, NodeFilter::Inactive), Some(b));
        assert_eq!(g.closest_node(probe, 0.05, NodeFilter::Any), None);
    }

    #[test]
    fn closest_node_tie_keeps_first_in_scan_order() {
        let mut g = NavGraph::new();
        let a = g.add_node(Vec2::new(1.0, 0.0));
        let _b = g.add_node(Vec2::new(-1.0, 0.0));
        assert_eq!(
            g.closest_node(Vec2::new(0.0, 0.0), 0.0, NodeFilter::Any),
            Some(a)
        );
    }

    #[test]
    fn dedup_keeps_lowest_slot_and_is_idempotent() {
        let mut g = NavGraph::new();
        let a = g.add_node(Vec2::new(0.0, 0.0));
        let b = g.add_node(Vec2::new(-0.0, 0.0));
        let c = g.add_node(Vec2::new(1.0, 1.0));
        assert_eq!(g.dedup_positions(), 1);
        assert!(g.node(a).is_some());
        assert!(g.node(b).is_none());
        assert!(g.node(c).is_some());
        assert_eq!(g.dedup_positions(), 0);
    }

    #[test]
    fn remove_orphans_spares_connected_nodes() {
        let (mut g, _, _, _) = line_graph();
        let lone = g.add_node(Vec2::new(9.0, 9.0));
        assert_eq!(g.remove_orphan_nodes(), 1);
        assert!(g.node(lone).is_none());
        assert_eq!(g.len(), 3);
    }

    #[test]
    fn link_within_radius_wires_both_directions() {
        let mut g = NavGraph::new();
        let a = g.add_node(Vec2::new(0.0, 0.0));
        let b = g.add_node(Vec2::new(1.0, 0.0));
        let far = g.add_node(Vec2::new(10.0, 0.0));
        let created = g.link_within_radius(1.5);
        assert_eq!(created, 2);
        assert!(g.node(a).unwrap().connection_to(b).is_some());
        assert!(g.node(b).unwrap().connection_to(a).is_some());
        assert!(g.node(far).unwrap().connections.is_empty());
        // re-linking creates nothing new
        assert_eq!(g.link_within_radius(1.5), 0);
    }

    #[test]
    fn extreme_predicate_requires_both_endpoints() {
        let (mut g, a, b, _) = line_graph();
        let conn = *g.node(a).unwrap().connection_to(b).unwrap();
        assert!(!g.connection_is_extreme(&conn));
        g.set_node_extreme(a, true);
        assert!(!g.connection_is_extreme(&conn));
        g.set_node_extreme(b, true);
        assert!(g.connection_is_extreme(&conn));
    }

    #[test]
    fn frame_translates_world_and_local() {
        use assert_approx_eq::assert_approx_eq;

        let mut g = NavGraph::with_frame(Frame {
            origin: Vec2::new(10.0, -5.0),
            rotation: std::f32::consts::FRAC_PI_2,
            scale: 2.0,
        });
        let id = g.add_node(Vec2::new(1.0, 0.0));
        let world = g.node_world_position(id).unwrap();
        assert_approx_eq!(world.x, 10.0, 1e-5);
        assert_approx_eq!(world.y, -3.0, 1e-5);
        let back = g.to_local(world);
        assert_approx_eq!(back.x, 1.0, 1e-5);
        assert_approx_eq!(back.y, 0.0, 1e-5);
    }

    #[test]
    fn graph_without_frame_uses_identity() {
        let mut g = NavGraph::new();
        let id = g.add_node(Vec2::new(3.0, 4.0));
        assert_eq!(g.node_world_position(id), Some(Vec2::new(3.0, 4.0)));
        assert_eq!(g.to_local(Vec2::new(3.0, 4.0)), Vec2::new(3.0, 4.0));
    }

    #[test]
    fn connection_distance_is_derived_from_positions() {
        let (mut g, a, b, _) = line_graph();
        let conn = *g.node(a).unwrap().connection_to(b).unwrap();
        assert_eq!(g.connection_distance(&conn), Some(1.0));
        g.remove_node(b);
        assert_eq!(g.connection_distance(&conn), None);
    }
}
