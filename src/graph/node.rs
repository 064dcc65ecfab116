use serde::{Deserialize, Serialize};

use crate::Vec2;

/// Identifier of a node slot in a navigation graph.
///
/// Slots are tombstoned on removal and never recycled, so an id either
/// names the node it was issued for or is permanently dead.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// Which nodes a query considers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeFilter {
    /// Only nodes currently flagged active.
    Active,
    /// Only nodes currently flagged inactive.
    Inactive,
    /// Every live node, regardless of flags.
    Any,
}

impl NodeFilter {
    pub(crate) fn admits(self, node: &Node) -> bool {
        match self {
            NodeFilter::Active => node.active,
            NodeFilter::Inactive => !node.active,
            NodeFilter::Any => true,
        }
    }
}

/// A directed edge between two nodes.
///
/// The edge length is not stored; it is derived from the endpoint
/// positions on demand (`NavGraph::connection_distance`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    pub from: NodeId,
    pub to: NodeId,
    /// Toggled at runtime to exclude the edge from pathfinding without
    /// deleting it. Independent of the endpoints' own flags.
    pub active: bool,
}

/// A waypoint in the navigation graph.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Node {
    /// Position in the graph's local coordinate space.
    pub position: Vec2,
    /// Inactive nodes are invisible to pathfinding and active-only queries.
    pub active: bool,
    /// Marks the boundary of a traversable island. A connection whose
    /// endpoints are both extreme represents a special transition (a
    /// jump arc) rather than ordinary walking.
    pub extreme: bool,
    /// Outgoing connections in insertion order. Never holds two
    /// connections to the same destination.
    pub connections: Vec<Connection>,
}

impl Node {
    pub(crate) fn new(position: Vec2) -> Self {
        Node {
            position,
            active: true,
            extreme: false,
            connections: Vec::new(),
        }
    }

    /// The outgoing connection to `to`, if one exists.
    pub fn connection_to(&self, to: NodeId) -> Option<&Connection> {
        self.connections.iter().find(|c| c.to == to)
    }
}
