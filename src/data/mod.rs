use std::fs;
use std::io::Cursor;
use std::path::Path;

use bincode::ErrorKind;
use log::warn;
use thiserror::Error;

use crate::graph::graph::NavGraph;

/// Compression level used when encoding graph snapshots. Snapshots are
/// written rarely and read at load time, so encoding favours size.
const GRAPH_COMPRESSION_LEVEL: i32 = 19;

#[derive(Debug, Error)]
pub enum DataError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialize(#[from] Box<ErrorKind>),
    #[error("Compression error: {0}")]
    Compression(#[source] std::io::Error),
}

pub fn serialize_graph(graph: &NavGraph) -> Result<Vec<u8>, DataError> {
    let encoded = bincode::serialize(graph)?;
    let mut cursor = Cursor::new(encoded);
    zstd::stream::encode_all(&mut cursor, GRAPH_COMPRESSION_LEVEL).map_err(DataError::Compression)
}

pub fn deserialize_graph(bytes: &[u8]) -> Result<NavGraph, DataError> {
    let mut cursor = Cursor::new(bytes);
    let decoded = zstd::stream::decode_all(&mut cursor).map_err(DataError::Compression)?;
    let mut graph: NavGraph = bincode::deserialize(&decoded)?;
    let pruned = graph.prune_dangling_connections();
    if pruned > 0 {
        warn!("graph snapshot referenced missing nodes; pruned {pruned} connections");
    }
    Ok(graph)
}

pub fn write_graph_to_file<P: AsRef<Path>>(graph: &NavGraph, path: P) -> Result<(), DataError> {
    let bytes = serialize_graph(graph)?;
    fs::write(path, bytes)?;
    Ok(())
}

pub fn read_graph_from_file<P: AsRef<Path>>(path: P) -> Result<NavGraph, DataError> {
    let bytes = fs::read(path)?;
    deserialize_graph(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::node::{NodeFilter, NodeId};
    use crate::Vec2;

    fn sample_graph() -> NavGraph {
        let mut g = NavGraph::new();
        let a = g.add_node(Vec2::new(0.0, 0.0));
        let b = g.add_node(Vec2::new(1.0, 0.0));
        let c = g.add_node(Vec2::new(2.0, 1.0));
        g.connect_both(a, b);
        g.connect_both(b, c);
        g.set_node_extreme(c, true);
        g
    }

    #[test]
    fn byte_round_trip_preserves_graph() {
        let graph = sample_graph();
        let bytes = serialize_graph(&graph).unwrap();
        let restored = deserialize_graph(&bytes).unwrap();
        assert_eq!(restored.len(), graph.len());
        let b = NodeId(1);
        assert_eq!(restored.node(b).unwrap().connections.len(), 2);
        assert!(restored.node(NodeId(2)).unwrap().extreme);
        assert_eq!(
            restored.closest_node(Vec2::new(0.9, 0.0), 0.0, NodeFilter::Active),
            Some(b)
        );
    }

    #[test]
    fn corrupted_bytes_surface_an_error() {
        let graph = sample_graph();
        let mut bytes = serialize_graph(&graph).unwrap();
        bytes.truncate(bytes.len() / 2);
        assert!(deserialize_graph(&bytes).is_err());
        assert!(deserialize_graph(b"not a snapshot").is_err());
    }

    #[test]
    fn loading_prunes_connections_to_missing_nodes() {
        // a snapshot whose node 0 points at a dead slot, built through
        // the serde surface since the editing API never produces one
        let raw = serde_json::json!({
            "nodes": [
                {
                    "position": { "x": 0.0, "y": 0.0 },
                    "active": true,
                    "extreme": false,
                    "connections": [
                        { "from": 0, "to": 1, "active": true },
                        { "from": 0, "to": 5, "active": true }
                    ]
                },
                {
                    "position": { "x": 1.0, "y": 0.0 },
                    "active": true,
                    "extreme": false,
                    "connections": []
                }
            ],
            "frame": null
        });
        let broken: NavGraph = serde_json::from_value(raw).unwrap();
        let bytes = serialize_graph(&broken).unwrap();
        let restored = deserialize_graph(&bytes).unwrap();
        let connections = &restored.node(NodeId(0)).unwrap().connections;
        assert_eq!(connections.len(), 1);
        assert_eq!(connections[0].to, NodeId(1));
    }
}
