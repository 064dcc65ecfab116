pub mod graph;
pub mod node;
pub mod pathfinder;
pub mod queue;
