//! Base graph data structures.
//!
//! This module holds the immutable side of a loaded atlas: node and edge
//! records, petgraph topology for neighbor queries, and SoA position buffers
//! for picking. Display state never lives here.

mod edge;
mod engine;
mod node;

pub use edge::{EdgeId, EdgeRecord, EdgeState, RawEdge};
pub use engine::{GraphData, GraphEngine};
pub use node::{infer_type, NodeId, NodeRecord, NodeState, RawNode, UNKNOWN_TYPE};
