//! GraphEngine - Immutable base graph.
//!
//! The GraphEngine stores the atlas topology using petgraph's StableGraph,
//! the node and edge records indexed by their stable ids, and SoA position
//! buffers for picking. It is built once per loaded graph and never mutated
//! afterwards; all display state lives in the style engine.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::f32::consts::PI;

use log::{debug, warn};
use petgraph::stable_graph::{NodeIndex, StableGraph};
use petgraph::Directed;
use serde::Deserialize;

use super::edge::{EdgeId, EdgeRecord, RawEdge};
use super::node::{NodeId, NodeRecord, RawNode};
use crate::error::{EdgeEnd, StyleError, StyleResult};
use crate::spatial::SpatialIndex;

/// Radius of the circle used to place nodes that arrive without a position.
const FALLBACK_RADIUS: f32 = 100.0;

/// Graph payload from the data source.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GraphData {
    #[serde(default)]
    pub nodes: Vec<RawNode>,
    #[serde(default)]
    pub edges: Vec<RawEdge>,
}

impl GraphData {
    /// Decode a graph from JSON text.
    pub fn from_json(text: &str) -> StyleResult<Self> {
        serde_json::from_str(text).map_err(|e| StyleError::InvalidGraph(e.to_string()))
    }
}

/// The base graph.
///
/// This struct manages:
/// - Graph topology via petgraph
/// - Node and edge records in id order
/// - Position buffers in SoA layout
/// - Spatial index for picking
/// - ID mapping between source string ids and internal ids
pub struct GraphEngine {
    /// The underlying graph structure.
    /// Nodes store their stable NodeId, edges store their stable EdgeId.
    graph: StableGraph<NodeId, EdgeId, Directed>,

    /// Map from stable NodeId to petgraph NodeIndex
    node_id_to_index: HashMap<NodeId, NodeIndex>,

    /// Map from source node id to stable NodeId
    node_key_to_id: HashMap<String, NodeId>,

    /// Map from source edge id to stable EdgeId
    edge_key_to_id: HashMap<String, EdgeId>,

    nodes: Vec<NodeRecord>,

    edges: Vec<EdgeRecord>,

    /// X positions (SoA layout)
    pos_x: Vec<f32>,

    /// Y positions (SoA layout)
    pos_y: Vec<f32>,

    /// Spatial index for picking
    spatial: SpatialIndex,
}

impl GraphEngine {
    /// Create an empty graph with pre-allocated capacity.
    fn with_capacity(node_capacity: usize, edge_capacity: usize) -> Self {
        Self {
            graph: StableGraph::with_capacity(node_capacity, edge_capacity),
            node_id_to_index: HashMap::with_capacity(node_capacity),
            node_key_to_id: HashMap::with_capacity(node_capacity),
            edge_key_to_id: HashMap::with_capacity(edge_capacity),
            nodes: Vec::with_capacity(node_capacity),
            edges: Vec::with_capacity(edge_capacity),
            pos_x: Vec::with_capacity(node_capacity),
            pos_y: Vec::with_capacity(node_capacity),
            spatial: SpatialIndex::new(),
        }
    }

    /// Build the graph from a data source payload.
    ///
    /// Invalid elements (duplicate ids, edges with a missing endpoint) are
    /// skipped and reported in the returned diagnostics.
    pub fn load(data: GraphData) -> (Self, Vec<StyleError>) {
        let mut engine = Self::with_capacity(data.nodes.len(), data.edges.len());
        let mut diagnostics = Vec::new();

        let node_total = data.nodes.len();
        for (i, raw) in data.nodes.into_iter().enumerate() {
            let fallback = circle_position(i, node_total);
            if let Err(err) = engine.add_node(raw, fallback) {
                warn!("skipping node: {err}");
                diagnostics.push(err);
            }
        }

        let explicit: HashSet<String> = data.edges.iter().filter_map(|e| e.id.clone()).collect();
        for (i, raw) in data.edges.into_iter().enumerate() {
            let key = match raw.id.clone() {
                Some(key) => key,
                None => engine.generated_edge_key(i, &explicit),
            };
            if let Err(err) = engine.add_edge(raw, key) {
                warn!("skipping edge: {err}");
                diagnostics.push(err);
            }
        }

        engine.rebuild_spatial_index();
        debug!(
            "graph loaded: {} nodes, {} edges, {} diagnostics",
            engine.node_count(),
            engine.edge_count(),
            diagnostics.len()
        );
        (engine, diagnostics)
    }

    // =========================================================================
    // Construction
    // =========================================================================

    fn add_node(&mut self, raw: RawNode, fallback: (f32, f32)) -> StyleResult<NodeId> {
        if self.node_key_to_id.contains_key(&raw.id) {
            return Err(StyleError::DuplicateNode(raw.id));
        }

        let (x, y) = match (raw.x, raw.y) {
            (Some(x), Some(y)) if x.is_finite() && y.is_finite() => (x, y),
            _ => fallback,
        };

        let id = NodeId(self.nodes.len() as u32);
        let index = self.graph.add_node(id);
        self.node_id_to_index.insert(id, index);

        let record = NodeRecord::from_raw(raw);
        self.node_key_to_id.insert(record.key.clone(), id);
        self.nodes.push(record);
        self.pos_x.push(x);
        self.pos_y.push(y);
        Ok(id)
    }

    /// `e{position}`, suffixed when an explicit id or an earlier key
    /// already uses it.
    fn generated_edge_key(&self, position: usize, explicit: &HashSet<String>) -> String {
        let taken = |key: &String| explicit.contains(key) || self.edge_key_to_id.contains_key(key);
        let mut key = format!("e{position}");
        let mut suffix = 1;
        while taken(&key) {
            key = format!("e{position}_{suffix}");
            suffix += 1;
        }
        key
    }

    fn add_edge(&mut self, raw: RawEdge, key: String) -> StyleResult<EdgeId> {
        if self.edge_key_to_id.contains_key(&key) {
            return Err(StyleError::DuplicateEdge(key));
        }

        let source = self.resolve_endpoint(&key, &raw.source, EdgeEnd::Source)?;
        let target = self.resolve_endpoint(&key, &raw.target, EdgeEnd::Target)?;

        let id = EdgeId(self.edges.len() as u32);
        let source_index = self.node_id_to_index[&source];
        let target_index = self.node_id_to_index[&target];
        self.graph.add_edge(source_index, target_index, id);

        self.edge_key_to_id.insert(key.clone(), id);
        self.edges.push(EdgeRecord {
            key,
            source,
            target,
            size: raw.size.filter(|s| s.is_finite() && *s > 0.0).unwrap_or(1.0),
        });
        Ok(id)
    }

    fn resolve_endpoint(&self, edge: &str, node: &str, end: EdgeEnd) -> StyleResult<NodeId> {
        self.node_id(node)
            .ok_or_else(|| StyleError::EdgeEndpointMissing {
                edge: edge.to_string(),
                end,
                node: node.to_string(),
            })
    }

    // =========================================================================
    // Node Access
    // =========================================================================

    /// Get the number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Look up a node's stable id from its source id.
    pub fn node_id(&self, key: &str) -> Option<NodeId> {
        self.node_key_to_id.get(key).copied()
    }

    /// Get a node record.
    pub fn node(&self, id: NodeId) -> Option<&NodeRecord> {
        self.nodes.get(id.index())
    }

    /// Iterate over all nodes in id order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &NodeRecord)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, record)| (NodeId(i as u32), record))
    }

    /// Get a node's position.
    pub fn node_position(&self, id: NodeId) -> Option<(f32, f32)> {
        let i = id.index();
        Some((*self.pos_x.get(i)?, *self.pos_y.get(i)?))
    }

    /// The node plus every node sharing an edge with it, in either direction.
    pub fn neighbor_set(&self, id: NodeId) -> BTreeSet<NodeId> {
        let mut set = BTreeSet::new();
        if let Some(&index) = self.node_id_to_index.get(&id) {
            set.insert(id);
            set.extend(
                self.graph
                    .neighbors_undirected(index)
                    .filter_map(|n| self.graph.node_weight(n).copied()),
            );
        }
        set
    }

    /// Neighbors of a node, excluding the node itself, in id order.
    pub fn neighbors(&self, id: NodeId) -> Vec<NodeId> {
        self.neighbor_set(id).into_iter().filter(|&n| n != id).collect()
    }

    // =========================================================================
    // Edge Access
    // =========================================================================

    /// Get the number of edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Look up an edge's stable id from its source id.
    pub fn edge_id(&self, key: &str) -> Option<EdgeId> {
        self.edge_key_to_id.get(key).copied()
    }

    /// Get an edge record.
    pub fn edge(&self, id: EdgeId) -> Option<&EdgeRecord> {
        self.edges.get(id.index())
    }

    /// Iterate over all edges in id order.
    pub fn edges(&self) -> impl Iterator<Item = (EdgeId, &EdgeRecord)> {
        self.edges
            .iter()
            .enumerate()
            .map(|(i, record)| (EdgeId(i as u32), record))
    }

    // =========================================================================
    // Buffer Access
    // =========================================================================

    /// Get X positions slice.
    pub fn positions_x(&self) -> &[f32] {
        &self.pos_x
    }

    /// Get Y positions slice.
    pub fn positions_y(&self) -> &[f32] {
        &self.pos_y
    }

    // =========================================================================
    // Spatial Queries
    // =========================================================================

    /// Find the nearest node within `max_distance` that passes `accept`.
    pub fn find_nearest_node_within(
        &self,
        x: f32,
        y: f32,
        max_distance: f32,
        accept: impl Fn(NodeId) -> bool,
    ) -> Option<NodeId> {
        self.spatial.nearest_within(x, y, max_distance, accept)
    }

    /// Rebuild the spatial index from the position buffers.
    pub fn rebuild_spatial_index(&mut self) {
        let points: Vec<_> = (0..self.nodes.len())
            .map(|i| (NodeId(i as u32), self.pos_x[i], self.pos_y[i]))
            .collect();
        self.spatial.rebuild(&points);
    }
}

/// Deterministic placement on a circle for nodes without coordinates.
fn circle_position(i: usize, total: usize) -> (f32, f32) {
    let angle = i as f32 * 2.0 * PI / total.max(1) as f32;
    (FALLBACK_RADIUS * angle.cos(), FALLBACK_RADIUS * angle.sin())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> GraphData {
        GraphData {
            nodes: vec![
                RawNode::new("paper_1", Some("paper")),
                RawNode::new("author_a", Some("author")),
                RawNode::new("author_b", Some("author")),
                RawNode::new("organization_x", Some("organization")),
            ],
            edges: vec![
                RawEdge::new("e1", "author_a", "paper_1"),
                RawEdge::new("e2", "author_b", "paper_1"),
                RawEdge::new("e3", "author_a", "organization_x"),
            ],
        }
    }

    #[test]
    fn test_load() {
        let (engine, diagnostics) = GraphEngine::load(sample());
        assert!(diagnostics.is_empty());
        assert_eq!(engine.node_count(), 4);
        assert_eq!(engine.edge_count(), 3);
        assert_eq!(engine.node_id("author_b"), Some(NodeId(2)));
        assert_eq!(engine.edge_id("e3"), Some(EdgeId(2)));
    }

    #[test]
    fn test_neighbor_set_is_undirected_and_includes_self() {
        let (engine, _) = GraphEngine::load(sample());
        let paper = engine.node_id("paper_1").unwrap();
        let set = engine.neighbor_set(paper);
        assert_eq!(set.len(), 3);
        assert!(set.contains(&paper));
        assert!(set.contains(&engine.node_id("author_a").unwrap()));
        assert!(set.contains(&engine.node_id("author_b").unwrap()));

        assert_eq!(engine.neighbors(paper).len(), 2);
    }

    #[test]
    fn test_missing_endpoint_is_skipped() {
        let mut data = sample();
        data.edges.push(RawEdge::new("dangling", "paper_1", "paper_404"));
        data.edges.push(RawEdge::new("e4", "author_b", "organization_x"));

        let (engine, diagnostics) = GraphEngine::load(data);
        assert_eq!(engine.edge_count(), 4);
        assert!(engine.edge_id("dangling").is_none());
        assert!(engine.edge_id("e4").is_some());
        assert_eq!(
            diagnostics,
            vec![StyleError::EdgeEndpointMissing {
                edge: "dangling".to_string(),
                end: EdgeEnd::Target,
                node: "paper_404".to_string(),
            }]
        );
    }

    #[test]
    fn test_duplicates_are_skipped() {
        let mut data = sample();
        data.nodes.push(RawNode::new("paper_1", Some("author")));
        data.edges.push(RawEdge::new("e1", "author_b", "organization_x"));

        let (engine, diagnostics) = GraphEngine::load(data);
        assert_eq!(engine.node_count(), 4);
        assert_eq!(engine.edge_count(), 3);
        let paper = engine.node(engine.node_id("paper_1").unwrap()).unwrap();
        assert_eq!(paper.node_type, "paper");
        assert_eq!(diagnostics.len(), 2);
    }

    #[test]
    fn test_generated_edge_ids() {
        let data = GraphData::from_json(
            r#"{
                "nodes": [{"id": "paper_1"}, {"id": "author_a"}],
                "edges": [{"source": "author_a", "target": "paper_1"}]
            }"#,
        )
        .unwrap();
        let (engine, _) = GraphEngine::load(data);
        assert_eq!(engine.edge_id("e0"), Some(EdgeId(0)));
    }

    #[test]
    fn test_generated_edge_ids_avoid_explicit_ones() {
        let data = GraphData::from_json(
            r#"{
                "nodes": [{"id": "paper_1"}, {"id": "author_a"}, {"id": "author_b"}],
                "edges": [
                    {"source": "author_a", "target": "paper_1"},
                    {"source": "author_b", "target": "paper_1"},
                    {"id": "e0", "source": "author_b", "target": "author_a"}
                ]
            }"#,
        )
        .unwrap();
        let (engine, diagnostics) = GraphEngine::load(data);
        assert!(diagnostics.is_empty());
        assert_eq!(engine.edge_count(), 3);
        assert_eq!(engine.edge_id("e0_1"), Some(EdgeId(0)));
        assert_eq!(engine.edge_id("e1"), Some(EdgeId(1)));
        assert_eq!(engine.edge_id("e0"), Some(EdgeId(2)));
    }

    #[test]
    fn test_fallback_positions() {
        let data = GraphData::from_json(
            r#"{"nodes": [{"id": "a", "x": 3, "y": 4}, {"id": "b"}], "edges": []}"#,
        )
        .unwrap();
        let (engine, _) = GraphEngine::load(data);
        assert_eq!(engine.node_position(NodeId(0)), Some((3.0, 4.0)));

        let (x, y) = engine.node_position(NodeId(1)).unwrap();
        assert!((x + 100.0).abs() < 1e-3);
        assert!(y.abs() < 1e-3);
    }

    #[test]
    fn test_invalid_json() {
        let err = GraphData::from_json("{not json").unwrap_err();
        assert!(matches!(err, StyleError::InvalidGraph(_)));
    }

    #[test]
    fn test_find_nearest_node_within() {
        let data = GraphData::from_json(
            r#"{"nodes": [{"id": "a", "x": 0, "y": 0}, {"id": "b", "x": 2, "y": 0}]}"#,
        )
        .unwrap();
        let (engine, _) = GraphEngine::load(data);
        assert_eq!(
            engine.find_nearest_node_within(0.5, 0.0, 5.0, |_| true),
            Some(NodeId(0))
        );
        assert_eq!(
            engine.find_nearest_node_within(0.5, 0.0, 5.0, |id| id != NodeId(0)),
            Some(NodeId(1))
        );
        assert_eq!(engine.find_nearest_node_within(50.0, 50.0, 5.0, |_| true), None);
    }
}
