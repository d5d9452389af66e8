//! Edge type and related structures.
//!
//! Edges are the authorship, affiliation and citation links. Each edge has:
//! - A stable internal identifier
//! - Source and target node IDs (both resolved at load time)
//! - A base size from the data source

use serde::Deserialize;

use super::node::NodeId;

/// Stable edge identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeId(pub u32);

impl EdgeId {
    /// Position in per-edge buffers.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Edge state flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EdgeState {
    flags: u8,
}

impl EdgeState {
    const HIDDEN: u8 = 0b0000_0001;
    const HIGHLIGHTED: u8 = 0b0000_0010;
    const DIMMED: u8 = 0b0000_0100;

    /// Create a new default edge state.
    #[inline]
    pub fn new() -> Self {
        Self { flags: 0 }
    }

    /// Check if the edge is hidden (an endpoint is filtered out).
    #[inline]
    pub fn is_hidden(self) -> bool {
        self.flags & Self::HIDDEN != 0
    }

    /// Set the hidden state.
    #[inline]
    pub fn set_hidden(&mut self, hidden: bool) {
        self.set(Self::HIDDEN, hidden);
    }

    /// Check if the edge touches the focused node.
    #[inline]
    pub fn is_highlighted(self) -> bool {
        self.flags & Self::HIGHLIGHTED != 0
    }

    /// Set the highlighted state.
    #[inline]
    pub fn set_highlighted(&mut self, highlighted: bool) {
        self.set(Self::HIGHLIGHTED, highlighted);
    }

    /// Check if the edge is muted by a highlight elsewhere.
    #[inline]
    pub fn is_dimmed(self) -> bool {
        self.flags & Self::DIMMED != 0
    }

    /// Set the dimmed state.
    #[inline]
    pub fn set_dimmed(&mut self, dimmed: bool) {
        self.set(Self::DIMMED, dimmed);
    }

    /// Drop every highlight flag, keeping visibility.
    #[inline]
    pub fn clear_highlight(&mut self) {
        self.flags &= Self::HIDDEN;
    }

    #[inline]
    fn set(&mut self, bit: u8, on: bool) {
        if on {
            self.flags |= bit;
        } else {
            self.flags &= !bit;
        }
    }
}

/// An edge as it arrives from the data source.
#[derive(Debug, Clone, Deserialize)]
pub struct RawEdge {
    #[serde(default)]
    pub id: Option<String>,
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub size: Option<f32>,
}

impl RawEdge {
    /// Edge with an explicit id and default size.
    pub fn new(id: impl Into<String>, source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            source: source.into(),
            target: target.into(),
            size: None,
        }
    }
}

/// Immutable edge data held by the graph engine.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeRecord {
    pub key: String,
    pub source: NodeId,
    pub target: NodeId,
    pub size: f32,
}

impl EdgeRecord {
    /// Whether `node` is one of this edge's endpoints.
    #[inline]
    pub fn touches(&self, node: NodeId) -> bool {
        self.source == node || self.target == node
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_id() {
        assert_eq!(EdgeId(42).index(), 42);
    }

    #[test]
    fn test_edge_state() {
        let mut state = EdgeState::new();
        assert!(!state.is_hidden());
        assert!(!state.is_highlighted());

        state.set_highlighted(true);
        state.set_hidden(true);
        assert!(state.is_highlighted());

        state.clear_highlight();
        assert!(!state.is_highlighted());
        assert!(state.is_hidden());
    }

    #[test]
    fn test_raw_edge_without_id() {
        let raw: RawEdge =
            serde_json::from_str(r#"{"source": "author_a", "target": "paper_1"}"#).unwrap();
        assert!(raw.id.is_none());
        assert!(raw.size.is_none());
    }

    #[test]
    fn test_touches() {
        let edge = EdgeRecord {
            key: "e0".to_string(),
            source: NodeId(1),
            target: NodeId(2),
            size: 1.0,
        };
        assert!(edge.touches(NodeId(1)));
        assert!(edge.touches(NodeId(2)));
        assert!(!edge.touches(NodeId(3)));
    }
}
