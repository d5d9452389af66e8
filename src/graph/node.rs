//! Node type and related structures.
//!
//! Nodes are the papers, authors and organizations of the atlas. Each node has:
//! - A stable internal identifier (dense index into the engine's buffers)
//! - The string id from the data source, a label and a category type
//! - A graph-space position used for picking
//! - Any extra attributes from the source, kept in input order

use std::fmt;

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

/// Type assigned to nodes whose type cannot be determined.
pub const UNKNOWN_TYPE: &str = "unknown";

/// Stable node identifier.
///
/// Indexes the engine's per-node buffers. Assigned in input order and never
/// reused for the lifetime of an engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Position in per-node buffers.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({})", self.0)
    }
}

/// Node state flags packed into a single byte.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NodeState {
    flags: u8,
}

impl NodeState {
    const HIDDEN: u8 = 0b0000_0001;
    const SELECTED: u8 = 0b0000_0010;
    const HOVERED: u8 = 0b0000_0100;
    const DIMMED: u8 = 0b0000_1000;

    /// Create a new default node state.
    #[inline]
    pub fn new() -> Self {
        Self { flags: 0 }
    }

    /// Check if the node is hidden by a filter.
    #[inline]
    pub fn is_hidden(self) -> bool {
        self.flags & Self::HIDDEN != 0
    }

    /// Set the hidden state.
    #[inline]
    pub fn set_hidden(&mut self, hidden: bool) {
        self.set(Self::HIDDEN, hidden);
    }

    /// Check if the node is selected.
    #[inline]
    pub fn is_selected(self) -> bool {
        self.flags & Self::SELECTED != 0
    }

    /// Set the selected state.
    #[inline]
    pub fn set_selected(&mut self, selected: bool) {
        self.set(Self::SELECTED, selected);
    }

    /// Check if the node is hovered.
    #[inline]
    pub fn is_hovered(self) -> bool {
        self.flags & Self::HOVERED != 0
    }

    /// Set the hovered state.
    #[inline]
    pub fn set_hovered(&mut self, hovered: bool) {
        self.set(Self::HOVERED, hovered);
    }

    /// Check if the node is dimmed by a highlight elsewhere.
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

/// A node as it arrives from the data source.
#[derive(Debug, Clone, Deserialize)]
pub struct RawNode {
    pub id: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default, rename = "type")]
    pub node_type: Option<String>,
    #[serde(default)]
    pub x: Option<f32>,
    #[serde(default)]
    pub y: Option<f32>,
    /// Ignored for styling; configuration is authoritative.
    #[serde(default)]
    pub size: Option<f32>,
    /// Ignored for styling; configuration is authoritative.
    #[serde(default)]
    pub color: Option<String>,
    #[serde(flatten)]
    pub attributes: IndexMap<String, Value>,
}

impl RawNode {
    /// Minimal node with just an id and optional type.
    pub fn new(id: impl Into<String>, node_type: Option<&str>) -> Self {
        Self {
            id: id.into(),
            label: None,
            node_type: node_type.map(str::to_string),
            x: None,
            y: None,
            size: None,
            color: None,
            attributes: IndexMap::new(),
        }
    }
}

/// Immutable node data held by the graph engine.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeRecord {
    pub key: String,
    pub label: String,
    pub node_type: String,
    pub attributes: IndexMap<String, Value>,
}

impl NodeRecord {
    /// Build a record from raw input, filling the label and inferring the type.
    pub fn from_raw(raw: RawNode) -> Self {
        let node_type = match raw.node_type {
            Some(t) if !t.is_empty() => t,
            _ => infer_type(&raw.id),
        };
        let label = match raw.label {
            Some(l) if !l.is_empty() => l,
            _ => raw.id.clone(),
        };
        Self {
            key: raw.id,
            label,
            node_type,
            attributes: raw.attributes,
        }
    }

    /// Value of an attribute as used for coloring and display.
    ///
    /// `id`, `label` and `type` resolve to the record's own fields. Returns
    /// `None` for missing, null, empty and non-scalar values.
    pub fn attribute(&self, name: &str) -> Option<String> {
        let value = match name {
            "id" => return Some(self.key.clone()),
            "label" => return Some(self.label.clone()),
            "type" => return Some(self.node_type.clone()),
            _ => self.attributes.get(name)?,
        };
        match value {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }
}

/// Infer a node type from the `type_rest` id convention.
pub fn infer_type(id: &str) -> String {
    match id.split_once('_') {
        Some((prefix, _)) if !prefix.is_empty() => prefix.to_string(),
        _ => UNKNOWN_TYPE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id() {
        let id = NodeId(42);
        assert_eq!(id.index(), 42);
        assert_eq!(format!("{}", id), "Node(42)");
    }

    #[test]
    fn test_node_state_flags() {
        let mut state = NodeState::new();
        state.set_hidden(true);
        state.set_selected(true);
        state.set_dimmed(true);
        assert!(state.is_hidden());
        assert!(state.is_selected());
        assert!(!state.is_hovered());

        state.clear_highlight();
        assert!(state.is_hidden());
        assert!(!state.is_selected());
        assert!(!state.is_dimmed());
    }

    #[test]
    fn test_infer_type() {
        assert_eq!(infer_type("paper_2401.00001"), "paper");
        assert_eq!(infer_type("author_jane_doe"), "author");
        assert_eq!(infer_type("_orphan"), UNKNOWN_TYPE);
        assert_eq!(infer_type("nounderscore"), UNKNOWN_TYPE);
    }

    #[test]
    fn test_record_defaults() {
        let record = NodeRecord::from_raw(RawNode::new("organization_mit", None));
        assert_eq!(record.label, "organization_mit");
        assert_eq!(record.node_type, "organization");
    }

    #[test]
    fn test_raw_node_keeps_extra_attributes() {
        let raw: RawNode = serde_json::from_str(
            r#"{"id": "paper_1", "type": "paper", "year": 2024, "venue": "", "open": true}"#,
        )
        .unwrap();
        let record = NodeRecord::from_raw(raw);
        assert_eq!(record.attribute("year").as_deref(), Some("2024"));
        assert_eq!(record.attribute("open").as_deref(), Some("true"));
        assert_eq!(record.attribute("venue"), None);
        assert_eq!(record.attribute("missing"), None);
        assert_eq!(record.attribute("type").as_deref(), Some("paper"));
        let keys: Vec<_> = record.attributes.keys().cloned().collect();
        assert_eq!(keys, vec!["year", "venue", "open"]);
    }
}
