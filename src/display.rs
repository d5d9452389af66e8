//! Display state and render batches.
//!
//! Colors and sizes live in a [`StyleSnapshot`], indexed by node and edge id
//! and kept apart from the base graph. Visibility is merged in only when the
//! snapshot is turned into paint, so a highlight restore never touches it.

use serde::Serialize;

use crate::graph::{EdgeState, NodeState};

/// Color and size of one element.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Style {
    pub color: String,
    pub size: f32,
}

impl Style {
    pub fn new(color: impl Into<String>, size: f32) -> Self {
        Self {
            color: color.into(),
            size,
        }
    }
}

/// Styles for every node and edge, indexed by id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleSnapshot {
    pub nodes: Vec<Style>,
    pub edges: Vec<Style>,
}

/// Transient display state: current styles plus per-element flags.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DisplayState {
    pub styles: StyleSnapshot,
    pub node_states: Vec<NodeState>,
    pub edge_states: Vec<EdgeState>,
}

impl DisplayState {
    /// Display state with the given resting styles and no flags set.
    pub fn new(styles: StyleSnapshot) -> Self {
        Self {
            node_states: vec![NodeState::new(); styles.nodes.len()],
            edge_states: vec![EdgeState::new(); styles.edges.len()],
            styles,
        }
    }

    /// Drop selection, hover and dim flags everywhere.
    pub fn clear_highlight(&mut self) {
        self.node_states.iter_mut().for_each(NodeState::clear_highlight);
        self.edge_states.iter_mut().for_each(EdgeState::clear_highlight);
    }

    /// Merge styles and visibility into what the sink should show.
    pub fn paint(&self) -> PaintState {
        PaintState {
            nodes: self
                .styles
                .nodes
                .iter()
                .zip(&self.node_states)
                .map(|(style, state)| Paint::from_style(style, state.is_hidden()))
                .collect(),
            edges: self
                .styles
                .edges
                .iter()
                .zip(&self.edge_states)
                .map(|(style, state)| Paint::from_style(style, state.is_hidden()))
                .collect(),
        }
    }
}

/// What the render sink has on screen for one element.
#[derive(Debug, Clone, PartialEq)]
pub struct Paint {
    pub color: String,
    pub size: f32,
    pub hidden: bool,
}

impl Paint {
    pub fn from_style(style: &Style, hidden: bool) -> Self {
        Self {
            color: style.color.clone(),
            size: style.size,
            hidden,
        }
    }
}

/// Paint for every node and edge.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaintState {
    pub nodes: Vec<Paint>,
    pub edges: Vec<Paint>,
}

/// Visual update for one node.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeUpdate {
    pub id: String,
    pub current_color: String,
    pub current_size: f32,
    pub hidden: bool,
}

/// Visual update for one edge.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeUpdate {
    pub id: String,
    pub current_color: String,
    pub current_size: f32,
    pub hidden: bool,
}

/// Updates produced by one transition. The sink repaints once per batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RenderBatch {
    pub nodes: Vec<NodeUpdate>,
    pub edges: Vec<EdgeUpdate>,
}

impl RenderBatch {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    pub fn len(&self) -> usize {
        self.nodes.len() + self.edges.len()
    }

    /// Update for a node, if the batch has one.
    pub fn node(&self, id: &str) -> Option<&NodeUpdate> {
        self.nodes.iter().find(|u| u.id == id)
    }

    /// Update for an edge, if the batch has one.
    pub fn edge(&self, id: &str) -> Option<&EdgeUpdate> {
        self.edges.iter().find(|u| u.id == id)
    }
}

/// Receives batches and repaints.
pub trait RenderSink {
    fn apply(&mut self, batch: RenderBatch);
}

/// Sink that keeps every batch it receives.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub batches: Vec<RenderBatch>,
}

impl RenderSink for RecordingSink {
    fn apply(&mut self, batch: RenderBatch) {
        self.batches.push(batch);
    }
}

/// Build a batch holding every element of `next` that differs from `prev`.
///
/// `node_key`/`edge_key` map an index to the element's source id. With an
/// empty `prev`, every element is included.
pub fn diff<'a>(
    prev: &PaintState,
    next: &PaintState,
    node_key: impl Fn(usize) -> &'a str,
    edge_key: impl Fn(usize) -> &'a str,
) -> RenderBatch {
    let nodes = next
        .nodes
        .iter()
        .enumerate()
        .filter(|(i, paint)| prev.nodes.get(*i) != Some(*paint))
        .map(|(i, paint)| NodeUpdate {
            id: node_key(i).to_string(),
            current_color: paint.color.clone(),
            current_size: paint.size,
            hidden: paint.hidden,
        })
        .collect();

    let edges = next
        .edges
        .iter()
        .enumerate()
        .filter(|(i, paint)| prev.edges.get(*i) != Some(*paint))
        .map(|(i, paint)| EdgeUpdate {
            id: edge_key(i).to_string(),
            current_color: paint.color.clone(),
            current_size: paint.size,
            hidden: paint.hidden,
        })
        .collect();

    RenderBatch { nodes, edges }
}
