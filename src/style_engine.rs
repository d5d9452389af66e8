//! StyleEngine - the atlas state core.
//!
//! Owns the base graph, the style configuration, the display state and the
//! highlight state machine. Every operation finishes by diffing the display
//! against what was last painted, so the sink only ever receives the
//! elements that actually changed.

use std::collections::HashSet;

use indexmap::IndexMap;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::display::{
    self, DisplayState, PaintState, RenderBatch, RenderSink, Style, StyleSnapshot,
};
use crate::error::{StyleError, StyleResult};
use crate::graph::{EdgeId, GraphData, GraphEngine, NodeId, NodeState};
use crate::highlight::{HighlightMode, Highlighter, Transition};
use crate::style::edge_color::{self, Endpoint};
use crate::style::node_types::{self, StyleSource, DEFAULT_NODE_COLOR};
use crate::style::palette::{self, MISSING_VALUE};
use crate::style::{Legend, StyleConfig};

/// Filter value that shows every node type.
pub const ALL_TYPES: &str = "all";

/// How node base colors are chosen.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ColorMode {
    #[default]
    ByType,
    ByAttribute(String),
}

/// User interaction delivered by the render sink.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ViewEvent {
    ClickNode {
        id: String,
    },
    ClickStage,
    HoverEnter {
        id: String,
    },
    HoverLeave,
    ColorBy {
        attribute: String,
    },
    ColorByType,
    FilterType {
        #[serde(default, rename = "type")]
        node_type: Option<String>,
    },
}

/// One entry of a node's neighbor list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NeighborInfo {
    pub id: String,
    pub label: String,
}

/// Data for the external detail panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeDetails {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub node_type: String,
    pub attributes: IndexMap<String, Value>,
    pub neighbors: Vec<NeighborInfo>,
}

/// The style engine for one loaded graph.
pub struct StyleEngine {
    graph: GraphEngine,
    config: StyleConfig,
    display: DisplayState,
    highlighter: Highlighter,
    color_mode: ColorMode,
    legend: Legend,
    type_filter: Option<String>,

    /// What the sink was last handed.
    painted: PaintState,

    diagnostics: Vec<StyleError>,

    /// Types already reported as having no style anywhere.
    missing_types: HashSet<String>,
}

impl StyleEngine {
    /// Load a graph and compute its resting styles.
    ///
    /// Invalid elements are skipped and kept in [`StyleEngine::diagnostics`].
    /// When the configuration names a `defaultColorAttribute`, nodes start
    /// out colored by that attribute.
    pub fn new(data: GraphData, config: StyleConfig) -> Self {
        let (graph, diagnostics) = GraphEngine::load(data);
        let mut engine = Self {
            graph,
            config: config.normalized(),
            display: DisplayState::default(),
            highlighter: Highlighter::new(),
            color_mode: ColorMode::ByType,
            legend: Legend::default(),
            type_filter: None,
            painted: PaintState::default(),
            diagnostics,
            missing_types: HashSet::new(),
        };

        let nodes = engine.type_styles();
        let edges = derive_edge_styles(&engine.graph, &nodes);
        engine.display = DisplayState::new(StyleSnapshot { nodes, edges });
        engine.legend = Legend::for_types(&engine.config);

        if let Some(attribute) = engine.config.default_color_attribute.clone() {
            engine.color_by_attribute(&attribute);
        }

        engine.painted = engine.display.paint();
        info!(
            "style engine ready: {} nodes, {} edges",
            engine.graph.node_count(),
            engine.graph.edge_count()
        );
        engine
    }

    /// Load from JSON text.
    pub fn from_json(graph: &str, config: &str) -> StyleResult<Self> {
        let data = GraphData::from_json(graph)?;
        let config = StyleConfig::from_json(config)?;
        Ok(Self::new(data, config))
    }

    // =========================================================================
    // Coloring
    // =========================================================================

    /// Switch to type-based coloring and recompute every base style.
    pub fn apply_type_styles(&mut self) -> RenderBatch {
        let nodes = self.type_styles();
        self.color_mode = ColorMode::ByType;
        self.legend = Legend::for_types(&self.config);
        self.rebase(nodes)
    }

    /// Color nodes by the values of `attribute`.
    ///
    /// Sizes stay as type styling set them. The legend is replaced by the
    /// value to color map.
    pub fn color_by_attribute(&mut self, attribute: &str) -> RenderBatch {
        let values: Vec<String> = self
            .graph
            .nodes()
            .map(|(_, node)| {
                node.attribute(attribute)
                    .unwrap_or_else(|| MISSING_VALUE.to_string())
            })
            .collect();
        let palette = palette::effective_palette(self.config.color_palette.as_deref());
        let colors = palette::assign(values.iter().cloned().map(Some), &palette);
        debug!(
            "coloring by {attribute}: {} distinct values",
            colors.len()
        );

        let nodes = self
            .type_styles()
            .into_iter()
            .zip(&values)
            .map(|(style, value)| {
                let color = colors.get(value).map_or(DEFAULT_NODE_COLOR, String::as_str);
                Style::new(color, style.size)
            })
            .collect();

        self.color_mode = ColorMode::ByAttribute(attribute.to_string());
        self.legend = Legend::from_assignments(&colors);
        self.rebase(nodes)
    }

    pub fn color_mode(&self) -> &ColorMode {
        &self.color_mode
    }

    pub fn legend(&self) -> &Legend {
        &self.legend
    }

    // =========================================================================
    // Highlight
    // =========================================================================

    /// Select a node, dimming everything outside its neighborhood.
    pub fn select(&mut self, key: &str) -> StyleResult<RenderBatch> {
        let id = self.resolve(key)?;
        Ok(self.transition(Transition::Select(id)))
    }

    /// Clear the selection.
    pub fn deselect(&mut self) -> RenderBatch {
        self.transition(Transition::Deselect)
    }

    /// Preview a node's neighborhood. Ignored while a node is selected.
    pub fn hover(&mut self, key: &str) -> StyleResult<RenderBatch> {
        let id = self.resolve(key)?;
        Ok(self.transition(Transition::Hover(id)))
    }

    /// End the hover preview.
    pub fn hover_exit(&mut self) -> RenderBatch {
        self.transition(Transition::HoverExit)
    }

    pub fn highlight_mode(&self) -> HighlightMode {
        self.highlighter.mode()
    }

    /// Source id of the selected node.
    pub fn selected(&self) -> Option<&str> {
        self.highlighter.selected().and_then(|id| self.node_key(id))
    }

    /// Source id of the hovered node.
    pub fn hovered(&self) -> Option<&str> {
        self.highlighter.hovered().and_then(|id| self.node_key(id))
    }

    // =========================================================================
    // Visibility
    // =========================================================================

    /// Show only nodes of `node_type`. `None` or `"all"` shows everything.
    ///
    /// An edge is hidden when either endpoint is.
    pub fn filter_by_type(&mut self, node_type: Option<&str>) -> RenderBatch {
        let filter = node_type.filter(|t| *t != ALL_TYPES);
        debug!("type filter: {}", filter.unwrap_or(ALL_TYPES));

        for (id, node) in self.graph.nodes() {
            let hidden = filter.is_some_and(|t| node.node_type != t);
            self.display.node_states[id.index()].set_hidden(hidden);
        }
        for (id, edge) in self.graph.edges() {
            let hidden = self.display.node_states[edge.source.index()].is_hidden()
                || self.display.node_states[edge.target.index()].is_hidden();
            self.display.edge_states[id.index()].set_hidden(hidden);
        }

        self.type_filter = filter.map(str::to_string);
        self.flush()
    }

    pub fn type_filter(&self) -> Option<&str> {
        self.type_filter.as_deref()
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Label, type, attributes and neighbors of a node.
    pub fn node_details(&self, key: &str) -> StyleResult<NodeDetails> {
        let id = self.resolve(key)?;
        let node = self
            .graph
            .node(id)
            .ok_or_else(|| StyleError::NodeNotFound(key.to_string()))?;
        let neighbors = self
            .graph
            .neighbors(id)
            .into_iter()
            .filter_map(|n| self.graph.node(n))
            .map(|n| NeighborInfo {
                id: n.key.clone(),
                label: n.label.clone(),
            })
            .collect();

        Ok(NodeDetails {
            id: node.key.clone(),
            label: node.label.clone(),
            node_type: node.node_type.clone(),
            attributes: node.attributes.clone(),
            neighbors,
        })
    }

    /// Nearest visible node within `radius` of a graph-space point.
    pub fn pick_node(&self, x: f32, y: f32, radius: f32) -> Option<&str> {
        let states = &self.display.node_states;
        self.graph
            .find_nearest_node_within(x, y, radius, |id| {
                states.get(id.index()).is_some_and(|s| !s.is_hidden())
            })
            .and_then(|id| self.node_key(id))
    }

    /// Current style of a node.
    pub fn node_style(&self, key: &str) -> Option<&Style> {
        let id = self.graph.node_id(key)?;
        self.display.styles.nodes.get(id.index())
    }

    /// Resting style of a node, ignoring any highlight.
    pub fn base_node_style(&self, key: &str) -> Option<&Style> {
        let id = self.graph.node_id(key)?;
        self.highlighter
            .bases(&self.display.styles)
            .nodes
            .get(id.index())
    }

    /// Current style of an edge.
    pub fn edge_style(&self, key: &str) -> Option<&Style> {
        let id = self.graph.edge_id(key)?;
        self.display.styles.edges.get(id.index())
    }

    /// Resting style of an edge, ignoring any highlight.
    pub fn base_edge_style(&self, key: &str) -> Option<&Style> {
        let id = self.graph.edge_id(key)?;
        self.highlighter
            .bases(&self.display.styles)
            .edges
            .get(id.index())
    }

    pub fn node_state(&self, key: &str) -> Option<NodeState> {
        let id = self.graph.node_id(key)?;
        self.display.node_states.get(id.index()).copied()
    }

    /// Non-fatal problems found while loading.
    pub fn diagnostics(&self) -> &[StyleError] {
        &self.diagnostics
    }

    pub fn graph(&self) -> &GraphEngine {
        &self.graph
    }

    pub fn config(&self) -> &StyleConfig {
        &self.config
    }

    // =========================================================================
    // Rendering
    // =========================================================================

    /// Every element, for the first paint or a repaint from scratch.
    pub fn full_batch(&mut self) -> RenderBatch {
        self.painted = PaintState::default();
        self.flush()
    }

    /// Handle one view event, pushing the resulting batch to `sink`.
    ///
    /// Nothing is pushed when the event changes nothing.
    pub fn dispatch(&mut self, event: ViewEvent, sink: &mut impl RenderSink) -> StyleResult<()> {
        let batch = match event {
            ViewEvent::ClickNode { id } => self.select(&id)?,
            ViewEvent::ClickStage => self.deselect(),
            ViewEvent::HoverEnter { id } => self.hover(&id)?,
            ViewEvent::HoverLeave => self.hover_exit(),
            ViewEvent::ColorBy { attribute } => self.color_by_attribute(&attribute),
            ViewEvent::ColorByType => self.apply_type_styles(),
            ViewEvent::FilterType { node_type } => self.filter_by_type(node_type.as_deref()),
        };
        if !batch.is_empty() {
            sink.apply(batch);
        }
        Ok(())
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn resolve(&self, key: &str) -> StyleResult<NodeId> {
        self.graph.node_id(key).ok_or_else(|| {
            warn!("unknown node {key}");
            StyleError::NodeNotFound(key.to_string())
        })
    }

    fn node_key(&self, id: NodeId) -> Option<&str> {
        self.graph.node(id).map(|n| n.key.as_str())
    }

    fn transition(&mut self, transition: Transition) -> RenderBatch {
        let changed = self.highlighter.apply(
            transition,
            &self.graph,
            &self.config.highlighting,
            &mut self.display,
        );
        if changed {
            self.flush()
        } else {
            RenderBatch::default()
        }
    }

    /// Type-based node styles, reporting each unstyled type once.
    fn type_styles(&mut self) -> Vec<Style> {
        let mut styles = Vec::with_capacity(self.graph.node_count());
        for (_, node) in self.graph.nodes() {
            let (style, source) = node_types::resolve(&node.node_type, &self.config);
            if source == StyleSource::Default && self.missing_types.insert(node.node_type.clone())
            {
                warn!("{}", StyleError::ConfigMissingType(node.node_type.clone()));
            }
            styles.push(Style::new(style.color, style.size));
        }
        styles
    }

    /// Install new node base styles, re-deriving edges and keeping any active
    /// highlight applied on top of them.
    fn rebase(&mut self, nodes: Vec<Style>) -> RenderBatch {
        let mode = self.highlighter.suspend(&mut self.display);
        let edges = derive_edge_styles(&self.graph, &nodes);
        self.display.styles = StyleSnapshot { nodes, edges };
        self.highlighter.resume(
            mode,
            &self.graph,
            &self.config.highlighting,
            &mut self.display,
        );
        self.flush()
    }

    /// Diff the display against the last paint and remember the new paint.
    fn flush(&mut self) -> RenderBatch {
        let next = self.display.paint();
        let graph = &self.graph;
        let batch = display::diff(
            &self.painted,
            &next,
            |i| graph.node(NodeId(i as u32)).map_or("", |n| n.key.as_str()),
            |i| graph.edge(EdgeId(i as u32)).map_or("", |e| e.key.as_str()),
        );
        self.painted = next;
        batch
    }
}

/// Edge styles from the endpoint types and the given node colors.
fn derive_edge_styles(graph: &GraphEngine, nodes: &[Style]) -> Vec<Style> {
    graph
        .edges()
        .map(|(_, edge)| {
            let endpoint = |id: NodeId| {
                let node_type = graph.node(id).map_or("", |n| n.node_type.as_str());
                let color = nodes.get(id.index()).map_or(DEFAULT_NODE_COLOR, |s| s.color.as_str());
                Endpoint::new(node_type, color)
            };
            let color = edge_color::derive(endpoint(edge.source), endpoint(edge.target));
            Style::new(color, edge.size)
        })
        .collect()
}
