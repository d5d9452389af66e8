//! Selection and hover highlight.
//!
//! The highlighter holds the current [`HighlightMode`] and the saved base
//! styles. Base styles are captured once when leaving `Normal` and handed
//! back on restore; a focus is always computed from the saved copy, so a
//! dimmed color is never dimmed again.

use log::debug;

use crate::display::{DisplayState, StyleSnapshot};
use crate::graph::{EdgeId, GraphEngine, NodeId};
use crate::style::color;
use crate::style::HighlightConfig;

/// Color of edges outside the focused node's neighborhood.
pub const MUTED_EDGE_COLOR: &str = "#ccc";

/// Size multiplier for edges outside the neighborhood.
pub const MUTED_EDGE_SIZE_FACTOR: f32 = 0.5;

/// Highlight state. Hover only exists while nothing is selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HighlightMode {
    #[default]
    Normal,
    Hovered(NodeId),
    Selected(NodeId),
}

/// Input to the state machine. Node ids are already resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Select(NodeId),
    Deselect,
    Hover(NodeId),
    HoverExit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FocusKind {
    Select,
    Hover,
}

/// Highlight state machine with its saved-base store.
#[derive(Debug, Default)]
pub struct Highlighter {
    mode: HighlightMode,
    saved: Option<StyleSnapshot>,
}

impl Highlighter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> HighlightMode {
        self.mode
    }

    pub fn selected(&self) -> Option<NodeId> {
        match self.mode {
            HighlightMode::Selected(id) => Some(id),
            _ => None,
        }
    }

    pub fn hovered(&self) -> Option<NodeId> {
        match self.mode {
            HighlightMode::Hovered(id) => Some(id),
            _ => None,
        }
    }

    /// Resting styles: the saved copy while a highlight is active, otherwise
    /// whatever is on display.
    pub fn bases<'a>(&'a self, current: &'a StyleSnapshot) -> &'a StyleSnapshot {
        self.saved.as_ref().unwrap_or(current)
    }

    /// Run one transition against `display`.
    ///
    /// Returns whether anything was changed. Transitions that do not apply in
    /// the current mode leave everything untouched.
    pub fn apply(
        &mut self,
        transition: Transition,
        graph: &GraphEngine,
        config: &HighlightConfig,
        display: &mut DisplayState,
    ) -> bool {
        use HighlightMode::*;

        let next = match (self.mode, transition) {
            (Selected(a), Transition::Select(b)) if a == b => return false,
            (_, Transition::Select(b)) => Selected(b),
            (Selected(_), Transition::Deselect) => Normal,
            (_, Transition::Deselect) => return false,
            (Selected(_), Transition::Hover(_) | Transition::HoverExit) => return false,
            (Hovered(a), Transition::Hover(b)) if a == b => return false,
            (_, Transition::Hover(b)) => Hovered(b),
            (Hovered(_), Transition::HoverExit) => Normal,
            (Normal, Transition::HoverExit) => return false,
        };

        debug!("highlight {:?} -> {:?}", self.mode, next);
        self.restore(display);
        self.enter(next, graph, config, display);
        true
    }

    /// Restore bases and fall back to `Normal`, returning the mode that was
    /// active so it can be re-entered with [`Highlighter::resume`].
    pub fn suspend(&mut self, display: &mut DisplayState) -> HighlightMode {
        let mode = self.mode;
        self.restore(display);
        mode
    }

    /// Re-enter `mode` on top of whatever bases are now on display.
    pub fn resume(
        &mut self,
        mode: HighlightMode,
        graph: &GraphEngine,
        config: &HighlightConfig,
        display: &mut DisplayState,
    ) {
        self.enter(mode, graph, config, display);
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn restore(&mut self, display: &mut DisplayState) {
        if let Some(saved) = self.saved.take() {
            display.styles = saved;
        }
        display.clear_highlight();
        self.mode = HighlightMode::Normal;
    }

    fn enter(
        &mut self,
        mode: HighlightMode,
        graph: &GraphEngine,
        config: &HighlightConfig,
        display: &mut DisplayState,
    ) {
        match mode {
            HighlightMode::Normal => {}
            HighlightMode::Hovered(node) => {
                self.focus(node, FocusKind::Hover, graph, config, display)
            }
            HighlightMode::Selected(node) => {
                self.focus(node, FocusKind::Select, graph, config, display)
            }
        }
        self.mode = mode;
    }

    fn focus(
        &mut self,
        node: NodeId,
        kind: FocusKind,
        graph: &GraphEngine,
        config: &HighlightConfig,
        display: &mut DisplayState,
    ) {
        // Captured once; never overwritten while a focus is on display.
        let base = self.saved.get_or_insert_with(|| display.styles.clone());
        let neighbors = graph.neighbor_set(node);
        debug!("focus on {node}: {} in neighborhood", neighbors.len());
        let resize = kind == FocusKind::Select;

        for (i, style) in base.nodes.iter().enumerate() {
            let id = NodeId(i as u32);
            let state = &mut display.node_states[i];
            let current = &mut display.styles.nodes[i];
            state.clear_highlight();

            current.size = style.size;
            if neighbors.contains(&id) {
                current.color = style.color.clone();
            } else {
                current.color = color::dim(&style.color, config.node_opacity);
                state.set_dimmed(true);
            }

            if id == node {
                match kind {
                    FocusKind::Select => {
                        current.size = style.size * config.selected_node_size_factor;
                        state.set_selected(true);
                    }
                    FocusKind::Hover => state.set_hovered(true),
                }
            }
        }

        for (i, style) in base.edges.iter().enumerate() {
            let Some(edge) = graph.edge(EdgeId(i as u32)) else {
                continue;
            };
            let state = &mut display.edge_states[i];
            let current = &mut display.styles.edges[i];
            state.clear_highlight();

            if edge.touches(node) {
                current.color = match (&config.highlighted_edge_color, resize) {
                    (Some(c), true) => c.clone(),
                    _ => style.color.clone(),
                };
                current.size = if resize {
                    style.size * config.highlighted_edge_size_factor
                } else {
                    style.size
                };
                state.set_highlighted(true);
            } else {
                current.color = MUTED_EDGE_COLOR.to_string();
                current.size = if resize {
                    style.size * MUTED_EDGE_SIZE_FACTOR
                } else {
                    style.size
                };
                state.set_dimmed(true);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::Style;
    use crate::graph::{GraphData, RawEdge, RawNode};

    /// a - b - c, plus d on its own.
    fn setup() -> (GraphEngine, DisplayState) {
        let data = GraphData {
            nodes: ["paper_a", "author_b", "paper_c", "paper_d"]
                .iter()
                .map(|id| RawNode::new(*id, None))
                .collect(),
            edges: vec![
                RawEdge::new("e0", "paper_a", "author_b"),
                RawEdge::new("e1", "author_b", "paper_c"),
            ],
        };
        let (graph, diagnostics) = GraphEngine::load(data);
        assert!(diagnostics.is_empty());
        let display = DisplayState::new(StyleSnapshot {
            nodes: vec![
                Style::new("#2ca02c", 3.0),
                Style::new("#9467bd", 5.0),
                Style::new("#2ca02c", 3.0),
                Style::new("#2ca02c", 3.0),
            ],
            edges: vec![Style::new("#9467bd", 1.0), Style::new("#9467bd", 1.0)],
        });
        (graph, display)
    }

    #[test]
    fn test_select_dims_outside_neighborhood() {
        let (graph, mut display) = setup();
        let config = HighlightConfig::default();
        let mut hl = Highlighter::new();

        assert!(hl.apply(Transition::Select(NodeId(0)), &graph, &config, &mut display));
        assert_eq!(hl.selected(), Some(NodeId(0)));

        let nodes = &display.styles.nodes;
        assert_eq!(nodes[0].color, "#2ca02c");
        assert_eq!(nodes[0].size, 4.5);
        assert_eq!(nodes[1].color, "#9467bd");
        assert_eq!(nodes[1].size, 5.0);
        assert_eq!(nodes[2].color, "rgba(44,160,44,0.2)");
        assert_eq!(nodes[3].color, "rgba(44,160,44,0.2)");
        assert!(display.node_states[0].is_selected());
        assert!(display.node_states[2].is_dimmed());

        let edges = &display.styles.edges;
        assert_eq!(edges[0].color, "#9467bd");
        assert_eq!(edges[0].size, 2.0);
        assert_eq!(edges[1].color, MUTED_EDGE_COLOR);
        assert_eq!(edges[1].size, 0.5);
    }

    #[test]
    fn test_deselect_restores_exactly() {
        let (graph, mut display) = setup();
        let before = display.clone();
        let config = HighlightConfig::default();
        let mut hl = Highlighter::new();

        hl.apply(Transition::Select(NodeId(1)), &graph, &config, &mut display);
        assert!(hl.apply(Transition::Deselect, &graph, &config, &mut display));
        assert_eq!(display, before);
        assert_eq!(hl.mode(), HighlightMode::Normal);
    }

    #[test]
    fn test_reselect_does_not_compound() {
        let (graph, mut display) = setup();
        let config = HighlightConfig::default();
        let mut hl = Highlighter::new();

        hl.apply(Transition::Select(NodeId(0)), &graph, &config, &mut display);
        hl.apply(Transition::Select(NodeId(3)), &graph, &config, &mut display);

        // paper_c was dimmed for paper_a; it must be dimmed from its base now.
        assert_eq!(display.styles.nodes[2].color, "rgba(44,160,44,0.2)");
        assert_eq!(display.styles.nodes[0].size, 3.0);
        assert_eq!(display.styles.nodes[3].size, 4.5);
        assert!(!display.node_states[0].is_selected());
    }

    #[test]
    fn test_same_select_is_noop() {
        let (graph, mut display) = setup();
        let config = HighlightConfig::default();
        let mut hl = Highlighter::new();

        hl.apply(Transition::Select(NodeId(0)), &graph, &config, &mut display);
        let snapshot = display.clone();
        assert!(!hl.apply(Transition::Select(NodeId(0)), &graph, &config, &mut display));
        assert_eq!(display, snapshot);
    }

    #[test]
    fn test_hover_keeps_sizes_and_yields_to_selection() {
        let (graph, mut display) = setup();
        let before = display.clone();
        let config = HighlightConfig::default();
        let mut hl = Highlighter::new();

        assert!(hl.apply(Transition::Hover(NodeId(0)), &graph, &config, &mut display));
        assert_eq!(display.styles.nodes[0].size, 3.0);
        assert_eq!(display.styles.edges[1].size, 1.0);
        assert_eq!(display.styles.edges[1].color, MUTED_EDGE_COLOR);
        assert!(display.node_states[0].is_hovered());

        // Select restores the hover first.
        hl.apply(Transition::Select(NodeId(3)), &graph, &config, &mut display);
        assert!(!display.node_states[0].is_hovered());
        assert!(!hl.apply(Transition::Hover(NodeId(1)), &graph, &config, &mut display));
        assert!(!hl.apply(Transition::HoverExit, &graph, &config, &mut display));

        hl.apply(Transition::Deselect, &graph, &config, &mut display);
        assert_eq!(display, before);
    }

    #[test]
    fn test_hover_switch_restores_first() {
        let (graph, mut display) = setup();
        let before = display.clone();
        let config = HighlightConfig::default();
        let mut hl = Highlighter::new();

        hl.apply(Transition::Hover(NodeId(0)), &graph, &config, &mut display);
        hl.apply(Transition::Hover(NodeId(3)), &graph, &config, &mut display);
        assert_eq!(hl.hovered(), Some(NodeId(3)));
        assert_eq!(display.styles.nodes[0].color, "rgba(44,160,44,0.2)");

        assert!(hl.apply(Transition::HoverExit, &graph, &config, &mut display));
        assert_eq!(display, before);
    }

    #[test]
    fn test_noop_transitions() {
        let (graph, mut display) = setup();
        let config = HighlightConfig::default();
        let mut hl = Highlighter::new();

        assert!(!hl.apply(Transition::Deselect, &graph, &config, &mut display));
        assert!(!hl.apply(Transition::HoverExit, &graph, &config, &mut display));
    }

    #[test]
    fn test_highlighted_edge_color_override() {
        let (graph, mut display) = setup();
        let config = HighlightConfig {
            highlighted_edge_color: Some("#ff0000".to_string()),
            ..HighlightConfig::default()
        };
        let mut hl = Highlighter::new();

        hl.apply(Transition::Select(NodeId(1)), &graph, &config, &mut display);
        assert_eq!(display.styles.edges[0].color, "#ff0000");
        assert_eq!(display.styles.edges[1].color, "#ff0000");
        assert!(display.edge_states[0].is_highlighted());
    }

    #[test]
    fn test_suspend_and_resume_on_new_bases() {
        let (graph, mut display) = setup();
        let config = HighlightConfig::default();
        let mut hl = Highlighter::new();

        hl.apply(Transition::Select(NodeId(0)), &graph, &config, &mut display);
        let mode = hl.suspend(&mut display);
        assert_eq!(mode, HighlightMode::Selected(NodeId(0)));
        assert_eq!(display.styles.nodes[2].color, "#2ca02c");

        display.styles.nodes[2].color = "#000000".to_string();
        hl.resume(mode, &graph, &config, &mut display);
        assert_eq!(hl.selected(), Some(NodeId(0)));
        assert_eq!(display.styles.nodes[2].color, "rgba(0,0,0,0.2)");
        assert_eq!(hl.bases(&display.styles).nodes[2].color, "#000000");
    }
}
