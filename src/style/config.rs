//! Style configuration.
//!
//! Mirrors the `config.json` the atlas page ships with. Only the keys the
//! engine uses are decoded; page settings such as the title or the data path
//! are ignored.

use indexmap::IndexMap;
use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::{StyleError, StyleResult};

/// Color and size for one node type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeStyle {
    pub color: String,
    pub size: f32,
}

impl TypeStyle {
    pub fn new(color: impl Into<String>, size: f32) -> Self {
        Self {
            color: color.into(),
            size,
        }
    }
}

/// Tuning for the selection and hover highlight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HighlightConfig {
    /// Size multiplier for the selected node (default: 1.5).
    pub selected_node_size_factor: f32,
    /// Opacity of dimmed nodes (default: 0.2).
    pub node_opacity: f32,
    /// Overrides the base color of edges touching the selected node.
    pub highlighted_edge_color: Option<String>,
    /// Size multiplier for edges touching the selected node (default: 2.0).
    pub highlighted_edge_size_factor: f32,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            selected_node_size_factor: 1.5,
            node_opacity: 0.2,
            highlighted_edge_color: None,
            highlighted_edge_size_factor: 2.0,
        }
    }
}

impl HighlightConfig {
    /// Clamp opacity into `[0, 1]` and replace unusable factors with defaults.
    pub fn normalized(mut self) -> Self {
        let defaults = Self::default();

        if !self.node_opacity.is_finite() {
            warn!("nodeOpacity {} is not finite, using default", self.node_opacity);
            self.node_opacity = defaults.node_opacity;
        } else if !(0.0..=1.0).contains(&self.node_opacity) {
            warn!("nodeOpacity {} out of range, clamping", self.node_opacity);
            self.node_opacity = self.node_opacity.clamp(0.0, 1.0);
        }

        if !is_positive(self.selected_node_size_factor) {
            warn!(
                "selectedNodeSizeFactor {} is not positive, using default",
                self.selected_node_size_factor
            );
            self.selected_node_size_factor = defaults.selected_node_size_factor;
        }

        if !is_positive(self.highlighted_edge_size_factor) {
            warn!(
                "highlightedEdgeSizeFactor {} is not positive, using default",
                self.highlighted_edge_size_factor
            );
            self.highlighted_edge_size_factor = defaults.highlighted_edge_size_factor;
        }

        if self
            .highlighted_edge_color
            .as_deref()
            .is_some_and(|c| c.trim().is_empty())
        {
            self.highlighted_edge_color = None;
        }

        self
    }
}

fn is_positive(v: f32) -> bool {
    v.is_finite() && v > 0.0
}

/// Style configuration for a loaded atlas.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StyleConfig {
    /// Per-type color and size, in configuration order.
    pub node_types: IndexMap<String, TypeStyle>,
    /// Palette for attribute coloring.
    pub color_palette: Option<Vec<String>>,
    pub highlighting: HighlightConfig,
    /// Attribute to color by as soon as the graph is loaded.
    pub default_color_attribute: Option<String>,
}

impl StyleConfig {
    /// Decode a configuration from JSON text.
    pub fn from_json(text: &str) -> StyleResult<Self> {
        let config: Self =
            serde_json::from_str(text).map_err(|e| StyleError::InvalidConfig(e.to_string()))?;
        Ok(config.normalized())
    }

    /// Normalize highlight tuning and drop empty optional values.
    pub fn normalized(mut self) -> Self {
        self.highlighting = self.highlighting.normalized();
        if self
            .default_color_attribute
            .as_deref()
            .is_some_and(|a| a.trim().is_empty())
        {
            self.default_color_attribute = None;
        }
        self
    }
}
