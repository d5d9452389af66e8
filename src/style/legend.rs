//! Legend data for the external legend renderer.

use indexmap::IndexMap;
use serde::Serialize;

use super::config::StyleConfig;
use super::node_types::BUILTIN_TYPES;

/// One swatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LegendEntry {
    pub value: String,
    pub color: String,
}

/// Ordered value to color mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Legend {
    entries: Vec<LegendEntry>,
}

impl Legend {
    /// Legend for type coloring: the configured types, or the built-in table
    /// when configuration has none.
    pub fn for_types(config: &StyleConfig) -> Self {
        let entries = if config.node_types.is_empty() {
            BUILTIN_TYPES
                .iter()
                .map(|&(value, color, _)| LegendEntry {
                    value: value.to_string(),
                    color: color.to_string(),
                })
                .collect()
        } else {
            config
                .node_types
                .iter()
                .map(|(value, style)| LegendEntry {
                    value: value.clone(),
                    color: style.color.clone(),
                })
                .collect()
        };
        Self { entries }
    }

    /// Legend for attribute coloring.
    pub fn from_assignments(colors: &IndexMap<String, String>) -> Self {
        let entries = colors
            .iter()
            .map(|(value, color)| LegendEntry {
                value: value.clone(),
                color: color.clone(),
            })
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> &[LegendEntry] {
        &self.entries
    }

    /// Color of a value, if it is in the legend.
    pub fn color_of(&self, value: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.value == value)
            .map(|e| e.color.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
