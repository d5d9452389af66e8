//! Type-based node styling.
//!
//! A node's resting color and size come from its type: the configured table
//! first, then the built-in table below, then a hard default.

use super::config::{StyleConfig, TypeStyle};

/// Color used when a type has no entry anywhere.
pub const DEFAULT_NODE_COLOR: &str = "#666";

/// Size used when a type has no entry anywhere.
pub const DEFAULT_NODE_SIZE: f32 = 1.0;

/// Built-in styles, in legend order.
pub const BUILTIN_TYPES: [(&str, &str, f32); 4] = [
    ("paper", "#2ca02c", 3.0),
    ("author", "#9467bd", 5.0),
    ("organization", "#1f77b4", 4.0),
    ("unknown", "#ff7f0e", 3.0),
];

/// Where a resolved style came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleSource {
    Config,
    Builtin,
    Default,
}

/// Built-in style for a type, if there is one.
pub fn builtin_style(node_type: &str) -> Option<TypeStyle> {
    BUILTIN_TYPES
        .iter()
        .find(|(name, _, _)| *name == node_type)
        .map(|&(_, color, size)| TypeStyle::new(color, size))
}

/// Resolve the style for a node type.
pub fn resolve(node_type: &str, config: &StyleConfig) -> (TypeStyle, StyleSource) {
    if let Some(style) = config.node_types.get(node_type) {
        return (style.clone(), StyleSource::Config);
    }
    if let Some(style) = builtin_style(node_type) {
        return (style, StyleSource::Builtin);
    }
    (
        TypeStyle::new(DEFAULT_NODE_COLOR, DEFAULT_NODE_SIZE),
        StyleSource::Default,
    )
}
