//! Color and size rules.
//!
//! - `color`: CSS color parsing and alpha dimming
//! - `config`: style configuration and highlight tuning
//! - `node_types`: type-based node styling with the built-in fallback table
//! - `edge_color`: edge color from the types of its endpoints
//! - `palette`: attribute-based coloring
//! - `legend`: swatch data for the legend renderer

pub mod color;
pub mod config;
pub mod edge_color;
pub mod legend;
pub mod node_types;
pub mod palette;

pub use config::{HighlightConfig, StyleConfig, TypeStyle};
pub use legend::{Legend, LegendEntry};
