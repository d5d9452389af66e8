//! Attribute-based coloring.
//!
//! Distinct attribute values get palette colors in the order they are first
//! seen, wrapping around when there are more values than colors.

use indexmap::IndexMap;

/// Built-in palette (d3 category10).
pub const DEFAULT_PALETTE: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

/// Value used for nodes that lack the attribute.
pub const MISSING_VALUE: &str = "unknown";

/// Palette to use: the configured one unless it is absent or empty.
pub fn effective_palette(configured: Option<&[String]>) -> Vec<String> {
    match configured {
        Some(colors) if !colors.is_empty() => colors.to_vec(),
        _ => DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect(),
    }
}

/// Assign a color to each distinct value.
///
/// `None` values count as [`MISSING_VALUE`]. The returned map keeps
/// first-appearance order, which is also the legend order.
pub fn assign<I>(values: I, palette: &[String]) -> IndexMap<String, String>
where
    I: IntoIterator<Item = Option<String>>,
{
    let mut colors: IndexMap<String, String> = IndexMap::new();
    if palette.is_empty() {
        return colors;
    }
    for value in values {
        let value = value.unwrap_or_else(|| MISSING_VALUE.to_string());
        if !colors.contains_key(&value) {
            let color = palette[colors.len() % palette.len()].clone();
            colors.insert(value, color);
        }
    }
    colors
}
