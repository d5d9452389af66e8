//! Paper Atlas - WASM Module
//!
//! This module provides the state core of the Paper Atlas citation and
//! collaboration viewer: it loads the graph, assigns node and edge styles
//! from configuration and runs the selection/hover highlight. It is compiled
//! to WebAssembly and exposes a JavaScript-friendly API via wasm-bindgen.
//! The JavaScript renderer paints whatever the engine hands back.
//!
//! # Architecture
//!
//! - `graph`: Base graph using petgraph's StableGraph
//! - `style`: Type styling, edge colors, attribute palettes, legends
//! - `highlight`: Selection/hover state machine
//! - `display`: Display state and render batches
//! - `spatial`: R-tree spatial indexing for picking
//! - `style_engine`: The engine tying the above together

use js_sys::{Float32Array, Function};
use log::{Level, info};
use serde::Serialize;
use wasm_bindgen::prelude::*;

pub mod display;
pub mod error;
pub mod graph;
pub mod highlight;
pub mod spatial;
pub mod style;
pub mod style_engine;

use display::{RenderBatch, RenderSink};
use error::StyleError;
use graph::GraphData;
use style::StyleConfig;
use style_engine::{StyleEngine, ViewEvent};

/// Initialize the WASM module: panic hook and console logging.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(Level::Debug);
    info!("paper atlas engine loaded");
}

/// Main entry point for the style engine.
///
/// This struct wraps the internal StyleEngine and provides the public API
/// exposed to JavaScript. Every mutating call returns a render batch holding
/// only the nodes and edges whose paint changed.
#[wasm_bindgen]
pub struct PaperAtlasWasm {
    engine: StyleEngine,
}

#[wasm_bindgen]
impl PaperAtlasWasm {
    /// Create an engine from graph and configuration JSON text.
    #[wasm_bindgen(constructor)]
    pub fn new(graph_json: &str, config_json: &str) -> Result<PaperAtlasWasm, JsValue> {
        let engine = StyleEngine::from_json(graph_json, config_json).map_err(js_error)?;
        Ok(Self { engine })
    }

    /// Create an engine from already-parsed JavaScript objects.
    #[wasm_bindgen(js_name = fromObjects)]
    pub fn from_objects(graph: JsValue, config: JsValue) -> Result<PaperAtlasWasm, JsValue> {
        let data: GraphData = serde_wasm_bindgen::from_value(graph)
            .map_err(|e| js_error(StyleError::InvalidGraph(e.to_string())))?;
        let config: StyleConfig = if config.is_undefined() || config.is_null() {
            StyleConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)
                .map_err(|e| js_error(StyleError::InvalidConfig(e.to_string())))?
        };
        Ok(Self {
            engine: StyleEngine::new(data, config),
        })
    }

    #[wasm_bindgen(js_name = nodeCount)]
    pub fn node_count(&self) -> u32 {
        self.engine.graph().node_count() as u32
    }

    #[wasm_bindgen(js_name = edgeCount)]
    pub fn edge_count(&self) -> u32 {
        self.engine.graph().edge_count() as u32
    }

    /// Source ids of all nodes, in position buffer order.
    #[wasm_bindgen(js_name = nodeIds)]
    pub fn node_ids(&self) -> Vec<String> {
        self.engine
            .graph()
            .nodes()
            .map(|(_, node)| node.key.clone())
            .collect()
    }

    /// Problems found while loading, as messages.
    pub fn diagnostics(&self) -> Vec<String> {
        self.engine
            .diagnostics()
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    // =========================================================================
    // Styling
    // =========================================================================

    /// Every node and edge, for the first paint.
    #[wasm_bindgen(js_name = fullBatch)]
    pub fn full_batch(&mut self) -> Result<JsValue, JsValue> {
        to_js(&self.engine.full_batch())
    }

    /// Color nodes by their type.
    #[wasm_bindgen(js_name = applyTypeStyles)]
    pub fn apply_type_styles(&mut self) -> Result<JsValue, JsValue> {
        to_js(&self.engine.apply_type_styles())
    }

    /// Color nodes by an attribute. Call `legend()` for the new swatches.
    #[wasm_bindgen(js_name = colorByAttribute)]
    pub fn color_by_attribute(&mut self, attribute: &str) -> Result<JsValue, JsValue> {
        to_js(&self.engine.color_by_attribute(attribute))
    }

    /// Legend for the current color mode, as `[{value, color}]`.
    pub fn legend(&self) -> Result<JsValue, JsValue> {
        to_js(self.engine.legend())
    }

    // =========================================================================
    // Highlight
    // =========================================================================

    pub fn select(&mut self, node_id: &str) -> Result<JsValue, JsValue> {
        let batch = self.engine.select(node_id).map_err(js_error)?;
        to_js(&batch)
    }

    pub fn deselect(&mut self) -> Result<JsValue, JsValue> {
        to_js(&self.engine.deselect())
    }

    pub fn hover(&mut self, node_id: &str) -> Result<JsValue, JsValue> {
        let batch = self.engine.hover(node_id).map_err(js_error)?;
        to_js(&batch)
    }

    #[wasm_bindgen(js_name = hoverExit)]
    pub fn hover_exit(&mut self) -> Result<JsValue, JsValue> {
        to_js(&self.engine.hover_exit())
    }

    #[wasm_bindgen(js_name = selectedNode)]
    pub fn selected_node(&self) -> Option<String> {
        self.engine.selected().map(str::to_string)
    }

    // =========================================================================
    // Filtering and Queries
    // =========================================================================

    /// Show only one node type; pass nothing or `"all"` to show every type.
    #[wasm_bindgen(js_name = filterByType)]
    pub fn filter_by_type(&mut self, node_type: Option<String>) -> Result<JsValue, JsValue> {
        to_js(&self.engine.filter_by_type(node_type.as_deref()))
    }

    /// Label, type, attributes and neighbors for the detail panel.
    #[wasm_bindgen(js_name = nodeDetails)]
    pub fn node_details(&self, node_id: &str) -> Result<JsValue, JsValue> {
        let details = self.engine.node_details(node_id).map_err(js_error)?;
        to_js(&details)
    }

    /// Graph-space position of a node as `[x, y]`.
    #[wasm_bindgen(js_name = nodePosition)]
    pub fn node_position(&self, node_id: &str) -> Option<Vec<f32>> {
        let graph = self.engine.graph();
        let (x, y) = graph.node_position(graph.node_id(node_id)?)?;
        Some(vec![x, y])
    }

    /// Nearest visible node within `radius` of a graph-space point.
    #[wasm_bindgen(js_name = pickNode)]
    pub fn pick_node(&self, x: f32, y: f32, radius: f32) -> Option<String> {
        self.engine.pick_node(x, y, radius).map(str::to_string)
    }

    /// Handle a view event and call `on_batch` with the resulting batch.
    ///
    /// `on_batch` is not called when the event changes nothing.
    pub fn dispatch(&mut self, event: JsValue, on_batch: &Function) -> Result<(), JsValue> {
        let event: ViewEvent = serde_wasm_bindgen::from_value(event)?;
        let mut sink = CallbackSink {
            callback: on_batch,
            error: None,
        };
        self.engine.dispatch(event, &mut sink).map_err(js_error)?;
        match sink.error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    // =========================================================================
    // Position Buffer Access (Zero-Copy)
    // =========================================================================

    /// Get a zero-copy view of X positions.
    ///
    /// # Safety
    ///
    /// The returned view is invalidated if any Rust allocation occurs.
    /// Use immediately, do not store.
    #[wasm_bindgen(js_name = getPositionsXView)]
    pub fn get_positions_x_view(&self) -> Float32Array {
        unsafe { Float32Array::view(self.engine.graph().positions_x()) }
    }

    /// Get a zero-copy view of Y positions.
    ///
    /// # Safety
    ///
    /// The returned view is invalidated if any Rust allocation occurs.
    /// Use immediately, do not store.
    #[wasm_bindgen(js_name = getPositionsYView)]
    pub fn get_positions_y_view(&self) -> Float32Array {
        unsafe { Float32Array::view(self.engine.graph().positions_y()) }
    }
}

/// Sink that forwards each batch to a JavaScript callback.
struct CallbackSink<'a> {
    callback: &'a Function,
    error: Option<JsValue>,
}

impl RenderSink for CallbackSink<'_> {
    fn apply(&mut self, batch: RenderBatch) {
        let result = to_js(&batch).and_then(|value| self.callback.call1(&JsValue::NULL, &value));
        if let Err(err) = result {
            self.error.get_or_insert(err);
        }
    }
}

fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(JsValue::from)
}

fn js_error(err: StyleError) -> JsValue {
    js_sys::Error::new(&err.to_string()).into()
}
