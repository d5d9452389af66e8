//! Error types for the style engine.
//!
//! None of these are fatal. Lookups that fail (`NodeNotFound`) are returned to
//! the caller with the engine state untouched; problems found while loading a
//! graph are kept as diagnostics and the offending element is skipped.

use std::fmt;

use thiserror::Error;

/// Which end of an edge a diagnostic refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeEnd {
    Source,
    Target,
}

impl fmt::Display for EdgeEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EdgeEnd::Source => f.write_str("source"),
            EdgeEnd::Target => f.write_str("target"),
        }
    }
}

/// Errors and diagnostics produced by the style engine.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StyleError {
    /// A selection or hover referenced an id that is not in the graph
    #[error("node not found: {0}")]
    NodeNotFound(String),

    /// An edge points at a node that does not exist; the edge is skipped
    #[error("edge {edge} references missing {end} node {node}")]
    EdgeEndpointMissing {
        edge: String,
        end: EdgeEnd,
        node: String,
    },

    /// No style entry for a node type anywhere in the lookup chain
    #[error("no style configured for node type {0}")]
    ConfigMissingType(String),

    /// A node id appeared more than once; later copies are skipped
    #[error("duplicate node id: {0}")]
    DuplicateNode(String),

    /// An edge id appeared more than once; later copies are skipped
    #[error("duplicate edge id: {0}")]
    DuplicateEdge(String),

    /// The graph payload could not be decoded
    #[error("invalid graph data: {0}")]
    InvalidGraph(String),

    /// The style configuration could not be decoded
    #[error("invalid style configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for style engine operations
pub type StyleResult<T> = Result<T, StyleError>;
