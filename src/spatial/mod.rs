//! Spatial indexing for pointer picking.
//!
//! This module provides an R-tree based spatial index that resolves a
//! graph-space pointer position to the node under it.

mod rtree;

pub use rtree::SpatialIndex;
