//! R-tree based spatial index using the rstar crate.
//!
//! Provides O(log n) lookup of the nearest accepted node within a pick
//! radius.

use rstar::{PointDistance, RTree, RTreeObject, AABB};

use crate::graph::NodeId;

/// A point in the spatial index with associated node ID.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodePoint {
    /// The node identifier.
    pub id: NodeId,
    /// X coordinate.
    pub x: f32,
    /// Y coordinate.
    pub y: f32,
}

impl NodePoint {
    /// Create a new NodePoint.
    pub fn new(id: NodeId, x: f32, y: f32) -> Self {
        Self { id, x, y }
    }
}

impl RTreeObject for NodePoint {
    type Envelope = AABB<[f32; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.x, self.y])
    }
}

impl PointDistance for NodePoint {
    fn distance_2(&self, point: &[f32; 2]) -> f32 {
        let dx = self.x - point[0];
        let dy = self.y - point[1];
        dx * dx + dy * dy
    }

    fn contains_point(&self, point: &[f32; 2]) -> bool {
        self.distance_2(point) <= f32::EPSILON * f32::EPSILON
    }
}

/// Spatial index for graph nodes.
pub struct SpatialIndex {
    tree: RTree<NodePoint>,
}

impl SpatialIndex {
    /// Create a new empty spatial index.
    pub fn new() -> Self {
        Self { tree: RTree::new() }
    }

    /// Nearest node within `max_distance` of a point that passes `accept`.
    ///
    /// Ties on distance resolve to the lower node id so picking is stable.
    /// A negative or NaN `max_distance` matches nothing.
    pub fn nearest_within(
        &self,
        x: f32,
        y: f32,
        max_distance: f32,
        accept: impl Fn(NodeId) -> bool,
    ) -> Option<NodeId> {
        if !(max_distance >= 0.0) {
            return None;
        }
        let query = [x, y];
        self.tree
            .locate_within_distance(query, max_distance * max_distance)
            .filter(|point| accept(point.id))
            .map(|point| (point.distance_2(&query), point.id))
            .min_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)))
            .map(|(_, id)| id)
    }

    /// Rebuild the index from a list of (id, x, y) tuples.
    pub fn rebuild(&mut self, points: &[(NodeId, f32, f32)]) {
        let node_points: Vec<_> = points
            .iter()
            .map(|&(id, x, y)| NodePoint::new(id, x, y))
            .collect();

        self.tree = RTree::bulk_load(node_points);
    }

}

impl Default for SpatialIndex {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index() -> SpatialIndex {
        let mut index = SpatialIndex::new();
        index.rebuild(&[
            (NodeId(0), 0.0, 0.0),
            (NodeId(1), 3.0, 0.0),
            (NodeId(2), 10.0, 0.0),
        ]);
        index
    }

    #[test]
    fn test_nearest_within() {
        let index = index();
        assert_eq!(index.nearest_within(1.0, 0.0, 5.0, |_| true), Some(NodeId(0)));
        assert_eq!(index.nearest_within(2.5, 0.0, 5.0, |_| true), Some(NodeId(1)));
        assert_eq!(index.nearest_within(6.5, 0.0, 1.0, |_| true), None);
    }

    #[test]
    fn test_nearest_within_skips_rejected() {
        let index = index();
        assert_eq!(
            index.nearest_within(1.0, 0.0, 5.0, |id| id != NodeId(0)),
            Some(NodeId(1))
        );
        assert_eq!(index.nearest_within(1.0, 0.0, 5.0, |_| false), None);
    }

    #[test]
    fn test_tie_prefers_lower_id() {
        let mut index = SpatialIndex::new();
        index.rebuild(&[(NodeId(7), 1.0, 0.0), (NodeId(3), -1.0, 0.0)]);
        assert_eq!(index.nearest_within(0.0, 0.0, 2.0, |_| true), Some(NodeId(3)));
    }

    #[test]
    fn test_rebuild_replaces_contents() {
        let mut index = index();
        index.rebuild(&[(NodeId(9), 1.0, 1.0)]);
        assert_eq!(index.nearest_within(0.0, 0.0, 5.0, |_| true), Some(NodeId(9)));
        assert_eq!(index.nearest_within(10.0, 0.0, 1.0, |_| true), None);

        index.rebuild(&[]);
        assert_eq!(index.nearest_within(0.0, 0.0, 5.0, |_| true), None);
    }

    #[test]
    fn test_negative_radius_matches_nothing() {
        let index = index();
        assert_eq!(index.nearest_within(1.0, 0.0, -3.0, |_| true), None);
        assert_eq!(index.nearest_within(0.0, 0.0, f32::NAN, |_| true), None);
        assert_eq!(index.nearest_within(0.0, 0.0, 0.0, |_| true), Some(NodeId(0)));
    }
}
