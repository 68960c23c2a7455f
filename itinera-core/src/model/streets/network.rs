//! Road graph with a spatial index for nearest-node resolution

use geo::Point;
use petgraph::graph::NodeIndex;
use petgraph::stable_graph::StableDiGraph;
use petgraph::visit::EdgeRef;
use rstar::{AABB, PointDistance, RTree, RTreeObject};
use serde::{Deserialize, Serialize};

use super::components::{RoadEdge, RoadNode};
use crate::Error;

/// Entry of the spatial index: a node position with its graph index.
#[derive(Debug, Clone)]
pub struct IndexedPoint {
    point: [f64; 2],
    pub node: NodeIndex,
}

impl RTreeObject for IndexedPoint {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for IndexedPoint {
    /// Squared Euclidean distance in lon/lat space. Accurate enough for
    /// nearest-node queries within a single city.
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        dx * dx + dy * dy
    }
}

/// Directed road graph plus an R-tree over its nodes.
///
/// Edges are removed when congestion marks them impassable, so the graph
/// uses stable indices: removals never invalidate the spatial index.
/// The R-tree is not serialized; [`RoadGraph::restore_spatial_index`] must
/// run after deserialization (the snapshot store does this).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoadGraph {
    pub graph: StableDiGraph<RoadNode, RoadEdge>,
    #[serde(skip, default = "RTree::new")]
    index: RTree<IndexedPoint>,
}

impl RoadGraph {
    pub fn new(graph: StableDiGraph<RoadNode, RoadEdge>) -> Self {
        let mut road_graph = Self {
            graph,
            index: RTree::new(),
        };
        road_graph.restore_spatial_index();
        road_graph
    }

    /// Rebuild the R-tree from the current node set.
    pub fn restore_spatial_index(&mut self) {
        let entries: Vec<IndexedPoint> = self
            .graph
            .node_indices()
            .map(|idx| {
                let node = &self.graph[idx];
                IndexedPoint {
                    point: [node.geometry.x(), node.geometry.y()],
                    node: idx,
                }
            })
            .collect();
        self.index = RTree::bulk_load(entries);
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Nearest graph node to the given coordinate.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnresolvableCoordinate`] if the graph has no nodes.
    pub fn nearest_node(&self, point: Point<f64>) -> Result<NodeIndex, Error> {
        self.index
            .nearest_neighbor(&[point.x(), point.y()])
            .map(|entry| entry.node)
            .ok_or(Error::UnresolvableCoordinate)
    }

    /// Nearest graph node for each coordinate of a batch, skipping the
    /// coordinates that cannot be resolved.
    pub fn nearest_nodes(&self, points: &[Point<f64>]) -> Vec<NodeIndex> {
        points
            .iter()
            .filter_map(|point| self.nearest_node(*point).ok())
            .collect()
    }

    /// Geographic position of a node.
    pub fn node_point(&self, node: NodeIndex) -> Option<Point<f64>> {
        self.graph.node_weight(node).map(|n| n.geometry)
    }

    /// Outgoing edge from `from` to `to`, if present.
    pub fn edge_between(&self, from: NodeIndex, to: NodeIndex) -> Option<&RoadEdge> {
        self.graph
            .edges(from)
            .find(|edge| edge.target() == to)
            .map(|edge| edge.weight())
    }
}
