use hashbrown::HashMap;
use log::{debug, info};
use petgraph::graph::NodeIndex;
use petgraph::stable_graph::StableDiGraph;

use super::RawTopology;
use crate::model::{RoadEdge, RoadGraph, RoadNode};
use crate::{Error, GENERIC_SPEED_KMH, SourceNodeId};

/// Build a routable road graph from a raw topology.
///
/// Every edge gets its free-flow time fixed here, and its congestion fields
/// seeded with the generic default. Edges referencing unknown nodes are
/// skipped.
///
/// # Errors
///
/// Returns [`Error::InvalidData`] when the topology has no nodes.
pub fn build_road_graph(topology: RawTopology) -> Result<RoadGraph, Error> {
    if topology.nodes.is_empty() {
        return Err(Error::InvalidData(
            "topology contains no nodes".to_string(),
        ));
    }

    let mut graph = StableDiGraph::with_capacity(topology.nodes.len(), topology.edges.len());
    let mut indices: HashMap<SourceNodeId, NodeIndex> =
        HashMap::with_capacity(topology.nodes.len());

    for raw in &topology.nodes {
        let index = graph.add_node(RoadNode {
            id: raw.id,
            geometry: geo::Point::new(raw.lon, raw.lat),
        });
        indices.insert(raw.id, index);
    }

    let mut skipped = 0usize;
    for raw in &topology.edges {
        let (Some(&from), Some(&to)) = (indices.get(&raw.from), indices.get(&raw.to)) else {
            skipped += 1;
            debug!("Skipping edge {} -> {}: unknown endpoint", raw.from, raw.to);
            continue;
        };

        graph.add_edge(from, to, RoadEdge::new(raw.length, edge_speed(&raw.maxspeed)));
    }

    if skipped > 0 {
        debug!("Skipped {skipped} edges with unknown endpoints");
    }
    info!(
        "Built road graph with {} nodes and {} edges",
        graph.node_count(),
        graph.edge_count()
    );

    Ok(RoadGraph::new(graph))
}

/// Free-flow speed for an edge: the mean of the tagged limits, or the
/// generic constant when the source carries none.
fn edge_speed(maxspeed: &[f64]) -> f64 {
    if maxspeed.is_empty() {
        GENERIC_SPEED_KMH
    } else {
        maxspeed.iter().sum::<f64>() / maxspeed.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loading::{RawEdge, RawNode};

    fn raw_node(id: SourceNodeId) -> RawNode {
        RawNode {
            id,
            lon: 2.10 + id as f64 * 0.01,
            lat: 41.40,
        }
    }

    #[test]
    fn missing_speed_defaults_to_generic() {
        assert!((edge_speed(&[]) - GENERIC_SPEED_KMH).abs() < f64::EPSILON);
    }

    #[test]
    fn listed_speeds_are_averaged() {
        assert!((edge_speed(&[30.0, 50.0]) - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn builds_edges_with_free_flow_time() {
        let topology = RawTopology {
            nodes: vec![raw_node(1), raw_node(2)],
            edges: vec![RawEdge {
                from: 1,
                to: 2,
                length: 100.0,
                maxspeed: vec![10.0],
            }],
        };
        let graph = build_road_graph(topology).unwrap();
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 1);

        let edge = graph.graph.edge_weights().next().unwrap();
        assert!((edge.free_flow_time - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn edge_with_unknown_endpoint_is_skipped() {
        let topology = RawTopology {
            nodes: vec![raw_node(1)],
            edges: vec![RawEdge {
                from: 1,
                to: 99,
                length: 100.0,
                maxspeed: vec![],
            }],
        };
        let graph = build_road_graph(topology).unwrap();
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn empty_topology_is_rejected() {
        assert!(matches!(
            build_road_graph(RawTopology::default()),
            Err(Error::InvalidData(_))
        ));
    }
}
