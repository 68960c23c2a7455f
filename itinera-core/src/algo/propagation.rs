//! Congestion propagation: distributing per-segment observations onto the
//! graph edges that approximate each segment.
//!
//! A segment's reference polyline rarely aligns 1:1 with graph edges, so
//! every pair of consecutive polyline vertices is snapped to its nearest
//! nodes and bridged with an unweighted shortest path on the current
//! connectivity; the segment's observed level is then written to every edge
//! along those paths.

use hashbrown::HashMap;
use itertools::Itertools;
use log::{debug, info};
use petgraph::graph::NodeIndex;
use rayon::prelude::*;

use crate::SegmentId;
use crate::model::{Congestion, CongestionLevel, Highway, RoadGraph, adjusted_time};
use crate::routing::{Weight, shortest_path};

/// Coverage summary of one propagation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PropagationStats {
    /// Segments present in both the segment set and the observation set.
    pub segments_applied: usize,
    /// Edges whose congestion level and itime were overwritten.
    pub edges_updated: usize,
    /// Edges removed because their segment is impassable.
    pub edges_removed: usize,
    /// Sub-segment pairs with no connecting path, skipped.
    pub subpaths_skipped: usize,
}

/// Apply one round of congestion observations to the graph.
///
/// Segments without an observation keep whatever level their edges already
/// carry. Segments are processed in ascending id order, so where two
/// segments cover the same edge the higher id wins deterministically.
/// Resolver and path failures only shrink coverage; they never propagate
/// to the caller.
pub fn propagate_congestion(
    graph: &mut RoadGraph,
    segments: &HashMap<SegmentId, Highway>,
    observations: &HashMap<SegmentId, Congestion>,
) -> PropagationStats {
    // Deterministic order: ascending segment id.
    let mut observed: Vec<(SegmentId, &Highway, CongestionLevel)> = segments
        .iter()
        .filter_map(|(id, highway)| {
            observations
                .get(id)
                .map(|congestion| (*id, highway, congestion.state))
        })
        .collect();
    observed.sort_unstable_by_key(|(id, ..)| *id);

    // Snapping is read-only on the graph; resolve all polylines up front.
    // Only edges are ever removed below, so the resolved nodes stay valid.
    let resolved: Vec<(SegmentId, Vec<NodeIndex>, CongestionLevel)> = observed
        .par_iter()
        .map(|&(id, highway, state)| (id, graph.nearest_nodes(&highway.points()), state))
        .collect();

    let mut stats = PropagationStats::default();
    for (id, nodes, state) in resolved {
        apply_segment(graph, id, &nodes, state, &mut stats);
        stats.segments_applied += 1;
    }

    info!(
        "Propagated congestion over {} segments: {} edges updated, {} removed, {} subpaths skipped",
        stats.segments_applied, stats.edges_updated, stats.edges_removed, stats.subpaths_skipped
    );
    stats
}

fn apply_segment(
    graph: &mut RoadGraph,
    id: SegmentId,
    nodes: &[NodeIndex],
    state: CongestionLevel,
    stats: &mut PropagationStats,
) {
    // Align every consecutive vertex pair with the graph before mutating it.
    let mut paths = Vec::with_capacity(nodes.len().saturating_sub(1));
    for (org, dest) in nodes.iter().copied().tuple_windows() {
        match shortest_path(graph, org, dest, Weight::Hops) {
            Some(path) => paths.push(path),
            None => {
                stats.subpaths_skipped += 1;
                debug!("Segment {id}: no path for a sub-segment pair");
            }
        }
    }

    for path in paths {
        for (from, to) in path.into_iter().tuple_windows() {
            // The edge may already be gone if an earlier path removed it.
            let Some(edge_index) = graph.graph.find_edge(from, to) else {
                continue;
            };

            let free_flow_time = graph.graph[edge_index].free_flow_time;
            match adjusted_time(free_flow_time, state) {
                Some(itime) => {
                    let edge = &mut graph.graph[edge_index];
                    edge.congestion = state;
                    edge.itime = itime;
                    stats.edges_updated += 1;
                }
                None => {
                    graph.graph.remove_edge(edge_index);
                    stats.edges_removed += 1;
                }
            }
        }
    }
}
