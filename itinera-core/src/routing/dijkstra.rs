use std::{cmp::Ordering, collections::BinaryHeap};

use hashbrown::HashMap;
use petgraph::{graph::NodeIndex, visit::EdgeRef};

use crate::model::RoadGraph;

/// Edge weight used by a shortest-path query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Weight {
    /// Congestion-adjusted travel time, the routing weight.
    Itime,
    /// Uniform hop count, used to align segment polylines with graph edges.
    Hops,
}

impl Weight {
    fn cost(self, edge: &crate::model::RoadEdge) -> f64 {
        match self {
            Self::Itime => edge.itime,
            Self::Hops => 1.0,
        }
    }
}

#[derive(Copy, Clone)]
struct State {
    cost: f64,
    node: NodeIndex,
}

// Min-heap by cost (reversed from standard Rust BinaryHeap), with the node
// index as a deterministic tie-break.
impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.node.index().cmp(&self.node.index()))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for State {}

/// Dijkstra's algorithm from `start` to `target` under the chosen weight.
///
/// All weights are non-negative by construction. Returns the node sequence
/// from `start` to `target`, or `None` when `target` is unreachable -
/// a normal result, not a fault.
pub fn shortest_path(
    graph: &RoadGraph,
    start: NodeIndex,
    target: NodeIndex,
    weight: Weight,
) -> Option<Vec<NodeIndex>> {
    if start == target {
        return Some(vec![start]);
    }

    let mut distances: HashMap<NodeIndex, f64> = HashMap::new();
    let mut predecessors: HashMap<NodeIndex, NodeIndex> = HashMap::new();
    let mut heap = BinaryHeap::new();

    heap.push(State {
        cost: 0.0,
        node: start,
    });
    distances.insert(start, 0.0);

    while let Some(State { cost, node }) = heap.pop() {
        if node == target {
            return Some(reconstruct(&predecessors, start, target));
        }

        // Skip stale heap entries
        if let Some(&best) = distances.get(&node) {
            if cost > best {
                continue;
            }
        }

        for edge in graph.graph.edges(node) {
            let next = edge.target();
            let next_cost = cost + weight.cost(edge.weight());

            match distances.entry(next) {
                hashbrown::hash_map::Entry::Vacant(entry) => {
                    entry.insert(next_cost);
                    predecessors.insert(next, node);
                    heap.push(State {
                        cost: next_cost,
                        node: next,
                    });
                }
                hashbrown::hash_map::Entry::Occupied(mut entry) => {
                    if next_cost < *entry.get() {
                        *entry.get_mut() = next_cost;
                        predecessors.insert(next, node);
                        heap.push(State {
                            cost: next_cost,
                            node: next,
                        });
                    }
                }
            }
        }
    }

    None
}

fn reconstruct(
    predecessors: &HashMap<NodeIndex, NodeIndex>,
    start: NodeIndex,
    target: NodeIndex,
) -> Vec<NodeIndex> {
    let mut path = vec![target];
    let mut current = target;
    while current != start {
        match predecessors.get(&current) {
            Some(&prev) => {
                path.push(prev);
                current = prev;
            }
            None => break,
        }
    }
    path.reverse();
    path
}
