//! Road network components - nodes and congestion-weighted edges

use geo::Point;
use serde::{Deserialize, Serialize};

use crate::model::traffic::{CongestionLevel, adjusted_time};
use crate::{GENERIC_CONGESTION, SourceNodeId};

/// Road graph node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoadNode {
    /// Identifier of the node in the source topology
    pub id: SourceNodeId,
    /// Node coordinates (x = longitude, y = latitude)
    pub geometry: Point<f64>,
}

/// Directed road graph edge
///
/// `length` and `free_flow_time` are fixed at construction; `congestion`
/// and `itime` are overwritten on every congestion refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoadEdge {
    /// Physical length in meters
    pub length: f64,
    /// Assumed or measured speed in km/h
    pub free_flow_speed: f64,
    /// Travel time ignoring congestion
    pub free_flow_time: f64,
    /// Last observed congestion level
    pub congestion: CongestionLevel,
    /// Congestion-adjusted travel time, the routing weight
    pub itime: f64,
}

impl RoadEdge {
    /// Build an edge from its physical attributes, seeding the congestion
    /// fields with the generic default.
    pub fn new(length: f64, free_flow_speed: f64) -> Self {
        let free_flow_time = length / free_flow_speed;
        // The generic default is never impassable, so the itime is always defined here.
        let itime =
            adjusted_time(free_flow_time, GENERIC_CONGESTION).unwrap_or(free_flow_time);

        Self {
            length,
            free_flow_speed,
            free_flow_time,
            congestion: GENERIC_CONGESTION,
            itime,
        }
    }
}
