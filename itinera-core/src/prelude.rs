// Re-export key components
pub use crate::algo::propagation::{PropagationStats, propagate_congestion};
pub use crate::engine::{
    EngineConfig, RefreshSession, Route, RouteLeg, RouteOutcome, RoutingEngine,
};
pub use crate::error::Error;
pub use crate::loading::feed::{CongestionFeed, FeedConfig, HttpFeed};
pub use crate::loading::{RawEdge, RawNode, RawTopology, TopologyProvider, build_road_graph};
pub use crate::model::{
    Congestion, CongestionBand, CongestionLevel, Highway, RoadEdge, RoadGraph, RoadNode,
    adjusted_time,
};
pub use crate::routing::{Weight, shortest_path};
pub use crate::snapshot::SnapshotStore;

// Core constants and identifier types
pub use crate::SegmentId;
pub use crate::SourceNodeId;
pub use crate::{GENERIC_CONGESTION, GENERIC_SPEED_KMH, REFRESH_INTERVAL_SECS};
