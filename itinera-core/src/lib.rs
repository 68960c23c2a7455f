//! Congestion-aware routing over a city road network.
//!
//! The engine fuses a static road topology with a live, sparse congestion
//! feed: per-segment congestion observations are propagated onto the graph
//! edges they cover, every edge gets an adjusted travel time (`itime`), and
//! route queries run Dijkstra over the adjusted weights. The congestion
//! overlay is rebuilt on demand, at most once per refresh interval per
//! session, and cached as a persisted graph snapshot in between.

pub mod algo;
pub mod engine;
pub mod error;
pub mod loading;
pub mod model;
pub mod prelude;
pub mod routing;
pub mod snapshot;

pub use error::Error;
pub use model::CongestionLevel;

/// Identifier of a street segment in the congestion feed.
pub type SegmentId = i64;

/// External (source) identifier of a road graph node.
pub type SourceNodeId = i64;

/// Speed assumed for edges whose source data carries none, in km/h.
pub const GENERIC_SPEED_KMH: f64 = 30.0;

/// Congestion level assumed for edges without an observation.
pub const GENERIC_CONGESTION: CongestionLevel = CongestionLevel::Dense;

/// How long a congestion overlay stays fresh, in seconds.
pub const REFRESH_INTERVAL_SECS: i64 = 300;
