//! Data model for congestion-aware road routing
//!
//! Contains the road graph, its spatial index, and the traffic overlay types.

// Re-export of main modules
pub mod streets;
pub mod traffic;

// Re-export of basic types for convenience
pub use streets::{IndexedPoint, RoadEdge, RoadGraph, RoadNode};
pub use traffic::{Congestion, CongestionBand, CongestionLevel, Highway, adjusted_time};
