//! Adjusted travel time ("itime") computation

use super::data::CongestionLevel;
use crate::GENERIC_CONGESTION;

/// Congestion-adjusted travel time for an edge, or `None` when the edge is
/// impassable.
///
/// Levels 1-5 scale the free-flow time by `sqrt(level)`: the penalty grows
/// with severity, damped so heavy congestion does not dwarf every possible
/// detour. `NoData` falls back to the generic default level.
pub fn adjusted_time(free_flow_time: f64, level: CongestionLevel) -> Option<f64> {
    let level = match level {
        CongestionLevel::Cut => return None,
        CongestionLevel::NoData => GENERIC_CONGESTION,
        other => other,
    };

    Some(free_flow_time * f64::from(level.raw()).sqrt())
}
