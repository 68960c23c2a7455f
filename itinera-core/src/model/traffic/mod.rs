//! Traffic overlay types sourced from the congestion feed

pub mod data;
pub mod itime;

pub use data::{Congestion, CongestionBand, CongestionLevel, Highway};
pub use itime::adjusted_time;
