//! Shortest-path queries over the road graph

pub mod dijkstra;

pub use dijkstra::{Weight, shortest_path};
