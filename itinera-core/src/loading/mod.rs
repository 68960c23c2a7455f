//! Topology acquisition boundary and road graph construction

pub mod builder;
pub mod feed;

pub use builder::build_road_graph;

use crate::{Error, SourceNodeId};

/// Raw topology node as delivered by the acquisition collaborator.
#[derive(Debug, Clone)]
pub struct RawNode {
    pub id: SourceNodeId,
    pub lon: f64,
    pub lat: f64,
}

/// Raw topology edge as delivered by the acquisition collaborator.
///
/// `maxspeed` may be empty (no speed data) or carry several values when the
/// source tags a way with more than one limit; the builder averages them.
#[derive(Debug, Clone)]
pub struct RawEdge {
    pub from: SourceNodeId,
    pub to: SourceNodeId,
    pub length: f64,
    pub maxspeed: Vec<f64>,
}

/// Base road topology before graph construction.
#[derive(Debug, Clone, Default)]
pub struct RawTopology {
    pub nodes: Vec<RawNode>,
    pub edges: Vec<RawEdge>,
}

/// External collaborator that acquires the base road topology of a place.
pub trait TopologyProvider {
    /// # Errors
    ///
    /// Implementations report download or decoding failures as
    /// [`Error::InvalidData`] or [`Error::IoError`].
    fn download(&self, place: &str) -> Result<RawTopology, Error>;
}
