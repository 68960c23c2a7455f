use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Snapshot '{0}' does not deserialize to a road graph")]
    CorruptSnapshot(String),
    #[error("Congestion feed unavailable: {0}")]
    FeedUnavailable(String),
    #[error("No congestion overlay available for routing")]
    NoRouteData,
    #[error("Coordinate could not be resolved to a graph node")]
    UnresolvableCoordinate,
    #[error("Invalid data: {0}")]
    InvalidData(String),
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}
