//! Congestion feed boundary: wire parsing and the HTTP adapter

mod http;
mod parser;

pub use http::{FeedConfig, HttpFeed};
pub use parser::{parse_congestions, parse_segments};

use hashbrown::HashMap;

use crate::model::{Congestion, Highway};
use crate::{Error, SegmentId};

/// External collaborator that supplies street segments and their current
/// congestion observations.
///
/// Both fetches are plain pulls of tabular data; implementations skip
/// malformed rows rather than failing the whole fetch.
pub trait CongestionFeed {
    /// # Errors
    ///
    /// Returns [`Error::FeedUnavailable`] when the feed cannot be reached
    /// or times out.
    fn fetch_segments(&self) -> Result<HashMap<SegmentId, Highway>, Error>;

    /// # Errors
    ///
    /// Returns [`Error::FeedUnavailable`] when the feed cannot be reached
    /// or times out.
    fn fetch_congestions(&self) -> Result<HashMap<SegmentId, Congestion>, Error>;
}
