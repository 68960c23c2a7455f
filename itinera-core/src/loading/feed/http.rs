//! HTTP adapter for the open-data congestion feed

use std::time::Duration;

use hashbrown::HashMap;

use super::{CongestionFeed, parse_congestions, parse_segments};
use crate::model::{Congestion, Highway};
use crate::{Error, SegmentId};

const SEGMENTS_URL: &str = "https://opendata-ajuntament.barcelona.cat/data/dataset/1090983a-1c40-4609-8620-14ad49aae3ab/resource/1d6c814c-70ef-4147-aa16-a49ddb952f72/download/transit_relacio_trams.csv";
const CONGESTIONS_URL: &str = "https://opendata-ajuntament.barcelona.cat/data/dataset/8319c2b1-4c21-4962-9acd-6db4c5ff1148/resource/2d456eb5-4ea6-4f68-9794-2f3f1a58a933/download";

#[derive(Debug, Clone)]
pub struct FeedConfig {
    pub segments_url: String,
    pub congestions_url: String,
    pub timeout: Duration,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            segments_url: SEGMENTS_URL.to_string(),
            congestions_url: CONGESTIONS_URL.to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Pull-based congestion feed over HTTP.
///
/// Fetches are bounded by the configured timeout; any transport failure
/// surfaces as [`Error::FeedUnavailable`] so the caller can fall back to a
/// previously persisted overlay.
#[derive(Debug, Clone)]
pub struct HttpFeed {
    config: FeedConfig,
    client: reqwest::blocking::Client,
}

impl HttpFeed {
    /// # Errors
    ///
    /// Returns [`Error::FeedUnavailable`] when the HTTP client cannot be
    /// constructed.
    pub fn new(config: FeedConfig) -> Result<Self, Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::FeedUnavailable(e.to_string()))?;

        Ok(Self { config, client })
    }

    fn get(&self, url: &str) -> Result<String, Error> {
        self.client
            .get(url)
            .send()
            .and_then(|response| response.error_for_status())
            .and_then(|response| response.text())
            .map_err(|e| Error::FeedUnavailable(e.to_string()))
    }
}

impl CongestionFeed for HttpFeed {
    fn fetch_segments(&self) -> Result<HashMap<SegmentId, Highway>, Error> {
        let body = self.get(&self.config.segments_url)?;
        Ok(parse_segments(body.as_bytes()))
    }

    fn fetch_congestions(&self) -> Result<HashMap<SegmentId, Congestion>, Error> {
        let body = self.get(&self.config.congestions_url)?;
        Ok(parse_congestions(body.as_bytes()))
    }
}
