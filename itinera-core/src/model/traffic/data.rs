//! Street segments and congestion observations

use geo::Point;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// Discrete congestion severity code carried by the feed.
///
/// `Cut` marks an impassable segment; edges that receive it are removed
/// from the graph instead of being kept with a sentinel weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CongestionLevel {
    NoData = 0,
    VeryFluid = 1,
    Fluid = 2,
    Dense = 3,
    VeryDense = 4,
    Congested = 5,
    Cut = 6,
}

impl CongestionLevel {
    /// Raw feed code, 0-6.
    pub fn raw(self) -> u8 {
        self as u8
    }

    /// Three-band classification consumed by the rendering collaborator.
    ///
    /// `NoData` is treated like the generic default level, i.e. medium.
    pub fn band(self) -> CongestionBand {
        match self {
            Self::VeryFluid | Self::Fluid => CongestionBand::Low,
            Self::NoData | Self::Dense | Self::VeryDense => CongestionBand::Medium,
            Self::Congested | Self::Cut => CongestionBand::High,
        }
    }
}

impl TryFrom<u8> for CongestionLevel {
    type Error = crate::Error;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        match raw {
            0 => Ok(Self::NoData),
            1 => Ok(Self::VeryFluid),
            2 => Ok(Self::Fluid),
            3 => Ok(Self::Dense),
            4 => Ok(Self::VeryDense),
            5 => Ok(Self::Congested),
            6 => Ok(Self::Cut),
            other => Err(crate::Error::InvalidData(format!(
                "congestion state {other} outside 0-6"
            ))),
        }
    }
}

/// Coarse congestion classification for route display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CongestionBand {
    Low,
    Medium,
    High,
}

/// A street segment from the feed's topology reference data.
///
/// The polyline is a flat, even-length lon/lat sequence describing the
/// segment's reference geometry, independent of how many graph edges the
/// segment maps onto.
#[derive(Debug, Clone, PartialEq)]
pub struct Highway {
    pub description: String,
    pub coordinates: Vec<f64>,
}

impl Highway {
    /// Polyline vertices as points (x = longitude, y = latitude).
    pub fn points(&self) -> Vec<Point<f64>> {
        self.coordinates
            .iter()
            .tuples()
            .map(|(&lon, &lat)| Point::new(lon, lat))
            .collect()
    }
}

/// A congestion observation for one street segment.
///
/// `next_state` is the feed's short-term prediction; it is carried for
/// external consumers and not used by routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Congestion {
    pub state: CongestionLevel,
    pub next_state: CongestionLevel,
}
