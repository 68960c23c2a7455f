//! Wire-format parsing for the congestion feed's CSV exports

use std::io::Read;

use hashbrown::HashMap;
use log::debug;

use crate::SegmentId;
use crate::model::{Congestion, CongestionLevel, Highway};

/// Parse the street-segment export: one row per segment after the header,
/// `id,description,"lon,lat,lon,lat,..."`.
///
/// Malformed rows (unparseable id, bad coordinate numbers, odd-length
/// polylines) are skipped.
pub fn parse_segments<R: Read>(reader: R) -> HashMap<SegmentId, Highway> {
    let mut segments = HashMap::new();

    for row in csv::Reader::from_reader(reader)
        .deserialize::<(String, String, String)>()
        .filter_map(Result::ok)
    {
        let (raw_id, description, raw_coordinates) = row;

        let Ok(id) = raw_id.trim().parse::<SegmentId>() else {
            debug!("Skipping segment row with id '{raw_id}'");
            continue;
        };
        let Some(coordinates) = parse_polyline(&raw_coordinates) else {
            debug!("Skipping segment {id}: bad polyline");
            continue;
        };

        segments.insert(
            id,
            Highway {
                description,
                coordinates,
            },
        );
    }

    segments
}

/// Parse the congestion export: one `#`-separated row per segment after the
/// header, `id#yyyymmddHHMMSS#state#next_state`.
///
/// Rows with missing fields or out-of-range states are skipped.
pub fn parse_congestions<R: Read>(reader: R) -> HashMap<SegmentId, Congestion> {
    let mut congestions = HashMap::new();

    for record in csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(reader)
        .records()
        .filter_map(Result::ok)
    {
        let Some(row) = record.get(0) else { continue };

        let Some((id, observation)) = parse_congestion_row(row) else {
            debug!("Skipping congestion row '{row}'");
            continue;
        };
        congestions.insert(id, observation);
    }

    congestions
}

fn parse_congestion_row(row: &str) -> Option<(SegmentId, Congestion)> {
    let mut fields = row.split('#');
    let id = fields.next()?.trim().parse::<SegmentId>().ok()?;
    let _data_hour = fields.next()?;
    let state = parse_level(fields.next()?)?;
    let next_state = parse_level(fields.next()?)?;

    Some((id, Congestion { state, next_state }))
}

fn parse_level(field: &str) -> Option<CongestionLevel> {
    let raw = field.trim().parse::<u8>().ok()?;
    CongestionLevel::try_from(raw).ok()
}

/// A polyline is a comma-separated, even-length list of lon/lat values.
fn parse_polyline(raw: &str) -> Option<Vec<f64>> {
    let coordinates = raw
        .split(',')
        .map(|value| value.trim().parse::<f64>())
        .collect::<Result<Vec<f64>, _>>()
        .ok()?;

    if coordinates.is_empty() || coordinates.len() % 2 != 0 {
        return None;
    }
    Some(coordinates)
}
