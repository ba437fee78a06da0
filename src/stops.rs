//! Stop registry built from the stop-location file.

use std::io::Read;

use csv::{ReaderBuilder, Trim};
use serde::Deserialize;
use tracing::{debug, info};

use crate::coordinate::parse_coordinate;
use crate::error::StopError;
use crate::model::Stop;

/// A row of the stop file as it appears on disk.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawStopRow {
    #[serde(rename = "ID", default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    /// `POINT(lon lat)` or `lon lat`
    #[serde(rename = "WKT", default)]
    pub location: Option<String>,
}

/// Reads stop rows from a delimited file with an `ID,name,WKT` header.
///
/// Blank lines are skipped and fields are trimmed.
pub fn read_stop_rows<R: Read>(reader: R) -> Result<Vec<RawStopRow>, StopError> {
    let mut rdr = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(reader);

    let mut rows = Vec::new();
    for result in rdr.deserialize() {
        let row: RawStopRow = result?;
        rows.push(row);
    }

    debug!(rows = rows.len(), "Stop file read");
    Ok(rows)
}

/// Builds the stop registry, synthesizing `STOP_<i>` / `Stop <i>` for rows
/// without an id or name.
///
/// # Errors
///
/// [`StopError::StopParsingFailed`] for the first row whose location does not
/// parse. No stops are returned in that case.
#[tracing::instrument(skip_all, fields(rows = rows.len()))]
pub fn build_stops(rows: &[RawStopRow]) -> Result<Vec<Stop>, StopError> {
    let mut stops = Vec::with_capacity(rows.len());

    for (index, row) in rows.iter().enumerate() {
        let row_number = index + 1;

        let location = row.location.as_deref().unwrap_or_default();
        let coordinate =
            parse_coordinate(location).map_err(|source| StopError::StopParsingFailed {
                row: row_number,
                source,
            })?;

        stops.push(Stop {
            id: present(&row.id).unwrap_or_else(|| format!("STOP_{row_number}")),
            name: present(&row.name).unwrap_or_else(|| format!("Stop {row_number}")),
            lat: coordinate.lat,
            lon: coordinate.lon,
        });
    }

    info!(stops = stops.len(), "Stop registry built");
    Ok(stops)
}

fn present(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
