//! Serialization of the feed tables and the conversion summary.
//!
//! Each table is written as a comma-separated `.txt` file with a fixed header,
//! even when it has no rows.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info};

use crate::calendar::format_date;
use crate::feed::{Agency, Feed, FeedInfo, FeedSummary};
use crate::model::{Route, Service, Stop, StopTime, Trip};
use csv::WriterBuilder;
use std::fs;
use std::path::{Path, PathBuf};

pub const AGENCY_HEADER: &[&str] = &[
    "agency_id",
    "agency_name",
    "agency_url",
    "agency_timezone",
    "agency_lang",
];
pub const CALENDAR_HEADER: &[&str] = &[
    "service_id",
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
    "start_date",
    "end_date",
];
pub const FEED_INFO_HEADER: &[&str] = &[
    "feed_publisher_name",
    "feed_publisher_url",
    "feed_lang",
    "feed_start_date",
    "feed_end_date",
    "feed_version",
];
pub const ROUTES_HEADER: &[&str] = &[
    "route_id",
    "route_short_name",
    "route_long_name",
    "route_type",
];
pub const STOPS_HEADER: &[&str] = &["stop_id", "stop_name", "stop_lat", "stop_lon"];
pub const TRIPS_HEADER: &[&str] = &["route_id", "service_id", "trip_id", "direction_id"];
pub const STOP_TIMES_HEADER: &[&str] = &[
    "trip_id",
    "arrival_time",
    "departure_time",
    "stop_id",
    "stop_sequence",
];

#[derive(Serialize)]
struct AgencyRow<'a>(&'a str, &'a str, &'a str, &'a str, &'a str);

impl<'a> From<&'a Agency> for AgencyRow<'a> {
    fn from(a: &'a Agency) -> Self {
        AgencyRow(&a.id, &a.name, &a.url, &a.timezone, &a.lang)
    }
}

#[derive(Serialize)]
struct CalendarRow<'a>(&'a str, u8, u8, u8, u8, u8, u8, u8, String, String);

impl<'a> From<&'a Service> for CalendarRow<'a> {
    fn from(s: &'a Service) -> Self {
        CalendarRow(
            &s.service_id,
            u8::from(s.monday),
            u8::from(s.tuesday),
            u8::from(s.wednesday),
            u8::from(s.thursday),
            u8::from(s.friday),
            u8::from(s.saturday),
            u8::from(s.sunday),
            format_date(s.start_date),
            format_date(s.end_date),
        )
    }
}

#[derive(Serialize)]
struct FeedInfoRow<'a>(&'a str, &'a str, &'a str, String, String, &'a str);

impl<'a> From<&'a FeedInfo> for FeedInfoRow<'a> {
    fn from(f: &'a FeedInfo) -> Self {
        FeedInfoRow(
            &f.publisher_name,
            &f.publisher_url,
            &f.lang,
            format_date(f.start_date),
            format_date(f.end_date),
            &f.version,
        )
    }
}

#[derive(Serialize)]
struct RouteRow<'a>(&'a str, String, String, u8);

impl<'a> From<&'a Route> for RouteRow<'a> {
    fn from(r: &'a Route) -> Self {
        RouteRow(
            &r.id,
            r.short_name.replace(',', ""),
            r.long_name.replace(',', ""),
            r.route_type.code(),
        )
    }
}

#[derive(Serialize)]
struct StopRow<'a>(&'a str, &'a str, f64, f64);

impl<'a> From<&'a Stop> for StopRow<'a> {
    fn from(s: &'a Stop) -> Self {
        StopRow(&s.id, &s.name, s.lat, s.lon)
    }
}

#[derive(Serialize)]
struct TripRow<'a>(&'a str, &'a str, &'a str, Option<u8>);

impl<'a> From<&'a Trip> for TripRow<'a> {
    fn from(t: &'a Trip) -> Self {
        TripRow(&t.route_id, &t.service_id, &t.trip_id, t.direction_id)
    }
}

#[derive(Serialize)]
struct StopTimeRow<'a>(&'a str, &'a str, &'a str, &'a str, u32);

impl<'a> From<&'a StopTime> for StopTimeRow<'a> {
    fn from(s: &'a StopTime) -> Self {
        StopTimeRow(
            &s.trip_id,
            &s.arrival_time,
            &s.departure_time,
            &s.stop_id,
            s.stop_sequence,
        )
    }
}

/// Writes one table: the header line, then one serialized row per record.
pub fn write_table<T: Serialize>(
    path: &Path,
    header: &[&str],
    rows: impl IntoIterator<Item = T>,
) -> Result<()> {
    let file = fs::File::create(path)
        .with_context(|| format!("failed to create '{}'", path.display()))?;

    let mut writer = WriterBuilder::new()
        .has_headers(false) // header is written explicitly so empty tables keep it
        .from_writer(file);

    writer.write_record(header)?;
    let mut count = 0usize;
    for row in rows {
        writer.serialize(row)?;
        count += 1;
    }
    writer.flush()?;

    debug!(path = %path.display(), rows = count, "Table written");
    Ok(())
}

/// Writes all seven tables into `dir`, creating it if needed. Returns the
/// written paths.
#[tracing::instrument(skip_all, fields(dir = %dir.display()))]
pub fn write_feed(feed: &Feed, dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create output directory '{}'", dir.display()))?;

    let path = |name: &str| dir.join(name);
    let written = vec![
        path("agency.txt"),
        path("calendar.txt"),
        path("feed_info.txt"),
        path("routes.txt"),
        path("stops.txt"),
        path("trips.txt"),
        path("stop_times.txt"),
    ];

    write_table(&written[0], AGENCY_HEADER, feed.agency.iter().map(AgencyRow::from))?;
    write_table(&written[1], CALENDAR_HEADER, feed.calendar.iter().map(CalendarRow::from))?;
    write_table(&written[2], FEED_INFO_HEADER, feed.feed_info.iter().map(FeedInfoRow::from))?;
    write_table(&written[3], ROUTES_HEADER, feed.routes.iter().map(RouteRow::from))?;
    write_table(&written[4], STOPS_HEADER, feed.stops.iter().map(StopRow::from))?;
    write_table(&written[5], TRIPS_HEADER, feed.trips.iter().map(TripRow::from))?;
    write_table(&written[6], STOP_TIMES_HEADER, feed.stop_times.iter().map(StopTimeRow::from))?;

    info!(tables = written.len(), "Feed tables written");
    Ok(written)
}

/// Logs the conversion summary using Rust's debug pretty-print format.
pub fn print_pretty(summary: &FeedSummary) {
    debug!("{:#?}", summary);
}

/// Logs the conversion summary as pretty-printed JSON.
pub fn print_json(summary: &FeedSummary) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(summary)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RouteType;
    use std::env;

    fn temp_path(name: &str) -> PathBuf {
        env::temp_dir().join(name)
    }

    #[test]
    fn test_write_table_empty_keeps_header() {
        let path = temp_path("gtfs_sheet_builder_test_empty.txt");
        let _ = fs::remove_file(&path);

        write_table(&path, TRIPS_HEADER, Vec::<TripRow>::new()).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "route_id,service_id,trip_id,direction_id\n");

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_route_row_strips_commas() {
        let path = temp_path("gtfs_sheet_builder_test_routes.txt");
        let _ = fs::remove_file(&path);

        let route = Route {
            id: "1".to_string(),
            short_name: "ROUTE 1".to_string(),
            long_name: "KAB, KHAR, P.TIMUR".to_string(),
            route_type: RouteType::Bus,
            timetable: vec![],
        };
        write_table(&path, ROUTES_HEADER, [RouteRow::from(&route)]).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines[1], "1,ROUTE 1,KAB KHAR P.TIMUR,3");

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_trip_and_stop_time_rows() {
        let path = temp_path("gtfs_sheet_builder_test_trip_rows.txt");
        let _ = fs::remove_file(&path);

        let trip = Trip {
            route_id: "1".to_string(),
            service_id: "DAILY".to_string(),
            trip_id: "R1_DAILY_0700_1".to_string(),
            direction_id: None,
        };
        write_table(&path, TRIPS_HEADER, [TripRow::from(&trip)]).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().nth(1), Some("1,DAILY,R1_DAILY_0700_1,"));

        let stop_time = StopTime {
            trip_id: "R1_DAILY_0700_1".to_string(),
            arrival_time: "07:00:00".to_string(),
            departure_time: "07:00:00".to_string(),
            stop_id: "S1".to_string(),
            stop_sequence: 1,
        };
        write_table(&path, STOP_TIMES_HEADER, [StopTimeRow::from(&stop_time)]).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(
            content.lines().nth(1),
            Some("R1_DAILY_0700_1,07:00:00,07:00:00,S1,1")
        );

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_print_json_does_not_panic() {
        print_json(&FeedSummary::default()).unwrap();
        print_pretty(&FeedSummary::default());
    }
}
