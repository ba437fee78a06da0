//! Feed assembly: runs every stage and collects the seven output tables.

use std::collections::HashSet;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::calendar::{build_default_calendar, year_bounds};
use crate::config::{AgencyConfig, ConverterConfig, PublisherConfig, UnresolvedStopPolicy};
use crate::error::FeedError;
use crate::model::{Route, Service, Stop, StopTime, Trip};
use crate::sheet::{RouteSheetParser, Sheet, is_route_sheet};
use crate::stops::{RawStopRow, build_stops};
use crate::trips::{UnresolvedStop, assemble};

#[derive(Debug, Clone, PartialEq)]
pub struct Agency {
    pub id: String,
    pub name: String,
    pub url: String,
    pub timezone: String,
    pub lang: String,
}

impl From<&AgencyConfig> for Agency {
    fn from(config: &AgencyConfig) -> Self {
        Self {
            id: config.id.clone(),
            name: config.name.clone(),
            url: config.url.clone(),
            timezone: config.timezone.clone(),
            lang: config.lang.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeedInfo {
    pub publisher_name: String,
    pub publisher_url: String,
    pub lang: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// `Y-M-D` of the reference date, without zero padding
    pub version: String,
}

impl FeedInfo {
    pub fn new(publisher: &PublisherConfig, reference: NaiveDate) -> Self {
        let (start_date, end_date) = year_bounds(reference);
        Self {
            publisher_name: publisher.name.clone(),
            publisher_url: publisher.url.clone(),
            lang: publisher.lang.clone(),
            start_date,
            end_date,
            version: format!(
                "{}-{}-{}",
                reference.year(),
                reference.month(),
                reference.day()
            ),
        }
    }
}

/// The seven tables of a generated feed, ready for serialization.
#[derive(Debug, Clone)]
pub struct Feed {
    pub agency: Vec<Agency>,
    pub stops: Vec<Stop>,
    pub routes: Vec<Route>,
    pub trips: Vec<Trip>,
    pub stop_times: Vec<StopTime>,
    pub calendar: Vec<Service>,
    pub feed_info: Vec<FeedInfo>,
    pub summary: FeedSummary,
}

/// What happened during a conversion run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FeedSummary {
    pub stops: usize,
    pub routes: usize,
    pub trips: usize,
    pub stop_times: usize,
    /// Non-route sheets and route sheets with fewer than three rows
    pub skipped_sheets: Vec<String>,
    /// Route sheets whose label has no digits
    pub discarded_sheets: Vec<String>,
    pub duplicate_route_ids: Vec<String>,
    pub unresolved_stops: Vec<UnresolvedStop>,
}

/// Parses every route sheet in workbook order.
///
/// Sheets whose label does not start with `ROUTE` are skipped, as are sheets
/// too short to hold a timetable and sheets whose label yields an empty id.
pub fn parse_routes(sheets: &[Sheet], summary: &mut FeedSummary) -> Vec<Route> {
    let parser = RouteSheetParser::default();
    let mut seen = HashSet::new();
    let mut routes = Vec::new();

    for sheet in sheets {
        if !is_route_sheet(&sheet.label) {
            debug!(sheet = %sheet.label, "Not a route sheet, skipping");
            summary.skipped_sheets.push(sheet.label.clone());
            continue;
        }

        let Some(route) = parser.parse_sheet(&sheet.rows, &sheet.label) else {
            summary.skipped_sheets.push(sheet.label.clone());
            continue;
        };

        if route.id.is_empty() {
            warn!(sheet = %sheet.label, "Route sheet label has no digits, discarding");
            summary.discarded_sheets.push(sheet.label.clone());
            continue;
        }

        if !seen.insert(route.id.clone()) {
            warn!(sheet = %sheet.label, route_id = %route.id, "Duplicate route id");
            summary.duplicate_route_ids.push(route.id.clone());
        }

        routes.push(route);
    }

    routes
}

/// Runs the whole conversion for one workbook and one stop list.
///
/// # Errors
///
/// Any stop row with an unparsable location aborts the run. With
/// [`UnresolvedStopPolicy::Fail`], so does the first timetable stop name
/// missing from the stop list.
#[tracing::instrument(skip_all, fields(sheets = sheets.len(), stop_rows = stop_rows.len(), %reference))]
pub fn assemble_feed(
    sheets: &[Sheet],
    stop_rows: &[RawStopRow],
    reference: NaiveDate,
    config: &ConverterConfig,
) -> Result<Feed, FeedError> {
    let stops = build_stops(stop_rows)?;

    let mut summary = FeedSummary::default();
    let routes = parse_routes(sheets, &mut summary);
    info!(routes = routes.len(), "Route sheets parsed");

    let assembled = assemble(&routes, &stops);
    if config.unresolved_stops == UnresolvedStopPolicy::Fail {
        if let Some(missing) = assembled.unresolved.first() {
            return Err(FeedError::UnresolvedStop {
                route_id: missing.route_id.clone(),
                stop_name: missing.stop_name.clone(),
            });
        }
    }

    summary.stops = stops.len();
    summary.routes = routes.len();
    summary.trips = assembled.trips.len();
    summary.stop_times = assembled.stop_times.len();
    summary.unresolved_stops = assembled.unresolved;

    info!(
        stops = summary.stops,
        routes = summary.routes,
        trips = summary.trips,
        unresolved = summary.unresolved_stops.len(),
        "Feed assembled"
    );

    Ok(Feed {
        agency: vec![Agency::from(&config.agency)],
        stops,
        routes,
        trips: assembled.trips,
        stop_times: assembled.stop_times,
        calendar: vec![build_default_calendar(reference)],
        feed_info: vec![FeedInfo::new(&config.publisher, reference)],
        summary,
    })
}
