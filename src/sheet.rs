//! Route sheets: workbook loading and timetable extraction.
//!
//! A route sheet looks like
//!
//! ```text
//! ROUTE 1: KAB - KHAR - P.TIMUR
//! TIME | STOP
//! 0700 | KAB
//! 0730 | KHAR
//! ```
//!
//! Row 0 names the route, row 1 holds column headers and every following row
//! is a candidate timetable entry. Rows matching a [`SkipRule`] are dropped.

use std::io::Cursor;

use calamine::{Data, Reader, open_workbook_auto_from_rs};
use tracing::debug;

use crate::error::FeedError;
use crate::model::{DEFAULT_SERVICE_ID, Route, RouteType, TimetableEntry};

const ROUTE_SHEET_PREFIX: &str = "ROUTE";
const FIRST_TIMETABLE_ROW: usize = 2;

/// One worksheet as a grid of trimmed cell text.
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub label: String,
    pub rows: Vec<Vec<String>>,
}

/// A candidate timetable row: column 0 is the time, column 1 the stop.
#[derive(Debug, Clone, Copy)]
pub struct RowCells<'a> {
    pub time: &'a str,
    pub stop: &'a str,
}

/// Rules that mark a sheet row as something other than a timetable entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipRule {
    /// Time or stop cell is empty
    MissingCell,
    /// Stop cell contains the text, case-insensitive
    StopContains(String),
    /// Time cell equals the text, case-insensitive
    TimeEquals(String),
}

impl SkipRule {
    pub fn matches(&self, cells: RowCells<'_>) -> bool {
        match self {
            SkipRule::MissingCell => cells.time.is_empty() || cells.stop.is_empty(),
            SkipRule::StopContains(needle) => cells
                .stop
                .to_uppercase()
                .contains(&needle.to_uppercase()),
            SkipRule::TimeEquals(label) => cells.time.eq_ignore_ascii_case(label),
        }
    }
}

/// Parses route sheets with a configurable set of [`SkipRule`]s.
#[derive(Debug, Clone)]
pub struct RouteSheetParser {
    skip_rules: Vec<SkipRule>,
}

impl Default for RouteSheetParser {
    fn default() -> Self {
        Self {
            skip_rules: vec![
                SkipRule::MissingCell,
                SkipRule::StopContains("TOTAL".to_string()),
                SkipRule::StopContains("NO BUS".to_string()),
                SkipRule::TimeEquals("TIME".to_string()),
            ],
        }
    }
}

impl RouteSheetParser {
    pub fn with_rule(mut self, rule: SkipRule) -> Self {
        self.skip_rules.push(rule);
        self
    }

    pub fn should_skip(&self, cells: RowCells<'_>) -> bool {
        self.skip_rules.iter().any(|rule| rule.matches(cells))
    }

    /// Extracts a [`Route`] from a sheet.
    ///
    /// Returns `None` for sheets with fewer than three rows. The route id is
    /// every digit of `label` in order, and may be empty.
    pub fn parse_sheet(&self, rows: &[Vec<String>], label: &str) -> Option<Route> {
        if rows.len() < 3 {
            debug!(sheet = label, rows = rows.len(), "Sheet too short, skipping");
            return None;
        }

        let id = route_id_from_label(label);
        let identity = cell(&rows[0], 0);
        let (short, long) = match identity.split_once(':') {
            Some((short, long)) => (short.trim(), long.trim()),
            None => (identity, ""),
        };

        let short_name = if short.is_empty() {
            format!("ROUTE {id}")
        } else {
            short.to_string()
        };
        let long_name = if long.is_empty() {
            format!("Route {id}")
        } else {
            long.to_string()
        };

        let timetable: Vec<TimetableEntry> = rows[FIRST_TIMETABLE_ROW..]
            .iter()
            .filter_map(|row| {
                let cells = RowCells {
                    time: cell(row, 0),
                    stop: cell(row, 1),
                };
                if self.should_skip(cells) {
                    return None;
                }
                Some(TimetableEntry {
                    day: DEFAULT_SERVICE_ID.to_string(),
                    time: cells.time.to_string(),
                    stop_name: cells.stop.to_string(),
                })
            })
            .collect();

        debug!(
            sheet = label,
            route_id = %id,
            entries = timetable.len(),
            "Route sheet parsed"
        );

        Some(Route {
            id,
            short_name,
            long_name,
            route_type: RouteType::Bus,
            timetable,
        })
    }
}

/// Every ASCII digit of a sheet label, in order. `"ROUTE 3"` gives `"3"`.
pub fn route_id_from_label(label: &str) -> String {
    label.chars().filter(char::is_ascii_digit).collect()
}

/// Whether a sheet holds route data, by its label.
pub fn is_route_sheet(label: &str) -> bool {
    label
        .get(..ROUTE_SHEET_PREFIX.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(ROUTE_SHEET_PREFIX))
}

fn cell(row: &[String], column: usize) -> &str {
    row.get(column).map(|c| c.trim()).unwrap_or_default()
}

/// Loads every worksheet of a spreadsheet (xlsx, xls, ods) as text grids, in
/// workbook order.
pub fn read_workbook(bytes: Vec<u8>) -> Result<Vec<Sheet>, FeedError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;

    let mut sheets = Vec::new();
    for label in workbook.sheet_names() {
        let range = workbook.worksheet_range(&label)?;
        let rows = range
            .rows()
            .map(|row| row.iter().map(cell_text).collect())
            .collect();
        sheets.push(Sheet { label, rows });
    }

    debug!(sheets = sheets.len(), "Workbook read");
    Ok(sheets)
}

fn cell_text(data: &Data) -> String {
    match data {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        other => other.to_string(),
    }
}
