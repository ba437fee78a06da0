//! In-memory records produced by the conversion pipeline.

use chrono::NaiveDate;

/// Service identifier used when a timetable row carries no day pattern.
pub const DEFAULT_SERVICE_ID: &str = "DAILY";

/// A stop from the stop registry.
#[derive(Debug, Clone, PartialEq)]
pub struct Stop {
    pub id: String,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RouteType {
    #[default]
    Bus,
}

impl RouteType {
    /// Numeric `route_type` code of the transit feed format.
    pub fn code(self) -> u8 {
        match self {
            RouteType::Bus => 3,
        }
    }
}

/// One row of a route sheet: a departure time at a named stop.
#[derive(Debug, Clone, PartialEq)]
pub struct TimetableEntry {
    pub day: String,
    /// Raw `HHMM`-like token as it appears in the sheet
    pub time: String,
    pub stop_name: String,
}

/// A route parsed from one sheet, with its timetable in sheet order.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub id: String,
    pub short_name: String,
    pub long_name: String,
    pub route_type: RouteType,
    pub timetable: Vec<TimetableEntry>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Trip {
    pub route_id: String,
    pub service_id: String,
    pub trip_id: String,
    /// Always empty; directions are not modeled.
    pub direction_id: Option<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StopTime {
    pub trip_id: String,
    pub arrival_time: String,
    pub departure_time: String,
    pub stop_id: String,
    pub stop_sequence: u32,
}

/// A calendar pattern that trips run under.
#[derive(Debug, Clone, PartialEq)]
pub struct Service {
    pub service_id: String,
    pub monday: bool,
    pub tuesday: bool,
    pub wednesday: bool,
    pub thursday: bool,
    pub friday: bool,
    pub saturday: bool,
    pub sunday: bool,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl Service {
    pub fn runs_every_day(&self) -> bool {
        self.monday
            && self.tuesday
            && self.wednesday
            && self.thursday
            && self.friday
            && self.saturday
            && self.sunday
    }
}

/// Outcome of looking up a timetable stop name in the stop registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopResolution {
    /// The name matched a registry stop; holds its id.
    Resolved(String),
    /// No registry stop has this name; holds the raw name.
    Unresolved(String),
}

impl StopResolution {
    /// The value written to `stop_id`: the registry id, or the raw name.
    pub fn stop_id(&self) -> &str {
        match self {
            StopResolution::Resolved(id) => id,
            StopResolution::Unresolved(name) => name,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, StopResolution::Resolved(_))
    }
}
