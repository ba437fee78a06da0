//! Joins route timetables against the stop registry into trips and stop times.

use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, warn};

use crate::model::{DEFAULT_SERVICE_ID, Route, Stop, StopResolution, StopTime, Trip};

/// A timetable stop name that matched no registry stop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnresolvedStop {
    pub route_id: String,
    pub trip_id: String,
    pub stop_name: String,
}

/// Trips and stop times in route order, then timetable order.
#[derive(Debug, Default)]
pub struct AssembledTrips {
    pub trips: Vec<Trip>,
    pub stop_times: Vec<StopTime>,
    pub unresolved: Vec<UnresolvedStop>,
}

/// Case-insensitive stop-name lookup. The first stop with a given name wins.
pub struct StopIndex<'a> {
    by_name: HashMap<String, &'a str>,
}

impl<'a> StopIndex<'a> {
    pub fn new(stops: &'a [Stop]) -> Self {
        let mut by_name = HashMap::with_capacity(stops.len());
        for stop in stops {
            by_name
                .entry(stop.name.to_uppercase())
                .or_insert(stop.id.as_str());
        }
        Self { by_name }
    }

    pub fn resolve(&self, stop_name: &str) -> StopResolution {
        match self.by_name.get(&stop_name.to_uppercase()) {
            Some(id) => StopResolution::Resolved(id.to_string()),
            None => StopResolution::Unresolved(stop_name.to_string()),
        }
    }
}

/// `R<route>_<service>_<time>_<position>`, position 1-based within the route.
pub fn build_trip_id(route_id: &str, service_id: &str, time: &str, position: usize) -> String {
    format!("R{route_id}_{service_id}_{time}_{position}")
}

/// Renders an `HHMM` token as `HH:MM:00`, left-padding short tokens with zeros.
///
/// `"700"` gives `"07:00:00"`; an empty token stays empty.
pub fn format_time(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }

    let padded = format!("{raw:0>4}");
    let chars: Vec<char> = padded.chars().collect();
    let hours: String = chars[..2].iter().collect();
    let minutes: String = chars[2..4].iter().collect();
    format!("{hours}:{minutes}:00")
}

/// Emits one trip and one stop time per timetable entry.
///
/// Unmatched stop names are kept verbatim as the stop id and reported in
/// [`AssembledTrips::unresolved`].
#[tracing::instrument(skip_all, fields(routes = routes.len(), stops = stops.len()))]
pub fn assemble(routes: &[Route], stops: &[Stop]) -> AssembledTrips {
    let index = StopIndex::new(stops);
    let mut out = AssembledTrips::default();

    for route in routes {
        for (idx, entry) in route.timetable.iter().enumerate() {
            let service_id = if entry.day.is_empty() {
                DEFAULT_SERVICE_ID
            } else {
                entry.day.as_str()
            };
            let trip_id = build_trip_id(&route.id, service_id, &entry.time, idx + 1);

            let resolution = index.resolve(&entry.stop_name);
            if !resolution.is_resolved() {
                warn!(
                    route_id = %route.id,
                    trip_id = %trip_id,
                    stop_name = %entry.stop_name,
                    "Stop name not in stop list, using it as stop_id"
                );
                out.unresolved.push(UnresolvedStop {
                    route_id: route.id.clone(),
                    trip_id: trip_id.clone(),
                    stop_name: entry.stop_name.clone(),
                });
            }

            let time = format_time(&entry.time);

            out.trips.push(Trip {
                route_id: route.id.clone(),
                service_id: service_id.to_string(),
                trip_id: trip_id.clone(),
                direction_id: None,
            });
            out.stop_times.push(StopTime {
                trip_id,
                arrival_time: time.clone(),
                departure_time: time,
                stop_id: resolution.stop_id().to_string(),
                stop_sequence: 1,
            });
        }
    }

    debug!(
        trips = out.trips.len(),
        unresolved = out.unresolved.len(),
        "Trips assembled"
    );
    out
}
