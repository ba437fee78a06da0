//! The single every-day service calendar.

use chrono::{Datelike, NaiveDate};

use crate::model::{DEFAULT_SERVICE_ID, Service};

/// Builds the `DAILY` service covering Jan 1 through Dec 31 of the reference
/// date's year.
pub fn build_default_calendar(reference: NaiveDate) -> Service {
    let (start_date, end_date) = year_bounds(reference);

    Service {
        service_id: DEFAULT_SERVICE_ID.to_string(),
        monday: true,
        tuesday: true,
        wednesday: true,
        thursday: true,
        friday: true,
        saturday: true,
        sunday: true,
        start_date,
        end_date,
    }
}

/// First and last day of the reference date's year.
pub fn year_bounds(reference: NaiveDate) -> (NaiveDate, NaiveDate) {
    let year = reference.year();
    let first = reference.with_ordinal(1).unwrap_or(reference);
    let last = NaiveDate::from_ymd_opt(year, 12, 31).unwrap_or(reference);
    (first, last)
}

/// Renders a date as an 8-digit `YYYYMMDD` token.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_calendar_spans_year() {
        let reference = NaiveDate::from_ymd_opt(2025, 9, 2).unwrap();
        let service = build_default_calendar(reference);

        assert_eq!(service.service_id, "DAILY");
        assert!(service.runs_every_day());
        assert_eq!(format_date(service.start_date), "20250101");
        assert_eq!(format_date(service.end_date), "20251231");
    }

    #[test]
    fn test_reference_on_year_edges() {
        let jan1 = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let dec31 = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();

        assert_eq!(year_bounds(jan1), year_bounds(dec31));
        assert_eq!(year_bounds(jan1), (jan1, dec31));
    }

    #[test]
    fn test_format_date_zero_pads() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 7).unwrap();
        assert_eq!(format_date(date), "20260307");
    }
}
