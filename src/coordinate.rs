//! Parsing of stop locations written as `POINT(lon lat)` or a bare `lon lat` pair.

use crate::error::CoordinateError;

const POINT_TOKEN: &str = "POINT";

/// A geographic coordinate in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

/// Parses a location string into a [`Coordinate`].
///
/// Both notations list longitude first. Ranges are not checked.
///
/// # Errors
///
/// [`CoordinateError::InvalidFormat`] when the text is blank or does not hold
/// exactly two tokens, [`CoordinateError::InvalidValue`] when a token is not a
/// finite number.
pub fn parse_coordinate(raw: &str) -> Result<Coordinate, CoordinateError> {
    if raw.trim().is_empty() {
        return Err(CoordinateError::InvalidFormat(raw.to_string()));
    }

    let body = if raw.starts_with(POINT_TOKEN) {
        raw.replacen(POINT_TOKEN, "", 1)
            .replacen('(', "", 1)
            .replacen(')', "", 1)
    } else {
        raw.to_string()
    };

    let tokens: Vec<&str> = body.split_whitespace().collect();
    let [lon, lat] = tokens.as_slice() else {
        return Err(CoordinateError::InvalidFormat(raw.to_string()));
    };

    let lon = parse_degrees(lon, raw)?;
    let lat = parse_degrees(lat, raw)?;

    Ok(Coordinate { lat, lon })
}

fn parse_degrees(token: &str, raw: &str) -> Result<f64, CoordinateError> {
    token
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| CoordinateError::InvalidValue(raw.to_string()))
}
