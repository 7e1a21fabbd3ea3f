//! Number and unit token handling.
//!
//! The report prints every metric as a downstream/upstream pair, some with a
//! unit after each number. Units are checked against a fixed expectation so a
//! change of convention on the device side (kb/s -> Mb/s) fails loudly.

use std::fmt;

use regex::Captures;
use serde::{Deserialize, Serialize};

use crate::error::ReportError;

/// Direction of a line metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Down,
    Up,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Down => "down",
            Direction::Up => "up",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw downstream/upstream values of one metric line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawPair<'a> {
    pub down: &'a str,
    pub up: &'a str,
}

impl<'a> RawPair<'a> {
    pub fn ints(&self, metric: &str) -> Result<(i64, i64), ReportError> {
        Ok((parse_int(metric, self.down)?, parse_int(metric, self.up)?))
    }

    pub fn floats(&self, metric: &str) -> Result<(f64, f64), ReportError> {
        Ok((parse_float(metric, self.down)?, parse_float(metric, self.up)?))
    }
}

/// Fail with `UnexpectedUnit` unless `got` is exactly `expected`.
pub fn check_unit(
    metric: &str,
    direction: Direction,
    got: &str,
    expected: &str,
) -> Result<(), ReportError> {
    if got == expected {
        return Ok(());
    }
    Err(ReportError::UnexpectedUnit {
        metric: metric.to_string(),
        direction,
        got: got.to_string(),
    })
}

/// Read a `(down, up)` pair from captures laid out as `value [unit] value [unit]`,
/// starting at group `first`.
///
/// With `unit` set, groups are `down unit up unit` and both units are
/// validated. Without it, groups are `down up`.
pub fn capture_pair<'a>(
    caps: &Captures<'a>,
    first: usize,
    metric: &str,
    unit: Option<&str>,
) -> Result<RawPair<'a>, ReportError> {
    let group = |i: usize| {
        caps.get(first + i)
            .map(|m| m.as_str())
            .ok_or_else(|| ReportError::MissingField(metric.to_string()))
    };

    match unit {
        Some(expected) => {
            check_unit(metric, Direction::Down, group(1)?, expected)?;
            check_unit(metric, Direction::Up, group(3)?, expected)?;
            Ok(RawPair {
                down: group(0)?,
                up: group(2)?,
            })
        }
        None => Ok(RawPair {
            down: group(0)?,
            up: group(1)?,
        }),
    }
}

/// Parse an integer count or rate.
pub fn parse_int(metric: &str, raw: &str) -> Result<i64, ReportError> {
    raw.trim()
        .parse()
        .map_err(|_| ReportError::MissingField(metric.to_string()))
}

/// Parse a decimal value; the device may print either `.` or `,` as separator.
pub fn parse_float(metric: &str, raw: &str) -> Result<f64, ReportError> {
    raw.trim()
        .replace(',', ".")
        .parse()
        .map_err(|_| ReportError::MissingField(metric.to_string()))
}
