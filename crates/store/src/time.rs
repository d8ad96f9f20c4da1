use crate::error::{Result, StoreError};
use crate::types::{Variable, FILL_VALUE, UNITS};
use chrono::{Duration, FixedOffset, NaiveDate, NaiveDateTime};
use serde_json::Value;

/// Unit of a CF time coordinate, as a number of microseconds
#[derive(Debug, Clone, Copy, PartialEq)]
enum TimeUnit {
    Days,
    Hours,
    Minutes,
    Seconds,
    Milliseconds,
    Microseconds,
}

impl TimeUnit {
    fn parse(unit: &str) -> Option<Self> {
        let unit = match unit {
            "days" | "day" | "d" => TimeUnit::Days,
            "hours" | "hour" | "hr" | "hrs" | "h" => TimeUnit::Hours,
            "minutes" | "minute" | "min" | "mins" => TimeUnit::Minutes,
            "seconds" | "second" | "sec" | "secs" | "s" => TimeUnit::Seconds,
            "milliseconds" | "millisecond" | "msec" | "msecs" | "ms" => TimeUnit::Milliseconds,
            "microseconds" | "microsecond" | "usec" | "usecs" | "us" => TimeUnit::Microseconds,
            _ => return None,
        };
        Some(unit)
    }

    fn micros(self) -> f64 {
        match self {
            TimeUnit::Days => 86_400e6,
            TimeUnit::Hours => 3_600e6,
            TimeUnit::Minutes => 60e6,
            TimeUnit::Seconds => 1e6,
            TimeUnit::Milliseconds => 1e3,
            TimeUnit::Microseconds => 1.0,
        }
    }
}

/// Parsed `"<unit> since <reference>"` units string
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeUnits {
    unit: TimeUnit,
    reference: NaiveDateTime,
}

impl TimeUnits {
    pub fn parse(units: &str) -> Result<Self> {
        let invalid = || StoreError::InvalidTimeUnits(units.to_string());

        let lower = units.trim().to_ascii_lowercase();
        let (unit, reference) = lower.split_once(" since ").ok_or_else(invalid)?;
        let unit = TimeUnit::parse(unit.trim()).ok_or_else(invalid)?;
        let reference = parse_reference(reference).ok_or_else(invalid)?;

        Ok(Self { unit, reference })
    }

    pub fn reference(&self) -> NaiveDateTime {
        self.reference
    }

    /// `None` for values that do not land on a representable date
    pub fn decode(&self, value: f64) -> Option<NaiveDateTime> {
        if !value.is_finite() {
            return None;
        }
        let micros = (value * self.unit.micros()).round();
        if micros.abs() >= i64::MAX as f64 {
            return None;
        }
        self.reference
            .checked_add_signed(Duration::microseconds(micros as i64))
    }
}

/// Decode a time variable through its `units` attribute.
///
/// `null` samples, samples equal to `_FillValue` and samples outside the
/// representable range decode to `None`.
pub fn decode_times(name: &str, variable: &Variable) -> Result<Vec<Option<NaiveDateTime>>> {
    let units = match variable.attribute(UNITS) {
        Some(Value::String(units)) => units,
        Some(other) => {
            return Err(StoreError::invalid_attribute(
                name,
                UNITS,
                format!("expected a string, found {other}"),
            ))
        }
        None => {
            return Err(StoreError::MissingAttribute {
                variable: name.to_string(),
                attribute: UNITS,
            })
        }
    };
    let units = TimeUnits::parse(units)?;
    let fill = variable.attribute(FILL_VALUE).and_then(Value::as_f64);

    Ok(variable
        .data
        .iter()
        .map(|value| {
            value
                .as_f64()
                .filter(|&v| Some(v) != fill)
                .and_then(|v| units.decode(v))
        })
        .collect())
}

fn parse_reference(reference: &str) -> Option<NaiveDateTime> {
    let reference = reference.trim();
    let reference = reference
        .strip_suffix("utc")
        .or_else(|| reference.strip_suffix('z'))
        .unwrap_or(reference)
        .trim()
        .replace('t', " ");

    let (local, offset) = split_offset(&reference)?;
    let local = parse_naive(local)?;
    match offset {
        Some(offset) => local
            .and_local_timezone(offset)
            .single()
            .map(|time| time.naive_utc()),
        None => Some(local),
    }
}

fn parse_naive(reference: &str) -> Option<NaiveDateTime> {
    const FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M"];
    FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(reference, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(reference, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

/// Split a trailing UTC offset (`+05:30`, `-0600`, `0:00`) off a reference.
///
/// An unsigned token only counts as an offset after a time of day, so
/// `2000-01-01 12:00` keeps its time. `None` for a malformed offset.
fn split_offset(reference: &str) -> Option<(&str, Option<FixedOffset>)> {
    let Some((head, token)) = reference.rsplit_once(' ') else {
        return Some((reference, None));
    };
    let (sign, digits) = match token.as_bytes().first() {
        Some(b'+') => (1, &token[1..]),
        Some(b'-') => (-1, &token[1..]),
        _ if head.trim().contains(' ') => (1, token),
        _ => return Some((reference, None)),
    };

    let (hours, minutes) = match digits.split_once(':') {
        Some((hours, minutes)) => (hours, minutes),
        None if digits.len() == 4 => digits.split_at(2),
        None => (digits, "0"),
    };
    if hours.is_empty() || hours.len() > 2 || minutes.len() > 2 {
        return None;
    }
    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    if minutes >= 60 {
        return None;
    }
    let offset = FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))?;
    Some((head.trim(), Some(offset)))
}
