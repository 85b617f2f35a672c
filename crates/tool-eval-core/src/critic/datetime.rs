use super::{CriticScore, Evaluate};
use crate::error::CriticError;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;
use std::time::Duration;

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Datetime critic: full score within `tolerance`, zero at or beyond
/// `max_difference`, linear in between.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DatetimeCritic {
    pub tolerance: Duration,
    pub max_difference: Duration,
}

impl Default for DatetimeCritic {
    fn default() -> Self {
        Self {
            tolerance: Duration::from_secs(500),
            max_difference: Duration::from_secs(2 * 60 * 60),
        }
    }
}

impl DatetimeCritic {
    pub fn new(tolerance: Duration, max_difference: Duration) -> Self {
        Self {
            tolerance,
            max_difference,
        }
    }

    /// Unit score for an absolute difference in seconds
    fn unit_score(&self, diff_secs: f64) -> f64 {
        let tolerance = self.tolerance.as_secs_f64();
        let max = self.max_difference.as_secs_f64();
        if diff_secs <= tolerance {
            1.0
        } else if diff_secs >= max || max <= tolerance {
            0.0
        } else {
            1.0 - (diff_secs - tolerance) / (max - tolerance)
        }
    }
}

/// Parse RFC 3339, naive datetime, or date-only strings; naive values are UTC
pub fn parse_datetime(value: &Value) -> Result<DateTime<Utc>, CriticError> {
    let invalid = || CriticError::InvalidDatetime {
        value: value.to_string(),
    };
    let text = value.as_str().map(str::trim).ok_or_else(invalid)?;

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Ok(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(invalid)
}

impl Evaluate for DatetimeCritic {
    fn evaluate(
        &self,
        expected: &Value,
        actual: &Value,
        weight: f64,
    ) -> Result<CriticScore, CriticError> {
        let expected = parse_datetime(expected)?;
        let actual = parse_datetime(actual)?;
        let diff = (expected - actual).num_milliseconds().unsigned_abs() as f64 / 1000.0;

        let unit = self.unit_score(diff);
        Ok(CriticScore {
            matched: diff <= self.tolerance.as_secs_f64(),
            score: unit * weight,
        })
    }
}
