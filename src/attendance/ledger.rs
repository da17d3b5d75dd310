//! Hour ledger arithmetic.
//!
//! The ledger total of an agreement is always the full sum of
//! `hours_completed` over its live entries. It is never maintained as an
//! incremental delta; storage recomputes it inside the transaction that
//! mutates an entry and writes it to every sibling row.

use chrono::NaiveTime;

use crate::error_handling::types::ValidationError;

pub const MAX_SESSION_HOURS: f64 = 24.0;

/// Rounds to two decimals, the precision hours are reported with.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn total_hours<I>(hours: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    round2(hours.into_iter().sum())
}

pub fn check_session_hours(hours: f64) -> Result<f64, ValidationError> {
    if !hours.is_finite() || !(0.0..=MAX_SESSION_HOURS).contains(&hours) {
        return Err(ValidationError::Invalid(format!(
            "hours_completed must be between 0 and {}",
            MAX_SESSION_HOURS
        )));
    }
    Ok(round2(hours))
}

/// Length of a session in hours. Sessions do not span midnight.
pub fn hours_between(start: NaiveTime, end: NaiveTime) -> Result<f64, ValidationError> {
    if end < start {
        return Err(ValidationError::Invalid(
            "end_time must not be before start_time".into(),
        ));
    }
    let minutes = (end - start).num_minutes() as f64;
    Ok(round2(minutes / 60.0))
}
