//! Helpers for turning raw list-query parameters into filters and pages.
//!
//! Query values arrive as strings. Blank values count as absent, malformed ids,
//! statuses and dates are rejected, and `page`/`limit` are coerced to positive
//! integers instead of being rejected.

use std::collections::HashMap;
use std::str::FromStr;

use chrono::NaiveDate;

use crate::configuration::types::PaginationConfig;
use crate::error_handling::types::ValidationError;
use crate::storage::types::{AgreementFilter, Pagination, SessionEntryFilter};

pub type RawQuery = HashMap<String, String>;

fn value<'a>(query: &'a RawQuery, key: &str) -> Option<&'a str> {
    query
        .get(key)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
}

/// Positive integer or nothing.
pub fn coerce_positive(raw: Option<&str>) -> Option<u64> {
    raw.and_then(|v| v.trim().parse::<i64>().ok())
        .filter(|v| *v > 0)
        .map(|v| v as u64)
}

/// Page and limit from the query string. `page` is clamped so that the row
/// offset `(page - 1) * limit` always fits in a signed 64-bit integer.
pub fn pagination(query: &RawQuery, limits: &PaginationConfig) -> Pagination {
    let limit = coerce_positive(value(query, "limit"))
        .unwrap_or(limits.default_limit)
        .min(limits.max_limit)
        .max(1);
    let max_page = i64::MAX as u64 / limit;
    let page = coerce_positive(value(query, "page"))
        .unwrap_or(1)
        .min(max_page);
    Pagination { page, limit }
}

pub fn parse_id(field: &str, raw: Option<&str>) -> Result<Option<i32>, ValidationError> {
    match raw {
        None => Ok(None),
        Some(v) => v
            .parse::<i32>()
            .map(Some)
            .map_err(|_| ValidationError::Invalid(format!("{} must be an integer", field))),
    }
}

fn parse_date(field: &str, raw: Option<&str>) -> Result<Option<NaiveDate>, ValidationError> {
    match raw {
        None => Ok(None),
        Some(v) => NaiveDate::parse_from_str(v, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| ValidationError::Invalid(format!("{} must be a YYYY-MM-DD date", field))),
    }
}

fn parse_status<T>(raw: Option<&str>) -> Result<Option<T>, ValidationError>
where
    T: FromStr<Err = ValidationError>,
{
    raw.map(|v| v.parse::<T>()).transpose()
}

pub fn agreement_filter(query: &RawQuery) -> Result<AgreementFilter, ValidationError> {
    Ok(AgreementFilter {
        status: parse_status(value(query, "status"))?,
        student_id: parse_id("student_id", value(query, "student_id"))?,
        course_id: parse_id("course_id", value(query, "course_id"))?,
    })
}

pub fn session_entry_filter(query: &RawQuery) -> Result<SessionEntryFilter, ValidationError> {
    Ok(SessionEntryFilter {
        status: parse_status(value(query, "status"))?,
        student_id: parse_id("student_id", value(query, "student_id"))?,
        ita_master_id: parse_id("ita_master_id", value(query, "ita_master_id"))?,
        instructor_id: parse_id("instructor_id", value(query, "instructor_id"))?,
        session_date: parse_date("session_date", value(query, "session_date"))?,
    })
}

/// Filter matching every entry of one agreement.
pub fn by_agreement(ita_master_id: i32) -> SessionEntryFilter {
    SessionEntryFilter {
        ita_master_id: Some(ita_master_id),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agreement::AgreementStatus;
    use crate::attendance::EntryStatus;

    fn query(pairs: &[(&str, &str)]) -> RawQuery {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn limits() -> PaginationConfig {
        PaginationConfig {
            default_limit: 10,
            max_limit: 100,
        }
    }

    #[test]
    fn test_pagination_defaults() {
        assert_eq!(
            pagination(&RawQuery::new(), &limits()),
            Pagination { page: 1, limit: 10 }
        );
    }

    #[test]
    fn test_pagination_coerces_garbage_to_defaults() {
        let q = query(&[("page", "-3"), ("limit", "abc")]);
        assert_eq!(pagination(&q, &limits()), Pagination { page: 1, limit: 10 });
        let q = query(&[("page", "0"), ("limit", "0")]);
        assert_eq!(pagination(&q, &limits()), Pagination { page: 1, limit: 10 });
    }

    #[test]
    fn test_pagination_caps_limit() {
        let q = query(&[("page", "4"), ("limit", "5000")]);
        assert_eq!(pagination(&q, &limits()), Pagination { page: 4, limit: 100 });
    }

    #[test]
    fn test_pagination_clamps_huge_page() {
        let q = query(&[("page", "9223372036854775807"), ("limit", "10")]);
        let page = pagination(&q, &limits());
        assert_eq!(page.limit, 10);
        assert_eq!(page.page, i64::MAX as u64 / 10);
        let offset = (page.page - 1).checked_mul(page.limit).unwrap();
        assert!(offset <= i64::MAX as u64);
    }

    #[test]
    fn test_agreement_filter_parses_fields() {
        let q = query(&[("status", "active"), ("student_id", "3"), ("course_id", "")]);
        let filter = agreement_filter(&q).unwrap();
        assert_eq!(filter.status, Some(AgreementStatus::Active));
        assert_eq!(filter.student_id, Some(3));
        assert_eq!(filter.course_id, None);
    }

    #[test]
    fn test_filter_rejects_bad_values() {
        assert!(agreement_filter(&query(&[("student_id", "x")])).is_err());
        assert!(agreement_filter(&query(&[("status", "open")])).is_err());
        assert!(session_entry_filter(&query(&[("session_date", "03/04/2024")])).is_err());
    }

    #[test]
    fn test_session_entry_filter() {
        let q = query(&[
            ("status", "signed_by_student"),
            ("ita_master_id", "9"),
            ("session_date", "2024-03-04"),
        ]);
        let filter = session_entry_filter(&q).unwrap();
        assert_eq!(filter.status, Some(EntryStatus::SignedByStudent));
        assert_eq!(filter.ita_master_id, Some(9));
        assert_eq!(filter.session_date, NaiveDate::from_ymd_opt(2024, 3, 4));
        assert_eq!(by_agreement(9).ita_master_id, Some(9));
    }
}
