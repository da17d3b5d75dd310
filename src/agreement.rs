//! ITA agreements (`ita_master`).
//!
//! An agreement ties a student to a course with a planned number of training
//! hours. This module holds the lifecycle status and the validation applied to
//! incoming agreement payloads before they reach storage.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error_handling::types::ValidationError;

/// Lifecycle status of an agreement.
///
/// Variants:
/// - `Active`: training is in progress (initial state).
/// - `Completed`: the planned training was delivered.
/// - `Terminated`: the agreement ended early.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
pub enum AgreementStatus {
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "terminated")]
    Terminated,
}

impl AgreementStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgreementStatus::Active => "active",
            AgreementStatus::Completed => "completed",
            AgreementStatus::Terminated => "terminated",
        }
    }

    /// Only an active agreement may change status. Re-applying the current
    /// status is accepted as a no-op.
    pub fn can_transition_to(&self, next: AgreementStatus) -> bool {
        *self == next || matches!(self, AgreementStatus::Active)
    }
}

impl fmt::Display for AgreementStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgreementStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(AgreementStatus::Active),
            "completed" => Ok(AgreementStatus::Completed),
            "terminated" => Ok(AgreementStatus::Terminated),
            other => Err(ValidationError::Invalid(format!(
                "Unknown agreement status '{}'",
                other
            ))),
        }
    }
}

/// Agreement payload as received from a client. Every field is optional here
/// so that missing fields can be reported together.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AgreementDraft {
    pub student_id: Option<i32>,
    pub course_id: Option<i32>,
    pub instructor_id: Option<i32>,
    pub agreement_date: Option<NaiveDate>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub total_hours: Option<f64>,
    pub status: Option<AgreementStatus>,
    pub notes: Option<String>,
}

/// A validated agreement field set, used for both create and update.
#[derive(Debug, Clone, PartialEq)]
pub struct AgreementInput {
    pub student_id: i32,
    pub course_id: i32,
    pub instructor_id: Option<i32>,
    pub agreement_date: NaiveDate,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_hours: f64,
    pub status: Option<AgreementStatus>,
    pub notes: Option<String>,
}

impl AgreementDraft {
    pub fn validate(self) -> Result<AgreementInput, ValidationError> {
        let mut missing = Vec::new();
        if self.student_id.is_none() {
            missing.push("student_id");
        }
        if self.course_id.is_none() {
            missing.push("course_id");
        }
        if self.agreement_date.is_none() {
            missing.push("agreement_date");
        }
        if self.start_date.is_none() {
            missing.push("start_date");
        }
        if self.end_date.is_none() {
            missing.push("end_date");
        }
        if self.total_hours.is_none() {
            missing.push("total_hours");
        }

        match (
            self.student_id,
            self.course_id,
            self.agreement_date,
            self.start_date,
            self.end_date,
            self.total_hours,
        ) {
            (
                Some(student_id),
                Some(course_id),
                Some(agreement_date),
                Some(start_date),
                Some(end_date),
                Some(total_hours),
            ) => {
                if start_date > end_date {
                    return Err(ValidationError::Invalid(
                        "start_date must not be after end_date".into(),
                    ));
                }
                if !total_hours.is_finite() || total_hours <= 0.0 {
                    return Err(ValidationError::Invalid(
                        "total_hours must be a positive number".into(),
                    ));
                }
                Ok(AgreementInput {
                    student_id,
                    course_id,
                    instructor_id: self.instructor_id,
                    agreement_date,
                    start_date,
                    end_date,
                    total_hours,
                    status: self.status,
                    notes: self.notes.filter(|n| !n.trim().is_empty()),
                })
            }
            _ => Err(ValidationError::MissingFields(missing)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn full_draft() -> AgreementDraft {
        AgreementDraft {
            student_id: Some(1),
            course_id: Some(2),
            instructor_id: None,
            agreement_date: Some(date("2024-01-10")),
            start_date: Some(date("2024-02-01")),
            end_date: Some(date("2024-06-30")),
            total_hours: Some(120.0),
            status: None,
            notes: Some("  ".into()),
        }
    }

    #[test]
    fn test_validate_accepts_complete_draft() {
        let input = full_draft().validate().unwrap();
        assert_eq!(input.student_id, 1);
        assert_eq!(input.total_hours, 120.0);
        assert_eq!(input.notes, None);
    }

    #[test]
    fn test_validate_reports_all_missing_fields() {
        let err = AgreementDraft::default().validate().unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingFields(vec![
                "student_id",
                "course_id",
                "agreement_date",
                "start_date",
                "end_date",
                "total_hours",
            ])
        );
    }

    #[test]
    fn test_validate_rejects_inverted_dates() {
        let mut draft = full_draft();
        draft.start_date = Some(date("2024-07-01"));
        assert!(matches!(draft.validate(), Err(ValidationError::Invalid(_))));
    }

    #[test]
    fn test_validate_rejects_non_positive_hours() {
        let mut draft = full_draft();
        draft.total_hours = Some(0.0);
        assert!(draft.clone().validate().is_err());
        draft.total_hours = Some(-4.0);
        assert!(draft.validate().is_err());
    }

    #[test]
    fn test_status_transitions() {
        use AgreementStatus::*;
        assert!(Active.can_transition_to(Completed));
        assert!(Active.can_transition_to(Terminated));
        assert!(Completed.can_transition_to(Completed));
        assert!(!Completed.can_transition_to(Active));
        assert!(!Terminated.can_transition_to(Completed));
    }

    #[test]
    fn test_status_parse() {
        assert_eq!("terminated".parse::<AgreementStatus>().unwrap(), AgreementStatus::Terminated);
        assert!("archived".parse::<AgreementStatus>().is_err());
    }
}
