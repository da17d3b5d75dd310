//! Signed ITA attendance entries.
//!
//! Each entry records one training session under an agreement. Its status is
//! a function of which parties have signed it (see [`signature`]), and its
//! `total_hours_accumulated` column is a snapshot of the agreement's hour
//! ledger (see [`ledger`]). Progress figures are derived in [`progress`].

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error_handling::types::ValidationError;

pub mod ledger;
pub mod progress;
pub mod signature;

/// Signature status of an attendance entry.
///
/// Variants:
/// - `Pending`: nobody has signed yet.
/// - `SignedByStudent`: only the student signature is present.
/// - `SignedByInstructor`: only the instructor signature is present.
/// - `Completed`: both signatures are present.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "signed_by_student")]
    SignedByStudent,
    #[sea_orm(string_value = "signed_by_instructor")]
    SignedByInstructor,
    #[sea_orm(string_value = "completed")]
    Completed,
}

impl EntryStatus {
    /// The only way a status is ever produced: from signature presence.
    pub fn from_signatures(student_signed: bool, instructor_signed: bool) -> Self {
        match (student_signed, instructor_signed) {
            (false, false) => EntryStatus::Pending,
            (true, false) => EntryStatus::SignedByStudent,
            (false, true) => EntryStatus::SignedByInstructor,
            (true, true) => EntryStatus::Completed,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EntryStatus::Pending => "pending",
            EntryStatus::SignedByStudent => "signed_by_student",
            EntryStatus::SignedByInstructor => "signed_by_instructor",
            EntryStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntryStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(EntryStatus::Pending),
            "signed_by_student" => Ok(EntryStatus::SignedByStudent),
            "signed_by_instructor" => Ok(EntryStatus::SignedByInstructor),
            "completed" => Ok(EntryStatus::Completed),
            other => Err(ValidationError::Invalid(format!(
                "Unknown attendance status '{}'",
                other
            ))),
        }
    }
}

/// The party applying a signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignatureParty {
    Student,
    Instructor,
}

impl fmt::Display for SignatureParty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignatureParty::Student => f.write_str("student"),
            SignatureParty::Instructor => f.write_str("instructor"),
        }
    }
}

/// Attendance payload for entry creation, as received from a client.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionEntryDraft {
    pub ita_master_id: Option<i32>,
    pub student_id: Option<i32>,
    pub session_date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub hours_completed: Option<f64>,
    pub student_signature: Option<String>,
    pub instructor_signature: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewSessionEntry {
    pub ita_master_id: i32,
    /// Must match the agreement's student when given.
    pub student_id: Option<i32>,
    pub session_date: NaiveDate,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub hours_completed: f64,
    pub student_signature: Option<String>,
    pub instructor_signature: Option<String>,
    pub notes: Option<String>,
}

impl SessionEntryDraft {
    pub fn validate(self) -> Result<NewSessionEntry, ValidationError> {
        let mut missing = Vec::new();
        if self.ita_master_id.is_none() {
            missing.push("ita_master_id");
        }
        if self.session_date.is_none() {
            missing.push("session_date");
        }
        let (Some(ita_master_id), Some(session_date)) = (self.ita_master_id, self.session_date)
        else {
            return Err(ValidationError::MissingFields(missing));
        };

        let hours_completed = match self.hours_completed {
            Some(hours) => ledger::check_session_hours(hours)?,
            None => match (self.start_time, self.end_time) {
                (Some(start), Some(end)) => ledger::hours_between(start, end)?,
                _ => 0.0,
            },
        };
        if let (Some(start), Some(end)) = (self.start_time, self.end_time) {
            ledger::hours_between(start, end)?;
        }

        Ok(NewSessionEntry {
            ita_master_id,
            student_id: self.student_id,
            session_date,
            start_time: self.start_time,
            end_time: self.end_time,
            hours_completed,
            student_signature: non_blank(self.student_signature),
            instructor_signature: non_blank(self.instructor_signature),
            notes: non_blank(self.notes),
        })
    }
}

/// Partial update of an attendance entry. Absent fields keep their stored
/// value; a supplied signature goes through the signature transition.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionEntryUpdate {
    pub session_date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub hours_completed: Option<f64>,
    pub student_signature: Option<String>,
    pub instructor_signature: Option<String>,
    pub notes: Option<String>,
}

impl SessionEntryUpdate {
    pub fn validate(mut self) -> Result<Self, ValidationError> {
        if let Some(hours) = self.hours_completed {
            ledger::check_session_hours(hours)?;
        }
        self.student_signature = non_blank(self.student_signature);
        self.instructor_signature = non_blank(self.instructor_signature);
        Ok(self)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn time(s: &str) -> NaiveTime {
        NaiveTime::parse_from_str(s, "%H:%M:%S").unwrap()
    }

    #[test]
    fn test_status_from_signatures() {
        assert_eq!(EntryStatus::from_signatures(false, false), EntryStatus::Pending);
        assert_eq!(EntryStatus::from_signatures(true, false), EntryStatus::SignedByStudent);
        assert_eq!(EntryStatus::from_signatures(false, true), EntryStatus::SignedByInstructor);
        assert_eq!(EntryStatus::from_signatures(true, true), EntryStatus::Completed);
    }

    #[test]
    fn test_status_round_trips_through_str() {
        for status in [
            EntryStatus::Pending,
            EntryStatus::SignedByStudent,
            EntryStatus::SignedByInstructor,
            EntryStatus::Completed,
        ] {
            assert_eq!(status.as_str().parse::<EntryStatus>().unwrap(), status);
        }
    }

    #[test]
    fn test_draft_requires_agreement_and_date() {
        let err = SessionEntryDraft::default().validate().unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingFields(vec!["ita_master_id", "session_date"])
        );
    }

    #[test]
    fn test_draft_derives_hours_from_times() {
        let draft = SessionEntryDraft {
            ita_master_id: Some(1),
            session_date: NaiveDate::from_ymd_opt(2024, 3, 4),
            start_time: Some(time("09:00:00")),
            end_time: Some(time("11:30:00")),
            ..Default::default()
        };
        let entry = draft.validate().unwrap();
        assert_eq!(entry.hours_completed, 2.5);
    }

    #[test]
    fn test_draft_explicit_hours_win_over_times() {
        let draft = SessionEntryDraft {
            ita_master_id: Some(1),
            session_date: NaiveDate::from_ymd_opt(2024, 3, 4),
            start_time: Some(time("09:00:00")),
            end_time: Some(time("11:30:00")),
            hours_completed: Some(2.0),
            ..Default::default()
        };
        assert_eq!(draft.validate().unwrap().hours_completed, 2.0);
    }

    #[test]
    fn test_draft_rejects_out_of_range_hours() {
        let draft = SessionEntryDraft {
            ita_master_id: Some(1),
            session_date: NaiveDate::from_ymd_opt(2024, 3, 4),
            hours_completed: Some(25.0),
            ..Default::default()
        };
        assert!(draft.validate().is_err());
    }

    #[test]
    fn test_draft_drops_blank_signatures() {
        let draft = SessionEntryDraft {
            ita_master_id: Some(1),
            session_date: NaiveDate::from_ymd_opt(2024, 3, 4),
            student_signature: Some("   ".into()),
            ..Default::default()
        };
        assert_eq!(draft.validate().unwrap().student_signature, None);
    }
}
