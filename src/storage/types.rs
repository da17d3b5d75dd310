use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::agreement::AgreementStatus;
use crate::attendance::signature::SignatureState;
use crate::attendance::EntryStatus;
use crate::storage::db_entities::{ita_master, signed_ita_attendance};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Agreement {
    pub id: i32,
    pub student_id: i32,
    pub course_id: i32,
    pub instructor_id: Option<i32>,
    pub agreement_date: NaiveDate,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_hours: f64,
    pub status: AgreementStatus,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<ita_master::Model> for Agreement {
    fn from(m: ita_master::Model) -> Self {
        Self {
            id: m.id,
            student_id: m.student_id,
            course_id: m.course_id,
            instructor_id: m.instructor_id,
            agreement_date: m.agreement_date,
            start_date: m.start_date,
            end_date: m.end_date,
            total_hours: m.total_hours,
            status: m.status,
            notes: m.notes,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// An agreement joined with the display names of what it references.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgreementDetail {
    #[serde(flatten)]
    pub agreement: Agreement,
    pub student_name: Option<String>,
    pub course_name: Option<String>,
    pub instructor_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AgreementFilter {
    pub status: Option<AgreementStatus>,
    pub student_id: Option<i32>,
    pub course_id: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AgreementStats {
    pub total: u64,
    pub active: u64,
    pub completed: u64,
    pub terminated: u64,
    pub total_planned_hours: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionEntry {
    pub id: i32,
    pub ita_master_id: i32,
    pub student_id: i32,
    /// Student display name as it was when the entry was created.
    pub student_name: Option<String>,
    pub session_date: NaiveDate,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub hours_completed: f64,
    pub student_signature: Option<String>,
    pub student_signature_date: Option<NaiveDateTime>,
    pub instructor_signature: Option<String>,
    pub instructor_signature_date: Option<NaiveDateTime>,
    pub total_hours_accumulated: f64,
    pub status: EntryStatus,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl SessionEntry {
    pub fn signatures(&self) -> SignatureState {
        SignatureState {
            student_signature: self.student_signature.clone(),
            student_signature_date: self.student_signature_date,
            instructor_signature: self.instructor_signature.clone(),
            instructor_signature_date: self.instructor_signature_date,
        }
    }
}

impl From<signed_ita_attendance::Model> for SessionEntry {
    fn from(m: signed_ita_attendance::Model) -> Self {
        Self {
            id: m.id,
            ita_master_id: m.ita_master_id,
            student_id: m.student_id,
            student_name: m.student_name,
            session_date: m.session_date,
            start_time: m.start_time,
            end_time: m.end_time,
            hours_completed: m.hours_completed,
            student_signature: m.student_signature,
            student_signature_date: m.student_signature_date,
            instructor_signature: m.instructor_signature,
            instructor_signature_date: m.instructor_signature_date,
            total_hours_accumulated: m.total_hours_accumulated,
            status: m.status,
            notes: m.notes,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// An attendance entry joined with its agreement and course.
///
/// `student_name` on the entry is the creation-time snapshot;
/// `student_current_name` is looked up fresh for every read.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionEntryDetail {
    #[serde(flatten)]
    pub entry: SessionEntry,
    pub student_current_name: Option<String>,
    pub course_id: Option<i32>,
    pub course_name: Option<String>,
    pub instructor_id: Option<i32>,
    pub planned_hours: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionEntryFilter {
    pub status: Option<EntryStatus>,
    pub student_id: Option<i32>,
    pub ita_master_id: Option<i32>,
    pub instructor_id: Option<i32>,
    pub session_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SessionEntryStats {
    pub total: u64,
    pub pending: u64,
    pub signed_by_student: u64,
    pub signed_by_instructor: u64,
    pub completed: u64,
    pub total_hours_completed: f64,
}

/// 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self { page: 1, limit: 10 }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Paged<T> {
    pub items: Vec<T>,
    pub total: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    pub pages: u64,
}

impl PageInfo {
    pub fn new(pagination: Pagination, total: u64) -> Self {
        Self {
            page: pagination.page,
            limit: pagination.limit,
            total,
            pages: total.div_ceil(pagination.limit.max(1)),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewStudent {
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewCourse {
    pub course_name: String,
    pub course_code: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewInstructor {
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_info_rounds_pages_up() {
        let info = PageInfo::new(Pagination { page: 2, limit: 10 }, 21);
        assert_eq!(info.pages, 3);
        let empty = PageInfo::new(Pagination::default(), 0);
        assert_eq!(empty.pages, 0);
    }
}
