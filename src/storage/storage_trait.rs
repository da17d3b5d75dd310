//! Storage Trait
//!
//! This module defines the `Storage` trait, the interface the web layer uses
//! for agreements, attendance entries and their derived views.
//!
//! Implementors of this trait are responsible for:
//! - Persisting agreements and attendance entries
//! - Keeping every entry's ledger snapshot equal to its agreement's full hour sum
//! - Deriving entry status from signatures
//! - Computing statistics and the progress view
//!
//! All methods return a `Result` to handle potential storage errors.

use async_trait::async_trait;

use crate::agreement::AgreementInput;
use crate::attendance::progress::ProgressView;
use crate::attendance::{NewSessionEntry, SessionEntryUpdate, SignatureParty};
use crate::error_handling::types::StorageError;
use crate::storage::types::{
    AgreementDetail, AgreementFilter, AgreementStats, NewCourse, NewInstructor, NewStudent,
    Paged, Pagination, SessionEntryDetail, SessionEntryFilter, SessionEntryStats,
};

#[async_trait]
pub trait Storage: Send + Sync {
    /// Cheap round trip to the backend.
    async fn ping(&self) -> Result<(), StorageError>;

    // Referenced data

    async fn add_student(&self, student: &NewStudent) -> Result<i32, StorageError>;
    async fn add_course(&self, course: &NewCourse) -> Result<i32, StorageError>;
    async fn add_instructor(&self, instructor: &NewInstructor) -> Result<i32, StorageError>;

    // Agreements

    /// Creates an agreement after checking that the referenced student,
    /// course and instructor exist.
    async fn create_agreement(&self, input: &AgreementInput)
        -> Result<AgreementDetail, StorageError>;

    async fn get_agreement(&self, id: i32) -> Result<AgreementDetail, StorageError>;

    async fn list_agreements(
        &self,
        filter: &AgreementFilter,
        page: Pagination,
    ) -> Result<Paged<AgreementDetail>, StorageError>;

    /// Replaces every field of an agreement. A status change must be allowed
    /// by `AgreementStatus::can_transition_to`. A new student takes over all
    /// of the agreement's attendance entries.
    async fn update_agreement(
        &self,
        id: i32,
        input: &AgreementInput,
    ) -> Result<AgreementDetail, StorageError>;

    /// Deletes an agreement and its attendance entries. Returns the number of
    /// entries removed with it.
    async fn delete_agreement(&self, id: i32) -> Result<u64, StorageError>;

    async fn agreement_stats(&self) -> Result<AgreementStats, StorageError>;

    // Attendance entries

    async fn create_session_entry(
        &self,
        entry: &NewSessionEntry,
    ) -> Result<SessionEntryDetail, StorageError>;

    async fn get_session_entry(&self, id: i32) -> Result<SessionEntryDetail, StorageError>;

    async fn list_session_entries(
        &self,
        filter: &SessionEntryFilter,
        page: Pagination,
    ) -> Result<Paged<SessionEntryDetail>, StorageError>;

    async fn update_session_entry(
        &self,
        id: i32,
        update: &SessionEntryUpdate,
    ) -> Result<SessionEntryDetail, StorageError>;

    async fn delete_session_entry(&self, id: i32) -> Result<(), StorageError>;

    /// Applies one party's signature with a server-assigned timestamp.
    async fn sign_session_entry(
        &self,
        id: i32,
        party: SignatureParty,
        signature: &str,
    ) -> Result<SessionEntryDetail, StorageError>;

    async fn session_entry_stats(&self) -> Result<SessionEntryStats, StorageError>;

    async fn progress(&self, ita_master_id: i32) -> Result<ProgressView, StorageError>;
}
