use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use log::{debug, info, warn};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, ConnectOptions, ConnectionTrait, Database,
    DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    TransactionTrait,
};
use sea_orm_migration::MigratorTrait;

use crate::agreement::{AgreementInput, AgreementStatus};
use crate::attendance::ledger::{self, total_hours};
use crate::attendance::progress::ProgressView;
use crate::attendance::{EntryStatus, NewSessionEntry, SessionEntryUpdate, SignatureParty};
use crate::attendance::signature::SignatureState;
use crate::configuration::types::DatabaseConfig;
use crate::error_handling::types::{StorageError, ValidationError};
use crate::migration::Migrator;
use crate::storage::db_entities::{courses, instructors, ita_master, signed_ita_attendance, students};
use crate::storage::storage_trait::Storage;
use crate::storage::types::{
    Agreement, AgreementDetail, AgreementFilter, AgreementStats, NewCourse, NewInstructor,
    NewStudent, Paged, Pagination, SessionEntry, SessionEntryDetail, SessionEntryFilter,
    SessionEntryStats,
};

const AGREEMENT: &str = "ITA agreement";
const ENTRY: &str = "ITA attendance record";

fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

/// SeaORM-backed storage. Works against MySQL in production and SQLite in
/// tests; the schema comes from [`Migrator`].
pub struct DatabaseStorage {
    connection: DatabaseConnection,
}

impl DatabaseStorage {
    /// Opens a connection pool described by `config`.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StorageError> {
        let mut opt = ConnectOptions::new(config.url.clone());
        opt.max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .sqlx_logging(config.sqlx_logging);
        let connection = Database::connect(opt)
            .await
            .map_err(|e| StorageError::ConnectionFailed(e.to_string()))?;
        info!(
            "Connected to {:?} database (pool max: {})",
            connection.get_database_backend(),
            config.max_connections
        );
        Ok(Self { connection })
    }

    pub fn with_connection(connection: DatabaseConnection) -> Self {
        Self { connection }
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.connection
    }

    /// Brings the schema up to date. Called once at startup.
    pub async fn migrate(&self) -> Result<(), StorageError> {
        Migrator::up(&self.connection, None)
            .await
            .map_err(|e| StorageError::MigrationFailed(e.to_string()))?;
        info!("Database schema is up to date");
        Ok(())
    }

    async fn agreement_details(
        &self,
        models: Vec<ita_master::Model>,
    ) -> Result<Vec<AgreementDetail>, StorageError> {
        let student_names =
            student_names(&self.connection, models.iter().map(|m| m.student_id)).await?;
        let course_names =
            course_names(&self.connection, models.iter().map(|m| m.course_id)).await?;
        let instructor_names = instructor_names(
            &self.connection,
            models.iter().filter_map(|m| m.instructor_id),
        )
        .await?;

        Ok(models
            .into_iter()
            .map(|m| AgreementDetail {
                student_name: student_names.get(&m.student_id).cloned(),
                course_name: course_names.get(&m.course_id).cloned(),
                instructor_name: m
                    .instructor_id
                    .and_then(|id| instructor_names.get(&id).cloned()),
                agreement: Agreement::from(m),
            })
            .collect())
    }

    async fn entry_details(
        &self,
        models: Vec<signed_ita_attendance::Model>,
    ) -> Result<Vec<SessionEntryDetail>, StorageError> {
        let agreement_ids = unique(models.iter().map(|m| m.ita_master_id));
        let agreements: HashMap<i32, ita_master::Model> = if agreement_ids.is_empty() {
            HashMap::new()
        } else {
            ita_master::Entity::find()
                .filter(ita_master::Column::Id.is_in(agreement_ids))
                .all(&self.connection)
                .await?
                .into_iter()
                .map(|a| (a.id, a))
                .collect()
        };
        let course_names =
            course_names(&self.connection, agreements.values().map(|a| a.course_id)).await?;
        let student_names =
            student_names(&self.connection, models.iter().map(|m| m.student_id)).await?;

        Ok(models
            .into_iter()
            .map(|m| {
                let agreement = agreements.get(&m.ita_master_id);
                let course_id = agreement.map(|a| a.course_id);
                SessionEntryDetail {
                    student_current_name: student_names.get(&m.student_id).cloned(),
                    course_id,
                    course_name: course_id.and_then(|id| course_names.get(&id).cloned()),
                    instructor_id: agreement.and_then(|a| a.instructor_id),
                    planned_hours: agreement.map(|a| a.total_hours),
                    entry: SessionEntry::from(m),
                }
            })
            .collect())
    }
}

fn unique<I: Iterator<Item = i32>>(ids: I) -> Vec<i32> {
    let mut ids: Vec<i32> = ids.collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}

async fn student_names<C, I>(conn: &C, ids: I) -> Result<HashMap<i32, String>, StorageError>
where
    C: ConnectionTrait,
    I: Iterator<Item = i32>,
{
    let ids = unique(ids);
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    Ok(students::Entity::find()
        .filter(students::Column::Id.is_in(ids))
        .all(conn)
        .await?
        .into_iter()
        .map(|s| (s.id, s.display_name()))
        .collect())
}

async fn course_names<C, I>(conn: &C, ids: I) -> Result<HashMap<i32, String>, StorageError>
where
    C: ConnectionTrait,
    I: Iterator<Item = i32>,
{
    let ids = unique(ids);
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    Ok(courses::Entity::find()
        .filter(courses::Column::Id.is_in(ids))
        .all(conn)
        .await?
        .into_iter()
        .map(|c| (c.id, c.course_name))
        .collect())
}

async fn instructor_names<C, I>(conn: &C, ids: I) -> Result<HashMap<i32, String>, StorageError>
where
    C: ConnectionTrait,
    I: Iterator<Item = i32>,
{
    let ids = unique(ids);
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    Ok(instructors::Entity::find()
        .filter(instructors::Column::Id.is_in(ids))
        .all(conn)
        .await?
        .into_iter()
        .map(|i| (i.id, i.display_name()))
        .collect())
}

/// Checks that the student, course and instructor an agreement names exist.
async fn ensure_references<C: ConnectionTrait>(
    conn: &C,
    input: &AgreementInput,
) -> Result<(), StorageError> {
    if students::Entity::find_by_id(input.student_id)
        .one(conn)
        .await?
        .is_none()
    {
        return Err(StorageError::NotFound("Student".into()));
    }
    if courses::Entity::find_by_id(input.course_id)
        .one(conn)
        .await?
        .is_none()
    {
        return Err(StorageError::NotFound("Course".into()));
    }
    if let Some(instructor_id) = input.instructor_id {
        if instructors::Entity::find_by_id(instructor_id)
            .one(conn)
            .await?
            .is_none()
        {
            return Err(StorageError::NotFound("Instructor".into()));
        }
    }
    Ok(())
}

/// `SELECT ... FOR UPDATE` on the agreement row. Every agreement update and
/// every ledger write goes through this lock first.
async fn lock_agreement<C: ConnectionTrait>(
    conn: &C,
    id: i32,
) -> Result<ita_master::Model, StorageError> {
    ita_master::Entity::find_by_id(id)
        .lock_exclusive()
        .one(conn)
        .await?
        .ok_or_else(|| StorageError::NotFound(AGREEMENT.into()))
}

async fn find_entry<C: ConnectionTrait>(
    conn: &C,
    id: i32,
) -> Result<signed_ita_attendance::Model, StorageError> {
    signed_ita_attendance::Entity::find_by_id(id)
        .one(conn)
        .await?
        .ok_or_else(|| StorageError::NotFound(ENTRY.into()))
}

/// Locks the parent agreement of entry `id`, then reads the entry again so
/// that the returned row cannot change before the transaction ends.
async fn lock_entry<C: ConnectionTrait>(
    conn: &C,
    id: i32,
) -> Result<signed_ita_attendance::Model, StorageError> {
    let entry = find_entry(conn, id).await?;
    lock_agreement(conn, entry.ita_master_id).await?;
    find_entry(conn, id).await
}

/// Writes the full hour sum of the agreement into every one of its entries.
async fn recompute_ledger<C: ConnectionTrait>(
    conn: &C,
    ita_master_id: i32,
) -> Result<f64, StorageError> {
    let hours: Vec<f64> = signed_ita_attendance::Entity::find()
        .select_only()
        .column(signed_ita_attendance::Column::HoursCompleted)
        .filter(signed_ita_attendance::Column::ItaMasterId.eq(ita_master_id))
        .into_tuple()
        .all(conn)
        .await?;
    let total = total_hours(hours);

    signed_ita_attendance::Entity::update_many()
        .col_expr(
            signed_ita_attendance::Column::TotalHoursAccumulated,
            Expr::value(total),
        )
        .filter(signed_ita_attendance::Column::ItaMasterId.eq(ita_master_id))
        .exec(conn)
        .await?;

    debug!("Ledger for agreement {} recomputed: {} hours", ita_master_id, total);
    Ok(total)
}

fn write_signatures(active: &mut signed_ita_attendance::ActiveModel, state: &SignatureState) {
    active.student_signature = ActiveValue::Set(state.student_signature.clone());
    active.student_signature_date = ActiveValue::Set(state.student_signature_date);
    active.instructor_signature = ActiveValue::Set(state.instructor_signature.clone());
    active.instructor_signature_date = ActiveValue::Set(state.instructor_signature_date);
    active.status = ActiveValue::Set(state.status());
}

#[async_trait]
impl Storage for DatabaseStorage {
    async fn ping(&self) -> Result<(), StorageError> {
        self.connection
            .ping()
            .await
            .map_err(|e| StorageError::ConnectionFailed(e.to_string()))
    }

    async fn add_student(&self, student: &NewStudent) -> Result<i32, StorageError> {
        let model = students::ActiveModel {
            id: ActiveValue::NotSet,
            first_name: ActiveValue::Set(student.first_name.clone()),
            last_name: ActiveValue::Set(student.last_name.clone()),
            email: ActiveValue::Set(student.email.clone()),
        }
        .insert(&self.connection)
        .await?;
        Ok(model.id)
    }

    async fn add_course(&self, course: &NewCourse) -> Result<i32, StorageError> {
        let model = courses::ActiveModel {
            id: ActiveValue::NotSet,
            course_name: ActiveValue::Set(course.course_name.clone()),
            course_code: ActiveValue::Set(course.course_code.clone()),
        }
        .insert(&self.connection)
        .await?;
        Ok(model.id)
    }

    async fn add_instructor(&self, instructor: &NewInstructor) -> Result<i32, StorageError> {
        let model = instructors::ActiveModel {
            id: ActiveValue::NotSet,
            first_name: ActiveValue::Set(instructor.first_name.clone()),
            last_name: ActiveValue::Set(instructor.last_name.clone()),
            email: ActiveValue::Set(instructor.email.clone()),
        }
        .insert(&self.connection)
        .await?;
        Ok(model.id)
    }

    async fn create_agreement(
        &self,
        input: &AgreementInput,
    ) -> Result<AgreementDetail, StorageError> {
        ensure_references(&self.connection, input).await?;

        let now = now();
        let model = ita_master::ActiveModel {
            id: ActiveValue::NotSet,
            student_id: ActiveValue::Set(input.student_id),
            course_id: ActiveValue::Set(input.course_id),
            instructor_id: ActiveValue::Set(input.instructor_id),
            agreement_date: ActiveValue::Set(input.agreement_date),
            start_date: ActiveValue::Set(input.start_date),
            end_date: ActiveValue::Set(input.end_date),
            total_hours: ActiveValue::Set(input.total_hours),
            status: ActiveValue::Set(input.status.unwrap_or(AgreementStatus::Active)),
            notes: ActiveValue::Set(input.notes.clone()),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
        }
        .insert(&self.connection)
        .await?;

        info!(
            "Created ITA agreement {} (student {}, course {}, {} hours)",
            model.id, model.student_id, model.course_id, model.total_hours
        );
        self.get_agreement(model.id).await
    }

    async fn get_agreement(&self, id: i32) -> Result<AgreementDetail, StorageError> {
        let model = ita_master::Entity::find_by_id(id)
            .one(&self.connection)
            .await?
            .ok_or_else(|| StorageError::NotFound(AGREEMENT.into()))?;
        self.agreement_details(vec![model])
            .await?
            .pop()
            .ok_or_else(|| StorageError::NotFound(AGREEMENT.into()))
    }

    async fn list_agreements(
        &self,
        filter: &AgreementFilter,
        page: Pagination,
    ) -> Result<Paged<AgreementDetail>, StorageError> {
        let mut query = ita_master::Entity::find();
        if let Some(status) = filter.status {
            query = query.filter(ita_master::Column::Status.eq(status));
        }
        if let Some(student_id) = filter.student_id {
            query = query.filter(ita_master::Column::StudentId.eq(student_id));
        }
        if let Some(course_id) = filter.course_id {
            query = query.filter(ita_master::Column::CourseId.eq(course_id));
        }
        let paginator = query
            .order_by_desc(ita_master::Column::CreatedAt)
            .order_by_desc(ita_master::Column::Id)
            .paginate(&self.connection, page.limit);
        let total = paginator.num_items().await?;
        let models = paginator.fetch_page(page.page.saturating_sub(1)).await?;

        Ok(Paged {
            items: self.agreement_details(models).await?,
            total,
        })
    }

    async fn update_agreement(
        &self,
        id: i32,
        input: &AgreementInput,
    ) -> Result<AgreementDetail, StorageError> {
        let txn = self.connection.begin().await?;
        let existing = lock_agreement(&txn, id).await?;
        ensure_references(&txn, input).await?;

        let status = input.status.unwrap_or(existing.status);
        if !existing.status.can_transition_to(status) {
            warn!(
                "Rejected status change of agreement {} from {} to {}",
                id, existing.status, status
            );
            return Err(ValidationError::Invalid(format!(
                "Cannot change agreement status from {} to {}",
                existing.status, status
            ))
            .into());
        }

        let previous_student = existing.student_id;
        let mut active: ita_master::ActiveModel = existing.into();
        active.student_id = ActiveValue::Set(input.student_id);
        active.course_id = ActiveValue::Set(input.course_id);
        active.instructor_id = ActiveValue::Set(input.instructor_id);
        active.agreement_date = ActiveValue::Set(input.agreement_date);
        active.start_date = ActiveValue::Set(input.start_date);
        active.end_date = ActiveValue::Set(input.end_date);
        active.total_hours = ActiveValue::Set(input.total_hours);
        active.status = ActiveValue::Set(status);
        active.notes = ActiveValue::Set(input.notes.clone());
        active.updated_at = ActiveValue::Set(now());
        active.update(&txn).await?;

        // Entries always belong to the agreement's student. Their name
        // snapshots are left as they were.
        if previous_student != input.student_id {
            let moved = signed_ita_attendance::Entity::update_many()
                .col_expr(
                    signed_ita_attendance::Column::StudentId,
                    Expr::value(input.student_id),
                )
                .filter(signed_ita_attendance::Column::ItaMasterId.eq(id))
                .exec(&txn)
                .await?
                .rows_affected;
            info!(
                "Moved {} attendance record(s) of agreement {} from student {} to {}",
                moved, id, previous_student, input.student_id
            );
        }
        txn.commit().await?;

        info!("Updated ITA agreement {}", id);
        self.get_agreement(id).await
    }

    async fn delete_agreement(&self, id: i32) -> Result<u64, StorageError> {
        let txn = self.connection.begin().await?;
        lock_agreement(&txn, id).await?;
        let removed = signed_ita_attendance::Entity::delete_many()
            .filter(signed_ita_attendance::Column::ItaMasterId.eq(id))
            .exec(&txn)
            .await?
            .rows_affected;
        ita_master::Entity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;

        info!(
            "Deleted ITA agreement {} with {} attendance record(s)",
            id, removed
        );
        Ok(removed)
    }

    async fn agreement_stats(&self) -> Result<AgreementStats, StorageError> {
        let count_status = |status: AgreementStatus| {
            ita_master::Entity::find()
                .filter(ita_master::Column::Status.eq(status))
                .count(&self.connection)
        };
        let planned: Vec<f64> = ita_master::Entity::find()
            .select_only()
            .column(ita_master::Column::TotalHours)
            .into_tuple()
            .all(&self.connection)
            .await?;

        Ok(AgreementStats {
            total: ita_master::Entity::find().count(&self.connection).await?,
            active: count_status(AgreementStatus::Active).await?,
            completed: count_status(AgreementStatus::Completed).await?,
            terminated: count_status(AgreementStatus::Terminated).await?,
            total_planned_hours: total_hours(planned),
        })
    }

    async fn create_session_entry(
        &self,
        entry: &NewSessionEntry,
    ) -> Result<SessionEntryDetail, StorageError> {
        let txn = self.connection.begin().await?;
        let agreement = lock_agreement(&txn, entry.ita_master_id).await?;
        if let Some(student_id) = entry.student_id {
            if student_id != agreement.student_id {
                return Err(ValidationError::Invalid(format!(
                    "Student {} is not the student of ITA agreement {}",
                    student_id, agreement.id
                ))
                .into());
            }
        }
        // Snapshot of the name as of today; never refreshed afterwards.
        let student = students::Entity::find_by_id(agreement.student_id)
            .one(&txn)
            .await?
            .ok_or_else(|| StorageError::NotFound("Student".into()))?;

        let now = now();
        let mut signatures = SignatureState::default();
        if let Some(signature) = &entry.student_signature {
            signatures.sign(SignatureParty::Student, signature.clone(), now);
        }
        if let Some(signature) = &entry.instructor_signature {
            signatures.sign(SignatureParty::Instructor, signature.clone(), now);
        }

        let mut active = signed_ita_attendance::ActiveModel {
            id: ActiveValue::NotSet,
            ita_master_id: ActiveValue::Set(agreement.id),
            student_id: ActiveValue::Set(agreement.student_id),
            student_name: ActiveValue::Set(Some(student.display_name())),
            session_date: ActiveValue::Set(entry.session_date),
            start_time: ActiveValue::Set(entry.start_time),
            end_time: ActiveValue::Set(entry.end_time),
            hours_completed: ActiveValue::Set(entry.hours_completed),
            total_hours_accumulated: ActiveValue::Set(0.0),
            notes: ActiveValue::Set(entry.notes.clone()),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
            ..Default::default()
        };
        write_signatures(&mut active, &signatures);
        let model = active.insert(&txn).await?;
        let total = recompute_ledger(&txn, agreement.id).await?;
        txn.commit().await?;

        info!(
            "Created attendance record {} for agreement {} ({} h, ledger {} h)",
            model.id, agreement.id, model.hours_completed, total
        );
        self.get_session_entry(model.id).await
    }

    async fn get_session_entry(&self, id: i32) -> Result<SessionEntryDetail, StorageError> {
        let model = find_entry(&self.connection, id).await?;
        self.entry_details(vec![model])
            .await?
            .pop()
            .ok_or_else(|| StorageError::NotFound(ENTRY.into()))
    }

    async fn list_session_entries(
        &self,
        filter: &SessionEntryFilter,
        page: Pagination,
    ) -> Result<Paged<SessionEntryDetail>, StorageError> {
        let mut query = signed_ita_attendance::Entity::find();
        if let Some(status) = filter.status {
            query = query.filter(signed_ita_attendance::Column::Status.eq(status));
        }
        if let Some(student_id) = filter.student_id {
            query = query.filter(signed_ita_attendance::Column::StudentId.eq(student_id));
        }
        if let Some(ita_master_id) = filter.ita_master_id {
            query = query.filter(signed_ita_attendance::Column::ItaMasterId.eq(ita_master_id));
        }
        if let Some(session_date) = filter.session_date {
            query = query.filter(signed_ita_attendance::Column::SessionDate.eq(session_date));
        }
        if let Some(instructor_id) = filter.instructor_id {
            let agreement_ids: Vec<i32> = ita_master::Entity::find()
                .select_only()
                .column(ita_master::Column::Id)
                .filter(ita_master::Column::InstructorId.eq(instructor_id))
                .into_tuple()
                .all(&self.connection)
                .await?;
            if agreement_ids.is_empty() {
                return Ok(Paged {
                    items: Vec::new(),
                    total: 0,
                });
            }
            query = query.filter(signed_ita_attendance::Column::ItaMasterId.is_in(agreement_ids));
        }

        let paginator = query
            .order_by_desc(signed_ita_attendance::Column::SessionDate)
            .order_by_desc(signed_ita_attendance::Column::CreatedAt)
            .order_by_desc(signed_ita_attendance::Column::Id)
            .paginate(&self.connection, page.limit);
        let total = paginator.num_items().await?;
        let models = paginator.fetch_page(page.page.saturating_sub(1)).await?;

        Ok(Paged {
            items: self.entry_details(models).await?,
            total,
        })
    }

    async fn update_session_entry(
        &self,
        id: i32,
        update: &SessionEntryUpdate,
    ) -> Result<SessionEntryDetail, StorageError> {
        let txn = self.connection.begin().await?;
        let existing = lock_entry(&txn, id).await?;
        let ita_master_id = existing.ita_master_id;

        let start_time = update.start_time.or(existing.start_time);
        let end_time = update.end_time.or(existing.end_time);
        let times_changed = update.start_time.is_some() || update.end_time.is_some();
        let hours_completed = match (update.hours_completed, start_time, end_time) {
            (Some(hours), _, _) => ledger::check_session_hours(hours)?,
            (None, Some(start), Some(end)) if times_changed => ledger::hours_between(start, end)?,
            _ => existing.hours_completed,
        };
        if let (Some(start), Some(end)) = (start_time, end_time) {
            ledger::hours_between(start, end)?;
        }

        let now = now();
        let mut signatures = SessionEntry::from(existing.clone()).signatures();
        if let Some(signature) = &update.student_signature {
            signatures.sign(SignatureParty::Student, signature.clone(), now);
        }
        if let Some(signature) = &update.instructor_signature {
            signatures.sign(SignatureParty::Instructor, signature.clone(), now);
        }

        let mut active: signed_ita_attendance::ActiveModel = existing.clone().into();
        active.session_date = ActiveValue::Set(update.session_date.unwrap_or(existing.session_date));
        active.start_time = ActiveValue::Set(start_time);
        active.end_time = ActiveValue::Set(end_time);
        active.hours_completed = ActiveValue::Set(hours_completed);
        if update.notes.is_some() {
            active.notes = ActiveValue::Set(update.notes.clone());
        }
        write_signatures(&mut active, &signatures);
        active.updated_at = ActiveValue::Set(now);
        active.update(&txn).await?;

        let total = recompute_ledger(&txn, ita_master_id).await?;
        txn.commit().await?;

        info!(
            "Updated attendance record {} (agreement {}, ledger {} h)",
            id, ita_master_id, total
        );
        self.get_session_entry(id).await
    }

    async fn delete_session_entry(&self, id: i32) -> Result<(), StorageError> {
        let txn = self.connection.begin().await?;
        let existing = lock_entry(&txn, id).await?;
        signed_ita_attendance::Entity::delete_by_id(id)
            .exec(&txn)
            .await?;
        let total = recompute_ledger(&txn, existing.ita_master_id).await?;
        txn.commit().await?;

        info!(
            "Deleted attendance record {} (agreement {}, ledger {} h)",
            id, existing.ita_master_id, total
        );
        Ok(())
    }

    async fn sign_session_entry(
        &self,
        id: i32,
        party: SignatureParty,
        signature: &str,
    ) -> Result<SessionEntryDetail, StorageError> {
        if signature.trim().is_empty() {
            return Err(ValidationError::MissingFields(vec!["signature"]).into());
        }

        let txn = self.connection.begin().await?;
        let existing = lock_entry(&txn, id).await?;
        let now = now();
        let mut signatures = SessionEntry::from(existing.clone()).signatures();
        let status = signatures.sign(party, signature.to_owned(), now);

        let mut active: signed_ita_attendance::ActiveModel = existing.into();
        write_signatures(&mut active, &signatures);
        active.updated_at = ActiveValue::Set(now);
        active.update(&txn).await?;
        txn.commit().await?;

        info!(
            "Attendance record {} signed by {}, status is now {}",
            id, party, status
        );
        self.get_session_entry(id).await
    }

    async fn session_entry_stats(&self) -> Result<SessionEntryStats, StorageError> {
        let count_status = |status: EntryStatus| {
            signed_ita_attendance::Entity::find()
                .filter(signed_ita_attendance::Column::Status.eq(status))
                .count(&self.connection)
        };
        let hours: Vec<f64> = signed_ita_attendance::Entity::find()
            .select_only()
            .column(signed_ita_attendance::Column::HoursCompleted)
            .into_tuple()
            .all(&self.connection)
            .await?;

        Ok(SessionEntryStats {
            total: signed_ita_attendance::Entity::find()
                .count(&self.connection)
                .await?,
            pending: count_status(EntryStatus::Pending).await?,
            signed_by_student: count_status(EntryStatus::SignedByStudent).await?,
            signed_by_instructor: count_status(EntryStatus::SignedByInstructor).await?,
            completed: count_status(EntryStatus::Completed).await?,
            total_hours_completed: total_hours(hours),
        })
    }

    async fn progress(&self, ita_master_id: i32) -> Result<ProgressView, StorageError> {
        let agreement = ita_master::Entity::find_by_id(ita_master_id)
            .one(&self.connection)
            .await?
            .ok_or_else(|| StorageError::NotFound(AGREEMENT.into()))?;
        let entries = signed_ita_attendance::Entity::find()
            .filter(signed_ita_attendance::Column::ItaMasterId.eq(ita_master_id))
            .all(&self.connection)
            .await?;

        Ok(ProgressView::compute(
            agreement.id,
            agreement.total_hours,
            entries.into_iter().map(|e| (e.hours_completed, e.status)),
        ))
    }
}
