use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SignedItaAttendance::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SignedItaAttendance::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(SignedItaAttendance::ItaMasterId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SignedItaAttendance::StudentId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SignedItaAttendance::StudentName)
                            .string_len(255)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(SignedItaAttendance::SessionDate)
                            .date()
                            .not_null(),
                    )
                    .col(ColumnDef::new(SignedItaAttendance::StartTime).time().null())
                    .col(ColumnDef::new(SignedItaAttendance::EndTime).time().null())
                    .col(
                        ColumnDef::new(SignedItaAttendance::HoursCompleted)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(SignedItaAttendance::StudentSignature)
                            .text()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(SignedItaAttendance::StudentSignatureDate)
                            .date_time()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(SignedItaAttendance::InstructorSignature)
                            .text()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(SignedItaAttendance::InstructorSignatureDate)
                            .date_time()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(SignedItaAttendance::TotalHoursAccumulated)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(SignedItaAttendance::Status)
                            .string_len(32)
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(SignedItaAttendance::Notes).text().null())
                    .col(
                        ColumnDef::new(SignedItaAttendance::CreatedAt)
                            .date_time()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SignedItaAttendance::UpdatedAt)
                            .date_time()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_signed_ita_attendance_ita_master_id")
                            .from(SignedItaAttendance::Table, SignedItaAttendance::ItaMasterId)
                            .to(ItaMaster::Table, ItaMaster::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_signed_ita_attendance_student_id")
                            .from(SignedItaAttendance::Table, SignedItaAttendance::StudentId)
                            .to(Students::Table, Students::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_signed_ita_attendance_ita_master_id")
                    .if_not_exists()
                    .table(SignedItaAttendance::Table)
                    .col(SignedItaAttendance::ItaMasterId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_signed_ita_attendance_session_date")
                    .if_not_exists()
                    .table(SignedItaAttendance::Table)
                    .col(SignedItaAttendance::SessionDate)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SignedItaAttendance::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum SignedItaAttendance {
    Table,
    Id,
    ItaMasterId,
    StudentId,
    StudentName,
    SessionDate,
    StartTime,
    EndTime,
    HoursCompleted,
    StudentSignature,
    StudentSignatureDate,
    InstructorSignature,
    InstructorSignatureDate,
    TotalHoursAccumulated,
    Status,
    Notes,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ItaMaster {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Students {
    Table,
    Id,
}
