use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ItaMaster::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ItaMaster::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ItaMaster::StudentId).integer().not_null())
                    .col(ColumnDef::new(ItaMaster::CourseId).integer().not_null())
                    .col(ColumnDef::new(ItaMaster::InstructorId).integer().null())
                    .col(ColumnDef::new(ItaMaster::AgreementDate).date().not_null())
                    .col(ColumnDef::new(ItaMaster::StartDate).date().not_null())
                    .col(ColumnDef::new(ItaMaster::EndDate).date().not_null())
                    .col(ColumnDef::new(ItaMaster::TotalHours).double().not_null())
                    .col(
                        ColumnDef::new(ItaMaster::Status)
                            .string_len(32)
                            .not_null()
                            .default("active"),
                    )
                    .col(ColumnDef::new(ItaMaster::Notes).text().null())
                    .col(ColumnDef::new(ItaMaster::CreatedAt).date_time().not_null())
                    .col(ColumnDef::new(ItaMaster::UpdatedAt).date_time().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ita_master_student_id")
                            .from(ItaMaster::Table, ItaMaster::StudentId)
                            .to(Students::Table, Students::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ita_master_course_id")
                            .from(ItaMaster::Table, ItaMaster::CourseId)
                            .to(Courses::Table, Courses::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ita_master_instructor_id")
                            .from(ItaMaster::Table, ItaMaster::InstructorId)
                            .to(Instructors::Table, Instructors::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_ita_master_status")
                    .if_not_exists()
                    .table(ItaMaster::Table)
                    .col(ItaMaster::Status)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ItaMaster::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ItaMaster {
    Table,
    Id,
    StudentId,
    CourseId,
    InstructorId,
    AgreementDate,
    StartDate,
    EndDate,
    TotalHours,
    Status,
    Notes,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Students {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Courses {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Instructors {
    Table,
    Id,
}
