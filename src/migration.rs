//! Schema migrations, applied once at startup by the controller.

pub use sea_orm_migration::prelude::*;

mod m20240101_000001_create_students_table;
mod m20240101_000002_create_courses_table;
mod m20240101_000003_create_instructors_table;
mod m20240101_000004_create_ita_master_table;
mod m20240101_000005_create_signed_ita_attendance_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_students_table::Migration),
            Box::new(m20240101_000002_create_courses_table::Migration),
            Box::new(m20240101_000003_create_instructors_table::Migration),
            Box::new(m20240101_000004_create_ita_master_table::Migration),
            Box::new(m20240101_000005_create_signed_ita_attendance_table::Migration),
        ]
    }
}
