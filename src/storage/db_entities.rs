//! SeaORM entity models used by the database storage backend.
//!
//! These structs map to the tables created by `crate::migration`:
//! - `ita_master`: training agreements
//! - `signed_ita_attendance`: signed session entries under an agreement
//! - `students`, `courses`, `instructors`: referenced data (names only)

pub mod ita_master {
    use sea_orm::entity::prelude::*;

    use crate::agreement::AgreementStatus;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "ita_master")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub student_id: i32,
        pub course_id: i32,
        pub instructor_id: Option<i32>,
        pub agreement_date: Date,
        pub start_date: Date,
        pub end_date: Date,
        /// Planned hours
        pub total_hours: f64,
        pub status: AgreementStatus,
        #[sea_orm(column_type = "Text", nullable)]
        pub notes: Option<String>,
        pub created_at: DateTime,
        pub updated_at: DateTime,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(has_many = "super::signed_ita_attendance::Entity")]
        SignedItaAttendance,
        #[sea_orm(
            belongs_to = "super::students::Entity",
            from = "Column::StudentId",
            to = "super::students::Column::Id"
        )]
        Student,
        #[sea_orm(
            belongs_to = "super::courses::Entity",
            from = "Column::CourseId",
            to = "super::courses::Column::Id"
        )]
        Course,
        #[sea_orm(
            belongs_to = "super::instructors::Entity",
            from = "Column::InstructorId",
            to = "super::instructors::Column::Id"
        )]
        Instructor,
    }

    impl Related<super::signed_ita_attendance::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::SignedItaAttendance.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod signed_ita_attendance {
    use sea_orm::entity::prelude::*;

    use crate::attendance::EntryStatus;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "signed_ita_attendance")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub ita_master_id: i32,
        pub student_id: i32,
        /// Display name captured when the entry was created
        pub student_name: Option<String>,
        pub session_date: Date,
        pub start_time: Option<Time>,
        pub end_time: Option<Time>,
        pub hours_completed: f64,
        #[sea_orm(column_type = "Text", nullable)]
        pub student_signature: Option<String>,
        pub student_signature_date: Option<DateTime>,
        #[sea_orm(column_type = "Text", nullable)]
        pub instructor_signature: Option<String>,
        pub instructor_signature_date: Option<DateTime>,
        /// Ledger snapshot, rewritten on every mutation of a sibling entry
        pub total_hours_accumulated: f64,
        pub status: EntryStatus,
        #[sea_orm(column_type = "Text", nullable)]
        pub notes: Option<String>,
        pub created_at: DateTime,
        pub updated_at: DateTime,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::ita_master::Entity",
            from = "Column::ItaMasterId",
            to = "super::ita_master::Column::Id",
            on_delete = "Cascade"
        )]
        ItaMaster,
    }

    impl Related<super::ita_master::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::ItaMaster.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod students {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "students")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub first_name: String,
        pub last_name: String,
        pub email: Option<String>,
    }

    impl Model {
        pub fn display_name(&self) -> String {
            format!("{} {}", self.first_name, self.last_name)
        }
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod courses {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "courses")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub course_name: String,
        pub course_code: Option<String>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod instructors {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "instructors")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub first_name: String,
        pub last_name: String,
        pub email: Option<String>,
    }

    impl Model {
        pub fn display_name(&self) -> String {
            format!("{} {}", self.first_name, self.last_name)
        }
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}
