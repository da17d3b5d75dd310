//! Storage subsystem
//!
//! This module provides the abstraction and the relational implementation for
//! persisting ITA agreements and their signed attendance entries.
//!
//! Components:
//! - `storage_trait`: the Storage trait defining a uniform API.
//! - `types`: shared data types used by storage backends.
//! - `database_storage`: SeaORM implementation (MySQL in production, SQLite in tests).
//! - `filters`: helpers to build list filters and pages from query parameters.
//! - `db_entities`: SeaORM entity models for the database backend.

pub mod database_storage;
pub mod db_entities;
pub mod filters;
pub mod storage_trait;
pub mod types;

pub use database_storage::DatabaseStorage;
pub use storage_trait::Storage;
