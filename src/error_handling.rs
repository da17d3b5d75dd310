//! Error types shared across the crate, one enum per subsystem.

pub mod types;

pub use types::*;
