pub mod agreement;
pub mod attendance;
pub mod configuration;
pub mod controller;
pub mod error_handling;
pub mod migration;
pub mod storage;
pub mod web_interface;
