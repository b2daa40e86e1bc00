pub mod catalog;
pub mod config;
pub mod error;
pub mod orders;
pub mod telemetry;
