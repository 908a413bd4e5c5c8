pub mod config;
pub mod error;
pub mod telegram;
pub mod telemetry;
pub mod workflows;
