// Common library shared by the scheduler binary and the test crates

pub mod config;
pub mod errors;
pub mod executor;
pub mod models;
pub mod monitors;
pub mod scheduler;
pub mod telemetry;
