// Job scheduler module

pub mod engine;

pub use engine::{SchedulerConfig, SchedulerEngine};
