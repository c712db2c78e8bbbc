//! Scheduled crypto market ETL: configuration, the per-cycle orchestrator and the
//! fixed-interval scheduler that drives it.

pub mod config;
pub mod orchestrator;
pub mod scheduler;

pub use config::{ConfigError, PipelineConfig};
pub use orchestrator::{Pipeline, PipelineRun, StageOutcome};
pub use scheduler::Scheduler;
