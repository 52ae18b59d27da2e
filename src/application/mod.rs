//! Application layer - use cases and services

pub mod commands;
pub mod orchestrator;
pub mod report;

pub use commands::{Cli, Commands, CommandExecutor};
pub use orchestrator::{RunOrchestrator, RunSettings, RunState, SimulationRun};
pub use report::RunReport;
