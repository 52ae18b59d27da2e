//! Solverbench - token-swap solver benchmark engine
//! Built with Domain-Driven Design principles

pub mod domain;
pub mod infrastructure;
pub mod application;
pub mod shared;

// Re-export main types for convenience
pub use application::orchestrator::{RunOrchestrator, RunSettings, RunState, SimulationRun};
pub use application::report::RunReport;
pub use domain::graph::PoolGraph;
pub use infrastructure::optimizer::{OptimizeApi, OptimizerClient};
pub use shared::types::{RunSnapshot, SimulationInput, SimulationRequest, SolverResult};
