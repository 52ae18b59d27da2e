//! Error handling for the application

use thiserror::Error;

/// Optimizer client errors
#[derive(Error, Debug)]
pub enum OptimizerError {
    #[error("Optimizer request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Optimizer protocol error: {0}")]
    Protocol(String),
}

/// Run orchestration errors
#[derive(Error, Debug)]
pub enum OrchestratorError {
    #[error("Invalid simulation input: {0}")]
    Validation(String),

    #[error("A simulation run is already in progress")]
    RunInProgress,

    #[error("Optimizer error: {0}")]
    Optimizer(#[from] OptimizerError),
}

/// General application error
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Orchestrator error: {0}")]
    OrchestratorError(String),

    #[error("Report error: {0}")]
    ReportError(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<OrchestratorError> for AppError {
    fn from(err: OrchestratorError) -> Self {
        AppError::OrchestratorError(err.to_string())
    }
}

impl From<OptimizerError> for AppError {
    fn from(err: OptimizerError) -> Self {
        AppError::OrchestratorError(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::ReportError(err.to_string())
    }
}
