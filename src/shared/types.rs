//! Common types used across the application

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Request body for one optimization step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationRequest {
    pub from_token: String,
    pub to_token: String,
    pub amount: f64,
    pub max_slippage: f64,
    /// 1-based step index, doubles as the simulation count for the step
    #[serde(rename = "simulations")]
    pub simulation_step: u32,
    /// Opaque strategy expression, forwarded verbatim
    pub custom_logic: String,
    pub use_live: bool,
}

/// One solver's outcome for a single simulation round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverResult {
    pub solver: String,
    pub btc_received: f64,
    pub gas_cost: f64,
    pub solver_profit: f64,
    pub latency_ms: f64,
    #[serde(default)]
    pub route: Vec<String>,
}

/// Pool metadata as reported by the optimizer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolState {
    pub price: Option<f64>,
    pub fee: Option<f64>,
    pub gas: Option<f64>,
    pub liquidity: Option<f64>,
}

/// Full optimizer response for one step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSnapshot {
    pub last_run: IndexMap<String, SolverResult>,
    pub pool_usage: Option<IndexMap<String, f64>>,
    pub pools: Option<IndexMap<String, PoolState>>,
    /// Cumulative win percentages in [0, 100], keyed by solver
    pub win_rate: IndexMap<String, f64>,
    pub win_streaks: IndexMap<String, u32>,
    pub history: Vec<Vec<SolverResult>>,
}

/// Per-solver results of one completed step
pub type StepResults = IndexMap<String, SolverResult>;

/// Ordered step results accumulated over one run
pub type RunHistory = Vec<StepResults>;

/// Raw user input for a simulation run, as entered in the UI
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationInput {
    pub amount: String,
    pub runs: String,
    pub custom_logic: String,
    pub use_live: bool,
}

impl Default for SimulationInput {
    fn default() -> Self {
        Self {
            amount: "100".to_string(),
            runs: "10".to_string(),
            custom_logic: String::new(),
            use_live: false,
        }
    }
}

/// Validated simulation parameters
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    pub amount: f64,
    pub runs: u32,
    pub custom_logic: String,
    pub use_live: bool,
}
