// src/application/report.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::application::orchestrator::RunState;
use crate::domain::analytics::{
    history_series, leaderboard, pool_usage_distribution, profit_gas_scatter,
    win_rate_distribution, win_streaks, HistoryPoint, LeaderboardEntry, PoolUsageBar,
    ProfitGasPoint, WinRateSlice, WinStreak,
};
use crate::domain::graph::{derive_graph, PoolGraph};

/// Presentation-ready bundle of everything one run produced
#[derive(Debug, Serialize, Deserialize)]
pub struct RunReport {
    // Run metadata
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub planned_steps: u32,
    pub completed_steps: u32,
    pub failed: bool,
    pub error: Option<String>,

    // Aggregated analytics
    pub leaderboard: Vec<LeaderboardEntry>,
    pub win_rate: Vec<WinRateSlice>,
    pub win_streaks: Vec<WinStreak>,
    pub scatter: Vec<ProfitGasPoint>,
    pub history: Vec<HistoryPoint>,
    pub pool_usage: Vec<PoolUsageBar>,
    pub graph: PoolGraph,

    // Metadata
    pub generated_at: DateTime<Utc>,
}

impl RunReport {
    /// Build a report from the orchestrator's exposed state
    pub fn from_state(state: &RunState, target_asset: &str) -> Self {
        let (board, rates, streaks, scatter, series, usage, graph) = match &state.current {
            Some(snapshot) => (
                leaderboard(snapshot, &state.history),
                win_rate_distribution(snapshot),
                win_streaks(snapshot),
                profit_gas_scatter(snapshot),
                history_series(snapshot, &state.history),
                pool_usage_distribution(snapshot),
                derive_graph(snapshot, target_asset),
            ),
            None => Default::default(),
        };

        Self {
            run_id: state.run_id.clone(),
            started_at: state.started_at,
            finished_at: state.finished_at,
            planned_steps: state.planned_steps,
            completed_steps: state.completed_steps,
            failed: state.failed,
            error: None,
            leaderboard: board,
            win_rate: rates,
            win_streaks: streaks,
            scatter,
            history: series,
            pool_usage: usage,
            graph,
            generated_at: Utc::now(),
        }
    }

    pub fn with_error(mut self, message: String) -> Self {
        self.error = Some(message);
        self
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
