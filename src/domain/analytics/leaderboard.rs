//! Solver leaderboard ranking

use serde::{Deserialize, Serialize};

use crate::shared::types::{RunSnapshot, StepResults};

/// One ranked leaderboard row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    /// 1-based rank, best win rate first
    pub rank: u32,
    pub solver: String,
    pub win_rate: f64,
    /// Mean profit over the run history, None when the solver has no entries
    pub avg_profit: Option<f64>,
    /// Mean gas cost over the run history, None when the solver has no entries
    pub avg_gas: Option<f64>,
}

/// Rank solvers by descending win rate.
///
/// Ties keep the order the solvers appear in the snapshot's win_rate
/// mapping. Averages are computed over the accumulated run history; a
/// solver with no history entries gets None rather than a zero that would
/// be indistinguishable from a real zero-profit average.
pub fn leaderboard(snapshot: &RunSnapshot, history: &[StepResults]) -> Vec<LeaderboardEntry> {
    let mut ranked: Vec<(&String, f64)> = snapshot
        .win_rate
        .iter()
        .map(|(solver, rate)| (solver, *rate))
        .collect();

    // Stable sort preserves mapping order for equal win rates
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    ranked
        .into_iter()
        .enumerate()
        .map(|(i, (solver, win_rate))| {
            let (avg_profit, avg_gas) = solver_averages(history, solver);
            LeaderboardEntry {
                rank: (i + 1) as u32,
                solver: solver.clone(),
                win_rate,
                avg_profit,
                avg_gas,
            }
        })
        .collect()
}

/// Mean profit and gas cost for one solver across all completed steps
fn solver_averages(history: &[StepResults], solver: &str) -> (Option<f64>, Option<f64>) {
    let mut profit_sum = 0.0;
    let mut gas_sum = 0.0;
    let mut count = 0u32;

    for step in history {
        if let Some(result) = step.get(solver) {
            profit_sum += result.solver_profit;
            gas_sum += result.gas_cost;
            count += 1;
        }
    }

    if count == 0 {
        (None, None)
    } else {
        (
            Some(profit_sum / count as f64),
            Some(gas_sum / count as f64),
        )
    }
}
