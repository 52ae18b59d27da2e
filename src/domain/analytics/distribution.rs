//! Win-rate, win-streak and pool-usage distributions

use serde::{Deserialize, Serialize};

use crate::shared::types::RunSnapshot;

/// One solver's share of wins, as reported by the optimizer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WinRateSlice {
    pub solver: String,
    pub win_rate: f64,
}

/// One solver's longest consecutive win count
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WinStreak {
    pub solver: String,
    pub streak: u32,
}

/// One pool's usage count across winning routes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolUsageBar {
    pub pool: String,
    pub usage: f64,
}

/// Win-rate slices in mapping order. Percentages are passed through as
/// reported; they are not renormalized even when they do not sum to 100.
pub fn win_rate_distribution(snapshot: &RunSnapshot) -> Vec<WinRateSlice> {
    snapshot
        .win_rate
        .iter()
        .map(|(solver, rate)| WinRateSlice {
            solver: solver.clone(),
            win_rate: *rate,
        })
        .collect()
}

/// Win streaks in mapping order. The optimizer is authoritative, nothing
/// is recomputed from history.
pub fn win_streaks(snapshot: &RunSnapshot) -> Vec<WinStreak> {
    snapshot
        .win_streaks
        .iter()
        .map(|(solver, streak)| WinStreak {
            solver: solver.clone(),
            streak: *streak,
        })
        .collect()
}

/// Pool usage counts in mapping order, empty when the snapshot carries no
/// usage section.
pub fn pool_usage_distribution(snapshot: &RunSnapshot) -> Vec<PoolUsageBar> {
    match &snapshot.pool_usage {
        Some(usage) => usage
            .iter()
            .map(|(pool, count)| PoolUsageBar {
                pool: pool.clone(),
                usage: *count,
            })
            .collect(),
        None => Vec::new(),
    }
}
