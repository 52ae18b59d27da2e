//! Analytics domain - aggregation over run snapshots and history

pub mod distribution;
pub mod leaderboard;
pub mod series;

pub use distribution::{
    pool_usage_distribution, win_rate_distribution, win_streaks, PoolUsageBar, WinRateSlice,
    WinStreak,
};
pub use leaderboard::{leaderboard, LeaderboardEntry};
pub use series::{history_series, profit_gas_scatter, HistoryPoint, ProfitGasPoint};
