//! Per-step time series and scatter data

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::shared::types::{RunSnapshot, StepResults};

/// BTC received by each tracked solver at one step.
///
/// A solver absent from a step carries None (serialized as null), which a
/// chart renders as a gap. Zero is a real received amount and is never
/// substituted for a gap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryPoint {
    pub step: u32,
    #[serde(flatten)]
    pub received: IndexMap<String, Option<f64>>,
}

/// One solver's position in the gas/profit plane
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfitGasPoint {
    pub solver: String,
    pub gas_cost: f64,
    pub profit: f64,
}

/// Per-step received amounts for every solver in the latest snapshot.
///
/// The tracked solver set is the latest last_run's keys in mapping order;
/// solver sets may drift between steps and earlier steps simply show gaps
/// for solvers that joined later.
pub fn history_series(snapshot: &RunSnapshot, history: &[StepResults]) -> Vec<HistoryPoint> {
    let solvers: Vec<&String> = snapshot.last_run.keys().collect();

    history
        .iter()
        .enumerate()
        .map(|(i, step)| {
            let mut received = IndexMap::new();
            for solver in &solvers {
                let value = step.get(*solver).map(|r| r.btc_received);
                received.insert((*solver).clone(), value);
            }
            HistoryPoint {
                step: (i + 1) as u32,
                received,
            }
        })
        .collect()
}

/// One (gas_cost, profit) point per solver in the latest results
pub fn profit_gas_scatter(snapshot: &RunSnapshot) -> Vec<ProfitGasPoint> {
    snapshot
        .last_run
        .iter()
        .map(|(solver, result)| ProfitGasPoint {
            solver: solver.clone(),
            gas_cost: result.gas_cost,
            profit: result.solver_profit,
        })
        .collect()
}
