//! Simulation run orchestration

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::stream::{self, Stream};
use tokio::sync::RwLock;
use tracing::{error, info};

use crate::domain::analytics::{self, LeaderboardEntry};
use crate::domain::graph::{derive_graph, PoolGraph};
use crate::infrastructure::optimizer::OptimizeApi;
use crate::shared::config::SimulationDefaults;
use crate::shared::errors::OrchestratorError;
use crate::shared::types::{
    RunHistory, RunSnapshot, SimulationConfig, SimulationInput, SimulationRequest,
};
use crate::shared::utils::generate_id;

/// Параметры, общие для всех шагов одного запуска
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub from_token: String,
    pub to_token: String,
    pub max_slippage: f64,
    pub step_delay: Duration,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            from_token: "ETH".to_string(),
            to_token: "BTC".to_string(),
            max_slippage: 0.5,
            step_delay: Duration::from_millis(250),
        }
    }
}

impl From<&SimulationDefaults> for RunSettings {
    fn from(defaults: &SimulationDefaults) -> Self {
        Self {
            from_token: defaults.from_token.clone(),
            to_token: defaults.to_token.clone(),
            max_slippage: defaults.max_slippage,
            step_delay: Duration::from_millis(defaults.step_delay_ms),
        }
    }
}

/// Observable state of the current or most recent run
#[derive(Debug, Clone)]
pub struct RunState {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub planned_steps: u32,
    pub completed_steps: u32,
    pub failed: bool,
    pub current: Option<RunSnapshot>,
    pub history: RunHistory,
}

impl RunState {
    pub fn new() -> Self {
        Self {
            run_id: String::new(),
            started_at: Utc::now(),
            finished_at: None,
            planned_steps: 0,
            completed_steps: 0,
            failed: false,
            current: None,
            history: Vec::new(),
        }
    }

    fn begin(run_id: String, planned_steps: u32) -> Self {
        Self {
            run_id,
            started_at: Utc::now(),
            finished_at: None,
            planned_steps,
            completed_steps: 0,
            failed: false,
            current: None,
            history: Vec::new(),
        }
    }
}

impl Default for RunState {
    fn default() -> Self {
        Self::new()
    }
}

/// Основной оркестратор запусков симуляции
pub struct RunOrchestrator {
    client: Arc<dyn OptimizeApi>,
    settings: RunSettings,
    state: Arc<RwLock<RunState>>,
    run_active: Arc<AtomicBool>,
}

impl RunOrchestrator {
    /// Создать новый оркестратор
    pub fn new(client: Arc<dyn OptimizeApi>, settings: RunSettings) -> Self {
        Self {
            client,
            settings,
            state: Arc::new(RwLock::new(RunState::new())),
            run_active: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn settings(&self) -> &RunSettings {
        &self.settings
    }

    /// Parse and check raw input before anything is sent over the wire
    pub fn validate(&self, input: &SimulationInput) -> Result<SimulationConfig, OrchestratorError> {
        let amount: f64 = input.amount.trim().parse().map_err(|_| {
            OrchestratorError::Validation(format!("amount is not a number: {:?}", input.amount))
        })?;
        if !amount.is_finite() {
            return Err(OrchestratorError::Validation(format!(
                "amount must be finite: {:?}",
                input.amount
            )));
        }

        let runs: u32 = input.runs.trim().parse().map_err(|_| {
            OrchestratorError::Validation(format!("runs is not a whole number: {:?}", input.runs))
        })?;

        Ok(SimulationConfig {
            amount,
            runs,
            custom_logic: input.custom_logic.clone(),
            use_live: input.use_live,
        })
    }

    /// Запустить новую симуляцию
    ///
    /// Rejects when another run is active. On success the exposed state is
    /// reset and the returned handle drives the steps lazily; nothing has
    /// been sent to the optimizer yet.
    pub async fn run_simulation(
        &self,
        input: &SimulationInput,
    ) -> Result<SimulationRun, OrchestratorError> {
        let config = self.validate(input)?;

        if self
            .run_active
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(OrchestratorError::RunInProgress);
        }

        let run_id = generate_id();
        {
            let mut state = self.state.write().await;
            *state = RunState::begin(run_id.clone(), config.runs);
        }

        info!("🚀 Starting run {} ({} steps)", run_id, config.runs);

        Ok(SimulationRun {
            client: Arc::clone(&self.client),
            settings: self.settings.clone(),
            config,
            state: Arc::clone(&self.state),
            guard: RunGuard {
                flag: Arc::clone(&self.run_active),
                released: false,
            },
            next_step: 1,
            finished: false,
        })
    }

    pub fn is_running(&self) -> bool {
        self.run_active.load(Ordering::SeqCst)
    }

    /// Получить текущее состояние запуска
    pub async fn state(&self) -> RunState {
        self.state.read().await.clone()
    }

    pub async fn current_snapshot(&self) -> Option<RunSnapshot> {
        self.state.read().await.current.clone()
    }

    pub async fn history(&self) -> RunHistory {
        self.state.read().await.history.clone()
    }

    /// Leaderboard over the current snapshot and accumulated history
    pub async fn leaderboard(&self) -> Vec<LeaderboardEntry> {
        let state = self.state.read().await;
        match &state.current {
            Some(snapshot) => analytics::leaderboard(snapshot, &state.history),
            None => Vec::new(),
        }
    }

    /// Pool flow graph for the current snapshot
    pub async fn pool_graph(&self) -> Option<PoolGraph> {
        let state = self.state.read().await;
        state
            .current
            .as_ref()
            .map(|snapshot| derive_graph(snapshot, &self.settings.to_token))
    }
}

/// Releases the single-run slot, at the latest when the handle is dropped
struct RunGuard {
    flag: Arc<AtomicBool>,
    released: bool,
}

impl RunGuard {
    // Releases at most once; a stale handle must not clear a slot that a
    // newer run now owns.
    fn release(&mut self) {
        if !self.released {
            self.released = true;
            self.flag.store(false, Ordering::SeqCst);
        }
    }
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        self.release();
    }
}

/// Handle to one in-flight run, yielding snapshots step by step.
///
/// Steps are issued strictly one after another. Dropping the handle
/// abandons the in-flight request and frees the run slot; a step that did
/// not complete never touches the shared state.
pub struct SimulationRun {
    client: Arc<dyn OptimizeApi>,
    settings: RunSettings,
    config: SimulationConfig,
    state: Arc<RwLock<RunState>>,
    guard: RunGuard,
    next_step: u32,
    finished: bool,
}

impl SimulationRun {
    pub fn planned_steps(&self) -> u32 {
        self.config.runs
    }

    /// Drive the next step. None once the run is over.
    ///
    /// The inter-step delay runs before every step but the first, so the
    /// final snapshot is yielded without a trailing pause.
    pub async fn next_step(&mut self) -> Option<Result<RunSnapshot, OrchestratorError>> {
        if self.finished {
            return None;
        }
        if self.next_step > self.config.runs {
            // runs == 0: exhausted before the first step
            self.finish(false).await;
            return None;
        }

        let step = self.next_step;

        if step > 1 && !self.settings.step_delay.is_zero() {
            tokio::time::sleep(self.settings.step_delay).await;
        }

        let request = SimulationRequest {
            from_token: self.settings.from_token.clone(),
            to_token: self.settings.to_token.clone(),
            amount: self.config.amount,
            max_slippage: self.settings.max_slippage,
            simulation_step: step,
            custom_logic: self.config.custom_logic.clone(),
            use_live: self.config.use_live,
        };

        match self.client.submit(&request).await {
            Ok(snapshot) => {
                self.next_step += 1;
                {
                    let mut state = self.state.write().await;
                    state.history.push(snapshot.last_run.clone());
                    state.completed_steps = step;
                    state.current = Some(snapshot.clone());
                }
                if step == self.config.runs {
                    self.finish(false).await;
                }
                Some(Ok(snapshot))
            }
            Err(e) => {
                error!("❌ Run step {} failed: {}", step, e);
                self.finish(true).await;
                Some(Err(e.into()))
            }
        }
    }

    /// Adapt the run into a stream of step results
    pub fn into_stream(self) -> impl Stream<Item = Result<RunSnapshot, OrchestratorError>> {
        stream::unfold(self, |mut run| async move {
            run.next_step().await.map(|item| (item, run))
        })
    }

    // State is sealed before the run slot opens up, so a new run can
    // never observe a half-written outcome.
    async fn finish(&mut self, failed: bool) {
        self.finished = true;
        {
            let mut state = self.state.write().await;
            state.failed = failed;
            if state.finished_at.is_none() {
                state.finished_at = Some(Utc::now());
            }
        }
        self.guard.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;
    use std::time::Instant;
    use tokio_stream::StreamExt;

    fn step_body(step: u32, btc: f64) -> serde_json::Value {
        json!({
            "last_run": {
                "naiveSolver": {
                    "solver": "naiveSolver",
                    "btc_received": btc,
                    "gas_cost": 0.002,
                    "solver_profit": btc - 1.0,
                    "latency_ms": 18.0
                }
            },
            "pool_usage": {"UniswapV3": step as f64},
            "pools": null,
            "win_rate": {"naiveSolver": 100.0},
            "win_streaks": {"naiveSolver": step},
            "history": [[]]
        })
    }

    fn mock_step(server: &MockServer, step: u32, btc: f64) -> httpmock::Mock<'_> {
        server.mock(|when, then| {
            when.method(POST)
                .path("/optimize")
                .json_body_partial(format!(r#"{{"simulations": {}}}"#, step));
            then.status(200).json_body(step_body(step, btc));
        })
    }

    fn orchestrator_for(server: &MockServer) -> RunOrchestrator {
        let client = crate::infrastructure::optimizer::OptimizerClient::new(server.base_url());
        RunOrchestrator::new(
            Arc::new(client),
            RunSettings {
                step_delay: Duration::ZERO,
                ..RunSettings::default()
            },
        )
    }

    fn input(amount: &str, runs: &str) -> SimulationInput {
        SimulationInput {
            amount: amount.to_string(),
            runs: runs.to_string(),
            custom_logic: String::new(),
            use_live: false,
        }
    }

    #[tokio::test]
    async fn test_full_run_accumulates_history_in_step_order() {
        let server = MockServer::start();
        let m1 = mock_step(&server, 1, 1.1);
        let m2 = mock_step(&server, 2, 1.2);
        let m3 = mock_step(&server, 3, 1.3);

        let orchestrator = orchestrator_for(&server);
        let mut run = orchestrator.run_simulation(&input("100", "3")).await.unwrap();

        let mut yielded = Vec::new();
        while let Some(item) = run.next_step().await {
            yielded.push(item.unwrap());
        }

        m1.assert();
        m2.assert();
        m3.assert();
        assert_eq!(yielded.len(), 3);

        let state = orchestrator.state().await;
        assert_eq!(state.history.len(), 3);
        assert_eq!(state.completed_steps, 3);
        assert!(!state.failed);
        assert!(state.finished_at.is_some());

        // i-th history entry carries the i-th step's results
        for (i, step) in state.history.iter().enumerate() {
            let expected = 1.1 + 0.1 * i as f64;
            assert!((step["naiveSolver"].btc_received - expected).abs() < 1e-9);
        }

        let current = state.current.unwrap();
        assert_eq!(current.win_streaks["naiveSolver"], 3);
    }

    #[tokio::test]
    async fn test_failure_keeps_partial_history_and_stops() {
        let server = MockServer::start();
        let m1 = mock_step(&server, 1, 1.1);
        let m2 = mock_step(&server, 2, 1.2);
        let m3 = server.mock(|when, then| {
            when.method(POST)
                .path("/optimize")
                .json_body_partial(r#"{"simulations": 3}"#);
            then.status(500);
        });

        let orchestrator = orchestrator_for(&server);
        let mut run = orchestrator.run_simulation(&input("100", "5")).await.unwrap();

        assert!(run.next_step().await.unwrap().is_ok());
        assert!(run.next_step().await.unwrap().is_ok());
        let failed = run.next_step().await.unwrap();
        assert!(matches!(failed, Err(OrchestratorError::Optimizer(_))));
        assert!(run.next_step().await.is_none());

        m1.assert();
        m2.assert();
        m3.assert();

        let state = orchestrator.state().await;
        assert_eq!(state.history.len(), 2);
        assert_eq!(state.completed_steps, 2);
        assert!(state.failed);
        // the failed step never became the current snapshot
        assert_eq!(state.current.unwrap().win_streaks["naiveSolver"], 2);
    }

    #[tokio::test]
    async fn test_concurrent_run_is_rejected() {
        let server = MockServer::start();
        mock_step(&server, 1, 1.0);

        let orchestrator = orchestrator_for(&server);
        let mut run = orchestrator.run_simulation(&input("100", "2")).await.unwrap();
        assert!(run.next_step().await.unwrap().is_ok());

        let second = orchestrator.run_simulation(&input("100", "2")).await;
        assert!(matches!(second, Err(OrchestratorError::RunInProgress)));
        assert!(orchestrator.is_running());

        drop(run);
        assert!(!orchestrator.is_running());
        assert!(orchestrator.run_simulation(&input("100", "2")).await.is_ok());
    }

    #[tokio::test]
    async fn test_run_slot_frees_after_final_step() {
        let server = MockServer::start();
        mock_step(&server, 1, 1.0);

        let orchestrator = orchestrator_for(&server);
        let mut run = orchestrator.run_simulation(&input("100", "1")).await.unwrap();
        assert!(run.next_step().await.unwrap().is_ok());

        // slot opens as soon as the outcome is decided, the handle may
        // still be alive
        assert!(!orchestrator.is_running());
        assert!(orchestrator.run_simulation(&input("100", "1")).await.is_ok());
    }

    #[tokio::test]
    async fn test_stale_handle_drop_keeps_new_run_slot() {
        let server = MockServer::start();
        mock_step(&server, 1, 1.0);

        let orchestrator = orchestrator_for(&server);
        let mut finished = orchestrator.run_simulation(&input("100", "1")).await.unwrap();
        finished.next_step().await.unwrap().unwrap();

        let active = orchestrator.run_simulation(&input("100", "1")).await.unwrap();
        drop(finished);
        assert!(orchestrator.is_running());

        drop(active);
        assert!(!orchestrator.is_running());
    }

    #[tokio::test]
    async fn test_validation_rejects_before_any_request() {
        let server = MockServer::start();
        let m = mock_step(&server, 1, 1.0);
        let orchestrator = orchestrator_for(&server);

        for bad in [
            input("abc", "3"),
            input("NaN", "3"),
            input("inf", "3"),
            input("", "3"),
            input("100", "ten"),
            input("100", "2.5"),
            input("100", "-1"),
        ] {
            let err = orchestrator.run_simulation(&bad).await.err();
            assert!(
                matches!(err, Some(OrchestratorError::Validation(_))),
                "{:?}",
                bad
            );
        }

        assert_eq!(m.hits(), 0);
        assert!(!orchestrator.is_running());
    }

    #[tokio::test]
    async fn test_zero_runs_is_a_noop() {
        let server = MockServer::start();
        let m = mock_step(&server, 1, 1.0);

        let orchestrator = orchestrator_for(&server);
        let mut run = orchestrator.run_simulation(&input("100", "0")).await.unwrap();
        assert!(run.next_step().await.is_none());

        assert_eq!(m.hits(), 0);
        let state = orchestrator.state().await;
        assert!(state.history.is_empty());
        assert_eq!(state.completed_steps, 0);
        assert!(!state.failed);
        assert!(!orchestrator.is_running());
    }

    #[tokio::test]
    async fn test_new_run_resets_state() {
        let server = MockServer::start();
        mock_step(&server, 1, 1.1);
        mock_step(&server, 2, 1.2);

        let orchestrator = orchestrator_for(&server);
        let mut run = orchestrator.run_simulation(&input("100", "2")).await.unwrap();
        while let Some(item) = run.next_step().await {
            item.unwrap();
        }
        let first = orchestrator.state().await;
        assert_eq!(first.history.len(), 2);

        let _run2 = orchestrator.run_simulation(&input("100", "2")).await.unwrap();
        let second = orchestrator.state().await;
        assert!(second.history.is_empty());
        assert_eq!(second.completed_steps, 0);
        assert!(second.current.is_none());
        assert_ne!(first.run_id, second.run_id);
    }

    #[tokio::test]
    async fn test_delay_runs_between_steps_only() {
        let server = MockServer::start();
        mock_step(&server, 1, 1.0);
        mock_step(&server, 2, 1.0);
        mock_step(&server, 3, 1.0);

        let client = crate::infrastructure::optimizer::OptimizerClient::new(server.base_url());
        let orchestrator = RunOrchestrator::new(
            Arc::new(client),
            RunSettings {
                step_delay: Duration::from_millis(50),
                ..RunSettings::default()
            },
        );

        let mut run = orchestrator.run_simulation(&input("100", "3")).await.unwrap();
        let started = Instant::now();
        while let Some(item) = run.next_step().await {
            item.unwrap();
        }

        // two gaps for three steps
        assert!(started.elapsed() >= Duration::from_millis(100));
    }

    #[tokio::test]
    async fn test_stream_adapter_yields_every_step() {
        let server = MockServer::start();
        mock_step(&server, 1, 1.1);
        mock_step(&server, 2, 1.2);

        let orchestrator = orchestrator_for(&server);
        let run = orchestrator.run_simulation(&input("100", "2")).await.unwrap();

        let mut stream = Box::pin(run.into_stream());
        let mut count = 0;
        while let Some(item) = stream.next().await {
            item.unwrap();
            count += 1;
        }

        assert_eq!(count, 2);
        assert_eq!(orchestrator.history().await.len(), 2);
    }

    #[tokio::test]
    async fn test_leaderboard_and_graph_accessors() {
        let server = MockServer::start();
        mock_step(&server, 1, 1.4);

        let orchestrator = orchestrator_for(&server);
        assert!(orchestrator.leaderboard().await.is_empty());
        assert!(orchestrator.pool_graph().await.is_none());

        let mut run = orchestrator.run_simulation(&input("100", "1")).await.unwrap();
        run.next_step().await.unwrap().unwrap();

        let board = orchestrator.leaderboard().await;
        assert_eq!(board.len(), 1);
        assert_eq!(board[0].solver, "naiveSolver");
        assert_eq!(board[0].rank, 1);
        assert!((board[0].avg_profit.unwrap() - 0.4).abs() < 1e-9);

        let graph = orchestrator.pool_graph().await.unwrap();
        assert_eq!(graph.nodes[0].id, "BTC");
        assert_eq!(graph.links.len(), 1);
    }

    #[test]
    fn test_settings_from_config_defaults() {
        let defaults = SimulationDefaults::default();
        let settings = RunSettings::from(&defaults);
        assert_eq!(settings.from_token, "ETH");
        assert_eq!(settings.to_token, "BTC");
        assert_eq!(settings.step_delay, Duration::from_millis(250));
    }
}
