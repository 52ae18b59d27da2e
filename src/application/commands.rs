//! CLI commands and handlers
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tokio_stream::StreamExt;
use tracing::{error, info, warn};

use crate::application::orchestrator::{RunOrchestrator, RunSettings};
use crate::application::report::RunReport;
use crate::infrastructure::optimizer::{OptimizeApi, OptimizerClient};
use crate::shared::config::BenchConfig;
use crate::shared::errors::AppError;
use crate::shared::types::{SimulationInput, SimulationRequest};
use crate::shared::utils::{format_amount, format_percent};

#[derive(Parser)]
#[command(name = "solverbench")]
#[command(about = "Token-swap solver benchmark - run orchestration and analytics")]
pub struct Cli {
    /// Path to config file (default: Config.toml if present)
    #[arg(long)]
    pub config: Option<String>,

    /// Optimizer endpoint URL (overrides config)
    #[arg(long)]
    pub endpoint: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Drive a full simulation run against the optimizer
    Run {
        /// Swap amount in the source token
        #[arg(short, long)]
        amount: Option<String>,

        /// Number of steps to drive
        #[arg(short, long)]
        runs: Option<String>,

        /// Strategy expression, forwarded to the optimizer verbatim
        #[arg(long, default_value = "")]
        custom_logic: String,

        /// Use live market data instead of simulated pools
        #[arg(long)]
        use_live: bool,

        /// Print the full JSON report instead of the summary
        #[arg(long)]
        json: bool,
    },

    /// Probe the optimizer endpoint and show the solver set
    Check,
}

pub struct CommandExecutor;

impl CommandExecutor {
    /// Execute the selected command
    pub async fn execute(command: Commands, config: BenchConfig) -> Result<(), AppError> {
        match command {
            Commands::Run {
                amount,
                runs,
                custom_logic,
                use_live,
                json,
            } => Self::execute_run_command(amount, runs, custom_logic, use_live, json, config).await,
            Commands::Check => Self::execute_check_command(config).await,
        }
    }

    /// Execute run command
    async fn execute_run_command(
        amount: Option<String>,
        runs: Option<String>,
        custom_logic: String,
        use_live: bool,
        json: bool,
        config: BenchConfig,
    ) -> Result<(), AppError> {
        let client = Self::build_client(&config)?;
        let settings = RunSettings::from(&config.simulation);
        let target_asset = settings.to_token.clone();
        let orchestrator = RunOrchestrator::new(Arc::new(client), settings);

        let input = SimulationInput {
            amount: amount.unwrap_or_else(|| config.simulation.amount.to_string()),
            runs: runs.unwrap_or_else(|| config.simulation.runs.to_string()),
            custom_logic,
            use_live,
        };

        let run = orchestrator.run_simulation(&input).await?;
        let planned = run.planned_steps();

        info!(
            "🚀 Driving {} optimization steps against {}",
            planned, config.optimizer.endpoint
        );

        let mut run_error = None;
        let mut step = 0u32;
        let mut stream = Box::pin(run.into_stream());
        while let Some(item) = stream.next().await {
            match item {
                Ok(snapshot) => {
                    step += 1;
                    info!(
                        "✅ Step {}/{} complete ({} solvers)",
                        step,
                        planned,
                        snapshot.last_run.len()
                    );
                }
                Err(e) => {
                    error!("❌ Run aborted at step {}: {}", step + 1, e);
                    run_error = Some(e.to_string());
                }
            }
        }

        let state = orchestrator.state().await;
        let mut report = RunReport::from_state(&state, &target_asset);
        if let Some(message) = run_error {
            report = report.with_error(message);
        }

        if json {
            println!("{}", report.to_json()?);
        } else {
            Self::print_summary(&report);
        }

        Ok(())
    }

    /// Execute check command
    async fn execute_check_command(config: BenchConfig) -> Result<(), AppError> {
        info!("🔌 Checking optimizer at {}...", config.optimizer.endpoint);

        let client = Self::build_client(&config)?;
        if !client.is_available().await {
            return Err(AppError::Unknown(format!(
                "optimizer is not reachable at {}",
                config.optimizer.endpoint
            )));
        }

        // One probe step to see which solvers the service runs
        let probe = SimulationRequest {
            from_token: config.simulation.from_token.clone(),
            to_token: config.simulation.to_token.clone(),
            amount: config.simulation.amount,
            max_slippage: config.simulation.max_slippage,
            simulation_step: 1,
            custom_logic: String::new(),
            use_live: false,
        };

        match client.submit(&probe).await {
            Ok(snapshot) => {
                info!("📋 Solvers ({}):", snapshot.last_run.len());
                for (solver, result) in &snapshot.last_run {
                    let rate = snapshot.win_rate.get(solver).copied().unwrap_or(0.0);
                    info!(
                        "   {} (win rate {}, received {})",
                        solver,
                        format_percent(rate),
                        format_amount(result.btc_received)
                    );
                }
            }
            Err(e) => {
                warn!("⚠️ Probe request failed: {}", e);
            }
        }

        Ok(())
    }

    fn build_client(config: &BenchConfig) -> Result<OptimizerClient, AppError> {
        let client = OptimizerClient::with_timeout(
            config.optimizer.endpoint.clone(),
            Duration::from_millis(config.optimizer.timeout_ms),
        )?;
        Ok(client)
    }

    /// Print the human-readable run summary
    fn print_summary(report: &RunReport) {
        info!("📊 Leaderboard:");
        for entry in &report.leaderboard {
            let avg_profit = entry
                .avg_profit
                .map(format_amount)
                .unwrap_or_else(|| "no data".to_string());
            let avg_gas = entry
                .avg_gas
                .map(format_amount)
                .unwrap_or_else(|| "no data".to_string());
            info!(
                "   {}. {} (win rate {}, avg profit {}, avg gas {})",
                entry.rank,
                entry.solver,
                format_percent(entry.win_rate),
                avg_profit,
                avg_gas
            );
        }

        if !report.win_streaks.is_empty() {
            info!("🎯 Win streaks:");
            for streak in &report.win_streaks {
                info!("   {}: {}", streak.solver, streak.streak);
            }
        }

        if !report.pool_usage.is_empty() {
            info!("📈 Pool usage:");
            for bar in &report.pool_usage {
                info!("   {}: {}", bar.pool, bar.usage);
            }
        }

        info!(
            "📊 Steps completed: {}/{}",
            report.completed_steps, report.planned_steps
        );
        info!(
            "   Graph: {} nodes, {} links",
            report.graph.nodes.len(),
            report.graph.links.len()
        );

        if let Some(error) = &report.error {
            error!("❌ Run ended with error: {}", error);
        } else if report.completed_steps == report.planned_steps {
            info!("✅ Run complete");
        }
    }
}
