use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{info, warn};

use super::OptimizeApi;
use crate::shared::errors::OptimizerError;
use crate::shared::types::{RunSnapshot, SimulationRequest};

/// HTTP клиент optimizer-сервиса
pub struct OptimizerClient {
    http_client: Client,
    base_url: String,
}

impl OptimizerClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Build a client with a request timeout
    pub fn with_timeout(
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, OptimizerError> {
        let http_client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            base_url: base_url.into(),
        })
    }

    fn optimize_url(&self) -> String {
        format!("{}/optimize", self.base_url)
    }
}

#[async_trait]
impl OptimizeApi for OptimizerClient {
    async fn submit(&self, request: &SimulationRequest) -> Result<RunSnapshot, OptimizerError> {
        let url = self.optimize_url();

        info!(
            "🔍 Submitting simulation step {} to {}",
            request.simulation_step, url
        );

        let response = self.http_client.post(&url).json(request).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(OptimizerError::Protocol(format!(
                "optimizer returned status {}",
                status
            )));
        }

        // Decode in two phases so a malformed body is a protocol error,
        // not a transport one
        let body = response.text().await?;
        let snapshot: RunSnapshot = serde_json::from_str(&body)
            .map_err(|e| OptimizerError::Protocol(format!("undecodable snapshot: {}", e)))?;

        info!(
            "✅ Step {} complete, {} solvers in last run",
            request.simulation_step,
            snapshot.last_run.len()
        );

        Ok(snapshot)
    }

    async fn is_available(&self) -> bool {
        // GET on a POST-only endpoint: 405 still proves the service is up
        match self.http_client.get(&self.optimize_url()).send().await {
            Ok(response) => {
                let status = response.status();
                let available = status.is_success() || status.as_u16() == 405;
                if available {
                    info!("✅ Optimizer API is available");
                } else {
                    warn!("⚠️ Optimizer API returned status: {}", status);
                }
                available
            }
            Err(e) => {
                warn!("⚠️ Optimizer API is not available: {}", e);
                false
            }
        }
    }
}
