pub mod optimizer_client;

use async_trait::async_trait;

use crate::shared::errors::OptimizerError;
use crate::shared::types::{RunSnapshot, SimulationRequest};

pub use optimizer_client::OptimizerClient;

/// Базовый trait для клиентов optimizer-сервиса
#[async_trait]
pub trait OptimizeApi: Send + Sync {
    /// Отправить один шаг симуляции и получить снапшот
    async fn submit(&self, request: &SimulationRequest) -> Result<RunSnapshot, OptimizerError>;

    /// Проверить доступность API
    async fn is_available(&self) -> bool;
}
