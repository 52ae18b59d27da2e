//! Infrastructure layer - external service clients

pub mod optimizer;

pub use optimizer::{OptimizeApi, OptimizerClient};
