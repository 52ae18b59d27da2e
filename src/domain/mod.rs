//! Domain layer - core analytics and derivation logic

pub mod analytics;
pub mod graph;
