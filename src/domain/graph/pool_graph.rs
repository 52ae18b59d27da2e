//! Liquidity routing graph derivation

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::shared::types::{PoolState, RunSnapshot};

/// Color of the destination-asset sink node
pub const SINK_NODE_COLOR: &str = "#f59e0b";

/// Color of liquidity pool nodes
pub const POOL_NODE_COLOR: &str = "#3b82f6";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphLink {
    pub source: String,
    pub target: String,
    pub value: f64,
}

/// Flow graph of pools feeding the destination asset
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PoolGraph {
    pub nodes: Vec<GraphNode>,
    pub links: Vec<GraphLink>,
}

/// Where pool keys and link values come from for one snapshot.
///
/// Resolved once up front: usage counts win over pool metadata whenever
/// the snapshot carries a usage section, even an empty one.
enum PoolValueSource<'a> {
    Usage(&'a IndexMap<String, f64>),
    Liquidity(&'a IndexMap<String, PoolState>),
    Empty,
}

impl<'a> PoolValueSource<'a> {
    fn resolve(snapshot: &'a RunSnapshot) -> Self {
        if let Some(usage) = &snapshot.pool_usage {
            PoolValueSource::Usage(usage)
        } else if let Some(pools) = &snapshot.pools {
            PoolValueSource::Liquidity(pools)
        } else {
            PoolValueSource::Empty
        }
    }
}

/// Derive the pool flow graph from the latest snapshot.
///
/// One sink node for the destination asset plus one node per pool, each
/// pool linked to the sink. Link values are usage counts when available,
/// otherwise reported liquidity, otherwise 1. A value of 0 is a real
/// measurement and flows through unchanged; only a missing liquidity
/// field falls back to 1.
pub fn derive_graph(snapshot: &RunSnapshot, target_asset: &str) -> PoolGraph {
    let mut graph = PoolGraph {
        nodes: vec![GraphNode {
            id: target_asset.to_string(),
            color: SINK_NODE_COLOR.to_string(),
        }],
        links: Vec::new(),
    };

    match PoolValueSource::resolve(snapshot) {
        PoolValueSource::Usage(usage) => {
            for (pool, count) in usage {
                push_pool(&mut graph, pool, target_asset, *count);
            }
        }
        PoolValueSource::Liquidity(pools) => {
            for (pool, state) in pools {
                push_pool(&mut graph, pool, target_asset, state.liquidity.unwrap_or(1.0));
            }
        }
        PoolValueSource::Empty => {}
    }

    graph
}

fn push_pool(graph: &mut PoolGraph, pool: &str, target_asset: &str, value: f64) {
    graph.nodes.push(GraphNode {
        id: pool.to_string(),
        color: POOL_NODE_COLOR.to_string(),
    });
    graph.links.push(GraphLink {
        source: pool.to_string(),
        target: target_asset.to_string(),
        value,
    });
}
