//! Graph domain - pool flow graph for the dashboard

mod pool_graph;

pub use pool_graph::{
    derive_graph, GraphLink, GraphNode, PoolGraph, POOL_NODE_COLOR, SINK_NODE_COLOR,
};
