//! Deterministic in-memory collaborators for tests.

use crate::cluster::{ClusterView, NodeId, NodeStatus, NodeView, ReportedItem};
use std::collections::HashMap;

/// Owned cluster snapshot with fixed counts and statuses.
#[derive(Debug, Clone, Default)]
pub struct FixtureCluster {
    total: u64,
    not_durable: u64,
    nodes: Vec<NodeView>,
    counts: HashMap<NodeId, u64>,
}

impl FixtureCluster {
    pub fn new(total: u64, not_durable: u64) -> Self {
        Self {
            total,
            not_durable,
            ..Self::default()
        }
    }

    pub fn with_node(mut self, id: NodeId, status: NodeStatus, item_count: u64) -> Self {
        self.nodes.push(NodeView::new(id, status));
        self.counts.insert(id, item_count);
        self
    }
}

impl ClusterView for FixtureCluster {
    fn total_item_count(&self) -> u64 {
        self.total
    }

    fn not_durable_item_count(&self) -> u64 {
        self.not_durable
    }

    fn nodes(&self) -> Vec<NodeView> {
        self.nodes.clone()
    }

    fn node_item_count(&self, node: NodeId) -> u64 {
        self.counts.get(&node).copied().unwrap_or(0)
    }
}

/// Reported item with a fixed replica placement.
#[derive(Debug, Clone)]
pub struct FixtureItem {
    replicas: Vec<NodeId>,
}

impl FixtureItem {
    pub fn new(replicas: Vec<NodeId>) -> Self {
        Self { replicas }
    }
}

impl ReportedItem for FixtureItem {
    fn replica_nodes(&self) -> &[NodeId] {
        &self.replicas
    }
}
