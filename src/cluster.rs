//! Collaborator contracts supplied by the surrounding control plane.
//!
//! The readiness gate never owns cluster state; it reads a point-in-time
//! view of item placement through [`ClusterView`] and learns about freshly
//! observed items through [`ReportedItem`].

use serde::Serialize;

/// Identifier of a node in the cluster membership registry.
pub type NodeId = u64;

/// Membership status of a node as reported by the cluster view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NodeStatus {
    /// The node is joining the cluster and receiving its initial placement.
    Joining,
    /// The node serves traffic and holds item replicas.
    Active,
    /// The node is being drained out of the cluster.
    Removing,
    /// The node is unreachable or already removed.
    Offline,
}

impl NodeStatus {
    pub fn is_joining(&self) -> bool {
        matches!(self, NodeStatus::Joining)
    }

    pub fn is_active(&self) -> bool {
        matches!(self, NodeStatus::Active)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeStatus::Joining => "Joining",
            NodeStatus::Active => "Active",
            NodeStatus::Removing => "Removing",
            NodeStatus::Offline => "Offline",
        }
    }
}

/// Per-node record surfaced by [`ClusterView::nodes`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NodeView {
    pub id: NodeId,
    pub status: NodeStatus,
}

impl NodeView {
    pub fn new(id: NodeId, status: NodeStatus) -> Self {
        Self { id, status }
    }

    /// Nodes outside Joining/Active must never block readiness indefinitely.
    pub fn participates_in_prepare(&self) -> bool {
        self.status.is_joining() || self.status.is_active()
    }
}

/// Read-only snapshot of cluster placement state.
///
/// Implemented by the membership/state registry. All counts refer to the
/// same logical instant; the gate takes them at face value.
pub trait ClusterView {
    /// Total number of items known to the cluster.
    fn total_item_count(&self) -> u64;

    /// Items whose metadata has not yet been loaded from durable storage.
    fn not_durable_item_count(&self) -> u64;

    /// All nodes currently known to the membership registry.
    fn nodes(&self) -> Vec<NodeView>;

    /// Number of items the registry believes reside on `node`.
    fn node_item_count(&self, node: NodeId) -> u64;
}

/// A single item observed by the report-ingestion pipeline.
///
/// The pipeline invokes the gate's update hook exactly once per distinct
/// item; the gate only needs to know which nodes hold a replica.
pub trait ReportedItem {
    fn replica_nodes(&self) -> &[NodeId];
}
