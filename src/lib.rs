//! Readiness gating for a cluster scheduler control plane.
//!
//! A control plane that has just (re)started sees only a sliver of the
//! cluster's true placement state. Acting on that sliver would let the
//! scheduler make harmful moves, so every scheduling pass first asks the
//! [`PrepareChecker`] whether enough item reports have been collected.
//! The gate combines a global completeness ratio, a per-node completeness
//! ratio, and a time-bounded fail-open fallback, and once it opens it
//! never closes again.

pub mod cluster;
#[cfg(any(test, feature = "testing"))]
pub mod fixtures;
pub mod prepare;

pub use cluster::{ClusterView, NodeId, NodeStatus, NodeView, ReportedItem};
pub use prepare::{
    NodePrepareRecord, PrepareChecker, PrepareConfig, PrepareConfigError, PrepareProgress,
};
