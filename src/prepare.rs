//! Readiness gate for the scheduler loop.
//!
//! Before the scheduler may act on cluster state it has to have observed
//! "enough" of it: moving data away from a node whose true load is still
//! unknown is worse than waiting. [`PrepareChecker`] aggregates item
//! reports as they arrive and answers, on every scheduling pass, whether
//! the collected picture is complete enough to act on. The decision is
//! absorbing: once the gate opens it stays open for the life of the
//! instance.

use crate::cluster::{ClusterView, NodeId, ReportedItem};
use log::{info, warn};
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Tunables for the readiness gate, supplied at startup.
#[derive(Debug, Clone, Copy)]
pub struct PrepareConfig {
    /// Elapsed time after which the gate fails open regardless of how few
    /// reports arrived. Availability wins over strict readiness if
    /// collection stalls.
    pub collect_timeout: Duration,
    /// Completeness ratio in `(0, 1]` applied to both the global and the
    /// per-node item counts.
    pub collect_factor: f64,
}

impl Default for PrepareConfig {
    fn default() -> Self {
        Self {
            collect_timeout: Duration::from_secs(5 * 60),
            collect_factor: 0.9,
        }
    }
}

impl PrepareConfig {
    pub fn new(
        collect_timeout: Duration,
        collect_factor: f64,
    ) -> Result<Self, PrepareConfigError> {
        let config = Self {
            collect_timeout,
            collect_factor,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), PrepareConfigError> {
        if !self.collect_factor.is_finite()
            || self.collect_factor <= 0.0
            || self.collect_factor > 1.0
        {
            return Err(PrepareConfigError::FactorOutOfRange(self.collect_factor));
        }
        if self.collect_timeout.is_zero() {
            return Err(PrepareConfigError::ZeroTimeout);
        }
        Ok(())
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum PrepareConfigError {
    #[error("collect factor must lie in (0, 1], got {0}")]
    FactorOutOfRange(f64),
    #[error("collect timeout must be non-zero")]
    ZeroTimeout,
}

#[derive(Debug, Default)]
struct PrepareState {
    per_node: HashMap<NodeId, u64>,
    sum: u64,
    prepared: bool,
}

/// Concurrent, monotonic readiness gate.
///
/// Report-ingestion workers feed it through [`collect`](Self::collect);
/// the scheduler loop queries it through [`check`](Self::check) before
/// each pass. All shared state sits behind one reader-writer lock, so
/// concurrent calls interleave in a linearizable order.
#[derive(Debug)]
pub struct PrepareChecker {
    start: Instant,
    config: PrepareConfig,
    state: RwLock<PrepareState>,
}

impl PrepareChecker {
    pub fn new(config: PrepareConfig) -> Result<Self, PrepareConfigError> {
        config.validate()?;
        Ok(Self {
            start: Instant::now(),
            config,
            state: RwLock::new(PrepareState::default()),
        })
    }

    /// Records one newly observed item.
    ///
    /// The caller invokes this exactly once per distinct item; duplicate
    /// reports are not detected here. Calls commute, so any interleaving
    /// of ingestion workers yields the same totals.
    pub fn collect(&self, item: &impl ReportedItem) {
        let mut state = self.state.write();
        for node in item.replica_nodes() {
            *state.per_node.entry(*node).or_insert(0) += 1;
        }
        state.sum += 1;
    }

    /// Evaluates readiness against the wall clock.
    pub fn check<V: ClusterView>(&self, view: &V) -> bool {
        self.check_at(view, Instant::now())
    }

    /// Evaluates readiness at an injected instant.
    ///
    /// First match wins, and any branch that returns true latches the
    /// `prepared` flag permanently.
    pub fn check_at<V: ClusterView>(&self, view: &V, now: Instant) -> bool {
        let mut state = self.state.write();
        if state.prepared {
            return true;
        }
        let elapsed = now.saturating_duration_since(self.start);
        if elapsed > self.config.collect_timeout {
            warn!(
                "event=prepare_fail_open elapsed_ms={} timeout_ms={} sum={}",
                elapsed.as_millis(),
                self.config.collect_timeout.as_millis(),
                state.sum
            );
            state.prepared = true;
            return true;
        }
        let factor = self.config.collect_factor;
        let not_durable = view.not_durable_item_count();
        let total = view.total_item_count();
        // A mostly-not-yet-durable view means a freshly started control
        // plane; bootstrap handles that elsewhere, so the gate steps aside.
        // The ratio is re-evaluated fresh on every call.
        if not_durable as f64 > total as f64 * factor {
            info!(
                "event=prepare_bootstrap_shortcut not_durable_items={} total_items={}",
                not_durable, total
            );
            state.prepared = true;
            return true;
        }
        // Collected items must cover the configured share of the cluster.
        if total as f64 * factor > state.sum as f64 {
            return false;
        }
        // Each joining/active node must have reported its own share;
        // removed or unreachable nodes never block readiness.
        for node in view.nodes() {
            if !node.participates_in_prepare() {
                continue;
            }
            let collected = state.per_node.get(&node.id).copied().unwrap_or(0);
            if view.node_item_count(node.id) as f64 * factor > collected as f64 {
                return false;
            }
        }
        info!(
            "event=prepare_complete sum={} total_items={} elapsed_ms={}",
            state.sum,
            total,
            elapsed.as_millis()
        );
        state.prepared = true;
        true
    }

    /// Whether the gate has already opened. Cheap enough for health probes.
    pub fn is_prepared(&self) -> bool {
        self.state.read().prepared
    }

    /// Point-in-time progress record for status reporting.
    pub fn progress(&self) -> PrepareProgress {
        let state = self.state.read();
        let mut nodes: Vec<NodePrepareRecord> = state
            .per_node
            .iter()
            .map(|(node, collected)| NodePrepareRecord {
                node: *node,
                collected: *collected,
            })
            .collect();
        nodes.sort_by_key(|record| record.node);
        PrepareProgress {
            prepared: state.prepared,
            sum: state.sum,
            nodes,
        }
    }
}

// Test-support surface, kept off the production API used by the
// scheduler loop.
#[cfg(any(test, feature = "testing"))]
impl PrepareChecker {
    /// Forces the gate open.
    pub fn set_prepared(&self) {
        self.state.write().prepared = true;
    }

    /// Reads the distinct-item counter.
    pub fn sum(&self) -> u64 {
        self.state.read().sum
    }
}

/// Items collected so far for one node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NodePrepareRecord {
    pub node: NodeId,
    pub collected: u64,
}

/// Serializable snapshot of gate progress, sorted by node id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrepareProgress {
    pub prepared: bool,
    pub sum: u64,
    pub nodes: Vec<NodePrepareRecord>,
}
