// Copyright 2025 Cowboy AI, LLC.

//! Reconciliation engine boundary
//!
//! The topology builder performs no provisioning itself. An external engine
//! diffs the declared descriptors against live cloud state, issues the
//! create/update/delete calls, and resolves the pending outputs. This module
//! only defines that seam.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::TopologyResult;
use crate::topology::Topology;

/// Summary of one reconciliation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplyReport {
    /// Identity of this run
    pub run_id: Uuid,
    /// When the engine started applying
    pub started_at: DateTime<Utc>,
    /// When the engine finished
    pub finished_at: DateTime<Utc>,
    /// Resources created during this run
    pub created: usize,
    /// Resources updated in place
    pub updated: usize,
    /// Resources left untouched
    pub unchanged: usize,
}

impl ApplyReport {
    /// Total number of resources the engine considered
    pub fn total(&self) -> usize {
        self.created + self.updated + self.unchanged
    }
}

/// External system that reconciles declared state against live state
///
/// Implementations are expected to call
/// [`Topology::resolve_output`](crate::topology::Topology::resolve_output)
/// for every key in
/// [`Topology::pending_outputs`](crate::topology::Topology::pending_outputs)
/// before returning.
#[async_trait]
pub trait ReconciliationEngine: Send + Sync {
    /// Apply the topology, resolving its deferred outputs
    async fn apply(&self, topology: &Topology) -> TopologyResult<ApplyReport>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_total() {
        let now = Utc::now();
        let report = ApplyReport {
            run_id: Uuid::now_v7(),
            started_at: now,
            finished_at: now,
            created: 8,
            updated: 1,
            unchanged: 1,
        };
        assert_eq!(report.total(), 10);
    }

    #[test]
    fn test_report_serializes() {
        let now = Utc::now();
        let report = ApplyReport {
            run_id: Uuid::now_v7(),
            started_at: now,
            finished_at: now,
            created: 1,
            updated: 0,
            unchanged: 0,
        };

        let json = serde_json::to_string(&report).unwrap();
        let back: ApplyReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back, report);
    }
}
