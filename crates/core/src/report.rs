//! Run-level outcome report.
//!
//! Per-node errors never escape a run; they are folded into an
//! [`ImportReport`] alongside the counts.

use serde::Serialize;
use uuid::Uuid;

use crate::document::RawNode;
use crate::error::CoreError;
use crate::node_kind::NodeKind;
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Node stage
// ---------------------------------------------------------------------------

/// Stage a node failed in. Filtering never fails: rejected nodes are skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeStage {
    Mapped,
    AssociationsResolved,
    ContentRewritten,
    Persisted,
}

impl NodeStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mapped => "mapped",
            Self::AssociationsResolved => "associations_resolved",
            Self::ContentRewritten => "content_rewritten",
            Self::Persisted => "persisted",
        }
    }
}

impl std::fmt::Display for NodeStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Node action
// ---------------------------------------------------------------------------

/// What happened to a node that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeAction {
    /// Persisted as a new record.
    Imported,
    /// Standalone term added to the run's pool.
    Registered,
    /// Excluded by the validity filter or unsupported.
    Skipped,
    /// Already present in the store from an earlier run.
    Duplicate,
}

impl NodeAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Imported => "imported",
            Self::Registered => "registered",
            Self::Skipped => "skipped",
            Self::Duplicate => "duplicate",
        }
    }
}

impl std::fmt::Display for NodeAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Failures and report
// ---------------------------------------------------------------------------

/// One node that failed, with enough context to find it in the source.
#[derive(Debug, Clone, Serialize)]
pub struct NodeFailure {
    pub source_id: String,
    pub node_kind: NodeKind,
    pub stage: NodeStage,
    pub error_kind: &'static str,
    pub reason: String,
}

impl NodeFailure {
    pub fn new(node: &RawNode, node_kind: NodeKind, stage: NodeStage, error: &CoreError) -> Self {
        Self {
            source_id: node.source_id(),
            node_kind,
            stage,
            error_kind: error.kind(),
            reason: error.to_string(),
        }
    }
}

/// Overall outcome of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Running,
    Completed,
    Partial,
}

/// Counts and failure reasons for one import run.
#[derive(Debug, Clone, Serialize)]
pub struct ImportReport {
    pub run_id: Uuid,
    pub status: RunStatus,
    pub started_at: Timestamp,
    pub finished_at: Option<Timestamp>,
    pub seen: usize,
    pub registered: usize,
    pub skipped: usize,
    pub duplicates: usize,
    pub imported: usize,
    pub failed: usize,
    pub failures: Vec<NodeFailure>,
    pub warnings: Vec<String>,
}

impl Default for ImportReport {
    fn default() -> Self {
        Self::new()
    }
}

impl ImportReport {
    pub fn new() -> Self {
        Self {
            run_id: Uuid::now_v7(),
            status: RunStatus::Running,
            started_at: chrono::Utc::now(),
            finished_at: None,
            seen: 0,
            registered: 0,
            skipped: 0,
            duplicates: 0,
            imported: 0,
            failed: 0,
            failures: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn record(&mut self, action: NodeAction) {
        match action {
            NodeAction::Imported => self.imported += 1,
            NodeAction::Registered => self.registered += 1,
            NodeAction::Skipped => self.skipped += 1,
            NodeAction::Duplicate => self.duplicates += 1,
        }
    }

    pub fn record_failure(&mut self, failure: NodeFailure) {
        self.failed += 1;
        self.failures.push(failure);
    }

    /// Close the report; a run with any failed node is `Partial`.
    pub fn finish(&mut self) {
        self.finished_at = Some(chrono::Utc::now());
        self.status = if self.failed == 0 {
            RunStatus::Completed
        } else {
            RunStatus::Partial
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MappingError;

    #[test]
    fn counts_by_action() {
        let mut report = ImportReport::new();
        report.record(NodeAction::Imported);
        report.record(NodeAction::Imported);
        report.record(NodeAction::Skipped);
        report.record(NodeAction::Registered);
        report.record(NodeAction::Duplicate);
        assert_eq!(report.imported, 2);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.registered, 1);
        assert_eq!(report.duplicates, 1);
    }

    #[test]
    fn failure_makes_run_partial() {
        let mut report = ImportReport::new();
        let node = RawNode::new("item").with_field("id", "5");
        let err = CoreError::from(MappingError::UnknownStatus("pending".to_string()));
        report.record_failure(NodeFailure::new(&node, NodeKind::Post, NodeStage::Mapped, &err));
        report.finish();

        assert_eq!(report.status, RunStatus::Partial);
        assert_eq!(report.failed, 1);
        assert_eq!(report.failures[0].source_id, "item#5");
        assert_eq!(report.failures[0].error_kind, "mapping");
        assert!(report.finished_at.is_some());
    }

    #[test]
    fn clean_run_is_completed() {
        let mut report = ImportReport::new();
        report.finish();
        assert_eq!(report.status, RunStatus::Completed);
    }

    #[test]
    fn stage_names() {
        assert_eq!(NodeStage::AssociationsResolved.to_string(), "associations_resolved");
        assert_eq!(NodeAction::Duplicate.to_string(), "duplicate");
    }

    #[test]
    fn report_serializes() {
        let report = ImportReport::new();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["status"], "running");
        assert_eq!(json["seen"], 0);
    }
}
