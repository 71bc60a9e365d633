//! Outcome reporting for a reconciliation pass

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::*;

/// Successful result of processing one eligible row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RowOutcome {
    /// The acting user does not own the item yet; the row stays pending
    AwaitingOwnership,
    /// Parent is valid, the item was left in place
    Accepted,
    /// The item was moved into the fallback folder
    Relocated { folder_id: String },
}

impl RowOutcome {
    /// Status to write back, or `None` when the row stays pending
    pub fn status(&self) -> Option<TransferStatus> {
        match self {
            RowOutcome::AwaitingOwnership => None,
            RowOutcome::Accepted => Some(TransferStatus::Accepted),
            RowOutcome::Relocated { .. } => Some(TransferStatus::MovedToDefault),
        }
    }
}

/// A row-scoped error recorded during a pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowFailure {
    pub row_index: usize,
    pub item_id: String,
    pub message: String,
}

/// Summary of one pass over the ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationReport {
    pub run_id: Uuid,
    pub kind: ItemKind,
    pub acting_user: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    /// Rows read from the ledger
    pub rows_examined: usize,
    /// Rows filtered out before any fetch
    pub rows_skipped: usize,
    pub accepted: Vec<String>,
    pub relocated: Vec<String>,
    pub awaiting_ownership: Vec<String>,
    pub failures: Vec<RowFailure>,
}

impl ReconciliationReport {
    pub fn new(kind: ItemKind, acting_user: &str) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            kind,
            acting_user: acting_user.to_string(),
            started_at: Utc::now(),
            finished_at: None,
            rows_examined: 0,
            rows_skipped: 0,
            accepted: Vec::new(),
            relocated: Vec::new(),
            awaiting_ownership: Vec::new(),
            failures: Vec::new(),
        }
    }

    /// Record a row whose outcome was applied to the ledger
    pub fn record(&mut self, item_id: &str, outcome: &RowOutcome) {
        let bucket = match outcome {
            RowOutcome::AwaitingOwnership => &mut self.awaiting_ownership,
            RowOutcome::Accepted => &mut self.accepted,
            RowOutcome::Relocated { .. } => &mut self.relocated,
        };
        bucket.push(item_id.to_string());
    }

    pub fn record_failure(&mut self, row: &LedgerRow, error: &TransferError) {
        self.failures.push(RowFailure {
            row_index: row.row_index,
            item_id: row.id.clone(),
            message: error.to_string(),
        });
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Rows that reached a terminal state in this pass
    pub fn resolved_count(&self) -> usize {
        self.accepted.len() + self.relocated.len()
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_status_mapping() {
        assert_eq!(RowOutcome::AwaitingOwnership.status(), None);
        assert_eq!(RowOutcome::Accepted.status(), Some(TransferStatus::Accepted));
        assert_eq!(
            RowOutcome::Relocated {
                folder_id: "f".to_string()
            }
            .status(),
            Some(TransferStatus::MovedToDefault)
        );
    }

    #[test]
    fn test_report_counts_and_serializes() {
        let mut report = ReconciliationReport::new(ItemKind::File, "me@example.com");
        report.record("a", &RowOutcome::Accepted);
        report.record(
            "b",
            &RowOutcome::Relocated {
                folder_id: "fallback".to_string(),
            },
        );
        report.record("c", &RowOutcome::AwaitingOwnership);
        report.finish();

        assert_eq!(report.resolved_count(), 2);
        assert_eq!(report.awaiting_ownership, vec!["c".to_string()]);
        assert!(!report.has_failures());
        assert!(report.finished_at.is_some());

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["kind"], "File");
        assert_eq!(json["accepted"][0], "a");
    }
}
