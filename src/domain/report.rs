// ==========================================
// Catalog import - batch result model
// ==========================================
// Accumulated per-row outcomes and running counters for one import batch.
// Created fresh per invocation, returned to the caller, never reused.
// ==========================================

use crate::domain::plan::DiffAction;
use serde::{Deserialize, Serialize};

/// Running counters for one batch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportStats {
    pub total: usize,
    pub created: usize,
    pub updated: usize,
    pub errors: usize,
    pub warehouses_assigned: usize,
    pub warehouses_removed: usize,
}

/// Outcome of applying a single assignment diff.
///
/// Assignment writes are best-effort: a failure is recorded here instead of
/// failing the row, so callers can inspect partial application.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiffOutcome {
    pub warehouse_id: Option<i64>,
    pub warehouse_name: String,
    pub action: DiffAction,
    pub applied: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Outcome of one source row. `row` is 0 for synthetic entries appended at
/// batch end (pending removals, warehouse-not-found warnings).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RowOutcome {
    pub row: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warehouses_assigned: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warehouses_removed: Option<usize>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diffs: Vec<DiffOutcome>,
    /// Source payload serialized as JSON, captured on row failures so the
    /// offending row can be inspected or replayed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_data: Option<String>,
}

/// Result of one import batch.
///
/// `success` is false only when destructive removals are pending without
/// confirmation; individual row errors do not clear it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportReport {
    pub success: bool,
    pub message: String,
    pub stats: ImportStats,
    pub errors: Vec<String>,
    pub details: Vec<RowOutcome>,
    pub batch_id: String,
    pub elapsed_ms: u128,
}

impl ImportReport {
    pub fn new(batch_id: String, total: usize) -> Self {
        Self {
            success: true,
            message: String::new(),
            stats: ImportStats {
                total,
                ..Default::default()
            },
            errors: Vec::new(),
            details: Vec::new(),
            batch_id,
            elapsed_ms: 0,
        }
    }

    /// Record a row-level failure: counted, listed, isolated from other rows.
    pub fn record_row_error(&mut self, row: usize, message: impl Into<String>) {
        self.record_row_failure(row, message, None);
    }

    /// Row failure with the source payload attached for inspection.
    pub fn record_row_failure(
        &mut self,
        row: usize,
        message: impl Into<String>,
        raw_data: Option<String>,
    ) {
        let message = message.into();
        self.errors.push(format!("Row {}: {}", row, message));
        self.stats.errors += 1;
        self.details.push(RowOutcome {
            row,
            error: Some(message),
            raw_data,
            ..Default::default()
        });
    }

    /// Build the final human-readable summary from the counters.
    pub fn finalize_message(&mut self) {
        self.message = format!(
            "Import completed: {} created, {} updated, {} errors, \
             {} warehouse assignments written, {} removed ({} ms)",
            self.stats.created,
            self.stats.updated,
            self.stats.errors,
            self.stats.warehouses_assigned,
            self.stats.warehouses_removed,
            self.elapsed_ms,
        );
    }
}
