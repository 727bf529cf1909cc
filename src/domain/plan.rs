// ==========================================
// Catalog import - reconciliation plan model
// ==========================================
// The set of create/update/remove decisions computed for one product and
// its warehouse assignments before any write occurs.
// ==========================================

use serde::{Deserialize, Serialize};

/// What happens to the product row itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProductAction {
    Create,
    Update,
    NoChange,
}

/// Classification of one warehouse assignment in the diff.
///
/// `Remove` is the destructive classification: the assignment exists in the
/// store but not in the import, and will be deleted once confirmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiffAction {
    Add,
    Update,
    Remove,
    NoChange,
}

impl DiffAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiffAction::Add => "add",
            DiffAction::Update => "update",
            DiffAction::Remove => "remove",
            DiffAction::NoChange => "no-change",
        }
    }
}

/// One entry of the assignment diff for a product.
///
/// `warehouse_id` is None only for desired assignments whose name never
/// resolved; those can be classified but not applied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarehouseDiff {
    pub warehouse_id: Option<i64>,
    pub warehouse_name: String,
    pub action: DiffAction,
    pub current_quantity: Option<i64>,
    pub desired_quantity: Option<i64>,
    pub desired_min_stock: Option<i64>,
    pub desired_max_stock: Option<i64>,
    pub reason: String,
}

/// Per-product plan: the product decision plus its assignment diffs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconciliationPlan {
    pub product_action: ProductAction,
    pub warehouse_diffs: Vec<WarehouseDiff>,
}

impl ReconciliationPlan {
    pub fn has_removals(&self) -> bool {
        self.warehouse_diffs
            .iter()
            .any(|d| d.action == DiffAction::Remove)
    }
}
