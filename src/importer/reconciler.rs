// ==========================================
// Catalog import - assignment reconciler
// ==========================================
// Stage 4: a pure function from (desired, current) to a plan. The import
// file is the source of truth for a product's warehouse set: anything
// assigned in the store but absent from the file is classified Remove.
// No store access happens here; the commit controller applies the plan.
// ==========================================

use crate::domain::plan::{DiffAction, ProductAction, ReconciliationPlan, WarehouseDiff};
use crate::domain::product::{
    ReferenceSnapshot, StoredAssignment, WarehouseAssignmentInput,
};
use std::collections::BTreeMap;

// Diff entries are keyed by warehouse id when resolved, by normalized name
// otherwise. The Ord derive gives a deterministic plan order: resolved
// warehouses by id first, unresolved names after, alphabetically.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum DiffKey {
    Id(i64),
    Name(String),
}

pub fn reconcile(
    product_action: ProductAction,
    desired: &[WarehouseAssignmentInput],
    current: &[StoredAssignment],
    snapshot: &ReferenceSnapshot,
) -> ReconciliationPlan {
    let mut desired_by_key: BTreeMap<DiffKey, &WarehouseAssignmentInput> = BTreeMap::new();
    for assignment in desired {
        let key = match assignment.warehouse_id {
            Some(id) => DiffKey::Id(id),
            None => DiffKey::Name(assignment.warehouse_name.clone()),
        };
        // A warehouse repeated in one row keeps its first occurrence.
        desired_by_key.entry(key).or_insert(assignment);
    }

    let current_by_key: BTreeMap<DiffKey, &StoredAssignment> = current
        .iter()
        .map(|a| (DiffKey::Id(a.warehouse_id), a))
        .collect();

    let mut keys: Vec<&DiffKey> = desired_by_key.keys().chain(current_by_key.keys()).collect();
    keys.sort();
    keys.dedup();

    let warehouse_diffs = keys
        .into_iter()
        .map(|key| diff_entry(key, &desired_by_key, &current_by_key, snapshot))
        .collect();

    ReconciliationPlan {
        product_action,
        warehouse_diffs,
    }
}

fn diff_entry(
    key: &DiffKey,
    desired: &BTreeMap<DiffKey, &WarehouseAssignmentInput>,
    current: &BTreeMap<DiffKey, &StoredAssignment>,
    snapshot: &ReferenceSnapshot,
) -> WarehouseDiff {
    let want = desired.get(key).copied();
    let have = current.get(key).copied();

    let warehouse_id = match key {
        DiffKey::Id(id) => Some(*id),
        DiffKey::Name(_) => None,
    };
    let warehouse_name = match key {
        DiffKey::Id(id) => snapshot.warehouse_name(*id),
        DiffKey::Name(name) => name.clone(),
    };

    let (action, reason) = match (want, have) {
        (Some(w), Some(h)) => {
            let mut changes = Vec::new();
            if w.quantity != h.quantity {
                changes.push(format!("quantity {} -> {}", h.quantity, w.quantity));
            }
            if w.min_stock != h.min_stock {
                changes.push(format!("min stock {} -> {}", h.min_stock, w.min_stock));
            }
            if w.max_stock != h.max_stock {
                changes.push(format!("max stock {} -> {}", h.max_stock, w.max_stock));
            }
            if changes.is_empty() {
                (DiffAction::NoChange, "unchanged".to_string())
            } else {
                (DiffAction::Update, changes.join(", "))
            }
        }
        (Some(_), None) => (DiffAction::Add, "not assigned in store".to_string()),
        (None, Some(_)) => (DiffAction::Remove, "not present in import".to_string()),
        (None, None) => unreachable!("key always comes from one of the maps"),
    };

    WarehouseDiff {
        warehouse_id,
        warehouse_name,
        action,
        current_quantity: have.map(|h| h.quantity),
        desired_quantity: want.map(|w| w.quantity),
        desired_min_stock: want.map(|w| w.min_stock),
        desired_max_stock: want.map(|w| w.max_stock),
        reason,
    }
}
