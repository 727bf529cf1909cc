// ==========================================
// Catalog import - reference resolver
// ==========================================
// Stage 2: attach store ids to the names carried in a record. Matching is
// exact after trim + lower-case on both sides; no fuzzy matching. An
// explicit id in the source always wins over a name. Unresolved warehouse
// names stay id-less and surface later as warnings, never as row errors.
// ==========================================

use crate::domain::product::{ProductImportRecord, ReferenceKind, ReferenceSnapshot};
use tracing::trace;

/// Name normalization shared by every lookup in the pipeline.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

pub struct ReferenceResolver;

impl ReferenceResolver {
    /// Resolve one name against one reference kind.
    pub fn resolve_name(
        &self,
        snapshot: &ReferenceSnapshot,
        kind: ReferenceKind,
        name: &str,
    ) -> Option<i64> {
        let wanted = normalize_name(name);
        if wanted.is_empty() {
            return None;
        }
        snapshot
            .entities(kind)
            .iter()
            .find(|entity| normalize_name(&entity.name) == wanted)
            .map(|entity| entity.id)
    }

    /// Explicit id wins; otherwise fall back to the name lookup.
    fn resolve(
        &self,
        snapshot: &ReferenceSnapshot,
        kind: ReferenceKind,
        explicit_id: Option<i64>,
        name: Option<&str>,
    ) -> Option<i64> {
        explicit_id.or_else(|| {
            name.and_then(|n| self.resolve_name(snapshot, kind, n))
        })
    }

    /// Attach category, supplier, and warehouse ids to a record in place.
    /// Assignments whose warehouse name has no match keep `warehouse_id`
    /// as None.
    pub fn resolve_record(&self, record: &mut ProductImportRecord, snapshot: &ReferenceSnapshot) {
        record.category_id = self.resolve(
            snapshot,
            ReferenceKind::Category,
            record.category_id,
            record.category_name.as_deref(),
        );
        record.supplier_id = self.resolve(
            snapshot,
            ReferenceKind::Supplier,
            record.supplier_id,
            record.supplier_name.as_deref(),
        );

        for assignment in &mut record.warehouse_assignments {
            // A warehouse cell holding a bare positive integer is a direct
            // id; it still has to exist in the snapshot to count.
            if assignment.warehouse_id.is_none() {
                if let Ok(id) = assignment.warehouse_name.trim().parse::<i64>() {
                    if id > 0 && snapshot.warehouses.iter().any(|w| w.id == id) {
                        assignment.warehouse_id = Some(id);
                        assignment.warehouse_name = snapshot.warehouse_name(id);
                    }
                }
            }
            assignment.warehouse_id = self.resolve(
                snapshot,
                ReferenceKind::Warehouse,
                assignment.warehouse_id,
                Some(assignment.warehouse_name.as_str()),
            );
            if assignment.warehouse_id.is_none() {
                trace!(
                    row_number = record.row_number,
                    warehouse = %assignment.warehouse_name,
                    "warehouse name did not resolve"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::product::{ReferenceEntity, WarehouseAssignmentInput};

    fn snapshot() -> ReferenceSnapshot {
        ReferenceSnapshot {
            categories: vec![ReferenceEntity {
                id: 10,
                name: "Herramientas".to_string(),
            }],
            suppliers: vec![ReferenceEntity {
                id: 20,
                name: "ACME Corp".to_string(),
            }],
            warehouses: vec![
                ReferenceEntity {
                    id: 1,
                    name: "Main Warehouse".to_string(),
                },
                ReferenceEntity {
                    id: 2,
                    name: "Annex".to_string(),
                },
            ],
        }
    }

    #[test]
    fn test_name_match_is_case_and_space_insensitive() {
        let snap = snapshot();
        assert_eq!(
            ReferenceResolver.resolve_name(&snap, ReferenceKind::Warehouse, "  MAIN warehouse "),
            Some(1)
        );
        assert_eq!(
            ReferenceResolver.resolve_name(&snap, ReferenceKind::Warehouse, "ghost"),
            None
        );
    }

    #[test]
    fn test_explicit_id_wins_over_name() {
        let snap = snapshot();
        let mut record = ProductImportRecord {
            name: "Widget".to_string(),
            category_id: Some(99),
            category_name: Some("Herramientas".to_string()),
            ..Default::default()
        };
        ReferenceResolver.resolve_record(&mut record, &snap);
        assert_eq!(record.category_id, Some(99));
    }

    #[test]
    fn test_record_resolution_fills_ids_and_leaves_unknowns() {
        let snap = snapshot();
        let mut record = ProductImportRecord {
            name: "Widget".to_string(),
            category_name: Some("herramientas".to_string()),
            supplier_name: Some("acme corp".to_string()),
            warehouse_assignments: vec![
                WarehouseAssignmentInput {
                    warehouse_name: "annex".to_string(),
                    warehouse_id: None,
                    quantity: 3,
                    min_stock: 0,
                    max_stock: 100,
                },
                WarehouseAssignmentInput {
                    warehouse_name: "ghost".to_string(),
                    warehouse_id: None,
                    quantity: 1,
                    min_stock: 0,
                    max_stock: 100,
                },
            ],
            ..Default::default()
        };
        ReferenceResolver.resolve_record(&mut record, &snap);

        assert_eq!(record.category_id, Some(10));
        assert_eq!(record.supplier_id, Some(20));
        assert_eq!(record.warehouse_assignments[0].warehouse_id, Some(2));
        assert_eq!(record.warehouse_assignments[1].warehouse_id, None);
    }

    #[test]
    fn test_numeric_warehouse_cell_is_a_direct_id() {
        let snap = snapshot();
        let mut record = ProductImportRecord {
            name: "Widget".to_string(),
            warehouse_assignments: vec![
                WarehouseAssignmentInput {
                    warehouse_name: "2".to_string(),
                    warehouse_id: None,
                    quantity: 1,
                    min_stock: 0,
                    max_stock: 0,
                },
                // Unknown id stays unresolved.
                WarehouseAssignmentInput {
                    warehouse_name: "99".to_string(),
                    warehouse_id: None,
                    quantity: 1,
                    min_stock: 0,
                    max_stock: 0,
                },
            ],
            ..Default::default()
        };
        ReferenceResolver.resolve_record(&mut record, &snap);

        assert_eq!(record.warehouse_assignments[0].warehouse_id, Some(2));
        assert_eq!(record.warehouse_assignments[0].warehouse_name, "Annex");
        assert_eq!(record.warehouse_assignments[1].warehouse_id, None);
    }
}
