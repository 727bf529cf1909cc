// ==========================================
// Catalog import - commit controller
// ==========================================
// Stage 5: drives one batch end to end. Per row: resolve references, match
// identity, write the product, reconcile assignments, apply the additive
// half of the plan. Removals are destructive and held back until the caller
// confirms them; an unconfirmed batch with pending removals returns a
// gated report instead of deleting anything.
//
// Row isolation: any failure inside a row is recorded on the report and the
// batch moves on. Only an unparseable source or a failed snapshot load
// aborts the whole batch.
// ==========================================

use crate::domain::plan::{DiffAction, ProductAction, WarehouseDiff};
use crate::domain::product::{
    AssignmentChanges, NewAssignment, ProductImportRecord, ProductPayload, ProductType,
    ReferenceKind, ReferenceSnapshot, StoredAssignment,
};
use crate::domain::report::{DiffOutcome, ImportReport, RowOutcome};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::field_mapper::FieldMapper;
use crate::importer::file_parser::{parse_source, SourceFormat};
use crate::importer::matcher::IdentityMatcher;
use crate::importer::reconciler::reconcile;
use crate::importer::resolver::ReferenceResolver;
use crate::repository::catalog_store::{CatalogStore, SkuGenerator};
use crate::repository::error::RepositoryError;
use std::collections::BTreeSet;
use std::path::Path;
use std::str::FromStr;
use std::time::Instant;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// A Remove decision waiting for confirmation. Collected across all rows and
/// either applied in phase two or reported back as pending.
#[derive(Debug, Clone)]
struct PendingRemoval {
    product_id: i64,
    product_name: String,
    warehouse_id: i64,
    warehouse_name: String,
}

pub struct CatalogImporter<S: CatalogStore, G: SkuGenerator> {
    store: S,
    sku_generator: G,
}

impl<S: CatalogStore, G: SkuGenerator> CatalogImporter<S, G> {
    pub fn new(store: S, sku_generator: G) -> Self {
        Self {
            store,
            sku_generator,
        }
    }

    /// Import from a file on disk, detecting the format from the extension.
    pub async fn import_file<P: AsRef<Path>>(
        &self,
        path: P,
        confirm_deletions: bool,
    ) -> ImportResult<ImportReport> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }
        let format = SourceFormat::from_path(path)?;
        let bytes = std::fs::read(path)?;
        self.import_bytes(&bytes, format, confirm_deletions).await
    }

    /// Import from an in-memory source buffer.
    pub async fn import_bytes(
        &self,
        bytes: &[u8],
        format: SourceFormat,
        confirm_deletions: bool,
    ) -> ImportResult<ImportReport> {
        let raw_rows = parse_source(bytes, format)?;
        let records: Vec<ProductImportRecord> = raw_rows
            .iter()
            .enumerate()
            .filter_map(|(index, row)| FieldMapper.map_row(row, index, format))
            .collect();
        self.import_records(records, confirm_deletions).await
    }

    /// Run one batch over already-canonical records.
    #[instrument(skip(self, records), fields(rows = records.len(), confirm_deletions))]
    pub async fn import_records(
        &self,
        records: Vec<ProductImportRecord>,
        confirm_deletions: bool,
    ) -> ImportResult<ImportReport> {
        let start = Instant::now();
        let batch_id = Uuid::new_v4().to_string();
        info!(batch_id = %batch_id, rows = records.len(), "import batch started");

        let snapshot = self.load_snapshot().await?;
        let mut report = ImportReport::new(batch_id.clone(), records.len());
        let mut pending_removals: Vec<PendingRemoval> = Vec::new();
        let mut unresolved_warehouses: BTreeSet<(String, String)> = BTreeSet::new();

        for mut record in records {
            self.process_row(
                &mut record,
                &snapshot,
                &mut report,
                &mut pending_removals,
                &mut unresolved_warehouses,
            )
            .await;
        }

        if !pending_removals.is_empty() && !confirm_deletions {
            return Ok(self.gate_report(report, pending_removals, start));
        }

        // Phase two: confirmed removals, best-effort.
        for removal in pending_removals {
            let outcome = self.apply_removal(&removal).await;
            if outcome.applied {
                report.stats.warehouses_removed += 1;
            } else if let Some(err) = &outcome.error {
                report
                    .errors
                    .push(format!("Removal failed for \"{}\": {}", removal.product_name, err));
            }
            report.details.push(RowOutcome {
                row: 0,
                warehouses_removed: Some(usize::from(outcome.applied)),
                diffs: vec![outcome],
                ..Default::default()
            });
        }

        // Unknown warehouse names are warnings: listed and appended as
        // informational rows, but the batch still counts as successful.
        for (warehouse, product) in unresolved_warehouses {
            let warning = format!(
                "Warehouse \"{}\" not found (product \"{}\"); its assignment was skipped",
                warehouse, product
            );
            report.errors.push(warning.clone());
            report.details.push(RowOutcome {
                row: 0,
                error: Some(warning),
                warehouses_assigned: Some(0),
                ..Default::default()
            });
        }

        report.elapsed_ms = start.elapsed().as_millis();
        report.finalize_message();
        info!(
            batch_id = %batch_id,
            created = report.stats.created,
            updated = report.stats.updated,
            errors = report.stats.errors,
            elapsed_ms = report.elapsed_ms,
            "import batch finished"
        );
        Ok(report)
    }

    // ===== batch setup =====

    async fn load_snapshot(&self) -> ImportResult<ReferenceSnapshot> {
        let load = |kind: ReferenceKind| self.store.find_reference_entities(kind);
        let categories = load(ReferenceKind::Category)
            .await
            .map_err(|e| ImportError::SnapshotLoad(e.to_string()))?;
        let suppliers = load(ReferenceKind::Supplier)
            .await
            .map_err(|e| ImportError::SnapshotLoad(e.to_string()))?;
        let warehouses = load(ReferenceKind::Warehouse)
            .await
            .map_err(|e| ImportError::SnapshotLoad(e.to_string()))?;
        Ok(ReferenceSnapshot {
            categories,
            suppliers,
            warehouses,
        })
    }

    // ===== per-row processing =====

    async fn process_row(
        &self,
        record: &mut ProductImportRecord,
        snapshot: &ReferenceSnapshot,
        report: &mut ImportReport,
        pending_removals: &mut Vec<PendingRemoval>,
        unresolved_warehouses: &mut BTreeSet<(String, String)>,
    ) {
        let row = record.row_number;
        let raw_data = serde_json::to_string(&record).ok();

        if record.name.trim().is_empty() {
            report.record_row_failure(row, "product name is required", raw_data);
            return;
        }
        let product_type = match record.product_type.as_deref() {
            Some(raw) => match ProductType::from_str(raw) {
                Ok(t) => t,
                Err(_) => {
                    report.record_row_failure(
                        row,
                        format!(
                            "invalid product type \"{}\" (valid: {})",
                            raw,
                            ProductType::VALID_VALUES
                        ),
                        raw_data,
                    );
                    return;
                }
            },
            None => {
                report.record_row_failure(
                    row,
                    format!("product type is required (valid: {})", ProductType::VALID_VALUES),
                    raw_data,
                );
                return;
            }
        };

        // Validation passed; only now do names get resolved against the
        // snapshot.
        ReferenceResolver.resolve_record(record, snapshot);
        for assignment in &record.warehouse_assignments {
            if assignment.warehouse_id.is_none() {
                unresolved_warehouses
                    .insert((assignment.warehouse_name.clone(), record.name.clone()));
            }
        }

        let matcher = IdentityMatcher::new(&self.store, &self.sku_generator);
        let outcome = match matcher.match_record(record).await {
            Ok(outcome) => outcome,
            Err(e) => {
                report.record_row_failure(row, format!("identity lookup failed: {}", e), raw_data);
                return;
            }
        };

        let (product_id, action, method) = match outcome.existing {
            Some(existing) => {
                let payload = build_payload(record, product_type, None);
                if let Err(e) = self.store.update_product(existing.id, &payload).await {
                    report.record_row_failure(row, format!("product update failed: {}", e), raw_data);
                    return;
                }
                (existing.id, ProductAction::Update, outcome.method)
            }
            None => {
                let payload = build_payload(record, product_type, outcome.final_sku.clone());
                match self.store.create_product(&payload).await {
                    Ok(id) => (id, ProductAction::Create, None),
                    Err(RepositoryError::UniqueViolation(_)) => {
                        report.record_row_failure(
                            row,
                            format!(
                                "SKU \"{}\" already exists on another product",
                                outcome.final_sku.unwrap_or_default()
                            ),
                            raw_data,
                        );
                        return;
                    }
                    Err(e) => {
                        report.record_row_failure(row, format!("product create failed: {}", e), raw_data);
                        return;
                    }
                }
            }
        };

        let current = match self.store.list_assignments(product_id).await {
            Ok(current) => current,
            Err(e) => {
                report.record_row_failure(row, format!("assignment lookup failed: {}", e), raw_data);
                return;
            }
        };

        let plan = reconcile(action, &record.warehouse_assignments, &current, snapshot);

        let mut diffs: Vec<DiffOutcome> = Vec::new();
        let mut assigned = 0usize;
        for diff in &plan.warehouse_diffs {
            match diff.action {
                DiffAction::Add | DiffAction::Update => {
                    let outcome = self.apply_assignment(product_id, diff, &current).await;
                    if outcome.applied {
                        assigned += 1;
                        report.stats.warehouses_assigned += 1;
                    }
                    diffs.push(outcome);
                }
                DiffAction::Remove => {
                    // warehouse_id is always Some for Remove: the entry came
                    // from a stored assignment.
                    if let Some(warehouse_id) = diff.warehouse_id {
                        pending_removals.push(PendingRemoval {
                            product_id,
                            product_name: record.name.clone(),
                            warehouse_id,
                            warehouse_name: diff.warehouse_name.clone(),
                        });
                    }
                }
                DiffAction::NoChange => {}
            }
        }

        match action {
            ProductAction::Create => report.stats.created += 1,
            ProductAction::Update => report.stats.updated += 1,
            ProductAction::NoChange => {}
        }
        report.details.push(RowOutcome {
            row,
            created: Some(action == ProductAction::Create),
            updated: Some(action == ProductAction::Update),
            method: method.map(|m| m.as_str().to_string()),
            warehouses_assigned: Some(assigned),
            diffs,
            ..Default::default()
        });
    }

    /// Apply one Add or Update diff. An Add re-checks for an existing
    /// assignment at write time, so a row that lost the race turns into an
    /// update instead of a duplicate insert.
    async fn apply_assignment(
        &self,
        product_id: i64,
        diff: &WarehouseDiff,
        current: &[StoredAssignment],
    ) -> DiffOutcome {
        let mut outcome = DiffOutcome {
            warehouse_id: diff.warehouse_id,
            warehouse_name: diff.warehouse_name.clone(),
            action: diff.action,
            applied: false,
            error: None,
        };

        let Some(warehouse_id) = diff.warehouse_id else {
            outcome.error = Some("warehouse not found".to_string());
            return outcome;
        };

        let changes = AssignmentChanges {
            quantity: diff.desired_quantity.unwrap_or(0),
            min_stock: diff.desired_min_stock.unwrap_or(0),
            max_stock: diff.desired_max_stock.unwrap_or(0),
        };

        let result = match diff.action {
            DiffAction::Update => {
                match current.iter().find(|a| a.warehouse_id == warehouse_id) {
                    Some(existing) => self.store.update_assignment(existing.id, &changes).await,
                    None => Err(RepositoryError::NotFound(format!(
                        "assignment for warehouse {}",
                        warehouse_id
                    ))),
                }
            }
            _ => match self.store.find_assignment(product_id, warehouse_id).await {
                Ok(Some(assignment_id)) => {
                    self.store.update_assignment(assignment_id, &changes).await
                }
                Ok(None) => {
                    self.store
                        .create_assignment(&NewAssignment {
                            product_id,
                            warehouse_id,
                            quantity: changes.quantity,
                            min_stock: changes.min_stock,
                            max_stock: changes.max_stock,
                        })
                        .await
                }
                Err(e) => Err(e),
            },
        };

        match result {
            Ok(()) => outcome.applied = true,
            Err(e) => {
                warn!(
                    product_id,
                    warehouse_id,
                    error = %e,
                    "assignment write failed"
                );
                outcome.error = Some(e.to_string());
            }
        }
        outcome
    }

    async fn apply_removal(&self, removal: &PendingRemoval) -> DiffOutcome {
        let mut outcome = DiffOutcome {
            warehouse_id: Some(removal.warehouse_id),
            warehouse_name: removal.warehouse_name.clone(),
            action: DiffAction::Remove,
            applied: false,
            error: None,
        };
        match self
            .store
            .delete_assignment(removal.product_id, removal.warehouse_id)
            .await
        {
            Ok(()) => outcome.applied = true,
            Err(e) => {
                warn!(
                    product_id = removal.product_id,
                    warehouse_id = removal.warehouse_id,
                    error = %e,
                    "assignment removal failed"
                );
                outcome.error = Some(e.to_string());
            }
        }
        outcome
    }

    /// Build the gated report: nothing destructive has happened, the caller
    /// must re-run with confirmation to apply the listed removals.
    fn gate_report(
        &self,
        mut report: ImportReport,
        pending: Vec<PendingRemoval>,
        start: Instant,
    ) -> ImportReport {
        report.success = false;
        report.message = format!(
            "Confirmation required: {} warehouse assignment(s) would be removed. \
             Re-run with deletions confirmed to apply them.",
            pending.len()
        );
        report.errors.push(report.message.clone());
        for removal in pending {
            report.details.push(RowOutcome {
                row: 0,
                warehouses_removed: Some(1),
                error: Some(format!(
                    "Pending removal: \"{}\" from warehouse \"{}\"",
                    removal.product_name, removal.warehouse_name
                )),
                ..Default::default()
            });
        }
        report.elapsed_ms = start.elapsed().as_millis();
        report
    }
}

/// Map a canonical record onto the store write payload. `sku` is carried
/// only on create; an existing product keeps its SKU.
fn build_payload(
    record: &ProductImportRecord,
    product_type: ProductType,
    sku: Option<String>,
) -> ProductPayload {
    ProductPayload {
        sku,
        name: record.name.trim().to_string(),
        product_type,
        description: record.description.clone(),
        brand: record.brand.clone(),
        cost_price: record.cost_price,
        sale_price: record.sale_price,
        vat: record.vat,
        barcode: record.barcode.clone(),
        category_id: record.category_id,
        supplier_id: record.supplier_id,
        equipment: record.equipment.clone(),
    }
}
