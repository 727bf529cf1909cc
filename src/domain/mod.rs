// ==========================================
// Catalog import - domain layer
// ==========================================
// Entities and value types shared by the import pipeline and the store.
// ==========================================

pub mod plan;
pub mod product;
pub mod report;

pub use plan::{DiffAction, ProductAction, ReconciliationPlan, WarehouseDiff};
pub use product::{
    AssignmentChanges, EquipmentInfo, NewAssignment, ProductImportRecord, ProductPayload,
    ProductType, ReferenceEntity, ReferenceKind, ReferenceSnapshot, StoredAssignment,
    StoredProduct, WarehouseAssignmentInput,
};
pub use report::{DiffOutcome, ImportReport, ImportStats, RowOutcome};
