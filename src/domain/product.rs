// ==========================================
// Catalog import - product domain model
// ==========================================
// Canonical import record (parsed from a source row), stored entities
// (owned by the store), and the per-batch reference snapshot.
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ==========================================
// ProductType - fixed product type enumeration
// ==========================================
// Source files carry the localized spellings; both are accepted on parse.
// The canonical wire form is the English upper-case name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProductType {
    Consumable,
    Stockable,
    Inventory,
    Service,
    Bundle,
}

impl ProductType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductType::Consumable => "CONSUMABLE",
            ProductType::Stockable => "STOCKABLE",
            ProductType::Inventory => "INVENTORY",
            ProductType::Service => "SERVICE",
            ProductType::Bundle => "BUNDLE",
        }
    }

    /// Every accepted spelling, for error messages.
    pub const VALID_VALUES: &'static str =
        "CONSUMABLE/CONSUMIBLE, STOCKABLE/ALMACENABLE, INVENTORY/INVENTARIO, \
         SERVICE/SERVICIO, BUNDLE/COMBO";
}

impl FromStr for ProductType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "CONSUMABLE" | "CONSUMIBLE" => Ok(ProductType::Consumable),
            "STOCKABLE" | "ALMACENABLE" => Ok(ProductType::Stockable),
            "INVENTORY" | "INVENTARIO" => Ok(ProductType::Inventory),
            "SERVICE" | "SERVICIO" => Ok(ProductType::Service),
            "BUNDLE" | "COMBO" => Ok(ProductType::Bundle),
            other => Err(format!("unknown product type: {}", other)),
        }
    }
}

impl fmt::Display for ProductType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ==========================================
// WarehouseAssignmentInput - desired assignment from the source file
// ==========================================
// warehouse_name is the join key (trimmed + lower-cased) until resolution
// attaches warehouse_id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WarehouseAssignmentInput {
    pub warehouse_name: String,
    pub warehouse_id: Option<i64>,
    pub quantity: i64,
    pub min_stock: i64,
    pub max_stock: i64,
}

// ==========================================
// EquipmentInfo - opaque pass-through metadata
// ==========================================
// Equipment/maintenance columns are carried as-is; the import core never
// interprets them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EquipmentInfo {
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub purchase_date: Option<String>,
    pub warranty_expiration: Option<String>,
    pub useful_life: Option<f64>,
    pub maintenance_interval: Option<f64>,
    pub last_maintenance: Option<String>,
    pub next_maintenance: Option<String>,
    pub maintenance_cost: Option<f64>,
    pub maintenance_provider: Option<String>,
    pub current_location: Option<String>,
    pub responsible_person: Option<String>,
    pub operational_status: Option<String>,
}

impl EquipmentInfo {
    pub fn is_empty(&self) -> bool {
        self == &EquipmentInfo::default()
    }
}

// ==========================================
// ProductImportRecord - canonical parsed source row
// ==========================================
// Lifetime: import pipeline only. product_type stays raw here; the commit
// controller validates it so an invalid value becomes a row-level error
// instead of a parse failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductImportRecord {
    pub id: Option<i64>,
    pub sku: Option<String>,
    pub name: String,
    pub product_type: Option<String>,
    pub description: Option<String>,
    pub brand: Option<String>,
    pub cost_price: Option<f64>,
    pub sale_price: Option<f64>,
    pub vat: Option<f64>,
    pub barcode: Option<String>,
    pub category_id: Option<i64>,
    pub category_name: Option<String>,
    pub supplier_id: Option<i64>,
    pub supplier_name: Option<String>,
    pub warehouse_assignments: Vec<WarehouseAssignmentInput>,
    pub equipment: EquipmentInfo,

    // Business row number in the source file (header row is row 1).
    pub row_number: usize,
}

// ==========================================
// Stored entities (owned by the store)
// ==========================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredProduct {
    pub id: i64,
    pub sku: Option<String>,
    pub name: String,
    pub product_type: String,
    pub category_id: Option<i64>,
    pub supplier_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredAssignment {
    pub id: i64,
    pub warehouse_id: i64,
    pub quantity: i64,
    pub min_stock: i64,
    pub max_stock: i64,
}

// ==========================================
// Write payloads
// ==========================================

/// Fields written on product create/update. `sku` is set only on create;
/// updates never rewrite an existing SKU.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductPayload {
    pub sku: Option<String>,
    pub name: String,
    pub product_type: ProductType,
    pub description: Option<String>,
    pub brand: Option<String>,
    pub cost_price: Option<f64>,
    pub sale_price: Option<f64>,
    pub vat: Option<f64>,
    pub barcode: Option<String>,
    pub category_id: Option<i64>,
    pub supplier_id: Option<i64>,
    pub equipment: EquipmentInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAssignment {
    pub product_id: i64,
    pub warehouse_id: i64,
    pub quantity: i64,
    pub min_stock: i64,
    pub max_stock: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentChanges {
    pub quantity: i64,
    pub min_stock: i64,
    pub max_stock: i64,
}

// ==========================================
// Reference snapshot
// ==========================================
// Read once per batch, immutable for the batch duration. Resolution is
// case-insensitive, whitespace-insensitive exact match - no edit distance.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    Category,
    Supplier,
    Warehouse,
}

impl ReferenceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReferenceKind::Category => "category",
            ReferenceKind::Supplier => "supplier",
            ReferenceKind::Warehouse => "warehouse",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceEntity {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Default)]
pub struct ReferenceSnapshot {
    pub categories: Vec<ReferenceEntity>,
    pub suppliers: Vec<ReferenceEntity>,
    pub warehouses: Vec<ReferenceEntity>,
}

impl ReferenceSnapshot {
    pub fn entities(&self, kind: ReferenceKind) -> &[ReferenceEntity] {
        match kind {
            ReferenceKind::Category => &self.categories,
            ReferenceKind::Supplier => &self.suppliers,
            ReferenceKind::Warehouse => &self.warehouses,
        }
    }

    /// Display name for a warehouse id, falling back to "ID <n>" when the
    /// snapshot no longer carries it.
    pub fn warehouse_name(&self, warehouse_id: i64) -> String {
        self.warehouses
            .iter()
            .find(|w| w.id == warehouse_id)
            .map(|w| w.name.clone())
            .unwrap_or_else(|| format!("ID {}", warehouse_id))
    }
}
