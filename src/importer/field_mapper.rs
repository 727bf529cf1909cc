// ==========================================
// Catalog import - field mapper
// ==========================================
// Stage 1: raw rows -> canonical ProductImportRecord. Source column names
// vary by language and casing, so every logical field goes through a
// static, ordered alias table (first match wins). Multi-valued warehouse
// cells and their per-warehouse stock columns are resolved here too.
// ==========================================

use crate::domain::product::{EquipmentInfo, ProductImportRecord, WarehouseAssignmentInput};
use crate::importer::file_parser::{RawRow, SourceFormat};
use tracing::debug;

// Alias table: (canonical field, aliases in priority order). Priority is
// localized-capitalized, then English-capitalized, then lower-case.
const ALIASES: &[(&str, &[&str])] = &[
    ("id", &["ID", "Id", "id"]),
    ("sku", &["SKU", "sku"]),
    ("name", &["Nombre", "Name", "name"]),
    ("type", &["Tipo Producto", "Tipo", "Type", "type"]),
    ("description", &["Descripción", "Description", "description"]),
    ("brand", &["Marca", "Brand", "brand"]),
    ("cost_price", &["Precio Costo", "P. Costo", "Cost Price", "costPrice"]),
    ("sale_price", &["Precio Venta", "P. Venta", "Sale Price", "salePrice"]),
    ("vat", &["IVA (%)", "VAT (%)", "vat"]),
    ("barcode", &["Código Barras", "Barcode", "barcode"]),
    ("category_name", &["Categoría", "Category", "category"]),
    ("category_id", &["ID Categoría", "Category ID", "categoryId"]),
    ("supplier_name", &["Proveedor", "Supplier", "supplier"]),
    ("supplier_id", &["ID Proveedor", "Supplier ID", "supplierId"]),
    ("warehouse_list", &["Bodegas Asignadas", "Bodegas", "Warehouses", "warehouses"]),
    ("warehouse_name", &["Bodega", "Warehouse", "warehouse"]),
    ("warehouse_id", &["ID Bodega", "Warehouse ID", "warehouseId"]),
    ("current_stock", &["Stock Actual", "Current Stock", "currentStock"]),
    ("min_stock", &["Stock Mínimo", "Min Stock", "minStock"]),
    ("max_stock", &["Stock Máximo", "Max Stock", "maxStock"]),
    // Equipment/maintenance pass-through block
    ("model", &["Modelo", "Model"]),
    ("serial_number", &["Número Serie", "Serial Number"]),
    ("purchase_date", &["Fecha Compra", "Purchase Date"]),
    ("warranty_expiration", &["Garantía Hasta", "Warranty Expiration"]),
    ("useful_life", &["Vida Útil (años)", "Useful Life (years)"]),
    ("maintenance_interval", &["Intervalo Mantenimiento (días)", "Maintenance Interval (days)"]),
    ("last_maintenance", &["Último Mantenimiento", "Last Maintenance"]),
    ("next_maintenance", &["Próximo Mantenimiento", "Next Maintenance"]),
    ("maintenance_cost", &["Costo Mantenimiento", "Maintenance Cost"]),
    ("maintenance_provider", &["Proveedor Mantenimiento", "Maintenance Provider"]),
    ("current_location", &["Ubicación Actual", "Current Location"]),
    ("responsible_person", &["Responsable", "Responsible"]),
    ("operational_status", &["Estado Operacional", "Operational Status"]),
];

/// Default maxStock for per-warehouse stock columns that are absent. The two
/// source formats intentionally disagree here; the asymmetry is preserved
/// for compatibility with existing catalogs.
fn default_max_stock(format: SourceFormat) -> i64 {
    match format {
        SourceFormat::Spreadsheet => 100,
        SourceFormat::Delimited => 0,
    }
}

pub struct FieldMapper;

impl FieldMapper {
    /// Map one raw row into a canonical record.
    ///
    /// `index` is the 0-based data-row index; the business row number is
    /// `index + 2` (row 1 is the header). Returns None when the resolved
    /// name is empty - such rows are dropped without an error.
    pub fn map_row(
        &self,
        row: &RawRow,
        index: usize,
        format: SourceFormat,
    ) -> Option<ProductImportRecord> {
        let row_number = index + 2;

        let name = self.get_string(row, "name").unwrap_or_default();
        if name.is_empty() {
            debug!(row_number, "skipping row with empty product name");
            return None;
        }

        Some(ProductImportRecord {
            id: self.parse_id(row, "id"),
            sku: self.get_string(row, "sku"),
            name,
            product_type: self.get_string(row, "type"),
            description: self.get_string(row, "description"),
            brand: self.get_string(row, "brand"),
            cost_price: self.parse_f64(row, "cost_price"),
            sale_price: self.parse_f64(row, "sale_price"),
            vat: self.parse_f64(row, "vat"),
            barcode: self.get_string(row, "barcode"),
            category_id: self.parse_id(row, "category_id"),
            category_name: self.get_string(row, "category_name"),
            supplier_id: self.parse_id(row, "supplier_id"),
            supplier_name: self.get_string(row, "supplier_name"),
            warehouse_assignments: self.parse_warehouses(row, format),
            equipment: self.parse_equipment(row),
            row_number,
        })
    }

    // ===== warehouse handling =====

    /// Warehouse assignments from either the multi-valued cell or the legacy
    /// single-warehouse column set. The multi cell wins when present.
    fn parse_warehouses(&self, row: &RawRow, format: SourceFormat) -> Vec<WarehouseAssignmentInput> {
        if let Some(list) = self.get_string(row, "warehouse_list") {
            return list
                .split([',', ';'])
                .map(|piece| piece.trim().to_lowercase())
                .filter(|piece| !piece.is_empty())
                .map(|warehouse_name| {
                    let quantity = self
                        .find_stock_column(row, "stock", &warehouse_name)
                        .unwrap_or(0);
                    let min_stock = self
                        .find_stock_column(row, "min", &warehouse_name)
                        .unwrap_or(0);
                    let max_stock = self
                        .find_stock_column(row, "max", &warehouse_name)
                        .unwrap_or_else(|| default_max_stock(format));
                    WarehouseAssignmentInput {
                        warehouse_name,
                        warehouse_id: None,
                        quantity,
                        min_stock,
                        max_stock,
                    }
                })
                .collect();
        }

        // Legacy format: one warehouse per row, stock in fixed columns.
        let legacy_name = self.get_string(row, "warehouse_name");
        let legacy_id = self.parse_id(row, "warehouse_id");
        if legacy_name.is_none() && legacy_id.is_none() {
            return Vec::new();
        }
        vec![WarehouseAssignmentInput {
            warehouse_name: legacy_name.unwrap_or_default().to_lowercase(),
            warehouse_id: legacy_id,
            quantity: self.parse_i64(row, "current_stock").unwrap_or(0),
            min_stock: self.parse_i64(row, "min_stock").unwrap_or(0),
            max_stock: self.parse_i64(row, "max_stock").unwrap_or(0),
        }]
    }

    /// Locate a per-warehouse stock column such as `Stock Main Warehouse`
    /// for warehouse "main warehouse". Both the header and the synthetic
    /// key are compared lower-cased with all whitespace stripped, so
    /// spacing and casing variants all match.
    fn find_stock_column(&self, row: &RawRow, prefix: &str, warehouse_name: &str) -> Option<i64> {
        let wanted = strip_spaces(&format!("{}{}", prefix, warehouse_name));
        row.iter()
            .find(|(header, _)| strip_spaces(header) == wanted)
            .and_then(|(_, value)| parse_int(value))
    }

    fn parse_equipment(&self, row: &RawRow) -> EquipmentInfo {
        EquipmentInfo {
            model: self.get_string(row, "model"),
            serial_number: self.get_string(row, "serial_number"),
            purchase_date: self.get_string(row, "purchase_date"),
            warranty_expiration: self.get_string(row, "warranty_expiration"),
            useful_life: self.parse_f64(row, "useful_life"),
            maintenance_interval: self.parse_f64(row, "maintenance_interval"),
            last_maintenance: self.get_string(row, "last_maintenance"),
            next_maintenance: self.get_string(row, "next_maintenance"),
            maintenance_cost: self.parse_f64(row, "maintenance_cost"),
            maintenance_provider: self.get_string(row, "maintenance_provider"),
            current_location: self.get_string(row, "current_location"),
            responsible_person: self.get_string(row, "responsible_person"),
            operational_status: self.get_string(row, "operational_status"),
        }
    }

    // ===== typed getters =====

    /// First non-empty value among the field's aliases, trimmed.
    fn get_string(&self, row: &RawRow, canonical: &str) -> Option<String> {
        let aliases = ALIASES
            .iter()
            .find(|(field, _)| *field == canonical)
            .map(|(_, aliases)| *aliases)
            .unwrap_or_default();

        for alias in aliases {
            if let Some(value) = row.get(*alias) {
                let trimmed = value.trim();
                if !trimmed.is_empty() {
                    return Some(trimmed.to_string());
                }
            }
        }
        None
    }

    /// Lenient float parse: absent, unparseable, or zero -> None. Zero
    /// collapses to None to match the legacy catalogs, where an explicit 0
    /// price meant "not priced".
    fn parse_f64(&self, row: &RawRow, canonical: &str) -> Option<f64> {
        self.get_string(row, canonical)
            .and_then(|v| v.parse::<f64>().ok())
            .filter(|v| *v != 0.0)
    }

    /// Lenient integer parse: absent or unparseable -> None.
    fn parse_i64(&self, row: &RawRow, canonical: &str) -> Option<i64> {
        self.get_string(row, canonical).and_then(|v| parse_int(&v))
    }

    /// Foreign-key cell: positive integers only.
    fn parse_id(&self, row: &RawRow, canonical: &str) -> Option<i64> {
        self.parse_i64(row, canonical).filter(|id| *id > 0)
    }
}

fn strip_spaces(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase()
}

/// Integer cell parse tolerating spreadsheet float rendering ("5.0").
fn parse_int(value: &str) -> Option<i64> {
    let trimmed = value.trim();
    trimmed
        .parse::<i64>()
        .ok()
        .or_else(|| trimmed.parse::<f64>().ok().map(|f| f as i64))
}
