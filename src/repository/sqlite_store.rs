// ==========================================
// Catalog import - SQLite store implementation
// ==========================================
// CatalogStore over rusqlite. The connection sits behind Arc<Mutex<_>>;
// every call locks, runs its statement, and releases.
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::product::{
    AssignmentChanges, NewAssignment, ProductPayload, ReferenceEntity, ReferenceKind,
    StoredAssignment, StoredProduct,
};
use crate::repository::catalog_store::CatalogStore;
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex, MutexGuard};

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS category (
    id   INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS supplier (
    id   INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS warehouse (
    id   INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS product (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    sku            TEXT UNIQUE,
    name           TEXT NOT NULL,
    product_type   TEXT NOT NULL,
    description    TEXT,
    brand          TEXT,
    cost_price     REAL,
    sale_price     REAL,
    vat            REAL,
    barcode        TEXT,
    category_id    INTEGER REFERENCES category(id),
    supplier_id    INTEGER REFERENCES supplier(id),
    equipment_json TEXT,
    created_at     TEXT NOT NULL,
    updated_at     TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS warehouse_product (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    product_id   INTEGER NOT NULL REFERENCES product(id),
    warehouse_id INTEGER NOT NULL REFERENCES warehouse(id),
    quantity     INTEGER NOT NULL DEFAULT 0,
    min_stock    INTEGER NOT NULL DEFAULT 0,
    max_stock    INTEGER NOT NULL DEFAULT 0,
    UNIQUE (product_id, warehouse_id)
);
"#;

// ==========================================
// SqliteCatalogStore
// ==========================================
#[derive(Clone)]
pub struct SqliteCatalogStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteCatalogStore {
    /// Open a store on the given database file.
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::Connection(e.to_string()))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Create the catalog tables if they are missing. Used by tests and
    /// tooling; production schemas are owned by the host application.
    pub fn init_schema(&self) -> RepositoryResult<()> {
        let conn = self.lock()?;
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(())
    }

    fn lock(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| RepositoryError::Connection("connection lock poisoned".to_string()))
    }

    // ===== reference seeding (tests/tooling) =====

    pub fn insert_reference(&self, kind: ReferenceKind, name: &str) -> RepositoryResult<i64> {
        let conn = self.lock()?;
        let sql = match kind {
            ReferenceKind::Category => "INSERT INTO category (name) VALUES (?1)",
            ReferenceKind::Supplier => "INSERT INTO supplier (name) VALUES (?1)",
            ReferenceKind::Warehouse => "INSERT INTO warehouse (name) VALUES (?1)",
        };
        conn.execute(sql, params![name])?;
        Ok(conn.last_insert_rowid())
    }

    fn equipment_json(payload: &ProductPayload) -> RepositoryResult<Option<String>> {
        if payload.equipment.is_empty() {
            Ok(None)
        } else {
            Ok(Some(serde_json::to_string(&payload.equipment)?))
        }
    }

    fn map_product(row: &rusqlite::Row<'_>) -> rusqlite::Result<StoredProduct> {
        Ok(StoredProduct {
            id: row.get(0)?,
            sku: row.get(1)?,
            name: row.get(2)?,
            product_type: row.get(3)?,
            category_id: row.get(4)?,
            supplier_id: row.get(5)?,
        })
    }
}

const PRODUCT_COLUMNS: &str = "id, sku, name, product_type, category_id, supplier_id";

#[async_trait]
impl CatalogStore for SqliteCatalogStore {
    async fn find_reference_entities(
        &self,
        kind: ReferenceKind,
    ) -> RepositoryResult<Vec<ReferenceEntity>> {
        let conn = self.lock()?;
        let sql = match kind {
            ReferenceKind::Category => "SELECT id, name FROM category ORDER BY id",
            ReferenceKind::Supplier => "SELECT id, name FROM supplier ORDER BY id",
            ReferenceKind::Warehouse => "SELECT id, name FROM warehouse ORDER BY id",
        };
        let mut stmt = conn.prepare(sql)?;
        let entities = stmt
            .query_map([], |row| {
                Ok(ReferenceEntity {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entities)
    }

    async fn find_product_by_id(&self, id: i64) -> RepositoryResult<Option<StoredProduct>> {
        let conn = self.lock()?;
        let product = conn
            .query_row(
                &format!("SELECT {} FROM product WHERE id = ?1", PRODUCT_COLUMNS),
                params![id],
                Self::map_product,
            )
            .optional()?;
        Ok(product)
    }

    async fn find_product_by_sku(&self, sku: &str) -> RepositoryResult<Option<StoredProduct>> {
        let conn = self.lock()?;
        let product = conn
            .query_row(
                &format!("SELECT {} FROM product WHERE sku = ?1", PRODUCT_COLUMNS),
                params![sku],
                Self::map_product,
            )
            .optional()?;
        Ok(product)
    }

    async fn create_product(&self, payload: &ProductPayload) -> RepositoryResult<i64> {
        let equipment = Self::equipment_json(payload)?;
        let now = Utc::now().to_rfc3339();
        let conn = self.lock()?;
        conn.execute(
            r#"
            INSERT INTO product (
                sku, name, product_type, description, brand,
                cost_price, sale_price, vat, barcode,
                category_id, supplier_id, equipment_json,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?13)
            "#,
            params![
                payload.sku,
                payload.name,
                payload.product_type.as_str(),
                payload.description,
                payload.brand,
                payload.cost_price,
                payload.sale_price,
                payload.vat,
                payload.barcode,
                payload.category_id,
                payload.supplier_id,
                equipment,
                now,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    async fn update_product(&self, id: i64, payload: &ProductPayload) -> RepositoryResult<()> {
        let equipment = Self::equipment_json(payload)?;
        let now = Utc::now().to_rfc3339();
        let conn = self.lock()?;
        // SKU is intentionally not part of the update set.
        let affected = conn.execute(
            r#"
            UPDATE product SET
                name = ?2, product_type = ?3, description = ?4, brand = ?5,
                cost_price = ?6, sale_price = ?7, vat = ?8, barcode = ?9,
                category_id = ?10, supplier_id = ?11, equipment_json = ?12,
                updated_at = ?13
            WHERE id = ?1
            "#,
            params![
                id,
                payload.name,
                payload.product_type.as_str(),
                payload.description,
                payload.brand,
                payload.cost_price,
                payload.sale_price,
                payload.vat,
                payload.barcode,
                payload.category_id,
                payload.supplier_id,
                equipment,
                now,
            ],
        )?;
        if affected == 0 {
            return Err(RepositoryError::NotFound(format!("product id {}", id)));
        }
        Ok(())
    }

    async fn list_assignments(&self, product_id: i64) -> RepositoryResult<Vec<StoredAssignment>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, warehouse_id, quantity, min_stock, max_stock
            FROM warehouse_product
            WHERE product_id = ?1
            ORDER BY warehouse_id
            "#,
        )?;
        let assignments = stmt
            .query_map(params![product_id], |row| {
                Ok(StoredAssignment {
                    id: row.get(0)?,
                    warehouse_id: row.get(1)?,
                    quantity: row.get(2)?,
                    min_stock: row.get(3)?,
                    max_stock: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(assignments)
    }

    async fn find_assignment(
        &self,
        product_id: i64,
        warehouse_id: i64,
    ) -> RepositoryResult<Option<i64>> {
        let conn = self.lock()?;
        let id = conn
            .query_row(
                "SELECT id FROM warehouse_product WHERE product_id = ?1 AND warehouse_id = ?2",
                params![product_id, warehouse_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(id)
    }

    async fn create_assignment(&self, assignment: &NewAssignment) -> RepositoryResult<()> {
        let conn = self.lock()?;
        conn.execute(
            r#"
            INSERT INTO warehouse_product (product_id, warehouse_id, quantity, min_stock, max_stock)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                assignment.product_id,
                assignment.warehouse_id,
                assignment.quantity,
                assignment.min_stock,
                assignment.max_stock,
            ],
        )?;
        Ok(())
    }

    async fn update_assignment(
        &self,
        assignment_id: i64,
        changes: &AssignmentChanges,
    ) -> RepositoryResult<()> {
        let conn = self.lock()?;
        let affected = conn.execute(
            "UPDATE warehouse_product SET quantity = ?2, min_stock = ?3, max_stock = ?4 WHERE id = ?1",
            params![
                assignment_id,
                changes.quantity,
                changes.min_stock,
                changes.max_stock,
            ],
        )?;
        if affected == 0 {
            return Err(RepositoryError::NotFound(format!(
                "assignment id {}",
                assignment_id
            )));
        }
        Ok(())
    }

    async fn delete_assignment(
        &self,
        product_id: i64,
        warehouse_id: i64,
    ) -> RepositoryResult<()> {
        let conn = self.lock()?;
        conn.execute(
            "DELETE FROM warehouse_product WHERE product_id = ?1 AND warehouse_id = ?2",
            params![product_id, warehouse_id],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::product::{EquipmentInfo, ProductType};

    fn temp_store() -> (tempfile::TempDir, SqliteCatalogStore) {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("catalog.db");
        let store = SqliteCatalogStore::new(path.to_str().unwrap()).expect("open store");
        store.init_schema().expect("init schema");
        (dir, store)
    }

    fn sample_payload(sku: Option<&str>) -> ProductPayload {
        ProductPayload {
            sku: sku.map(|s| s.to_string()),
            name: "Widget".to_string(),
            product_type: ProductType::Stockable,
            description: None,
            brand: Some("Acme".to_string()),
            cost_price: Some(2.5),
            sale_price: Some(5.0),
            vat: Some(19.0),
            barcode: None,
            category_id: None,
            supplier_id: None,
            equipment: EquipmentInfo::default(),
        }
    }

    #[tokio::test]
    async fn test_product_roundtrip_by_id_and_sku() {
        let (_dir, store) = temp_store();
        let id = store.create_product(&sample_payload(Some("wid-1"))).await.unwrap();

        let by_id = store.find_product_by_id(id).await.unwrap().unwrap();
        assert_eq!(by_id.name, "Widget");
        assert_eq!(by_id.product_type, "STOCKABLE");

        let by_sku = store.find_product_by_sku("wid-1").await.unwrap().unwrap();
        assert_eq!(by_sku.id, id);

        assert!(store.find_product_by_sku("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_sku_is_unique_violation() {
        let (_dir, store) = temp_store();
        store.create_product(&sample_payload(Some("dup"))).await.unwrap();
        let err = store
            .create_product(&sample_payload(Some("dup")))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::UniqueViolation(_)));
    }

    #[tokio::test]
    async fn test_assignment_crud() {
        let (_dir, store) = temp_store();
        let wh = store
            .insert_reference(ReferenceKind::Warehouse, "Main")
            .unwrap();
        let product = store.create_product(&sample_payload(Some("p1"))).await.unwrap();

        store
            .create_assignment(&NewAssignment {
                product_id: product,
                warehouse_id: wh,
                quantity: 5,
                min_stock: 1,
                max_stock: 10,
            })
            .await
            .unwrap();

        let listed = store.list_assignments(product).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].quantity, 5);

        let assignment_id = store.find_assignment(product, wh).await.unwrap().unwrap();
        store
            .update_assignment(
                assignment_id,
                &AssignmentChanges {
                    quantity: 7,
                    min_stock: 2,
                    max_stock: 20,
                },
            )
            .await
            .unwrap();
        assert_eq!(store.list_assignments(product).await.unwrap()[0].quantity, 7);

        store.delete_assignment(product, wh).await.unwrap();
        assert!(store.list_assignments(product).await.unwrap().is_empty());
    }
}
