// ==========================================
// Catalog import - store interface
// ==========================================
// The product-and-inventory store the import reconciles against. The import
// core only ever reaches it through this trait; the handle is threaded
// explicitly through every component (no globals).
// ==========================================

use crate::domain::product::{
    AssignmentChanges, NewAssignment, ProductPayload, ReferenceEntity, ReferenceKind,
    StoredAssignment, StoredProduct,
};
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;

// ==========================================
// CatalogStore trait
// ==========================================
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// All `{id, name}` entries of one reference kind, for the per-batch
    /// snapshot.
    async fn find_reference_entities(
        &self,
        kind: ReferenceKind,
    ) -> RepositoryResult<Vec<ReferenceEntity>>;

    async fn find_product_by_id(&self, id: i64) -> RepositoryResult<Option<StoredProduct>>;

    /// Lookup by unique SKU. The caller normalizes (trim + lower-case)
    /// before calling.
    async fn find_product_by_sku(&self, sku: &str) -> RepositoryResult<Option<StoredProduct>>;

    /// Insert a product and return its id. A duplicate SKU surfaces as
    /// `RepositoryError::UniqueViolation`.
    async fn create_product(&self, payload: &ProductPayload) -> RepositoryResult<i64>;

    async fn update_product(&self, id: i64, payload: &ProductPayload) -> RepositoryResult<()>;

    /// Current warehouse assignments of a product, in stable warehouse order.
    async fn list_assignments(&self, product_id: i64) -> RepositoryResult<Vec<StoredAssignment>>;

    /// Assignment row id for (product, warehouse), if one exists.
    async fn find_assignment(
        &self,
        product_id: i64,
        warehouse_id: i64,
    ) -> RepositoryResult<Option<i64>>;

    async fn create_assignment(&self, assignment: &NewAssignment) -> RepositoryResult<()>;

    async fn update_assignment(
        &self,
        assignment_id: i64,
        changes: &AssignmentChanges,
    ) -> RepositoryResult<()>;

    async fn delete_assignment(&self, product_id: i64, warehouse_id: i64)
        -> RepositoryResult<()>;
}

// ==========================================
// SkuGenerator trait
// ==========================================
// SKU heuristics are an external collaborator; the import only passes a hint
// and takes whatever comes back. Failure is tolerated (the record proceeds
// SKU-less).

#[derive(Debug, Clone)]
pub struct SkuHint {
    pub name: String,
    pub brand: Option<String>,
    pub category_id: Option<i64>,
    pub product_type: Option<String>,
}

#[async_trait]
pub trait SkuGenerator: Send + Sync {
    async fn generate(&self, hint: &SkuHint) -> RepositoryResult<String>;
}

/// Default generator: a short slug from the name plus a random suffix.
/// Good enough for tooling and tests; production callers plug their own.
pub struct BasicSkuGenerator;

#[async_trait]
impl SkuGenerator for BasicSkuGenerator {
    async fn generate(&self, hint: &SkuHint) -> RepositoryResult<String> {
        let prefix: String = hint
            .name
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .take(6)
            .collect::<String>()
            .to_lowercase();
        let prefix = if prefix.is_empty() {
            "sku".to_string()
        } else {
            prefix
        };
        let suffix = uuid::Uuid::new_v4().simple().to_string();
        Ok(format!("{}-{}", prefix, &suffix[..8]))
    }
}
