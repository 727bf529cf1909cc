// ==========================================
// Catalog import - identity matcher
// ==========================================
// Stage 3: decide whether a record is an existing product or a new one.
// The final SKU is settled first (source SKU normalized, or generated from
// a hint), then id lookup wins over SKU lookup. A failed SKU generation is
// tolerated: the record proceeds SKU-less and can still match by id.
// ==========================================

use crate::domain::product::{ProductImportRecord, StoredProduct};
use crate::repository::catalog_store::{CatalogStore, SkuGenerator, SkuHint};
use crate::repository::error::RepositoryResult;
use tracing::warn;

/// How an existing product was found. Reported per row so operators can
/// audit which identity path an update took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMethod {
    Id,
    Sku,
}

impl MatchMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchMethod::Id => "id",
            MatchMethod::Sku => "sku",
        }
    }
}

#[derive(Debug)]
pub struct MatchOutcome {
    pub existing: Option<StoredProduct>,
    pub method: Option<MatchMethod>,
    /// The SKU the row will carry if it creates a product.
    pub final_sku: Option<String>,
}

pub struct IdentityMatcher<'a> {
    store: &'a dyn CatalogStore,
    sku_generator: &'a dyn SkuGenerator,
}

impl<'a> IdentityMatcher<'a> {
    pub fn new(store: &'a dyn CatalogStore, sku_generator: &'a dyn SkuGenerator) -> Self {
        Self {
            store,
            sku_generator,
        }
    }

    /// Normalize the source SKU, or generate one when the source has none.
    async fn settle_sku(&self, record: &ProductImportRecord) -> Option<String> {
        if let Some(sku) = record.sku.as_deref() {
            let normalized = sku.trim().to_lowercase();
            if !normalized.is_empty() {
                return Some(normalized);
            }
        }

        let hint = SkuHint {
            name: record.name.clone(),
            brand: record.brand.clone(),
            category_id: record.category_id,
            product_type: record.product_type.clone(),
        };
        match self.sku_generator.generate(&hint).await {
            Ok(sku) => Some(sku.trim().to_lowercase()),
            Err(e) => {
                warn!(
                    row_number = record.row_number,
                    product = %record.name,
                    error = %e,
                    "SKU generation failed, record proceeds without SKU"
                );
                None
            }
        }
    }

    /// Match a record against the store. Lookup failures are store errors
    /// and propagate; the caller turns them into row-level errors.
    pub async fn match_record(&self, record: &ProductImportRecord) -> RepositoryResult<MatchOutcome> {
        let final_sku = self.settle_sku(record).await;

        let mut existing = None;
        let mut method = None;

        if let Some(id) = record.id {
            if let Some(product) = self.store.find_product_by_id(id).await? {
                existing = Some(product);
                method = Some(MatchMethod::Id);
            }
        }

        if existing.is_none() {
            if let Some(sku) = final_sku.as_deref() {
                if let Some(product) = self.store.find_product_by_sku(sku).await? {
                    existing = Some(product);
                    method = Some(MatchMethod::Sku);
                }
            }
        }

        Ok(MatchOutcome {
            existing,
            method,
            final_sku,
        })
    }
}
