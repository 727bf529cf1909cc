// ==========================================
// Catalog import - data access layer
// ==========================================
// Repositories do data CRUD only; no business rules here.
// ==========================================

pub mod catalog_store;
pub mod error;
pub mod sqlite_store;

pub use catalog_store::{BasicSkuGenerator, CatalogStore, SkuGenerator, SkuHint};
pub use error::{RepositoryError, RepositoryResult};
pub use sqlite_store::SqliteCatalogStore;
