// ==========================================
// catalog-import - bulk product catalog import core
// ==========================================
// Batch import of product catalogs from spreadsheet or delimited sources,
// with warehouse-stock reconciliation against a SQLite-backed store. The
// import file is the source of truth for a product's warehouse set;
// destructive removals are gated behind explicit confirmation.
// ==========================================

pub mod db;
pub mod domain;
pub mod importer;
pub mod logging;
pub mod repository;

pub use importer::{CatalogImporter, ImportError, ImportResult, SourceFormat};
pub use repository::{BasicSkuGenerator, CatalogStore, SqliteCatalogStore};

pub const APP_NAME: &str = "catalog-import";
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
