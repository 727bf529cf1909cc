// ==========================================
// Import flow integration tests
// ==========================================
// End-to-end batches against a real SQLite store in a temp directory:
// source bytes in, report and store state out.
// ==========================================

use catalog_import::domain::product::{ProductImportRecord, ReferenceKind, WarehouseAssignmentInput};
use catalog_import::importer::file_parser::SourceFormat;
use catalog_import::repository::catalog_store::{BasicSkuGenerator, CatalogStore};
use catalog_import::repository::sqlite_store::SqliteCatalogStore;
use catalog_import::CatalogImporter;

struct TestEnv {
    _dir: tempfile::TempDir,
    store: SqliteCatalogStore,
    importer: CatalogImporter<SqliteCatalogStore, BasicSkuGenerator>,
    main_wh: i64,
    annex_wh: i64,
}

fn setup() -> TestEnv {
    catalog_import::logging::init_test();
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("catalog.db");
    let store = SqliteCatalogStore::new(path.to_str().unwrap()).expect("open store");
    store.init_schema().expect("init schema");

    let main_wh = store
        .insert_reference(ReferenceKind::Warehouse, "Main Warehouse")
        .unwrap();
    let annex_wh = store
        .insert_reference(ReferenceKind::Warehouse, "Annex")
        .unwrap();
    store
        .insert_reference(ReferenceKind::Category, "Tools")
        .unwrap();
    store
        .insert_reference(ReferenceKind::Supplier, "ACME")
        .unwrap();

    let importer = CatalogImporter::new(store.clone(), BasicSkuGenerator);
    TestEnv {
        _dir: dir,
        store,
        importer,
        main_wh,
        annex_wh,
    }
}

fn record(name: &str, sku: Option<&str>, row: usize) -> ProductImportRecord {
    ProductImportRecord {
        name: name.to_string(),
        sku: sku.map(|s| s.to_string()),
        product_type: Some("STOCKABLE".to_string()),
        row_number: row,
        ..Default::default()
    }
}

fn assignment(name: &str, qty: i64) -> WarehouseAssignmentInput {
    WarehouseAssignmentInput {
        warehouse_name: name.to_string(),
        warehouse_id: None,
        quantity: qty,
        min_stock: 0,
        max_stock: 0,
    }
}

#[tokio::test]
async fn test_csv_batch_creates_products_and_assignments() {
    let env = setup();
    let csv = "Nombre,SKU,Tipo Producto,Categoría,Bodegas Asignadas,Stock Main Warehouse\n\
        Hammer,ham-1,STOCKABLE,Tools,Main Warehouse,7\n\
        Wrench,wr-1,ALMACENABLE,Tools,\"main warehouse; annex\",3\n";

    let report = env
        .importer
        .import_bytes(csv.as_bytes(), SourceFormat::Delimited, false)
        .await
        .unwrap();

    assert!(report.success);
    assert_eq!(report.stats.created, 2);
    assert_eq!(report.stats.errors, 0);

    let hammer = env
        .store
        .find_product_by_sku("ham-1")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(hammer.product_type, "STOCKABLE");
    let hammer_assignments = env.store.list_assignments(hammer.id).await.unwrap();
    assert_eq!(hammer_assignments.len(), 1);
    assert_eq!(hammer_assignments[0].warehouse_id, env.main_wh);
    assert_eq!(hammer_assignments[0].quantity, 7);

    let wrench = env
        .store
        .find_product_by_sku("wr-1")
        .await
        .unwrap()
        .unwrap();
    let wrench_assignments = env.store.list_assignments(wrench.id).await.unwrap();
    assert_eq!(wrench_assignments.len(), 2);
}

#[tokio::test]
async fn test_invalid_type_row_is_isolated() {
    let env = setup();
    let csv = b"Nombre,SKU,Tipo Producto\n\
        Good,g-1,SERVICE\n\
        Bad,b-1,GADGET\n\
        AlsoGood,ag-1,COMBO\n";

    let report = env
        .importer
        .import_bytes(csv, SourceFormat::Delimited, false)
        .await
        .unwrap();

    // Row errors never clear batch success.
    assert!(report.success);
    assert_eq!(report.stats.created, 2);
    assert_eq!(report.stats.errors, 1);
    assert!(report.errors[0].contains("Row 3"));
    assert!(report.errors[0].contains("GADGET"));

    assert!(env.store.find_product_by_sku("g-1").await.unwrap().is_some());
    assert!(env.store.find_product_by_sku("b-1").await.unwrap().is_none());
    assert!(env
        .store
        .find_product_by_sku("ag-1")
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn test_missing_sku_gets_generated() {
    let env = setup();
    let mut rec = record("Mystery Widget", None, 2);
    rec.warehouse_assignments = vec![assignment("annex", 4)];

    let report = env.importer.import_records(vec![rec], false).await.unwrap();
    assert_eq!(report.stats.created, 1);

    // A second run with the same (SKU-less) input must not match the first
    // product: a fresh SKU is generated, so a second product is created.
    let rec2 = record("Mystery Widget", None, 2);
    let report2 = env.importer.import_records(vec![rec2], false).await.unwrap();
    assert_eq!(report2.stats.created, 1);
    assert_eq!(report2.stats.updated, 0);
}

#[tokio::test]
async fn test_unknown_warehouse_is_warning_not_error() {
    let env = setup();
    let mut rec = record("Widget", Some("w-1"), 2);
    rec.warehouse_assignments = vec![assignment("ghost", 5), assignment("annex", 2)];

    let report = env.importer.import_records(vec![rec], false).await.unwrap();

    assert!(report.success);
    assert_eq!(report.stats.errors, 0);
    assert!(report
        .errors
        .iter()
        .any(|e| e.contains("\"ghost\"") && e.contains("not found")));

    // The skipped assignment surfaces as an explicit failed diff outcome on
    // the row, not as a silent drop.
    let row_outcome = report.details.iter().find(|d| d.row == 2).unwrap();
    let ghost_diff = row_outcome
        .diffs
        .iter()
        .find(|d| d.warehouse_name == "ghost")
        .unwrap();
    assert!(!ghost_diff.applied);
    assert_eq!(ghost_diff.error.as_deref(), Some("warehouse not found"));
    assert_eq!(ghost_diff.warehouse_id, None);

    // And as an informational row appended at batch end.
    assert!(report
        .details
        .iter()
        .any(|d| d.row == 0
            && d.warehouses_assigned == Some(0)
            && d.error.as_deref().is_some_and(|e| e.contains("\"ghost\""))));

    let product = env.store.find_product_by_sku("w-1").await.unwrap().unwrap();
    let assignments = env.store.list_assignments(product.id).await.unwrap();
    assert_eq!(assignments.len(), 1);
    assert_eq!(assignments[0].warehouse_id, env.annex_wh);
}

#[tokio::test]
async fn test_removals_are_gated_until_confirmed() {
    let env = setup();

    // Seed: product assigned to both warehouses.
    let mut rec = record("Widget", Some("w-1"), 2);
    rec.warehouse_assignments = vec![assignment("main warehouse", 5), assignment("annex", 3)];
    env.importer
        .import_records(vec![rec], false)
        .await
        .unwrap();

    // Re-import with only Main: Annex removal must be gated.
    let mut rec = record("Widget", Some("w-1"), 2);
    rec.warehouse_assignments = vec![assignment("main warehouse", 5)];
    let gated = env
        .importer
        .import_records(vec![rec.clone()], false)
        .await
        .unwrap();

    assert!(!gated.success);
    assert!(gated.message.contains("Confirmation required"));
    assert!(gated
        .errors
        .iter()
        .any(|e| e.contains("Confirmation required")));
    assert_eq!(gated.stats.warehouses_removed, 0);
    assert!(gated
        .details
        .iter()
        .any(|d| d.row == 0 && d.warehouses_removed == Some(1)));

    // Nothing was deleted.
    let product = env.store.find_product_by_sku("w-1").await.unwrap().unwrap();
    assert_eq!(env.store.list_assignments(product.id).await.unwrap().len(), 2);

    // Confirmed re-run applies the removal.
    let confirmed = env.importer.import_records(vec![rec], true).await.unwrap();
    assert!(confirmed.success);
    assert_eq!(confirmed.stats.warehouses_removed, 1);

    let remaining = env.store.list_assignments(product.id).await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].warehouse_id, env.main_wh);
}

#[tokio::test]
async fn test_reimport_is_idempotent() {
    let env = setup();
    let make = || {
        let mut rec = record("Widget", Some("w-1"), 2);
        rec.warehouse_assignments = vec![assignment("main warehouse", 5), assignment("annex", 3)];
        rec
    };

    let first = env
        .importer
        .import_records(vec![make()], true)
        .await
        .unwrap();
    assert_eq!(first.stats.created, 1);

    let second = env
        .importer
        .import_records(vec![make()], true)
        .await
        .unwrap();
    assert!(second.success);
    assert_eq!(second.stats.created, 0);
    assert_eq!(second.stats.updated, 1);
    assert_eq!(second.stats.warehouses_removed, 0);

    let product = env.store.find_product_by_sku("w-1").await.unwrap().unwrap();
    let assignments = env.store.list_assignments(product.id).await.unwrap();
    assert_eq!(assignments.len(), 2);
    let quantities: Vec<i64> = assignments.iter().map(|a| a.quantity).collect();
    assert_eq!(quantities, vec![5, 3]);
}

#[tokio::test]
async fn test_unparseable_source_aborts_batch() {
    let env = setup();
    let result = env
        .importer
        .import_bytes(b"not a workbook", SourceFormat::Spreadsheet, false)
        .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_blank_name_rows_are_dropped() {
    let env = setup();
    let csv = b"Nombre,SKU,Tipo Producto\n\
        ,x-1,SERVICE\n\
        Real,r-1,SERVICE\n";

    let report = env
        .importer
        .import_bytes(csv, SourceFormat::Delimited, false)
        .await
        .unwrap();

    // The blank-name row disappears before counting: total reflects only
    // canonical records.
    assert_eq!(report.stats.total, 1);
    assert_eq!(report.stats.created, 1);
    assert_eq!(report.stats.errors, 0);
}
