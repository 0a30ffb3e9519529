//! Unit tests for catalog snapshot loading and scope filtering

use std::io::Write;

use pretty_assertions::assert_eq;
use tempfile::NamedTempFile;

use rust_entitygen::catalog::{
    load_snapshot, parse_snapshot, CatalogQuery, CatalogReader, CatalogScope, InMemoryCatalog,
};
use rust_entitygen::EntityGenError;

use crate::common::{shop_catalog, SHOP_SNAPSHOT};

/// Helper to create a temp snapshot file with content
fn create_snapshot_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::with_suffix(".xml").unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

// ============================================================================
// Parsing
// ============================================================================

#[test]
fn test_parse_shop_snapshot() {
    let catalog = parse_snapshot(SHOP_SNAPSHOT).unwrap();
    let rows = catalog.rows();

    assert_eq!(rows.tables.len(), 2);
    assert_eq!(rows.columns.len(), 5);
    assert_eq!(rows.indexes.len(), 2);
    assert_eq!(rows.foreign_keys.len(), 1);

    // Database falls back to the schema
    assert_eq!(rows.tables[0].database, "shop");

    let amount = rows
        .columns
        .iter()
        .find(|c| c.column_name == "amount")
        .unwrap();
    assert_eq!(amount.numeric_precision, Some(10));
    assert_eq!(amount.numeric_scale, Some(2));
    assert!(!amount.is_nullable);

    let fk = &rows.foreign_keys[0];
    assert_eq!(fk.on_delete, "CASCADE");
    assert_eq!(fk.on_update, "NO ACTION");
    assert_eq!(fk.referenced_schema, None);
}

#[test]
fn test_parsed_snapshot_matches_built_catalog() {
    let parsed = parse_snapshot(SHOP_SNAPSHOT).unwrap();
    let built = shop_catalog();

    assert_eq!(parsed.rows().tables, built.rows().tables);
    assert_eq!(parsed.rows().columns, built.rows().columns);
    assert_eq!(parsed.rows().indexes, built.rows().indexes);
}

#[test]
fn test_column_type_defaults_to_data_type() {
    let catalog = parse_snapshot(
        r#"<CatalogSnapshot>
             <Column Schema="s" Table="t" Name="body" Ordinal="1" DataType="text" Nullable="yes"
                     Comment="" ReferencedTable=""/>
           </CatalogSnapshot>"#,
    )
    .unwrap();
    let column = &catalog.rows().columns[0];

    assert_eq!(column.column_type, "text");
    assert!(column.is_nullable);
    assert_eq!(column.comment, None);
    assert_eq!(column.referenced_table_name, None);
}

#[test]
fn test_wrong_root_element_is_rejected() {
    let err = parse_snapshot("<Catalog/>").unwrap_err();
    assert!(matches!(err, EntityGenError::InvalidSnapshot { .. }));
    assert!(err.to_string().contains("CatalogSnapshot"));
}

#[test]
fn test_missing_attribute_is_rejected() {
    let err = parse_snapshot(r#"<CatalogSnapshot><Table Schema="s"/></CatalogSnapshot>"#)
        .unwrap_err();
    assert!(err.to_string().contains("Name"), "error: {}", err);
}

#[test]
fn test_bad_flag_and_number_are_rejected() {
    let bad_flag = parse_snapshot(
        r#"<CatalogSnapshot>
             <Column Schema="s" Table="t" Name="c" Ordinal="1" DataType="int" Nullable="maybe"/>
           </CatalogSnapshot>"#,
    );
    assert!(matches!(bad_flag, Err(EntityGenError::InvalidSnapshot { .. })));

    let bad_number = parse_snapshot(
        r#"<CatalogSnapshot>
             <Column Schema="s" Table="t" Name="c" Ordinal="first" DataType="int"/>
           </CatalogSnapshot>"#,
    );
    assert!(matches!(bad_number, Err(EntityGenError::InvalidSnapshot { .. })));
}

#[test]
fn test_malformed_xml_is_a_parse_error() {
    let err = parse_snapshot("<CatalogSnapshot>").unwrap_err();
    assert!(matches!(err, EntityGenError::SnapshotParseError { .. }));
}

// ============================================================================
// Files
// ============================================================================

#[test]
fn test_load_snapshot_from_file() {
    let file = create_snapshot_file(SHOP_SNAPSHOT);
    let catalog = load_snapshot(file.path()).unwrap();
    assert_eq!(catalog.rows().tables.len(), 2);
}

#[test]
fn test_load_missing_file_is_a_read_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_snapshot(&dir.path().join("absent.xml")).unwrap_err();
    assert!(matches!(err, EntityGenError::SnapshotReadError { .. }));
}

// ============================================================================
// Reader Behavior
// ============================================================================

#[test]
fn test_scope_filters_every_query() {
    let catalog = parse_snapshot(SHOP_SNAPSHOT).unwrap();

    let other = CatalogScope::new(vec!["crm".to_string()], Vec::new());
    assert!(catalog.fetch_tables(&other).unwrap().is_empty());
    assert!(catalog.fetch_columns(&other).unwrap().is_empty());
    assert!(catalog.fetch_indexes(&other).unwrap().is_empty());
    assert!(catalog.fetch_foreign_keys(&other).unwrap().is_empty());

    let shop = CatalogScope::new(Vec::new(), vec!["shop".to_string()]);
    assert_eq!(catalog.fetch_columns(&shop).unwrap().len(), 5);
}

#[test]
fn test_fail_on_reports_the_query() {
    let catalog = InMemoryCatalog::new().fail_on(CatalogQuery::Indexes, "connection reset");

    assert!(catalog.fetch_tables(&CatalogScope::default()).is_ok());
    let err = catalog.fetch_indexes(&CatalogScope::default()).unwrap_err();
    match err {
        EntityGenError::CatalogFetchError { query, source } => {
            assert_eq!(query, CatalogQuery::Indexes);
            assert_eq!(source.to_string(), "connection reset");
        }
        other => panic!("unexpected error: {}", other),
    }
}
