//! Unit tests for entity building
//!
//! These tests verify how table, column and index rows become entities.

use pretty_assertions::assert_eq;

use rust_entitygen::catalog::{CatalogRows, ColumnRow};
use rust_entitygen::model::{
    attach_indexes, build_entities, Diagnostic, Diagnostics, GenerationOptions, LogicalType,
};

use crate::common::{column, id_column, index_row, int, primary_key, table, varchar};

fn entities_for(rows: &CatalogRows) -> (Vec<rust_entitygen::model::Entity>, Diagnostics) {
    let mut diagnostics = Diagnostics::new();
    let mut entities = build_entities(
        &rows.tables,
        &rows.columns,
        &rows.foreign_keys,
        &GenerationOptions::default(),
        &mut diagnostics,
    );
    attach_indexes(&mut entities, &rows.indexes);
    (entities, diagnostics)
}

// ============================================================================
// Columns
// ============================================================================

#[test]
fn test_columns_follow_ordinal_position() {
    let rows = CatalogRows {
        tables: vec![table("users")],
        columns: vec![
            varchar("users", "email", 3, 255),
            id_column("users", 1),
            varchar("users", "name", 2, 100),
        ],
        ..Default::default()
    };
    let (entities, diagnostics) = entities_for(&rows);

    let names: Vec<_> = entities[0].columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["id", "name", "email"]);
    assert!(diagnostics.is_empty());
}

#[test]
fn test_entities_are_sorted_and_deduplicated() {
    let rows = CatalogRows {
        tables: vec![table("orders"), table("users"), table("orders")],
        ..Default::default()
    };
    let (entities, _) = entities_for(&rows);

    let names: Vec<_> = entities.iter().map(|e| e.sql_name.as_str()).collect();
    assert_eq!(names, vec!["orders", "users"]);
    assert!(entities.iter().all(|e| e.columns.is_empty()));
}

#[test]
fn test_columns_of_unlisted_tables_are_ignored() {
    let rows = CatalogRows {
        tables: vec![table("users")],
        columns: vec![id_column("users", 1), id_column("ghosts", 1)],
        ..Default::default()
    };
    let (entities, _) = entities_for(&rows);

    assert_eq!(entities.len(), 1);
    assert_eq!(entities[0].columns.len(), 1);
}

#[test]
fn test_unknown_type_produces_one_diagnostic() {
    let rows = CatalogRows {
        tables: vec![table("places")],
        columns: vec![
            id_column("places", 1),
            column("places", "area", 2, "hstore", "hstore"),
        ],
        ..Default::default()
    };
    let (entities, diagnostics) = entities_for(&rows);

    let area = entities[0].column("area").unwrap();
    assert_eq!(area.logical_type, LogicalType::Unsupported);
    assert_eq!(area.native_type, "hstore");

    let found: Vec<_> = diagnostics.iter().collect();
    assert_eq!(
        found,
        vec![&Diagnostic::UnknownColumnType {
            table: "shop.places".to_string(),
            column: "area".to_string(),
            native_type: "hstore".to_string(),
        }]
    );
}

#[test]
fn test_column_flags_carry_over() {
    let rows = CatalogRows {
        tables: vec![table("users")],
        columns: vec![ColumnRow {
            is_unique: true,
            is_nullable: true,
            comment: Some("login".to_string()),
            referenced_table_name: Some("accounts".to_string()),
            ..varchar("users", "email", 1, 255)
        }],
        ..Default::default()
    };
    let (entities, _) = entities_for(&rows);
    let email = &entities[0].columns[0];

    assert!(email.unique);
    assert!(email.nullable);
    assert!(email.is_foreign_key);
    assert!(!email.generated);
    assert!(!email.is_required());
    assert_eq!(email.comment.as_deref(), Some("login"));
    assert_eq!(email.native_signature, "varchar(255)");
}

// ============================================================================
// Indexes
// ============================================================================

#[test]
fn test_index_columns_follow_sequence() {
    let rows = CatalogRows {
        tables: vec![table("order_lines")],
        columns: vec![int("order_lines", "order_id", 1), int("order_lines", "line_no", 2)],
        indexes: vec![
            primary_key("order_lines", "line_no", 2),
            primary_key("order_lines", "order_id", 1),
        ],
        ..Default::default()
    };
    let (entities, _) = entities_for(&rows);

    let primary = entities[0].primary_index().unwrap();
    assert_eq!(primary.columns, vec!["order_id", "line_no"]);
    assert!(primary.unique);
    assert!(entities[0].columns.iter().all(|c| c.primary));
}

#[test]
fn test_indexes_sorted_by_name() {
    let rows = CatalogRows {
        tables: vec![table("users")],
        columns: vec![id_column("users", 1), varchar("users", "email", 2, 255)],
        indexes: vec![
            index_row("users", "uq_email", "email", 1, true, false),
            primary_key("users", "id", 1),
            index_row("users", "ix_email", "email", 1, false, false),
        ],
        ..Default::default()
    };
    let (entities, _) = entities_for(&rows);

    let names: Vec<_> = entities[0].indexes.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, vec!["PRIMARY", "ix_email", "uq_email"]);
    assert!(entities[0].column("id").unwrap().primary);
    assert!(!entities[0].column("email").unwrap().primary);
}

#[test]
fn test_second_primary_index_is_demoted() {
    let rows = CatalogRows {
        tables: vec![table("users")],
        columns: vec![id_column("users", 1), varchar("users", "email", 2, 255)],
        indexes: vec![
            primary_key("users", "id", 1),
            index_row("users", "pk_email", "email", 1, false, true),
        ],
        ..Default::default()
    };
    let (entities, _) = entities_for(&rows);

    let primaries: Vec<_> = entities[0].indexes.iter().filter(|i| i.primary).collect();
    assert_eq!(primaries.len(), 1);
    let demoted = entities[0]
        .indexes
        .iter()
        .find(|i| i.name == "pk_email")
        .unwrap();
    assert!(demoted.unique);
}

#[test]
fn test_unique_column_set() {
    let rows = CatalogRows {
        tables: vec![table("profiles")],
        columns: vec![
            id_column("profiles", 1),
            int("profiles", "user_id", 2),
            int("profiles", "tenant_id", 3),
        ],
        indexes: vec![
            primary_key("profiles", "id", 1),
            index_row("profiles", "uq_user_tenant", "user_id", 1, true, false),
            index_row("profiles", "uq_user_tenant", "tenant_id", 2, true, false),
        ],
        ..Default::default()
    };
    let (entities, _) = entities_for(&rows);
    let profiles = &entities[0];

    let user = vec!["user_id".to_string()];
    let both = vec!["user_id".to_string(), "tenant_id".to_string()];
    assert!(!profiles.is_unique_column_set(&user));
    assert!(profiles.is_unique_column_set(&both));
}
