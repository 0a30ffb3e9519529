//! Common test utilities for rust-entitygen tests

#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

use rust_entitygen::catalog::{
    CatalogRows, CatalogScope, ColumnRow, ForeignKeyRow, InMemoryCatalog, IndexRow, TableRow,
};
use rust_entitygen::model::{build_model, ExtractedModel, GenerationOptions};
use rust_entitygen::{extract_model, ExtractOptions};

/// Database (and schema) every builder below places its rows in
pub const DB: &str = "shop";

pub fn table(name: &str) -> TableRow {
    TableRow {
        database: DB.to_string(),
        schema: DB.to_string(),
        table_name: name.to_string(),
    }
}

/// A non-nullable column without default, identity or uniqueness
pub fn column(table: &str, name: &str, ordinal: u32, data_type: &str, column_type: &str) -> ColumnRow {
    ColumnRow {
        database: DB.to_string(),
        schema: DB.to_string(),
        table_name: table.to_string(),
        column_name: name.to_string(),
        ordinal_position: ordinal,
        data_type: data_type.to_string(),
        column_type: column_type.to_string(),
        is_nullable: false,
        column_default: None,
        character_maximum_length: None,
        numeric_precision: None,
        numeric_scale: None,
        is_identity: false,
        is_unique: false,
        comment: None,
        referenced_table_name: None,
    }
}

/// `int(11)` identity column
pub fn id_column(table: &str, ordinal: u32) -> ColumnRow {
    ColumnRow {
        is_identity: true,
        ..column(table, "id", ordinal, "int", "int(11)")
    }
}

pub fn varchar(table: &str, name: &str, ordinal: u32, length: u64) -> ColumnRow {
    ColumnRow {
        character_maximum_length: Some(length),
        ..column(table, name, ordinal, "varchar", &format!("varchar({})", length))
    }
}

pub fn int(table: &str, name: &str, ordinal: u32) -> ColumnRow {
    column(table, name, ordinal, "int", "int(11)")
}

pub fn index_row(
    table: &str,
    name: &str,
    column: &str,
    seq: u32,
    unique: bool,
    primary: bool,
) -> IndexRow {
    IndexRow {
        database: DB.to_string(),
        schema: DB.to_string(),
        table_name: table.to_string(),
        index_name: name.to_string(),
        column_name: column.to_string(),
        seq_in_index: seq,
        is_unique: unique,
        is_primary: primary,
        is_fulltext: false,
    }
}

pub fn primary_key(table: &str, column: &str, seq: u32) -> IndexRow {
    index_row(table, "PRIMARY", column, seq, true, true)
}

pub fn foreign_key(
    constraint: &str,
    ordinal: u32,
    table: &str,
    column: &str,
    referenced_table: &str,
    referenced_column: &str,
) -> ForeignKeyRow {
    ForeignKeyRow {
        database: DB.to_string(),
        schema: DB.to_string(),
        constraint_name: constraint.to_string(),
        ordinal_position: ordinal,
        owning_table: table.to_string(),
        owning_column: column.to_string(),
        referenced_database: None,
        referenced_schema: None,
        referenced_table: referenced_table.to_string(),
        referenced_column: referenced_column.to_string(),
        on_delete: "NO ACTION".to_string(),
        on_update: "NO ACTION".to_string(),
    }
}

/// `users(id PK, name)` and `orders(id PK, user_id -> users.id, amount)`
pub fn shop_rows() -> CatalogRows {
    CatalogRows {
        tables: vec![table("users"), table("orders")],
        columns: vec![
            id_column("users", 1),
            varchar("users", "name", 2, 100),
            id_column("orders", 1),
            int("orders", "user_id", 2),
            ColumnRow {
                numeric_precision: Some(10),
                numeric_scale: Some(2),
                ..column("orders", "amount", 3, "decimal", "decimal(10,2)")
            },
        ],
        indexes: vec![primary_key("users", "id", 1), primary_key("orders", "id", 1)],
        foreign_keys: vec![foreign_key("fk_orders_user", 1, "orders", "user_id", "users", "id")],
    }
}

pub fn shop_catalog() -> InMemoryCatalog {
    InMemoryCatalog::from_rows(shop_rows())
}

/// Build with default options, without going through a reader
pub fn build(rows: &CatalogRows) -> ExtractedModel {
    build_model(rows, &GenerationOptions::default())
}

/// The shop catalog as a snapshot document
pub const SHOP_SNAPSHOT: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<CatalogSnapshot>
  <Table Schema="shop" Name="users"/>
  <Table Schema="shop" Name="orders"/>
  <Column Schema="shop" Table="users" Name="id" Ordinal="1" DataType="int" ColumnType="int(11)" Identity="true"/>
  <Column Schema="shop" Table="users" Name="name" Ordinal="2" DataType="varchar" ColumnType="varchar(100)" MaxLength="100"/>
  <Column Schema="shop" Table="orders" Name="id" Ordinal="1" DataType="int" ColumnType="int(11)" Identity="true"/>
  <Column Schema="shop" Table="orders" Name="user_id" Ordinal="2" DataType="int" ColumnType="int(11)"/>
  <Column Schema="shop" Table="orders" Name="amount" Ordinal="3" DataType="decimal" ColumnType="decimal(10,2)" Precision="10" Scale="2"/>
  <Index Schema="shop" Table="users" Name="PRIMARY" Column="id" Seq="1" Unique="true" Primary="true"/>
  <Index Schema="shop" Table="orders" Name="PRIMARY" Column="id" Seq="1" Unique="true" Primary="true"/>
  <ForeignKey Schema="shop" Constraint="fk_orders_user" Ordinal="1" Table="orders" Column="user_id" ReferencedTable="users" ReferencedColumn="id" OnDelete="CASCADE"/>
</CatalogSnapshot>
"#;

/// Test context with temporary directory for isolated test execution
pub struct TestContext {
    /// Kept to prevent temp directory cleanup until TestContext is dropped
    _temp_dir: TempDir,
    pub dir: PathBuf,
}

impl TestContext {
    /// Create a context holding `snapshot.xml` with the given content
    pub fn with_snapshot(content: &str) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let dir = temp_dir.path().to_path_buf();
        fs::write(dir.join("snapshot.xml"), content).expect("Failed to write snapshot");
        Self {
            _temp_dir: temp_dir,
            dir,
        }
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.dir.join("snapshot.xml")
    }

    pub fn output_path(&self) -> PathBuf {
        self.dir.join("model.xml")
    }

    pub fn options(&self) -> ExtractOptions {
        ExtractOptions {
            snapshot_path: self.snapshot_path(),
            output_path: Some(self.output_path()),
            scope: CatalogScope::default(),
            generation: GenerationOptions::default(),
        }
    }

    /// Run an extraction and return the written model XML, panicking on failure
    pub fn extract_successfully(&self) -> (ExtractedModel, String) {
        let extracted = extract_model(&self.options())
            .unwrap_or_else(|e| panic!("Extraction failed: {:#}", e));
        let xml = fs::read_to_string(self.output_path()).expect("Model file was not written");
        (extracted, xml)
    }
}
