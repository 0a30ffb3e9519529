//! Loader for catalog snapshot files
//!
//! A snapshot is an XML dump of the four catalog row sets, so a model can be
//! extracted without a live server:
//!
//! ```xml
//! <CatalogSnapshot>
//!   <Table Database="shop" Schema="shop" Name="users"/>
//!   <Column Schema="shop" Table="users" Name="id" Ordinal="1" DataType="int"
//!           ColumnType="int(11)" Nullable="false" Identity="true"/>
//!   <Index Schema="shop" Table="users" Name="PRIMARY" Column="id" Seq="1"
//!          Unique="true" Primary="true"/>
//!   <ForeignKey Schema="shop" Constraint="fk_orders_user" Ordinal="1" Table="orders"
//!               Column="user_id" ReferencedTable="users" ReferencedColumn="id"
//!               OnDelete="CASCADE" OnUpdate="NO ACTION"/>
//! </CatalogSnapshot>
//! ```
//!
//! `Database` defaults to `Schema` when omitted, which matches catalogs where the two
//! are the same thing.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use roxmltree::{Document, Node};

use crate::error::EntityGenError;

use super::{CatalogRows, ColumnRow, ForeignKeyRow, InMemoryCatalog, IndexRow, TableRow};

const ROOT_ELEMENT: &str = "CatalogSnapshot";

/// Read and parse a snapshot file
pub fn load_snapshot(path: &Path) -> Result<InMemoryCatalog, EntityGenError> {
    let content =
        std::fs::read_to_string(path).map_err(|e| EntityGenError::SnapshotReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

    parse_snapshot_from(&content, path)
}

/// Parse snapshot XML held in memory
pub fn parse_snapshot(xml: &str) -> Result<InMemoryCatalog, EntityGenError> {
    parse_snapshot_from(xml, Path::new("<memory>"))
}

fn parse_snapshot_from(xml: &str, path: &Path) -> Result<InMemoryCatalog, EntityGenError> {
    let doc = Document::parse(xml).map_err(|e| EntityGenError::SnapshotParseError {
        path: PathBuf::from(path),
        source: e,
    })?;

    let root = doc.root_element();
    if root.tag_name().name() != ROOT_ELEMENT {
        return Err(EntityGenError::InvalidSnapshot {
            message: format!(
                "expected root element <{}>, found <{}>",
                ROOT_ELEMENT,
                root.tag_name().name()
            ),
        });
    }

    let mut rows = CatalogRows::default();
    for node in root.descendants().filter(|n| n.is_element()) {
        match node.tag_name().name() {
            "Table" => rows.tables.push(table_from_node(&node)?),
            "Column" => rows.columns.push(column_from_node(&node)?),
            "Index" => rows.indexes.push(index_from_node(&node)?),
            "ForeignKey" => rows.foreign_keys.push(foreign_key_from_node(&node)?),
            _ => {}
        }
    }

    tracing::debug!(
        path = %path.display(),
        tables = rows.tables.len(),
        columns = rows.columns.len(),
        "loaded catalog snapshot"
    );

    Ok(InMemoryCatalog::from_rows(rows))
}

fn table_from_node(node: &Node) -> Result<TableRow, EntityGenError> {
    let schema = required(node, "Schema")?;
    Ok(TableRow {
        database: database_or_schema(node, &schema),
        table_name: required(node, "Name")?,
        schema,
    })
}

fn column_from_node(node: &Node) -> Result<ColumnRow, EntityGenError> {
    let schema = required(node, "Schema")?;
    let data_type = required(node, "DataType")?;
    Ok(ColumnRow {
        database: database_or_schema(node, &schema),
        table_name: required(node, "Table")?,
        column_name: required(node, "Name")?,
        ordinal_position: required_number(node, "Ordinal")?,
        column_type: optional(node, "ColumnType").unwrap_or_else(|| data_type.clone()),
        data_type,
        is_nullable: flag(node, "Nullable")?,
        column_default: optional(node, "Default"),
        character_maximum_length: optional_number(node, "MaxLength")?,
        numeric_precision: optional_number(node, "Precision")?,
        numeric_scale: optional_number(node, "Scale")?,
        is_identity: flag(node, "Identity")?,
        is_unique: flag(node, "Unique")?,
        comment: optional(node, "Comment").filter(|c| !c.is_empty()),
        referenced_table_name: optional(node, "ReferencedTable").filter(|t| !t.is_empty()),
        schema,
    })
}

fn index_from_node(node: &Node) -> Result<IndexRow, EntityGenError> {
    let schema = required(node, "Schema")?;
    Ok(IndexRow {
        database: database_or_schema(node, &schema),
        table_name: required(node, "Table")?,
        index_name: required(node, "Name")?,
        column_name: required(node, "Column")?,
        seq_in_index: optional_number(node, "Seq")?.unwrap_or(1),
        is_unique: flag(node, "Unique")?,
        is_primary: flag(node, "Primary")?,
        is_fulltext: flag(node, "Fulltext")?,
        schema,
    })
}

fn foreign_key_from_node(node: &Node) -> Result<ForeignKeyRow, EntityGenError> {
    let schema = required(node, "Schema")?;
    Ok(ForeignKeyRow {
        database: database_or_schema(node, &schema),
        constraint_name: required(node, "Constraint")?,
        ordinal_position: optional_number(node, "Ordinal")?.unwrap_or(1),
        owning_table: required(node, "Table")?,
        owning_column: required(node, "Column")?,
        referenced_database: optional(node, "ReferencedDatabase"),
        referenced_schema: optional(node, "ReferencedSchema"),
        referenced_table: required(node, "ReferencedTable")?,
        referenced_column: required(node, "ReferencedColumn")?,
        on_delete: optional(node, "OnDelete").unwrap_or_else(|| "NO ACTION".to_string()),
        on_update: optional(node, "OnUpdate").unwrap_or_else(|| "NO ACTION".to_string()),
        schema,
    })
}

fn database_or_schema(node: &Node, schema: &str) -> String {
    optional(node, "Database").unwrap_or_else(|| schema.to_string())
}

fn optional(node: &Node, attribute: &str) -> Option<String> {
    node.attribute(attribute).map(|v| v.to_string())
}

fn required(node: &Node, attribute: &str) -> Result<String, EntityGenError> {
    optional(node, attribute).ok_or_else(|| EntityGenError::InvalidSnapshot {
        message: format!(
            "<{}> is missing required attribute {}",
            node.tag_name().name(),
            attribute
        ),
    })
}

fn optional_number<T: FromStr>(node: &Node, attribute: &str) -> Result<Option<T>, EntityGenError> {
    match node.attribute(attribute).map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| invalid_value(node, attribute, raw)),
    }
}

fn required_number<T: FromStr>(node: &Node, attribute: &str) -> Result<T, EntityGenError> {
    optional_number(node, attribute)?.ok_or_else(|| EntityGenError::InvalidSnapshot {
        message: format!(
            "<{}> is missing required attribute {}",
            node.tag_name().name(),
            attribute
        ),
    })
}

/// Boolean attribute; absent means false. Accepts the spellings catalogs use.
fn flag(node: &Node, attribute: &str) -> Result<bool, EntityGenError> {
    match node.attribute(attribute).map(str::trim) {
        None | Some("") => Ok(false),
        Some(raw) if ["true", "yes", "1"].iter().any(|t| raw.eq_ignore_ascii_case(t)) => Ok(true),
        Some(raw) if ["false", "no", "0"].iter().any(|f| raw.eq_ignore_ascii_case(f)) => Ok(false),
        Some(raw) => Err(invalid_value(node, attribute, raw)),
    }
}

fn invalid_value(node: &Node, attribute: &str, raw: &str) -> EntityGenError {
    EntityGenError::InvalidSnapshot {
        message: format!(
            "<{}> has invalid {} value '{}'",
            node.tag_name().name(),
            attribute,
            raw
        ),
    }
}
