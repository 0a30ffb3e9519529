//! Catalog metadata rows and the reader boundary
//!
//! The four row shapes mirror what an `information_schema` style catalog exposes:
//! base tables, columns (in ordinal order), index members and foreign-key members.
//! Everything downstream of [`fetch_all`] works on these rows in memory only.

mod memory;
mod snapshot;

use std::fmt;

use crate::error::EntityGenError;

pub use memory::InMemoryCatalog;
pub use snapshot::{load_snapshot, parse_snapshot};

/// The four metadata queries issued per run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CatalogQuery {
    Tables,
    Columns,
    Indexes,
    ForeignKeys,
}

impl fmt::Display for CatalogQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CatalogQuery::Tables => "tables",
            CatalogQuery::Columns => "columns",
            CatalogQuery::Indexes => "indexes",
            CatalogQuery::ForeignKeys => "foreign keys",
        };
        f.write_str(name)
    }
}

/// Schemas and databases a run is restricted to.
///
/// An empty list places no restriction on that dimension.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogScope {
    pub schemas: Vec<String>,
    pub databases: Vec<String>,
}

impl CatalogScope {
    pub fn new(schemas: Vec<String>, databases: Vec<String>) -> Self {
        Self { schemas, databases }
    }

    /// Whether a row living in `database`.`schema` belongs to this scope
    pub fn contains(&self, database: &str, schema: &str) -> bool {
        let database_ok =
            self.databases.is_empty() || self.databases.iter().any(|d| d == database);
        let schema_ok = self.schemas.is_empty() || self.schemas.iter().any(|s| s == schema);
        database_ok && schema_ok
    }
}

/// One base table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    pub database: String,
    pub schema: String,
    pub table_name: String,
}

/// One column of a table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRow {
    pub database: String,
    pub schema: String,
    pub table_name: String,
    pub column_name: String,
    /// Position of the column within its table, starting at 1
    pub ordinal_position: u32,
    /// Bare native type name (e.g. `int`, `enum`)
    pub data_type: String,
    /// Full native signature including modifiers (e.g. `int(11) unsigned`, `enum('a','b')`)
    pub column_type: String,
    pub is_nullable: bool,
    /// Raw default expression as reported by the catalog
    pub column_default: Option<String>,
    pub character_maximum_length: Option<u64>,
    pub numeric_precision: Option<u32>,
    pub numeric_scale: Option<u32>,
    /// Auto-increment / identity column
    pub is_identity: bool,
    pub is_unique: bool,
    pub comment: Option<String>,
    /// Table this column points at when it is part of a foreign key
    pub referenced_table_name: Option<String>,
}

/// One column membership of an index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexRow {
    pub database: String,
    pub schema: String,
    pub table_name: String,
    pub index_name: String,
    pub column_name: String,
    /// Position of the column within the index, starting at 1
    pub seq_in_index: u32,
    pub is_unique: bool,
    pub is_primary: bool,
    pub is_fulltext: bool,
}

/// One column pairing of a foreign-key constraint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeyRow {
    /// Database of the owning table
    pub database: String,
    /// Schema of the owning table
    pub schema: String,
    pub constraint_name: String,
    /// Position of this pairing within the constraint, starting at 1
    pub ordinal_position: u32,
    pub owning_table: String,
    pub owning_column: String,
    /// Defaults to the owning database when absent
    pub referenced_database: Option<String>,
    /// Defaults to the owning schema when absent
    pub referenced_schema: Option<String>,
    pub referenced_table: String,
    pub referenced_column: String,
    pub on_delete: String,
    pub on_update: String,
}

/// Read-only access to catalog metadata.
///
/// Implementations own transport, retries and credentials. Each method returns the
/// complete row set for the scope or fails as a whole.
pub trait CatalogReader {
    fn fetch_tables(&self, scope: &CatalogScope) -> Result<Vec<TableRow>, EntityGenError>;

    /// Rows must be returned in ordinal order per table, although the builder re-sorts
    fn fetch_columns(&self, scope: &CatalogScope) -> Result<Vec<ColumnRow>, EntityGenError>;

    fn fetch_indexes(&self, scope: &CatalogScope) -> Result<Vec<IndexRow>, EntityGenError>;

    fn fetch_foreign_keys(
        &self,
        scope: &CatalogScope,
    ) -> Result<Vec<ForeignKeyRow>, EntityGenError>;
}

/// The complete row sets for one run
#[derive(Debug, Clone, Default)]
pub struct CatalogRows {
    pub tables: Vec<TableRow>,
    pub columns: Vec<ColumnRow>,
    pub indexes: Vec<IndexRow>,
    pub foreign_keys: Vec<ForeignKeyRow>,
}

/// Issue the four catalog queries concurrently and wait for all of them.
///
/// The queries have no ordering dependency on each other, but grouping needs every
/// row set, so the first failure (in query order) is returned and no partial rows
/// escape.
pub fn fetch_all<R>(reader: &R, scope: &CatalogScope) -> Result<CatalogRows, EntityGenError>
where
    R: CatalogReader + Sync + ?Sized,
{
    let ((tables, columns), (indexes, foreign_keys)) = rayon::join(
        || {
            rayon::join(
                || reader.fetch_tables(scope),
                || reader.fetch_columns(scope),
            )
        },
        || {
            rayon::join(
                || reader.fetch_indexes(scope),
                || reader.fetch_foreign_keys(scope),
            )
        },
    );

    let rows = CatalogRows {
        tables: tables?,
        columns: columns?,
        indexes: indexes?,
        foreign_keys: foreign_keys?,
    };

    tracing::debug!(
        tables = rows.tables.len(),
        columns = rows.columns.len(),
        indexes = rows.indexes.len(),
        foreign_keys = rows.foreign_keys.len(),
        "fetched catalog rows"
    );

    Ok(rows)
}
