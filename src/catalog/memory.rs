//! Catalog reader over rows already held in memory

use crate::error::EntityGenError;

use super::{
    CatalogQuery, CatalogReader, CatalogRows, CatalogScope, ColumnRow, ForeignKeyRow, IndexRow,
    TableRow,
};

/// A [`CatalogReader`] serving caller-supplied rows, filtered by scope on every fetch.
///
/// Snapshot files load into this type, and it is the natural seam for embedding the
/// extractor behind another transport. `fail_on` makes one query report an error.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    rows: CatalogRows,
    failure: Option<(CatalogQuery, String)>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rows(rows: CatalogRows) -> Self {
        Self {
            rows,
            failure: None,
        }
    }

    pub fn with_table(mut self, row: TableRow) -> Self {
        self.rows.tables.push(row);
        self
    }

    pub fn with_column(mut self, row: ColumnRow) -> Self {
        self.rows.columns.push(row);
        self
    }

    pub fn with_index(mut self, row: IndexRow) -> Self {
        self.rows.indexes.push(row);
        self
    }

    pub fn with_foreign_key(mut self, row: ForeignKeyRow) -> Self {
        self.rows.foreign_keys.push(row);
        self
    }

    /// Make `query` fail with `message` on every fetch
    pub fn fail_on(mut self, query: CatalogQuery, message: impl Into<String>) -> Self {
        self.failure = Some((query, message.into()));
        self
    }

    pub fn rows(&self) -> &CatalogRows {
        &self.rows
    }

    fn check(&self, query: CatalogQuery) -> Result<(), EntityGenError> {
        match &self.failure {
            Some((failing, message)) if *failing == query => {
                Err(EntityGenError::catalog_fetch(query, message.clone()))
            }
            _ => Ok(()),
        }
    }
}

impl CatalogReader for InMemoryCatalog {
    fn fetch_tables(&self, scope: &CatalogScope) -> Result<Vec<TableRow>, EntityGenError> {
        self.check(CatalogQuery::Tables)?;
        Ok(self
            .rows
            .tables
            .iter()
            .filter(|r| scope.contains(&r.database, &r.schema))
            .cloned()
            .collect())
    }

    fn fetch_columns(&self, scope: &CatalogScope) -> Result<Vec<ColumnRow>, EntityGenError> {
        self.check(CatalogQuery::Columns)?;
        Ok(self
            .rows
            .columns
            .iter()
            .filter(|r| scope.contains(&r.database, &r.schema))
            .cloned()
            .collect())
    }

    fn fetch_indexes(&self, scope: &CatalogScope) -> Result<Vec<IndexRow>, EntityGenError> {
        self.check(CatalogQuery::Indexes)?;
        Ok(self
            .rows
            .indexes
            .iter()
            .filter(|r| scope.contains(&r.database, &r.schema))
            .cloned()
            .collect())
    }

    fn fetch_foreign_keys(
        &self,
        scope: &CatalogScope,
    ) -> Result<Vec<ForeignKeyRow>, EntityGenError> {
        self.check(CatalogQuery::ForeignKeys)?;
        Ok(self
            .rows
            .foreign_keys
            .iter()
            .filter(|r| scope.contains(&r.database, &r.schema))
            .cloned()
            .collect())
    }
}
