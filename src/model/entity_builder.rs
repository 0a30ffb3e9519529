//! Build entities from table, column and index rows
//!
//! Rows are grouped with borrowed `(database, schema, table)` keys so grouping does
//! not clone names; owned strings are only created for the finished elements.

use std::collections::{BTreeMap, BTreeSet};

use crate::catalog::{ColumnRow, ForeignKeyRow, IndexRow, TableRow};

use super::diagnostics::{Diagnostic, Diagnostics};
use super::types::{map_column, GenerationOptions};
use super::{Column, Entity, EntityKey, Index};

type TableRef<'a> = (&'a str, &'a str, &'a str);
type ColumnRef<'a> = (&'a str, &'a str, &'a str, &'a str);

/// One entity per distinct table, sorted by key, with columns in ordinal order.
///
/// Column rows for tables outside `tables` are ignored. A table without columns still
/// produces an (empty) entity. A column is a foreign key when its own row names a
/// referenced table or when it owns a column of any foreign-key row.
pub fn build_entities(
    tables: &[TableRow],
    columns: &[ColumnRow],
    foreign_keys: &[ForeignKeyRow],
    options: &GenerationOptions,
    diagnostics: &mut Diagnostics,
) -> Vec<Entity> {
    let foreign_key_columns: BTreeSet<ColumnRef> = foreign_keys
        .iter()
        .map(|fk| {
            (
                fk.database.as_str(),
                fk.schema.as_str(),
                fk.owning_table.as_str(),
                fk.owning_column.as_str(),
            )
        })
        .collect();

    let table_refs: BTreeSet<TableRef> = tables
        .iter()
        .map(|t| (t.database.as_str(), t.schema.as_str(), t.table_name.as_str()))
        .collect();

    let mut columns_by_table: BTreeMap<TableRef, Vec<&ColumnRow>> = BTreeMap::new();
    for row in columns {
        columns_by_table
            .entry((row.database.as_str(), row.schema.as_str(), row.table_name.as_str()))
            .or_default()
            .push(row);
    }
    // Stable: rows sharing a position keep their arrival order
    for rows in columns_by_table.values_mut() {
        rows.sort_by_key(|r| r.ordinal_position);
    }

    let mut entities = Vec::with_capacity(table_refs.len());
    for table in table_refs {
        let (database, schema, name) = table;
        let key = EntityKey::new(database, schema, name);
        let mut entity = Entity::new(key.clone());

        if let Some(rows) = columns_by_table.get(&table) {
            entity.columns = rows
                .iter()
                .map(|row| {
                    let is_foreign_key = row.referenced_table_name.is_some()
                        || foreign_key_columns.contains(&(
                            database,
                            schema,
                            name,
                            row.column_name.as_str(),
                        ));
                    column_from_row(row, &key, is_foreign_key, options, diagnostics)
                })
                .collect();
        }

        if entity.columns.is_empty() {
            tracing::debug!(table = %key, "table has no columns");
        }
        entities.push(entity);
    }

    tracing::debug!(entities = entities.len(), "built entities");
    entities
}

fn column_from_row(
    row: &ColumnRow,
    table: &EntityKey,
    is_foreign_key: bool,
    options: &GenerationOptions,
    diagnostics: &mut Diagnostics,
) -> Column {
    let mapped = map_column(row, options, is_foreign_key);

    let native_type = match mapped.native {
        Some(native) => native.name().to_string(),
        None => {
            diagnostics.push(Diagnostic::UnknownColumnType {
                table: table.to_string(),
                column: row.column_name.clone(),
                native_type: row.data_type.clone(),
            });
            row.data_type.clone()
        }
    };

    Column {
        name: row.column_name.clone(),
        native_type,
        native_signature: row.column_type.clone(),
        logical_type: mapped.logical_type,
        nullable: row.is_nullable,
        default: mapped.default,
        generated: row.is_identity,
        unique: row.is_unique,
        unsigned: mapped.unsigned,
        primary: false,
        is_foreign_key,
        storage: mapped.storage,
        enum_values: mapped.enum_values,
        comment: row.comment.clone(),
        transformer: mapped.transformer,
        constraints: mapped.constraints,
    }
}

/// Group index rows by (table, index name) and attach them.
///
/// Flags come from the first row of each group; columns follow `seq_in_index`. An
/// entity keeps at most one primary index: a later group that also claims to be
/// primary is kept as a unique index. Columns of the primary index are marked
/// `primary`.
pub fn attach_indexes(entities: &mut [Entity], indexes: &[IndexRow]) {
    let mut by_table: BTreeMap<TableRef, BTreeMap<&str, Vec<&IndexRow>>> = BTreeMap::new();
    for row in indexes {
        by_table
            .entry((
                row.database.as_str(),
                row.schema.as_str(),
                row.table_name.as_str(),
            ))
            .or_default()
            .entry(row.index_name.as_str())
            .or_default()
            .push(row);
    }
    for groups in by_table.values_mut() {
        for rows in groups.values_mut() {
            rows.sort_by_key(|r| r.seq_in_index);
        }
    }

    for entity in entities.iter_mut() {
        let table = (
            entity.database.as_str(),
            entity.schema.as_str(),
            entity.sql_name.as_str(),
        );
        let Some(groups) = by_table.get(&table) else {
            continue;
        };

        let mut built = Vec::with_capacity(groups.len());
        let mut has_primary = false;
        for (name, rows) in groups {
            let first = rows[0];

            let mut index = Index {
                name: name.to_string(),
                columns: rows.iter().map(|r| r.column_name.clone()).collect(),
                primary: first.is_primary,
                unique: first.is_unique || first.is_primary,
                fulltext: first.is_fulltext,
            };
            if index.primary {
                if has_primary {
                    tracing::debug!(
                        table = %entity.sql_name,
                        index = %index.name,
                        "second primary index demoted to unique"
                    );
                    index.primary = false;
                }
                has_primary = true;
            }
            built.push(index);
        }

        if let Some(primary) = built.iter().find(|i| i.primary) {
            for column in entity.columns.iter_mut() {
                if primary.columns.contains(&column.name) {
                    column.primary = true;
                }
            }
        }
        entity.indexes = built;
    }
}
