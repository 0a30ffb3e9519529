//! Non-fatal findings collected while building a model

use thiserror::Error;

/// An anomaly that did not stop the run. Each names the table and column or
/// constraint involved so the schema can be fixed or overridden.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    #[error("Unknown column type: {native_type} table name: {table} column name: {column}")]
    UnknownColumnType {
        table: String,
        column: String,
        native_type: String,
    },

    #[error(
        "Relation {constraint} between tables {owning_table} and {referenced_table} wasn't found in entity model"
    )]
    MissingRelationEndpoint {
        constraint: String,
        owning_table: String,
        referenced_table: String,
    },

    #[error("Table {table} looks like a junction table but {reason}; its foreign keys stay many-to-one")]
    AmbiguousJunction { table: String, reason: String },
}

impl Diagnostic {
    pub fn kind(&self) -> &'static str {
        match self {
            Diagnostic::UnknownColumnType { .. } => "UnknownColumnType",
            Diagnostic::MissingRelationEndpoint { .. } => "MissingRelationEndpoint",
            Diagnostic::AmbiguousJunction { .. } => "AmbiguousJunction",
        }
    }
}

/// Accumulator threaded through every build stage
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        tracing::debug!(kind = diagnostic.kind(), "{}", diagnostic);
        self.entries.push(diagnostic);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}
