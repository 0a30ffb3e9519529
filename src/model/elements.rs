//! Entity model element types

use std::fmt;

use crate::util::normalize_keyword;

use super::types::{DefaultValue, LogicalType, StorageOptions, Transformer, ValidationConstraint};

/// Scope-qualified identity of an entity
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityKey {
    pub database: String,
    pub schema: String,
    pub name: String,
}

impl EntityKey {
    pub fn new(
        database: impl Into<String>,
        schema: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            database: database.into(),
            schema: schema.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.database.is_empty() || self.database == self.schema {
            write!(f, "{}.{}", self.schema, self.name)
        } else {
            write!(f, "{}.{}.{}", self.database, self.schema, self.name)
        }
    }
}

/// One table
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub sql_name: String,
    pub schema: String,
    pub database: String,
    /// Catalog ordinal order
    pub columns: Vec<Column>,
    pub indexes: Vec<Index>,
    pub relations: Vec<RelationView>,
}

impl Entity {
    pub fn new(key: EntityKey) -> Self {
        Self {
            sql_name: key.name,
            schema: key.schema,
            database: key.database,
            columns: Vec::new(),
            indexes: Vec::new(),
            relations: Vec::new(),
        }
    }

    pub fn key(&self) -> EntityKey {
        EntityKey::new(&self.database, &self.schema, &self.sql_name)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn primary_index(&self) -> Option<&Index> {
        self.indexes.iter().find(|i| i.primary)
    }

    /// Whether a column set is guaranteed unique: some unique or primary index has all
    /// of its columns inside the set, or the set is a single unique column.
    pub fn is_unique_column_set(&self, columns: &[String]) -> bool {
        let by_index = self.indexes.iter().any(|index| {
            (index.unique || index.primary)
                && !index.columns.is_empty()
                && index.columns.iter().all(|c| columns.contains(c))
        });
        let by_column = match columns {
            [single] => self.column(single).is_some_and(|c| c.unique),
            _ => false,
        };
        by_index || by_column
    }

    /// Whether `name` is already taken by a column or a relation field (case-insensitive)
    pub fn field_name_in_use(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name.eq_ignore_ascii_case(name))
            || self
                .relations
                .iter()
                .any(|r| r.field_name.eq_ignore_ascii_case(name))
    }

    pub fn relation_view(&self, relation: RelationId, side: RelationSide) -> Option<&RelationView> {
        self.relations
            .iter()
            .find(|v| v.relation == relation && v.side == side)
    }
}

/// One table field
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    /// Canonical native type name, or the raw catalog name when unrecognized
    pub native_type: String,
    /// Full native signature (e.g. `tinyint(1) unsigned`)
    pub native_signature: String,
    pub logical_type: LogicalType,
    pub nullable: bool,
    pub default: Option<DefaultValue>,
    /// Identity / auto-increment
    pub generated: bool,
    pub unique: bool,
    pub unsigned: bool,
    pub primary: bool,
    pub is_foreign_key: bool,
    pub storage: StorageOptions,
    /// Allowed values for enum and set columns
    pub enum_values: Vec<String>,
    pub comment: Option<String>,
    pub transformer: Option<Transformer>,
    pub constraints: Vec<ValidationConstraint>,
}

impl Column {
    /// Downstream validation must insist on a value
    pub fn is_required(&self) -> bool {
        self.constraints.contains(&ValidationConstraint::Required)
    }
}

/// One index or key constraint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Index {
    pub name: String,
    /// Intra-index order
    pub columns: Vec<String>,
    pub primary: bool,
    pub unique: bool,
    pub fulltext: bool,
}

/// Multiplicity of a relation, seen from one side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cardinality {
    OneToOne,
    ManyToOne,
    OneToMany,
    ManyToMany,
}

impl Cardinality {
    /// The same relation seen from the other side
    pub fn inverse(self) -> Self {
        match self {
            Cardinality::OneToOne => Cardinality::OneToOne,
            Cardinality::ManyToOne => Cardinality::OneToMany,
            Cardinality::OneToMany => Cardinality::ManyToOne,
            Cardinality::ManyToMany => Cardinality::ManyToMany,
        }
    }

    /// Whether a view with this cardinality holds a collection
    pub fn is_collection(self) -> bool {
        matches!(self, Cardinality::OneToMany | Cardinality::ManyToMany)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Cardinality::OneToOne => "OneToOne",
            Cardinality::ManyToOne => "ManyToOne",
            Cardinality::OneToMany => "OneToMany",
            Cardinality::ManyToMany => "ManyToMany",
        }
    }
}

/// Which end of a relation a view represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationSide {
    /// Holds the foreign-key columns (or the join table, for many-to-many)
    Owning,
    Inverse,
}

impl RelationSide {
    pub fn as_str(self) -> &'static str {
        match self {
            RelationSide::Owning => "Owning",
            RelationSide::Inverse => "Inverse",
        }
    }
}

/// Delete/update rule of a foreign key. "No action" is represented by its absence.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ReferentialAction {
    Cascade,
    Restrict,
    SetNull,
    SetDefault,
    /// Vendor keyword kept verbatim
    Other(String),
}

impl ReferentialAction {
    /// Parse a catalog rule; `None` for "no action" and empty rules
    pub fn parse(rule: &str) -> Option<Self> {
        match normalize_keyword(rule).as_str() {
            "" | "NO ACTION" => None,
            "CASCADE" => Some(ReferentialAction::Cascade),
            "RESTRICT" => Some(ReferentialAction::Restrict),
            "SET NULL" => Some(ReferentialAction::SetNull),
            "SET DEFAULT" => Some(ReferentialAction::SetDefault),
            _ => Some(ReferentialAction::Other(rule.trim().to_string())),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ReferentialAction::Cascade => "CASCADE",
            ReferentialAction::Restrict => "RESTRICT",
            ReferentialAction::SetNull => "SET NULL",
            ReferentialAction::SetDefault => "SET DEFAULT",
            ReferentialAction::Other(rule) => rule,
        }
    }
}

/// Owning-side column and the referenced column it points at
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnPair {
    pub owning: String,
    pub referenced: String,
}

impl ColumnPair {
    pub fn new(owning: impl Into<String>, referenced: impl Into<String>) -> Self {
        Self {
            owning: owning.into(),
            referenced: referenced.into(),
        }
    }
}

/// The collapsed junction table behind a many-to-many relation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinTable {
    pub table: EntityKey,
    /// Junction column -> column of the owning entity
    pub owning_columns: Vec<ColumnPair>,
    /// Junction column -> column of the referenced entity
    pub inverse_columns: Vec<ColumnPair>,
}

/// Identifier of a relation within one [`super::SchemaModel`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RelationId(pub u32);

impl fmt::Display for RelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R{}", self.0)
    }
}

/// A classified relation, stored once and referenced by a view on each side
#[derive(Debug, Clone, PartialEq)]
pub struct Relation {
    pub id: RelationId,
    pub constraint_name: String,
    /// Seen from the owning side
    pub cardinality: Cardinality,
    pub owning: EntityKey,
    pub referenced: EntityKey,
    /// Foreign-key column mapping; empty for many-to-many (see `join_table`)
    pub column_pairs: Vec<ColumnPair>,
    pub on_delete: Option<ReferentialAction>,
    pub on_update: Option<ReferentialAction>,
    pub join_table: Option<JoinTable>,
    pub owning_field: String,
    pub inverse_field: String,
}

impl Relation {
    pub fn is_self_referencing(&self) -> bool {
        self.owning == self.referenced
    }

    /// Cardinality as seen from `side`
    pub fn cardinality_for(&self, side: RelationSide) -> Cardinality {
        match side {
            RelationSide::Owning => self.cardinality,
            RelationSide::Inverse => self.cardinality.inverse(),
        }
    }
}

/// One entity's handle on a relation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationView {
    pub relation: RelationId,
    pub side: RelationSide,
    pub field_name: String,
    pub cardinality: Cardinality,
    /// Entity on the other end
    pub related: EntityKey,
}
