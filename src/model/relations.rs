//! Relation resolution: foreign-key rows -> classified, attached relations
//!
//! Resolution runs in two phases. [`plan_relations`] groups and classifies every
//! foreign key without touching the entity graph and returns a [`RelationPlan`];
//! [`attach_relations`] then drops collapsed junction tables and attaches an owning
//! and an inverse view for every planned relation in one pass.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::catalog::ForeignKeyRow;

use super::diagnostics::{Diagnostic, Diagnostics};
use super::{
    Cardinality, ColumnPair, Entity, EntityKey, JoinTable, ReferentialAction, SchemaModel,
};

/// `(database, schema, constraint name)`; constraint names are only unique per scope
type ConstraintRef<'a> = (&'a str, &'a str, &'a str);

/// One physical foreign-key constraint with both endpoints resolved
#[derive(Debug, Clone)]
struct RelationInternal {
    constraint_name: String,
    /// Position of the owning entity in the entity slice
    owning: usize,
    referenced: usize,
    owning_columns: Vec<String>,
    referenced_columns: Vec<String>,
    on_delete: Option<ReferentialAction>,
    on_update: Option<ReferentialAction>,
}

impl RelationInternal {
    fn column_pairs(&self) -> Vec<ColumnPair> {
        self.owning_columns
            .iter()
            .zip(&self.referenced_columns)
            .map(|(owning, referenced)| ColumnPair::new(owning, referenced))
            .collect()
    }
}

/// A classified relation waiting to be attached
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedRelation {
    /// Foreign-key constraint, or the junction table name for many-to-many
    pub constraint_name: String,
    pub cardinality: Cardinality,
    pub owning: EntityKey,
    pub referenced: EntityKey,
    pub column_pairs: Vec<ColumnPair>,
    pub on_delete: Option<ReferentialAction>,
    pub on_update: Option<ReferentialAction>,
    pub join_table: Option<JoinTable>,
}

/// Output of the classification phase
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RelationPlan {
    /// In constraint-key order
    pub relations: Vec<PlannedRelation>,
    /// Junction tables collapsed into many-to-many relations
    pub junctions: BTreeSet<EntityKey>,
}

/// Group, resolve and classify foreign-key rows against `entities`.
///
/// Does not modify the entities. Constraints whose endpoints are not among
/// `entities` are skipped with a diagnostic.
pub fn plan_relations(
    entities: &[Entity],
    foreign_keys: &[ForeignKeyRow],
    diagnostics: &mut Diagnostics,
) -> RelationPlan {
    let groups = group_foreign_keys(foreign_keys);
    let internals = resolve_endpoints(entities, &groups, diagnostics);
    let junctions = detect_junctions(entities, &internals, diagnostics);

    let mut relations = Vec::with_capacity(internals.len());
    for (i, internal) in internals.iter().enumerate() {
        if let Some(&[first, second]) = junctions.get(&internal.owning) {
            // Emitted once, when the junction's first foreign key comes up
            if first == i {
                relations.push(many_to_many(
                    entities,
                    &internals[first],
                    &internals[second],
                ));
            }
            continue;
        }

        let owner = &entities[internal.owning];
        let cardinality = if owner.is_unique_column_set(&internal.owning_columns) {
            Cardinality::OneToOne
        } else {
            Cardinality::ManyToOne
        };

        relations.push(PlannedRelation {
            constraint_name: internal.constraint_name.clone(),
            cardinality,
            owning: owner.key(),
            referenced: entities[internal.referenced].key(),
            column_pairs: internal.column_pairs(),
            on_delete: internal.on_delete.clone(),
            on_update: internal.on_update.clone(),
            join_table: None,
        });
    }

    let junctions = junctions.keys().map(|&i| entities[i].key()).collect();
    tracing::debug!(relations = relations.len(), "classified relations");

    RelationPlan {
        relations,
        junctions,
    }
}

/// Remove collapsed junction tables and attach every planned relation
pub fn attach_relations(mut entities: Vec<Entity>, plan: RelationPlan) -> SchemaModel {
    entities.retain(|e| !plan.junctions.contains(&e.key()));

    let mut model = SchemaModel::new(entities);
    for planned in plan.relations {
        model.attach(planned);
    }
    model
}

/// First name not used by a column or relation field of `entity`: `base`, then
/// `base1`, `base2`, ...
pub(crate) fn unique_field_name(entity: &Entity, base: &str) -> String {
    if !entity.field_name_in_use(base) {
        return base.to_string();
    }
    let mut suffix = 1;
    loop {
        let candidate = format!("{}{}", base, suffix);
        if !entity.field_name_in_use(&candidate) {
            return candidate;
        }
        suffix += 1;
    }
}

/// Rows grouped by scope-qualified constraint, each group in ordinal order
fn group_foreign_keys(rows: &[ForeignKeyRow]) -> BTreeMap<ConstraintRef<'_>, Vec<&ForeignKeyRow>> {
    let mut groups: BTreeMap<ConstraintRef, Vec<&ForeignKeyRow>> = BTreeMap::new();
    for row in rows {
        groups
            .entry((
                row.database.as_str(),
                row.schema.as_str(),
                row.constraint_name.as_str(),
            ))
            .or_default()
            .push(row);
    }
    for rows in groups.values_mut() {
        rows.sort_by_key(|r| r.ordinal_position);
    }
    groups
}

fn resolve_endpoints(
    entities: &[Entity],
    groups: &BTreeMap<ConstraintRef, Vec<&ForeignKeyRow>>,
    diagnostics: &mut Diagnostics,
) -> Vec<RelationInternal> {
    let positions: HashMap<(&str, &str, &str), usize> = entities
        .iter()
        .enumerate()
        .map(|(i, e)| {
            (
                (e.database.as_str(), e.schema.as_str(), e.sql_name.as_str()),
                i,
            )
        })
        .collect();

    let mut internals = Vec::with_capacity(groups.len());
    for (&(database, schema, constraint_name), rows) in groups {
        let first = rows[0];
        let referenced_database = first.referenced_database.as_deref().unwrap_or(database);
        let referenced_schema = first.referenced_schema.as_deref().unwrap_or(schema);

        let owning = positions.get(&(database, schema, first.owning_table.as_str()));
        let referenced = positions.get(&(
            referenced_database,
            referenced_schema,
            first.referenced_table.as_str(),
        ));

        let (Some(&owning), Some(&referenced)) = (owning, referenced) else {
            diagnostics.push(Diagnostic::MissingRelationEndpoint {
                constraint: constraint_name.to_string(),
                owning_table: EntityKey::new(database, schema, &first.owning_table).to_string(),
                referenced_table: EntityKey::new(
                    referenced_database,
                    referenced_schema,
                    &first.referenced_table,
                )
                .to_string(),
            });
            continue;
        };

        internals.push(RelationInternal {
            constraint_name: constraint_name.to_string(),
            owning,
            referenced,
            owning_columns: rows.iter().map(|r| r.owning_column.clone()).collect(),
            referenced_columns: rows.iter().map(|r| r.referenced_column.clone()).collect(),
            on_delete: ReferentialAction::parse(&first.on_delete),
            on_update: ReferentialAction::parse(&first.on_update),
        });
    }
    internals
}

/// Junction tables keyed by entity position, with the positions of their two foreign
/// keys in `internals`.
///
/// A candidate is an entity with at least two outgoing foreign keys that together
/// cover every one of its columns. Candidates with any other shape than "exactly two
/// disjoint, non-unique foreign keys, not referenced by anything, primary key (if
/// any) over exactly those columns" are reported and left alone.
fn detect_junctions(
    entities: &[Entity],
    internals: &[RelationInternal],
    diagnostics: &mut Diagnostics,
) -> BTreeMap<usize, [usize; 2]> {
    let mut outgoing: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for (i, internal) in internals.iter().enumerate() {
        outgoing.entry(internal.owning).or_default().push(i);
    }

    let mut junctions = BTreeMap::new();
    for (&position, fks) in &outgoing {
        let entity = &entities[position];
        if fks.len() < 2 || entity.columns.is_empty() {
            continue;
        }
        let covered = entity.columns.iter().all(|column| {
            fks.iter()
                .any(|&i| internals[i].owning_columns.contains(&column.name))
        });
        if !covered {
            continue;
        }

        match junction_shape(position, entity, fks, internals) {
            Ok(pair) => {
                tracing::debug!(table = %entity.key(), "collapsing junction table");
                junctions.insert(position, pair);
            }
            Err(reason) => diagnostics.push(Diagnostic::AmbiguousJunction {
                table: entity.key().to_string(),
                reason,
            }),
        }
    }
    junctions
}

fn junction_shape(
    position: usize,
    entity: &Entity,
    fks: &[usize],
    internals: &[RelationInternal],
) -> Result<[usize; 2], String> {
    let &[first, second] = fks else {
        return Err(format!("it has {} foreign keys instead of two", fks.len()));
    };
    let (a, b) = (&internals[first], &internals[second]);

    if let Some(shared) = a.owning_columns.iter().find(|c| b.owning_columns.contains(c)) {
        return Err(format!("column {} belongs to both of its foreign keys", shared));
    }

    if let Some(incoming) = internals.iter().find(|r| r.referenced == position) {
        return Err(format!(
            "it is referenced by foreign key {}",
            incoming.constraint_name
        ));
    }

    if let Some(primary) = entity.primary_index() {
        let fk_columns: BTreeSet<&String> =
            a.owning_columns.iter().chain(&b.owning_columns).collect();
        let pk_columns: BTreeSet<&String> = primary.columns.iter().collect();
        if pk_columns != fk_columns {
            return Err("its primary key does not span exactly the foreign-key columns".to_string());
        }
    }

    for fk in [a, b] {
        if entity.is_unique_column_set(&fk.owning_columns) {
            return Err(format!(
                "foreign key {} is unique on its own",
                fk.constraint_name
            ));
        }
    }

    Ok([first, second])
}

/// The many-to-many relation replacing a junction. Owned by the entity the first
/// foreign key points at; per-row actions are dropped.
fn many_to_many(
    entities: &[Entity],
    first: &RelationInternal,
    second: &RelationInternal,
) -> PlannedRelation {
    let junction = &entities[first.owning];
    PlannedRelation {
        constraint_name: junction.sql_name.clone(),
        cardinality: Cardinality::ManyToMany,
        owning: entities[first.referenced].key(),
        referenced: entities[second.referenced].key(),
        column_pairs: Vec::new(),
        on_delete: None,
        on_update: None,
        join_table: Some(JoinTable {
            table: junction.key(),
            owning_columns: first.column_pairs(),
            inverse_columns: second.column_pairs(),
        }),
    }
}
